//! Engine configuration

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GenError, GenResult};

/// Options controlling where and how imports are resolved.
///
/// Deserializes from the same camelCase keys the JSON options file uses:
///
/// ```json
/// { "root": ".", "includeNearbyFiles": true, "workspaceRoot": ".." }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenOptions {
    /// Project root holding `package.json` and `node_modules`
    pub root: PathBuf,
    /// Resolve relative imports against the importing file
    pub include_nearby_files: bool,
    /// Root used for dependencies linked with a `workspace:` reference
    pub workspace_root: Option<PathBuf>,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            include_nearby_files: false,
            workspace_root: None,
        }
    }
}

impl GenOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    pub fn include_nearby_files(mut self, enabled: bool) -> Self {
        self.include_nearby_files = enabled;
        self
    }

    pub fn workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Load options from a JSON file. Relative roots are taken relative to
    /// the directory containing the file.
    pub fn from_file(path: &Path) -> GenResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        let mut options: GenOptions = serde_json::from_str(&content).map_err(|source| GenError::Options {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        if options.root.is_relative() {
            options.root = base.join(&options.root);
        }
        if let Some(workspace) = options.workspace_root.as_mut() {
            if workspace.is_relative() {
                *workspace = base.join(&*workspace);
            }
        }
        Ok(options)
    }
}
