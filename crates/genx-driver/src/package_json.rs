//! package.json reader
//!
//! Only the fields import resolution needs are modelled; everything else in
//! the manifest is ignored.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{GenError, GenResult};

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    /// CommonJS entry
    pub main: Option<String>,
    /// ES module entry
    pub module: Option<String>,
    /// Declaration entry
    pub types: Option<String>,
    /// Older alias of `types`
    pub typings: Option<String>,
    /// Raw export map; its shape varies too much for a fixed struct
    pub exports: Option<Value>,
    pub dependencies: IndexMap<String, String>,
    pub dev_dependencies: IndexMap<String, String>,
    pub peer_dependencies: IndexMap<String, String>,
}

impl PackageJson {
    /// Dependency name → reference, merged dev, then peer, then direct.
    /// A later class overrides the reference of an earlier one; the name
    /// keeps the position of its first appearance.
    pub fn merged_dependencies(&self) -> IndexMap<String, String> {
        let mut merged = IndexMap::new();
        for class in [&self.dev_dependencies, &self.peer_dependencies, &self.dependencies] {
            for (name, reference) in class {
                merged.insert(name.clone(), reference.clone());
            }
        }
        merged
    }

    /// Declaration entry from the legacy top-level fields
    pub fn legacy_types(&self) -> Option<&str> {
        self.types.as_deref().or(self.typings.as_deref())
    }

    pub fn has_legacy_entry(&self) -> bool {
        self.main.is_some() || self.module.is_some() || self.legacy_types().is_some()
    }
}

/// Parse `<dir>/package.json`
pub fn read_package_json(dir: &Path) -> GenResult<PackageJson> {
    let path = dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&path).map_err(|e| GenError::io(&path, e))?;
    parse_package_json_str(&content).map_err(|source| GenError::ManifestParse { path, source })
}

/// Like [`read_package_json`], but an unreadable or invalid manifest is
/// logged and treated as empty.
pub fn load_package_json(dir: &Path) -> PackageJson {
    match read_package_json(dir) {
        Ok(manifest) => manifest,
        Err(err) => {
            warn!("Failed to read package.json: {}", err);
            PackageJson::default()
        }
    }
}

fn parse_package_json_str(content: &str) -> Result<PackageJson, serde_json::Error> {
    serde_json::from_str(content)
}
