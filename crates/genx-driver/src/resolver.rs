//! Module resolution logic for import statements

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::context::ResolutionContext;
use crate::error::{GenError, GenResult};
use crate::exports::{resolve_package_types, subpath_of};
use crate::locator::{locate, resolve_relative};
use crate::options::GenOptions;

const NODE_MODULES: &str = "node_modules";

/// Dependency reference prefix marking a package linked from the workspace
const WORKSPACE_PROTOCOL: &str = "workspace";

/// Where an import specifier should be looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// A dependency of the root project, installed under `root/node_modules`
    Package { name: String, root: PathBuf },
    /// Anything else, resolved as a path next to the importing file
    Local,
}

/// Module resolver handles import path resolution
#[derive(Debug, Clone)]
pub struct ModuleResolver {
    /// Project root holding the manifest and `node_modules`
    root: PathBuf,
    /// Root for `workspace:` linked dependencies
    workspace_root: Option<PathBuf>,
    include_nearby_files: bool,
}

impl ModuleResolver {
    pub fn new(options: &GenOptions) -> Self {
        Self {
            root: options.root.clone(),
            workspace_root: options.workspace_root.clone(),
            include_nearby_files: options.include_nearby_files,
        }
    }

    /// Decide whether `specifier` names a root dependency.
    ///
    /// The longest dependency name that equals the specifier or is followed
    /// by `/` in it wins. Dependencies referenced as `workspace:…` resolve
    /// under the workspace root when one is configured.
    pub fn classify(&self, ctx: &mut ResolutionContext, specifier: &str) -> ImportTarget {
        let dependencies = ctx.root_dependencies(&self.root);
        let matched = dependencies
            .iter()
            .filter(|(name, _)| belongs_to_package(specifier, name))
            .max_by_key(|(name, _)| name.len());

        let Some((name, reference)) = matched else {
            return ImportTarget::Local;
        };

        let root = match &self.workspace_root {
            Some(workspace_root) if reference.starts_with(WORKSPACE_PROTOCOL) => workspace_root.clone(),
            _ => self.root.clone(),
        };
        ImportTarget::Package {
            name: name.clone(),
            root,
        }
    }

    /// Declaration file for `specifier` inside package `name` installed
    /// under `package_root`
    pub fn resolve_package(&self, name: &str, package_root: &Path, specifier: &str) -> GenResult<PathBuf> {
        let package_dir = package_root.join(NODE_MODULES).join(name);
        if !package_dir.is_dir() {
            return Err(GenError::PackageNotFound(name.to_string()));
        }
        let path = resolve_package_types(&package_dir, name, &subpath_of(specifier, name))?;
        Ok(locate(&path))
    }

    /// File an import statement's `from` refers to.
    ///
    /// Returns `Ok(None)` when the import is local but nearby files are
    /// disabled or there is no importing file to resolve against.
    pub fn resolve_import_source(
        &self,
        ctx: &mut ResolutionContext,
        specifier: &str,
        importer: Option<&Path>,
    ) -> GenResult<Option<PathBuf>> {
        match self.classify(ctx, specifier) {
            ImportTarget::Package { name, root } => {
                debug!("Import {} resolves through package {} in {}", specifier, name, root.display());
                self.resolve_package(&name, &root, specifier).map(Some)
            }
            ImportTarget::Local => {
                let Some(importer) = importer.filter(|_| self.include_nearby_files) else {
                    warn!("Include nearby files disabled, skipping {}", specifier);
                    return Ok(None);
                };
                Ok(Some(locate(&resolve_relative(specifier, importer))))
            }
        }
    }

    /// File a cross-module reference found in a declaration points at.
    ///
    /// Absolute and relative module paths go through the locator. Bare
    /// specifiers go through the root dependencies first, then through the
    /// nearest `node_modules` above the referencing file.
    pub fn resolve_reference(
        &self,
        ctx: &mut ResolutionContext,
        module: &str,
        current_file: &Path,
    ) -> GenResult<PathBuf> {
        if Path::new(module).is_absolute() {
            return Ok(locate(Path::new(module)));
        }
        if module.starts_with('.') {
            return Ok(locate(&resolve_relative(module, current_file)));
        }

        if let ImportTarget::Package { name, root } = self.classify(ctx, module) {
            return self.resolve_package(&name, &root, module);
        }

        let (name, _) = split_package_specifier(module);
        let package_root = find_installed(name, current_file).unwrap_or_else(|| self.root.clone());
        self.resolve_package(name, &package_root, module)
    }
}

/// Whether `specifier` imports `package` or one of its subpaths
pub fn belongs_to_package(specifier: &str, package: &str) -> bool {
    match specifier.strip_prefix(package) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Split a package specifier into package name and subpath
///
/// Examples:
/// - "lodash" → ("lodash", None)
/// - "lodash/fp" → ("lodash", Some("fp"))
/// - "@types/node" → ("@types/node", None)
/// - "@types/node/fs" → ("@types/node", Some("fs"))
pub fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };

    let split_pos = specifier
        .match_indices('/')
        .nth(name_segments - 1)
        .map(|(pos, _)| pos);

    match split_pos {
        Some(pos) => (&specifier[..pos], Some(&specifier[pos + 1..])),
        None => (specifier, None),
    }
}

/// Directory whose `node_modules` holds `package`, searching from the
/// referencing file's directory upward
fn find_installed(package: &str, from_file: &Path) -> Option<PathBuf> {
    let mut current = from_file.parent();
    while let Some(dir) = current {
        if dir.join(NODE_MODULES).join(package).is_dir() {
            return Some(dir.to_path_buf());
        }
        current = dir.parent();
    }
    None
}
