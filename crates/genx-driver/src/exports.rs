//! Package export maps
//!
//! Turns a manifest's `exports` field into an ordered table of subpath
//! patterns and picks the declaration file for a requested subpath.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{GenError, GenResult};
use crate::locator::normalize_path;
use crate::package_json::{load_package_json, PackageJson};

/// Subpath of the package entry point
pub const ROOT_SUBPATH: &str = ".";

/// Suffix an export string must carry to be used as declaration path
const DECLARATION_FILE_SUFFIX: &str = ".d.ts";

/// Condition keys that mark an object as a condition map rather than a
/// subpath map
const CONDITION_KEYS: [&str; 6] = ["types", "typings", "import", "require", "default", "node"];

/// One `exports` entry
#[derive(Debug, Clone)]
pub struct ExportEntry {
    /// Key as written in the manifest (`"."`, `"./types/*"`)
    pub key: String,
    /// Anchored pattern, one capture group per `*`
    pub pattern: Regex,
    /// Declaration path template, `*` standing for the captures in order
    pub types: Option<String>,
}

impl ExportEntry {
    pub fn new(key: impl Into<String>, types: Option<String>) -> GenResult<Self> {
        let key = key.into();
        let pattern = subpath_pattern(&key)?;
        Ok(Self { key, pattern, types })
    }

    /// Declaration path for `subpath` if this entry matches it
    fn substitute(&self, subpath: &str) -> Option<Option<String>> {
        let captures = self.pattern.captures(subpath)?;
        let Some(template) = self.types.as_deref() else {
            return Some(None);
        };

        let mut path = template.to_string();
        for capture in captures.iter().skip(1) {
            let value = capture.map(|m| m.as_str()).unwrap_or_default();
            if !path.contains('*') {
                break;
            }
            path = path.replacen('*', value, 1);
        }
        Some(Some(path))
    }
}

/// Export map of one package in manifest order
#[derive(Debug, Clone, Default)]
pub struct PackageExportTable {
    entries: Vec<ExportEntry>,
}

impl PackageExportTable {
    /// Build the table from a manifest.
    ///
    /// When no `"."` entry exists but any legacy entry field does, one is
    /// appended from `types` (or `typings`).
    pub fn from_manifest(manifest: &PackageJson) -> GenResult<Self> {
        let mut entries = Vec::new();

        match &manifest.exports {
            Some(conditions @ Value::Object(map)) if is_condition_map(map) => {
                entries.push(ExportEntry::new(ROOT_SUBPATH, types_of(conditions))?);
            }
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    entries.push(ExportEntry::new(key.as_str(), types_of(value))?);
                }
            }
            Some(value @ (Value::String(_) | Value::Array(_))) => {
                entries.push(ExportEntry::new(ROOT_SUBPATH, types_of(value))?);
            }
            _ => {}
        }

        let has_root = entries.iter().any(|e| e.key == ROOT_SUBPATH);
        if !has_root && manifest.has_legacy_entry() {
            let types = manifest.legacy_types().map(str::to_string);
            entries.push(ExportEntry::new(ROOT_SUBPATH, types)?);
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ExportEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry matching `subpath`
    pub fn find(&self, subpath: &str) -> Option<&ExportEntry> {
        self.entries.iter().find(|e| e.pattern.is_match(subpath))
    }

    /// Declaration path template resolved for `subpath`, relative to the
    /// package directory.
    pub fn resolve(&self, package: &str, subpath: &str) -> GenResult<String> {
        let entry = self.find(subpath).ok_or_else(|| GenError::ExportNotFound {
            specifier: join_specifier(package, subpath),
        })?;

        entry
            .substitute(subpath)
            .flatten()
            .ok_or_else(|| GenError::NoDeclarationPath {
                package: package.to_string(),
                subpath: entry.key.clone(),
            })
    }
}

/// Anchored regex for an export key, `*` matching any text
pub fn subpath_pattern(key: &str) -> GenResult<Regex> {
    let escaped = regex::escape(key).replace(r"\*", "(.*)");
    Regex::new(&format!("^{}$", escaped)).map_err(|source| GenError::ExportPattern {
        key: key.to_string(),
        source,
    })
}

/// Subpath of `specifier` below `package`: `"."` or `"./rest"`
pub fn subpath_of(specifier: &str, package: &str) -> String {
    match specifier.strip_prefix(package) {
        Some(rest) if !rest.is_empty() => format!(".{}", rest),
        _ => ROOT_SUBPATH.to_string(),
    }
}

fn join_specifier(package: &str, subpath: &str) -> String {
    match subpath.strip_prefix('.') {
        Some(rest) => format!("{}{}", package, rest),
        None => format!("{}/{}", package, subpath),
    }
}

fn is_condition_map(map: &Map<String, Value>) -> bool {
    !map.is_empty()
        && map.keys().all(|k| !k.starts_with('.'))
        && map.keys().any(|k| CONDITION_KEYS.contains(&k.as_str()))
}

/// Declaration path declared by an export value.
///
/// Objects are searched depth-first with `types` checked before the other
/// conditions; arrays take their first usable element.
fn types_of(value: &Value) -> Option<String> {
    match value {
        Value::String(path) if path.ends_with(DECLARATION_FILE_SUFFIX) => Some(path.clone()),
        Value::Object(map) => {
            for key in ["types", "typings"] {
                if let Some(found) = map.get(key).and_then(types_of) {
                    return Some(found);
                }
            }
            map.iter()
                .filter(|(k, _)| *k != "types" && *k != "typings")
                .find_map(|(_, v)| types_of(v))
        }
        Value::Array(items) => items.iter().find_map(types_of),
        _ => None,
    }
}

/// Declaration file of `subpath` in the package installed at `package_dir`
pub fn resolve_package_types(package_dir: &Path, package: &str, subpath: &str) -> GenResult<PathBuf> {
    let manifest = load_package_json(package_dir);
    let table = PackageExportTable::from_manifest(&manifest)?;
    let relative = table.resolve(package, subpath)?;
    let path = normalize_path(&package_dir.join(relative));
    debug!("Resolved {} export {} to {}", package, subpath, path.display());
    Ok(path)
}
