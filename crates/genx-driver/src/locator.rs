//! Local file location for import paths

use std::fs;
use std::path::{Component, Path, PathBuf};

/// Suffix shared by TypeScript sources and declaration files
pub const DECLARATION_SUFFIX: &str = ".ts";

/// Candidate suffixes tried, in order, for a path given without one
const FILE_SUFFIXES: [&str; 2] = [".ts", ".d.ts"];

/// Candidate index files tried, in order, for a directory path
const INDEX_FILES: [&str; 2] = ["index.ts", "index.d.ts"];

/// Make `path` absolute and fold `.` and `..` components without touching
/// the file system.
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path),
            Err(_) => path.to_path_buf(),
        }
    };

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Normalize, then resolve symlinks when the path exists.
pub fn canonicalize(path: &Path) -> PathBuf {
    let normalized = normalize_path(path);
    fs::canonicalize(&normalized).unwrap_or(normalized)
}

/// Find the file an import path refers to.
///
/// A path already ending in `.ts` is taken verbatim. Otherwise `<path>.ts`,
/// `<path>.d.ts`, `<path>/index.ts` and `<path>/index.d.ts` are tried in
/// that order. When none exists the unsuffixed path is returned so that
/// later stages report the missing file.
pub fn locate(path: &Path) -> PathBuf {
    let path = normalize_path(path);
    if path.to_string_lossy().ends_with(DECLARATION_SUFFIX) {
        return canonicalize(&path);
    }

    let raw = path.as_os_str().to_string_lossy();
    for suffix in FILE_SUFFIXES {
        let candidate = PathBuf::from(format!("{}{}", raw, suffix));
        if candidate.is_file() {
            return canonicalize(&candidate);
        }
    }

    for index in INDEX_FILES {
        let candidate = path.join(index);
        if candidate.is_file() {
            return canonicalize(&candidate);
        }
    }

    path
}

/// Join a relative import path onto the importing location.
///
/// `importer` is normally the importing file, in which case its directory
/// is the base; any other path is treated as a directory.
pub fn resolve_relative(specifier: &str, importer: &Path) -> PathBuf {
    let is_source_file = importer.to_string_lossy().ends_with(DECLARATION_SUFFIX);
    let base = if is_source_file {
        importer.parent().unwrap_or(importer)
    } else {
        importer
    };
    normalize_path(&base.join(specifier))
}

pub fn is_relative_specifier(specifier: &str) -> bool {
    specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_dots() {
        let normalized = normalize_path(Path::new("/a/b/./c/../d.ts"));
        assert_eq!(normalized, PathBuf::from("/a/b/d.ts"));
    }

    #[test]
    fn test_locate_prefers_suffix_then_index() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path());
        fs::write(root.join("one.ts"), "export type One = {};").unwrap();
        fs::create_dir_all(root.join("two")).unwrap();
        fs::write(root.join("two/index.ts"), "export type Two = {};").unwrap();
        fs::write(root.join("three.d.ts"), "export type Three = {};").unwrap();

        assert_eq!(locate(&root.join("one")), root.join("one.ts"));
        assert_eq!(locate(&root.join("two")), root.join("two/index.ts"));
        assert_eq!(locate(&root.join("three")), root.join("three.d.ts"));
    }

    #[test]
    fn test_locate_keeps_suffixed_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path());

        // verbatim even when missing
        assert_eq!(locate(&root.join("ghost.ts")), root.join("ghost.ts"));
        // soft fail returns the unsuffixed path
        assert_eq!(locate(&root.join("ghost")), root.join("ghost"));
    }

    #[test]
    fn test_equal_paths_spelled_differently() {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path());
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/one.ts"), "").unwrap();

        let direct = locate(&root.join("src/one"));
        let roundabout = locate(&root.join("src/../src/./one.ts"));
        assert_eq!(direct, roundabout);
    }

    #[test]
    fn test_resolve_relative_from_file_or_dir() {
        let from_file = resolve_relative("./two", Path::new("/p/src/one.ts"));
        assert_eq!(from_file, PathBuf::from("/p/src/two"));

        let from_dir = resolve_relative("../lib/two", Path::new("/p/src"));
        assert_eq!(from_dir, PathBuf::from("/p/lib/two"));
    }

    #[test]
    fn test_relative_specifier_detection() {
        assert!(is_relative_specifier("./two"));
        assert!(is_relative_specifier("../two"));
        assert!(!is_relative_specifier("@scope/pkg"));
        assert!(!is_relative_specifier(".hidden"));
    }
}
