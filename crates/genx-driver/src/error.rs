//! Error types for import resolution and generation

use std::io;
use std::path::PathBuf;

use genx_parser::ParseError;
use thiserror::Error;

/// Errors raised while resolving imports or generating output
#[derive(Debug, Error)]
pub enum GenError {
    /// Unparseable or unsupported import statement
    #[error(transparent)]
    MalformedImport(#[from] ParseError),

    /// Default and namespace imports are parsed but never resolved
    #[error("{kind} imports are not implemented yet (from \"{from}\")")]
    UnsupportedImportKind { kind: &'static str, from: String },

    /// No export map entry matched the requested subpath
    #[error("Not found export from {specifier}")]
    ExportNotFound { specifier: String },

    /// The matched export map entry has no declaration path
    #[error("Not found type file for {subpath} export of {package}")]
    NoDeclarationPath { package: String, subpath: String },

    /// Bare specifier that matches no known or installed package
    #[error("Package for {0} is not installed")]
    PackageNotFound(String),

    /// Export map key that cannot be turned into a pattern
    #[error("Invalid export pattern {key}: {source}")]
    ExportPattern {
        key: String,
        #[source]
        source: regex::Error,
    },

    /// package.json exists but is not valid for our purposes
    #[error("Failed to parse manifest {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Options file is not valid JSON or has wrong field types
    #[error("Invalid options file {path}: {source}")]
    Options {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failure reported by the schema emitter
    #[error("Schema emitter failed: {0}")]
    Emit(String),
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type GenResult<T> = Result<T, GenError>;
