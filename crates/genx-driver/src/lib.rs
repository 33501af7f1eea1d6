//! Genx Driver Library
//!
//! Import resolution and dependency closure for TypeScript type
//! declarations. Resolves import statements to local files, installed
//! packages or workspace packages, pulls in every type they transitively
//! reference, and inlines the result ahead of the importing code.

pub mod error;
pub mod options;
pub mod package_json;
pub mod locator;
pub mod exports;
pub mod resolver;
pub mod context;
pub mod order;
pub mod introspect;
pub mod closure;
pub mod emitter;
pub mod engine;

pub use closure::ClosureBuilder;
pub use context::{DeclKey, ResolutionContext};
pub use emitter::{InlineEmitter, SchemaEmitter};
pub use engine::{BatchReport, Generator, InlinedSource};
pub use error::{GenError, GenResult};
pub use exports::PackageExportTable;
pub use introspect::{PropertyType, SourceIntrospector, TypeDeclaration, TypeIntrospector};
pub use options::GenOptions;
pub use resolver::{ImportTarget, ModuleResolver};
