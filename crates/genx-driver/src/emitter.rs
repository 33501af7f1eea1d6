//! Schema emission seam

use crate::error::GenResult;

/// Turns a self-contained declaration source into validator code
pub trait SchemaEmitter {
    fn emit(&self, source: &str) -> GenResult<String>;
}

/// Emitter that hands the inlined source back unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineEmitter;

impl SchemaEmitter for InlineEmitter {
    fn emit(&self, source: &str) -> GenResult<String> {
        Ok(source.to_string())
    }
}
