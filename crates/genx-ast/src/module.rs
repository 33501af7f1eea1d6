//! Import statement model

use serde::{Deserialize, Serialize};

/// Structural description of one import statement.
///
/// Exactly one binding shape is carried per statement. Statements mixing a
/// default binding with named bindings, and side-effect-only imports, never
/// produce an `ImportSpec`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ImportSpec {
    /// import Name from "module"
    Default { alias: String, from: String },

    /// import * as Name from "module"
    NamespaceAll { alias: String, from: String },

    /// import { A, type B, C as D } from "module"
    Named { items: Vec<NamedImport>, from: String },
}

/// One fragment of a named import clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedImport {
    /// Only reflects an explicit `type` annotation; `false` does not mean
    /// the binding is a value.
    pub is_explicit_type: bool,
    /// Local rename from `as`, empty when absent
    pub alias: String,
    /// Original exported name
    pub content: String,
}

impl NamedImport {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            is_explicit_type: false,
            alias: String::new(),
            content: content.into(),
        }
    }

    pub fn explicit_type(mut self, is_explicit_type: bool) -> Self {
        self.is_explicit_type = is_explicit_type;
        self
    }

    pub fn aliased(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Name the binding is visible under in the importing file
    pub fn local_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.content
        } else {
            &self.alias
        }
    }
}

impl ImportSpec {
    /// Module specifier the statement imports from
    pub fn from(&self) -> &str {
        match self {
            ImportSpec::Default { from, .. }
            | ImportSpec::NamespaceAll { from, .. }
            | ImportSpec::Named { from, .. } => from,
        }
    }

    /// Short kind label used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            ImportSpec::Default { .. } => "default",
            ImportSpec::NamespaceAll { .. } => "namespace",
            ImportSpec::Named { .. } => "named",
        }
    }
}
