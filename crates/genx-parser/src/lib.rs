//! # Genx Parser
//!
//! Recursive descent parser for TypeScript import statements, operating on
//! the `genx-lexer` token stream so that comments, minified input and
//! multi-line clauses all parse the same way.

use genx_ast::*;
use genx_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod helpers;
mod scan;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;
pub use scan::{scan_imports, ImportStatement};

/// Parses one import statement into its structural description
pub fn parse_import(statement: &str) -> ParseResult<ImportSpec> {
    let tokens = Lexer::new(statement).tokenize();
    if let Some(bad) = tokens.iter().find(|t| t.kind == TokenKind::Error) {
        return Err(ParseError::new(bad.value.clone(), bad.span));
    }
    Parser::new(&tokens).parse_single_import()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn named(items: Vec<NamedImport>) -> ImportSpec {
        ImportSpec::Named {
            items,
            from: "@vot.js/node".to_string(),
        }
    }

    #[test]
    fn test_import_default() {
        let result = parse_import(r#"import Client from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            ImportSpec::Default {
                alias: "Client".to_string(),
                from: "@vot.js/node".to_string(),
            }
        );
    }

    #[test]
    fn test_import_all_with_alias() {
        let result = parse_import(r#"import * as Client from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            ImportSpec::NamespaceAll {
                alias: "Client".to_string(),
                from: "@vot.js/node".to_string(),
            }
        );
    }

    #[test]
    fn test_import_some() {
        let result = parse_import(r#"import { ClientOpts } from "@vot.js/node""#).unwrap();
        assert_eq!(result, named(vec![NamedImport::new("ClientOpts")]));
    }

    #[test]
    fn test_import_minified() {
        let result = parse_import(r#"import{ClientOpts}from"@vot.js/node""#).unwrap();
        assert_eq!(result, named(vec![NamedImport::new("ClientOpts")]));
    }

    #[test]
    fn test_import_type_clause() {
        let result = parse_import(r#"import type { ClientOpts } from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            named(vec![NamedImport::new("ClientOpts").explicit_type(true)])
        );
    }

    #[test]
    fn test_import_type_fragment() {
        let result = parse_import(r#"import { type ClientOpts } from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            named(vec![NamedImport::new("ClientOpts").explicit_type(true)])
        );
    }

    #[test]
    fn test_import_many_with_type() {
        let code = r#"import {
  Client,
  ClientV2,
  type ClientOpts
} from "@vot.js/node""#;
        let result = parse_import(code).unwrap();
        assert_eq!(
            result,
            named(vec![
                NamedImport::new("Client"),
                NamedImport::new("ClientV2"),
                NamedImport::new("ClientOpts").explicit_type(true),
            ])
        );
    }

    #[test]
    fn test_import_type_many_with_parted_alias() {
        let code = r#"import type {
  Client,
  ClientV2 as NewClient,
  ClientOpts
} from "@vot.js/node""#;
        let result = parse_import(code).unwrap();
        assert_eq!(
            result,
            named(vec![
                NamedImport::new("Client").explicit_type(true),
                NamedImport::new("ClientV2").explicit_type(true).aliased("NewClient"),
                NamedImport::new("ClientOpts").explicit_type(true),
            ])
        );
    }

    #[test]
    fn test_import_some_with_alias() {
        let result = parse_import(r#"import { ClientOpts as RenamedOpts } from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            named(vec![NamedImport::new("ClientOpts").aliased("RenamedOpts")])
        );
    }

    #[test]
    fn test_import_with_comments_and_single_quotes() {
        let code = "import { /* the client */ Client, // trailing\n type Opts as O, } from '@vot.js/node';";
        let result = parse_import(code).unwrap();
        assert_eq!(
            result,
            named(vec![
                NamedImport::new("Client"),
                NamedImport::new("Opts").explicit_type(true).aliased("O"),
            ])
        );
    }

    #[test]
    fn test_import_names_that_are_keywords() {
        let result = parse_import(r#"import { type, default as Main, type as } from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            named(vec![
                NamedImport::new("type"),
                NamedImport::new("default").aliased("Main"),
                NamedImport::new("as").explicit_type(true),
            ])
        );

        let result = parse_import(r#"import type from "@vot.js/node""#).unwrap();
        assert_eq!(
            result,
            ImportSpec::Default {
                alias: "type".to_string(),
                from: "@vot.js/node".to_string(),
            }
        );
    }

    #[test]
    fn test_reject_default_and_named() {
        let err = parse_import(r#"import Client, { ClientOpts } from "@vot.js/node""#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid import statement"));
    }

    #[test]
    fn test_reject_side_effect_only() {
        let err = parse_import(r#"import "@vot.js/node""#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid import statement"));
    }

    #[test]
    fn test_reject_empty_clause_and_trailing_input() {
        assert!(parse_import(r#"import {} from "m""#).is_err());
        assert!(parse_import(r#"import { A } from "m"; const x = 1;"#).is_err());
        assert!(parse_import(r#"import { A } "m""#).is_err());
    }
}
