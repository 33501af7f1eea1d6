//! Import statement parser

use super::*;

/// Recursive descent parser over a token stream
pub struct Parser<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) current: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser over a token stream
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, current: 0 }
    }

    pub(crate) fn at(tokens: &'a [Token], current: usize) -> Self {
        Self { tokens, current }
    }

    /// Parses exactly one import statement, rejecting trailing input
    pub fn parse_single_import(&mut self) -> ParseResult<ImportSpec> {
        let spec = self.parse_import_statement()?;
        if !self.is_at_end() {
            return Err(self.error(format!(
                "unexpected '{}' after import statement",
                self.current_token().value
            )));
        }
        Ok(spec)
    }

    /// Parses one import statement starting at the `import` keyword.
    ///
    /// Supported shapes: default, namespace and named bindings, each
    /// optionally preceded by a clause-wide `type`. Side-effect imports and
    /// statements mixing a default binding with other bindings are errors.
    pub fn parse_import_statement(&mut self) -> ParseResult<ImportSpec> {
        let start = self.current_token().span;
        self.consume(TokenKind::Import)?;

        // `import type from "m"` binds a default named `type`
        let clause_type = self.check(&TokenKind::Type)
            && !matches!(self.peek_kind(1), Some(TokenKind::From) | Some(TokenKind::Comma));
        if clause_type {
            self.advance();
        }

        if self.check(&TokenKind::StringLiteral) {
            return Err(ParseError::new(
                "side-effect import declares no bindings",
                start.merge(&self.current_token().span),
            ));
        }

        let kind = self.current_token().kind;
        let spec = match kind {
            TokenKind::Star => {
                self.advance();
                self.consume(TokenKind::As)?;
                let alias = self.parse_binding_name()?;
                let from = self.parse_from_clause()?;
                ImportSpec::NamespaceAll { alias, from }
            }
            TokenKind::LBrace => {
                let items = self.parse_named_clause(clause_type)?;
                let from = self.parse_from_clause()?;
                ImportSpec::Named { items, from }
            }
            _ if kind.is_identifier_like() => {
                let alias = self.parse_binding_name()?;
                if self.check(&TokenKind::Comma) {
                    return Err(ParseError::new(
                        "mixing a default binding with other bindings is not supported",
                        start.merge(&self.current_token().span),
                    ));
                }
                let from = self.parse_from_clause()?;
                ImportSpec::Default { alias, from }
            }
            _ => {
                return Err(self.error(format!(
                    "expected import bindings, found '{}'",
                    self.current_token().value
                )))
            }
        };

        self.consume_semicolon();
        Ok(spec)
    }

    /// `{ A, type B, C as D }`
    fn parse_named_clause(&mut self, clause_type: bool) -> ParseResult<Vec<NamedImport>> {
        let open = self.consume(TokenKind::LBrace)?.span;
        let mut items = Vec::new();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            items.push(self.parse_named_fragment(clause_type)?);
            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }

        let close = self.consume(TokenKind::RBrace)?.span;
        if items.is_empty() {
            return Err(ParseError::new("empty import clause declares no bindings", open.merge(&close)));
        }
        Ok(items)
    }

    fn parse_named_fragment(&mut self, clause_type: bool) -> ParseResult<NamedImport> {
        let fragment_type = self.check(&TokenKind::Type) && self.starts_type_modifier();
        if fragment_type {
            self.advance();
        }

        let content = if self.check(&TokenKind::StringLiteral) {
            self.advance().value.clone()
        } else {
            self.parse_binding_name()?
        };

        let alias = if self.check(&TokenKind::As) {
            self.advance();
            self.parse_binding_name()?
        } else {
            String::new()
        };

        Ok(NamedImport {
            is_explicit_type: clause_type || fragment_type,
            alias,
            content,
        })
    }

    /// Whether the `type` under the cursor modifies the next name rather than
    /// being the imported name itself (`{ type }`, `{ type as T }`).
    fn starts_type_modifier(&self) -> bool {
        match self.peek_kind(1) {
            Some(TokenKind::Comma) | Some(TokenKind::RBrace) | None => false,
            // `type as as X` and `type as` vs `type as X`
            Some(TokenKind::As) => match self.peek_kind(2) {
                Some(TokenKind::As) => true,
                Some(kind) => !kind.is_identifier_like(),
                None => true,
            },
            Some(kind) => kind.is_identifier_like() || *kind == TokenKind::StringLiteral,
        }
    }

    fn parse_from_clause(&mut self) -> ParseResult<String> {
        self.consume(TokenKind::From)?;
        Ok(self.consume(TokenKind::StringLiteral)?.value.clone())
    }
}
