//! Token navigation helpers

use super::*;

impl Parser<'_> {
    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|token| &token.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {:?}, found {}", kind, self.describe_current())))
        }
    }

    pub(crate) fn consume_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    /// Identifier or contextual keyword used as a binding name
    pub(crate) fn parse_binding_name(&mut self) -> ParseResult<String> {
        if self.current_token().kind.is_identifier_like() {
            Ok(self.advance().value.clone())
        } else {
            Err(self.error(format!("expected identifier, found {}", self.describe_current())))
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        ParseError::new(message, self.current_token().span)
    }

    fn describe_current(&self) -> String {
        let token = self.current_token();
        match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Error => token.value.clone(),
            _ => format!("'{}'", token.value),
        }
    }
}
