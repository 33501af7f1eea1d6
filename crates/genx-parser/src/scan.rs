//! Locating import statements inside a whole source file

use super::*;

/// One top-level import statement found in a source text
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    /// Byte range of the statement, including a trailing `;`
    pub span: Span,
    /// Raw statement text
    pub text: String,
    pub spec: ParseResult<ImportSpec>,
}

/// Finds every top-level import statement in `source`, in source order.
///
/// Dynamic `import(...)` expressions and `import.meta` are not statements
/// and are skipped. Statements that do not parse are still reported, with
/// the error in `spec`, so callers can keep them untouched.
pub fn scan_imports(source: &str) -> Vec<ImportStatement> {
    let tokens = Lexer::new(source).tokenize();
    let mut statements = Vec::new();
    let mut index = 0;

    while index < tokens.len() {
        if !starts_import_statement(&tokens, index) {
            index += 1;
            continue;
        }

        let mut parser = Parser::at(&tokens, index);
        let spec = parser.parse_import_statement();
        let end = match &spec {
            Ok(_) => parser.current,
            Err(_) => recover_statement_end(&tokens, index),
        };

        let last = end.saturating_sub(1).max(index);
        let span = tokens[index].span.merge(&tokens[last].span);
        statements.push(ImportStatement {
            span,
            text: span.slice(source).to_string(),
            spec,
        });
        index = end.max(index + 1);
    }

    statements
}

fn starts_import_statement(tokens: &[Token], index: usize) -> bool {
    let token = &tokens[index];
    if token.kind != TokenKind::Import {
        return false;
    }
    if matches!(
        tokens.get(index + 1).map(|t| t.kind),
        Some(TokenKind::LParen) | Some(TokenKind::Dot)
    ) {
        return false;
    }
    match index.checked_sub(1).map(|i| &tokens[i]) {
        None => true,
        Some(prev) => {
            token.newline_before
                || matches!(prev.kind, TokenKind::Semicolon | TokenKind::RBrace)
        }
    }
}

/// End (exclusive token index) of a statement that failed to parse: the
/// module specifier plus an optional `;`, or the first line break outside
/// any brackets when no specifier is found.
fn recover_statement_end(tokens: &[Token], start: usize) -> usize {
    let mut depth = 0usize;
    let mut index = start + 1;

    while index < tokens.len() {
        let token = &tokens[index];
        match token.kind {
            TokenKind::Eof => return index,
            TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
            TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                depth = depth.saturating_sub(1);
            }
            TokenKind::Semicolon if depth == 0 => return index + 1,
            TokenKind::StringLiteral if depth == 0 => {
                let after = index + 1;
                if tokens.get(after).map(|t| t.kind) == Some(TokenKind::Semicolon) {
                    return after + 1;
                }
                return after;
            }
            _ if depth == 0 && token.newline_before && token.kind != TokenKind::From => {
                return index;
            }
            _ => {}
        }
        index += 1;
    }

    index
}
