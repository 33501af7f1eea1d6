use genx_ast::Span;
use crate::token::{Token, TokenKind};

/// The lexer/tokenizer for TypeScript source and declaration files.
pub struct Lexer<'a> {
    source: &'a str,
    chars: std::str::CharIndices<'a>,
    current_pos: usize,
    current_char: Option<char>,
    saw_newline: bool,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer from source code.
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.char_indices();
        let current_char = chars.next().map(|(_, c)| c);
        Self {
            source,
            chars,
            current_pos: 0,
            current_char,
            saw_newline: false,
        }
    }

    /// Tokenizes the entire source code and returns all tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Gets the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.saw_newline = false;
        if let Some(mut error_token) = self.skip_whitespace_and_comments() {
            error_token.newline_before = self.saw_newline;
            return error_token;
        }
        let newline_before = self.saw_newline;
        let mut token = self.read_token();
        token.newline_before = newline_before;
        token
    }

    fn read_token(&mut self) -> Token {
        let start = self.current_pos;

        let Some(ch) = self.current_char else {
            return Token::new(TokenKind::Eof, Span::new(start, start), String::new());
        };

        match ch {
            '"' | '\'' => self.read_string_literal(ch),
            '`' => self.read_template_literal(),
            '0'..='9' => self.read_number(),
            'a'..='z' | 'A'..='Z' | '_' | '$' | '#' => self.read_identifier_or_keyword(),
            '.' => self.read_dot(),
            '=' => {
                self.advance();
                match self.current_char {
                    Some('>') => {
                        self.advance();
                        self.make(TokenKind::FatArrow, start)
                    }
                    Some('=') => self.read_operator_tail(start),
                    _ => self.make(TokenKind::Eq, start),
                }
            }
            '|' | '&' => {
                self.advance();
                if matches!(self.current_char, Some('|') | Some('&') | Some('=')) {
                    self.read_operator_tail(start)
                } else if ch == '|' {
                    self.make(TokenKind::Pipe, start)
                } else {
                    self.make(TokenKind::Amp, start)
                }
            }
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            // `<` and `>` stay single so nested generics close one at a time
            '<' => self.single(TokenKind::Lt),
            '>' => self.single(TokenKind::Gt),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '?' => self.single(TokenKind::Question),
            '*' => self.single(TokenKind::Star),
            '@' => self.single(TokenKind::At),
            '+' | '-' | '/' | '%' | '!' | '~' | '^' => {
                self.advance();
                self.read_operator_tail(start)
            }
            _ if ch.is_alphabetic() => self.read_identifier_or_keyword(),
            _ => {
                self.advance();
                Token::new(
                    TokenKind::Error,
                    Span::new(start, self.current_pos),
                    format!("Unexpected character: {}", ch),
                )
            }
        }
    }

    // Helper methods

    fn advance(&mut self) {
        if let Some((pos, ch)) = self.chars.next() {
            self.current_pos = pos;
            self.current_char = Some(ch);
        } else {
            self.current_pos = self.source.len();
            self.current_char = None;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.clone().next().map(|(_, c)| c)
    }

    fn make(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(
            kind,
            Span::new(start, self.current_pos),
            self.source[start..self.current_pos].to_string(),
        )
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.current_pos;
        self.advance();
        self.make(kind, start)
    }

    /// Swallow the rest of a compound operator such as `===` or `>>>=`.
    fn read_operator_tail(&mut self, start: usize) -> Token {
        while let Some(ch) = self.current_char {
            if matches!(ch, '=' | '+' | '-' | '|' | '&' | '!' | '%' | '^') {
                self.advance();
            } else {
                break;
            }
        }
        self.make(TokenKind::Punct, start)
    }

    fn skip_whitespace_and_comments(&mut self) -> Option<Token> {
        loop {
            match self.current_char {
                Some(ch) if ch.is_whitespace() => {
                    if ch == '\n' {
                        self.saw_newline = true;
                    }
                    self.advance();
                }
                Some('/') => {
                    if self.peek() == Some('/') {
                        self.skip_single_line_comment();
                    } else if self.peek() == Some('*') {
                        let start = self.current_pos;
                        if !self.skip_multi_line_comment() {
                            return Some(Token::new(
                                TokenKind::Error,
                                Span::new(start, self.current_pos),
                                "Unterminated multi-line comment".to_string(),
                            ));
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        None
    }

    fn skip_single_line_comment(&mut self) {
        // Skip //
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn skip_multi_line_comment(&mut self) -> bool {
        // Skip /*
        self.advance();
        self.advance();

        while let Some(ch) = self.current_char {
            if ch == '*' && self.peek() == Some('/') {
                self.advance();
                self.advance();
                return true;
            }
            if ch == '\n' {
                self.saw_newline = true;
            }
            self.advance();
        }
        false
    }

    fn read_string_literal(&mut self, quote: char) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening quote

        let mut value = String::new();

        while let Some(ch) = self.current_char {
            if ch == quote {
                self.advance();
                return Token::new(TokenKind::StringLiteral, Span::new(start, self.current_pos), value);
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    value.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        '0' => '\0',
                        _ => escaped,
                    });
                    self.advance();
                }
            } else if ch == '\n' {
                break;
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            Span::new(start, self.current_pos),
            "Unterminated string literal".to_string(),
        )
    }

    fn read_template_literal(&mut self) -> Token {
        let start = self.current_pos;
        self.advance(); // Skip opening backtick

        let mut value = String::new();
        let mut depth = 0usize;

        while let Some(ch) = self.current_char {
            match ch {
                '`' if depth == 0 => {
                    self.advance();
                    return Token::new(TokenKind::TemplateLiteral, Span::new(start, self.current_pos), value);
                }
                '\\' => {
                    value.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        value.push(escaped);
                        self.advance();
                    }
                    continue;
                }
                '$' if self.peek() == Some('{') => {
                    depth += 1;
                    value.push(ch);
                    self.advance();
                }
                '}' if depth > 0 => depth -= 1,
                _ => {}
            }
            if let Some(ch) = self.current_char {
                value.push(ch);
                self.advance();
            }
        }

        Token::new(
            TokenKind::Error,
            Span::new(start, self.current_pos),
            "Unterminated template literal".to_string(),
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.current_pos;
        while let Some(ch) = self.current_char {
            let exponent_sign = matches!(ch, '+' | '-')
                && matches!(self.source[..self.current_pos].chars().last(), Some('e') | Some('E'))
                && !self.source[start..self.current_pos].starts_with("0x");
            if ch.is_ascii_alphanumeric() || ch == '_' || exponent_sign {
                self.advance();
            } else if ch == '.' && self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
        self.make(TokenKind::NumberLiteral, start)
    }

    fn read_identifier_or_keyword(&mut self) -> Token {
        let start = self.current_pos;
        self.advance();

        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                self.advance();
            } else {
                break;
            }
        }

        let value = &self.source[start..self.current_pos];
        let kind = TokenKind::keyword(value).unwrap_or(TokenKind::Identifier);
        Token::new(kind, Span::new(start, self.current_pos), value.to_string())
    }

    fn read_dot(&mut self) -> Token {
        let start = self.current_pos;
        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            return self.read_number();
        }
        self.advance();
        if self.current_char == Some('.') && self.peek() == Some('.') {
            self.advance();
            self.advance();
            return self.make(TokenKind::DotDotDot, start);
        }
        self.make(TokenKind::Dot, start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).tokenize().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_import_keywords() {
        let source = "import type { A as B } from \"m\";";
        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Import,
                TokenKind::Type,
                TokenKind::LBrace,
                TokenKind::Identifier,
                TokenKind::As,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::From,
                TokenKind::StringLiteral,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_strings() {
        let source = r#""hello" 'wor\'ld' `a ${`b`} c`"#;
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[0].value, "hello");
        assert_eq!(tokens[1].kind, TokenKind::StringLiteral);
        assert_eq!(tokens[1].value, "wor'ld");
        assert_eq!(tokens[2].kind, TokenKind::TemplateLiteral);
        assert_eq!(tokens[3].kind, TokenKind::Eof);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let tokens = Lexer::new("\"abc\nfoo").tokenize();
        assert_eq!(tokens[0].kind, TokenKind::Error);
    }

    #[test]
    fn test_comments_and_newlines() {
        let source = "type A = 1\n// comment\n/* block\n */ type B = 2";
        let tokens = Lexer::new(source).tokenize();

        assert_eq!(tokens[0].kind, TokenKind::Type);
        assert!(!tokens[1].newline_before);
        assert_eq!(tokens[4].kind, TokenKind::Type);
        assert!(tokens[4].newline_before);
        assert_eq!(tokens[5].value, "B");
    }

    #[test]
    fn test_type_operators() {
        assert_eq!(
            kinds("a | b & c => d ... x?: y[] <T>"),
            vec![
                TokenKind::Identifier,
                TokenKind::Pipe,
                TokenKind::Identifier,
                TokenKind::Amp,
                TokenKind::Identifier,
                TokenKind::FatArrow,
                TokenKind::Identifier,
                TokenKind::DotDotDot,
                TokenKind::Identifier,
                TokenKind::Question,
                TokenKind::Colon,
                TokenKind::Identifier,
                TokenKind::LBracket,
                TokenKind::RBracket,
                TokenKind::Lt,
                TokenKind::Identifier,
                TokenKind::Gt,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_compound_operators_collapse() {
        let tokens = Lexer::new("a === b || c >= 1e-3").tokenize();
        assert_eq!(tokens[1].kind, TokenKind::Punct);
        assert_eq!(tokens[1].value, "===");
        assert_eq!(tokens[3].kind, TokenKind::Punct);
        assert_eq!(tokens[3].value, "||");
        assert_eq!(tokens[6].kind, TokenKind::Eq);
        assert_eq!(tokens[7].kind, TokenKind::NumberLiteral);
        assert_eq!(tokens[7].value, "1e-3");
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let source = "import{A}from\"m\"";
        let tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[2].span.slice(source), "A");
        assert_eq!(tokens[5].span.slice(source), "\"m\"");
    }
}
