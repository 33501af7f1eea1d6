use genx_ast::Span;

/// Token kinds needed to read import statements and type declarations.
///
/// Operators that never matter for declaration structure collapse into
/// `Punct`, keeping their text in `Token::value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Import,
    Export,
    From,
    As,
    Type,
    Interface,
    Declare,
    Default,
    Extends,
    Typeof,
    Keyof,
    Const,
    Let,
    Var,
    Function,
    Class,
    Enum,
    Namespace,
    Module,
    Abstract,

    // Literals
    StringLiteral,
    TemplateLiteral,
    NumberLiteral,

    // Identifier
    Identifier,

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Lt,                // <
    Gt,                // >
    Semicolon,         // ;
    Comma,             // ,
    Dot,               // .
    DotDotDot,         // ...
    Colon,             // :
    Question,          // ?
    Star,              // *
    Eq,                // =
    FatArrow,          // =>
    Pipe,              // |
    Amp,               // &
    At,                // @
    Punct,             // any other operator

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keyword kind for an identifier-shaped word, if any
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "from" => TokenKind::From,
            "as" => TokenKind::As,
            "type" => TokenKind::Type,
            "interface" => TokenKind::Interface,
            "declare" => TokenKind::Declare,
            "default" => TokenKind::Default,
            "extends" => TokenKind::Extends,
            "typeof" => TokenKind::Typeof,
            "keyof" => TokenKind::Keyof,
            "const" => TokenKind::Const,
            "let" => TokenKind::Let,
            "var" => TokenKind::Var,
            "function" => TokenKind::Function,
            "class" => TokenKind::Class,
            "enum" => TokenKind::Enum,
            "namespace" => TokenKind::Namespace,
            "module" => TokenKind::Module,
            "abstract" => TokenKind::Abstract,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Import
                | TokenKind::Export
                | TokenKind::From
                | TokenKind::As
                | TokenKind::Type
                | TokenKind::Interface
                | TokenKind::Declare
                | TokenKind::Default
                | TokenKind::Extends
                | TokenKind::Typeof
                | TokenKind::Keyof
                | TokenKind::Const
                | TokenKind::Let
                | TokenKind::Var
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::Enum
                | TokenKind::Namespace
                | TokenKind::Module
                | TokenKind::Abstract
        )
    }

    /// Identifiers and contextual keywords both name things in TypeScript
    pub fn is_identifier_like(&self) -> bool {
        *self == TokenKind::Identifier || self.is_keyword()
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
    /// A line break separates this token from the previous one
    pub newline_before: bool,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self {
            kind,
            span,
            value,
            newline_before: false,
        }
    }
}
