//! Type declaration introspection
//!
//! [`TypeIntrospector`] is the seam the closure builder reads declarations
//! through. [`SourceIntrospector`] implements it over the `genx-lexer`
//! token stream of `.ts` and `.d.ts` files.
//!
//! Types a declaration refers to are reported as cross-module references
//! of the form `import("<module>").<Name>`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use genx_ast::ImportSpec;
use genx_lexer::{Lexer, Token, TokenKind};
use genx_parser::scan_imports;
use indexmap::IndexMap;
use regex::Regex;
use tracing::debug;

use crate::locator::{is_relative_specifier, locate, resolve_relative};

static REFERENCE_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"import\("([^"]+)"\)\.([A-Za-z_$][\w$]*)"#).expect("reference marker pattern is valid")
});

/// How many `export … from` hops are followed looking for a symbol
const MAX_REEXPORT_DEPTH: usize = 8;

/// Reads named type declarations out of source files
pub trait TypeIntrospector {
    /// Declaration of `symbol` in `file`, or `None` if the file has none
    fn declaration(&self, file: &Path, symbol: &str) -> Option<TypeDeclaration>;
}

/// One property of an object-shaped declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyType {
    pub name: String,
    pub type_text: String,
}

impl PropertyType {
    pub fn new(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
        }
    }
}

/// A type alias or interface as found in source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    pub name: String,
    /// File the declaration is written in, which differs from the queried
    /// file when it was reached through `export … from`
    pub file: PathBuf,
    /// Declaration text exactly as written, modifiers included
    pub text: String,
    pub properties: Vec<PropertyType>,
    /// Non-object union/intersection members and `extends` clauses
    pub base_types: Vec<String>,
}

impl TypeDeclaration {
    /// Every type text that may carry cross-module references
    pub fn type_texts(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .map(|p| p.type_text.as_str())
            .chain(self.base_types.iter().map(String::as_str))
    }
}

/// A type referenced from another module
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub module: String,
    pub name: String,
}

pub fn reference_marker(module: &str, name: &str) -> String {
    format!("import(\"{}\").{}", module, name)
}

/// Every cross-module reference in `type_text`, in order of appearance
pub fn find_references(type_text: &str) -> Vec<TypeReference> {
    REFERENCE_MARKER
        .captures_iter(type_text)
        .map(|captures| TypeReference {
            module: captures[1].to_string(),
            name: captures[2].to_string(),
        })
        .collect()
}

/// Token-based introspector for TypeScript sources and declaration files.
///
/// Recognizes top-level `type` aliases and `interface` declarations, with
/// or without `export` and `declare`. Names imported into the file or
/// declared in it are reported as cross-module references.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceIntrospector;

impl SourceIntrospector {
    pub fn new() -> Self {
        Self
    }

    fn find(&self, file: &Path, symbol: &str, depth: usize) -> Option<TypeDeclaration> {
        let source = match fs::read_to_string(file) {
            Ok(source) => source,
            Err(err) => {
                debug!("Cannot read {}: {}", file.display(), err);
                return None;
            }
        };

        let parsed = SourceFile::parse(file, &source);
        if let Some(found) = parsed.declaration(symbol) {
            return Some(found);
        }
        if depth >= MAX_REEXPORT_DEPTH {
            return None;
        }

        parsed
            .reexport_sources(symbol)
            .into_iter()
            .find_map(|target| self.find(&target, symbol, depth + 1))
    }
}

impl TypeIntrospector for SourceIntrospector {
    fn declaration(&self, file: &Path, symbol: &str) -> Option<TypeDeclaration> {
        self.find(file, symbol, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SiteKind {
    /// Index of the `=`
    Alias { eq: usize },
    /// Index of the body's `{` and the `extends` keyword if any
    Interface { open: usize, extends: Option<usize> },
}

/// Token range of one top-level declaration
#[derive(Debug, Clone)]
struct DeclarationSite {
    name: String,
    kind: SiteKind,
    start: usize,
    /// Exclusive
    end: usize,
}

struct SourceFile<'s> {
    path: &'s Path,
    source: &'s str,
    tokens: Vec<Token>,
    sites: Vec<DeclarationSite>,
    /// Local name → (marker module, exported name)
    imports: IndexMap<String, (String, String)>,
}

impl<'s> SourceFile<'s> {
    fn parse(path: &'s Path, source: &'s str) -> Self {
        let tokens = Lexer::new(source).tokenize();
        let sites = collect_sites(&tokens);
        let imports = collect_imports(path, source);
        Self {
            path,
            source,
            tokens,
            sites,
            imports,
        }
    }

    fn kind(&self, index: usize) -> TokenKind {
        self.tokens.get(index).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn declaration(&self, symbol: &str) -> Option<TypeDeclaration> {
        let site = self.sites.iter().find(|s| s.name == symbol)?;
        let text = self.text(site.start, site.end);

        let (properties, base_types) = match site.kind {
            SiteKind::Alias { eq } => {
                let mut body_end = site.end;
                if self.kind(body_end.saturating_sub(1)) == TokenKind::Semicolon {
                    body_end -= 1;
                }
                self.alias_shape(eq + 1, body_end)
            }
            SiteKind::Interface { open, extends } => {
                let close = site.end - 1;
                let base_types = match extends {
                    Some(keyword) => self
                        .split_at_depth(keyword + 1, open, |k| k == TokenKind::Comma)
                        .into_iter()
                        .map(|(from, to)| self.rewrite(from, to))
                        .filter(|t| !t.is_empty())
                        .collect(),
                    None => Vec::new(),
                };
                (self.members(open, close), base_types)
            }
        };

        Some(TypeDeclaration {
            name: site.name.clone(),
            file: self.path.to_path_buf(),
            text,
            properties,
            base_types,
        })
    }

    /// Object literal constituents become properties, everything else a
    /// base type.
    fn alias_shape(&self, from: usize, to: usize) -> (Vec<PropertyType>, Vec<String>) {
        let mut properties = Vec::new();
        let mut base_types = Vec::new();

        let constituents = self.split_at_depth(from, to, |k| matches!(k, TokenKind::Pipe | TokenKind::Amp));
        for (start, end) in constituents {
            if start >= end {
                continue;
            }
            if self.kind(start) == TokenKind::LBrace && self.matching_close(start) == Some(end - 1) {
                properties.extend(self.members(start, end - 1));
            } else {
                let text = self.rewrite(start, end);
                if !text.is_empty() {
                    base_types.push(text);
                }
            }
        }

        (properties, base_types)
    }

    /// Properties of the object literal between `open` and `close`
    fn members(&self, open: usize, close: usize) -> Vec<PropertyType> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = open + 1;
        let mut seen_colon = false;

        for index in open + 1..close {
            let token = &self.tokens[index];
            if depth == 0 {
                let separator = matches!(token.kind, TokenKind::Semicolon | TokenKind::Comma);
                if separator {
                    ranges.push((start, index));
                    start = index + 1;
                    seen_colon = false;
                    continue;
                }
                if token.newline_before && seen_colon && index > start && self.starts_member(index) {
                    ranges.push((start, index));
                    start = index;
                    seen_colon = false;
                }
                if token.kind == TokenKind::Colon {
                    seen_colon = true;
                }
            }
            depth = apply_depth(depth, token.kind, true);
        }
        ranges.push((start, close));

        ranges
            .into_iter()
            .filter(|(from, to)| from < to)
            .filter_map(|(from, to)| self.property(from, to))
            .collect()
    }

    fn starts_member(&self, index: usize) -> bool {
        let previous = self.kind(index - 1);
        let continues = matches!(
            previous,
            TokenKind::Pipe
                | TokenKind::Amp
                | TokenKind::Colon
                | TokenKind::FatArrow
                | TokenKind::Question
                | TokenKind::Eq
                | TokenKind::Lt
                | TokenKind::Dot
        );
        let kind = self.kind(index);
        !continues
            && (kind.is_identifier_like()
                || matches!(kind, TokenKind::StringLiteral | TokenKind::NumberLiteral | TokenKind::LBracket))
    }

    fn property(&self, from: usize, to: usize) -> Option<PropertyType> {
        let mut depth = 0usize;
        let colon = (from..to).find(|&index| {
            let kind = self.kind(index);
            let found = depth == 0 && kind == TokenKind::Colon;
            depth = apply_depth(depth, kind, true);
            found
        })?;
        if colon == from {
            return None;
        }

        let raw_name = self.text(from, colon);
        let name = raw_name.strip_prefix("readonly ").unwrap_or(raw_name.as_str());
        let name = name.trim_end_matches('?').trim();
        let name = name.trim_matches(|c| c == '"' || c == '\'');

        Some(PropertyType::new(name, self.rewrite(colon + 1, to)))
    }

    /// Ranges between separator tokens at nesting depth zero
    fn split_at_depth(&self, from: usize, to: usize, is_separator: impl Fn(TokenKind) -> bool) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut depth = 0usize;
        let mut start = from;

        for index in from..to {
            let kind = self.kind(index);
            if depth == 0 && is_separator(kind) {
                ranges.push((start, index));
                start = index + 1;
                continue;
            }
            depth = apply_depth(depth, kind, true);
        }
        ranges.push((start, to));
        ranges
    }

    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in open..self.tokens.len() {
            let kind = self.kind(index);
            depth = apply_depth(depth, kind, false);
            if depth == 0 && index > open {
                return Some(index);
            }
            if kind == TokenKind::Eof {
                break;
            }
        }
        None
    }

    /// Source text of tokens `from..to`
    fn text(&self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        let start = self.tokens[from].span.start;
        let end = self.tokens[to - 1].span.end;
        self.source[start..end].to_string()
    }

    /// Source text of tokens `from..to` with known type names replaced by
    /// cross-module references
    fn rewrite(&self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        let mut out = String::new();
        let mut cursor = self.tokens[from].span.start;

        for index in from..to {
            let token = &self.tokens[index];
            out.push_str(&self.source[cursor..token.span.start]);
            match self.marker_for(index) {
                Some(marker) => out.push_str(&marker),
                None => out.push_str(&self.source[token.span.start..token.span.end]),
            }
            cursor = token.span.end;
        }

        out.trim().to_string()
    }

    fn marker_for(&self, index: usize) -> Option<String> {
        let token = &self.tokens[index];
        if token.kind != TokenKind::Identifier {
            return None;
        }
        let qualified = index > 0 && self.kind(index - 1) == TokenKind::Dot;
        let qualifier = self.kind(index + 1) == TokenKind::Dot;
        let property_key = self.kind(index + 1) == TokenKind::Colon
            || (self.kind(index + 1) == TokenKind::Question && self.kind(index + 2) == TokenKind::Colon);
        if qualified || qualifier || property_key {
            return None;
        }

        if let Some((module, exported)) = self.imports.get(&token.value) {
            return Some(reference_marker(module, exported));
        }
        if self.sites.iter().any(|s| s.name == token.value) {
            return Some(reference_marker(&self.path.display().to_string(), &token.value));
        }
        None
    }

    /// Files an `export … from` statement may forward `symbol` from
    fn reexport_sources(&self, symbol: &str) -> Vec<PathBuf> {
        let mut sources = Vec::new();
        let mut depth = 0usize;

        for index in 0..self.tokens.len() {
            let kind = self.kind(index);
            if depth == 0 && kind == TokenKind::Export {
                let mut cursor = index + 1;
                if self.kind(cursor) == TokenKind::Type {
                    cursor += 1;
                }
                let forwards = match self.kind(cursor) {
                    TokenKind::Star if self.kind(cursor + 1) == TokenKind::From => {
                        cursor += 1;
                        true
                    }
                    TokenKind::LBrace => match self.matching_close(cursor) {
                        Some(close) => {
                            let named = self.reexports_name(cursor + 1, close, symbol);
                            cursor = close + 1;
                            named && self.kind(cursor) == TokenKind::From
                        }
                        None => false,
                    },
                    _ => false,
                };

                let specifier = self.tokens.get(cursor + 1).filter(|t| t.kind == TokenKind::StringLiteral);
                if let (true, Some(specifier)) = (forwards, specifier) {
                    if is_relative_specifier(&specifier.value) {
                        sources.push(locate(&resolve_relative(&specifier.value, self.path)));
                    }
                }
            }
            depth = apply_depth(depth, kind, false);
        }

        sources
    }

    /// Whether `{ … }` between `from` and `to` exports `symbol` unrenamed
    fn reexports_name(&self, from: usize, to: usize, symbol: &str) -> bool {
        self.split_at_depth(from, to, |k| k == TokenKind::Comma)
            .into_iter()
            .any(|(start, end)| {
                let names: Vec<&str> = (start..end)
                    .map(|i| &self.tokens[i])
                    .filter(|t| t.kind.is_identifier_like())
                    .map(|t| t.value.as_str())
                    .collect();
                match names.as_slice() {
                    [name] | ["type", name] => *name == symbol,
                    [name, "as", alias] | ["type", name, "as", alias] => *name == symbol && *alias == symbol,
                    _ => false,
                }
            })
    }
}

/// Nesting depth after `kind`; angle brackets count only in type positions
fn apply_depth(depth: usize, kind: TokenKind, angles: bool) -> usize {
    match kind {
        TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth + 1,
        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => depth.saturating_sub(1),
        TokenKind::Lt if angles => depth + 1,
        TokenKind::Gt if angles => depth.saturating_sub(1),
        _ => depth,
    }
}

fn is_statement_start(tokens: &[Token], index: usize) -> bool {
    match index.checked_sub(1) {
        None => true,
        Some(previous) => {
            tokens[index].newline_before
                || matches!(tokens[previous].kind, TokenKind::Semicolon | TokenKind::RBrace)
        }
    }
}

fn kind_at(tokens: &[Token], index: usize) -> TokenKind {
    tokens.get(index).map_or(TokenKind::Eof, |t| t.kind)
}

/// Top-level type aliases and interfaces in source order
fn collect_sites(tokens: &[Token]) -> Vec<DeclarationSite> {
    let mut sites = Vec::new();
    let mut depth = 0usize;
    let mut index = 0;

    while index < tokens.len() {
        if depth == 0 && is_statement_start(tokens, index) {
            if let Some(site) = declaration_site(tokens, index) {
                index = site.end.max(index + 1);
                sites.push(site);
                continue;
            }
        }
        depth = apply_depth(depth, tokens[index].kind, false);
        index += 1;
    }

    sites
}

fn declaration_site(tokens: &[Token], start: usize) -> Option<DeclarationSite> {
    let mut cursor = start;
    if kind_at(tokens, cursor) == TokenKind::Export {
        cursor += 1;
    }
    if kind_at(tokens, cursor) == TokenKind::Declare {
        cursor += 1;
    }

    let keyword = kind_at(tokens, cursor);
    let name_token = tokens.get(cursor + 1).filter(|t| t.kind.is_identifier_like())?;
    let name = name_token.value.clone();
    let after_name = skip_type_parameters(tokens, cursor + 2);

    match keyword {
        TokenKind::Type if kind_at(tokens, after_name) == TokenKind::Eq => Some(DeclarationSite {
            name,
            kind: SiteKind::Alias { eq: after_name },
            start,
            end: alias_end(tokens, after_name + 1),
        }),
        TokenKind::Interface => {
            let mut open = after_name;
            let mut extends = None;
            let mut depth = 0usize;
            loop {
                let kind = kind_at(tokens, open);
                match kind {
                    TokenKind::Eof => return None,
                    TokenKind::LBrace if depth == 0 => break,
                    TokenKind::Extends if depth == 0 && extends.is_none() => extends = Some(open),
                    _ => {}
                }
                depth = apply_depth(depth, kind, true);
                open += 1;
            }
            let close = interface_close(tokens, open)?;
            Some(DeclarationSite {
                name,
                kind: SiteKind::Interface { open, extends },
                start,
                end: close + 1,
            })
        }
        _ => None,
    }
}

fn skip_type_parameters(tokens: &[Token], index: usize) -> usize {
    if kind_at(tokens, index) != TokenKind::Lt {
        return index;
    }
    let mut depth = 0usize;
    let mut cursor = index;
    loop {
        let kind = kind_at(tokens, cursor);
        if kind == TokenKind::Eof {
            return cursor;
        }
        depth = apply_depth(depth, kind, true);
        cursor += 1;
        if depth == 0 {
            return cursor;
        }
    }
}

fn interface_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            TokenKind::Eof => return None,
            _ => {}
        }
    }
    None
}

/// Exclusive end of an alias body starting at `from`: a `;` at depth zero
/// (included), the next statement on a new line, or the end of the
/// enclosing block.
fn alias_end(tokens: &[Token], from: usize) -> usize {
    let mut depth = 0usize;
    let mut index = from;

    while index < tokens.len() {
        let token = &tokens[index];
        match token.kind {
            TokenKind::Eof => return index,
            TokenKind::Semicolon if depth == 0 => return index + 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace if depth == 0 => return index,
            _ if depth == 0 && index > from && token.newline_before && starts_statement(tokens, index) => {
                return index;
            }
            kind => depth = apply_depth(depth, kind, false),
        }
        index += 1;
    }

    index
}

fn starts_statement(tokens: &[Token], index: usize) -> bool {
    let next_names = kind_at(tokens, index + 1).is_identifier_like();
    match kind_at(tokens, index) {
        TokenKind::Export | TokenKind::Import | TokenKind::Declare => true,
        TokenKind::Const | TokenKind::Let | TokenKind::Var | TokenKind::Function | TokenKind::Class | TokenKind::Enum => true,
        TokenKind::Type | TokenKind::Interface | TokenKind::Namespace | TokenKind::Abstract => next_names,
        _ => false,
    }
}

/// Named imports of a file, keyed by local binding name
fn collect_imports(path: &Path, source: &str) -> IndexMap<String, (String, String)> {
    let mut imports = IndexMap::new();

    for statement in scan_imports(source) {
        let Ok(ImportSpec::Named { items, from }) = statement.spec else {
            continue;
        };
        let module = if is_relative_specifier(&from) {
            resolve_relative(&from, path).display().to_string()
        } else {
            from
        };
        for item in items {
            imports.insert(item.local_name().to_string(), (module.clone(), item.content.clone()));
        }
    }

    imports
}
