//! Resolution state shared by one chain of resolution calls

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::order::{render_declarations, Declaration};
use crate::package_json::load_package_json;

/// A named declaration inside a resolved file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeclKey {
    pub file: PathBuf,
    pub symbol: String,
}

impl DeclKey {
    pub fn new(file: impl Into<PathBuf>, symbol: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            symbol: symbol.into(),
        }
    }
}

/// Caller-owned cache of resolved declarations.
///
/// Holds the declaration text per file and symbol, the dependency edges
/// discovered between them, the keys that only forward to a declaration in
/// another file, and the root project's dependency set. Nothing
/// is evicted until [`ResolutionContext::clear`] is called.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    declarations: IndexMap<PathBuf, IndexMap<String, String>>,
    edges: IndexMap<DeclKey, Vec<DeclKey>>,
    aliases: IndexSet<DeclKey>,
    root_dependencies: Option<IndexMap<String, String>>,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, file: &Path, symbol: &str) -> bool {
        self.declarations
            .get(file)
            .is_some_and(|symbols| symbols.contains_key(symbol))
    }

    /// Whether `key` holds a declaration or forwards to one
    pub fn is_resolved(&self, key: &DeclKey) -> bool {
        self.contains(&key.file, &key.symbol) || self.aliases.contains(key)
    }

    /// Record a declaration. Returns `false` if the symbol was already
    /// present for the file, in which case the stored text is kept.
    pub fn insert(&mut self, key: &DeclKey, text: impl Into<String>) -> bool {
        let symbols = self.declarations.entry(key.file.clone()).or_default();
        if symbols.contains_key(&key.symbol) {
            return false;
        }
        symbols.insert(key.symbol.clone(), text.into());
        true
    }

    pub fn declaration(&self, key: &DeclKey) -> Option<&str> {
        self.declarations
            .get(&key.file)
            .and_then(|symbols| symbols.get(&key.symbol))
            .map(String::as_str)
    }

    /// Record that `from` structurally depends on `to`
    pub fn add_edge(&mut self, from: &DeclKey, to: DeclKey) {
        let targets = self.edges.entry(from.clone()).or_default();
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    /// Record that `from` is re-exported from `to`, which holds the text
    pub fn add_alias(&mut self, from: &DeclKey, to: DeclKey) {
        self.aliases.insert(from.clone());
        self.add_edge(from, to);
    }

    pub fn dependencies(&self, key: &DeclKey) -> &[DeclKey] {
        self.edges.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// `key` followed by everything reachable from it through recorded
    /// edges, depth-first, each key once.
    pub fn closure_of(&self, key: &DeclKey) -> Vec<DeclKey> {
        let mut seen = IndexSet::new();
        let mut stack = vec![key.clone()];

        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for next in self.dependencies(&current).iter().rev() {
                if !seen.contains(next) {
                    stack.push(next.clone());
                }
            }
        }

        seen.into_iter().collect()
    }

    /// Dependencies of the root manifest, read once per context
    pub fn root_dependencies(&mut self, root: &Path) -> &IndexMap<String, String> {
        self.root_dependencies.get_or_insert_with(|| {
            let dependencies = load_package_json(root).merged_dependencies();
            debug!("Loaded {} root dependencies from {}", dependencies.len(), root.display());
            dependencies
        })
    }

    /// Every declaration cached for `file`, ordered
    pub fn render_file(&self, file: &Path) -> String {
        let Some(symbols) = self.declarations.get(file) else {
            return String::new();
        };
        let declarations: Vec<Declaration<'_>> = symbols
            .iter()
            .map(|(name, text)| Declaration::new(name, text))
            .collect();
        render_declarations(&declarations)
    }

    /// The given declarations across any number of files, ordered
    pub fn render(&self, keys: &[DeclKey]) -> String {
        let declarations: Vec<Declaration<'_>> = keys
            .iter()
            .filter_map(|key| {
                self.declaration(key)
                    .map(|text| Declaration::new(key.symbol.as_str(), text))
            })
            .collect();
        render_declarations(&declarations)
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Drop every cached declaration, edge, alias and the root dependency set
    pub fn clear(&mut self) -> &mut Self {
        self.declarations.clear();
        self.edges.clear();
        self.aliases.clear();
        self.root_dependencies = None;
        self
    }
}
