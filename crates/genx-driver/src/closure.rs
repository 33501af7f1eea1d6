//! Dependency closure over type declarations

use std::path::Path;

use genx_ast::ImportSpec;
use indexmap::IndexSet;
use tracing::{debug, warn};

use crate::context::{DeclKey, ResolutionContext};
use crate::error::{GenError, GenResult};
use crate::introspect::{find_references, TypeIntrospector};
use crate::resolver::ModuleResolver;

/// Pulls a declaration and everything it structurally references into a
/// [`ResolutionContext`].
pub struct ClosureBuilder<'a> {
    introspector: &'a dyn TypeIntrospector,
    resolver: &'a ModuleResolver,
}

impl<'a> ClosureBuilder<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector, resolver: &'a ModuleResolver) -> Self {
        Self {
            introspector,
            resolver,
        }
    }

    /// Resolve every item of a named import against `file`.
    ///
    /// Returns the declarations the import needs, each once: the requested
    /// symbols followed by their dependencies across files, including ones
    /// an earlier call already cached.
    pub fn resolve_import(
        &self,
        ctx: &mut ResolutionContext,
        spec: &ImportSpec,
        file: &Path,
    ) -> GenResult<Vec<DeclKey>> {
        let ImportSpec::Named { items, .. } = spec else {
            return Err(GenError::UnsupportedImportKind {
                kind: spec.kind_name(),
                from: spec.from().to_string(),
            });
        };

        let mut keys = IndexSet::new();
        for item in items {
            let key = DeclKey::new(file, item.content.as_str());
            self.resolve_symbol(ctx, &key);
            keys.extend(ctx.closure_of(&key));
        }

        Ok(keys
            .into_iter()
            .filter(|key| ctx.declaration(key).is_some())
            .collect())
    }

    /// Cache `key` and, recursively, every declaration it references.
    ///
    /// A declaration reached through a re-export is cached under the file
    /// that declares it, with `key` forwarding there. A symbol missing from
    /// its file is logged and skipped; it never stops sibling branches.
    pub fn resolve_symbol(&self, ctx: &mut ResolutionContext, key: &DeclKey) {
        if ctx.is_resolved(key) {
            debug!("{} in {} already resolved", key.symbol, key.file.display());
            return;
        }

        let Some(declaration) = self.introspector.declaration(&key.file, &key.symbol) else {
            warn!("No type declaration {} in {}", key.symbol, key.file.display());
            return;
        };

        let declared = DeclKey::new(declaration.file.as_path(), key.symbol.as_str());
        if declared != *key {
            debug!(
                "{} in {} is declared in {}",
                key.symbol,
                key.file.display(),
                declared.file.display()
            );
            ctx.add_alias(key, declared.clone());
            if ctx.is_resolved(&declared) {
                return;
            }
        }

        // Precondition for the recursion below: the symbol is cached before
        // its dependencies are visited, so a cycle leading back to it stops
        // at the `is_resolved` check above.
        ctx.insert(&declared, declaration.text.as_str());

        for type_text in declaration.type_texts() {
            for reference in find_references(type_text) {
                let file = match self.resolver.resolve_reference(ctx, &reference.module, &declared.file) {
                    Ok(file) => file,
                    Err(err) => {
                        warn!("Cannot resolve {} from {}: {}", reference.name, reference.module, err);
                        continue;
                    }
                };

                let dependency = DeclKey::new(file, reference.name);
                if dependency != declared {
                    ctx.add_edge(&declared, dependency.clone());
                }
                self.resolve_symbol(ctx, &dependency);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::{reference_marker, PropertyType, TypeDeclaration};
    use crate::options::GenOptions;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// In-memory declarations keyed by (file, symbol), counting lookups
    #[derive(Default)]
    struct FakeIntrospector {
        declarations: HashMap<(PathBuf, String), TypeDeclaration>,
        lookups: RefCell<usize>,
    }

    impl FakeIntrospector {
        fn add(&mut self, file: &str, name: &str, text: &str, refs: &[(&str, &str)]) {
            let properties = refs
                .iter()
                .map(|(module, target)| PropertyType::new(target.to_lowercase(), reference_marker(module, target)))
                .collect();
            self.declarations.insert(
                (PathBuf::from(file), name.to_string()),
                TypeDeclaration {
                    name: name.to_string(),
                    file: PathBuf::from(file),
                    text: text.to_string(),
                    properties,
                    base_types: Vec::new(),
                },
            );
        }
    }

    impl FakeIntrospector {
        /// Make `name` visible from `barrel` while declared in `file`
        fn reexport(&mut self, barrel: &str, file: &str, name: &str) {
            let found = self.declarations[&(PathBuf::from(file), name.to_string())].clone();
            self.declarations.insert((PathBuf::from(barrel), name.to_string()), found);
        }
    }

    impl TypeIntrospector for FakeIntrospector {
        fn declaration(&self, file: &Path, symbol: &str) -> Option<TypeDeclaration> {
            *self.lookups.borrow_mut() += 1;
            self.declarations.get(&(file.to_path_buf(), symbol.to_string())).cloned()
        }
    }

    fn named(items: &[&str]) -> ImportSpec {
        ImportSpec::Named {
            items: items.iter().map(|i| genx_ast::NamedImport::new(*i)).collect(),
            from: "./m".to_string(),
        }
    }

    #[test]
    fn test_closure_spans_files() {
        let mut fake = FakeIntrospector::default();
        fake.add("/p/one.ts", "One", "type One = { two: Two };", &[("/p/two.ts", "Two")]);
        fake.add("/p/two.ts", "Two", "type Two = 1 | 2;", &[]);
        let resolver = ModuleResolver::new(&GenOptions::new("/p"));
        let builder = ClosureBuilder::new(&fake, &resolver);

        let mut ctx = ResolutionContext::new();
        let keys = builder.resolve_import(&mut ctx, &named(&["One"]), Path::new("/p/one.ts")).unwrap();
        assert_eq!(
            keys,
            vec![DeclKey::new("/p/one.ts", "One"), DeclKey::new("/p/two.ts", "Two")]
        );
        assert_eq!(ctx.render(&keys), "type Two = 1 | 2;\ntype One = { two: Two };");
    }

    #[test]
    fn test_cycle_terminates_and_cached_imports_keep_closure() {
        let mut fake = FakeIntrospector::default();
        fake.add("/p/a.ts", "A", "type A = { b: B };", &[("/p/b.ts", "B")]);
        fake.add("/p/b.ts", "B", "type B = { a: A };", &[("/p/a.ts", "A")]);
        let resolver = ModuleResolver::new(&GenOptions::new("/p"));
        let builder = ClosureBuilder::new(&fake, &resolver);

        let mut ctx = ResolutionContext::new();
        let first = builder.resolve_import(&mut ctx, &named(&["A"]), Path::new("/p/a.ts")).unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(*fake.lookups.borrow(), 2);

        let again = builder.resolve_import(&mut ctx, &named(&["A"]), Path::new("/p/a.ts")).unwrap();
        assert_eq!(again, first);
        assert_eq!(*fake.lookups.borrow(), 2);
    }

    #[test]
    fn test_missing_symbols_are_skipped() {
        let mut fake = FakeIntrospector::default();
        fake.add("/p/a.ts", "A", "type A = { gone: Gone };", &[("/p/gone.ts", "Gone")]);
        let resolver = ModuleResolver::new(&GenOptions::new("/p"));
        let builder = ClosureBuilder::new(&fake, &resolver);

        let mut ctx = ResolutionContext::new();
        let keys = builder
            .resolve_import(&mut ctx, &named(&["A", "Nope"]), Path::new("/p/a.ts"))
            .unwrap();
        assert_eq!(keys, vec![DeclKey::new("/p/a.ts", "A")]);
    }

    #[test]
    fn test_default_and_namespace_imports_are_rejected() {
        let fake = FakeIntrospector::default();
        let resolver = ModuleResolver::new(&GenOptions::new("/p"));
        let builder = ClosureBuilder::new(&fake, &resolver);
        let mut ctx = ResolutionContext::new();

        let default = ImportSpec::Default {
            alias: "Client".to_string(),
            from: "@vot.js/node".to_string(),
        };
        assert!(matches!(
            builder.resolve_import(&mut ctx, &default, Path::new("/p/a.ts")),
            Err(GenError::UnsupportedImportKind { kind: "default", .. })
        ));

        let namespace = ImportSpec::NamespaceAll {
            alias: "Client".to_string(),
            from: "@vot.js/node".to_string(),
        };
        assert!(matches!(
            builder.resolve_import(&mut ctx, &namespace, Path::new("/p/a.ts")),
            Err(GenError::UnsupportedImportKind { kind: "namespace", .. })
        ));
    }

    #[test]
    fn test_reexported_declarations_are_cached_once() {
        let mut fake = FakeIntrospector::default();
        fake.add("/p/types.ts", "Shared", "type Shared = { id: number };", &[]);
        fake.add("/p/a.ts", "A", "type A = { shared: Shared };", &[("/p/types.ts", "Shared")]);
        fake.reexport("/p/index.ts", "/p/types.ts", "Shared");
        fake.reexport("/p/index.ts", "/p/a.ts", "A");
        let resolver = ModuleResolver::new(&GenOptions::new("/p"));
        let builder = ClosureBuilder::new(&fake, &resolver);

        let mut ctx = ResolutionContext::new();
        let keys = builder
            .resolve_import(&mut ctx, &named(&["A", "Shared"]), Path::new("/p/index.ts"))
            .unwrap();
        assert_eq!(
            keys,
            vec![DeclKey::new("/p/a.ts", "A"), DeclKey::new("/p/types.ts", "Shared")]
        );
        assert!(!ctx.contains(Path::new("/p/index.ts"), "Shared"));
        assert_eq!(
            ctx.render(&keys),
            "type Shared = { id: number };\ntype A = { shared: Shared };"
        );

        let lookups = *fake.lookups.borrow();
        builder
            .resolve_import(&mut ctx, &named(&["Shared"]), Path::new("/p/index.ts"))
            .unwrap();
        assert_eq!(*fake.lookups.borrow(), lookups);
    }
}
