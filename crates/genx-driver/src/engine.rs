//! Generation entry points
//!
//! [`Generator`] wires the resolver, the closure builder and the two seams
//! together. It holds no resolution state itself; every call takes the
//! caller's [`ResolutionContext`].

use std::fs;
use std::path::{Path, PathBuf};

use genx_ast::ImportSpec;
use genx_parser::{parse_import, scan_imports};
use indexmap::IndexSet;
use tracing::{error, info};

use crate::closure::ClosureBuilder;
use crate::context::{DeclKey, ResolutionContext};
use crate::emitter::{InlineEmitter, SchemaEmitter};
use crate::error::{GenError, GenResult};
use crate::introspect::{SourceIntrospector, TypeIntrospector};
use crate::locator::{normalize_path, DECLARATION_SUFFIX};
use crate::options::GenOptions;
use crate::resolver::ModuleResolver;

/// Source text with its resolvable imports replaced by declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlinedSource {
    /// Text handed to the schema emitter
    pub source: String,
    /// Import statements that could not be inlined, in source order
    pub preserved_imports: Vec<String>,
}

/// Outcome of a directory run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, GenError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct Generator {
    options: GenOptions,
    resolver: ModuleResolver,
    introspector: Box<dyn TypeIntrospector>,
    emitter: Box<dyn SchemaEmitter>,
}

impl Generator {
    pub fn new(options: GenOptions) -> Self {
        Self {
            resolver: ModuleResolver::new(&options),
            options,
            introspector: Box::new(SourceIntrospector::new()),
            emitter: Box::new(InlineEmitter),
        }
    }

    pub fn with_introspector(mut self, introspector: impl TypeIntrospector + 'static) -> Self {
        self.introspector = Box::new(introspector);
        self
    }

    pub fn with_emitter(mut self, emitter: impl SchemaEmitter + 'static) -> Self {
        self.emitter = Box::new(emitter);
        self
    }

    /// Declarations one import statement needs, in dependency-closure order
    pub fn resolve_import(
        &self,
        ctx: &mut ResolutionContext,
        statement: &str,
        file: Option<&Path>,
    ) -> GenResult<Vec<DeclKey>> {
        let spec = parse_import(statement)?;
        self.resolve_spec(ctx, &spec, file)
    }

    /// Rendered declarations for one import statement.
    ///
    /// Any failure is logged and yields an empty string, leaving the
    /// statement for the caller to keep.
    pub fn import_content(&self, ctx: &mut ResolutionContext, statement: &str, file: Option<&Path>) -> String {
        match self.resolve_import(ctx, statement, file) {
            Ok(keys) => ctx.render(&keys),
            Err(err) => {
                error!("Failed to get import content, because {}", err);
                String::new()
            }
        }
    }

    fn resolve_spec(
        &self,
        ctx: &mut ResolutionContext,
        spec: &ImportSpec,
        file: Option<&Path>,
    ) -> GenResult<Vec<DeclKey>> {
        let Some(source) = self.resolver.resolve_import_source(ctx, spec.from(), file)? else {
            return Ok(Vec::new());
        };
        ClosureBuilder::new(&*self.introspector, &self.resolver).resolve_import(ctx, spec, &source)
    }

    /// Remove every import statement from `code` and put the declarations
    /// of the resolvable ones in front of what remains. Items imported under
    /// another name get a `type <alias> = <name>;` line after the block.
    pub fn inline_imports(&self, ctx: &mut ResolutionContext, code: &str, file: Option<&Path>) -> InlinedSource {
        let mut keys = IndexSet::new();
        let mut renames = IndexSet::new();
        let mut preserved_imports = Vec::new();
        let mut remaining = String::with_capacity(code.len());
        let mut cursor = 0;

        for statement in scan_imports(code) {
            let resolved = match &statement.spec {
                Ok(spec) => self.resolve_spec(ctx, spec, file),
                Err(err) => Err(GenError::MalformedImport(err.clone())),
            };

            match resolved {
                Ok(found) if !found.is_empty() => {
                    if let Ok(spec) = &statement.spec {
                        renames.extend(local_renames(spec, &found));
                    }
                    keys.extend(found);
                }
                Ok(_) => preserved_imports.push(statement.text.clone()),
                Err(err) => {
                    error!("Failed to get import content, because {}", err);
                    preserved_imports.push(statement.text.clone());
                }
            }

            remaining.push_str(&code[cursor..statement.span.start]);
            cursor = statement.span.end;
            if code[cursor..].starts_with('\n') {
                cursor += 1;
            }
        }
        remaining.push_str(&code[cursor..]);

        let keys: Vec<DeclKey> = keys.into_iter().collect();
        let mut block = ctx.render(&keys);
        for rename in renames {
            if !block.is_empty() {
                block.push('\n');
            }
            block.push_str(&rename);
        }
        let source = if block.is_empty() {
            remaining
        } else {
            format!("{}\n{}", block, remaining)
        };

        InlinedSource {
            source,
            preserved_imports,
        }
    }

    /// Inline the imports of `code` and run the emitter over the result.
    /// Imports that could not be inlined are prepended to the output.
    pub fn generate_by_code(&self, ctx: &mut ResolutionContext, code: &str, file: Option<&Path>) -> GenResult<String> {
        let inlined = self.inline_imports(ctx, code, file);
        let emitted = self.emitter.emit(&inlined.source)?;

        if inlined.preserved_imports.is_empty() {
            Ok(emitted)
        } else {
            Ok(format!("{}\n\n{}", inlined.preserved_imports.join("\n"), emitted))
        }
    }

    pub fn generate_by_file(&self, ctx: &mut ResolutionContext, path: &Path) -> GenResult<String> {
        let content = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        self.generate_by_code(ctx, &content, Some(&normalize_path(path)))
    }

    /// Generate every `.ts` file directly inside `input` into a file of the
    /// same name inside `output`, both taken relative to the root.
    ///
    /// Files are processed one after another in name order. A failing file
    /// is recorded in the report and does not stop the rest.
    pub fn generate_by_dir(&self, ctx: &mut ResolutionContext, input: &Path, output: &Path) -> GenResult<BatchReport> {
        let input_dir = self.options.root.join(input);
        let output_dir = self.options.root.join(output);

        let entries = fs::read_dir(&input_dir).map_err(|e| GenError::io(&input_dir, e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && path.to_string_lossy().ends_with(DECLARATION_SUFFIX))
            .collect();
        files.sort();

        fs::create_dir_all(&output_dir).map_err(|e| GenError::io(&output_dir, e))?;

        let mut report = BatchReport::default();
        for file in files {
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = output_dir.join(name);

            let written = self
                .generate_by_file(ctx, &file)
                .and_then(|code| fs::write(&target, code).map_err(|e| GenError::io(&target, e)));
            match written {
                Ok(()) => {
                    info!("Generated {}", target.display());
                    report.written.push(target);
                }
                Err(err) => {
                    error!("Failed to generate {}: {}", file.display(), err);
                    report.failed.push((file, err));
                }
            }
        }

        Ok(report)
    }
}

/// `type Alias = Name;` for each renamed item whose declaration was found
fn local_renames(spec: &ImportSpec, found: &[DeclKey]) -> Vec<String> {
    let ImportSpec::Named { items, .. } = spec else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.local_name() != item.content)
        .filter(|item| found.iter().any(|key| key.symbol == item.content))
        .map(|item| format!("type {} = {};", item.local_name(), item.content))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::canonicalize;

    fn project() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = canonicalize(dir.path());
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/two.ts"), "export type Two = \"a\" | \"b\";\n").unwrap();
        (dir, root)
    }

    #[test]
    fn test_import_content_renders_closure() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root).include_nearby_files(true));
        let mut ctx = ResolutionContext::new();

        let content = generator.import_content(
            &mut ctx,
            r#"import type { Two } from "./two";"#,
            Some(&root.join("src/one.ts")),
        );
        assert_eq!(content, "export type Two = \"a\" | \"b\";");
    }

    #[test]
    fn test_import_content_swallows_errors() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root).include_nearby_files(true));
        let mut ctx = ResolutionContext::new();
        let file = root.join("src/one.ts");

        assert_eq!(generator.import_content(&mut ctx, r#"import "./two""#, Some(&file)), "");
        assert_eq!(generator.import_content(&mut ctx, r#"import Two from "./two""#, Some(&file)), "");
        assert_eq!(generator.import_content(&mut ctx, r#"import { Two } from "./two""#, None), "");
    }

    #[test]
    fn test_inline_imports_removes_statements() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root).include_nearby_files(true));
        let mut ctx = ResolutionContext::new();

        let code = "import { Two } from \"./two\";\nimport * as fs from \"node:fs\";\nexport type One = { two: Two };\n";
        let inlined = generator.inline_imports(&mut ctx, code, Some(&root.join("src/one.ts")));
        assert_eq!(
            inlined.source,
            "export type Two = \"a\" | \"b\";\nexport type One = { two: Two };\n"
        );
        assert_eq!(inlined.preserved_imports, vec!["import * as fs from \"node:fs\";"]);
    }

    #[test]
    fn test_generate_by_code_prepends_preserved_imports() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root));
        let mut ctx = ResolutionContext::new();

        let code = "import { Two } from \"./two\";\nexport type One = { two: Two };\n";
        let output = generator.generate_by_code(&mut ctx, code, None).unwrap();
        assert_eq!(
            output,
            "import { Two } from \"./two\";\n\nexport type One = { two: Two };\n"
        );
    }

    #[test]
    fn test_inline_imports_keeps_renamed_bindings() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root).include_nearby_files(true));
        let mut ctx = ResolutionContext::new();

        let code = "import { Two as Pair } from \"./two\";\nexport type One = { two: Pair };\n";
        let inlined = generator.inline_imports(&mut ctx, code, Some(&root.join("src/one.ts")));
        assert_eq!(
            inlined.source,
            "export type Two = \"a\" | \"b\";\ntype Pair = Two;\nexport type One = { two: Pair };\n"
        );
        assert!(inlined.preserved_imports.is_empty());
    }

    #[test]
    fn test_generate_by_code_keeps_unparsed_statement_whole() {
        let (_dir, root) = project();
        let generator = Generator::new(GenOptions::new(&root));
        let mut ctx = ResolutionContext::new();

        let code = "import fs = require(\"fs\");\nexport type T = { a: string };\n";
        let output = generator.generate_by_code(&mut ctx, code, None).unwrap();
        assert_eq!(
            output,
            "import fs = require(\"fs\");\n\nexport type T = { a: string };\n"
        );
    }
}
