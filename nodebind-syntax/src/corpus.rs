//! Source corpus.
//!
//! A [`Corpus`] owns every parsed source unit of one generation run and
//! implements [`SymbolResolver`] over them.

use crate::error::{CorpusError, ParseError};
use crate::parser::parse_source;
use crate::symbols::{SymbolTable, enclosing_namespaces};
use nodebind_core::{
    DeclId, ImportStatement, Segment, SourceUnit, SymbolResolver, TypeDeclaration, TypeReference,
    UnitId, UsingDirective, UsingKind,
};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extension of the sources a corpus loads.
pub const SOURCE_EXTENSION: &str = "cs";

/// Suffix of generated sources, which are never loaded back.
pub const GENERATED_SUFFIX: &str = ".g.cs";

/// Every parsed source unit of one generation run.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    units: Vec<SourceUnit>,
    declarations: Vec<TypeDeclaration>,
    symbols: SymbolTable,
}

impl Corpus {
    /// Creates an empty corpus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` and adds it to the corpus.
    ///
    /// # Errors
    /// Returns `ParseError` if the source fails to parse; the corpus is left
    /// unchanged in that case.
    pub fn add_source(
        &mut self,
        path: impl Into<PathBuf>,
        source: &str,
    ) -> Result<UnitId, ParseError> {
        let parsed = parse_source(path, source)?;
        let unit_id = UnitId(self.units.len());

        let mut unit = parsed.unit;
        unit.id = unit_id;
        // Namespace blocks holding only usings still open a scope.
        for scope in unit.usings.iter().filter_map(|u| u.scope.as_deref()) {
            self.symbols.insert_namespace(scope);
        }

        for mut decl in parsed.declarations {
            decl.id = DeclId(self.declarations.len());
            decl.unit = unit_id;
            self.symbols.insert(&decl);
            self.declarations.push(decl);
        }

        tracing::debug!(
            "parsed {} ({} usings)",
            unit.path.display(),
            unit.usings.len()
        );
        self.units.push(unit);
        Ok(unit_id)
    }

    /// Builds a corpus from in-memory `(path, source)` pairs, in order.
    ///
    /// # Errors
    /// Returns the first `ParseError` encountered.
    pub fn from_sources<I, P, S>(sources: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (P, S)>,
        P: Into<PathBuf>,
        S: AsRef<str>,
    {
        let mut corpus = Self::new();
        for (path, source) in sources {
            corpus.add_source(path, source.as_ref())?;
        }
        Ok(corpus)
    }

    /// Loads every `.cs` file under `root`, in sorted path order.
    ///
    /// Generated `.g.cs` files are skipped so a previous run's output never
    /// feeds back into discovery.
    ///
    /// # Errors
    /// Returns `CorpusError` if the directory cannot be walked or a file
    /// cannot be read or parsed.
    pub fn load_dir(root: &Path) -> Result<Self, CorpusError> {
        let mut corpus = Self::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_source_file(path) {
                continue;
            }
            let source = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            corpus.add_source(path, &source)?;
        }
        tracing::info!(
            "loaded {} source units with {} type declarations from {}",
            corpus.units.len(),
            corpus.declarations.len(),
            root.display()
        );
        Ok(corpus)
    }

    /// Returns every source unit in load order.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Returns the symbol table.
    #[must_use]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Returns every partial declaration sharing `decl`'s qualified path.
    #[must_use]
    pub fn parts_of(&self, decl: &TypeDeclaration) -> Vec<&TypeDeclaration> {
        self.symbols
            .parts(&decl.path())
            .iter()
            .filter_map(|id| self.declaration(*id))
            .collect()
    }

    /// Number of source units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the corpus holds no source unit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn lookup(&self, path: &[Segment]) -> Option<&TypeDeclaration> {
        self.symbols
            .lookup(path)
            .and_then(|id| self.declaration(id))
    }

    /// Resolves a reference through the using directives of the context's
    /// unit and every `global using` of the corpus.
    fn lookup_through_usings(
        &self,
        segments: &[Segment],
        context: &TypeDeclaration,
    ) -> Option<&TypeDeclaration> {
        let local = self.unit(context.unit).into_iter().flat_map(|u| &u.usings);
        let global = self
            .units
            .iter()
            .filter(|u| u.id != context.unit)
            .flat_map(|u| &u.usings)
            .filter(|using| using.global);

        for using in local.chain(global) {
            let found = match &using.kind {
                UsingKind::Alias { alias, target }
                    if segments[0].arity == 0 && segments[0].name == *alias =>
                {
                    let Ok(mut path) = TypeReference::new(target.as_str()).segments() else {
                        continue;
                    };
                    path.extend_from_slice(&segments[1..]);
                    self.lookup_in_scopes(&path, using.scope.as_deref())
                }
                UsingKind::Namespace(name) => {
                    let Some(ns) = self
                        .symbols
                        .resolve_namespace(name, using.scope.as_deref())
                    else {
                        continue;
                    };
                    let mut path: Vec<Segment> = ns.split('.').map(Segment::plain).collect();
                    path.extend_from_slice(segments);
                    self.lookup(&path)
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Looks `segments` up relative to `scope` and each enclosing namespace.
    fn lookup_in_scopes(
        &self,
        segments: &[Segment],
        scope: Option<&str>,
    ) -> Option<&TypeDeclaration> {
        enclosing_namespaces(scope).find_map(|ns| {
            let mut path: Vec<Segment> = ns
                .into_iter()
                .flat_map(|ns| ns.split('.'))
                .map(Segment::plain)
                .collect();
            path.extend_from_slice(segments);
            self.lookup(&path)
        })
    }
}

impl SymbolResolver for Corpus {
    fn declarations(&self) -> &[TypeDeclaration] {
        &self.declarations
    }

    fn declaration(&self, id: DeclId) -> Option<&TypeDeclaration> {
        self.declarations.get(id.0)
    }

    fn unit(&self, id: UnitId) -> Option<&SourceUnit> {
        self.units.get(id.0)
    }

    fn declaration_at(&self, path: &[Segment]) -> Option<&TypeDeclaration> {
        self.lookup(path)
    }

    fn parts(&self, decl: &TypeDeclaration) -> Vec<&TypeDeclaration> {
        self.parts_of(decl)
    }

    fn resolve_type(
        &self,
        reference: &TypeReference,
        context: &TypeDeclaration,
    ) -> Option<&TypeDeclaration> {
        let segments = match reference.segments() {
            Ok(segments) => segments,
            Err(e) => {
                tracing::debug!("cannot resolve '{}': {}", reference, e);
                return None;
            }
        };
        if segments.len() == 1
            && segments[0].arity == 0
            && context.type_parameters.contains(&segments[0].name)
        {
            return None;
        }

        // Types nested in the context's containing types, innermost first.
        let namespace: Vec<Segment> = context
            .namespace
            .iter()
            .flat_map(|ns| ns.split('.'))
            .map(Segment::plain)
            .collect();
        for depth in (1..=context.containing_types.len()).rev() {
            let mut path = namespace.clone();
            path.extend_from_slice(&context.containing_types[..depth]);
            path.extend_from_slice(&segments);
            if let Some(found) = self.lookup(&path) {
                return Some(found);
            }
        }

        self.lookup_in_scopes(&segments, context.namespace.as_deref())
            .or_else(|| self.lookup_through_usings(&segments, context))
    }

    fn imports(&self, unit: UnitId) -> Vec<ImportStatement> {
        let Some(unit) = self.unit(unit) else {
            return Vec::new();
        };
        unit.usings
            .iter()
            .map(|using| match &using.kind {
                UsingKind::Namespace(name) => self
                    .symbols
                    .resolve_namespace(name, using.scope.as_deref())
                    .map_or_else(
                        || ImportStatement::raw(local_text(using)),
                        |ns| ImportStatement::resolved(&ns),
                    ),
                UsingKind::Static(_) | UsingKind::Alias { .. } => {
                    ImportStatement::raw(local_text(using))
                }
            })
            .collect()
    }
}

/// Directive text without a leading `global`, valid inside a namespace.
fn local_text(using: &UsingDirective) -> &str {
    if using.global {
        using
            .text
            .strip_prefix("global")
            .map_or(using.text.as_str(), str::trim_start)
    } else {
        &using.text
    }
}

fn is_source_file(path: &Path) -> bool {
    let is_source = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION));
    let is_generated = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(GENERATED_SUFFIX));
    is_source && !is_generated
}
