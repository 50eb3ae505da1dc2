//! Symbol table over the declarations of a corpus.
//!
//! Types are indexed by their fully qualified path, where every segment
//! carries its generic arity, so `Pool<T>` and `Pool` are distinct entries.
//! Namespaces are indexed together with all their prefixes.

use nodebind_core::{DeclId, Segment, TypeDeclaration};
use std::collections::{HashMap, HashSet};

/// Index from qualified paths to declarations and known namespaces.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: HashMap<Vec<Segment>, Vec<DeclId>>,
    namespaces: HashSet<String>,
}

impl SymbolTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a declaration and its namespace.
    ///
    /// Partial declarations of one type share a path; they are kept in
    /// insertion order.
    pub fn insert(&mut self, decl: &TypeDeclaration) {
        self.types.entry(decl.path()).or_default().push(decl.id);
        if let Some(ns) = &decl.namespace {
            self.insert_namespace(ns);
        }
    }

    /// Records a namespace and each of its prefixes.
    pub fn insert_namespace(&mut self, namespace: &str) {
        let mut prefix = String::new();
        for part in namespace.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            self.namespaces.insert(prefix.clone());
        }
    }

    /// Returns the first declaration at exactly `path`.
    #[must_use]
    pub fn lookup(&self, path: &[Segment]) -> Option<DeclId> {
        self.types.get(path).and_then(|ids| ids.first().copied())
    }

    /// Returns every declaration at exactly `path`.
    #[must_use]
    pub fn parts(&self, path: &[Segment]) -> &[DeclId] {
        self.types.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `namespace` is declared in the corpus.
    #[must_use]
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Resolves a namespace name as written inside `scope`.
    ///
    /// Candidates are tried from the innermost enclosing namespace outward,
    /// ending with the name taken as fully qualified.
    #[must_use]
    pub fn resolve_namespace(&self, name: &str, scope: Option<&str>) -> Option<String> {
        let name = name.strip_prefix("global::").unwrap_or(name);
        enclosing_namespaces(scope)
            .map(|outer| match outer {
                Some(outer) => format!("{outer}.{name}"),
                None => name.to_string(),
            })
            .find(|candidate| self.has_namespace(candidate))
    }

    /// Number of distinct type paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no type is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Yields `scope` and each enclosing namespace, innermost first, followed
/// by `None` for the global namespace.
pub(crate) fn enclosing_namespaces(scope: Option<&str>) -> impl Iterator<Item = Option<&str>> {
    let mut current = scope;
    let mut done = false;
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let item = current;
        match current {
            Some(ns) => current = ns.rfind('.').map(|idx| &ns[..idx]),
            None => done = true,
        }
        Some(item)
    })
}
