//! Candidate discovery.

use crate::config::GeneratorConfig;
use nodebind_core::{SymbolResolver, TypeDeclaration, TypeKind};

/// Selects the declarations a generator produces a unit for.
///
/// A candidate is a `partial`, non-`static` class whose source path lies
/// outside the vendored segment and which declares at least one field
/// carrying the configured marker. A type split over several partial
/// declarations is one candidate, represented by its first part.
pub struct Scanner<'a, R: ?Sized> {
    resolver: &'a R,
    config: &'a GeneratorConfig,
}

impl<'a, R: SymbolResolver + ?Sized> Scanner<'a, R> {
    /// Creates a new scanner.
    #[must_use]
    pub fn new(resolver: &'a R, config: &'a GeneratorConfig) -> Self {
        Self { resolver, config }
    }

    /// Returns the candidates in corpus order.
    #[must_use]
    pub fn scan(&self) -> Vec<&'a TypeDeclaration> {
        let resolver: &'a R = self.resolver;
        resolver
            .declarations()
            .iter()
            .filter(|decl| self.is_candidate(decl))
            .collect()
    }

    /// Returns the parts of `decl`'s type outside the vendored segment, or
    /// every part when all of them are vendored.
    #[must_use]
    pub fn parts(&self, decl: &TypeDeclaration) -> Vec<&'a TypeDeclaration> {
        let resolver: &'a R = self.resolver;
        let all = resolver.parts(decl);
        let visible: Vec<&'a TypeDeclaration> = all
            .iter()
            .copied()
            .filter(|part| !self.is_vendored(part))
            .collect();
        if visible.is_empty() { all } else { visible }
    }

    /// Returns true if `decl` is a candidate.
    #[must_use]
    pub fn is_candidate(&self, decl: &TypeDeclaration) -> bool {
        let marker = self.config.marker.as_str();
        if self.is_vendored(decl) {
            if decl.marked_fields(marker).next().is_some() {
                self.skip(decl, "vendored source");
            }
            return false;
        }

        let parts = self.parts(decl);
        if !parts
            .iter()
            .any(|part| part.marked_fields(marker).next().is_some())
        {
            return false;
        }
        // Later parts are covered by the first one.
        if parts.first().is_some_and(|first| first.id != decl.id) {
            return false;
        }

        let skipped = if decl.kind != TypeKind::Class {
            Some("not a class")
        } else if !parts.iter().all(|part| part.is_partial()) {
            Some("not partial")
        } else if parts.iter().any(|part| part.is_static()) {
            Some("static")
        } else {
            None
        };

        match skipped {
            Some(reason) => {
                self.skip(decl, reason);
                false
            }
            None => true,
        }
    }

    fn skip(&self, decl: &TypeDeclaration, reason: &str) {
        tracing::debug!(
            "skipping {} with [{}] fields: {}",
            decl.qualified_name(),
            self.config.marker,
            reason
        );
    }

    fn is_vendored(&self, decl: &TypeDeclaration) -> bool {
        let segment = self.config.vendored_segment.as_str();
        !segment.is_empty()
            && self
                .resolver
                .unit(decl.unit)
                .is_some_and(|unit| unit.path_contains(segment))
    }
}
