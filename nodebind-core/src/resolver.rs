//! Symbol-resolution capability consumed by the generation pipeline.

use crate::imports::ImportStatement;
use crate::reference::{Segment, TypeReference};
use crate::types::{DeclId, SourceUnit, TypeDeclaration, UnitId};

/// Read-only view over a set of parsed source units.
///
/// Implementations supply every type declaration of the corpus, resolve
/// type references across source-unit boundaries and normalize using
/// directives into import statements.
pub trait SymbolResolver {
    /// Returns every type declaration in corpus order.
    fn declarations(&self) -> &[TypeDeclaration];

    /// Looks up a declaration by identity.
    fn declaration(&self, id: DeclId) -> Option<&TypeDeclaration>;

    /// Looks up a source unit by identity.
    fn unit(&self, id: UnitId) -> Option<&SourceUnit>;

    /// Resolves `reference`, as written inside `context`, to the
    /// declaration that declares it.
    ///
    /// Returns `None` when the reference names nothing in the corpus.
    fn resolve_type(
        &self,
        reference: &TypeReference,
        context: &TypeDeclaration,
    ) -> Option<&TypeDeclaration>;

    /// Returns the declaration at a fully qualified path, preferring the
    /// first partial declaration in corpus order.
    fn declaration_at(&self, path: &[Segment]) -> Option<&TypeDeclaration> {
        self.declarations().iter().find(|d| d.path() == path)
    }

    /// Returns every partial declaration of the type `decl` declares, in
    /// corpus order.
    fn parts(&self, decl: &TypeDeclaration) -> Vec<&TypeDeclaration> {
        let path = decl.path();
        self.declarations()
            .iter()
            .filter(|d| d.path() == path)
            .collect()
    }

    /// Returns the import statements of a unit in source order.
    ///
    /// Directives naming a namespace known to the resolver are rendered
    /// fully qualified; all others keep their original text.
    fn imports(&self, unit: UnitId) -> Vec<ImportStatement>;
}
