//! Inheritance chain traversal.
//!
//! Starting from a candidate, the walker follows the first base-list entry
//! of each level until a base cannot be resolved to a class in the corpus.
//! Every level contributes the marked fields of each of its partial
//! declarations in corpus order, and the imports of the source units they
//! were declared in.

use crate::config::GeneratorConfig;
use crate::error::CandidateError;
use crate::scanner::Scanner;
use nodebind_core::{
    DeclId, FieldDecl, ImportStatement, Modifier, SymbolResolver, TypeDeclaration, TypeKind,
    TypeReference,
};
use std::collections::HashSet;

/// A marked field collected from some level of a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkedField {
    /// Declared type as written.
    pub type_text: String,
    /// Field name (first declarator).
    pub name: String,
    /// Marker argument with quotes stripped, or empty.
    pub lookup_key: String,
    /// First marker argument as written, if any.
    pub argument: Option<String>,
    /// Qualified name of the declaring type.
    pub declared_in: String,
}

/// A type enclosing a nested candidate, re-opened around its unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnclosingType {
    /// Declaration kind.
    pub kind: TypeKind,
    /// Name with its type parameter list.
    pub display_name: String,
    /// Access modifiers as declared.
    pub accessibility: Vec<Modifier>,
}

/// Result of walking one candidate's chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    /// Names of the visited types, derived first.
    pub chain: Vec<String>,
    /// Marked fields, derived level first.
    pub fields: Vec<MarkedField>,
    /// Imports of every visited source unit, first occurrence kept.
    pub imports: Vec<ImportStatement>,
    /// Access modifiers of the candidate as declared by its parts.
    pub accessibility: Vec<Modifier>,
    /// Types enclosing the candidate, outermost first.
    pub enclosing: Vec<EnclosingType>,
}

impl Hierarchy {
    /// Returns the field names in order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Walks the base chain of candidates.
pub struct Walker<'a, R: ?Sized> {
    resolver: &'a R,
    config: &'a GeneratorConfig,
}

impl<'a, R: SymbolResolver + ?Sized> Walker<'a, R> {
    /// Creates a new walker.
    #[must_use]
    pub fn new(resolver: &'a R, config: &'a GeneratorConfig) -> Self {
        Self { resolver, config }
    }

    /// Walks the chain starting at `candidate`.
    ///
    /// # Errors
    /// Returns `CandidateError` if the chain revisits a type, a marked
    /// field's type cannot be rendered, or a containing type is not
    /// partial.
    pub fn walk(&self, candidate: &TypeDeclaration) -> Result<Hierarchy, CandidateError> {
        let scanner = Scanner::new(self.resolver, self.config);
        let mut hierarchy = Hierarchy {
            accessibility: accessibility_of(&scanner.parts(candidate)),
            enclosing: self.enclosing_of(candidate)?,
            ..Hierarchy::default()
        };
        let mut visited: HashSet<DeclId> = HashSet::new();
        let mut seen_imports: HashSet<ImportStatement> = HashSet::new();
        let mut current = candidate;

        loop {
            let parts = scanner.parts(current);
            let head = parts.first().copied().unwrap_or(current);
            hierarchy.chain.push(head.qualified_name());
            if !visited.insert(head.id) {
                return Err(CandidateError::CyclicHierarchy {
                    candidate: candidate.qualified_name(),
                    chain: hierarchy.chain,
                });
            }

            for part in &parts {
                for field in part.marked_fields(&self.config.marker) {
                    hierarchy
                        .fields
                        .push(self.collect_field(candidate, part, field)?);
                }
            }

            for part in &parts {
                for import in self.resolver.imports(part.unit) {
                    if seen_imports.insert(import.clone()) {
                        hierarchy.imports.push(import);
                    }
                }
            }

            let declares_base = parts.iter().find(|part| part.base_type().is_some());
            match declares_base.and_then(|part| self.base_of(part)) {
                Some(base) => current = base,
                None => break,
            }
        }

        Ok(hierarchy)
    }

    fn enclosing_of(
        &self,
        candidate: &TypeDeclaration,
    ) -> Result<Vec<EnclosingType>, CandidateError> {
        let mut enclosing = Vec::with_capacity(candidate.containing_types.len());
        for (path, segment) in candidate
            .containing_paths()
            .iter()
            .zip(&candidate.containing_types)
        {
            let parts = self
                .resolver
                .declaration_at(path)
                .map(|outer| self.resolver.parts(outer))
                .unwrap_or_default();
            if parts.is_empty() || !parts.iter().all(|part| part.is_partial()) {
                let containing = parts
                    .first()
                    .map_or_else(|| segment.name.clone(), |outer| outer.qualified_name());
                return Err(CandidateError::ContainingTypeNotPartial {
                    candidate: candidate.qualified_name(),
                    containing,
                });
            }
            let outer = parts[0];
            enclosing.push(EnclosingType {
                kind: outer.kind,
                display_name: outer.display_name(),
                accessibility: accessibility_of(&parts),
            });
        }
        Ok(enclosing)
    }

    fn base_of(&self, decl: &TypeDeclaration) -> Option<&'a TypeDeclaration> {
        let reference = decl.base_type()?;
        let resolver: &'a R = self.resolver;
        let Some(base) = resolver.resolve_type(reference, decl) else {
            tracing::debug!(
                "chain of {} ends at unresolved base '{}'",
                decl.qualified_name(),
                reference
            );
            return None;
        };
        if base.kind != TypeKind::Class {
            tracing::debug!(
                "chain of {} ends at {} {}",
                decl.qualified_name(),
                base.kind.keyword(),
                base.qualified_name()
            );
            return None;
        }
        Some(base)
    }

    fn collect_field(
        &self,
        candidate: &TypeDeclaration,
        level: &TypeDeclaration,
        field: &FieldDecl,
    ) -> Result<MarkedField, CandidateError> {
        let reference = TypeReference::new(field.type_text.as_str());
        let open = level
            .type_parameters
            .iter()
            .any(|param| reference.mentions(param));
        if field.type_text.trim().is_empty() || open {
            return Err(CandidateError::UnrenderableFieldType {
                candidate: candidate.qualified_name(),
                declared_in: level.qualified_name(),
                field: field.name().to_string(),
                type_text: field.type_text.clone(),
            });
        }

        let marker = field.marker(&self.config.marker);
        Ok(MarkedField {
            type_text: field.type_text.clone(),
            name: field.name().to_string(),
            lookup_key: marker.map(|m| m.lookup_key()).unwrap_or_default(),
            argument: marker
                .and_then(|m| m.first_argument())
                .map(str::to_string),
            declared_in: level.qualified_name(),
        })
    }
}

/// Access modifiers of the first part that declares any.
fn accessibility_of(parts: &[&TypeDeclaration]) -> Vec<Modifier> {
    parts
        .iter()
        .map(|part| part.accessibility())
        .find(|modifiers| !modifiers.is_empty())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodebind_syntax::Corpus;

    fn corpus(sources: &[(&str, &str)]) -> Corpus {
        Corpus::from_sources(sources.iter().copied()).expect("Failed to parse")
    }

    fn walk(corpus: &Corpus, name: &str, config: &GeneratorConfig) -> Result<Hierarchy, CandidateError> {
        let decl = corpus
            .declarations()
            .iter()
            .find(|d| d.name == name)
            .expect("declaration not found");
        Walker::new(corpus, config).walk(decl)
    }

    fn imports(hierarchy: &Hierarchy) -> Vec<&str> {
        hierarchy.imports.iter().map(ImportStatement::as_str).collect()
    }

    #[test]
    fn test_three_level_chain_orders_derived_to_base() {
        let corpus = corpus(&[
            (
                "GrandParent.cs",
                "namespace Game; public partial class GrandParent : Node { [InjectDependency] private A a; }",
            ),
            (
                "Parent.cs",
                "namespace Game; public partial class Parent : GrandParent { [InjectDependency] private B b; }",
            ),
            (
                "Child.cs",
                "namespace Game; public partial class Child : Parent { [InjectDependency] private C c; }",
            ),
        ]);
        let hierarchy =
            walk(&corpus, "Child", &GeneratorConfig::dependency()).expect("walk failed");

        assert_eq!(hierarchy.field_names(), vec!["c", "b", "a"]);
        assert_eq!(
            hierarchy.chain,
            vec!["Game.Child", "Game.Parent", "Game.GrandParent"]
        );
    }

    #[test]
    fn test_declaration_order_within_level() {
        let corpus = corpus(&[(
            "Player.cs",
            r#"public partial class Player
            {
                [SceneNode("Sprite")] private Sprite2D sprite;
                private int plain;
                [SceneNode] private Label label;
                [SceneNode("Hud/Health")] private ProgressBar health, unused;
            }"#,
        )]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::scene_node()).expect("walk failed");

        assert_eq!(hierarchy.field_names(), vec!["sprite", "label", "health"]);
        let keys: Vec<&str> = hierarchy.fields.iter().map(|f| f.lookup_key.as_str()).collect();
        assert_eq!(keys, vec!["Sprite", "", "Hud/Health"]);
        assert_eq!(hierarchy.fields[0].argument.as_deref(), Some("\"Sprite\""));
        assert!(hierarchy.fields[1].argument.is_none());
    }

    #[test]
    fn test_unresolved_base_stops_walk() {
        let corpus = corpus(&[(
            "Player.cs",
            "using Godot;\npublic partial class Player : CharacterBody2D { [InjectDependency] private A a; }",
        )]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::dependency()).expect("walk failed");
        assert_eq!(hierarchy.chain, vec!["Player"]);
        assert_eq!(hierarchy.field_names(), vec!["a"]);
    }

    #[test]
    fn test_interface_base_stops_walk() {
        let corpus = corpus(&[
            ("IActor.cs", "public interface IActor { }"),
            (
                "Player.cs",
                "public partial class Player : IActor { [InjectDependency] private A a; }",
            ),
        ]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::dependency()).expect("walk failed");
        assert_eq!(hierarchy.chain, vec!["Player"]);
    }

    #[test]
    fn test_only_first_base_is_followed() {
        let corpus = corpus(&[
            ("Base.cs", "public class Base { [InjectDependency] private A a; }"),
            ("Other.cs", "public class Other { [InjectDependency] private B b; }"),
            (
                "Player.cs",
                "public partial class Player : Base, Other { [InjectDependency] private C c; }",
            ),
        ]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::dependency()).expect("walk failed");
        assert_eq!(hierarchy.field_names(), vec!["c", "a"]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let corpus = corpus(&[(
            "Cycle.cs",
            r#"public partial class A : B { [InjectDependency] private X x; }
               public partial class B : A { }"#,
        )]);
        let error = walk(&corpus, "A", &GeneratorConfig::dependency()).unwrap_err();
        assert_eq!(
            error,
            CandidateError::CyclicHierarchy {
                candidate: "A".to_string(),
                chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
            }
        );
    }

    #[test]
    fn test_open_generic_field_is_unrenderable() {
        let corpus = corpus(&[
            (
                "Base.cs",
                "public class Holder<TItem> { [InjectDependency] private List<TItem> items; }",
            ),
            (
                "Player.cs",
                "public partial class Player : Holder<int> { [InjectDependency] private A a; }",
            ),
        ]);
        let error = walk(&corpus, "Player", &GeneratorConfig::dependency()).unwrap_err();
        assert!(matches!(
            error,
            CandidateError::UnrenderableFieldType { ref field, ref declared_in, .. }
                if field == "items" && declared_in == "Holder"
        ));
    }

    #[test]
    fn test_imports_follow_chain_and_dedup() {
        let corpus = corpus(&[
            (
                "Base.cs",
                "using Godot;\nusing System;\nnamespace Game.Core;\npublic class Actor : Node { [InjectDependency] private A a; }",
            ),
            (
                "Player.cs",
                "using Godot;\nusing Game.Core;\nusing Godot;\nnamespace Game;\npublic partial class Player : Actor { [InjectDependency] private B b; }",
            ),
        ]);
        let first = walk(&corpus, "Player", &GeneratorConfig::dependency()).expect("walk failed");
        assert_eq!(
            imports(&first),
            vec!["using Godot;", "using Game.Core;", "using System;"]
        );

        let second = walk(&corpus, "Player", &GeneratorConfig::dependency()).expect("walk failed");
        assert_eq!(first, second);
    }

    #[test]
    fn test_fields_of_every_part_are_collected() {
        let corpus = corpus(&[
            (
                "Actor.cs",
                "namespace Game; public class Actor { [SceneNode(\"Body\")] protected Node2D body; }",
            ),
            (
                "Player.cs",
                "using Godot;\nnamespace Game; public partial class Player { [SceneNode(\"Sprite\")] private Sprite2D sprite; }",
            ),
            (
                "Player.Hud.cs",
                "using Game.Ui;\nnamespace Game; public partial class Player : Actor { [SceneNode(\"Hud/Label\")] private Label label; }",
            ),
        ]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::scene_node()).expect("walk failed");

        assert_eq!(hierarchy.field_names(), vec!["sprite", "label", "body"]);
        assert_eq!(hierarchy.chain, vec!["Game.Player", "Game.Actor"]);
        assert_eq!(imports(&hierarchy), vec!["using Godot;", "using Game.Ui;"]);
    }

    #[test]
    fn test_accessibility_comes_from_declaring_part() {
        let corpus = corpus(&[
            ("Panel.cs", "partial class Panel { [SceneNode] private Label a; }"),
            ("Panel.More.cs", "internal partial class Panel { }"),
        ]);
        let hierarchy =
            walk(&corpus, "Panel", &GeneratorConfig::scene_node()).expect("walk failed");
        assert_eq!(hierarchy.accessibility, vec![Modifier::Internal]);
    }

    #[test]
    fn test_enclosing_types_outermost_first() {
        let corpus = corpus(&[(
            "Outer.cs",
            r#"namespace Game;
            public partial class Outer
            {
                internal partial struct Middle<T>
                {
                    private partial class Inner { [SceneNode("Label")] Label label; }
                }
            }"#,
        )]);
        let hierarchy =
            walk(&corpus, "Inner", &GeneratorConfig::scene_node()).expect("walk failed");

        assert_eq!(hierarchy.accessibility, vec![Modifier::Private]);
        assert_eq!(
            hierarchy.enclosing,
            vec![
                EnclosingType {
                    kind: TypeKind::Class,
                    display_name: "Outer".to_string(),
                    accessibility: vec![Modifier::Public],
                },
                EnclosingType {
                    kind: TypeKind::Struct,
                    display_name: "Middle<T>".to_string(),
                    accessibility: vec![Modifier::Internal],
                },
            ]
        );
    }

    #[test]
    fn test_non_partial_container_is_reported() {
        let corpus = corpus(&[(
            "Outer.cs",
            "namespace Game; public class Outer { partial class Inner { [SceneNode] Label label; } }",
        )]);
        let error = walk(&corpus, "Inner", &GeneratorConfig::scene_node()).unwrap_err();
        assert_eq!(
            error,
            CandidateError::ContainingTypeNotPartial {
                candidate: "Game.Outer.Inner".to_string(),
                containing: "Game.Outer".to_string(),
            }
        );
    }

    #[test]
    fn test_walk_crosses_files_through_using() {
        let corpus = corpus(&[
            (
                "Actor.cs",
                "namespace Game.Core { public abstract class Actor { [SceneNode(\"Body\")] protected Node2D body; } }",
            ),
            (
                "Player.cs",
                "using Game.Core;\nnamespace Game.Actors { public partial class Player : Actor { [SceneNode(\"Sprite\")] private Sprite2D sprite; } }",
            ),
        ]);
        let hierarchy =
            walk(&corpus, "Player", &GeneratorConfig::scene_node()).expect("walk failed");
        assert_eq!(hierarchy.field_names(), vec!["sprite", "body"]);
        assert_eq!(hierarchy.fields[1].declared_in, "Game.Core.Actor");
    }
}
