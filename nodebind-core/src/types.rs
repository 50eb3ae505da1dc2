//! Declaration model.
//!
//! This module contains the data structures describing what a source unit
//! declares: types, their modifiers and base lists, fields and the markers
//! attached to them.

use crate::imports::UsingDirective;
use crate::reference::{Segment, TypeReference};
use std::fmt;
use std::path::PathBuf;

/// Namespace name used when a type is declared outside of any namespace.
pub const GLOBAL_NAMESPACE: &str = "Global";

/// Identity of a type declaration within one corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DeclId(pub usize);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

/// Identity of a source unit within one corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct UnitId(pub usize);

/// One parsed source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    /// Unit identity.
    pub id: UnitId,
    /// Path the unit was read from.
    pub path: PathBuf,
    /// Every using directive in the unit, in source order.
    pub usings: Vec<UsingDirective>,
}

impl SourceUnit {
    /// Creates an empty source unit.
    #[must_use]
    pub fn new(id: UnitId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            usings: Vec::new(),
        }
    }

    /// Returns true if the unit path contains `segment`.
    ///
    /// Paths are compared with forward slashes so a segment such as
    /// `addons/` matches on every platform.
    #[must_use]
    pub fn path_contains(&self, segment: &str) -> bool {
        let normalized = self.path.to_string_lossy().replace('\\', "/");
        normalized.contains(segment)
    }
}

/// Kind of a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// `class`
    Class,
    /// `struct`
    Struct,
    /// `interface`
    Interface,
    /// `record` or `record class`
    Record,
    /// `record struct`
    RecordStruct,
    /// `enum`
    Enum,
}

impl TypeKind {
    /// Returns the keyword used to declare this kind.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Interface => "interface",
            Self::Record => "record",
            Self::RecordStruct => "record struct",
            Self::Enum => "enum",
        }
    }
}

/// Declaration modifier keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `public`
    Public,
    /// `private`
    Private,
    /// `protected`
    Protected,
    /// `internal`
    Internal,
    /// `file`
    File,
    /// `static`
    Static,
    /// `abstract`
    Abstract,
    /// `sealed`
    Sealed,
    /// `partial`
    Partial,
    /// `readonly`
    Readonly,
    /// `unsafe`
    Unsafe,
    /// `new`
    New,
    /// `virtual`
    Virtual,
    /// `override`
    Override,
    /// `extern`
    Extern,
    /// `const`
    Const,
    /// `volatile`
    Volatile,
    /// `async`
    Async,
    /// `required`
    Required,
    /// `ref`
    Ref,
}

impl Modifier {
    /// Parses a modifier keyword.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        let modifier = match keyword {
            "public" => Self::Public,
            "private" => Self::Private,
            "protected" => Self::Protected,
            "internal" => Self::Internal,
            "file" => Self::File,
            "static" => Self::Static,
            "abstract" => Self::Abstract,
            "sealed" => Self::Sealed,
            "partial" => Self::Partial,
            "readonly" => Self::Readonly,
            "unsafe" => Self::Unsafe,
            "new" => Self::New,
            "virtual" => Self::Virtual,
            "override" => Self::Override,
            "extern" => Self::Extern,
            "const" => Self::Const,
            "volatile" => Self::Volatile,
            "async" => Self::Async,
            "required" => Self::Required,
            "ref" => Self::Ref,
            _ => return None,
        };
        Some(modifier)
    }

    /// Returns the keyword of this modifier.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::File => "file",
            Self::Static => "static",
            Self::Abstract => "abstract",
            Self::Sealed => "sealed",
            Self::Partial => "partial",
            Self::Readonly => "readonly",
            Self::Unsafe => "unsafe",
            Self::New => "new",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Extern => "extern",
            Self::Const => "const",
            Self::Volatile => "volatile",
            Self::Async => "async",
            Self::Required => "required",
            Self::Ref => "ref",
        }
    }

    /// Returns true for access modifiers.
    #[must_use]
    pub const fn is_accessibility(&self) -> bool {
        matches!(
            self,
            Self::Public | Self::Private | Self::Protected | Self::Internal | Self::File
        )
    }
}

/// A declarative marker attached to a field, e.g. `[SceneNode("Label")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Marker name as written, without the list brackets.
    pub name: String,
    /// Argument texts as written, in order.
    pub arguments: Vec<String>,
}

impl Marker {
    /// Creates a marker.
    #[must_use]
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Returns the first argument as written, if any.
    #[must_use]
    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(String::as_str)
    }

    /// Returns the lookup key carried by this marker.
    ///
    /// The key is the first argument with surrounding double quotes removed,
    /// or an empty string when the marker has no argument.
    #[must_use]
    pub fn lookup_key(&self) -> String {
        self.first_argument()
            .map(|arg| arg.trim_matches('"').to_string())
            .unwrap_or_default()
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared type exactly as written.
    pub type_text: String,
    /// Declarator names in order (`int a, b;` declares two).
    pub names: Vec<String>,
    /// Markers from every attribute list on the declaration.
    pub markers: Vec<Marker>,
    /// Modifiers on the declaration.
    pub modifiers: Vec<Modifier>,
    /// 1-based source line of the declaration.
    pub line: usize,
}

impl FieldDecl {
    /// Returns the first declarator name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// Returns the first marker named `marker`, if present.
    #[must_use]
    pub fn marker(&self, marker: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.name == marker)
    }

    /// Returns true if the field carries a marker named `marker`.
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.marker(marker).is_some()
    }
}

/// A named type definition located in a source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDeclaration {
    /// Identity within the corpus.
    pub id: DeclId,
    /// Source unit the declaration lives in.
    pub unit: UnitId,
    /// Simple identifier.
    pub name: String,
    /// Declaration kind.
    pub kind: TypeKind,
    /// Modifiers in source order.
    pub modifiers: Vec<Modifier>,
    /// Type parameter names.
    pub type_parameters: Vec<String>,
    /// Enclosing namespace, if any.
    pub namespace: Option<String>,
    /// Containing types, outermost first.
    pub containing_types: Vec<Segment>,
    /// Base list entries in order.
    pub base_types: Vec<TypeReference>,
    /// Declared fields in source order.
    pub fields: Vec<FieldDecl>,
    /// 1-based source line where the declaration starts, after attributes.
    pub line: usize,
}

impl TypeDeclaration {
    /// Creates a declaration with no modifiers, bases or fields.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            id: DeclId::default(),
            unit: UnitId::default(),
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            type_parameters: Vec::new(),
            namespace: None,
            containing_types: Vec::new(),
            base_types: Vec::new(),
            fields: Vec::new(),
            line: 0,
        }
    }

    /// Returns true if `modifier` is present.
    #[must_use]
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Returns true if the type is declared `partial`.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.has_modifier(Modifier::Partial)
    }

    /// Returns true if the type is declared `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.has_modifier(Modifier::Static)
    }

    /// Returns the access modifiers in source order, e.g. `protected internal`.
    #[must_use]
    pub fn accessibility(&self) -> Vec<Modifier> {
        self.modifiers
            .iter()
            .copied()
            .filter(Modifier::is_accessibility)
            .collect()
    }

    /// Returns the paths of the containing types, outermost first.
    #[must_use]
    pub fn containing_paths(&self) -> Vec<Vec<Segment>> {
        let namespace: Vec<Segment> = self
            .namespace
            .iter()
            .flat_map(|ns| ns.split('.'))
            .map(Segment::plain)
            .collect();
        (1..=self.containing_types.len())
            .map(|depth| {
                let mut path = namespace.clone();
                path.extend_from_slice(&self.containing_types[..depth]);
                path
            })
            .collect()
    }

    /// Returns true if the type is declared inside another type.
    #[must_use]
    pub fn is_nested(&self) -> bool {
        !self.containing_types.is_empty()
    }

    /// Returns the enclosing namespace, or [`GLOBAL_NAMESPACE`].
    #[must_use]
    pub fn namespace_or_global(&self) -> &str {
        self.namespace.as_deref().unwrap_or(GLOBAL_NAMESPACE)
    }

    /// Returns the first base list entry.
    #[must_use]
    pub fn base_type(&self) -> Option<&TypeReference> {
        self.base_types.first()
    }

    /// Returns the number of type parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.type_parameters.len()
    }

    /// Returns the name with its type parameter list, e.g. `Pool<T>`.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.type_parameters.is_empty() {
            self.name.clone()
        } else {
            format!("{}<{}>", self.name, self.type_parameters.join(", "))
        }
    }

    /// Returns the fully qualified path segments of this type.
    #[must_use]
    pub fn path(&self) -> Vec<Segment> {
        let mut segments: Vec<Segment> = self
            .namespace
            .iter()
            .flat_map(|ns| ns.split('.'))
            .map(Segment::plain)
            .collect();
        segments.extend(self.containing_types.iter().cloned());
        segments.push(Segment::new(self.name.clone(), self.arity()));
        segments
    }

    /// Returns the qualified name, e.g. `Game.Ui.Hud`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if let Some(ns) = &self.namespace {
            parts.push(ns);
        }
        parts.extend(self.containing_types.iter().map(|s| s.name.as_str()));
        parts.push(&self.name);
        parts.join(".")
    }

    /// Returns the fields carrying a marker named `marker`, in order.
    pub fn marked_fields<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a FieldDecl> {
        self.fields.iter().filter(move |f| f.has_marker(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, markers: Vec<Marker>) -> FieldDecl {
        FieldDecl {
            type_text: "Node".to_string(),
            names: vec![name.to_string()],
            markers,
            modifiers: vec![Modifier::Private],
            line: 1,
        }
    }

    #[test]
    fn test_marker_lookup_key_strips_quotes() {
        let marker = Marker::new("SceneNode", vec!["\"Hud/Label\"".to_string()]);
        assert_eq!(marker.lookup_key(), "Hud/Label");
    }

    #[test]
    fn test_marker_lookup_key_defaults_to_empty() {
        let marker = Marker::new("SceneNode", Vec::new());
        assert_eq!(marker.lookup_key(), "");
        assert!(marker.first_argument().is_none());
    }

    #[test]
    fn test_marker_lookup_key_keeps_non_literal_argument() {
        let marker = Marker::new("SceneNode", vec!["nameof(Label)".to_string()]);
        assert_eq!(marker.lookup_key(), "nameof(Label)");
    }

    #[test]
    fn test_modifier_parse() {
        assert_eq!(Modifier::parse("partial"), Some(Modifier::Partial));
        assert_eq!(Modifier::parse("static"), Some(Modifier::Static));
        assert_eq!(Modifier::parse("class"), None);
    }

    #[test]
    fn test_declaration_names() {
        let mut decl = TypeDeclaration::new("Pool", TypeKind::Class);
        decl.namespace = Some("Game.Util".to_string());
        decl.type_parameters = vec!["T".to_string()];

        assert_eq!(decl.qualified_name(), "Game.Util.Pool");
        assert_eq!(decl.display_name(), "Pool<T>");
        assert_eq!(decl.namespace_or_global(), "Game.Util");
        assert_eq!(
            decl.path(),
            vec![
                Segment::plain("Game"),
                Segment::plain("Util"),
                Segment::new("Pool", 1)
            ]
        );
    }

    #[test]
    fn test_declaration_without_namespace_is_global() {
        let decl = TypeDeclaration::new("Player", TypeKind::Class);
        assert_eq!(decl.namespace_or_global(), GLOBAL_NAMESPACE);
        assert_eq!(decl.qualified_name(), "Player");
    }

    #[test]
    fn test_marked_fields_keeps_order() {
        let mut decl = TypeDeclaration::new("Player", TypeKind::Class);
        decl.fields = vec![
            field("b", vec![Marker::new("SceneNode", vec![])]),
            field("plain", vec![Marker::new("Export", vec![])]),
            field("a", vec![Marker::new("SceneNode", vec![])]),
        ];

        let names: Vec<&str> = decl.marked_fields("SceneNode").map(|f| f.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_accessibility_keeps_source_order() {
        let mut decl = TypeDeclaration::new("Panel", TypeKind::Class);
        decl.modifiers = vec![
            Modifier::Protected,
            Modifier::Internal,
            Modifier::Sealed,
            Modifier::Partial,
        ];
        assert_eq!(
            decl.accessibility(),
            vec![Modifier::Protected, Modifier::Internal]
        );
        assert_eq!(Modifier::Internal.keyword(), "internal");
        assert!(!Modifier::Partial.is_accessibility());
    }

    #[test]
    fn test_containing_paths_outermost_first() {
        let mut decl = TypeDeclaration::new("Inner", TypeKind::Class);
        decl.namespace = Some("Game".to_string());
        decl.containing_types = vec![Segment::plain("Outer"), Segment::new("Middle", 1)];
        assert_eq!(
            decl.containing_paths(),
            vec![
                vec![Segment::plain("Game"), Segment::plain("Outer")],
                vec![
                    Segment::plain("Game"),
                    Segment::plain("Outer"),
                    Segment::new("Middle", 1)
                ],
            ]
        );
        assert_eq!(decl.qualified_name(), "Game.Outer.Middle.Inner");
    }

    #[test]
    fn test_unit_path_contains_normalizes_separators() {
        let unit = SourceUnit::new(UnitId(0), "res\\addons\\plugin\\Thing.cs");
        assert!(unit.path_contains("addons/"));
        assert!(!unit.path_contains("scripts/"));
    }
}
