//! Using directives and the import statements re-emitted from them.

use std::fmt;

/// What a using directive brings into scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UsingKind {
    /// `using Some.Namespace;`
    Namespace(String),
    /// `using static Some.Type;`
    Static(String),
    /// `using Alias = Some.Type;`
    Alias {
        /// Alias identifier.
        alias: String,
        /// Aliased name as written.
        target: String,
    },
}

/// A using directive as it appears in a source unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsingDirective {
    /// Directive text exactly as written, including the trailing `;`.
    pub text: String,
    /// What the directive imports.
    pub kind: UsingKind,
    /// Whether the directive is `global using`.
    pub global: bool,
    /// Namespace the directive is declared inside, if any.
    pub scope: Option<String>,
    /// 1-based source line.
    pub line: usize,
}

impl UsingDirective {
    /// Returns the imported namespace name for plain namespace directives.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match &self.kind {
            UsingKind::Namespace(name) => Some(name),
            _ => None,
        }
    }
}

/// A normalized "make namespace N visible" line for a generated unit.
///
/// Statements compare by exact text: two spellings of the same namespace
/// are only merged when they render identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImportStatement(String);

impl ImportStatement {
    /// Creates a statement importing the fully qualified namespace `name`.
    #[must_use]
    pub fn resolved(name: &str) -> Self {
        Self(format!("using {name};"))
    }

    /// Creates a statement that keeps directive text as written.
    #[must_use]
    pub fn raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the statement text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImportStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_and_raw_compare_by_text() {
        assert_eq!(
            ImportStatement::resolved("Godot"),
            ImportStatement::raw("using Godot;")
        );
        assert_ne!(
            ImportStatement::resolved("Godot"),
            ImportStatement::raw("using  Godot;")
        );
    }

    #[test]
    fn test_using_namespace_accessor() {
        let directive = UsingDirective {
            text: "using static Godot.Mathf;".to_string(),
            kind: UsingKind::Static("Godot.Mathf".to_string()),
            global: false,
            scope: None,
            line: 1,
        };
        assert!(directive.namespace().is_none());
    }
}
