//! Generated unit rendering.

use crate::config::GeneratorConfig;
use crate::walker::{EnclosingType, Hierarchy, MarkedField};
use nodebind_core::{ImportStatement, Modifier, TypeDeclaration};

/// Namespace the descendant lookup's `OfType`/`FirstOrDefault` come from.
const LINQ_IMPORT: &str = "using System.Linq;";

/// Renders the partial class re-opening a candidate.
pub struct Emitter<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> Emitter<'a> {
    /// Creates a new emitter.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Renders the generated unit for `decl` from its walked hierarchy.
    #[must_use]
    pub fn emit(&self, decl: &TypeDeclaration, hierarchy: &Hierarchy) -> String {
        let mut output = String::new();

        // Global-namespace types are re-opened without a namespace line.
        if let Some(namespace) = &decl.namespace {
            output.push_str(&format!("namespace {namespace};\n\n"));
        }

        let imports: Vec<&str> = hierarchy
            .imports
            .iter()
            .map(ImportStatement::as_str)
            .collect();
        output.push_str(&imports.join("\n"));
        output.push('\n');
        output.push_str(
            "#pragma warning disable CS0105 // Disable warning about redundant using directive\n",
        );
        output.push_str(&format!("using {};\n", self.config.interface_namespace));
        if !self.config.looks_up_by_path() {
            output.push_str(LINQ_IMPORT);
            output.push('\n');
        }
        output.push_str("#pragma warning restore CS0105\n\n");

        let mut class = String::new();
        class.push_str(&format!(
            "{}partial class {} : {}\n",
            access_prefix(&hierarchy.accessibility),
            decl.display_name(),
            self.config.interface_name
        ));
        class.push_str("{\n");
        class.push_str(
            "#pragma warning disable CS0109 // Disable warning about redundant 'new' keyword\n",
        );
        class.push_str(&format!("    public new void {}()\n", self.config.method_name));
        class.push_str("    {\n");
        for field in &hierarchy.fields {
            class.push_str(&format!("        {}\n", self.assignment(field)));
        }
        class.push_str("    }\n");
        class.push_str("#pragma warning restore CS0109\n");
        class.push_str("}\n");

        // Nested candidates are re-opened inside their containing types.
        for enclosing in hierarchy.enclosing.iter().rev() {
            class = wrap(enclosing, &class);
        }
        output.push_str(&class);

        output
    }

    /// Renders the assignment statement for one field.
    #[must_use]
    pub fn assignment(&self, field: &MarkedField) -> String {
        format!("this.{} = {};", field.name, self.lookup(field))
    }

    /// Renders the runtime lookup expression for one field.
    #[must_use]
    pub fn lookup(&self, field: &MarkedField) -> String {
        if self.config.looks_up_by_path() {
            format!(
                "this.GetNode<{}>(\"{}\")",
                field.type_text, field.lookup_key
            )
        } else {
            format!(
                "GetTree().Root.GetChildren().OfType<{}>().FirstOrDefault()",
                field.type_text
            )
        }
    }
}

/// Renders access modifiers followed by a space, or nothing.
fn access_prefix(modifiers: &[Modifier]) -> String {
    modifiers
        .iter()
        .map(|m| format!("{} ", m.keyword()))
        .collect()
}

/// Indents `inner` one level inside a re-opening of `enclosing`.
fn wrap(enclosing: &EnclosingType, inner: &str) -> String {
    let mut output = format!(
        "{}partial {} {}\n{{\n",
        access_prefix(&enclosing.accessibility),
        enclosing.kind.keyword(),
        enclosing.display_name
    );
    for line in inner.lines() {
        if !line.is_empty() {
            output.push_str("    ");
            output.push_str(line);
        }
        output.push('\n');
    }
    output.push_str("}\n");
    output
}
