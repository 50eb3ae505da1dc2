//! Generator configuration.

use crate::kind::GeneratorKind;
use serde::Deserialize;
use std::path::PathBuf;

/// Default source path segment marking vendored content.
pub const DEFAULT_VENDORED_SEGMENT: &str = "addons/";

/// How dependency fields are looked up at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyLookup {
    /// First descendant of the root whose type matches the field.
    /// A marker argument is ignored.
    #[default]
    Descendant,
    /// Node at the marker argument's path, like scene-node fields.
    Path,
}

/// Configuration of one generator.
///
/// Deserializes from a table where every key is optional; missing keys take
/// the defaults of the configured kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "GeneratorTable")]
pub struct GeneratorConfig {
    /// Generator kind.
    pub kind: GeneratorKind,
    /// Marker name to look for on fields.
    pub marker: String,
    /// Candidates whose source path contains this segment are skipped.
    pub vendored_segment: String,
    /// Namespace imported for the resolver interface.
    pub interface_namespace: String,
    /// Resolver interface the generated type implements.
    pub interface_name: String,
    /// Name of the generated resolve method.
    pub method_name: String,
    /// Lookup used for dependency fields.
    pub dependency_lookup: DependencyLookup,
    /// Whether candidates are processed in parallel.
    pub parallel: bool,
    /// Optional file the diagnostic dump is written to.
    pub debug_dump: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Creates a configuration with the defaults of `kind`.
    #[must_use]
    pub fn new(kind: GeneratorKind) -> Self {
        Self {
            kind,
            marker: kind.default_marker().to_string(),
            vendored_segment: DEFAULT_VENDORED_SEGMENT.to_string(),
            interface_namespace: kind.default_interface_namespace().to_string(),
            interface_name: kind.default_interface_name().to_string(),
            method_name: kind.default_method_name().to_string(),
            dependency_lookup: DependencyLookup::default(),
            parallel: true,
            debug_dump: None,
        }
    }

    /// Default dependency generator configuration.
    #[must_use]
    pub fn dependency() -> Self {
        Self::new(GeneratorKind::Dependency)
    }

    /// Default scene-node generator configuration.
    #[must_use]
    pub fn scene_node() -> Self {
        Self::new(GeneratorKind::SceneNode)
    }

    /// Sets the marker name.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    /// Sets the vendored path segment.
    #[must_use]
    pub fn with_vendored_segment(mut self, segment: impl Into<String>) -> Self {
        self.vendored_segment = segment.into();
        self
    }

    /// Sets the resolver interface namespace.
    #[must_use]
    pub fn with_interface_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.interface_namespace = namespace.into();
        self
    }

    /// Sets the resolver interface name.
    #[must_use]
    pub fn with_interface_name(mut self, name: impl Into<String>) -> Self {
        self.interface_name = name.into();
        self
    }

    /// Sets the generated method name.
    #[must_use]
    pub fn with_method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = name.into();
        self
    }

    /// Sets the dependency lookup.
    #[must_use]
    pub fn with_dependency_lookup(mut self, lookup: DependencyLookup) -> Self {
        self.dependency_lookup = lookup;
        self
    }

    /// Enables or disables parallel candidate processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the diagnostic dump file.
    #[must_use]
    pub fn with_debug_dump(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_dump = Some(path.into());
        self
    }

    /// Returns true if fields are looked up by path.
    #[must_use]
    pub fn looks_up_by_path(&self) -> bool {
        match self.kind {
            GeneratorKind::SceneNode => true,
            GeneratorKind::Dependency => self.dependency_lookup == DependencyLookup::Path,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::dependency()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GeneratorTable {
    kind: GeneratorKind,
    marker: Option<String>,
    vendored_segment: Option<String>,
    interface_namespace: Option<String>,
    interface_name: Option<String>,
    method_name: Option<String>,
    dependency_lookup: DependencyLookup,
    parallel: Option<bool>,
    debug_dump: Option<PathBuf>,
}

impl From<GeneratorTable> for GeneratorConfig {
    fn from(table: GeneratorTable) -> Self {
        let defaults = Self::new(table.kind);
        Self {
            kind: table.kind,
            marker: table.marker.unwrap_or(defaults.marker),
            vendored_segment: table.vendored_segment.unwrap_or(defaults.vendored_segment),
            interface_namespace: table
                .interface_namespace
                .unwrap_or(defaults.interface_namespace),
            interface_name: table.interface_name.unwrap_or(defaults.interface_name),
            method_name: table.method_name.unwrap_or(defaults.method_name),
            dependency_lookup: table.dependency_lookup,
            parallel: table.parallel.unwrap_or(defaults.parallel),
            debug_dump: table.debug_dump,
        }
    }
}
