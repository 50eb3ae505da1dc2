//! Generator kinds.
//!
//! The two generators share every pipeline stage and differ only in the
//! marker they look for, the resolver interface they implement and the
//! lookup expression they emit per field.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which resolver a generator produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneratorKind {
    /// Binds fields to the first descendant of the field's type.
    #[default]
    Dependency,
    /// Binds fields to the scene node at the marker's path.
    SceneNode,
}

impl GeneratorKind {
    /// Every kind, in the order generators run.
    pub const ALL: [Self; 2] = [Self::Dependency, Self::SceneNode];

    /// Default marker name.
    #[must_use]
    pub const fn default_marker(self) -> &'static str {
        match self {
            Self::Dependency => "InjectDependency",
            Self::SceneNode => "SceneNode",
        }
    }

    /// Default namespace of the resolver interface.
    #[must_use]
    pub const fn default_interface_namespace(self) -> &'static str {
        match self {
            Self::Dependency => "Codartesien.SourceGenerators.DependencyResolver",
            Self::SceneNode => "Codartesien.SourceGenerators.SceneNodeResolver",
        }
    }

    /// Default resolver interface name.
    #[must_use]
    pub const fn default_interface_name(self) -> &'static str {
        match self {
            Self::Dependency => "IDependencyResolver",
            Self::SceneNode => "ISceneNodeResolver",
        }
    }

    /// Default name of the generated resolve method.
    #[must_use]
    pub const fn default_method_name(self) -> &'static str {
        match self {
            Self::Dependency => "ResolveDependencies",
            Self::SceneNode => "ResolveNodes",
        }
    }

    /// Suffix of hint names produced by this kind.
    #[must_use]
    pub const fn hint_suffix(self) -> &'static str {
        match self {
            Self::Dependency => "DependencyResolver",
            Self::SceneNode => "SceneNodeResolver",
        }
    }

    /// Name used on the command line and in configuration files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dependency => "dependency",
            Self::SceneNode => "scene-node",
        }
    }
}

impl fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dependency" => Ok(Self::Dependency),
            "scene-node" | "scene_node" => Ok(Self::SceneNode),
            other => Err(format!(
                "unknown generator kind '{other}', expected 'dependency' or 'scene-node'"
            )),
        }
    }
}
