//! Run configuration.
//!
//! A run configuration lists the generators to execute. It is loaded from
//! a TOML file with one `[[generator]]` table per generator:
//!
//! ```toml
//! [[generator]]
//! kind = "dependency"
//!
//! [[generator]]
//! kind = "scene-node"
//! vendored_segment = "third_party/"
//! ```
//!
//! A file without generator tables runs every kind with its defaults.

use nodebind_codegen::{GeneratorConfig, GeneratorKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for loading run configurations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read '{}': {}", .path.display(), .source)]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Generators to run, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// One configuration per generator.
    #[serde(default, rename = "generator")]
    pub generators: Vec<GeneratorConfig>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            generators: GeneratorKind::ALL
                .into_iter()
                .map(GeneratorConfig::new)
                .collect(),
        }
    }
}

impl RunConfig {
    /// Parses a run configuration from TOML text.
    ///
    /// # Errors
    /// Returns `ConfigError::Toml` if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        if config.generators.is_empty() {
            return Ok(Self::default());
        }
        Ok(config)
    }

    /// Loads a run configuration from a TOML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("loaded run configuration from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Keeps only the generators of `kind`.
    #[must_use]
    pub fn only(mut self, kind: GeneratorKind) -> Self {
        self.generators.retain(|config| config.kind == kind);
        self
    }

    /// Overrides the vendored segment of every generator.
    #[must_use]
    pub fn with_vendored_segment(mut self, segment: &str) -> Self {
        for config in &mut self.generators {
            config.vendored_segment = segment.to_string();
        }
        self
    }

    /// Disables parallel candidate processing for every generator.
    #[must_use]
    pub fn sequential(mut self) -> Self {
        for config in &mut self.generators {
            config.parallel = false;
        }
        self
    }

    /// Sets the diagnostic dump of every generator.
    ///
    /// With several generators each gets its own file, named after `path`
    /// with the kind appended to the file stem. A kind configured more
    /// than once is also numbered, e.g. `run.dependency-2.log`.
    #[must_use]
    pub fn with_debug_dump(mut self, path: &Path) -> Self {
        let shared = self.generators.len() > 1;
        let kinds: Vec<GeneratorKind> = self.generators.iter().map(|g| g.kind).collect();
        let mut seen: HashMap<GeneratorKind, usize> = HashMap::new();
        for config in &mut self.generators {
            let occurrence = seen.entry(config.kind).or_insert(0);
            *occurrence += 1;
            config.debug_dump = Some(if !shared {
                path.to_path_buf()
            } else if kinds.iter().filter(|&&k| k == config.kind).count() > 1 {
                dump_path_for(path, &format!("{}-{}", config.kind, occurrence))
            } else {
                dump_path_for(path, config.kind.as_str())
            });
        }
        self
    }
}

fn dump_path_for(path: &Path, label: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{label}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{label}"),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_runs_every_kind() {
        let config = RunConfig::from_toml_str("").expect("Failed to parse");
        let kinds: Vec<GeneratorKind> = config.generators.iter().map(|g| g.kind).collect();
        assert_eq!(kinds, vec![GeneratorKind::Dependency, GeneratorKind::SceneNode]);
    }

    #[test]
    fn test_generator_tables() {
        let config = RunConfig::from_toml_str(
            r#"
            [[generator]]
            kind = "scene-node"
            marker = "Node"
            interface_namespace = "Game.Binding"

            [[generator]]
            kind = "dependency"
            dependency_lookup = "path"
            parallel = false
            "#,
        )
        .expect("Failed to parse");

        assert_eq!(config.generators.len(), 2);
        assert_eq!(config.generators[0].marker, "Node");
        assert_eq!(config.generators[0].interface_namespace, "Game.Binding");
        assert_eq!(config.generators[0].interface_name, "ISceneNodeResolver");
        assert!(config.generators[1].looks_up_by_path());
        assert!(!config.generators[1].parallel);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let result = RunConfig::from_toml_str("[[generator]]\nkind = \"signals\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = RunConfig::load(&dir.path().join("nodebind.toml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_overrides() {
        let config = RunConfig::default()
            .with_vendored_segment("vendor/")
            .sequential()
            .only(GeneratorKind::SceneNode);
        assert_eq!(config.generators.len(), 1);
        assert_eq!(config.generators[0].vendored_segment, "vendor/");
        assert!(!config.generators[0].parallel);
    }

    #[test]
    fn test_debug_dump_per_kind() {
        let all = RunConfig::default().with_debug_dump(Path::new("/tmp/nodebind.log"));
        assert_eq!(
            all.generators[0].debug_dump,
            Some(PathBuf::from("/tmp/nodebind.dependency.log"))
        );
        assert_eq!(
            all.generators[1].debug_dump,
            Some(PathBuf::from("/tmp/nodebind.scene-node.log"))
        );

        let single = RunConfig::default()
            .only(GeneratorKind::Dependency)
            .with_debug_dump(Path::new("/tmp/nodebind.log"));
        assert_eq!(
            single.generators[0].debug_dump,
            Some(PathBuf::from("/tmp/nodebind.log"))
        );
    }

    #[test]
    fn test_debug_dump_repeated_kind_is_numbered() {
        let config = RunConfig::from_toml_str(
            r#"
            [[generator]]
            kind = "dependency"

            [[generator]]
            kind = "dependency"
            marker = "Inject"

            [[generator]]
            kind = "scene-node"
            "#,
        )
        .expect("Failed to parse")
        .with_debug_dump(Path::new("/tmp/run.log"));

        let dumps: Vec<PathBuf> = config
            .generators
            .iter()
            .filter_map(|g| g.debug_dump.clone())
            .collect();
        assert_eq!(
            dumps,
            vec![
                PathBuf::from("/tmp/run.dependency-1.log"),
                PathBuf::from("/tmp/run.dependency-2.log"),
                PathBuf::from("/tmp/run.scene-node.log"),
            ]
        );
    }
}
