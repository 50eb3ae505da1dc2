//! Generation driver.
//!
//! Runs Scanner, Walker and Emitter for one generator kind and aggregates
//! the generated units. Candidates are independent: they are processed in
//! parallel when configured, and the results are merged in candidate order
//! so the output does not depend on scheduling.

use crate::config::GeneratorConfig;
use crate::diagnostics::{CandidateLog, Diagnostics};
use crate::emitter::Emitter;
use crate::error::{CandidateError, CodegenError};
use crate::kind::GeneratorKind;
use crate::scanner::Scanner;
use crate::walker::Walker;
use nodebind_core::{SymbolResolver, TypeDeclaration};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extension of written unit files.
pub const UNIT_EXTENSION: &str = "cs";

/// One generated code unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// Unique name of the unit within a run.
    pub hint_name: String,
    /// Qualified name of the candidate the unit re-opens.
    pub candidate: String,
    /// Generated source text.
    pub source: String,
}

impl GeneratedUnit {
    /// Returns the file name the unit is written to.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.hint_name, UNIT_EXTENSION)
    }
}

/// Result of one generator run.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutput {
    /// Generator kind that produced this output.
    pub kind: GeneratorKind,
    /// Generated units in candidate order.
    pub units: Vec<GeneratedUnit>,
    /// Candidates that failed, in candidate order.
    pub errors: Vec<CandidateError>,
}

impl GenerationOutput {
    /// Returns true if no candidate failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of candidates processed.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.units.len() + self.errors.len()
    }

    /// Returns the text of the unit named `hint_name`.
    #[must_use]
    pub fn get(&self, hint_name: &str) -> Option<&str> {
        self.units
            .iter()
            .find(|unit| unit.hint_name == hint_name)
            .map(|unit| unit.source.as_str())
    }

    /// Returns the hint names in order.
    #[must_use]
    pub fn hint_names(&self) -> Vec<&str> {
        self.units.iter().map(|u| u.hint_name.as_str()).collect()
    }

    /// Writes every unit into `dir` as `<hint>.cs`.
    ///
    /// # Returns
    /// Paths of the written files, in unit order.
    ///
    /// # Errors
    /// Returns `CodegenError::Io` if the directory or a file cannot be
    /// written.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            let path = dir.join(unit.file_name());
            std::fs::write(&path, &unit.source)?;
            tracing::debug!("wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Claims every unit's hint name in `names`.
    ///
    /// Units whose hint name was claimed by an earlier output are moved to
    /// the errors as `HintNameCollision`, so that no written file replaces
    /// another.
    pub fn claim_hint_names(&mut self, names: &mut HintNames) {
        for unit in std::mem::take(&mut self.units) {
            match names.claim(unit) {
                Ok(unit) => self.units.push(unit),
                Err(error) => {
                    tracing::warn!("{} generator: {}", self.kind, error);
                    self.errors.push(error);
                }
            }
        }
    }

    /// Converts a run with failed candidates into an error.
    ///
    /// # Errors
    /// Returns `CodegenError::CandidatesFailed` if any candidate failed.
    pub fn into_result(self) -> Result<Self, CodegenError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(CodegenError::CandidatesFailed {
                failed: self.errors.len(),
                total: self.candidates(),
            })
        }
    }
}

/// Returns the hint name of `decl` for `kind`: `{namespace}_{type}_{kind}.g`.
///
/// Nested types are named with their containing types, e.g. `Outer.Inner`.
#[must_use]
pub fn hint_name(decl: &TypeDeclaration, kind: GeneratorKind) -> String {
    let mut type_name: Vec<&str> = decl
        .containing_types
        .iter()
        .map(|segment| segment.name.as_str())
        .collect();
    type_name.push(&decl.name);
    format!(
        "{}_{}_{}.g",
        decl.namespace_or_global(),
        type_name.join("."),
        kind.hint_suffix()
    )
}

/// Hint names claimed so far, each with the candidate that owns it.
#[derive(Debug, Clone, Default)]
pub struct HintNames {
    owners: HashMap<String, String>,
}

impl HintNames {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `unit`'s hint name for its candidate.
    ///
    /// # Errors
    /// Returns `CandidateError::HintNameCollision` if the name is already
    /// owned.
    pub fn claim(&mut self, unit: GeneratedUnit) -> Result<GeneratedUnit, CandidateError> {
        match self.owners.get(&unit.hint_name) {
            Some(existing) => Err(CandidateError::HintNameCollision {
                candidate: unit.candidate,
                hint_name: unit.hint_name,
                existing: existing.clone(),
            }),
            None => {
                self.owners
                    .insert(unit.hint_name.clone(), unit.candidate.clone());
                Ok(unit)
            }
        }
    }

    /// Returns true if `hint_name` is claimed.
    #[must_use]
    pub fn contains(&self, hint_name: &str) -> bool {
        self.owners.contains_key(hint_name)
    }
}

/// Drives one generator over a resolver.
pub struct Driver<'a, R: ?Sized> {
    resolver: &'a R,
    config: &'a GeneratorConfig,
}

impl<'a, R: SymbolResolver + Sync + ?Sized> Driver<'a, R> {
    /// Creates a new driver.
    #[must_use]
    pub fn new(resolver: &'a R, config: &'a GeneratorConfig) -> Self {
        Self { resolver, config }
    }

    /// Returns the hint names of every candidate without generating.
    #[must_use]
    pub fn candidates(&self) -> Vec<String> {
        Scanner::new(self.resolver, self.config)
            .scan()
            .into_iter()
            .map(|decl| hint_name(decl, self.config.kind))
            .collect()
    }

    /// Runs the generator.
    ///
    /// Candidate failures are collected in the output; they never stop the
    /// remaining candidates.
    #[must_use]
    pub fn run(&self) -> GenerationOutput {
        let candidates = Scanner::new(self.resolver, self.config).scan();
        tracing::debug!(
            "{} generator found {} candidates",
            self.config.kind,
            candidates.len()
        );

        let results: Vec<(CandidateLog, Result<GeneratedUnit, CandidateError>)> =
            if self.config.parallel {
                candidates
                    .par_iter()
                    .map(|decl| self.process(decl))
                    .collect()
            } else {
                candidates.iter().map(|decl| self.process(decl)).collect()
            };

        let mut output = GenerationOutput {
            kind: self.config.kind,
            ..GenerationOutput::default()
        };
        let mut diagnostics = Diagnostics::new(self.config.debug_dump.clone());
        let mut names = HintNames::new();

        for (mut log, result) in results {
            let result = result.and_then(|unit| names.claim(unit));

            match result {
                Ok(unit) => {
                    log.note(format!(
                        "=== {} ===\n{}\n====================",
                        unit.hint_name, unit.source
                    ));
                    output.units.push(unit);
                }
                Err(error) => {
                    tracing::warn!("{} generator: {}", self.config.kind, error);
                    log.note(format!("!!! {error}"));
                    output.errors.push(error);
                }
            }
            diagnostics.append(&log);
        }
        diagnostics.flush();

        tracing::info!(
            "{} generator produced {} units ({} failed)",
            self.config.kind,
            output.units.len(),
            output.errors.len()
        );
        output
    }

    fn process(
        &self,
        decl: &TypeDeclaration,
    ) -> (CandidateLog, Result<GeneratedUnit, CandidateError>) {
        let mut log = CandidateLog::new();
        let hierarchy = match Walker::new(self.resolver, self.config).walk(decl) {
            Ok(hierarchy) => hierarchy,
            Err(error) => return (log, Err(error)),
        };

        log.note(format!(
            "Found {} fields for class {}: {}",
            hierarchy.fields.len(),
            decl.name,
            hierarchy.field_names().join(", ")
        ));
        log.note(format!("Classes looked at: {}", hierarchy.chain.join(", ")));

        if !self.config.looks_up_by_path() {
            for field in &hierarchy.fields {
                if let Some(argument) = &field.argument {
                    tracing::debug!(
                        "ignoring argument {} of [{}] on {}.{}",
                        argument,
                        self.config.marker,
                        field.declared_in,
                        field.name
                    );
                    log.note(format!(
                        "Ignored argument {} of [{}] on {}.{}",
                        argument, self.config.marker, field.declared_in, field.name
                    ));
                }
            }
        }

        let unit = GeneratedUnit {
            hint_name: hint_name(decl, self.config.kind),
            candidate: decl.qualified_name(),
            source: Emitter::new(self.config).emit(decl, &hierarchy),
        };
        (log, Ok(unit))
    }
}
