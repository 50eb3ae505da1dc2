//! # nodebind
//!
//! Build-time generation of field resolvers for C# game code.
//!
//! Fields marked `[InjectDependency]` or `[SceneNode("path")]` on a partial
//! class are collected across the class's inheritance chain, and a partial
//! re-declaration of the class is generated with a resolve method that
//! assigns each field from a runtime lookup.
//!
//! ## Quick Start
//!
//! ```ignore
//! use nodebind::prelude::*;
//! use std::path::Path;
//!
//! let corpus = Corpus::load_dir(Path::new("game/scripts"))?;
//! let output = generate(&corpus, &GeneratorConfig::scene_node());
//! output.write_to(Path::new("game/generated"))?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Declaration model and the symbol resolution trait
//! - [`syntax`] - C# parsing, symbol table and source corpus
//! - [`codegen`] - Scanner, walker, emitter and driver
//! - [`config`] - Run configuration files

pub mod config;
pub mod prelude;

/// Declaration model and symbol resolution.
pub mod core {
    pub use nodebind_core::*;
}

/// C# parsing and the source corpus.
pub mod syntax {
    pub use nodebind_syntax::*;
}

/// Resolver generation.
pub mod codegen {
    pub use nodebind_codegen::*;
}

pub use config::{ConfigError, RunConfig};
pub use nodebind_codegen::{
    CandidateError, CodegenError, GenerationOutput, GeneratorConfig, GeneratorKind, HintNames,
    generate,
};
pub use nodebind_syntax::Corpus;

use std::path::{Path, PathBuf};

/// Outcome of generating a source directory into an output directory.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// One output per configured generator, in order.
    pub outputs: Vec<GenerationOutput>,
    /// Files written, in order.
    pub written: Vec<PathBuf>,
}

impl RunReport {
    /// Number of generated units.
    #[must_use]
    pub fn units(&self) -> usize {
        self.outputs.iter().map(|o| o.units.len()).sum()
    }

    /// Every candidate failure, in generator order.
    pub fn errors(&self) -> impl Iterator<Item = &CandidateError> {
        self.outputs.iter().flat_map(|o| o.errors.iter())
    }

    /// Number of candidates processed.
    #[must_use]
    pub fn candidates(&self) -> usize {
        self.outputs.iter().map(GenerationOutput::candidates).sum()
    }

    /// Returns true if no candidate failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outputs.iter().all(GenerationOutput::is_success)
    }
}

/// Loads every source under `source_dir`, runs each configured generator
/// and writes the generated units into `out_dir`.
///
/// Units of successful candidates are written even when other candidates
/// fail; check [`RunReport::is_success`]. A unit whose hint name an earlier
/// generator already wrote is reported as a collision instead of replacing
/// that file.
///
/// # Arguments
/// * `source_dir` - Directory of C# sources
/// * `out_dir` - Directory generated units are written to
/// * `config` - Generators to run
///
/// # Errors
/// Returns `CodegenError` if the sources cannot be loaded or a unit cannot
/// be written.
pub fn generate_dir(
    source_dir: &Path,
    out_dir: &Path,
    config: &RunConfig,
) -> Result<RunReport, CodegenError> {
    let corpus = Corpus::load_dir(source_dir)?;
    let mut report = RunReport::default();
    let mut names = HintNames::new();
    for generator in &config.generators {
        let mut output = generate(&corpus, generator);
        output.claim_hint_names(&mut names);
        report.written.extend(output.write_to(out_dir)?);
        report.outputs.push(output);
    }
    tracing::info!(
        "generated {} units from {} candidates into {}",
        report.units(),
        report.candidates(),
        out_dir.display()
    );
    Ok(report)
}
