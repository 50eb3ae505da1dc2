//! # nodebind Codegen
//!
//! Resolver generation for C# fields marked with a lookup marker.
//!
//! This crate provides:
//! - Candidate discovery over a `SymbolResolver`
//! - Inheritance chain traversal with import aggregation
//! - Rendering of partial classes implementing a resolver interface
//! - A driver that runs candidates in parallel and aggregates the units
//! - An optional diagnostic dump of each run

pub mod config;
pub mod diagnostics;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod kind;
pub mod scanner;
pub mod walker;

pub use config::{DependencyLookup, GeneratorConfig};
pub use diagnostics::{CandidateLog, Diagnostics};
pub use driver::{Driver, GeneratedUnit, GenerationOutput, HintNames, hint_name};
pub use emitter::Emitter;
pub use error::{CandidateError, CodegenError};
pub use kind::GeneratorKind;
pub use scanner::Scanner;
pub use walker::{EnclosingType, Hierarchy, MarkedField, Walker};

use nodebind_core::SymbolResolver;
use nodebind_syntax::Corpus;
use std::path::Path;

/// Runs one generator over `resolver`.
///
/// # Arguments
/// * `resolver` - Declarations and symbol resolution of the input corpus
/// * `config` - Generator configuration
///
/// # Returns
/// The generated units and the candidates that failed.
#[must_use]
pub fn generate<R>(resolver: &R, config: &GeneratorConfig) -> GenerationOutput
where
    R: SymbolResolver + Sync + ?Sized,
{
    Driver::new(resolver, config).run()
}

/// Generates from C# source text held in memory.
///
/// # Arguments
/// * `sources` - `(path, text)` pairs in corpus order
/// * `config` - Generator configuration
///
/// # Errors
/// Returns `CodegenError` if a source fails to parse.
pub fn generate_from_sources<I, P, S>(
    sources: I,
    config: &GeneratorConfig,
) -> Result<GenerationOutput, CodegenError>
where
    I: IntoIterator<Item = (P, S)>,
    P: Into<std::path::PathBuf>,
    S: AsRef<str>,
{
    let corpus = Corpus::from_sources(sources)?;
    Ok(generate(&corpus, config))
}

/// Generates from every C# source under a directory.
///
/// # Arguments
/// * `root` - Directory to load sources from
/// * `configs` - One configuration per generator to run
///
/// # Returns
/// One output per configuration, in order. Hint names are unique across
/// all outputs; a unit whose name an earlier output already produced is
/// reported as a collision.
///
/// # Errors
/// Returns `CodegenError` if the directory cannot be loaded.
pub fn generate_from_dir(
    root: &Path,
    configs: &[GeneratorConfig],
) -> Result<Vec<GenerationOutput>, CodegenError> {
    let corpus = Corpus::load_dir(root)?;
    let mut names = HintNames::new();
    Ok(configs
        .iter()
        .map(|config| {
            let mut output = generate(&corpus, config);
            output.claim_hint_names(&mut names);
            output
        })
        .collect())
}
