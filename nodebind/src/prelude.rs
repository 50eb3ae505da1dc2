//! Prelude module for convenient imports.
//!
//! ```ignore
//! use nodebind::prelude::*;
//! ```

// Declaration model
pub use nodebind_core::{
    DeclId, FieldDecl, ImportStatement, Marker, SymbolResolver, TypeDeclaration, TypeReference,
};

// Source corpus
pub use nodebind_syntax::{Corpus, CorpusError, ParseError};

// Generation
pub use nodebind_codegen::{
    CandidateError, CodegenError, DependencyLookup, Driver, GeneratedUnit, GenerationOutput,
    GeneratorConfig, GeneratorKind, HintNames, generate,
};

// Run configuration
pub use crate::config::{ConfigError, RunConfig};
pub use crate::{RunReport, generate_dir};
