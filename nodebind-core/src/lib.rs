//! # nodebind Core
//!
//! Core declaration model shared by the nodebind crates.
//!
//! This crate provides:
//! - Type declarations, fields and markers as collected from source units
//! - Type references with generic-arity aware path segments
//! - Using directives and the normalized import statements built from them
//! - The `SymbolResolver` capability the generation pipeline runs against
//! - Error types for malformed references

pub mod error;
pub mod imports;
pub mod reference;
pub mod resolver;
pub mod types;

pub use error::{Error, Result};
pub use imports::{ImportStatement, UsingDirective, UsingKind};
pub use reference::{Segment, TypeReference};
pub use resolver::SymbolResolver;
pub use types::{
    DeclId, FieldDecl, GLOBAL_NAMESPACE, Marker, Modifier, SourceUnit, TypeDeclaration, TypeKind,
    UnitId,
};
