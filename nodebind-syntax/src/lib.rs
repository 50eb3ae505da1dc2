//! # nodebind Syntax
//!
//! Reads C# sources into the nodebind declaration model.
//!
//! This crate provides:
//! - A tokenizer for C# source text
//! - A declaration parser for namespaces, usings, types and fields
//! - A symbol table keyed by fully qualified, arity-aware paths
//! - The `Corpus`, a `SymbolResolver` over every loaded source unit

pub mod corpus;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbols;

pub use corpus::Corpus;
pub use error::{CorpusError, ParseError};
pub use parser::{ParsedSource, parse_source};
pub use symbols::SymbolTable;
