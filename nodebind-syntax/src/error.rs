//! Error types for source parsing and corpus loading.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for source parsing operations.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A token that does not fit the declaration being parsed.
    #[error("{}:{}: expected {}, found '{}'", .path.display(), .line, .expected, .found)]
    UnexpectedToken {
        /// Source path.
        path: PathBuf,
        /// 1-based line.
        line: usize,
        /// What the parser was looking for.
        expected: String,
        /// Text of the token found instead.
        found: String,
    },

    /// The source ended inside a declaration.
    #[error("{}: unexpected end of file, expected {}", .path.display(), .expected)]
    UnexpectedEof {
        /// Source path.
        path: PathBuf,
        /// What the parser was looking for.
        expected: String,
    },

    /// A bracket opened at `line` is never closed.
    #[error("{}:{}: unclosed '{}'", .path.display(), .line, .delimiter)]
    Unbalanced {
        /// Source path.
        path: PathBuf,
        /// 1-based line of the opening bracket.
        line: usize,
        /// The opening bracket.
        delimiter: char,
    },
}

impl ParseError {
    /// Creates an unexpected token error.
    pub fn unexpected(
        path: impl Into<PathBuf>,
        line: usize,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            path: path.into(),
            line,
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an unexpected end of file error.
    pub fn eof(path: impl Into<PathBuf>, expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            path: path.into(),
            expected: expected.into(),
        }
    }
}

/// Error type for building a corpus from the filesystem.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// A source file failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A source file could not be read.
    #[error("failed to read '{}': {}", .path.display(), .source)]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The source directory could not be walked.
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}
