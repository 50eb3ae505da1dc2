//! Error types for code generation.

use thiserror::Error;

/// Error type for code generation operations.
#[derive(Debug, Error)]
pub enum CodegenError {
    /// Source parsing error.
    #[error("source parse error: {0}")]
    Parse(#[from] nodebind_syntax::ParseError),

    /// Corpus loading error.
    #[error("corpus error: {0}")]
    Corpus(#[from] nodebind_syntax::CorpusError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// One or more candidates failed to generate.
    #[error("{failed} of {total} candidates failed to generate")]
    CandidatesFailed {
        /// Number of failed candidates.
        failed: usize,
        /// Number of candidates processed.
        total: usize,
    },
}

/// A condition that stops generation for one candidate.
///
/// Other candidates of the same run are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    /// The base chain revisits a type.
    #[error("cyclic base chain for '{candidate}': {}", .chain.join(" -> "))]
    CyclicHierarchy {
        /// Qualified name of the candidate.
        candidate: String,
        /// Types visited, ending with the revisited one.
        chain: Vec<String>,
    },

    /// A marked field's type cannot be named in the generated unit.
    #[error(
        "field '{field}' of '{declared_in}' has unrenderable type '{type_text}' (candidate '{candidate}')"
    )]
    UnrenderableFieldType {
        /// Qualified name of the candidate.
        candidate: String,
        /// Qualified name of the type declaring the field.
        declared_in: String,
        /// Field name.
        field: String,
        /// Field type as written.
        type_text: String,
    },

    /// A nested candidate sits inside a type that cannot be re-opened.
    #[error("'{candidate}' is nested in '{containing}', which is not declared partial")]
    ContainingTypeNotPartial {
        /// Qualified name of the candidate.
        candidate: String,
        /// Qualified name of the containing type.
        containing: String,
    },

    /// Two candidates map to the same hint name.
    #[error("hint name '{hint_name}' of '{candidate}' is already used by '{existing}'")]
    HintNameCollision {
        /// Qualified name of the rejected candidate.
        candidate: String,
        /// The contested hint name.
        hint_name: String,
        /// Qualified name of the candidate that kept the hint name.
        existing: String,
    },
}

impl CandidateError {
    /// Returns the qualified name of the failed candidate.
    #[must_use]
    pub fn candidate(&self) -> &str {
        match self {
            Self::CyclicHierarchy { candidate, .. }
            | Self::UnrenderableFieldType { candidate, .. }
            | Self::ContainingTypeNotPartial { candidate, .. }
            | Self::HintNameCollision { candidate, .. } => candidate,
        }
    }
}
