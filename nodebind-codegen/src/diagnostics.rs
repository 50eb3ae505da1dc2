//! Diagnostic dump of a generation run.
//!
//! Each candidate records its notes into its own [`CandidateLog`]; the
//! driver appends the logs in candidate order and flushes the collected
//! text once at the end of the run. A flush failure is logged and never
//! fails generation.

use std::path::{Path, PathBuf};

/// Header written at the top of every dump.
pub const RUN_HEADER: &str = "=== GENERATION RUN ===\n";

/// Notes recorded while processing one candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateLog {
    lines: Vec<String>,
}

impl CandidateLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one note.
    pub fn note(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Returns the notes in order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns true if nothing was noted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Run-wide diagnostics collector.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    target: Option<PathBuf>,
    buffer: String,
}

impl Diagnostics {
    /// Creates a collector that flushes to `target`, or nowhere.
    #[must_use]
    pub fn new(target: Option<PathBuf>) -> Self {
        Self {
            target,
            buffer: RUN_HEADER.to_string(),
        }
    }

    /// Returns the dump file, if any.
    #[must_use]
    pub fn target(&self) -> Option<&Path> {
        self.target.as_deref()
    }

    /// Appends a candidate's notes.
    pub fn append(&mut self, log: &CandidateLog) {
        for line in log.lines() {
            self.buffer.push_str(line);
            self.buffer.push('\n');
        }
    }

    /// Returns the collected text.
    #[must_use]
    pub fn contents(&self) -> &str {
        &self.buffer
    }

    /// Writes the collected text to the dump file, replacing any previous
    /// run's dump.
    ///
    /// # Returns
    /// `true` if a dump file was written.
    pub fn flush(&self) -> bool {
        let Some(target) = &self.target else {
            return false;
        };
        match std::fs::write(target, &self.buffer) {
            Ok(()) => {
                tracing::debug!("wrote diagnostic dump to {}", target.display());
                true
            }
            Err(e) => {
                tracing::warn!(
                    "failed to write diagnostic dump to {}: {}",
                    target.display(),
                    e
                );
                false
            }
        }
    }
}
