//! Error types for ruleset loading.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for ruleset operations.
pub type RulesetResult<T> = Result<T, RulesetError>;

/// Errors that can occur while querying or parsing the ruleset.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// The engine ran but reported a non-zero status.
    #[error("ruleset query failed (status {status}): {diagnostic}")]
    QueryFailed { status: i32, diagnostic: String },

    /// The engine output is not the expected JSON document.
    #[error("malformed ruleset output: {0}")]
    MalformedOutput(String),

    /// The engine binary could not be started.
    #[error("failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The engine did not finish within the configured bound.
    #[error("ruleset query timed out after {0:?}")]
    Timeout(Duration),
}

impl RulesetError {
    /// One-line description safe to hand to an HTTP client.
    ///
    /// Unlike `Display`, this never includes engine diagnostics, paths or
    /// payload excerpts.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::QueryFailed { .. } => "ruleset query failed",
            Self::MalformedOutput(_) => "ruleset query returned malformed output",
            Self::Spawn { .. } => "ruleset query engine unavailable",
            Self::Timeout(_) => "ruleset query timed out",
        }
    }
}
