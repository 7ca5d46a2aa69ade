//! Flattening and scrape errors.

use nftexp_ruleset::RulesetError;
use thiserror::Error;

/// Errors raised while flattening a snapshot into metric records.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// An entity of a known kind lacks a field or has one of the wrong type.
    #[error("invalid {kind} entity at index {index}: {source}")]
    InvalidEntity {
        index: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two records share a metric name and label set.
    #[error("duplicate series {metric}{{{labels}}}")]
    DuplicateSeries { metric: &'static str, labels: String },
}

/// Any failure of a single scrape.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Load(#[from] RulesetError),

    #[error(transparent)]
    Flatten(#[from] FlattenError),
}

impl ScrapeError {
    /// One-line description safe to hand to an HTTP client.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Load(e) => e.summary(),
            Self::Flatten(FlattenError::InvalidEntity { .. }) => "ruleset contains an unexpected entity",
            Self::Flatten(FlattenError::DuplicateSeries { .. }) => "ruleset produced duplicate series",
        }
    }
}
