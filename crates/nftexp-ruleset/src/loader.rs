//! Snapshot loader — one engine query per call, no caching.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{RulesetError, RulesetResult};
use crate::model::RulesetSnapshot;
use crate::query::RulesetQuery;

/// Loads fresh ruleset snapshots from a query engine.
///
/// Cloning shares the engine handle, which carries no per-request state.
#[derive(Clone)]
pub struct RulesetLoader {
    query: Arc<dyn RulesetQuery>,
}

impl RulesetLoader {
    pub fn new(query: Arc<dyn RulesetQuery>) -> Self {
        Self { query }
    }

    /// Query the engine once and parse the result.
    ///
    /// A blank reply with a zero status is treated as an empty ruleset.
    pub async fn load(&self) -> RulesetResult<RulesetSnapshot> {
        debug!("loading nft ruleset");
        let output = self.query.list_ruleset().await?;

        if output.status != 0 {
            let diagnostic = output.stderr.trim().to_string();
            warn!(status = output.status, %diagnostic, "ruleset query failed");
            return Err(RulesetError::QueryFailed {
                status: output.status,
                diagnostic,
            });
        }

        debug!(bytes = output.stdout.len(), "ruleset query returned");

        if output.stdout.trim().is_empty() {
            return Ok(RulesetSnapshot::default());
        }

        let snapshot = RulesetSnapshot::parse(&output.stdout)?;
        if let Some(meta) = snapshot.metainfo() {
            debug!(
                version = meta.version.as_deref().unwrap_or("unknown"),
                schema = meta.json_schema_version,
                "engine metainfo"
            );
        }
        Ok(snapshot)
    }
}

impl std::fmt::Debug for RulesetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesetLoader").finish_non_exhaustive()
    }
}
