//! One scrape: load → flatten → encode.

use nftexp_ruleset::RulesetLoader;
use tracing::debug;

use crate::error::ScrapeError;
use crate::exposition::encode;
use crate::flatten::flatten;

/// Run a full scrape against a freshly loaded snapshot.
///
/// The snapshot and records live only for the duration of this call.
pub async fn scrape(loader: &RulesetLoader) -> Result<String, ScrapeError> {
    let snapshot = loader.load().await?;
    let records = flatten(&snapshot)?;
    debug!(
        entities = snapshot.len(),
        tables = snapshot.count_kind("table"),
        chains = snapshot.count_kind("chain"),
        counters = snapshot.count_kind("counter"),
        records = records.len(),
        "ruleset flattened"
    );
    Ok(encode(&records))
}
