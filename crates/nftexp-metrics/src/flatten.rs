//! Ruleset flattening.
//!
//! | Entity kind | Records | Labels | Value |
//! |---|---|---|---|
//! | `table` | `nft_table` | family, name | 1 |
//! | `chain` | `nft_chain` | family, table, name | 1 |
//! | `counter` | `nft_counter_packets`, `nft_counter_bytes` | family, table, name | packets, bytes |
//!
//! Any other kind (`metainfo`, `rule`, `set`, ...) is skipped.

use std::collections::HashSet;

use nftexp_ruleset::{ChainEntity, CounterEntity, Entity, RulesetSnapshot, TableEntity};
use serde::Deserialize;
use tracing::trace;

use crate::error::FlattenError;
use crate::record::{MetricName, MetricRecord};

/// Flatten a snapshot into metric records, in entity order.
pub fn flatten(snapshot: &RulesetSnapshot) -> Result<Vec<MetricRecord>, FlattenError> {
    let mut records = Vec::with_capacity(snapshot.len());

    for (index, entity) in snapshot.entities().iter().enumerate() {
        match entity.kind.as_str() {
            "table" => {
                let table: TableEntity = decode(index, entity)?;
                records.push(MetricRecord::new(
                    MetricName::Table,
                    [table.family.to_string(), table.name],
                    1,
                ));
            }
            "chain" => {
                let chain: ChainEntity = decode(index, entity)?;
                records.push(MetricRecord::new(
                    MetricName::Chain,
                    [chain.family.to_string(), chain.table, chain.name],
                    1,
                ));
            }
            "counter" => {
                let counter: CounterEntity = decode(index, entity)?;
                let labels = [counter.family.to_string(), counter.table, counter.name];
                records.push(MetricRecord::new(
                    MetricName::CounterPackets,
                    labels.clone(),
                    counter.packets,
                ));
                records.push(MetricRecord::new(MetricName::CounterBytes, labels, counter.bytes));
            }
            other => trace!(index, kind = other, "skipping entity"),
        }
    }

    ensure_unique(&records)?;
    Ok(records)
}

fn decode<'a, T: Deserialize<'a>>(index: usize, entity: &'a Entity) -> Result<T, FlattenError> {
    T::deserialize(&entity.body).map_err(|source| FlattenError::InvalidEntity {
        index,
        kind: entity.kind.clone(),
        source,
    })
}

fn ensure_unique(records: &[MetricRecord]) -> Result<(), FlattenError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert((record.name, &record.labels)) {
            let labels = record
                .labels
                .iter()
                .map(|(k, v)| format!("{k}={v:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(FlattenError::DuplicateSeries {
                metric: record.name.as_str(),
                labels,
            });
        }
    }
    Ok(())
}
