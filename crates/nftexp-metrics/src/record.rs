//! Metric records and the fixed set of metric names.

use std::fmt;

/// Exposition type of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Gauge,
    Counter,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Counter => "counter",
        }
    }
}

/// The metrics this exporter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    Table,
    Chain,
    CounterPackets,
    CounterBytes,
}

impl MetricName {
    /// Exposition order.
    pub const ALL: [MetricName; 4] = [
        MetricName::Table,
        MetricName::Chain,
        MetricName::CounterPackets,
        MetricName::CounterBytes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "nft_table",
            Self::Chain => "nft_chain",
            Self::CounterPackets => "nft_counter_packets",
            Self::CounterBytes => "nft_counter_bytes",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::Table => "nftables table present in the ruleset.",
            Self::Chain => "nftables chain present in the ruleset.",
            Self::CounterPackets => "Packets matched by a named nftables counter.",
            Self::CounterBytes => "Bytes matched by a named nftables counter.",
        }
    }

    pub fn metric_type(self) -> MetricType {
        match self {
            Self::Table | Self::Chain => MetricType::Gauge,
            Self::CounterPackets | Self::CounterBytes => MetricType::Counter,
        }
    }

    /// Label keys, in rendering order.
    pub fn label_keys(self) -> &'static [&'static str] {
        match self {
            Self::Table => &["family", "name"],
            Self::Chain | Self::CounterPackets | Self::CounterBytes => &["family", "table", "name"],
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample: metric name, ordered label set and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub name: MetricName,
    /// `(key, value)` pairs in [`MetricName::label_keys`] order. Values are raw.
    pub labels: Vec<(&'static str, String)>,
    pub value: u64,
}

impl MetricRecord {
    /// Build a record, pairing `values` with the name's label keys.
    ///
    /// Panics in debug builds if the number of values does not match.
    pub fn new<I>(name: MetricName, values: I, value: u64) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let keys = name.label_keys();
        let labels: Vec<(&'static str, String)> = keys
            .iter()
            .copied()
            .zip(values.into_iter().map(Into::into))
            .collect();
        debug_assert_eq!(labels.len(), keys.len(), "label count mismatch for {name}");
        Self { name, labels, value }
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}
