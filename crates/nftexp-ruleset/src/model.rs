//! Ruleset snapshot data model.
//!
//! The engine answers `list ruleset` with a document of the form
//!
//! ```json
//! { "nftables": [ { "metainfo": { ... } }, { "table": { ... } }, { "chain": { ... } } ] }
//! ```
//!
//! Each element is a single-key object whose key names the entity kind.
//! The snapshot keeps elements raw and in order; typed views such as
//! [`TableEntity`] are decoded on demand by consumers.

use std::fmt;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RulesetError, RulesetResult};

/// Top-level key of the engine's JSON document.
pub const ROOT_KEY: &str = "nftables";

/// Address family of a table.
///
/// Families this crate does not know about are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Family {
    Ip,
    Ip6,
    Inet,
    Arp,
    Bridge,
    Netdev,
    Other(String),
}

impl Family {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ip => "ip",
            Self::Ip6 => "ip6",
            Self::Inet => "inet",
            Self::Arp => "arp",
            Self::Bridge => "bridge",
            Self::Netdev => "netdev",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Family {
    fn from(name: String) -> Self {
        match name.as_str() {
            "ip" => Self::Ip,
            "ip6" => Self::Ip6,
            "inet" => Self::Inet,
            "arp" => Self::Arp,
            "bridge" => Self::Bridge,
            "netdev" => Self::Netdev,
            _ => Self::Other(name),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A table. Identity is `(family, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TableEntity {
    pub family: Family,
    pub name: String,
}

/// A chain. Identity is `(family, table, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChainEntity {
    pub family: Family,
    pub table: String,
    pub name: String,
}

/// A named counter object. Identity is `(family, table, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CounterEntity {
    pub family: Family,
    pub table: String,
    pub name: String,
    pub packets: u64,
    pub bytes: u64,
}

/// Engine metadata carried as the first element of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Metainfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub release_name: Option<String>,
    #[serde(default)]
    pub json_schema_version: Option<u32>,
}

/// One raw element of the ruleset document.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// The element's single key: `table`, `chain`, `counter`, `rule`, ...
    pub kind: String,
    /// The object stored under that key, untouched.
    pub body: Value,
}

impl Entity {
    pub fn new(kind: impl Into<String>, body: Value) -> Self {
        Self {
            kind: kind.into(),
            body,
        }
    }
}

/// An immutable, ordered snapshot of the ruleset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesetSnapshot {
    entities: Vec<Entity>,
}

impl RulesetSnapshot {
    /// Build a snapshot from already-separated entities.
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Parse the engine's JSON document.
    pub fn parse(payload: &str) -> RulesetResult<Self> {
        let doc: Value = serde_json::from_str(payload)
            .map_err(|e| RulesetError::MalformedOutput(e.to_string()))?;

        let elements = doc
            .get(ROOT_KEY)
            .ok_or_else(|| RulesetError::MalformedOutput(format!("missing `{ROOT_KEY}` key")))?
            .as_array()
            .ok_or_else(|| RulesetError::MalformedOutput(format!("`{ROOT_KEY}` is not an array")))?;

        let mut entities = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let object = element.as_object().ok_or_else(|| {
                RulesetError::MalformedOutput(format!("element {index} is not an object"))
            })?;
            if object.len() != 1 {
                return Err(RulesetError::MalformedOutput(format!(
                    "element {index} has {} keys, expected exactly one",
                    object.len()
                )));
            }
            if let Some((kind, body)) = object.iter().next() {
                entities.push(Entity::new(kind.clone(), body.clone()));
            }
        }

        Ok(Self { entities })
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Engine metadata, if the document carried a well-formed `metainfo` element.
    pub fn metainfo(&self) -> Option<Metainfo> {
        self.entities
            .iter()
            .find(|e| e.kind == "metainfo")
            .and_then(|e| Metainfo::deserialize(&e.body).ok())
    }

    /// Number of entities of the given kind.
    pub fn count_kind(&self, kind: &str) -> usize {
        self.entities.iter().filter(|e| e.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"nftables": [
        {"metainfo": {"version": "1.0.9", "release_name": "Old Doc Yak #3", "json_schema_version": 1}},
        {"table": {"family": "inet", "name": "filter", "handle": 1}},
        {"chain": {"family": "inet", "table": "filter", "name": "input", "handle": 1,
                   "type": "filter", "hook": "input", "prio": 0, "policy": "accept"}},
        {"counter": {"family": "inet", "name": "ssh", "table": "filter", "handle": 2,
                     "packets": 12, "bytes": 720}},
        {"rule": {"family": "inet", "table": "filter", "chain": "input", "handle": 3, "expr": []}}
    ]}"#;

    #[test]
    fn parse_keeps_order_and_kinds() {
        let snapshot = RulesetSnapshot::parse(SAMPLE).unwrap();
        let kinds: Vec<&str> = snapshot.entities().iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, ["metainfo", "table", "chain", "counter", "rule"]);
        assert_eq!(snapshot.count_kind("counter"), 1);
    }

    #[test]
    fn parse_empty_ruleset() {
        let snapshot = RulesetSnapshot::parse(r#"{"nftables": []}"#).unwrap();
        assert!(snapshot.is_empty());
        assert!(snapshot.metainfo().is_none());
    }

    #[test]
    fn metainfo_is_decoded() {
        let snapshot = RulesetSnapshot::parse(SAMPLE).unwrap();
        let meta = snapshot.metainfo().unwrap();
        assert_eq!(meta.version.as_deref(), Some("1.0.9"));
        assert_eq!(meta.json_schema_version, Some(1));
    }

    #[test]
    fn typed_entities_decode_from_body() {
        let snapshot = RulesetSnapshot::parse(SAMPLE).unwrap();
        let table = TableEntity::deserialize(&snapshot.entities()[1].body).unwrap();
        assert_eq!(table.family, Family::Inet);
        assert_eq!(table.name, "filter");

        let counter = CounterEntity::deserialize(&snapshot.entities()[3].body).unwrap();
        assert_eq!(counter.packets, 12);
        assert_eq!(counter.bytes, 720);
    }

    #[test]
    fn counter_values_beyond_f64_precision_survive() {
        let payload = r#"{"nftables": [{"counter": {"family": "ip", "table": "t", "name": "c",
            "packets": 18446744073709551615, "bytes": 9007199254740993}}]}"#;
        let snapshot = RulesetSnapshot::parse(payload).unwrap();
        let counter = CounterEntity::deserialize(&snapshot.entities()[0].body).unwrap();
        assert_eq!(counter.packets, u64::MAX);
        assert_eq!(counter.bytes, 9_007_199_254_740_993);
    }

    #[test]
    fn family_display_is_lowercase() {
        assert_eq!(Family::Ip6.to_string(), "ip6");
        assert_eq!(Family::Netdev.to_string(), "netdev");
    }

    #[test]
    fn unknown_family_is_kept_verbatim() {
        let body = serde_json::json!({"family": "decnet", "name": "filter"});
        let table = TableEntity::deserialize(&body).unwrap();
        assert_eq!(table.family, Family::Other("decnet".to_string()));
        assert_eq!(table.family.to_string(), "decnet");
    }

    #[test]
    fn known_family_strings_map_to_variants() {
        assert_eq!(Family::from("bridge".to_string()), Family::Bridge);
        assert_eq!(Family::from("ip".to_string()), Family::Ip);
    }

    #[test]
    fn rejects_invalid_json() {
        let err = RulesetSnapshot::parse("Error: syntax error").unwrap_err();
        assert!(matches!(err, RulesetError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_missing_root_key() {
        let err = RulesetSnapshot::parse(r#"{"rules": []}"#).unwrap_err();
        assert!(matches!(err, RulesetError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_non_array_root() {
        let err = RulesetSnapshot::parse(r#"{"nftables": {}}"#).unwrap_err();
        assert!(matches!(err, RulesetError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_non_object_element() {
        let err = RulesetSnapshot::parse(r#"{"nftables": ["table"]}"#).unwrap_err();
        assert!(matches!(err, RulesetError::MalformedOutput(_)));
    }

    #[test]
    fn rejects_multi_key_element() {
        let err = RulesetSnapshot::parse(r#"{"nftables": [{"table": {}, "chain": {}}]}"#).unwrap_err();
        assert!(matches!(err, RulesetError::MalformedOutput(_)));
    }
}
