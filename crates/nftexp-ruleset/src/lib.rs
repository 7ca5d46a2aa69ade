//! nftexp-ruleset — point-in-time snapshots of the nftables ruleset.
//!
//! Runs the ruleset query engine once per scrape and parses its JSON
//! output into an immutable [`RulesetSnapshot`]. Nothing here is cached:
//! every call to [`RulesetLoader::load`] produces a fresh, independently
//! owned snapshot.
//!
//! # Architecture
//!
//! ```text
//! RulesetLoader
//!   ├── Arc<dyn RulesetQuery>   ← NftCli in production, fakes in tests
//!   │     └── list_ruleset() → QueryOutput { status, stdout, stderr }
//!   └── load() → RulesetSnapshot | RulesetError
//! ```

pub mod error;
pub mod loader;
pub mod model;
pub mod query;

pub use error::{RulesetError, RulesetResult};
pub use loader::RulesetLoader;
pub use model::{ChainEntity, CounterEntity, Entity, Family, Metainfo, RulesetSnapshot, TableEntity};
pub use query::{NftCli, QueryConfig, QueryFuture, QueryOutput, RulesetQuery};
