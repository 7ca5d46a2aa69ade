//! nftexp-metrics — turns a ruleset snapshot into Prometheus text.
//!
//! # Architecture
//!
//! ```text
//! scrape(&RulesetLoader)
//!   ├── RulesetLoader::load() → RulesetSnapshot
//!   ├── flatten()             → Vec<MetricRecord>
//!   └── encode()              → text/plain for /metrics
//! ```
//!
//! Every stage takes its input by value or reference and returns a new
//! value; no stage keeps state between scrapes.

pub mod error;
pub mod exposition;
pub mod flatten;
pub mod pipeline;
pub mod record;

pub use error::{FlattenError, ScrapeError};
pub use exposition::{CONTENT_TYPE, encode, escape_label_value};
pub use flatten::flatten;
pub use pipeline::scrape;
pub use record::{MetricName, MetricRecord, MetricType};
