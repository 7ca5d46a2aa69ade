//! Prometheus text exposition format.
//!
//! Renders metric records as
//!
//! ```text
//! # HELP nft_counter_bytes Bytes matched by a named nftables counter.
//! # TYPE nft_counter_bytes counter
//! nft_counter_bytes{family="inet", table="t1", name="c1"} 1000
//! ```
//!
//! Records are grouped per metric name so each family is contiguous;
//! families with no samples are omitted entirely.

use std::borrow::Cow;
use std::fmt::Write;

use crate::record::{MetricName, MetricRecord};

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render records into exposition text. Empty input renders as `""`.
pub fn encode(records: &[MetricRecord]) -> String {
    let mut out = String::new();

    for name in MetricName::ALL {
        let mut family = records.iter().filter(|r| r.name == name).peekable();
        if family.peek().is_none() {
            continue;
        }

        // Writing into a String cannot fail.
        let _ = writeln!(out, "# HELP {} {}", name.as_str(), name.help());
        let _ = writeln!(out, "# TYPE {} {}", name.as_str(), name.metric_type().as_str());
        for record in family {
            write_sample(&mut out, record);
        }
    }

    out
}

fn write_sample(out: &mut String, record: &MetricRecord) {
    out.push_str(record.name.as_str());
    out.push('{');
    for (i, (key, value)) in record.labels.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{key}=\"{}\"", escape_label_value(value));
    }
    let _ = writeln!(out, "}} {}", record.value);
}

/// Escape a label value: backslash, double quote and newline.
pub fn escape_label_value(value: &str) -> Cow<'_, str> {
    if !value.contains(['\\', '"', '\n']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
