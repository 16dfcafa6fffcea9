//! `StatsService.QueryStats` response aggregation.
//!
//! Counter names are `>>>`-separated segments:
//!
//! ```text
//! user>>>{email}>>>traffic>>>{uplink|downlink}
//! ```
//!
//! Only entries with at least four segments whose second segment equals the
//! tracked email contribute. Values arrive either as JSON integers or as
//! integers encoded in strings; an absent value counts as zero.

use serde::Deserialize;

use v2meter_core::StatsSnapshot;

use crate::error::StatsError;

pub const SEGMENT_SEPARATOR: &str = ">>>";

#[derive(Debug, Deserialize)]
struct QueryStatsResponse {
    #[serde(default)]
    stat: Vec<StatEntry>,
}

#[derive(Debug, Deserialize)]
struct StatEntry {
    name: String,
    #[serde(default)]
    value: Option<CounterValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CounterValue {
    Number(u64),
    Text(String),
}

impl CounterValue {
    fn parse(&self, name: &str) -> Result<u64, StatsError> {
        match self {
            CounterValue::Number(n) => Ok(*n),
            CounterValue::Text(text) => {
                text.trim()
                    .parse()
                    .map_err(|_| StatsError::InvalidValue {
                        name: name.to_string(),
                        value: text.clone(),
                    })
            }
        }
    }
}

/// Sum the tracked user's uplink and downlink counters from a raw response.
///
/// A response without a `stat` list yields a zero snapshot; invalid JSON or a
/// non-integer value on a matching counter is an error.
pub fn aggregate(raw: &str, email: &str) -> Result<StatsSnapshot, StatsError> {
    let response: QueryStatsResponse = serde_json::from_str(raw)?;
    let mut snapshot = StatsSnapshot::default();

    for entry in &response.stat {
        let segments: Vec<&str> = entry.name.split(SEGMENT_SEPARATOR).collect();
        if segments.len() < 4 || segments[1] != email {
            continue;
        }

        let value = match &entry.value {
            Some(value) => value.parse(&entry.name)?,
            None => 0,
        };

        let direction = segments[3];
        if direction.contains("uplink") {
            snapshot.uplink = snapshot.uplink.saturating_add(value);
        } else if direction.contains("downlink") {
            snapshot.downlink = snapshot.downlink.saturating_add(value);
        }
    }

    Ok(snapshot)
}
