//! Domain types shared by every v2meter crate.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The single tracked proxy user.
///
/// `uuid` is both the proxy credential written into the daemon config and the
/// correlation key sent with every usage report. `email` is the label the
/// daemon uses in its per-user counter names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub uuid: String,
    pub email: String,
    pub level: u32,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            uuid: "779548c3-2ea9-4bea-a3b4-8618a26566ae".to_string(),
            email: "user@v2ray".to_string(),
            level: 0,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.uuid, self.email)
    }
}

// ---------------------------------------------------------------------------
// Admin API endpoint
// ---------------------------------------------------------------------------

/// Loopback inbound that exposes the daemon's admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoint {
    pub listen: String,
    pub port: u16,
    /// Tag shared by the api block, the inbound, and the routing rule.
    pub tag: String,
}

impl ApiEndpoint {
    /// `host:port` form passed as `--server=` to the admin CLI.
    pub fn server(&self) -> String {
        format!("{}:{}", self.listen, self.port)
    }
}

impl Default for ApiEndpoint {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1".to_string(),
            port: 10085,
            tag: "api".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// One polling cycle's cumulative byte counters for the tracked identity.
///
/// Serializes to exactly `{"uplink": N, "downlink": N}`, the report body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub uplink: u64,
    pub downlink: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uplink={} downlink={}", self.uplink, self.downlink)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
