//! Pure config transformation.
//!
//! ## Mutations, applied in order
//!
//! 1. `api`     — enable `StatsService`, `HandlerService`, `LoggerService`
//! 2. `stats`   — empty object (turns counters on)
//! 3. `policy`  — user accounting at the identity's level, system-wide
//!    inbound/outbound accounting
//! 4. `inbounds[0]`      — loopback `dokodemo-door` admin inbound
//! 5. `routing.rules[0]` — route the admin inbound tag to the `api` outbound
//! 6. first inbound of the target protocol — its first client becomes the
//!    tracked identity (`id`, `email`, `level`); other clients are untouched

use serde_json::{json, Map, Value};

use v2meter_core::types::ApiEndpoint;
use v2meter_core::{Identity, Settings};

use crate::error::ConfigError;

pub const API_SERVICES: [&str; 3] = ["StatsService", "HandlerService", "LoggerService"];

/// What [`transform`] did beyond the fixed injections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOutcome {
    /// `false` when no inbound of the target protocol had a client to bind.
    pub client_updated: bool,
}

/// Apply every mutation to `config` in place.
///
/// Fails only when a field that must be edited has the wrong JSON type; a
/// missing target inbound is a warning, not an error.
pub fn transform(config: &mut Value, settings: &Settings) -> Result<TransformOutcome, ConfigError> {
    let root = config.as_object_mut().ok_or(ConfigError::InvalidShape {
        field: "<root>",
        expected: "an object",
    })?;

    root.insert("api".to_string(), api_block(&settings.api));
    root.insert("stats".to_string(), json!({}));
    root.insert("policy".to_string(), policy_block(&settings.identity));

    array_entry(root, "inbounds")?.insert(0, api_inbound(&settings.api));

    let routing = root
        .entry("routing")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or(ConfigError::InvalidShape {
            field: "routing",
            expected: "an object",
        })?;
    array_entry(routing, "rules")?.insert(0, api_rule(&settings.api));

    let inbounds = array_entry(root, "inbounds")?;
    let client_updated = bind_identity(inbounds, settings)?;
    if client_updated {
        tracing::info!(
            protocol = %settings.inbound_protocol,
            uuid = %settings.identity.uuid,
            email = %settings.identity.email,
            "bound tracked identity to first client",
        );
    } else {
        tracing::warn!(
            protocol = %settings.inbound_protocol,
            "no inbound with clients found for protocol; identity not bound",
        );
    }

    Ok(TransformOutcome { client_updated })
}

// ---------------------------------------------------------------------------
// Injected blocks
// ---------------------------------------------------------------------------

fn api_block(api: &ApiEndpoint) -> Value {
    json!({
        "tag": api.tag,
        "services": API_SERVICES,
    })
}

/// Per-user counters are enabled for the level the tracked identity is bound at.
fn policy_block(identity: &Identity) -> Value {
    let mut levels = Map::new();
    levels.insert(
        identity.level.to_string(),
        json!({
            "statsUserUplink": true,
            "statsUserDownlink": true,
        }),
    );

    json!({
        "levels": levels,
        "system": {
            "statsInboundUplink": true,
            "statsInboundDownlink": true,
            "statsOutboundUplink": true,
            "statsOutboundDownlink": true,
        }
    })
}

fn api_inbound(api: &ApiEndpoint) -> Value {
    json!({
        "listen": api.listen,
        "port": api.port,
        "protocol": "dokodemo-door",
        "settings": { "address": api.listen },
        "tag": api.tag,
    })
}

fn api_rule(api: &ApiEndpoint) -> Value {
    json!({
        "inboundTag": [api.tag],
        "outboundTag": api.tag,
        "type": "field",
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn array_entry<'a>(
    map: &'a mut Map<String, Value>,
    field: &'static str,
) -> Result<&'a mut Vec<Value>, ConfigError> {
    map.entry(field)
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or(ConfigError::InvalidShape {
            field,
            expected: "an array",
        })
}

/// Overwrite the first client of the first matching inbound. Index 0 is the
/// admin inbound injected above and is never a candidate.
fn bind_identity(inbounds: &mut [Value], settings: &Settings) -> Result<bool, ConfigError> {
    let target = inbounds
        .iter_mut()
        .skip(1)
        .find(|inbound| {
            inbound.get("protocol").and_then(Value::as_str)
                == Some(settings.inbound_protocol.as_str())
        });
    let Some(inbound) = target else {
        return Ok(false);
    };

    let Some(first) = inbound
        .pointer_mut("/settings/clients")
        .and_then(Value::as_array_mut)
        .and_then(|clients| clients.first_mut())
    else {
        return Ok(false);
    };

    let client = first.as_object_mut().ok_or(ConfigError::InvalidShape {
        field: "settings.clients[0]",
        expected: "an object",
    })?;
    client.insert("id".to_string(), json!(settings.identity.uuid));
    client.insert("email".to_string(), json!(settings.identity.email));
    client.insert("level".to_string(), json!(settings.identity.level));
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
