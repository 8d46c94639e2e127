//! Message envelopes and the payload pack/unpack contract.
//!
//! A message travels through the runtime in two shapes. `QueuedMessage` is
//! the envelope sitting in the dispatch queue: target, name, sender, options,
//! and the payload already packed to bytes so a broadcast packs exactly once.
//! `MessageDelivery` is the resolved value handed to handlers: the payload
//! unpacked back to a JSON value plus the game time at delivery.
//!
//! Payload values are opaque to the dispatch core — behaviors put arbitrary
//! JSON-shaped data in them. Packing is the one place the shape is checked:
//! every offending field is collected and reported in a single `PackError`
//! rather than failing on the first, so script authors see the full damage
//! at once.

use bytes::Bytes;
use serde_json::Value;
use thiserror::Error;

/// Deepest container nesting a payload may carry on the wire.
pub const MAX_PAYLOAD_DEPTH: usize = 32;

/// Longest string field a payload may carry, in UTF-8 bytes.
pub const MAX_STRING_BYTES: usize = u16::MAX as usize;

/// Payload validation failure.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackError {
    /// One or more payload fields cannot be represented on the wire. Lists
    /// the path of every offending field.
    #[error("message payload rejected, {} invalid field(s): {}", fields.len(), fields.join(", "))]
    InvalidFields { fields: Vec<String> },

    /// Packed bytes did not parse back into a payload value.
    #[error("malformed packed payload: {reason}")]
    Malformed { reason: String },
}

/// Per-message delivery options.
///
/// Defaults deliver everywhere: onstage and offstage actors both eligible,
/// message treated as locally originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendMessageOptions {
    /// Deliver to actors inside the active simulation scope.
    pub onstage: bool,
    /// Deliver to actors outside the active simulation scope.
    pub offstage: bool,
    /// Set on messages received from another peer. A remote-originated
    /// broadcast is never forwarded back out.
    pub from_remote: bool,
}

impl Default for SendMessageOptions {
    fn default() -> Self {
        Self {
            onstage: true,
            offstage: true,
            from_remote: false,
        }
    }
}

impl SendMessageOptions {
    /// Options for a message arriving from a remote peer.
    pub fn remote() -> Self {
        Self {
            from_remote: true,
            ..Self::default()
        }
    }
}

/// A pending delivery request, owned by the queue until dequeued.
///
/// `to == None` denotes a broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedMessage {
    pub to: Option<String>,
    pub name: String,
    /// Payload, already packed via [`pack_message_data`].
    pub data: Bytes,
    pub from: Option<String>,
    pub options: SendMessageOptions,
}

/// The fully resolved message handed to an actor's handlers.
///
/// Built exactly once per queue item and shared by every recipient of a
/// broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDelivery {
    pub name: String,
    pub data: Value,
    pub game_time: f64,
    pub sender: Option<String>,
}

/// Pack a payload value for queueing or the wire.
///
/// Validates the whole value before serializing; a failure lists every
/// offending field path in one error.
pub fn pack_message_data(value: &Value) -> Result<Bytes, PackError> {
    let mut bad_fields = Vec::new();
    check_value(value, "$", 0, &mut bad_fields);
    if !bad_fields.is_empty() {
        return Err(PackError::InvalidFields { fields: bad_fields });
    }

    // Value -> JSON bytes cannot fail once the shape checks pass.
    let encoded = serde_json::to_vec(value).map_err(|e| PackError::Malformed {
        reason: e.to_string(),
    })?;
    Ok(Bytes::from(encoded))
}

/// Unpack a payload previously produced by [`pack_message_data`].
pub fn unpack_message_data(data: &[u8]) -> Result<Value, PackError> {
    serde_json::from_slice(data).map_err(|e| PackError::Malformed {
        reason: e.to_string(),
    })
}

fn check_value(value: &Value, path: &str, depth: usize, bad: &mut Vec<String>) {
    if depth > MAX_PAYLOAD_DEPTH {
        bad.push(format!("{path} (nested deeper than {MAX_PAYLOAD_DEPTH})"));
        return;
    }
    match value {
        Value::String(s) if s.len() > MAX_STRING_BYTES => {
            bad.push(format!("{path} (string of {} bytes)", s.len()));
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_value(item, &format!("{path}[{i}]"), depth + 1, bad);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if key.len() > MAX_STRING_BYTES {
                    bad.push(format!("{path}.{key} (key of {} bytes)", key.len()));
                }
                check_value(item, &format!("{path}.{key}"), depth + 1, bad);
            }
        }
        _ => {}
    }
}
