//! # ProxyBridge: whitelist-validated forwarder.
//!
//! Messages from the isolated, untrusted lock-screen surface cross into the
//! trusted shell here. Only a fixed, versioned set of message types is
//! accepted; everything else is dropped silently for forward compatibility
//! with a newer isolated context.
//!
//! ```text
//! isolated surface ──► ProxyMessage{type, ...} ──► on_message()
//!                                                     │ type ∈ whitelist?
//!                                      no ── drop ◄───┤
//!                                                     ▼ yes
//!                                    translate 1:1 ─► Event ─► Bus
//! ```
//!
//! The bridge never calls into the isolated context: commands reach the
//! lock-screen surface through the component's own transition side effects,
//! not through here.

use serde::Deserialize;
use tracing::debug;

use crate::events::{Bus, Event, EventKind};

/// Message types accepted from the isolated context (versioned whitelist).
const WHITELIST: &[&str] = &["unlock", "invoke-secureapp", "secure-modeon", "secure-modeoff"];

/// Raw message received from the isolated rendering context.
///
/// The payload keeps whatever extra fields the message carried; translation
/// extracts only the expected ones.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyMessage {
    /// Message type, validated against the whitelist.
    #[serde(rename = "type")]
    pub kind: String,
    /// Remaining message fields, untrusted.
    #[serde(flatten)]
    pub payload: serde_json::Value,
}

impl ProxyMessage {
    /// Convenience constructor for adapters and tests.
    pub fn new(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    fn payload_str(&self, field: &str) -> Option<&str> {
        self.payload.get(field).and_then(|v| v.as_str())
    }
}

/// One-directional, whitelist-validated forwarder into the trusted bus.
#[derive(Clone)]
pub struct ProxyBridge {
    bus: Bus,
}

impl ProxyBridge {
    /// Creates a bridge publishing onto the given bus.
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Validates and translates one raw message.
    ///
    /// Returns `None`, without error, for unknown types (forward
    /// compatibility) and for whitelisted messages whose expected payload
    /// fields are missing or malformed.
    pub fn on_message(&self, raw: &ProxyMessage) -> Option<Event> {
        if !WHITELIST.contains(&raw.kind.as_str()) {
            debug!(kind = %raw.kind, "unrecognized proxy message dropped");
            return None;
        }
        match raw.kind.as_str() {
            // The unlock gesture happens inside the isolated surface; it
            // re-enters the shell as the gesture event.
            "unlock" => Some(Event::new(EventKind::GestureUnlocked)),
            "invoke-secureapp" => {
                let app_url = raw.payload_str("url")?.to_string();
                let app_manifest_url = raw.payload_str("manifestURL")?.to_string();
                Some(Event::new(EventKind::SecureLaunchApp {
                    app_url,
                    app_manifest_url,
                }))
            }
            "secure-modeon" => Some(Event::new(EventKind::SecureModeOn)),
            "secure-modeoff" => Some(Event::new(EventKind::SecureModeOff)),
            _ => None,
        }
    }

    /// Translates and, when recognized, re-publishes on the bus.
    ///
    /// Returns whether an internal event was published.
    pub fn forward(&self, raw: &ProxyMessage) -> bool {
        match self.on_message(raw) {
            Some(event) => {
                self.bus.publish(event);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bridge() -> ProxyBridge {
        ProxyBridge::new(Bus::new(8))
    }

    #[test]
    fn secureapp_payload_is_sanitized() {
        let msg = ProxyMessage::new(
            "invoke-secureapp",
            json!({
                "url": "app://camera/index.html",
                "manifestURL": "app://camera/manifest.webapp",
                "__proto__": "ignored",
                "extra": 42
            }),
        );
        let ev = bridge().on_message(&msg).unwrap();
        match ev.kind {
            EventKind::SecureLaunchApp {
                app_url,
                app_manifest_url,
            } => {
                assert_eq!(app_url, "app://camera/index.html");
                assert_eq!(app_manifest_url, "app://camera/manifest.webapp");
            }
            other => panic!("unexpected translation: {other:?}"),
        }
    }

    #[test]
    fn malformed_secureapp_is_dropped() {
        let msg = ProxyMessage::new("invoke-secureapp", json!({ "url": 7 }));
        assert!(bridge().on_message(&msg).is_none());
    }

    #[test]
    fn unknown_type_is_dropped_silently() {
        let msg = ProxyMessage::new("bogus-future-type", json!({}));
        assert!(bridge().on_message(&msg).is_none());
    }

    #[test]
    fn message_deserializes_from_wire_shape() {
        let raw: ProxyMessage = serde_json::from_value(json!({
            "type": "unlock",
            "detail": { "source": "slider" }
        }))
        .unwrap();
        assert_eq!(raw.kind, "unlock");
        let ev = bridge().on_message(&raw).unwrap();
        assert_eq!(ev.kind, EventKind::GestureUnlocked);
    }
}
