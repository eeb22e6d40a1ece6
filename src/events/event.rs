//! # Shell events flowing through the bus.
//!
//! Three closely related types live here:
//!
//! - [`EventType`]: fieldless classification, used by states to declare the
//!   events they subscribe to and by module descriptors as handler-table keys.
//! - [`EventKind`]: the payload-carrying variant of each event.
//! - [`Event`]: an `EventKind` stamped with an arrival sequence number and a
//!   wall-clock timestamp.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically at creation time. Queues and components rely on `seq` as the
//! authoritative arrival order.
//!
//! ## Example
//! ```rust
//! use coreshell::events::{Event, EventKind, EventType};
//!
//! let ev = Event::new(EventKind::GestureUnlocked);
//! assert_eq!(ev.ty(), EventType::GestureUnlocked);
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Loosely-typed value of a shell setting.
///
/// Settings arrive as `{key, value}` pairs from the settings stream; the
/// value shape depends on the key, so this mirrors the small set of JSON
/// scalar shapes plus a structured fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean toggle (e.g. `alarm.enabled`).
    Bool(bool),
    /// Integer-valued setting.
    Int(i64),
    /// String-valued setting.
    Str(String),
    /// Structured value for keys without a scalar shape.
    Json(serde_json::Value),
}

impl From<bool> for SettingValue {
    fn from(v: bool) -> Self {
        SettingValue::Bool(v)
    }
}

impl From<i64> for SettingValue {
    fn from(v: i64) -> Self {
        SettingValue::Int(v)
    }
}

impl From<&str> for SettingValue {
    fn from(v: &str) -> Self {
        SettingValue::Str(v.to_string())
    }
}

/// Fieldless classification of shell events.
///
/// This is the key type for every subscription surface in the crate: state
/// `event_sources()` lists, module handler tables, and drop/forward decisions
/// in [`Component::handle_event`](crate::machine::Component::handle_event).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    /// Screen turned on or off.
    ScreenChange,
    /// Slide-to-unlock gesture completed successfully.
    GestureUnlocked,
    /// Slide gesture failed or was aborted mid-way.
    GestureAborted,
    /// The passcode panel was requested.
    PasscodeRequest,
    /// A passcode entry was submitted (with its verification verdict).
    PasscodeEntered,
    /// The passcode panel was dismissed without unlocking.
    KeypadCancel,
    /// Explicit shutdown request for a component.
    Shutdown,
    /// A watched setting changed value.
    SettingChanged,
    /// The isolated surface entered secure mode.
    SecureModeOn,
    /// The isolated surface left secure mode.
    SecureModeOff,
    /// The shell is about to unlock.
    WillUnlock,
    /// A secure app launch was requested from the lock screen.
    SecureLaunchApp,
    /// A module or event handler reported a fault.
    Fault,
}

/// Payload-carrying classification of shell events.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// Screen power state changed.
    ScreenChanged {
        /// `true` when the screen turned on.
        on: bool,
    },
    /// Successful slide-to-unlock gesture.
    GestureUnlocked,
    /// Failed or aborted slide gesture.
    GestureAborted,
    /// Request to raise the passcode panel.
    PasscodeRequested,
    /// A passcode entry with its verification verdict.
    PasscodeEntered {
        /// `true` when the entered code matched.
        valid: bool,
    },
    /// The passcode panel was cancelled.
    KeypadCancelled,
    /// Explicit shutdown request.
    ShutdownRequested,
    /// A setting changed value.
    SettingChanged {
        /// Dotted setting key (e.g. `alarm.enabled`).
        key: String,
        /// New value.
        value: SettingValue,
    },
    /// Secure mode engaged on the isolated surface.
    SecureModeOn,
    /// Secure mode disengaged on the isolated surface.
    SecureModeOff,
    /// The shell is about to unlock; interested modules may prepare.
    WillUnlock,
    /// Launch request for a secure app, sanitized by the proxy bridge.
    SecureLaunchApp {
        /// Entry-point URL of the app.
        app_url: String,
        /// Manifest URL of the app.
        app_manifest_url: String,
    },
    /// A handler or module reported a fault (the registry's error channel).
    Fault {
        /// Where the fault originated (module name, queue, ...).
        origin: String,
        /// Stable label plus detail for logs.
        detail: String,
    },
}

impl EventKind {
    /// Maps the payload-carrying kind onto its fieldless [`EventType`].
    pub fn ty(&self) -> EventType {
        match self {
            EventKind::ScreenChanged { .. } => EventType::ScreenChange,
            EventKind::GestureUnlocked => EventType::GestureUnlocked,
            EventKind::GestureAborted => EventType::GestureAborted,
            EventKind::PasscodeRequested => EventType::PasscodeRequest,
            EventKind::PasscodeEntered { .. } => EventType::PasscodeEntered,
            EventKind::KeypadCancelled => EventType::KeypadCancel,
            EventKind::ShutdownRequested => EventType::Shutdown,
            EventKind::SettingChanged { .. } => EventType::SettingChanged,
            EventKind::SecureModeOn => EventType::SecureModeOn,
            EventKind::SecureModeOff => EventType::SecureModeOff,
            EventKind::WillUnlock => EventType::WillUnlock,
            EventKind::SecureLaunchApp { .. } => EventType::SecureLaunchApp,
            EventKind::Fault { .. } => EventType::Fault,
        }
    }
}

/// A shell event stamped with arrival order.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Payload-carrying classification.
    pub kind: EventKind,
}

impl Event {
    /// Creates a new event of the given kind with the next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
        }
    }

    /// Shorthand for the fieldless type of this event.
    #[inline]
    pub fn ty(&self) -> EventType {
        self.kind.ty()
    }

    /// Creates a fault event for the registry's error channel.
    #[inline]
    pub fn fault(origin: impl Into<String>, detail: impl Into<String>) -> Self {
        Event::new(EventKind::Fault {
            origin: origin.into(),
            detail: detail.into(),
        })
    }

    /// Creates a setting-change event.
    #[inline]
    pub fn setting(key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        Event::new(EventKind::SettingChanged {
            key: key.into(),
            value: value.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_is_monotonic() {
        let a = Event::new(EventKind::GestureUnlocked);
        let b = Event::new(EventKind::GestureAborted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn kind_maps_to_type_exhaustively() {
        let ev = Event::setting("alarm.enabled", true);
        assert_eq!(ev.ty(), EventType::SettingChanged);
        let ev = Event::fault("queue", "boom");
        assert_eq!(ev.ty(), EventType::Fault);
    }
}
