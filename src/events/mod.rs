//! Event model: typed shell events and the broadcast bus they travel on.
//!
//! - [`event`]: [`Event`], [`EventKind`], [`EventType`], [`SettingValue`];
//! - [`bus`]: [`Bus`], a thin broadcast-channel wrapper.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind, EventType, SettingValue};
