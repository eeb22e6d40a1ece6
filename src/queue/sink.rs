//! # Event sink trait.
//!
//! A sink is the single registered handler of an [`EventQueue`](super::EventQueue).
//! The queue drains into whatever sink is currently installed; it has no
//! knowledge of component or state identity, so stale-delivery discipline is
//! the sink's responsibility.

use async_trait::async_trait;

use crate::error::TransitionError;
use crate::events::Event;

/// Consumer side of an [`EventQueue`](super::EventQueue).
///
/// `deliver` is invoked for one event at a time, in arrival order. Returning
/// an error aborts the current drain pass; remaining entries stay queued for
/// the next pass and the fault is reported on the bus error channel.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Processes a single queued event.
    async fn deliver(&self, event: Event) -> Result<(), TransitionError>;
}
