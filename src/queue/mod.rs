//! Per-component event queue with an ordered drain loop.

mod queue;
mod sink;

pub use queue::{DrainMode, EventQueue};
pub use sink::EventSink;
