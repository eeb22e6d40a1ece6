//! # Global shell configuration.
//!
//! [`ShellConfig`] centralizes the runtime knobs shared by the registry,
//! components, and queues. There is no file or CLI configuration in the
//! core: everything else arrives on the settings stream.

use std::time::Duration;

use crate::queue::DrainMode;

/// Runtime configuration for the orchestration core.
///
/// ## Field semantics
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped)
/// - `drain`: default queue drain mode for newly created components
/// - `grace`: maximum wait for module stop hooks during full teardown
#[derive(Clone, Debug)]
pub struct ShellConfig {
    /// Capacity of the broadcast bus ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events will
    /// observe `Lagged` and skip the oldest items.
    pub bus_capacity: usize,

    /// Default drain mode for component event queues.
    ///
    /// `Direct` dispatches immediately after each enqueue; `Interval(d)`
    /// coalesces bursts (e.g. repeated hardware key events) into one drain
    /// per tick.
    pub drain: DrainMode,

    /// Maximum time to wait for module stop hooks during shell teardown.
    pub grace: Duration,
}

impl ShellConfig {
    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ShellConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `drain = DrainMode::Direct`
    /// - `grace = 5s`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            drain: DrainMode::Direct,
            grace: Duration::from_secs(5),
        }
    }
}
