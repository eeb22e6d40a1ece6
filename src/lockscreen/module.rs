//! # Registry wiring for the lock orchestrator.
//!
//! [`lock_module`] builds the descriptor that plugs a [`LockComponent`] into
//! the module registry: every watched event is fed into the component's own
//! queue (arrival order preserved; the queue drains one event at a time into
//! the active state), the start hook installs the initial `SlideShow` state,
//! and the stop hook tears the component down.

use std::sync::Arc;

use crate::error::RegistryError;
use crate::events::EventType;
use crate::registry::ModuleDescriptor;

use super::states::{LockComponent, LockState};

/// Registry name of the lock orchestrator module.
pub const LOCK_MODULE: &str = "lockscreen";

/// Event types routed into the lock component's queue.
const WATCHED: &[EventType] = &[
    EventType::GestureUnlocked,
    EventType::GestureAborted,
    EventType::PasscodeRequest,
    EventType::PasscodeEntered,
    EventType::KeypadCancel,
    EventType::Shutdown,
];

/// Builds the `lockscreen` module descriptor around an existing component.
pub fn lock_module(component: Arc<LockComponent>) -> Result<ModuleDescriptor, RegistryError> {
    let mut builder = ModuleDescriptor::builder(LOCK_MODULE);

    for ty in WATCHED {
        let feeder = Arc::clone(&component);
        builder = builder.on_event(*ty, move |ev| {
            let component = Arc::clone(&feeder);
            async move {
                component.queue().feed(ev).await;
            }
        });
    }

    let starter = Arc::clone(&component);
    let stopper = Arc::clone(&component);
    builder
        .on_start(move || {
            let component = Arc::clone(&starter);
            async move {
                component.start(LockState::SlideShow).await;
                Ok(())
            }
        })
        .on_stop(move || {
            let component = Arc::clone(&stopper);
            async move {
                component.shutdown();
            }
        })
        .build()
}
