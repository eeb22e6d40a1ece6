//! Lock/unlock orchestrator: the concrete component driving the device
//! lock flow over nine named states.

mod module;
mod states;
mod surface;

pub use module::{lock_module, LOCK_MODULE};
pub use states::{LockComponent, LockState};
pub use surface::LockSurface;
