//! Generic state/component framework.
//!
//! A [`Component`] owns exactly one active state drawn from a closed
//! [`StateSet`] enum, an [`EventQueue`](crate::queue::EventQueue) feeding it,
//! and the visual surface its states mutate. Transitions are asynchronous;
//! stale continuations are invalidated by generation counters carried in
//! [`StateContext`].

mod component;
mod state;

pub use component::Component;
pub use state::{StateContext, StateSet};
