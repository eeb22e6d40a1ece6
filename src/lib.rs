//! # coreshell
//!
//! **coreshell** is the orchestration core of a mobile shell: a declarative
//! module-registration framework and a hierarchical, asynchronous
//! state-machine engine driving safety-sensitive UI flows, most visibly the
//! device lock/unlock sequence.
//!
//! ## Architecture
//! ```text
//!  hardware/software events      settings stream        isolated lock surface
//!            │                         │                         │
//!            ▼                         ▼                         ▼
//! ┌───────────────────────────────────────────────┐   ┌──────────────────┐
//! │                Bus (broadcast)                │◄──│  ProxyBridge     │
//! └──────┬───────────────────────┬────────────────┘   │  (whitelist,     │
//!        │                       │                    │   one-way)       │
//!        ▼                       ▼                    └──────────────────┘
//! ┌──────────────────┐   ┌─────────────────────────────────────────────┐
//! │ Registry         │   │ Component<LockState>                        │
//! │ - descriptors    │   │   EventQueue ──► active state               │
//! │ - lazy instances │   │   (FIFO, one   on_event / transfer_to       │
//! │ - handler tables │   │    at a time)  generation-guarded           │
//! │ - start once     │   │                                             │
//! └──────────────────┘   │ SlideShow ─► SlideHide ─► Unlock            │
//!                        │    │  └───► KeypadRising ─► KeypadShow ...  │
//!                        │    └─► Halt (absorbing, on error/shutdown)  │
//!                        └─────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//! - A component has exactly one active state outside of a transition; the
//!   outgoing state is superseded the instant its successor is elected.
//! - Event queues preserve first-arrived-first-delivered order and never
//!   drop events; states simply ignore types they did not subscribe to.
//! - Stale asynchronous continuations are invalidated by per-activation
//!   generation numbers; structural cancellation, no abort primitive.
//! - Modules start at most once; one module's failure never affects its
//!   siblings.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use coreshell::config::ShellConfig;
//! use coreshell::error::TransitionError;
//! use coreshell::events::{Event, EventKind};
//! use coreshell::lockscreen::{lock_module, LockComponent, LockSurface, LOCK_MODULE};
//! use coreshell::queue::DrainMode;
//! use coreshell::registry::Registry;
//!
//! struct NoopSurface;
//!
//! #[async_trait]
//! impl LockSurface for NoopSurface {
//!     async fn show_slider(&self) -> Result<(), TransitionError> { Ok(()) }
//!     async fn hide_slider(&self) -> Result<(), TransitionError> { Ok(()) }
//!     async fn restore_slider(&self) -> Result<(), TransitionError> { Ok(()) }
//!     async fn raise_keypad(&self) -> Result<(), TransitionError> { Ok(()) }
//!     async fn lower_keypad(&self) -> Result<(), TransitionError> { Ok(()) }
//!     async fn hide_panel(&self) -> Result<(), TransitionError> { Ok(()) }
//!     fn unlock(&self) {}
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let registry = Registry::new(&ShellConfig::default());
//! let component = LockComponent::new(
//!     "lockscreen",
//!     Arc::new(NoopSurface),
//!     registry.bus().clone(),
//!     DrainMode::Direct,
//! );
//! registry.register(lock_module(Arc::clone(&component)).unwrap()).unwrap();
//!
//! let handle = registry.start(LOCK_MODULE).await.unwrap();
//! assert!(handle.is_started());
//!
//! component.queue().feed(Event::new(EventKind::GestureUnlocked)).await;
//! # }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod lockscreen;
pub mod machine;
pub mod observers;
pub mod queue;
pub mod registry;

// ---- Public re-exports ----

pub use bridge::{ProxyBridge, ProxyMessage};
pub use config::ShellConfig;
pub use error::{RegistryError, TransitionError};
pub use events::{Bus, Event, EventKind, EventType, SettingValue};
pub use lockscreen::{lock_module, LockComponent, LockState, LockSurface, LOCK_MODULE};
pub use machine::{Component, StateContext, StateSet};
pub use observers::LogWriter;
pub use queue::{DrainMode, EventQueue, EventSink};
pub use registry::{ModuleDescriptor, ModuleDescriptorBuilder, ModuleInstance, Registry};
