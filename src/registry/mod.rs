//! Declarative module registry ("Service" layer).
//!
//! Modules declare what they watch and require; the registry resolves the
//! dependency graph, lazily instantiates modules, starts each at most once,
//! and wires bus events and setting changes into per-module handler tables.

mod core;
mod descriptor;
mod instance;

pub use self::core::Registry;
pub use descriptor::{ModuleDescriptor, ModuleDescriptorBuilder};
pub use instance::ModuleInstance;
