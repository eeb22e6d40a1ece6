//! Error types used by the coreshell runtime.
//!
//! This module defines two main error enums:
//!
//! - [`RegistryError`]: errors raised while registering or starting modules.
//! - [`TransitionError`]: errors raised inside a state's entry side effects
//!   or event handling.
//!
//! Both types provide `as_label` helpers for logs, and the registry/component
//! layers only ever use them to *isolate* a failure: one module's registration
//! error never affects its siblings, and a transition error forces the owning
//! component into its terminal `Halt` state.

use thiserror::Error;

/// # Errors produced by the module registry.
///
/// These cover the registration-time and start-time failure modes: malformed
/// descriptors, duplicate names, dependency cycles, and unresolvable or
/// failing dependencies. Each failure is scoped to the offending module.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Descriptor failed builder validation (empty name, self-dependency, ...).
    #[error("malformed descriptor for '{module}': {detail}")]
    MalformedDescriptor {
        /// Name of the module being registered.
        module: String,
        /// What exactly was rejected.
        detail: String,
    },

    /// A descriptor with the same name is already registered.
    #[error("module '{module}' is already registered")]
    DuplicateModule {
        /// The conflicting module name.
        module: String,
    },

    /// Registering this descriptor would close a dependency cycle.
    #[error("dependency cycle: {}", path.join(" -> "))]
    DependencyCycle {
        /// The cycle as a name path, first element repeated at the end.
        path: Vec<String>,
    },

    /// `start` was called for a name no descriptor was registered under.
    #[error("unknown module '{module}'")]
    UnknownModule {
        /// The requested module name.
        module: String,
    },

    /// A required sub-module is not registered.
    #[error("module '{module}' requires '{dependency}', which is not registered")]
    MissingDependency {
        /// The module whose start failed.
        module: String,
        /// The missing dependency name.
        dependency: String,
    },

    /// The module's own start hook reported a failure.
    #[error("module '{module}' failed to start: {reason}")]
    StartFailed {
        /// The module whose start hook failed.
        module: String,
        /// Failure detail from the hook.
        reason: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::MalformedDescriptor { .. } => "registry_malformed_descriptor",
            RegistryError::DuplicateModule { .. } => "registry_duplicate_module",
            RegistryError::DependencyCycle { .. } => "registry_dependency_cycle",
            RegistryError::UnknownModule { .. } => "registry_unknown_module",
            RegistryError::MissingDependency { .. } => "registry_missing_dependency",
            RegistryError::StartFailed { .. } => "registry_start_failed",
        }
    }

    /// Name of the module this error is scoped to, if any.
    pub fn module(&self) -> Option<&str> {
        match self {
            RegistryError::MalformedDescriptor { module, .. }
            | RegistryError::DuplicateModule { module }
            | RegistryError::UnknownModule { module }
            | RegistryError::MissingDependency { module, .. }
            | RegistryError::StartFailed { module, .. } => Some(module),
            RegistryError::DependencyCycle { path } => path.first().map(String::as_str),
        }
    }
}

/// # Errors produced inside a state transition.
///
/// A `TransitionError` surfacing out of `transfer_to` or `on_event` is caught
/// by the owning [`Component`](crate::machine::Component), which forces an
/// immediate transition to `Halt` rather than leaving the surface in a mix of
/// two states' effects.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// The visual surface rejected or failed a mutation.
    #[error("surface operation '{op}' failed: {reason}")]
    Surface {
        /// The surface operation that failed.
        op: &'static str,
        /// Failure detail.
        reason: String,
    },

    /// The state received an event it cannot act on in its current phase.
    #[error("state '{state}' cannot handle event: {detail}")]
    Unhandled {
        /// Name of the active state.
        state: &'static str,
        /// What was wrong with the delivery.
        detail: String,
    },
}

impl TransitionError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            TransitionError::Surface { .. } => "transition_surface_failed",
            TransitionError::Unhandled { .. } => "transition_unhandled",
        }
    }
}
