//! # Module descriptors with explicit handler tables.
//!
//! A descriptor names a module, lists the sub-modules it requires, and maps
//! every watched event type and setting key to its handler. Registering a
//! handler *is* declaring the watch: the tables are built at construction
//! time, so there is no runtime name-based lookup and no way for a declared
//! watch to lack its callback.
//!
//! Module state lives in the handler closures (shared via `Arc` captures),
//! the same way a function-backed task owns its state per spawn.
//!
//! ## Example
//! ```rust
//! use coreshell::events::{EventType, SettingValue};
//! use coreshell::registry::ModuleDescriptor;
//!
//! let desc = ModuleDescriptor::builder("alarm")
//!     .requires("clock")
//!     .on_setting("alarm.enabled", |value: SettingValue| async move {
//!         let _ = value; // reconfigure the alarm
//!     })
//!     .on_event(EventType::ScreenChange, |ev| async move {
//!         let _ = ev; // repaint the status icon
//!     })
//!     .build()
//!     .unwrap();
//! assert_eq!(desc.name().as_ref(), "alarm");
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::RegistryError;
use crate::events::{Event, EventType, SettingValue};

/// Handler for one watched event type.
pub(crate) type EventHandler = Arc<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;
/// Handler for one watched setting key, invoked with the new value.
pub(crate) type SettingHandler = Arc<dyn Fn(SettingValue) -> BoxFuture<'static, ()> + Send + Sync>;
/// Start hook; a `String` failure becomes [`RegistryError::StartFailed`].
pub(crate) type StartHook = Arc<dyn Fn() -> BoxFuture<'static, Result<(), String>> + Send + Sync>;
/// Stop hook, run only during full shell teardown.
pub(crate) type StopHook = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Immutable description of one shell module.
#[derive(Clone)]
pub struct ModuleDescriptor {
    name: Arc<str>,
    requires: Vec<Arc<str>>,
    event_handlers: HashMap<EventType, EventHandler>,
    setting_handlers: HashMap<Arc<str>, SettingHandler>,
    on_start: Option<StartHook>,
    on_stop: Option<StopHook>,
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

impl ModuleDescriptor {
    /// Starts building a descriptor for the named module.
    pub fn builder(name: impl Into<Arc<str>>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder {
            name: name.into(),
            requires: Vec::new(),
            event_handlers: HashMap::new(),
            setting_handlers: HashMap::new(),
            on_start: None,
            on_stop: None,
        }
    }

    /// Module name.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// Required sub-modules, in declaration order.
    pub fn requires(&self) -> &[Arc<str>] {
        &self.requires
    }

    /// Watched event types (handler-table keys).
    pub fn watched_events(&self) -> impl Iterator<Item = EventType> + '_ {
        self.event_handlers.keys().copied()
    }

    /// Watched setting keys (handler-table keys).
    pub fn watched_settings(&self) -> impl Iterator<Item = &Arc<str>> {
        self.setting_handlers.keys()
    }

    pub(crate) fn event_handler(&self, ty: EventType) -> Option<&EventHandler> {
        self.event_handlers.get(&ty)
    }

    pub(crate) fn setting_handler(&self, key: &str) -> Option<&SettingHandler> {
        self.setting_handlers.get(key)
    }

    pub(crate) fn start_hook(&self) -> Option<&StartHook> {
        self.on_start.as_ref()
    }

    pub(crate) fn stop_hook(&self) -> Option<&StopHook> {
        self.on_stop.as_ref()
    }
}

/// Builder collecting watches, requirements, and lifecycle hooks.
pub struct ModuleDescriptorBuilder {
    name: Arc<str>,
    requires: Vec<Arc<str>>,
    event_handlers: HashMap<EventType, EventHandler>,
    setting_handlers: HashMap<Arc<str>, SettingHandler>,
    on_start: Option<StartHook>,
    on_stop: Option<StopHook>,
}

impl ModuleDescriptorBuilder {
    /// Declares a required sub-module, started before this one.
    pub fn requires(mut self, name: impl Into<Arc<str>>) -> Self {
        self.requires.push(name.into());
        self
    }

    /// Watches an event type; `handler` runs for every matching bus event
    /// observed while the module is started.
    pub fn on_event<F, Fut>(mut self, ty: EventType, handler: F) -> Self
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.event_handlers.insert(
            ty,
            Arc::new(move |ev| -> BoxFuture<'static, ()> { Box::pin(handler(ev)) }),
        );
        self
    }

    /// Watches a setting key; `handler` runs with the new value whenever the
    /// value actually changes (no-op updates are suppressed).
    pub fn on_setting<F, Fut>(mut self, key: impl Into<Arc<str>>, handler: F) -> Self
    where
        F: Fn(SettingValue) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.setting_handlers.insert(
            key.into(),
            Arc::new(move |v| -> BoxFuture<'static, ()> { Box::pin(handler(v)) }),
        );
        self
    }

    /// Lifecycle hook run exactly once, when the module starts.
    pub fn on_start<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), String>> + Send + 'static,
    {
        self.on_start = Some(Arc::new(
            move || -> BoxFuture<'static, Result<(), String>> { Box::pin(hook()) },
        ));
        self
    }

    /// Lifecycle hook run during full shell teardown.
    pub fn on_stop<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_stop = Some(Arc::new(move || -> BoxFuture<'static, ()> { Box::pin(hook()) }));
        self
    }

    /// Validates and freezes the descriptor.
    pub fn build(self) -> Result<ModuleDescriptor, RegistryError> {
        if self.name.trim().is_empty() {
            return Err(RegistryError::MalformedDescriptor {
                module: self.name.to_string(),
                detail: "module name must not be empty".into(),
            });
        }
        if self.requires.iter().any(|r| *r == self.name) {
            return Err(RegistryError::MalformedDescriptor {
                module: self.name.to_string(),
                detail: "module must not require itself".into(),
            });
        }
        Ok(ModuleDescriptor {
            name: self.name,
            requires: self.requires,
            event_handlers: self.event_handlers,
            setting_handlers: self.setting_handlers,
            on_start: self.on_start,
            on_stop: self.on_stop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_name_is_malformed() {
        let err = ModuleDescriptor::builder("  ").build().unwrap_err();
        assert_eq!(err.as_label(), "registry_malformed_descriptor");
    }

    #[test]
    fn self_dependency_is_malformed() {
        let err = ModuleDescriptor::builder("a")
            .requires("a")
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::MalformedDescriptor { .. }));
    }

    #[test]
    fn tables_record_watches() {
        let desc = ModuleDescriptor::builder("m")
            .on_event(EventType::WillUnlock, |_| async {})
            .on_setting("debugger.remote-mode", |_| async {})
            .build()
            .unwrap();
        assert!(desc
            .watched_events()
            .any(|ty| ty == EventType::WillUnlock));
        assert!(desc
            .watched_settings()
            .any(|k| k.as_ref() == "debugger.remote-mode"));
    }
}
