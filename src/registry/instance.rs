//! # Runtime wrapper around one registered module.
//!
//! A [`ModuleInstance`] is created lazily on first reference, started at most
//! once, and stopped only during full shell teardown. While started, a
//! dedicated listener filters bus events through the descriptor's handler
//! tables:
//!
//! ```text
//! Bus ──► instance listener
//!           ├─ SettingChanged{key, value} ─► setting table[key]
//!           │     (suppressed when value == last-known cached value)
//!           └─ other event ─► event table[event type]
//! ```
//!
//! Handler panics are caught and reported on the bus error channel; one
//! module's fault never corrupts another's state.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{Mutex as AsyncMutex, OnceCell};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{Bus, Event, EventKind, SettingValue};

use super::descriptor::ModuleDescriptor;

/// Runtime wrapper around a [`ModuleDescriptor`].
pub struct ModuleInstance {
    descriptor: Arc<ModuleDescriptor>,
    /// Set exactly once; concurrent `start` calls collapse onto one init.
    started: OnceCell<()>,
    /// Last-known value per watched setting, for change suppression.
    settings_cache: AsyncMutex<HashMap<Arc<str>, SettingValue>>,
    /// Cancels the listener during shell teardown.
    token: CancellationToken,
}

impl std::fmt::Debug for ModuleInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleInstance")
            .field("name", &self.descriptor.name())
            .field("started", &self.started.initialized())
            .finish_non_exhaustive()
    }
}

impl ModuleInstance {
    pub(crate) fn new(descriptor: Arc<ModuleDescriptor>, parent: &CancellationToken) -> Arc<Self> {
        Arc::new(Self {
            descriptor,
            started: OnceCell::new(),
            settings_cache: AsyncMutex::new(HashMap::new()),
            token: parent.child_token(),
        })
    }

    /// Module name.
    pub fn name(&self) -> &Arc<str> {
        self.descriptor.name()
    }

    /// The descriptor this instance was created from.
    pub fn descriptor(&self) -> &Arc<ModuleDescriptor> {
        &self.descriptor
    }

    /// True once the start hook has run.
    pub fn is_started(&self) -> bool {
        self.started.initialized()
    }

    /// Last cached value of a watched setting, if one was observed.
    pub async fn cached_setting(&self, key: &str) -> Option<SettingValue> {
        self.settings_cache.lock().await.get(key).cloned()
    }

    /// The exactly-once start cell; the registry drives initialization
    /// through it so duplicate dependency paths start this module once.
    pub(crate) fn start_cell(&self) -> &OnceCell<()> {
        &self.started
    }

    /// Spawns the bus listener wiring events into the handler tables.
    pub(crate) fn spawn_listener(self: &Arc<Self>, bus: &Bus) {
        let mut rx = bus.subscribe();
        let error_bus = bus.clone();
        let me = Arc::clone(self);
        let token = self.token.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => me.dispatch(ev, &error_bus).await,
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!(module = %me.name(), skipped = n, "module listener lagged");
                            continue;
                        }
                    }
                }
            }
        });
    }

    /// Routes one event through the descriptor's tables.
    async fn dispatch(&self, event: Event, error_bus: &Bus) {
        match event.kind {
            EventKind::SettingChanged { ref key, ref value } => {
                let Some(handler) = self.descriptor.setting_handler(key) else {
                    return;
                };
                if !self.update_cache(key, value).await {
                    debug!(module = %self.name(), key = %key, "setting unchanged; suppressed");
                    return;
                }
                let fut = handler(value.clone());
                self.run_isolated(fut, error_bus).await;
            }
            _ => {
                let Some(handler) = self.descriptor.event_handler(event.ty()) else {
                    return;
                };
                let fut = handler(event);
                self.run_isolated(fut, error_bus).await;
            }
        }
    }

    /// Updates the setting cache; returns false when the value is unchanged.
    async fn update_cache(&self, key: &str, value: &SettingValue) -> bool {
        let mut cache = self.settings_cache.lock().await;
        match cache.get(key) {
            Some(known) if known == value => false,
            _ => {
                cache.insert(Arc::from(key), value.clone());
                true
            }
        }
    }

    /// Runs a handler future with panic isolation.
    async fn run_isolated(
        &self,
        fut: futures::future::BoxFuture<'static, ()>,
        error_bus: &Bus,
    ) {
        if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            warn!(module = %self.name(), %detail, "module handler panicked");
            error_bus.publish(Event::fault(
                self.name().as_ref(),
                format!("module_handler_panicked: {detail}"),
            ));
        }
    }

    /// Cancels the listener; the registry runs the stop hook separately.
    pub(crate) fn cancel_listener(&self) {
        self.token.cancel();
    }
}
