//! # Registry: dependency resolution and module lifecycle.
//!
//! ## Architecture
//! ```text
//! register(descriptor) ──► validate ──► cycle check (DFS over known graph)
//!                                             │
//!                                     store descriptor (immutable)
//!
//! start(name) ──► instance (created lazily)
//!        │              │
//!        │   requires: depth-first start of every sub-module,
//!        │   duplicates collapse onto the same once-cell
//!        │              │
//!        └──► start hook (exactly once) ──► spawn bus listener
//! ```
//!
//! ## Rules
//! - Cycles are a registration-time error; the offending descriptor is not
//!   stored and runtime resolution never sees one.
//! - `start` is idempotent: one running instance, one start-hook invocation,
//!   no matter how many dependency paths or callers reach the module.
//! - A missing dependency or failing hook fails that `start` call only;
//!   sibling modules are unaffected.
//! - Failures are published as fault events, the registry's error channel,
//!   in addition to being returned to the caller.

use std::collections::HashMap;
use std::sync::{Arc, RwLock as StdRwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::RwLock as AsyncRwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ShellConfig;
use crate::error::RegistryError;
use crate::events::{Bus, Event};

use super::descriptor::ModuleDescriptor;
use super::instance::ModuleInstance;

/// Declarative module registry and event-wiring hub.
pub struct Registry {
    bus: Bus,
    grace: Duration,
    descriptors: StdRwLock<HashMap<Arc<str>, Arc<ModuleDescriptor>>>,
    instances: AsyncRwLock<HashMap<Arc<str>, Arc<ModuleInstance>>>,
    token: CancellationToken,
}

impl Registry {
    /// Creates a registry (and the shared bus) from the shell configuration.
    pub fn new(cfg: &ShellConfig) -> Arc<Self> {
        Arc::new(Self {
            bus: Bus::new(cfg.bus_capacity_clamped()),
            grace: cfg.grace,
            descriptors: StdRwLock::new(HashMap::new()),
            instances: AsyncRwLock::new(HashMap::new()),
            token: CancellationToken::new(),
        })
    }

    /// The shared shell bus; components and adapters clone from here.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Stores a descriptor.
    ///
    /// Rejects duplicates and any descriptor that would close a dependency
    /// cycle; the rejected descriptor is not stored, and the failure is
    /// published on the error channel.
    pub fn register(&self, descriptor: ModuleDescriptor) -> Result<(), RegistryError> {
        let result = self.register_inner(descriptor);
        if let Err(err) = &result {
            self.publish_fault(err);
        }
        result
    }

    fn register_inner(&self, descriptor: ModuleDescriptor) -> Result<(), RegistryError> {
        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(|p| p.into_inner());
        let name = Arc::clone(descriptor.name());

        if descriptors.contains_key(&name) {
            return Err(RegistryError::DuplicateModule {
                module: name.to_string(),
            });
        }
        if let Some(path) = find_cycle(&descriptors, &descriptor) {
            return Err(RegistryError::DependencyCycle { path });
        }

        descriptors.insert(name, Arc::new(descriptor));
        Ok(())
    }

    /// True if a descriptor is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.descriptors
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .contains_key(name)
    }

    /// True if the named module has been started.
    pub async fn is_started(&self, name: &str) -> bool {
        self.instances
            .read()
            .await
            .get(name)
            .is_some_and(|i| i.is_started())
    }

    /// Resolves, lazily instantiates, and starts the named module.
    ///
    /// Required sub-modules start depth-first beforehand; each module starts
    /// at most once. Errors are scoped to this call; siblings keep running.
    pub async fn start(&self, name: &str) -> Result<Arc<ModuleInstance>, RegistryError> {
        let result = self.start_boxed(Arc::from(name)).await;
        if let Err(err) = &result {
            self.publish_fault(err);
        }
        result
    }

    fn start_boxed(
        &self,
        name: Arc<str>,
    ) -> BoxFuture<'_, Result<Arc<ModuleInstance>, RegistryError>> {
        Box::pin(async move {
            let Some(descriptor) = self.descriptor(&name) else {
                return Err(RegistryError::UnknownModule {
                    module: name.to_string(),
                });
            };
            let instance = self.instance_for(&name, &descriptor).await;
            if instance.is_started() {
                return Ok(instance);
            }

            for dep in descriptor.requires() {
                match self.start_boxed(Arc::clone(dep)).await {
                    Ok(_) => {}
                    Err(RegistryError::UnknownModule { module }) if module == dep.as_ref() => {
                        return Err(RegistryError::MissingDependency {
                            module: name.to_string(),
                            dependency: dep.to_string(),
                        });
                    }
                    Err(other) => return Err(other),
                }
            }

            let init = Arc::clone(&instance);
            let bus = self.bus.clone();
            instance
                .start_cell()
                .get_or_try_init(|| async move {
                    if let Some(hook) = init.descriptor().start_hook() {
                        hook().await.map_err(|reason| RegistryError::StartFailed {
                            module: init.name().to_string(),
                            reason,
                        })?;
                    }
                    init.spawn_listener(&bus);
                    debug!(module = %init.name(), "module started");
                    Ok(())
                })
                .await?;

            Ok(instance)
        })
    }

    /// Full shell teardown: cancel listeners, run stop hooks within grace.
    ///
    /// Rare, not hot-path. Stop hooks exceeding the grace window are
    /// abandoned with a warning.
    pub async fn shutdown(&self) {
        self.token.cancel();
        let instances: Vec<Arc<ModuleInstance>> =
            self.instances.read().await.values().cloned().collect();

        let stops = async {
            for instance in &instances {
                instance.cancel_listener();
                if !instance.is_started() {
                    continue;
                }
                if let Some(hook) = instance.descriptor().stop_hook() {
                    hook().await;
                }
            }
        };
        if tokio::time::timeout(self.grace, stops).await.is_err() {
            warn!(grace = ?self.grace, "stop hooks exceeded grace window");
            self.bus
                .publish(Event::fault("registry", "shutdown_grace_exceeded"));
        }
    }

    fn descriptor(&self, name: &str) -> Option<Arc<ModuleDescriptor>> {
        self.descriptors
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .get(name)
            .cloned()
    }

    /// Returns the instance for `name`, creating it on first reference.
    async fn instance_for(
        &self,
        name: &Arc<str>,
        descriptor: &Arc<ModuleDescriptor>,
    ) -> Arc<ModuleInstance> {
        let mut instances = self.instances.write().await;
        Arc::clone(
            instances
                .entry(Arc::clone(name))
                .or_insert_with(|| ModuleInstance::new(Arc::clone(descriptor), &self.token)),
        )
    }

    fn publish_fault(&self, err: &RegistryError) {
        self.bus.publish(Event::fault(
            err.module().unwrap_or("registry"),
            format!("{}: {err}", err.as_label()),
        ));
    }
}

/// Looks for a cycle the candidate descriptor would close.
///
/// Only the candidate can complete a cycle (the stored graph is already
/// acyclic), so the search starts there. Edges to unregistered names simply
/// terminate.
fn find_cycle(
    known: &HashMap<Arc<str>, Arc<ModuleDescriptor>>,
    candidate: &ModuleDescriptor,
) -> Option<Vec<String>> {
    fn dfs<'a>(
        name: &'a Arc<str>,
        known: &'a HashMap<Arc<str>, Arc<ModuleDescriptor>>,
        candidate: &'a ModuleDescriptor,
        stack: &mut Vec<Arc<str>>,
    ) -> Option<Vec<String>> {
        if let Some(pos) = stack.iter().position(|n| n == name) {
            let mut path: Vec<String> = stack[pos..].iter().map(|n| n.to_string()).collect();
            path.push(name.to_string());
            return Some(path);
        }
        let descriptor: &ModuleDescriptor = if name == candidate.name() {
            candidate
        } else {
            match known.get(name) {
                Some(d) => d,
                None => return None,
            }
        };

        stack.push(Arc::clone(name));
        for dep in descriptor.requires() {
            if let Some(path) = dfs(dep, known, candidate, stack) {
                return Some(path);
            }
        }
        stack.pop();
        None
    }

    let mut stack = Vec::new();
    dfs(candidate.name(), known, candidate, &mut stack)
}
