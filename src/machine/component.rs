//! # Component: actor owning exactly one active state.
//!
//! Drives one state machine over a visual surface, fed by an
//! [`EventQueue`](crate::queue::EventQueue).
//!
//! ## Event flow
//! ```text
//! bus / module wiring ──► queue.feed(ev) ──► Component::deliver(ev)
//!                                                 │
//!                      event type ∉ active.event_sources()? ── drop silently
//!                                                 │
//!                                        active.on_event(cx, &ev)
//!                                                 │
//!                                 Ok(Some(next)) ─► transition(next)
//!                                 Ok(None)       ─► stay
//!                                 Err(_)         ─► force Halt
//! ```
//!
//! ## Rules
//! - Exactly one active state outside of a transition; `transition` replaces
//!   the active-state reference *before* awaiting the incoming state's entry
//!   effects, so a superseded state's pending work can never win.
//! - Every activation bumps a generation counter; stale continuations are
//!   discarded via the [`StateContext`] guard (no cancellation primitive).
//! - `Halt` is absorbing: after entering it no event is delivered until the
//!   component is explicitly re-`start`ed.
//! - A transition error forces `Halt` rather than leaving the surface in a
//!   mix of two states' effects; the fault goes to the bus error channel.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::error::TransitionError;
use crate::events::{Bus, Event, EventType};
use crate::queue::{DrainMode, EventQueue, EventSink};

use super::state::{StateContext, StateSet};

/// Actor owning one active state, its event queue, and a surface handle.
pub struct Component<S: StateSet> {
    name: Arc<str>,
    surface: Arc<S::Surface>,
    bus: Bus,
    queue: Arc<EventQueue>,
    active: StdMutex<Option<S>>,
    generation: AtomicU64,
    ticker_running: AtomicBool,
    token: CancellationToken,
}

impl<S: StateSet> Component<S> {
    /// Creates a component with its own event queue; inert until [`start`](Self::start).
    pub fn new(
        name: impl Into<Arc<str>>,
        surface: Arc<S::Surface>,
        bus: Bus,
        drain: DrainMode,
    ) -> Arc<Self> {
        let name = name.into();
        let queue = EventQueue::new(Arc::clone(&name), drain, bus.clone());
        Arc::new(Self {
            name,
            surface,
            bus,
            queue,
            active: StdMutex::new(None),
            generation: AtomicU64::new(0),
            ticker_running: AtomicBool::new(false),
            token: CancellationToken::new(),
        })
    }

    /// Installs the initial state and binds the queue to this component.
    ///
    /// Also reinitializes a halted component: the terminal state is replaced
    /// by `initial` and event delivery resumes.
    pub async fn start(self: &Arc<Self>, initial: S) {
        self.queue
            .set_sink(Arc::new(ComponentSink(Arc::clone(self))));
        if !self.ticker_running.swap(true, AtomicOrdering::SeqCst) {
            self.queue.spawn_ticker(self.token.clone());
        }
        self.transition(initial).await;
    }

    /// Forwards one event to the active state.
    ///
    /// Dropped silently when the component is halted, not yet started, or
    /// the active state did not subscribe to the event's type. A shutdown
    /// event forces the terminal state from anywhere.
    pub async fn handle_event(self: &Arc<Self>, event: &Event) {
        let Some(active) = self.current() else {
            return;
        };
        if active.is_halt() {
            return;
        }
        if event.ty() == EventType::Shutdown {
            self.transition(S::halt()).await;
            return;
        }
        if !active.event_sources().contains(&event.ty()) {
            return;
        }

        let generation = self.generation();
        let cx = StateContext::new(Arc::clone(self), generation);
        match active.on_event(&cx, event).await {
            Ok(Some(next)) => {
                if self.generation() == generation {
                    self.transition(next).await;
                }
            }
            Ok(None) => {}
            Err(err) => {
                if self.generation() == generation {
                    self.force_halt(active.name(), &err);
                }
            }
        }
    }

    /// Elects `next` as the active state and runs its entry effects.
    ///
    /// The active-state reference is replaced before the entry effects are
    /// awaited; pass-through successors are followed until a state settles.
    pub async fn transition(self: &Arc<Self>, next: S) {
        let mut incoming = next;
        loop {
            let generation = self.activate(&incoming);
            debug!(
                component = %self.name,
                state = incoming.name(),
                generation,
                "state activated"
            );

            let cx = StateContext::new(Arc::clone(self), generation);
            match incoming.transfer_to(&cx).await {
                Ok(Some(successor)) => {
                    if self.generation() != generation {
                        // Superseded while entering; the successor is stale.
                        return;
                    }
                    incoming = successor;
                }
                Ok(None) => return,
                Err(err) => {
                    if self.generation() == generation {
                        self.force_halt(incoming.name(), &err);
                    }
                    return;
                }
            }
        }
    }

    /// Snapshot of the active state, if any.
    pub fn current(&self) -> Option<S> {
        self.active
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// True once the terminal state has been entered.
    pub fn is_halted(&self) -> bool {
        self.current().is_some_and(|s| s.is_halt())
    }

    /// Current activation generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(AtomicOrdering::SeqCst)
    }

    /// The queue feeding this component.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// The surface this component's states mutate.
    pub fn surface(&self) -> Arc<S::Surface> {
        Arc::clone(&self.surface)
    }

    /// The shell bus (for state-entry publications, via the context guard).
    pub(crate) fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Component name for logs and fault events.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stops the drain ticker; used during full shell teardown.
    pub fn shutdown(&self) {
        self.token.cancel();
        self.queue.clear_sink();
    }

    /// Swaps in `state` and returns the generation of the new activation.
    fn activate(&self, state: &S) -> u64 {
        let generation = self.generation.fetch_add(1, AtomicOrdering::SeqCst) + 1;
        *self.active.lock().unwrap_or_else(|p| p.into_inner()) = Some(state.clone());
        generation
    }

    /// Forces the terminal state after a transition error.
    fn force_halt(&self, state: &'static str, err: &TransitionError) {
        let _ = self.activate(&S::halt());
        error!(
            component = %self.name,
            state,
            error = %err,
            "transition failed; halting"
        );
        self.bus.publish(Event::fault(
            self.name.as_ref(),
            format!("{} in state '{state}': {err}", err.as_label()),
        ));
    }
}

/// Adapter binding a component to its queue.
///
/// Transition errors are already absorbed by `force_halt`, so the queue only
/// ever sees a healthy sink and keeps draining.
struct ComponentSink<S: StateSet>(Arc<Component<S>>);

#[async_trait]
impl<S: StateSet> EventSink for ComponentSink<S> {
    async fn deliver(&self, event: Event) -> Result<(), TransitionError> {
        self.0.handle_event(&event).await;
        Ok(())
    }
}
