//! # StateSet trait and generation-guarded state context.
//!
//! A concrete orchestrator implements [`StateSet`] on one closed enum over
//! its named states. Dispatch is exhaustive matching on that enum, so the
//! transition table is statically checkable.
//!
//! ## Generation guard
//! Every state activation is tagged with a monotonically increasing
//! generation number. The [`StateContext`] handed to `transfer_to`/`on_event`
//! carries the generation it was issued under; after any suspension point the
//! state must go through the context again before touching the surface or
//! publishing. A superseded activation observes:
//!
//! - [`StateContext::surface`] → `None` (no further surface mutation),
//! - [`StateContext::publish`] → `false` (event not published),
//!
//! and its elected successor is discarded by the component. Staleness is a
//! silent no-op, never an error.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransitionError;
use crate::events::{Event, EventType};

use super::component::Component;

/// Closed set of states for one component.
///
/// Implemented on an enum over the orchestrator's named states; each variant
/// supplies its subscription list and entry behavior.
#[async_trait]
pub trait StateSet: Sized + Clone + Send + Sync + 'static {
    /// The visual surface this state machine mutates.
    type Surface: ?Sized + Send + Sync + 'static;

    /// Stable state name for logs.
    fn name(&self) -> &'static str;

    /// Event types this state wants delivered while active.
    ///
    /// The owning component drops everything else silently.
    fn event_sources(&self) -> &'static [EventType];

    /// The terminal, absorbing state.
    fn halt() -> Self;

    /// True for the terminal state.
    fn is_halt(&self) -> bool;

    /// Performs this state's entry side effects.
    ///
    /// Resolves only once the effects are externally observable as complete
    /// (an animation-end signal, an explicit completion message). Returning
    /// `Ok(Some(next))` elects a pass-through successor; the component
    /// applies it only if this activation is still current.
    async fn transfer_to(
        &self,
        cx: &StateContext<Self>,
    ) -> Result<Option<Self>, TransitionError>;

    /// Reacts to one event delivered while this state is active.
    ///
    /// Only events listed in [`event_sources`](Self::event_sources) arrive
    /// here. `Ok(Some(next))` elects the successor.
    async fn on_event(
        &self,
        cx: &StateContext<Self>,
        event: &Event,
    ) -> Result<Option<Self>, TransitionError>;
}

/// Per-activation handle into the owning component.
///
/// Created by the component for each state activation; everything a state
/// does to the outside world goes through it, which is what enforces the
/// stale-continuation discipline.
pub struct StateContext<S: StateSet> {
    component: Arc<Component<S>>,
    generation: u64,
}

impl<S: StateSet> StateContext<S> {
    pub(crate) fn new(component: Arc<Component<S>>, generation: u64) -> Self {
        Self {
            component,
            generation,
        }
    }

    /// True while the activation this context was issued under is current.
    pub fn is_current(&self) -> bool {
        self.component.generation() == self.generation
    }

    /// The surface, gated by the generation guard.
    ///
    /// Returns `None` once this activation has been superseded; callers stop
    /// silently (`Ok(None)`).
    pub fn surface(&self) -> Option<Arc<S::Surface>> {
        self.is_current().then(|| self.component.surface())
    }

    /// Publishes on the shell bus unless this activation is stale.
    ///
    /// Returns whether the event was actually published.
    pub fn publish(&self, event: Event) -> bool {
        if !self.is_current() {
            return false;
        }
        self.component.bus().publish(event);
        true
    }

    /// Generation this context was issued under (diagnostics).
    pub fn generation(&self) -> u64 {
        self.generation
    }
}
