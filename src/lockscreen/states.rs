//! # The nine lock-flow states.
//!
//! Closed enum over the lock orchestrator's states, dispatched by exhaustive
//! matching so the transition table below is statically checkable.
//!
//! ## Transition table
//! ```text
//! SlideShow ──gesture ok──────► SlideHide ───► Unlock
//! SlideShow ──gesture abort───► SlideRestore ───► SlideShow
//! SlideShow ──passcode req────► KeypadRising ───► KeypadShow
//! KeypadShow ──code valid─────► PanelHide ───► Unlock
//! KeypadShow ──cancel─────────► KeypadHiding ───► SlideShow
//! any ──transition error / shutdown──► Halt (absorbing)
//! ```
//!
//! `Unlock` is a pass-through: its entry invokes the surface unlock callback,
//! publishes `WillUnlock`, and yields with no successor of its own.

use async_trait::async_trait;

use crate::error::TransitionError;
use crate::events::{Event, EventKind, EventType};
use crate::machine::{Component, StateContext, StateSet};

use super::surface::LockSurface;

/// The lock orchestrator's component type.
pub type LockComponent = Component<LockState>;

/// Named phases of the device lock flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Visual slider shown, waiting for a gesture (initial state).
    SlideShow,
    /// Slider hide animation after a successful gesture.
    SlideHide,
    /// Slider snap-back after a failed or aborted gesture.
    SlideRestore,
    /// Keypad raise animation after a passcode-panel request.
    KeypadRising,
    /// Keypad idle, accepting passcode entries.
    KeypadShow,
    /// Keypad lower animation after a cancel.
    KeypadHiding,
    /// Panel hide animation after a correct passcode.
    PanelHide,
    /// Pass-through state that fires the unlock callback.
    Unlock,
    /// Terminal, absorbing state.
    Halt,
}

impl LockState {
    /// Events wanted by the idle slider.
    const SLIDE_SOURCES: &'static [EventType] = &[
        EventType::GestureUnlocked,
        EventType::GestureAborted,
        EventType::PasscodeRequest,
    ];

    /// Events wanted by the idle keypad.
    const KEYPAD_SOURCES: &'static [EventType] =
        &[EventType::PasscodeEntered, EventType::KeypadCancel];
}

#[async_trait]
impl StateSet for LockState {
    type Surface = dyn LockSurface;

    fn name(&self) -> &'static str {
        match self {
            LockState::SlideShow => "slide-show",
            LockState::SlideHide => "slide-hide",
            LockState::SlideRestore => "slide-restore",
            LockState::KeypadRising => "keypad-rising",
            LockState::KeypadShow => "keypad-show",
            LockState::KeypadHiding => "keypad-hiding",
            LockState::PanelHide => "panel-hide",
            LockState::Unlock => "unlock",
            LockState::Halt => "halt",
        }
    }

    fn event_sources(&self) -> &'static [EventType] {
        match self {
            LockState::SlideShow => Self::SLIDE_SOURCES,
            LockState::KeypadShow => Self::KEYPAD_SOURCES,
            // Transitional and terminal states sit out event delivery.
            LockState::SlideHide
            | LockState::SlideRestore
            | LockState::KeypadRising
            | LockState::KeypadHiding
            | LockState::PanelHide
            | LockState::Unlock
            | LockState::Halt => &[],
        }
    }

    fn halt() -> Self {
        LockState::Halt
    }

    fn is_halt(&self) -> bool {
        matches!(self, LockState::Halt)
    }

    async fn transfer_to(
        &self,
        cx: &StateContext<Self>,
    ) -> Result<Option<Self>, TransitionError> {
        let Some(surface) = cx.surface() else {
            // Superseded before entry effects started.
            return Ok(None);
        };
        match self {
            LockState::SlideShow => {
                surface.show_slider().await?;
                Ok(None)
            }
            LockState::SlideHide => {
                surface.hide_slider().await?;
                Ok(Some(LockState::Unlock))
            }
            LockState::SlideRestore => {
                surface.restore_slider().await?;
                Ok(Some(LockState::SlideShow))
            }
            LockState::KeypadRising => {
                surface.raise_keypad().await?;
                Ok(Some(LockState::KeypadShow))
            }
            LockState::KeypadShow => Ok(None),
            LockState::KeypadHiding => {
                surface.lower_keypad().await?;
                Ok(Some(LockState::SlideShow))
            }
            LockState::PanelHide => {
                surface.hide_panel().await?;
                Ok(Some(LockState::Unlock))
            }
            LockState::Unlock => {
                // A stale activation must not fire the unlock callback;
                // publish is generation-gated and reports suppression.
                if !cx.publish(Event::new(EventKind::WillUnlock)) {
                    return Ok(None);
                }
                surface.unlock();
                Ok(None)
            }
            LockState::Halt => Ok(None),
        }
    }

    async fn on_event(
        &self,
        _cx: &StateContext<Self>,
        event: &Event,
    ) -> Result<Option<Self>, TransitionError> {
        match (self, &event.kind) {
            (LockState::SlideShow, EventKind::GestureUnlocked) => Ok(Some(LockState::SlideHide)),
            (LockState::SlideShow, EventKind::GestureAborted) => Ok(Some(LockState::SlideRestore)),
            (LockState::SlideShow, EventKind::PasscodeRequested) => {
                Ok(Some(LockState::KeypadRising))
            }
            (LockState::KeypadShow, EventKind::PasscodeEntered { valid: true }) => {
                Ok(Some(LockState::PanelHide))
            }
            (LockState::KeypadShow, EventKind::PasscodeEntered { valid: false }) => Ok(None),
            (LockState::KeypadShow, EventKind::KeypadCancelled) => {
                Ok(Some(LockState::KeypadHiding))
            }
            // Subscribed-but-unmatched deliveries are ignored, not errors.
            _ => Ok(None),
        }
    }
}
