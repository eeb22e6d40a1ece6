//! # Lock-screen surface contract.
//!
//! The visual surface the lock orchestrator mutates. Rendering itself lives
//! outside the core; implementations wrap the real lock-screen frame (or a
//! recording fake in tests).
//!
//! Every animated method resolves only when the effect is externally
//! observable as complete (an animation-end signal or an explicit
//! completion message), never before. That is what makes a state's
//! `transfer_to` a faithful completion handle.

use async_trait::async_trait;

use crate::error::TransitionError;

/// Visual surface owned by the lock component.
///
/// Exclusivity is enforced by the single-active-state invariant, not by a
/// lock: only the currently active state reaches the surface, and only
/// through the generation-guarded context.
#[async_trait]
pub trait LockSurface: Send + Sync + 'static {
    /// Shows the slide-to-unlock affordance; resolves at animation end.
    async fn show_slider(&self) -> Result<(), TransitionError>;

    /// Plays the slider hide animation to completion.
    async fn hide_slider(&self) -> Result<(), TransitionError>;

    /// Snaps an aborted slider back to its rest position.
    async fn restore_slider(&self) -> Result<(), TransitionError>;

    /// Raises the passcode keypad; resolves when fully risen.
    async fn raise_keypad(&self) -> Result<(), TransitionError>;

    /// Lowers the passcode keypad; resolves when fully hidden.
    async fn lower_keypad(&self) -> Result<(), TransitionError>;

    /// Hides the passcode panel after a successful entry.
    async fn hide_panel(&self) -> Result<(), TransitionError>;

    /// Unlock callback: hands control back to the owning shell.
    ///
    /// Invoked by the pass-through `Unlock` state; the component is
    /// subsequently torn down or reinitialized by its caller.
    fn unlock(&self);
}
