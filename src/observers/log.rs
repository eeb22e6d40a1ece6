//! # Logging observer for debugging and demos.
//!
//! [`LogWriter`] subscribes to the bus and renders every event through
//! `tracing`. Useful in development and demos; production shells hang their
//! own observers off the bus the same way.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::events::{Bus, Event, EventKind};

/// Renders bus traffic through `tracing`.
pub struct LogWriter;

impl LogWriter {
    /// Subscribes to `bus` and logs until `token` is cancelled.
    pub fn spawn(bus: &Bus, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = bus.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => Self::render(&ev),
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "log writer lagged behind the bus");
                        }
                    }
                }
            }
        })
    }

    fn render(ev: &Event) {
        match &ev.kind {
            EventKind::ScreenChanged { on } => info!(seq = ev.seq, on, "screen-changed"),
            EventKind::GestureUnlocked => info!(seq = ev.seq, "gesture-unlocked"),
            EventKind::GestureAborted => info!(seq = ev.seq, "gesture-aborted"),
            EventKind::PasscodeRequested => info!(seq = ev.seq, "passcode-requested"),
            EventKind::PasscodeEntered { valid } => {
                info!(seq = ev.seq, valid, "passcode-entered")
            }
            EventKind::KeypadCancelled => info!(seq = ev.seq, "keypad-cancelled"),
            EventKind::ShutdownRequested => info!(seq = ev.seq, "shutdown-requested"),
            EventKind::SettingChanged { key, .. } => {
                info!(seq = ev.seq, key = %key, "setting-changed")
            }
            EventKind::SecureModeOn => info!(seq = ev.seq, "secure-modeon"),
            EventKind::SecureModeOff => info!(seq = ev.seq, "secure-modeoff"),
            EventKind::WillUnlock => info!(seq = ev.seq, "will-unlock"),
            EventKind::SecureLaunchApp { app_url, .. } => {
                info!(seq = ev.seq, app_url = %app_url, "secure-launchapp")
            }
            EventKind::Fault { origin, detail } => {
                warn!(seq = ev.seq, origin = %origin, detail = %detail, "fault")
            }
        }
    }
}
