//! # EventQueue: ordered, unbounded buffer with a swappable sink.
//!
//! Buffers incoming events for one component and replays them one at a time
//! to the currently installed [`EventSink`].
//!
//! ## Architecture
//! ```text
//! feed(ev) ──► [VecDeque tail]                  DrainMode::Direct
//!                    │                            feed() drains inline
//!              drain():  pop head ─► sink.deliver(ev).await
//!                    │                          DrainMode::Interval(d)
//!                    └─ on Err: publish Fault,    spawn_ticker() drains
//!                       keep remainder queued     once per tick (coalesces
//!                       for the next pass         bursts within a tick)
//! ```
//!
//! ## Rules
//! - `enqueue` appends to the tail; never blocks, never rejects.
//! - First-arrived-first-delivered; the queue never reorders or drops.
//! - Concurrent drains are suppressed (`try_lock`); the in-flight pass will
//!   pick up anything enqueued meanwhile, so order is preserved.
//! - A sink error does not corrupt the queue: the failed pass stops, the
//!   remaining entries are delivered on the next pass, and the fault is
//!   published as [`EventKind::Fault`](crate::events::EventKind::Fault).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::events::{Bus, Event};

use super::sink::EventSink;

/// When the queue drains into its sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrainMode {
    /// Drain immediately after each `feed` (direct dispatch).
    Direct,
    /// Drain on a fixed interval, coalescing bursts within one tick.
    Interval(Duration),
}

impl Default for DrainMode {
    fn default() -> Self {
        DrainMode::Direct
    }
}

/// Ordered, unbounded event buffer for one component.
pub struct EventQueue {
    /// Queue identity for fault events (component name).
    name: Arc<str>,
    buffer: StdMutex<VecDeque<Event>>,
    sink: StdMutex<Option<Arc<dyn EventSink>>>,
    /// Held across a drain pass; `try_lock` suppresses re-entrant drains.
    draining: AsyncMutex<()>,
    mode: DrainMode,
    bus: Bus,
}

impl EventQueue {
    /// Creates a queue publishing faults on `bus` under the given name.
    pub fn new(name: impl Into<Arc<str>>, mode: DrainMode, bus: Bus) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            buffer: StdMutex::new(VecDeque::new()),
            sink: StdMutex::new(None),
            draining: AsyncMutex::new(()),
            mode,
            bus,
        })
    }

    /// Installs (or swaps) the single registered sink.
    pub fn set_sink(&self, sink: Arc<dyn EventSink>) {
        *self.sink.lock().unwrap_or_else(|p| p.into_inner()) = Some(sink);
    }

    /// Removes the sink; subsequent drains leave the buffer untouched.
    pub fn clear_sink(&self) {
        *self.sink.lock().unwrap_or_else(|p| p.into_inner()) = None;
    }

    /// Appends an event to the tail. Never blocks, never rejects.
    pub fn enqueue(&self, event: Event) {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push_back(event);
    }

    /// Enqueues and, in [`DrainMode::Direct`], drains inline.
    pub async fn feed(&self, event: Event) {
        self.enqueue(event);
        if matches!(self.mode, DrainMode::Direct) {
            self.drain().await;
        }
    }

    /// Drains the buffer head-first into the current sink.
    ///
    /// Stops when the buffer is empty, when no sink is installed, or when the
    /// sink reports an error (remaining entries are kept for the next pass).
    pub async fn drain(&self) {
        let Ok(_pass) = self.draining.try_lock() else {
            // A pass is already in flight; it will pick up what we enqueued.
            return;
        };

        loop {
            let Some(sink) = self.current_sink() else {
                return;
            };
            let Some(event) = self.pop_front() else {
                return;
            };

            let seq = event.seq;
            if let Err(err) = sink.deliver(event).await {
                warn!(
                    queue = %self.name,
                    seq,
                    error = %err,
                    "sink failed during drain; remainder kept for next pass"
                );
                self.bus.publish(Event::fault(
                    self.name.as_ref(),
                    format!("{}: {err}", err.as_label()),
                ));
                return;
            }
        }
    }

    /// Spawns the interval ticker for [`DrainMode::Interval`] queues.
    ///
    /// No-op for direct-dispatch queues. The loop exits when `token` is
    /// cancelled.
    pub fn spawn_ticker(self: &Arc<Self>, token: CancellationToken) {
        let DrainMode::Interval(period) = self.mode else {
            return;
        };
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tick.tick() => queue.drain().await,
                }
            }
        });
    }

    /// Number of buffered events awaiting delivery.
    pub fn len(&self) -> usize {
        self.buffer.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// True if nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn current_sink(&self) -> Option<Arc<dyn EventSink>> {
        self.sink
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    fn pop_front(&self) -> Option<Event> {
        self.buffer
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop_front()
    }
}
