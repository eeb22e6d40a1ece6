//! Shared test doubles: a recording lock surface with failure injection and
//! an openable gate for holding an animation mid-flight.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use coreshell::{LockSurface, TransitionError};

/// Two-phase gate: the surface side parks inside an animation until the test
/// side opens it; the test side can wait until the animation was entered.
pub struct Gate {
    entered: AtomicBool,
    entered_notify: Notify,
    open: AtomicBool,
    open_notify: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entered: AtomicBool::new(false),
            entered_notify: Notify::new(),
            open: AtomicBool::new(false),
            open_notify: Notify::new(),
        })
    }

    /// Test side: resolves once the gated animation has started.
    pub async fn wait_entered(&self) {
        while !self.entered.load(Ordering::SeqCst) {
            self.entered_notify.notified().await;
        }
    }

    /// Test side: lets the gated animation complete.
    pub fn open(&self) {
        self.open.store(true, Ordering::SeqCst);
        self.open_notify.notify_one();
    }

    /// Surface side: mark entered, then park until opened.
    async fn pass(&self) {
        self.entered.store(true, Ordering::SeqCst);
        self.entered_notify.notify_one();
        while !self.open.load(Ordering::SeqCst) {
            self.open_notify.notified().await;
        }
    }
}

/// Recording lock surface: every animation appends its name to `ops`.
#[derive(Default)]
pub struct FakeSurface {
    pub ops: Mutex<Vec<&'static str>>,
    pub unlocks: AtomicUsize,
    /// When set, the named operation fails.
    pub fail_op: Mutex<Option<&'static str>>,
    /// When set, the named operation parks on the gate after recording.
    pub gated_op: Mutex<Option<(&'static str, Arc<Gate>)>>,
}

impl FakeSurface {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ops(&self) -> Vec<&'static str> {
        self.ops.lock().unwrap().clone()
    }

    pub fn unlock_count(&self) -> usize {
        self.unlocks.load(Ordering::SeqCst)
    }

    pub fn fail_on(&self, op: &'static str) {
        *self.fail_op.lock().unwrap() = Some(op);
    }

    pub fn gate_on(&self, op: &'static str, gate: Arc<Gate>) {
        *self.gated_op.lock().unwrap() = Some((op, gate));
    }

    async fn step(&self, op: &'static str) -> Result<(), TransitionError> {
        self.ops.lock().unwrap().push(op);
        if *self.fail_op.lock().unwrap() == Some(op) {
            return Err(TransitionError::Surface {
                op,
                reason: "injected".into(),
            });
        }
        let gate = {
            let gated = self.gated_op.lock().unwrap();
            match &*gated {
                Some((name, gate)) if *name == op => Some(Arc::clone(gate)),
                _ => None,
            }
        };
        if let Some(gate) = gate {
            gate.pass().await;
        }
        Ok(())
    }
}

#[async_trait]
impl LockSurface for FakeSurface {
    async fn show_slider(&self) -> Result<(), TransitionError> {
        self.step("show_slider").await
    }

    async fn hide_slider(&self) -> Result<(), TransitionError> {
        self.step("hide_slider").await
    }

    async fn restore_slider(&self) -> Result<(), TransitionError> {
        self.step("restore_slider").await
    }

    async fn raise_keypad(&self) -> Result<(), TransitionError> {
        self.step("raise_keypad").await
    }

    async fn lower_keypad(&self) -> Result<(), TransitionError> {
        self.step("lower_keypad").await
    }

    async fn hide_panel(&self) -> Result<(), TransitionError> {
        self.step("hide_panel").await
    }

    fn unlock(&self) {
        self.ops.lock().unwrap().push("unlock");
        self.unlocks.fetch_add(1, Ordering::SeqCst);
    }
}

/// Polls `check` until it holds or a 2s budget runs out.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within budget");
}
