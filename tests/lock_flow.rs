//! Lock/unlock orchestration flows driven through the component queue.

mod common;

use std::sync::Arc;

use coreshell::{
    DrainMode, Event, EventKind, LockComponent, LockState, LockSurface, Registry, ShellConfig,
};

use common::FakeSurface;

fn setup() -> (Arc<Registry>, Arc<LockComponent>, Arc<FakeSurface>) {
    let registry = Registry::new(&ShellConfig::default());
    let surface = FakeSurface::new();
    let component = LockComponent::new(
        "lockscreen",
        Arc::clone(&surface) as Arc<dyn LockSurface>,
        registry.bus().clone(),
        DrainMode::Direct,
    );
    (registry, component, surface)
}

#[tokio::test]
async fn successful_slide_unlocks_exactly_once() {
    let (registry, component, surface) = setup();
    let mut rx = registry.bus().subscribe();

    component.start(LockState::SlideShow).await;
    assert_eq!(component.current(), Some(LockState::SlideShow));

    component
        .queue()
        .feed(Event::new(EventKind::GestureUnlocked))
        .await;

    assert_eq!(component.current(), Some(LockState::Unlock));
    assert_eq!(surface.unlock_count(), 1);
    assert_eq!(surface.ops(), vec!["show_slider", "hide_slider", "unlock"]);

    // Unlock announces itself on the bus.
    let announced = rx.recv().await.unwrap();
    assert_eq!(announced.kind, EventKind::WillUnlock);
}

#[tokio::test]
async fn aborted_gesture_restores_the_slider() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;

    component
        .queue()
        .feed(Event::new(EventKind::GestureAborted))
        .await;

    assert_eq!(component.current(), Some(LockState::SlideShow));
    assert_eq!(surface.unlock_count(), 0);
    assert_eq!(
        surface.ops(),
        vec!["show_slider", "restore_slider", "show_slider"]
    );
}

#[tokio::test]
async fn passcode_flow_reaches_unlock_after_bad_digits() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;

    component
        .queue()
        .feed(Event::new(EventKind::PasscodeRequested))
        .await;
    assert_eq!(component.current(), Some(LockState::KeypadShow));

    for _ in 0..3 {
        component
            .queue()
            .feed(Event::new(EventKind::PasscodeEntered { valid: false }))
            .await;
        assert_eq!(component.current(), Some(LockState::KeypadShow));
    }

    component
        .queue()
        .feed(Event::new(EventKind::PasscodeEntered { valid: true }))
        .await;

    assert_eq!(component.current(), Some(LockState::Unlock));
    assert_eq!(surface.unlock_count(), 1);
    assert_eq!(
        surface.ops(),
        vec!["show_slider", "raise_keypad", "hide_panel", "unlock"]
    );
}

#[tokio::test]
async fn keypad_cancel_returns_to_slider() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;

    component
        .queue()
        .feed(Event::new(EventKind::PasscodeRequested))
        .await;
    component
        .queue()
        .feed(Event::new(EventKind::KeypadCancelled))
        .await;

    assert_eq!(component.current(), Some(LockState::SlideShow));
    assert_eq!(
        surface.ops(),
        vec!["show_slider", "raise_keypad", "lower_keypad", "show_slider"]
    );
}

#[tokio::test]
async fn unsubscribed_events_are_dropped_silently() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;

    // SlideShow does not subscribe to passcode entries.
    component
        .queue()
        .feed(Event::new(EventKind::PasscodeEntered { valid: true }))
        .await;

    assert_eq!(component.current(), Some(LockState::SlideShow));
    assert_eq!(surface.ops(), vec!["show_slider"]);
}

#[tokio::test]
async fn transition_error_forces_absorbing_halt() {
    let (registry, component, surface) = setup();
    let mut rx = registry.bus().subscribe();
    component.start(LockState::SlideShow).await;
    surface.fail_on("raise_keypad");

    component
        .queue()
        .feed(Event::new(EventKind::PasscodeRequested))
        .await;
    assert_eq!(component.current(), Some(LockState::Halt));

    let fault = rx.recv().await.unwrap();
    assert!(matches!(fault.kind, EventKind::Fault { .. }));

    // Absorbing: no further delivery produces a visible side effect.
    let ops_at_halt = surface.ops();
    component
        .queue()
        .feed(Event::new(EventKind::GestureUnlocked))
        .await;
    component
        .queue()
        .feed(Event::new(EventKind::PasscodeRequested))
        .await;
    assert_eq!(component.current(), Some(LockState::Halt));
    assert_eq!(surface.ops(), ops_at_halt);
    assert_eq!(surface.unlock_count(), 0);
}

#[tokio::test]
async fn halted_component_recovers_on_explicit_restart() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;
    surface.fail_on("restore_slider");

    component
        .queue()
        .feed(Event::new(EventKind::GestureAborted))
        .await;
    assert_eq!(component.current(), Some(LockState::Halt));

    *surface.fail_op.lock().unwrap() = None;
    component.start(LockState::SlideShow).await;
    assert_eq!(component.current(), Some(LockState::SlideShow));

    component
        .queue()
        .feed(Event::new(EventKind::GestureUnlocked))
        .await;
    assert_eq!(component.current(), Some(LockState::Unlock));
    assert_eq!(surface.unlock_count(), 1);
}

#[tokio::test]
async fn shutdown_event_halts_from_any_state() {
    let (_registry, component, _surface) = setup();
    component.start(LockState::SlideShow).await;

    component
        .queue()
        .feed(Event::new(EventKind::PasscodeRequested))
        .await;
    assert_eq!(component.current(), Some(LockState::KeypadShow));

    component
        .queue()
        .feed(Event::new(EventKind::ShutdownRequested))
        .await;
    assert_eq!(component.current(), Some(LockState::Halt));
}

#[tokio::test]
async fn queue_preserves_relative_order_of_subscribed_events() {
    let (_registry, component, surface) = setup();
    component.start(LockState::SlideShow).await;

    // Abort (subscribed), a stray passcode entry (dropped), then a request.
    component
        .queue()
        .enqueue(Event::new(EventKind::GestureAborted));
    component
        .queue()
        .enqueue(Event::new(EventKind::PasscodeEntered { valid: true }));
    component
        .queue()
        .enqueue(Event::new(EventKind::PasscodeRequested));
    component.queue().drain().await;

    assert_eq!(component.current(), Some(LockState::KeypadShow));
    assert_eq!(
        surface.ops(),
        vec!["show_slider", "restore_slider", "show_slider", "raise_keypad"]
    );
}
