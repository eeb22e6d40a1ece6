//! Drives one full lock/unlock cycle with a console surface.
//!
//! Run with: `cargo run --example lock_cycle`

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use coreshell::{
    lock_module, DrainMode, Event, EventKind, LockComponent, LockState, LockSurface, LogWriter,
    ProxyBridge, ProxyMessage, Registry, ShellConfig, TransitionError, LOCK_MODULE,
};

struct ConsoleSurface;

impl ConsoleSurface {
    async fn animate(&self, what: &str) -> Result<(), TransitionError> {
        println!("  [surface] {what}...");
        tokio::time::sleep(Duration::from_millis(150)).await;
        println!("  [surface] {what} done");
        Ok(())
    }
}

#[async_trait]
impl LockSurface for ConsoleSurface {
    async fn show_slider(&self) -> Result<(), TransitionError> {
        self.animate("show slider").await
    }
    async fn hide_slider(&self) -> Result<(), TransitionError> {
        self.animate("hide slider").await
    }
    async fn restore_slider(&self) -> Result<(), TransitionError> {
        self.animate("restore slider").await
    }
    async fn raise_keypad(&self) -> Result<(), TransitionError> {
        self.animate("raise keypad").await
    }
    async fn lower_keypad(&self) -> Result<(), TransitionError> {
        self.animate("lower keypad").await
    }
    async fn hide_panel(&self) -> Result<(), TransitionError> {
        self.animate("hide panel").await
    }
    fn unlock(&self) {
        println!("  [surface] UNLOCKED");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let registry = Registry::new(&ShellConfig::default());
    let token = tokio_util::sync::CancellationToken::new();
    LogWriter::spawn(registry.bus(), token.clone());

    let component = LockComponent::new(
        "lockscreen",
        Arc::new(ConsoleSurface),
        registry.bus().clone(),
        DrainMode::Direct,
    );
    registry.register(lock_module(Arc::clone(&component))?)?;
    registry.start(LOCK_MODULE).await?;

    println!("-- passcode path: request keypad, one bad digit, one good");
    let bus = registry.bus().clone();
    bus.publish(Event::new(EventKind::PasscodeRequested));
    bus.publish(Event::new(EventKind::PasscodeEntered { valid: false }));
    bus.publish(Event::new(EventKind::PasscodeEntered { valid: true }));

    while component.current() != Some(LockState::Unlock) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    println!("-- re-lock and unlock via the proxy bridge");
    component.start(LockState::SlideShow).await;
    let bridge = ProxyBridge::new(bus.clone());
    bridge.forward(&ProxyMessage::new("unlock", serde_json::json!({})));

    while component.current() != Some(LockState::Unlock) {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    registry.shutdown().await;
    token.cancel();
    Ok(())
}
