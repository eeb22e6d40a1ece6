//! Module registry lifecycle: dependency resolution, idempotent start,
//! failure isolation, and setting-change dispatch.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use coreshell::{
    Event, EventType, ModuleDescriptor, Registry, RegistryError, SettingValue, ShellConfig,
};

use common::eventually;

#[tokio::test]
async fn cycle_is_rejected_and_neither_module_starts() {
    let registry = Registry::new(&ShellConfig::default());

    registry
        .register(ModuleDescriptor::builder("a").requires("b").build().unwrap())
        .unwrap();
    let err = registry
        .register(ModuleDescriptor::builder("b").requires("a").build().unwrap())
        .unwrap_err();
    assert!(matches!(err, RegistryError::DependencyCycle { .. }));

    // "a" cannot start either: its dependency was never stored.
    let err = registry.start("a").await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::MissingDependency { ref dependency, .. } if dependency == "b"
    ));
    assert!(!registry.is_started("a").await);
    assert!(!registry.is_started("b").await);
}

#[tokio::test]
async fn start_is_idempotent_across_paths() {
    let registry = Registry::new(&ShellConfig::default());
    let starts = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&starts);
    registry
        .register(
            ModuleDescriptor::builder("base")
                .on_start(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Ok(())
                    }
                })
                .build()
                .unwrap(),
        )
        .unwrap();
    // Duplicate names in the requirement list collapse onto one start.
    registry
        .register(
            ModuleDescriptor::builder("app")
                .requires("base")
                .requires("base")
                .build()
                .unwrap(),
        )
        .unwrap();

    registry.start("base").await.unwrap();
    registry.start("base").await.unwrap();
    registry.start("app").await.unwrap();

    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert!(registry.is_started("app").await);
}

#[tokio::test]
async fn dependencies_start_depth_first() {
    let registry = Registry::new(&ShellConfig::default());
    let order = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    for (name, deps, tag) in [
        ("screen", vec![], "screen"),
        ("theme", vec!["screen"], "theme"),
        ("statusbar", vec!["theme", "screen"], "statusbar"),
    ] {
        let log = Arc::clone(&order);
        let mut builder = ModuleDescriptor::builder(name);
        for dep in deps {
            builder = builder.requires(dep);
        }
        registry
            .register(
                builder
                    .on_start(move || {
                        let log = Arc::clone(&log);
                        async move {
                            log.lock().unwrap().push(tag);
                            Ok(())
                        }
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();
    }

    registry.start("statusbar").await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["screen", "theme", "statusbar"]);
}

#[tokio::test]
async fn failing_module_does_not_affect_siblings() {
    let registry = Registry::new(&ShellConfig::default());
    let mut faults = registry.bus().subscribe();

    registry
        .register(
            ModuleDescriptor::builder("flaky")
                .on_start(|| async { Err("device missing".to_string()) })
                .build()
                .unwrap(),
        )
        .unwrap();
    registry
        .register(ModuleDescriptor::builder("solid").build().unwrap())
        .unwrap();

    let err = registry.start("flaky").await.unwrap_err();
    assert!(matches!(err, RegistryError::StartFailed { .. }));
    assert!(!registry.is_started("flaky").await);

    // The failure went to the error channel...
    let fault = faults.recv().await.unwrap();
    assert!(matches!(
        fault.kind,
        coreshell::EventKind::Fault { ref origin, .. } if origin == "flaky"
    ));

    // ...and the sibling is untouched.
    registry.start("solid").await.unwrap();
    assert!(registry.is_started("solid").await);
}

#[tokio::test]
async fn unknown_module_fails_start_only() {
    let registry = Registry::new(&ShellConfig::default());
    let err = registry.start("ghost").await.unwrap_err();
    assert!(matches!(err, RegistryError::UnknownModule { .. }));
}

#[tokio::test]
async fn setting_watcher_fires_once_per_actual_change() {
    let registry = Registry::new(&ShellConfig::default());
    let calls = Arc::new(Mutex::new(Vec::<SettingValue>::new()));

    let seen = Arc::clone(&calls);
    registry
        .register(
            ModuleDescriptor::builder("alarm")
                .on_setting("alarm.enabled", move |value| {
                    let seen = Arc::clone(&seen);
                    async move {
                        seen.lock().unwrap().push(value);
                    }
                })
                .build()
                .unwrap(),
        )
        .unwrap();
    let handle = registry.start("alarm").await.unwrap();

    let bus = registry.bus().clone();
    bus.publish(Event::setting("alarm.enabled", false));
    {
        let calls = Arc::clone(&calls);
        eventually(move || calls.lock().unwrap().len() == 1).await;
    }

    bus.publish(Event::setting("alarm.enabled", true));
    // A repeated identical value must be suppressed.
    bus.publish(Event::setting("alarm.enabled", true));
    // An unwatched key never reaches the handler.
    bus.publish(Event::setting("alarm.volume", 7));

    {
        let calls = Arc::clone(&calls);
        eventually(move || calls.lock().unwrap().len() == 2).await;
    }
    assert_eq!(
        *calls.lock().unwrap(),
        vec![SettingValue::Bool(false), SettingValue::Bool(true)]
    );
    assert_eq!(
        handle.cached_setting("alarm.enabled").await,
        Some(SettingValue::Bool(true))
    );
}

#[tokio::test]
async fn event_watcher_receives_only_table_entries() {
    let registry = Registry::new(&ShellConfig::default());
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    registry
        .register(
            ModuleDescriptor::builder("watcher")
                .on_event(EventType::SecureModeOn, move |_ev| {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .build()
                .unwrap(),
        )
        .unwrap();
    registry.start("watcher").await.unwrap();

    let bus = registry.bus().clone();
    bus.publish(Event::new(coreshell::EventKind::SecureModeOff));
    bus.publish(Event::new(coreshell::EventKind::SecureModeOn));

    let hits2 = Arc::clone(&hits);
    eventually(move || hits2.load(Ordering::SeqCst) == 1).await;
}

#[tokio::test]
async fn shutdown_runs_stop_hooks() {
    let registry = Registry::new(&ShellConfig::default());
    let stopped = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&stopped);
    registry
        .register(
            ModuleDescriptor::builder("svc")
                .on_stop(move || {
                    let counter = Arc::clone(&counter);
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                })
                .build()
                .unwrap(),
        )
        .unwrap();
    registry.start("svc").await.unwrap();

    registry.shutdown().await;
    assert_eq!(stopped.load(Ordering::SeqCst), 1);
}
