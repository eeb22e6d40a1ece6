//! One-directional bridge from the isolated lock-screen surface into the
//! trusted event bus.

mod proxy;

pub use proxy::{ProxyBridge, ProxyMessage};
