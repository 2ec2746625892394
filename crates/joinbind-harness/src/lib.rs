#![forbid(unsafe_code)]

//! Test fixtures for joinbind.
//!
//! - [`RecordingProvider`]: a [`JoinProvider`](joinbind_core::JoinProvider)
//!   that records every call in order and lets tests push feedback values.
//! - [`strategies`]: proptest strategies for join numbers and per-kind values.
//!
//! The recording provider does not model a processor. It never answers a
//! publish with feedback on its own; tests deliver feedback explicitly.

pub mod recording;
pub mod strategies;

pub use recording::{ProviderCall, RecordingProvider};
pub use strategies::ArbitrarySignal;

/// Install a fmt subscriber writing through the test harness for the
/// current thread. Keep the guard alive for the duration of the test.
#[must_use = "the subscriber is uninstalled when the guard drops"]
pub fn trace_guard() -> tracing::subscriber::DefaultGuard {
    let subscriber = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::set_default(subscriber)
}
