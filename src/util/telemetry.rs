//! Telemetry helpers for structured logging.
//!
//! The pool logs through `tracing` with structured fields (`pool`,
//! `worker_id`, `priority`, `error`). Nothing is printed unless a subscriber
//! is installed.

/// Install a default `fmt` subscriber filtered by `RUST_LOG`.
///
/// Does nothing if a global subscriber is already set, so applications can
/// install their own first. The fmt layer writes whole lines, so output from
/// concurrent workers never interleaves mid-line.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_thread_names(true)
        .try_init();
}
