//! Query instrumentation hooks
//!
//! Queries report stage timings and trace messages through a [QueryObserver]
//! passed explicitly into the entry points. [NoopObserver] discards
//! everything; [TracingObserver] forwards to `tracing` with elapsed times.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use tracing::debug;

/// Receives timing and trace events from a running query
///
/// Implementations must be `Send + Sync`: per-release stages report from
/// worker threads.
pub trait QueryObserver: Send + Sync {
    fn on_timer_start(&self, _name: &str) {}

    fn on_timer_stop(&self, _name: &str) {}

    fn on_trace(&self, _message: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl QueryObserver for NoopObserver {}

/// Observer logging timers and traces as `tracing` debug events
#[derive(Debug, Default)]
pub struct TracingObserver {
    started: Mutex<HashMap<String, Instant>>,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QueryObserver for TracingObserver {
    fn on_timer_start(&self, name: &str) {
        if let Ok(mut started) = self.started.lock() {
            started.insert(name.to_string(), Instant::now());
        }
        debug!(timer = name, "timer started");
    }

    fn on_timer_stop(&self, name: &str) {
        let started = self
            .started
            .lock()
            .ok()
            .and_then(|mut started| started.remove(name));

        match started {
            Some(start) => debug!(
                timer = name,
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "timer stopped"
            ),
            None => debug!(timer = name, "timer stopped without start"),
        }
    }

    fn on_trace(&self, message: &str) {
        debug!("{}", message);
    }
}

/// Starts a named timer on creation and stops it when dropped
pub(crate) struct TimerGuard<'a> {
    observer: &'a dyn QueryObserver,
    name: String,
}

impl<'a> TimerGuard<'a> {
    pub(crate) fn start(observer: &'a dyn QueryObserver, name: impl Into<String>) -> Self {
        let name = name.into();
        observer.on_timer_start(&name);
        TimerGuard { observer, name }
    }
}

impl Drop for TimerGuard<'_> {
    fn drop(&mut self) {
        self.observer.on_timer_stop(&self.name);
    }
}
