//! Telemetry pipeline: capture diagnostics, forward them to the server.
//!
//! [`Telemetry`] is an explicitly constructed service with one narrow entry
//! point, [`Telemetry::capture`]. It is wired into three native hooks at
//! process start:
//!
//! - [`TelemetryLayer`] -- a `tracing` layer that forwards error-level events.
//!   It sits beside the normal formatting layer, so local output is kept.
//! - [`Telemetry::install_panic_hook`] -- chains onto the previous panic hook
//!   and forwards the panic as `fatal`.
//! - [`Telemetry::supervise`] -- spawns a task and forwards its `Err` as
//!   `fatal` if it ends with one.
//!
//! # Forwarding
//!
//! `capture` only enqueues. A background forwarder spawns one independent
//! `POST /log` per event, so the code that triggered a diagnostic never
//! waits on the network and never sees its outcome. A failed forward is
//! reported under [`BYPASS_TARGET`], which the layer never intercepts, and
//! every event emitted while a forward is running is skipped too.

mod hooks;
mod layer;

use echoes_types::{LogEvent, LogLevel};
use tokio::sync::mpsc;
use tracing::{Instrument, Span, error, error_span};

pub use layer::TelemetryLayer;

/// `tracing` target whose events are never forwarded.
///
/// Used for reports about the pipeline itself.
pub const BYPASS_TARGET: &str = "echoes::telemetry::bypass";

/// Span wrapping each in-flight forward.
pub(crate) const FORWARD_SPAN: &str = "telemetry_forward";

/// The span a forward runs in.
///
/// Error level, so any filter that lets error events through also creates
/// the span the layer relies on to skip them.
pub(crate) fn forward_span() -> Span {
    error_span!(FORWARD_SPAN)
}

/// Handle to the telemetry pipeline.
///
/// Cheap to clone; clones feed the same forwarder.
#[derive(Debug, Clone)]
pub struct Telemetry {
    tx: Option<mpsc::UnboundedSender<LogEvent>>,
}

impl Telemetry {
    /// Start forwarding to `endpoint` (the server's `/log` URL).
    ///
    /// Spawns the forwarder on the current tokio runtime. It runs until
    /// every clone of the returned handle is dropped.
    pub fn start(http: reqwest::Client, endpoint: String) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_forwarder(http, endpoint, rx));
        Self { tx: Some(tx) }
    }

    /// A pipeline that drops everything.
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// A pipeline that delivers events to the returned receiver instead of
    /// the network.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LogEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Whether captured events go anywhere.
    pub const fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Record one diagnostic. Never blocks and never fails.
    pub fn capture(&self, level: LogLevel, message: impl Into<String>) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(LogEvent::now(level, message)).is_err() {
            error!(target: BYPASS_TARGET, "telemetry forwarder stopped, dropping event");
        }
    }

    /// A `tracing` layer that captures error-level events into this pipeline.
    pub fn layer(&self) -> TelemetryLayer {
        TelemetryLayer::new(self.clone())
    }
}

/// Drain the queue, spawning one detached forward per event.
async fn run_forwarder(
    http: reqwest::Client,
    endpoint: String,
    mut rx: mpsc::UnboundedReceiver<LogEvent>,
) {
    while let Some(event) = rx.recv().await {
        let http = http.clone();
        let endpoint = endpoint.clone();
        tokio::spawn(forward(http, endpoint, event).instrument(forward_span()));
    }
}

/// Send one event. The server's answer is ignored; only a missing answer
/// is reported, and only locally.
async fn forward(http: reqwest::Client, endpoint: String, event: LogEvent) {
    if let Err(e) = http.post(&endpoint).json(&event).send().await {
        error!(
            target: BYPASS_TARGET,
            endpoint = endpoint,
            level = %event.level,
            error = %e,
            "failed to send log to server"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_pipeline_swallows_captures() {
        let telemetry = Telemetry::disabled();
        assert!(!telemetry.is_enabled());
        telemetry.capture(LogLevel::Error, "ignored");
    }

    #[test]
    fn channel_pipeline_delivers_in_order() {
        let (telemetry, mut rx) = Telemetry::channel();
        telemetry.capture(LogLevel::Error, "first");
        telemetry.clone().capture(LogLevel::Fatal, "second");

        let first = rx.try_recv().unwrap();
        let second = rx.try_recv().unwrap();
        assert_eq!((first.level, first.message.as_str()), (LogLevel::Error, "first"));
        assert_eq!((second.level, second.message.as_str()), (LogLevel::Fatal, "second"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn capture_after_forwarder_is_gone_does_not_panic() {
        let (telemetry, rx) = Telemetry::channel();
        drop(rx);
        telemetry.capture(LogLevel::Error, "nobody listening");
    }
}
