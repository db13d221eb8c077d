//! Integration tests for log forwarding against a live HTTP sink.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

mod common;

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::Method;
use common::{MockServer, Reply, dead_base_url};
use echoes_client::{BYPASS_TARGET, Telemetry};
use echoes_types::{LogEvent, LogLevel};
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;

/// Collects formatted output so tests can inspect local logging.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

fn local_subscriber(
    telemetry: &Telemetry,
    buffer: &SharedBuffer,
) -> impl tracing::Subscriber + Send + Sync {
    let writer = buffer.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || writer.clone()),
        )
        .with(telemetry.layer())
}

#[tokio::test]
async fn captured_events_are_posted_to_the_log_sink() {
    let server = MockServer::start().await;
    server.reply(Method::POST, "/log", Reply::ok(json!({"status": "logged"})));
    let telemetry = Telemetry::start(reqwest::Client::new(), format!("{}/log", server.base_url()));

    telemetry.capture(LogLevel::Error, "Failed to allocate stat");
    telemetry.capture(LogLevel::Fatal, "Unhandled task failure (renderer): closed");

    let posted = server.wait_for("/log", 2, Duration::from_secs(5)).await;
    assert_eq!(posted.len(), 2);

    // Forwards are independent, so arrival order is not fixed.
    let mut events: Vec<LogEvent> = posted
        .into_iter()
        .map(|r| serde_json::from_value(r.body.unwrap()).unwrap())
        .collect();
    events.sort_by_key(|e| e.level.as_str());
    assert_eq!(events[0].level, LogLevel::Error);
    assert_eq!(events[0].message, "Failed to allocate stat");
    assert_eq!(events[1].level, LogLevel::Fatal);
}

#[tokio::test]
async fn posted_events_carry_exactly_the_wire_fields() {
    let server = MockServer::start().await;
    server.reply(Method::POST, "/log", Reply::ok(json!({"status": "logged"})));
    let telemetry = Telemetry::start(reqwest::Client::new(), format!("{}/log", server.base_url()));

    telemetry.capture(LogLevel::Error, "boom");

    let posted = server.wait_for("/log", 1, Duration::from_secs(5)).await;
    let body = posted[0].body.clone().unwrap();
    let object = body.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["level", "message", "timestamp"]);
    assert_eq!(body["level"], "error");
    assert!(body["timestamp"].as_str().unwrap().contains('T'));
}

#[tokio::test]
async fn sink_errors_are_ignored_silently() {
    let server = MockServer::start().await;
    server.reply(Method::POST, "/log", Reply::status(500, None));
    let telemetry = Telemetry::start(reqwest::Client::new(), format!("{}/log", server.base_url()));
    let buffer = SharedBuffer::default();
    let _guard = tracing::subscriber::set_default(local_subscriber(&telemetry, &buffer));

    tracing::error!("Failed to equip item");

    let posted = server.wait_for("/log", 1, Duration::from_secs(5)).await;
    assert_eq!(posted.len(), 1);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(server.requests_to("/log").len(), 1);
    assert!(!buffer.contents().contains("failed to send log to server"));
}

#[tokio::test]
async fn unreachable_sink_is_reported_locally_once() {
    let telemetry = Telemetry::start(reqwest::Client::new(), format!("{}/log", dead_base_url()));
    let buffer = SharedBuffer::default();
    let _guard = tracing::subscriber::set_default(local_subscriber(&telemetry, &buffer));

    tracing::error!("Failed to perform action");

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !buffer.contents().contains("failed to send log to server")
        && tokio::time::Instant::now() < deadline
    {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Give a runaway feedback loop time to show itself.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let output = buffer.contents();
    assert_eq!(output.matches("failed to send log to server").count(), 1);
    assert_eq!(output.matches("Failed to perform action").count(), 1);
}

#[tokio::test]
async fn bypass_target_reaches_local_output_only() {
    let server = MockServer::start().await;
    server.reply(Method::POST, "/log", Reply::ok(json!({})));
    let telemetry = Telemetry::start(reqwest::Client::new(), format!("{}/log", server.base_url()));
    let buffer = SharedBuffer::default();
    let _guard = tracing::subscriber::set_default(local_subscriber(&telemetry, &buffer));

    tracing::error!(target: BYPASS_TARGET, "pipeline self-report");
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(buffer.contents().contains("pipeline self-report"));
    assert!(server.requests_to("/log").is_empty());
}
