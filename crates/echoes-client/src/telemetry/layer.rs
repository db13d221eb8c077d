//! `tracing` layer feeding error-level events into the pipeline.

use core::fmt::Write as _;

use echoes_types::LogLevel;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use super::{BYPASS_TARGET, FORWARD_SPAN, Telemetry};

/// Forwards `ERROR` events as [`LogLevel::Error`].
///
/// Compose it next to the formatting layer; it only observes, so whatever
/// the other layers print is unchanged. Events under [`BYPASS_TARGET`] and
/// events raised inside a forward are skipped.
#[derive(Debug, Clone)]
pub struct TelemetryLayer {
    telemetry: Telemetry,
}

impl TelemetryLayer {
    pub(super) const fn new(telemetry: Telemetry) -> Self {
        Self { telemetry }
    }
}

impl<S> Layer<S> for TelemetryLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if *metadata.level() != Level::ERROR || metadata.target().starts_with(BYPASS_TARGET) {
            return;
        }
        if let Some(scope) = ctx.event_scope(event) {
            if scope.into_iter().any(|span| span.name() == FORWARD_SPAN) {
                return;
            }
        }

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.telemetry.capture(LogLevel::Error, visitor.finish());
    }
}

/// Flattens an event into `message key=value key=value`.
#[derive(Debug, Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: &dyn core::fmt::Display) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.push_field(field.name(), &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn core::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), &format_args!("{value:?}"));
        }
    }
}
