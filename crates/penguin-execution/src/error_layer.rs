//! Tracing layer that streams warnings and errors to the front end.
//!
//! Gateway failures are logged by the orchestrator with their reason. This
//! layer picks those events up and forwards them over a tokio channel so a
//! UI can surface them without scraping log output.

use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Event data sent to the front end
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObservabilityEvent {
    /// Event target (e.g., "penguin_application::chat::orchestrator")
    pub target: String,
    /// WARN or ERROR
    pub level: String,
    pub message: String,
    /// Structured fields from the event
    pub fields: HashMap<String, Value>,
    /// RFC 3339
    pub timestamp: String,
}

impl ObservabilityEvent {
    pub fn is_error(&self) -> bool {
        self.level == Level::ERROR.as_str()
    }

    /// A field rendered as plain text, if present.
    pub fn field(&self, name: &str) -> Option<String> {
        self.fields.get(name).map(|value| match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        })
    }
}

/// Layer forwarding every event at or above `min_level` to a channel.
pub struct ErrorChannelLayer {
    sender: mpsc::UnboundedSender<ObservabilityEvent>,
    min_level: Level,
}

impl ErrorChannelLayer {
    /// Forwards WARN and ERROR events.
    pub fn new(sender: mpsc::UnboundedSender<ObservabilityEvent>) -> Self {
        Self::with_min_level(sender, Level::WARN)
    }

    pub fn with_min_level(sender: mpsc::UnboundedSender<ObservabilityEvent>, min_level: Level) -> Self {
        Self { sender, min_level }
    }
}

impl<S> Layer<S> for ErrorChannelLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // tracing orders levels by verbosity: ERROR < WARN < INFO.
        let level = *event.metadata().level();
        if level > self.min_level {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let forwarded = ObservabilityEvent {
            target: event.metadata().target().to_string(),
            level: level.to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Receiver gone means nobody is listening anymore.
        let _ = self.sender.send(forwarded);
    }
}

/// Field visitor that extracts tracing event fields into a HashMap
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl tracing::field::Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::prelude::*;

    fn capture(min_level: Level, emit: impl FnOnce()) -> Vec<ObservabilityEvent> {
        let (sender, mut receiver) = mpsc::unbounded_channel();
        let subscriber = tracing_subscriber::registry()
            .with(ErrorChannelLayer::with_min_level(sender, min_level));
        tracing::subscriber::with_default(subscriber, emit);

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_forwards_only_warnings_and_errors() {
        let events = capture(Level::WARN, || {
            tracing::info!("ignored");
            tracing::warn!("Send refused");
            tracing::error!(reason = "backend returned status 503: down", "Assistant request failed");
        });

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].message, "Send refused");
        assert!(!events[0].is_error());
        assert!(events[1].is_error());
        assert_eq!(
            events[1].field("reason").as_deref(),
            Some("backend returned status 503: down")
        );
    }

    #[test]
    fn test_structured_fields_are_typed() {
        let events = capture(Level::ERROR, || {
            tracing::error!(attempt = 3u64, retry = false, "boom");
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fields["attempt"], serde_json::json!(3));
        assert_eq!(events[0].fields["retry"], serde_json::json!(false));
        assert!(!events[0].fields.contains_key("message"));
    }

    #[test]
    fn test_dropped_receiver_is_harmless() {
        let (sender, receiver) = mpsc::unbounded_channel();
        drop(receiver);
        let subscriber = tracing_subscriber::registry().with(ErrorChannelLayer::new(sender));
        tracing::subscriber::with_default(subscriber, || tracing::error!("nobody listens"));
    }
}
