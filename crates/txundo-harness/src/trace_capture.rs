#![forbid(unsafe_code)]

//! `tracing` layer that captures spans and events for assertions.
//!
//! ```ignore
//! let handle = EventCapture::run(|| manager.undo().unwrap());
//! assert!(handle.events().iter().any(|e| e.message == "replayed transaction"));
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

/// A captured span with its recorded fields.
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    /// Span name, e.g. `txundo.replay`.
    pub name: String,
    /// Target of the span's callsite.
    pub target: String,
    /// Fields recorded at creation, formatted.
    pub fields: HashMap<String, String>,
}

/// A captured event and the span it was emitted in.
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    /// Event level.
    pub level: tracing::Level,
    /// Target of the event's callsite.
    pub target: String,
    /// The `message` field, empty if the event had none.
    pub message: String,
    /// Every other field, formatted.
    pub fields: HashMap<String, String>,
    /// Name of the span the event was emitted in.
    pub parent_span: Option<String>,
}

impl CapturedEvent {
    /// Value of a field, formatted.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

fn lock(captured: &Mutex<Captured>) -> MutexGuard<'_, Captured> {
    captured.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Layer recording every span and event it sees.
pub struct EventCapture {
    captured: Arc<Mutex<Captured>>,
}

/// Read side of an [`EventCapture`].
#[derive(Clone)]
pub struct CaptureHandle {
    captured: Arc<Mutex<Captured>>,
}

impl CaptureHandle {
    /// Spans opened so far.
    #[must_use]
    pub fn spans(&self) -> Vec<CapturedSpan> {
        lock(&self.captured).spans.clone()
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        lock(&self.captured).events.clone()
    }

    /// Events whose message equals `message`.
    #[must_use]
    pub fn events_with_message(&self, message: &str) -> Vec<CapturedEvent> {
        lock(&self.captured)
            .events
            .iter()
            .filter(|e| e.message == message)
            .cloned()
            .collect()
    }
}

impl EventCapture {
    /// New layer and the handle to read what it captures.
    ///
    /// For installing the layer into a custom subscriber; [`run`](Self::run)
    /// covers the common case.
    #[must_use]
    pub fn pair() -> (Self, CaptureHandle) {
        let captured = Arc::new(Mutex::new(Captured::default()));
        (
            Self {
                captured: captured.clone(),
            },
            CaptureHandle { captured },
        )
    }

    /// Run `f` with a capturing subscriber installed for this thread.
    pub fn run<F: FnOnce()>(f: F) -> CaptureHandle {
        let (layer, handle) = Self::pair();
        let subscriber = tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::TRACE)
            .with(layer);
        tracing::subscriber::with_default(subscriber, f);
        handle
    }
}

/// Visitor that extracts span/event fields.
struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        lock(&self.captured).spans.push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            target: attrs.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);

        let mut fields: HashMap<String, String> = visitor.0.into_iter().collect();
        let message = fields.remove("message").unwrap_or_default();
        let parent_span = ctx
            .current_span()
            .id()
            .and_then(|id| ctx.span(id))
            .map(|span_ref| span_ref.name().to_string());

        lock(&self.captured).events.push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            message,
            fields,
            parent_span,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_event_inside_span() {
        let handle = EventCapture::run(|| {
            let _span = tracing::debug_span!("outer", kind = "test").entered();
            tracing::debug!(count = 3_u64, "inside");
        });

        let spans = handle.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "outer");
        assert_eq!(spans[0].fields.get("kind").map(String::as_str), Some("test"));

        let events = handle.events_with_message("inside");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].parent_span.as_deref(), Some("outer"));
        assert_eq!(events[0].field("count"), Some("3"));
    }

    #[test]
    fn pair_installs_into_custom_subscriber() {
        let (layer, handle) = EventCapture::pair();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "custom", "plain");
        });

        let events = handle.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].target, "custom");
        assert_eq!(events[0].level, tracing::Level::INFO);
        assert!(events[0].parent_span.is_none());
        assert!(handle.spans().is_empty());
    }
}
