//! Tracing capture layer for integration tests
//!
//! Records spans and events emitted while the engine runs so tests can
//! assert on instrumentation without a real subscriber backend.
//!
//! Uses `tracing::subscriber::set_default()` so each test owns its
//! subscriber through the returned guard.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

/// A captured span
#[derive(Debug, Clone)]
pub struct CapturedSpan {
    pub name: &'static str,
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
    pub parent_name: Option<String>,
}

/// A captured event
#[derive(Debug, Clone)]
pub struct CapturedEvent {
    pub level: tracing::Level,
    pub fields: HashMap<String, String>,
    pub span_name: Option<String>,
}

impl CapturedEvent {
    pub fn message(&self) -> &str {
        self.fields.get("message").map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Default)]
struct Captured {
    spans: Vec<CapturedSpan>,
    events: Vec<CapturedEvent>,
}

/// Shared store of captured spans and events
#[derive(Debug, Clone, Default)]
pub struct TraceStore(Arc<Mutex<Captured>>);

impl TraceStore {
    pub fn has_span(&self, name: &str) -> bool {
        self.0.lock().unwrap().spans.iter().any(|s| s.name == name)
    }

    pub fn find_spans(&self, name: &str) -> Vec<CapturedSpan> {
        self.0
            .lock()
            .unwrap()
            .spans
            .iter()
            .filter(|s| s.name == name)
            .cloned()
            .collect()
    }

    pub fn span_names(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().spans.iter().map(|s| s.name).collect()
    }

    pub fn events_at(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.0
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

/// Layer feeding a [`TraceStore`]
pub struct CaptureLayer {
    store: TraceStore,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        ctx: Context<'_, S>,
    ) {
        let mut fields = FieldVisitor::default();
        attrs.record(&mut fields);

        let parent_name = attrs
            .parent()
            .and_then(|pid| ctx.span(pid))
            .map(|span| span.name().to_string())
            .or_else(|| ctx.lookup_current().map(|span| span.name().to_string()));

        let meta = attrs.metadata();
        self.store.0.lock().unwrap().spans.push(CapturedSpan {
            name: meta.name(),
            level: *meta.level(),
            fields: fields.0,
            parent_name,
        });
    }

    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let mut fields = FieldVisitor::default();
        event.record(&mut fields);
        let span_name = ctx
            .event_span(event)
            .map(|span| span.name().to_string());
        self.store.0.lock().unwrap().events.push(CapturedEvent {
            level: *event.metadata().level(),
            fields: fields.0,
            span_name,
        });
    }
}

#[derive(Default)]
struct FieldVisitor(HashMap<String, String>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.0.insert(field.name().to_string(), value.to_string());
    }
}

/// Install a capturing subscriber for the current thread
///
/// Keep the guard alive for the duration of the test.
pub fn init_test_tracing() -> (TraceStore, tracing::subscriber::DefaultGuard) {
    let store = TraceStore::default();
    let layer = CaptureLayer {
        store: store.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    let guard = tracing::subscriber::set_default(subscriber);
    (store, guard)
}
