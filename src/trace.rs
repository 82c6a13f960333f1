use std::borrow::Cow;
use std::error::Error;
use std::time::SystemTime;

use opentelemetry::trace::{SpanBuilder, Status, TraceContextExt, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::SdkTracer;

/// Tracing half of the facade: starts spans with the service's tracer.
#[derive(Clone)]
pub struct Trace {
    tracer: SdkTracer,
}

impl Trace {
    pub(crate) fn new(tracer: SdkTracer) -> Self {
        Self { tracer }
    }

    /// The underlying SDK tracer, for APIs this wrapper does not cover.
    pub fn tracer(&self) -> &SdkTracer {
        &self.tracer
    }

    /// Start a span as a child of whatever span `cx` carries.
    ///
    /// Returns the context with the new span attached, and the span itself.
    pub fn start_span(
        &self,
        cx: &Context,
        name: impl Into<Cow<'static, str>>,
    ) -> (Context, Span) {
        let span = self.tracer.start_with_context(name, cx);
        Span::attach(cx, span)
    }

    /// Like [`start_span`](Self::start_span), with kind, attributes, links or
    /// start time taken from `builder`.
    pub fn start_span_with(&self, cx: &Context, builder: SpanBuilder) -> (Context, Span) {
        let span = self.tracer.build_with_context(builder, cx);
        Span::attach(cx, span)
    }

    pub fn span_from_context(&self, cx: &Context) -> Option<Span> {
        Span::from_context(cx)
    }
}

/// A span started through the facade, or found on a context.
///
/// Ending the span is terminal; later calls are ignored by the SDK.
#[derive(Clone, Debug)]
pub struct Span {
    cx: Context,
}

impl Span {
    fn attach(parent: &Context, span: opentelemetry_sdk::trace::Span) -> (Context, Span) {
        let cx = parent.with_span(span);
        (cx.clone(), Span { cx })
    }

    /// The active span on `cx`, or `None` when there is none.
    pub fn from_context(cx: &Context) -> Option<Span> {
        cx.has_active_span().then(|| Span { cx: cx.clone() })
    }

    /// Context carrying this span, for propagation or child spans.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn add_event(&self, name: impl Into<Cow<'static, str>>, attributes: Vec<KeyValue>) {
        self.cx.span().add_event(name, attributes);
    }

    /// Mark the span as failed and add an event named `name` carrying
    /// `error.message`, `error.type` and `attributes`.
    pub fn add_error_event<E>(
        &self,
        name: impl Into<Cow<'static, str>>,
        err: &E,
        mut attributes: Vec<KeyValue>,
    ) where
        E: Error + ?Sized,
    {
        let message = err.to_string();
        let span = self.cx.span();
        span.set_status(Status::error(message.clone()));

        attributes.push(KeyValue::new("error.message", message));
        attributes.push(KeyValue::new("error.type", std::any::type_name::<E>()));
        span.add_event(name, attributes);
    }

    pub fn set_attributes(&self, attributes: impl IntoIterator<Item = KeyValue>) {
        let span = self.cx.span();
        for attribute in attributes {
            span.set_attribute(attribute);
        }
    }

    pub fn set_status(&self, status: Status) {
        self.cx.span().set_status(status);
    }

    /// Mark the span as failed and record `err` as an `exception` event,
    /// together with `attributes`.
    pub fn record_error<E>(&self, err: &E, mut attributes: Vec<KeyValue>)
    where
        E: Error + ?Sized,
    {
        let message = err.to_string();
        let span = self.cx.span();
        span.set_status(Status::error(message.clone()));

        attributes.push(KeyValue::new("exception.message", message));
        attributes.push(KeyValue::new("exception.type", std::any::type_name::<E>()));
        span.add_event("exception", attributes);
    }

    pub fn end(&self) {
        self.cx.span().end();
    }

    pub fn end_at(&self, timestamp: SystemTime) {
        self.cx.span().end_with_timestamp(timestamp);
    }

    pub fn is_recording(&self) -> bool {
        self.cx.span().is_recording()
    }

    /// 32 lowercase hex digits.
    pub fn trace_id(&self) -> String {
        self.cx.span().span_context().trace_id().to_string()
    }

    /// 16 lowercase hex digits.
    pub fn span_id(&self) -> String {
        self.cx.span().span_context().span_id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use opentelemetry::trace::{SpanKind, TracerProvider as _};
    use opentelemetry::Value;
    use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider};

    use super::*;
    use crate::attribute::attribute;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl Error for Boom {}

    fn setup() -> (SdkTracerProvider, InMemorySpanExporter, Trace) {
        let exporter = InMemorySpanExporter::default();
        let provider = SdkTracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let trace = Trace::new(provider.tracer("test"));
        (provider, exporter, trace)
    }

    fn event_attr(attributes: &[KeyValue], key: &str) -> Option<Value> {
        attributes
            .iter()
            .find(|kv| kv.key.as_str() == key)
            .map(|kv| kv.value.clone())
    }

    #[test]
    fn ids_are_hex_of_expected_width() {
        let (_provider, _exporter, trace) = setup();

        let (_, span) = trace.start_span(&Context::new(), "op");
        span.end();

        let trace_id = span.trace_id();
        let span_id = span.span_id();
        assert_eq!(trace_id.len(), 32);
        assert_eq!(span_id.len(), 16);
        assert!(trace_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(span_id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(trace_id, "0".repeat(32));
    }

    #[test]
    fn child_span_shares_trace_id() {
        let (_provider, _exporter, trace) = setup();

        let (cx, parent) = trace.start_span(&Context::new(), "parent");
        let (_, child) = trace.start_span(&cx, "child");

        assert_eq!(parent.trace_id(), child.trace_id());
        assert_ne!(parent.span_id(), child.span_id());
    }

    #[test]
    fn span_from_context_requires_an_active_span() {
        let (_provider, _exporter, trace) = setup();

        assert!(trace.span_from_context(&Context::new()).is_none());

        let (cx, span) = trace.start_span(&Context::new(), "op");
        let found = trace.span_from_context(&cx).unwrap();
        assert_eq!(found.span_id(), span.span_id());
    }

    #[test]
    fn events_and_attributes_are_recorded() {
        let (_provider, exporter, trace) = setup();

        let builder = SpanBuilder::from_name("handler").with_kind(SpanKind::Server);
        let (_, span) = trace.start_span_with(&Context::new(), builder);
        span.set_attributes([attribute("sleep", 12)]);
        span.add_event("slept", vec![attribute("ms", 12)]);
        span.end();

        let spans = exporter.get_finished_spans().unwrap();
        assert_eq!(spans.len(), 1);
        let data = &spans[0];
        assert_eq!(data.name, "handler");
        assert_eq!(data.span_kind, SpanKind::Server);
        assert_eq!(event_attr(&data.attributes, "sleep"), Some(Value::I64(12)));
        assert_eq!(data.events.events[0].name, "slept");
    }

    #[test]
    fn add_error_event_sets_status_and_error_fields() {
        let (_provider, exporter, trace) = setup();

        let (_, span) = trace.start_span(&Context::new(), "op");
        span.add_error_event("failed", &Boom, vec![attribute("retry", true)]);
        span.end();

        let spans = exporter.get_finished_spans().unwrap();
        let data = &spans[0];
        assert_eq!(data.status, Status::error("boom"));

        let event = &data.events.events[0];
        assert_eq!(event.name, "failed");
        assert_eq!(
            event_attr(&event.attributes, "error.message"),
            Some(Value::from("boom"))
        );
        assert!(event_attr(&event.attributes, "error.type")
            .map(|v| v.to_string().ends_with("Boom"))
            .unwrap_or(false));
        assert_eq!(event_attr(&event.attributes, "retry"), Some(Value::Bool(true)));
    }

    #[test]
    fn record_error_adds_exception_event() {
        let (_provider, exporter, trace) = setup();

        let (_, span) = trace.start_span(&Context::new(), "op");
        span.record_error(&Boom, vec![]);
        span.end();

        let spans = exporter.get_finished_spans().unwrap();
        let data = &spans[0];
        assert_eq!(data.status, Status::error("boom"));

        let event = &data.events.events[0];
        assert_eq!(event.name, "exception");
        assert_eq!(
            event_attr(&event.attributes, "exception.message"),
            Some(Value::from("boom"))
        );
    }

    #[test]
    fn ending_twice_exports_once() {
        let (_provider, exporter, trace) = setup();

        let (_, span) = trace.start_span(&Context::new(), "op");
        span.end();
        span.end();
        span.add_event("late", vec![]);

        assert_eq!(exporter.get_finished_spans().unwrap().len(), 1);
        assert!(!span.is_recording());
    }
}
