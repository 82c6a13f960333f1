//! Cross-process context transfer.
//!
//! The propagator is the ordered composite of W3C trace-context and W3C
//! baggage. The free functions here always use that composite, whether or
//! not it has been installed process-wide; [`install_propagator`] is only
//! needed for third-party code reading the global propagator.
//! None of them fail: a carrier without usable headers yields a context with
//! no remote span and no baggage, so downstream spans become new roots.

use std::collections::HashMap;
use std::sync::OnceLock;

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use opentelemetry::propagation::{
    Extractor, Injector, TextMapCompositePropagator, TextMapPropagator,
};
use opentelemetry::Context;
use opentelemetry_sdk::propagation::{BaggagePropagator, TraceContextPropagator};

/// Trace-context followed by baggage.
pub fn composite_propagator() -> TextMapCompositePropagator {
    TextMapCompositePropagator::new(vec![
        Box::new(TraceContextPropagator::new()),
        Box::new(BaggagePropagator::new()),
    ])
}

fn shared_propagator() -> &'static TextMapCompositePropagator {
    static PROPAGATOR: OnceLock<TextMapCompositePropagator> = OnceLock::new();
    PROPAGATOR.get_or_init(composite_propagator)
}

/// Install [`composite_propagator`] as the process-wide propagator.
pub fn install_propagator() {
    opentelemetry::global::set_text_map_propagator(composite_propagator());
}

/// Write trace-context and baggage entries for `cx` into `carrier`.
pub fn inject(cx: &Context, carrier: &mut HashMap<String, String>) {
    inject_into(cx, carrier);
}

/// Read trace-context and baggage from `carrier` on top of `cx`.
pub fn extract(cx: &Context, carrier: &HashMap<String, String>) -> Context {
    extract_from(cx, carrier)
}

pub fn inject_http_headers(cx: &Context, headers: &mut HeaderMap) {
    inject_into(cx, &mut HeaderInjector(headers));
}

pub fn extract_http_headers(cx: &Context, headers: &HeaderMap) -> Context {
    extract_from(cx, &HeaderExtractor(headers))
}

/// Inject into any carrier, e.g. a message-queue header adapter.
pub fn inject_into(cx: &Context, carrier: &mut dyn Injector) {
    shared_propagator().inject_context(cx, carrier);
}

/// Extract from any carrier, e.g. a message-queue header adapter.
pub fn extract_from(cx: &Context, carrier: &dyn Extractor) -> Context {
    shared_propagator().extract_with_context(cx, carrier)
}

/// Adapter to inject into `http::HeaderMap` using OTel's Injector trait.
///
/// Entries that are not valid header names or values are skipped.
pub struct HeaderInjector<'a>(pub &'a mut HeaderMap);

impl Injector for HeaderInjector<'_> {
    fn set(&mut self, key: &str, value: String) {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(key.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            self.0.insert(name, value);
        }
    }
}

/// Adapter to extract from `http::HeaderMap` using OTel's Extractor trait.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}
