//! Baggage helpers. Every function returns a new [`Context`]; the input is
//! never modified.

use std::collections::HashMap;

use opentelemetry::baggage::{BaggageExt, KeyValueMetadata};
use opentelemetry::{Context, KeyValue};

/// All baggage members on `cx`.
pub fn get_baggage(cx: &Context) -> HashMap<String, String> {
    cx.baggage()
        .iter()
        .map(|(key, (value, _))| (key.to_string(), value.to_string()))
        .collect()
}

/// Add one member, replacing any existing value for `key`.
pub fn add_baggage_item(
    cx: &Context,
    key: impl Into<String>,
    value: impl Into<String>,
) -> Context {
    add_baggage_items(cx, [(key, value)])
}

/// Add several members on top of the existing baggage; last write wins.
pub fn add_baggage_items<K, V>(cx: &Context, items: impl IntoIterator<Item = (K, V)>) -> Context
where
    K: Into<String>,
    V: Into<String>,
{
    cx.with_baggage(
        items
            .into_iter()
            .map(|(key, value)| KeyValue::new(key.into(), value.into())),
    )
}

pub fn get_baggage_item(cx: &Context, key: &str) -> Option<String> {
    cx.baggage().get(key).map(|value| value.to_string())
}

/// Rebuild the baggage without `key`. Absent keys leave the members unchanged.
pub fn remove_baggage_item(cx: &Context, key: &str) -> Context {
    let remaining: Vec<KeyValueMetadata> = cx
        .baggage()
        .iter()
        .filter(|(member, _)| member.as_str() != key)
        .map(|(member, (value, metadata))| {
            KeyValueMetadata::new(member.clone(), value.to_string(), metadata.clone())
        })
        .collect();

    cx.with_cleared_baggage().with_baggage(remaining)
}
