//! The crates behind the facade, for types it does not wrap.
//!
//! Using these keeps your `opentelemetry` versions in lockstep with ours
//! without adding them to your own `Cargo.toml`.

/// Re-export of the `opentelemetry` API crate (span builders, statuses, metric instruments).
pub use opentelemetry;

/// Re-export of the `opentelemetry_sdk` crate (samplers, providers, resources).
pub use opentelemetry_sdk;

/// Re-export of the `tracing` crate, which [`Telemetry::install_subscriber`](crate::Telemetry::install_subscriber) feeds.
pub use tracing;

/// Re-export of the `http` crate for [`HeaderMap`](http::HeaderMap) carriers.
pub use http;
