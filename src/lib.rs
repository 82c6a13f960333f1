//! # otelemetry
//!
//! One handle for a service's OpenTelemetry traces, metrics and logs.
//!
//! [`Telemetry::new`] builds a resource describing the service, one provider
//! per signal (OTLP to a collector, or a local fallback for disabled signals),
//! and thin adapters for starting spans, emitting logs and creating metric
//! instruments. Nothing process-wide is touched unless you ask for it with
//! [`Telemetry::install_globals`] or [`Telemetry::install_subscriber`].
//!
//! The default gRPC transport must be built inside a tokio runtime.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use otelemetry::{log_attribute, Config, Context, Telemetry};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), otelemetry::TelemetryError> {
//! let telemetry = Telemetry::new(
//!     Config::builder()
//!         .service_name("checkout")
//!         .service_version("1.4.0")
//!         .collector("localhost", "4317")
//!         .with_traces(true)
//!         .with_logs(true)
//!         .build(),
//! )?;
//! telemetry.install_globals();
//!
//! let (cx, span) = telemetry.start_span(&Context::new(), "place-order");
//! if let Some(log) = telemetry.log() {
//!     log.info(&cx, "order placed", vec![log_attribute("items", 3)]);
//! }
//! span.end();
//!
//! telemetry.shutdown(Duration::from_secs(1))?;
//! # Ok(())
//! # }
//! ```

mod attribute;
mod baggage;
mod config;
mod env;
mod error;
mod guard;
mod log;
mod metric;
mod options;
mod propagation;
mod providers;
mod resource;
mod subscriber;
mod telemetry;
mod trace;

pub mod re_exports;

pub use attribute::{attribute, coerce, log_attribute, Coerced, LogField, Stringable};
pub use baggage::{
    add_baggage_item, add_baggage_items, get_baggage, get_baggage_item, remove_baggage_item,
};
pub use config::{
    Collector, Config, ConfigBuilder, DisabledSignalPolicy, LocalSink, Service,
};
pub use error::{ShutdownFailure, Signal, TelemetryError};
pub use guard::SHUTDOWN_BUDGET;
pub use log::{Log, DEBUG, ERROR, FATAL, INFO, WARN};
pub use metric::Metric;
pub use options::{
    BatchOptions, ExporterOptions, LoggerOptions, MetricOptions, Protocol, ScopeOptions,
    TracerOptions, DEFAULT_METRIC_INTERVAL, LEGACY_METRIC_INTERVAL,
};
pub use propagation::{
    composite_propagator, extract, extract_from, extract_http_headers, inject, inject_http_headers,
    inject_into, install_propagator, HeaderExtractor, HeaderInjector,
};
pub use resource::ResourceOption;
pub use telemetry::Telemetry;
pub use trace::{Span, Trace};

pub use opentelemetry::{Context, KeyValue};
