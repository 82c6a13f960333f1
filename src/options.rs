use std::collections::HashMap;
use std::time::Duration;

use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::Sampler;

/// Default interval between periodic metric exports.
pub const DEFAULT_METRIC_INTERVAL: Duration = Duration::from_secs(5);

/// Export interval used by earlier releases; set it explicitly through
/// [`MetricOptions::interval`] to keep the old cadence.
pub const LEGACY_METRIC_INTERVAL: Duration = Duration::from_secs(2);

pub(crate) const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// OTLP transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// gRPC transport (default, port 4317).
    Grpc,
    /// HTTP with Protobuf encoding (port 4318).
    HttpProtobuf,
    /// HTTP with JSON encoding (port 4318).
    HttpJson,
}

/// Exporter settings for a single signal.
///
/// Every field is optional. The facade starts from its own base set
/// (gRPC, insecure, 10s timeout) and applies these on top with
/// [`ExporterOptions::merged_over`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExporterOptions {
    pub protocol: Option<Protocol>,
    /// `Some(false)` switches the collector endpoint to `https://`.
    pub insecure: Option<bool>,
    pub timeout: Option<Duration>,
    pub headers: HashMap<String, String>,
}

impl ExporterOptions {
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = Some(insecure);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Add headers to include in OTLP export requests (e.g. authorization tokens).
    pub fn headers(
        mut self,
        headers: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Apply `self` on top of `base`. Values set in `self` win, headers are
    /// merged key by key with `self` taking precedence.
    pub fn merged_over(&self, base: &ExporterOptions) -> ExporterOptions {
        let mut headers = base.headers.clone();
        headers.extend(self.headers.clone());

        ExporterOptions {
            protocol: self.protocol.or(base.protocol),
            insecure: self.insecure.or(base.insecure),
            timeout: self.timeout.or(base.timeout),
            headers,
        }
    }

    pub(crate) fn base() -> ExporterOptions {
        ExporterOptions {
            protocol: Some(Protocol::Grpc),
            insecure: Some(true),
            timeout: Some(DEFAULT_EXPORT_TIMEOUT),
            headers: HashMap::new(),
        }
    }
}

/// Batch processor tuning shared by the trace and log pipelines.
///
/// Unset fields keep the SDK defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub max_queue_size: Option<usize>,
    pub max_export_batch_size: Option<usize>,
    pub scheduled_delay: Option<Duration>,
}

/// Instrumentation scope details for the tracer, meter, or logger handed out
/// by the facade. The scope name is always the service name.
#[derive(Debug, Clone, Default)]
pub struct ScopeOptions {
    pub version: Option<String>,
    pub schema_url: Option<String>,
    pub attributes: Vec<KeyValue>,
}

#[derive(Debug, Clone, Default)]
pub struct TracerOptions {
    pub exporter: ExporterOptions,
    pub batch: BatchOptions,
    /// Overrides the default `AlwaysOn` sampler.
    pub sampler: Option<Sampler>,
    pub scope: ScopeOptions,
}

#[derive(Debug, Clone, Default)]
pub struct MetricOptions {
    pub exporter: ExporterOptions,
    /// Periodic reader interval, [`DEFAULT_METRIC_INTERVAL`] when unset.
    pub interval: Option<Duration>,
    pub scope: ScopeOptions,
}

impl MetricOptions {
    pub(crate) fn effective_interval(&self) -> Duration {
        match self.interval {
            Some(interval) if !interval.is_zero() => interval,
            _ => DEFAULT_METRIC_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    pub exporter: ExporterOptions,
    pub batch: BatchOptions,
    pub scope: ScopeOptions,
}
