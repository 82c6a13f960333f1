use std::fmt;

use opentelemetry_sdk::error::OTelSdkError;

use crate::options::Protocol;

/// The telemetry signal a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Traces,
    Metrics,
    Logs,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Signal::Traces => "traces",
            Signal::Metrics => "metrics",
            Signal::Logs => "logs",
        };
        f.write_str(name)
    }
}

/// Errors returned while building or tearing down a [`Telemetry`](crate::Telemetry).
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid telemetry configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build resource: {0}")]
    Resource(String),

    #[error(
        "{signal}: {protocol:?} transport requested but the `{feature}` feature is not enabled"
    )]
    TransportUnavailable {
        signal: Signal,
        protocol: Protocol,
        feature: &'static str,
    },

    #[error("{signal}: gRPC transport needs a running tokio runtime")]
    RuntimeUnavailable { signal: Signal },

    #[error("{signal}: failed to build OTLP exporter")]
    Exporter {
        signal: Signal,
        #[source]
        source: opentelemetry_otlp::ExporterBuildError,
    },

    #[error("failed to set global subscriber: {0}")]
    Subscriber(String),

    #[error("shutdown failed for {}", ShutdownFailure::join(.0))]
    Shutdown(Vec<ShutdownFailure>),
}

/// A single provider that failed to shut down cleanly.
#[derive(Debug)]
pub struct ShutdownFailure {
    pub signal: Signal,
    pub error: OTelSdkError,
}

impl ShutdownFailure {
    fn join(failures: &[ShutdownFailure]) -> String {
        failures
            .iter()
            .map(|f| format!("{} ({})", f.signal, f.error))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl TelemetryError {
    /// Per-provider failures when this is a shutdown error, empty otherwise.
    pub fn shutdown_failures(&self) -> &[ShutdownFailure] {
        match self {
            TelemetryError::Shutdown(failures) => failures,
            _ => &[],
        }
    }
}
