use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::TelemetryError;

/// Compose and globally register a tracing subscriber feeding the providers.
///
/// Layers added:
/// - [`EnvFilter`] from `RUST_LOG` (defaults to `info`)
/// - `fmt` to stdout
/// - `OpenTelemetryLayer` turning `tracing` spans into spans of `tracer_name`
/// - `OpenTelemetryTracingBridge` turning events into log records (if a logger provider is given)
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub(crate) fn compose_subscriber(
    tracer_provider: &SdkTracerProvider,
    logger_provider: Option<&SdkLoggerProvider>,
    tracer_name: &str,
) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let otel_trace_layer =
        tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(tracer_name.to_owned()));

    let otel_log_layer =
        logger_provider.map(opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge::new);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_trace_layer)
        .with(otel_log_layer);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::Subscriber(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_registration_is_reported() {
        let provider = SdkTracerProvider::builder().build();

        // Whichever test registers first wins; the second call must fail.
        let _ = compose_subscriber(&provider, None, "svc");
        let err = compose_subscriber(&provider, None, "svc").unwrap_err();

        assert!(matches!(err, TelemetryError::Subscriber(_)));
    }
}
