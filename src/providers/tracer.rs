use opentelemetry_sdk::trace::{BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;

use crate::config::LocalSink;
use crate::error::{Signal, TelemetryError};
use crate::options::{ExporterOptions, TracerOptions};
use crate::providers::ExporterTarget;

/// Build a [`SdkTracerProvider`] for `target`.
///
/// Sampling is `AlwaysOn` unless the caller supplies a sampler.
///
/// # Errors
///
/// Returns an error if the OTLP exporter fails to initialize.
pub(crate) fn build_tracer_provider(
    target: &ExporterTarget,
    resource: Resource,
    options: &TracerOptions,
) -> Result<SdkTracerProvider, TelemetryError> {
    let builder = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(options.sampler.clone().unwrap_or(Sampler::AlwaysOn));

    let provider = match target {
        ExporterTarget::Remote {
            endpoint,
            options: exporter_options,
        } => {
            let exporter = build_span_exporter(endpoint, exporter_options)?;
            let processor = BatchSpanProcessor::builder(exporter)
                .with_batch_config(batch_config!(BatchConfigBuilder, &options.batch))
                .build();
            builder.with_span_processor(processor).build()
        }
        ExporterTarget::Local(LocalSink::Stdout) => builder
            .with_simple_exporter(opentelemetry_stdout::SpanExporter::default())
            .build(),
        ExporterTarget::Local(LocalSink::Noop) => builder.build(),
    };

    Ok(provider)
}

fn build_span_exporter(
    endpoint: &str,
    options: &ExporterOptions,
) -> Result<opentelemetry_otlp::SpanExporter, TelemetryError> {
    otlp_exporter!(
        opentelemetry_otlp::SpanExporter,
        Signal::Traces,
        "/v1/traces",
        endpoint,
        options,
    )
}
