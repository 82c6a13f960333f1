use opentelemetry_sdk::logs::{BatchConfigBuilder, BatchLogProcessor, SdkLoggerProvider};
use opentelemetry_sdk::Resource;

use crate::config::LocalSink;
use crate::error::{Signal, TelemetryError};
use crate::options::{ExporterOptions, LoggerOptions};
use crate::providers::ExporterTarget;

/// Build a [`SdkLoggerProvider`] for `target`.
///
/// # Errors
///
/// Returns an error if the OTLP exporter fails to initialize.
pub(crate) fn build_logger_provider(
    target: &ExporterTarget,
    resource: Resource,
    options: &LoggerOptions,
) -> Result<SdkLoggerProvider, TelemetryError> {
    let builder = SdkLoggerProvider::builder().with_resource(resource);

    let provider = match target {
        ExporterTarget::Remote {
            endpoint,
            options: exporter_options,
        } => {
            let exporter = build_log_exporter(endpoint, exporter_options)?;
            let processor = BatchLogProcessor::builder(exporter)
                .with_batch_config(batch_config!(BatchConfigBuilder, &options.batch))
                .build();
            builder.with_log_processor(processor).build()
        }
        ExporterTarget::Local(LocalSink::Stdout) => builder
            .with_simple_exporter(opentelemetry_stdout::LogExporter::default())
            .build(),
        ExporterTarget::Local(LocalSink::Noop) => builder.build(),
    };

    Ok(provider)
}

fn build_log_exporter(
    endpoint: &str,
    options: &ExporterOptions,
) -> Result<opentelemetry_otlp::LogExporter, TelemetryError> {
    otlp_exporter!(
        opentelemetry_otlp::LogExporter,
        Signal::Logs,
        "/v1/logs",
        endpoint,
        options,
    )
}
