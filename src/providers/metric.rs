use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource;

use crate::config::LocalSink;
use crate::error::{Signal, TelemetryError};
use crate::options::{ExporterOptions, MetricOptions};
use crate::providers::ExporterTarget;

/// Build a [`SdkMeterProvider`] with a periodic reader for `target`.
///
/// # Errors
///
/// Returns an error if the OTLP exporter fails to initialize.
pub(crate) fn build_meter_provider(
    target: &ExporterTarget,
    resource: Resource,
    options: &MetricOptions,
) -> Result<SdkMeterProvider, TelemetryError> {
    let interval = options.effective_interval();
    let builder = SdkMeterProvider::builder().with_resource(resource);

    let provider = match target {
        ExporterTarget::Remote {
            endpoint,
            options: exporter_options,
        } => {
            let exporter = build_metric_exporter(endpoint, exporter_options)?;
            let reader = PeriodicReader::builder(exporter)
                .with_interval(interval)
                .build();
            builder.with_reader(reader).build()
        }
        ExporterTarget::Local(LocalSink::Stdout) => {
            let reader = PeriodicReader::builder(opentelemetry_stdout::MetricExporter::default())
                .with_interval(interval)
                .build();
            builder.with_reader(reader).build()
        }
        ExporterTarget::Local(LocalSink::Noop) => builder.build(),
    };

    Ok(provider)
}

fn build_metric_exporter(
    endpoint: &str,
    options: &ExporterOptions,
) -> Result<opentelemetry_otlp::MetricExporter, TelemetryError> {
    otlp_exporter!(
        opentelemetry_otlp::MetricExporter,
        Signal::Metrics,
        "/v1/metrics",
        endpoint,
        options,
    )
}

#[cfg(test)]
mod tests {
    use opentelemetry::metrics::MeterProvider as _;

    use super::*;

    #[test]
    fn noop_provider_hands_out_working_instruments() {
        let provider = build_meter_provider(
            &ExporterTarget::Local(LocalSink::Noop),
            Resource::builder_empty().build(),
            &MetricOptions::default(),
        )
        .unwrap();

        let counter = provider.meter("test").u64_counter("requests").build();
        counter.add(1, &[]);
    }

    #[tokio::test]
    async fn remote_provider_builds_without_a_live_collector() {
        let target = ExporterTarget::Remote {
            endpoint: "http://localhost:4317".into(),
            options: ExporterOptions::base(),
        };

        let provider = build_meter_provider(
            &target,
            Resource::builder_empty().build(),
            &MetricOptions::default(),
        );

        assert!(provider.is_ok());
    }
}
