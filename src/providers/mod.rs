/// Batch processor config from [`BatchOptions`](crate::options::BatchOptions).
/// Trace and log builders are distinct types with the same methods.
macro_rules! batch_config {
    ($builder:ty, $batch:expr) => {{
        let batch: &$crate::options::BatchOptions = $batch;
        let mut config = <$builder>::default();
        if let Some(size) = batch.max_queue_size {
            config = config.with_max_queue_size(size);
        }
        if let Some(size) = batch.max_export_batch_size {
            config = config.with_max_export_batch_size(size);
        }
        if let Some(delay) = batch.scheduled_delay {
            config = config.with_scheduled_delay(delay);
        }
        config.build()
    }};
}

/// Build the OTLP exporter `$exporter` for one signal.
///
/// Expands inside a function returning `Result<_, TelemetryError>`.
macro_rules! otlp_exporter {
    ($exporter:ty, $signal:expr, $path:literal, $endpoint:expr, $options:expr $(,)?) => {{
        let signal: $crate::error::Signal = $signal;
        let endpoint: &str = $endpoint;
        let options: &$crate::options::ExporterOptions = $options;
        #[allow(unused_variables)]
        let exporter_error = move |source: opentelemetry_otlp::ExporterBuildError| {
            $crate::error::TelemetryError::Exporter { signal, source }
        };

        match $crate::providers::check_transport(signal, options)? {
            #[cfg(feature = "grpc")]
            $crate::options::Protocol::Grpc => {
                use opentelemetry_otlp::{WithExportConfig as _, WithTonicConfig as _};

                let builder = <$exporter>::builder()
                    .with_tonic()
                    .with_endpoint(endpoint)
                    .with_timeout($crate::providers::timeout(options))
                    .with_metadata($crate::providers::grpc_metadata(options));
                #[cfg(any(feature = "tls", feature = "tls-webpki"))]
                let builder = match $crate::providers::grpc_tls(options) {
                    Some(tls) => builder.with_tls_config(tls),
                    None => builder,
                };
                builder.build().map_err(exporter_error)
            }
            #[cfg(feature = "http")]
            protocol @ ($crate::options::Protocol::HttpProtobuf
            | $crate::options::Protocol::HttpJson) => {
                use opentelemetry_otlp::{WithExportConfig as _, WithHttpConfig as _};

                <$exporter>::builder()
                    .with_http()
                    .with_endpoint($crate::providers::signal_url(endpoint, $path))
                    .with_timeout($crate::providers::timeout(options))
                    .with_protocol($crate::providers::otlp_protocol(protocol))
                    .with_headers(options.headers.clone())
                    .build()
                    .map_err(exporter_error)
            }
            #[allow(unreachable_patterns)]
            protocol => Err($crate::providers::unavailable(signal, protocol)),
        }
    }};
}

pub(crate) mod logger;
pub(crate) mod metric;
pub(crate) mod tracer;

use crate::config::{Config, DisabledSignalPolicy, LocalSink};
use crate::error::{Signal, TelemetryError};
use crate::options::{ExporterOptions, Protocol, DEFAULT_EXPORT_TIMEOUT};

/// Backend a signal's provider exports to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ExporterTarget {
    /// OTLP exporter talking to the collector.
    Remote {
        /// `scheme://host:port`, without a signal path.
        endpoint: String,
        options: ExporterOptions,
    },
    Local(LocalSink),
}

/// Pick the backend for one signal.
///
/// `caller` is merged over the facade's base options. Returns `None` when a
/// disabled signal should not get a provider at all.
pub(crate) fn select_target(
    enabled: bool,
    always_build: bool,
    config: &Config,
    caller: &ExporterOptions,
) -> Option<ExporterTarget> {
    if enabled {
        let options = caller.merged_over(&ExporterOptions::base());
        let scheme = if options.insecure.unwrap_or(true) {
            "http"
        } else {
            "https"
        };
        return Some(ExporterTarget::Remote {
            endpoint: format!("{scheme}://{}", config.collector.address()),
            options,
        });
    }

    match config.disabled_signal_policy {
        DisabledSignalPolicy::Nil if !always_build => None,
        _ => Some(ExporterTarget::Local(config.fallback_sink)),
    }
}

pub(crate) fn protocol(options: &ExporterOptions) -> Protocol {
    options.protocol.unwrap_or(Protocol::Grpc)
}

pub(crate) fn timeout(options: &ExporterOptions) -> std::time::Duration {
    options.timeout.unwrap_or(DEFAULT_EXPORT_TIMEOUT)
}

/// Everything about the transport that can be known before building the
/// exporter: compiled-in features, TLS support, and for gRPC a running
/// tokio runtime.
pub(crate) fn check_transport(
    signal: Signal,
    options: &ExporterOptions,
) -> Result<Protocol, TelemetryError> {
    let protocol = protocol(options);

    if options.insecure == Some(false) && !cfg!(any(feature = "tls", feature = "tls-webpki")) {
        return Err(TelemetryError::TransportUnavailable {
            signal,
            protocol,
            feature: "tls",
        });
    }

    match protocol {
        Protocol::Grpc if !cfg!(feature = "grpc") => Err(unavailable(signal, protocol)),
        Protocol::Grpc => ensure_runtime(signal).map(|()| protocol),
        Protocol::HttpProtobuf | Protocol::HttpJson if !cfg!(feature = "http") => {
            Err(unavailable(signal, protocol))
        }
        Protocol::HttpProtobuf | Protocol::HttpJson => Ok(protocol),
    }
}

pub(crate) fn unavailable(signal: Signal, protocol: Protocol) -> TelemetryError {
    let feature = match protocol {
        Protocol::Grpc => "grpc",
        Protocol::HttpProtobuf | Protocol::HttpJson => "http",
    };
    TelemetryError::TransportUnavailable {
        signal,
        protocol,
        feature,
    }
}

// tonic spawns its connection task on the ambient runtime while the exporter
// is built and panics without one.
#[cfg(feature = "grpc")]
fn ensure_runtime(signal: Signal) -> Result<(), TelemetryError> {
    tokio::runtime::Handle::try_current()
        .map(|_| ())
        .map_err(|_| TelemetryError::RuntimeUnavailable { signal })
}

#[cfg(not(feature = "grpc"))]
fn ensure_runtime(_signal: Signal) -> Result<(), TelemetryError> {
    Ok(())
}

/// Caller headers as gRPC metadata. Invalid names or values are skipped.
#[cfg(feature = "grpc")]
pub(crate) fn grpc_metadata(
    options: &ExporterOptions,
) -> opentelemetry_otlp::tonic_types::metadata::MetadataMap {
    use opentelemetry::propagation::Injector as _;

    let mut headers = http::HeaderMap::new();
    let mut injector = crate::propagation::HeaderInjector(&mut headers);
    for (key, value) in &options.headers {
        injector.set(key, value.clone());
    }
    opentelemetry_otlp::tonic_types::metadata::MetadataMap::from_headers(headers)
}

#[cfg(all(feature = "grpc", any(feature = "tls", feature = "tls-webpki")))]
pub(crate) fn grpc_tls(
    options: &ExporterOptions,
) -> Option<opentelemetry_otlp::tonic_types::transport::ClientTlsConfig> {
    (options.insecure == Some(false)).then(|| {
        opentelemetry_otlp::tonic_types::transport::ClientTlsConfig::new().with_enabled_roots()
    })
}

#[cfg(feature = "http")]
pub(crate) fn otlp_protocol(protocol: Protocol) -> opentelemetry_otlp::Protocol {
    match protocol {
        Protocol::HttpJson => opentelemetry_otlp::Protocol::HttpJson,
        Protocol::Grpc | Protocol::HttpProtobuf => opentelemetry_otlp::Protocol::HttpBinary,
    }
}

/// Full HTTP URL for a signal, e.g. `http://host:4318/v1/traces`.
pub(crate) fn signal_url(endpoint: &str, path: &str) -> String {
    format!("{}{path}", endpoint.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(policy: DisabledSignalPolicy) -> Config {
        Config::builder()
            .service_name("svc")
            .collector("localhost", "4317")
            .disabled_signal_policy(policy)
            .fallback_sink(LocalSink::Noop)
            .build()
    }

    #[test]
    fn enabled_signal_targets_the_collector() {
        let target = select_target(
            true,
            false,
            &config(DisabledSignalPolicy::Nil),
            &ExporterOptions::default(),
        );

        match target {
            Some(ExporterTarget::Remote { endpoint, options }) => {
                assert_eq!(endpoint, "http://localhost:4317");
                assert_eq!(options.protocol, Some(Protocol::Grpc));
                assert_eq!(options.insecure, Some(true));
            }
            other => panic!("expected remote target, got {other:?}"),
        }
    }

    #[test]
    fn secure_transport_switches_scheme() {
        let target = select_target(
            true,
            false,
            &config(DisabledSignalPolicy::LocalFallback),
            &ExporterOptions::default().insecure(false),
        );

        assert!(matches!(
            target,
            Some(ExporterTarget::Remote { ref endpoint, .. }) if endpoint == "https://localhost:4317"
        ));
    }

    #[test]
    fn disabled_signal_follows_policy() {
        let fallback = select_target(
            false,
            false,
            &config(DisabledSignalPolicy::LocalFallback),
            &ExporterOptions::default(),
        );
        assert_eq!(fallback, Some(ExporterTarget::Local(LocalSink::Noop)));

        let nil = select_target(
            false,
            false,
            &config(DisabledSignalPolicy::Nil),
            &ExporterOptions::default(),
        );
        assert_eq!(nil, None);
    }

    #[test]
    fn always_built_signal_ignores_nil_policy() {
        let target = select_target(
            false,
            true,
            &config(DisabledSignalPolicy::Nil),
            &ExporterOptions::default(),
        );
        assert_eq!(target, Some(ExporterTarget::Local(LocalSink::Noop)));
    }

    #[test]
    fn signal_url_appends_path_once() {
        assert_eq!(
            signal_url("http://collector:4318/", "/v1/logs"),
            "http://collector:4318/v1/logs"
        );
    }

    #[test]
    #[cfg(not(any(feature = "tls", feature = "tls-webpki")))]
    fn secure_transport_without_tls_feature_is_rejected() {
        let options = ExporterOptions::base().insecure(false);

        let err = check_transport(Signal::Logs, &options).unwrap_err();

        assert!(matches!(
            err,
            TelemetryError::TransportUnavailable {
                signal: Signal::Logs,
                feature: "tls",
                ..
            }
        ));
    }

    #[test]
    #[cfg(feature = "grpc")]
    fn grpc_outside_a_runtime_is_an_error() {
        let err = check_transport(Signal::Traces, &ExporterOptions::base()).unwrap_err();

        assert!(matches!(
            err,
            TelemetryError::RuntimeUnavailable {
                signal: Signal::Traces
            }
        ));
    }

    #[tokio::test]
    #[cfg(feature = "grpc")]
    async fn grpc_inside_a_runtime_is_accepted() {
        let protocol = check_transport(Signal::Traces, &ExporterOptions::base()).unwrap();
        assert_eq!(protocol, Protocol::Grpc);
    }

    #[test]
    #[cfg(feature = "http")]
    fn http_needs_no_runtime() {
        let options = ExporterOptions::base().protocol(Protocol::HttpJson);
        assert_eq!(
            check_transport(Signal::Metrics, &options).unwrap(),
            Protocol::HttpJson
        );
    }

    #[test]
    #[cfg(feature = "grpc")]
    fn headers_become_grpc_metadata() {
        let options = ExporterOptions::default()
            .headers([("Authorization", "Bearer token123"), ("bad key", "x")]);

        let metadata = grpc_metadata(&options);

        assert_eq!(metadata.len(), 1);
        assert_eq!(
            metadata.get("authorization").and_then(|v| v.to_str().ok()),
            Some("Bearer token123")
        );
    }
}
