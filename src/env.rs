use std::collections::HashMap;
use std::time::Duration;

use crate::config::{Collector, Config, ConfigBuilder, Service};
use crate::options::{ExporterOptions, Protocol};

impl Config {
    /// Start a builder preloaded from the environment.
    ///
    /// Reads `OTEL_SERVICE_NAME`, `OTEL_SERVICE_NAMESPACE`, `OTEL_SERVICE_VERSION`,
    /// `OTEL_COLLECTOR_HOST`, `OTEL_COLLECTOR_PORT_GRPC` and the exporter
    /// variables `OTEL_EXPORTER_OTLP_{PROTOCOL,HEADERS,TIMEOUT}`. The exporter
    /// variables become the base for every signal; anything set on the
    /// returned builder afterwards takes precedence.
    pub fn from_env() -> ConfigBuilder {
        let exporter = exporter_options_from_env();

        let mut config = Config {
            service: service_from_env(),
            collector: collector_from_env(),
            ..Config::default()
        };
        config.tracer_options.exporter = exporter.clone();
        config.metric_options.exporter = exporter.clone();
        config.logger_options.exporter = exporter;

        ConfigBuilder::from_config(config)
    }
}

fn service_from_env() -> Service {
    Service {
        name: env_var_non_empty("OTEL_SERVICE_NAME").unwrap_or_default(),
        namespace: env_var_non_empty("OTEL_SERVICE_NAMESPACE").unwrap_or_default(),
        version: env_var_non_empty("OTEL_SERVICE_VERSION").unwrap_or_default(),
    }
}

fn collector_from_env() -> Collector {
    Collector {
        host: env_var_non_empty("OTEL_COLLECTOR_HOST").unwrap_or_default(),
        port: env_var_non_empty("OTEL_COLLECTOR_PORT_GRPC").unwrap_or_default(),
    }
}

fn exporter_options_from_env() -> ExporterOptions {
    ExporterOptions {
        protocol: parse_protocol_env(),
        insecure: None,
        timeout: parse_timeout_env(),
        headers: parse_headers_env(),
    }
}

fn env_var_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.is_empty())
}

fn parse_protocol_env() -> Option<Protocol> {
    env_var_non_empty("OTEL_EXPORTER_OTLP_PROTOCOL").and_then(|v| match v.as_str() {
        "grpc" => Some(Protocol::Grpc),
        "http/protobuf" => Some(Protocol::HttpProtobuf),
        "http/json" => Some(Protocol::HttpJson),
        _ => None,
    })
}

fn parse_headers_env() -> HashMap<String, String> {
    env_var_non_empty("OTEL_EXPORTER_OTLP_HEADERS")
        .map(|val| {
            val.split(',')
                .filter_map(|pair| {
                    let (key, value) = pair.split_once('=')?;
                    let key = key.trim();
                    let value = value.trim();
                    if key.is_empty() {
                        return None;
                    }
                    Some((key.to_owned(), value.to_owned()))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_timeout_env() -> Option<Duration> {
    env_var_non_empty("OTEL_EXPORTER_OTLP_TIMEOUT")
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}
