use crate::error::TelemetryError;
use crate::options::{LoggerOptions, MetricOptions, TracerOptions};
use crate::resource::ResourceOption;

/// Identity of the instrumented service, copied onto the shared resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Service {
    pub name: String,
    pub namespace: String,
    pub version: String,
}

/// Address of the OpenTelemetry collector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collector {
    pub host: String,
    pub port: String,
}

impl Collector {
    pub fn new(host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
        }
    }

    /// `host:port`, without a scheme.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// What a disabled metric or log signal turns into.
///
/// Traces are always built; this only applies to metrics and logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisabledSignalPolicy {
    /// No provider; [`Telemetry::metric`](crate::Telemetry::metric) and
    /// [`Telemetry::log`](crate::Telemetry::log) return `None`.
    Nil,
    /// Build a provider backed by [`Config::fallback_sink`].
    #[default]
    LocalFallback,
}

/// Where a disabled signal's data goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalSink {
    /// Pretty-printed to stdout.
    #[default]
    Stdout,
    /// Dropped; the provider has no exporter attached.
    Noop,
}

/// Telemetry configuration.
///
/// Use [`Config::builder()`] (or [`Config::from_env()`]) to construct an instance.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub service: Service,
    pub collector: Collector,
    pub with_traces: bool,
    pub with_metrics: bool,
    pub with_logs: bool,
    pub resource_options: Vec<ResourceOption>,
    pub tracer_options: TracerOptions,
    pub logger_options: LoggerOptions,
    pub metric_options: MetricOptions,
    pub disabled_signal_policy: DisabledSignalPolicy,
    pub fallback_sink: LocalSink,
}

impl Config {
    /// Create a new builder for `Config`.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub(crate) fn any_remote_signal(&self) -> bool {
        self.with_traces || self.with_metrics || self.with_logs
    }

    pub(crate) fn validate(&self) -> Result<(), TelemetryError> {
        if self.service.name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "service name must not be empty".into(),
            ));
        }

        if !self.any_remote_signal() {
            return Ok(());
        }

        if self.collector.host.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "collector host is required when a signal is exported".into(),
            ));
        }
        if self.collector.port.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig(
                "collector port is required when a signal is exported".into(),
            ));
        }
        match self.collector.port.parse::<u16>() {
            Ok(port) if port != 0 => Ok(()),
            _ => Err(TelemetryError::InvalidConfig(format!(
                "collector port `{}` is not a valid port number",
                self.collector.port
            ))),
        }
    }
}

/// Builder for [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub(crate) fn from_config(config: Config) -> Self {
        Self { config }
    }

    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service.name = name.into();
        self
    }

    pub fn service_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.service.namespace = namespace.into();
        self
    }

    pub fn service_version(mut self, version: impl Into<String>) -> Self {
        self.config.service.version = version.into();
        self
    }

    pub fn service(mut self, service: Service) -> Self {
        self.config.service = service;
        self
    }

    /// Set the collector address (e.g. `("localhost", "4317")`).
    pub fn collector(mut self, host: impl Into<String>, port: impl Into<String>) -> Self {
        self.config.collector = Collector::new(host, port);
        self
    }

    pub fn with_traces(mut self, enabled: bool) -> Self {
        self.config.with_traces = enabled;
        self
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.config.with_metrics = enabled;
        self
    }

    pub fn with_logs(mut self, enabled: bool) -> Self {
        self.config.with_logs = enabled;
        self
    }

    /// Append a resource option. Options are applied after the mandatory
    /// service attributes, in the order they were added.
    pub fn resource_option(mut self, option: ResourceOption) -> Self {
        self.config.resource_options.push(option);
        self
    }

    pub fn tracer_options(mut self, options: TracerOptions) -> Self {
        self.config.tracer_options = options;
        self
    }

    pub fn logger_options(mut self, options: LoggerOptions) -> Self {
        self.config.logger_options = options;
        self
    }

    pub fn metric_options(mut self, options: MetricOptions) -> Self {
        self.config.metric_options = options;
        self
    }

    pub fn disabled_signal_policy(mut self, policy: DisabledSignalPolicy) -> Self {
        self.config.disabled_signal_policy = policy;
        self
    }

    pub fn fallback_sink(mut self, sink: LocalSink) -> Self {
        self.config.fallback_sink = sink;
        self
    }

    /// Build the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}
