use std::borrow::Cow;
use std::collections::HashMap;
use std::time::Duration;

use opentelemetry::logs::LoggerProvider as _;
use opentelemetry::metrics::{Meter, MeterProvider as _};
use opentelemetry::propagation::{TextMapCompositePropagator, TextMapPropagator as _};
use opentelemetry::trace::{SpanBuilder, TracerProvider as _};
use opentelemetry::{global, Context, InstrumentationScope};
use opentelemetry_sdk::logs::SdkLogger;
use opentelemetry_sdk::trace::SdkTracer;
use opentelemetry_sdk::Resource;

use crate::config::Config;
use crate::error::{Signal, TelemetryError};
use crate::guard::ProviderGuard;
use crate::log::Log;
use crate::metric::Metric;
use crate::options::ScopeOptions;
use crate::providers::{self, ExporterTarget};
use crate::trace::{Span, Trace};
use crate::{propagation, resource, subscriber};

/// One service's traces, metrics and logs behind a single handle.
///
/// The trace handle always exists. The log and metric handles are absent only
/// when their signal is disabled under [`DisabledSignalPolicy::Nil`](crate::DisabledSignalPolicy::Nil).
/// Building a `Telemetry` touches no process-wide state; call
/// [`install_globals`](Self::install_globals) for that.
///
/// Dropping the value shuts the providers down.
pub struct Telemetry {
    service_name: String,
    resource: Resource,
    propagator: TextMapCompositePropagator,
    trace: Trace,
    metric: Option<Metric>,
    log: Option<Log>,
    guard: ProviderGuard,
}

impl Telemetry {
    /// Validate `config` and build every provider it asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the resource has
    /// conflicting entries, or an exporter fails to initialize. Providers
    /// built before the failure are shut down when dropped.
    pub fn new(config: Config) -> Result<Self, TelemetryError> {
        config.validate()?;
        let resource = resource::build_resource(&config)?;
        let name = config.service.name.clone();

        let trace_target =
            providers::select_target(config.with_traces, true, &config, &config.tracer_options.exporter)
                .unwrap_or(ExporterTarget::Local(config.fallback_sink));
        log_target(Signal::Traces, &trace_target);
        let tracer_provider = providers::tracer::build_tracer_provider(
            &trace_target,
            resource.clone(),
            &config.tracer_options,
        )?;

        let meter_provider = match providers::select_target(
            config.with_metrics,
            false,
            &config,
            &config.metric_options.exporter,
        ) {
            Some(target) => {
                log_target(Signal::Metrics, &target);
                Some(providers::metric::build_meter_provider(
                    &target,
                    resource.clone(),
                    &config.metric_options,
                )?)
            }
            None => None,
        };

        let logger_provider = match providers::select_target(
            config.with_logs,
            false,
            &config,
            &config.logger_options.exporter,
        ) {
            Some(target) => {
                log_target(Signal::Logs, &target);
                Some(providers::logger::build_logger_provider(
                    &target,
                    resource.clone(),
                    &config.logger_options,
                )?)
            }
            None => None,
        };

        let trace = Trace::new(
            tracer_provider.tracer_with_scope(scope(&name, &config.tracer_options.scope)),
        );
        let metric = meter_provider
            .as_ref()
            .map(|p| Metric::new(p.meter_with_scope(scope(&name, &config.metric_options.scope))));
        let log = logger_provider
            .as_ref()
            .map(|p| Log::new(p.logger_with_scope(scope(&name, &config.logger_options.scope))));

        Ok(Self {
            service_name: name,
            resource,
            propagator: propagation::composite_propagator(),
            trace,
            metric,
            log,
            guard: ProviderGuard::new(tracer_provider, meter_provider, logger_provider),
        })
    }

    /// Install the propagator, tracer provider and meter provider as the
    /// process-wide defaults. The most recent call wins.
    pub fn install_globals(&self) {
        propagation::install_propagator();
        global::set_tracer_provider(self.guard.tracer_provider().clone());
        if let Some(provider) = self.guard.meter_provider() {
            global::set_meter_provider(provider.clone());
        }
        tracing::debug!(target: "otelemetry::lifecycle", service = %self.service_name, "globals installed");
    }

    /// Route `tracing` spans and events into this instance's providers.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already set.
    pub fn install_subscriber(&self) -> Result<(), TelemetryError> {
        subscriber::compose_subscriber(
            self.guard.tracer_provider(),
            self.guard.logger_provider(),
            &self.service_name,
        )
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn start_span(&self, cx: &Context, name: impl Into<Cow<'static, str>>) -> (Context, Span) {
        self.trace.start_span(cx, name)
    }

    pub fn start_span_with(&self, cx: &Context, builder: SpanBuilder) -> (Context, Span) {
        self.trace.start_span_with(cx, builder)
    }

    pub fn span_from_context(&self, cx: &Context) -> Option<Span> {
        self.trace.span_from_context(cx)
    }

    pub fn log(&self) -> Option<&Log> {
        self.log.as_ref()
    }

    pub fn metric(&self) -> Option<&Metric> {
        self.metric.as_ref()
    }

    pub fn meter(&self) -> Option<&Meter> {
        self.metric.as_ref().map(Metric::meter)
    }

    pub fn tracer(&self) -> &SdkTracer {
        self.trace.tracer()
    }

    pub fn logger(&self) -> Option<&SdkLogger> {
        self.log.as_ref().map(Log::logger)
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Write the trace context and baggage of `cx` into `carrier`.
    pub fn inject(&self, cx: &Context, carrier: &mut HashMap<String, String>) {
        self.propagator.inject_context(cx, carrier);
    }

    /// Read trace context and baggage from `carrier` on top of `cx`.
    ///
    /// Missing or malformed headers leave `cx` unchanged.
    pub fn extract(&self, cx: &Context, carrier: &HashMap<String, String>) -> Context {
        self.propagator.extract_with_context(cx, carrier)
    }

    /// Flush and shut down all providers, blocking for at most
    /// `min(deadline, 1s)`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Shutdown`] with one entry per provider that
    /// failed or ran out of time.
    pub fn shutdown(&self, deadline: Duration) -> Result<(), TelemetryError> {
        self.guard.shutdown(deadline)
    }
}

fn scope(name: &str, options: &ScopeOptions) -> InstrumentationScope {
    let mut builder = InstrumentationScope::builder(name.to_owned())
        .with_attributes(options.attributes.clone());
    if let Some(version) = &options.version {
        builder = builder.with_version(version.clone());
    }
    if let Some(schema_url) = &options.schema_url {
        builder = builder.with_schema_url(schema_url.clone());
    }
    builder.build()
}

fn log_target(signal: Signal, target: &ExporterTarget) {
    match target {
        ExporterTarget::Remote { endpoint, options } => tracing::debug!(
            target: "otelemetry::lifecycle",
            %signal,
            endpoint = %endpoint,
            protocol = ?providers::protocol(options),
            "building remote pipeline"
        ),
        ExporterTarget::Local(sink) => tracing::debug!(
            target: "otelemetry::lifecycle",
            %signal,
            ?sink,
            "building local pipeline"
        ),
    }
}
