use std::time::SystemTime;

use opentelemetry::logs::{AnyValue, LogRecord as _, Logger as _, Severity};
use opentelemetry::Context;
use opentelemetry_sdk::logs::SdkLogger;

use crate::attribute::LogField;

pub const DEBUG: &str = "DEBUG";
pub const INFO: &str = "INFO";
pub const WARN: &str = "WARN";
pub const ERROR: &str = "ERROR";
pub const FATAL: &str = "FATAL";

/// Structured logging half of the facade.
///
/// Each call emits one record with the message as body, the severity number
/// and name, the current time, and `fields`. The record is correlated with
/// the span active on `cx`.
#[derive(Clone)]
pub struct Log {
    logger: SdkLogger,
}

impl Log {
    pub(crate) fn new(logger: SdkLogger) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &SdkLogger {
        &self.logger
    }

    pub fn debug(&self, cx: &Context, msg: impl Into<String>, fields: Vec<LogField>) {
        self.emit(cx, msg.into(), Severity::Debug, DEBUG, fields);
    }

    pub fn info(&self, cx: &Context, msg: impl Into<String>, fields: Vec<LogField>) {
        self.emit(cx, msg.into(), Severity::Info, INFO, fields);
    }

    pub fn warning(&self, cx: &Context, msg: impl Into<String>, fields: Vec<LogField>) {
        self.emit(cx, msg.into(), Severity::Warn, WARN, fields);
    }

    pub fn error(&self, cx: &Context, msg: impl Into<String>, fields: Vec<LogField>) {
        self.emit(cx, msg.into(), Severity::Error, ERROR, fields);
    }

    /// Emits at fatal severity. Does not terminate the process.
    pub fn fatal(&self, cx: &Context, msg: impl Into<String>, fields: Vec<LogField>) {
        self.emit(cx, msg.into(), Severity::Fatal, FATAL, fields);
    }

    fn emit(
        &self,
        cx: &Context,
        msg: String,
        severity: Severity,
        severity_text: &'static str,
        fields: Vec<LogField>,
    ) {
        let now = SystemTime::now();
        let mut record = self.logger.create_log_record();
        record.set_body(AnyValue::from(msg));
        record.set_severity_number(severity);
        record.set_severity_text(severity_text);
        record.set_timestamp(now);
        record.set_observed_timestamp(now);
        record.add_attributes(fields);

        // The SDK reads trace correlation from the current context.
        let _guard = cx.clone().attach();
        self.logger.emit(record);
    }
}

#[cfg(test)]
mod tests {
    use opentelemetry::logs::LoggerProvider as _;
    use opentelemetry::trace::{TraceContextExt, Tracer as _, TracerProvider as _};
    use opentelemetry_sdk::logs::{InMemoryLogExporter, SdkLoggerProvider};
    use opentelemetry_sdk::trace::SdkTracerProvider;

    use super::*;
    use crate::attribute::log_attribute;

    fn setup() -> (SdkLoggerProvider, InMemoryLogExporter, Log) {
        let exporter = InMemoryLogExporter::default();
        let provider = SdkLoggerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .build();
        let log = Log::new(provider.logger("test"));
        (provider, exporter, log)
    }

    #[test]
    fn each_level_sets_number_and_name() {
        let (_provider, exporter, log) = setup();
        let cx = Context::new();

        log.debug(&cx, "d", vec![]);
        log.info(&cx, "i", vec![]);
        log.warning(&cx, "w", vec![]);
        log.error(&cx, "e", vec![]);
        log.fatal(&cx, "f", vec![]);

        let logs = exporter.get_emitted_logs().unwrap();
        let levels: Vec<_> = logs
            .iter()
            .map(|l| (l.record.severity_number(), l.record.severity_text()))
            .collect();

        assert_eq!(
            levels,
            vec![
                (Some(Severity::Debug), Some(DEBUG)),
                (Some(Severity::Info), Some(INFO)),
                (Some(Severity::Warn), Some(WARN)),
                (Some(Severity::Error), Some(ERROR)),
                (Some(Severity::Fatal), Some(FATAL)),
            ]
        );
    }

    #[test]
    fn record_carries_body_timestamp_and_fields() {
        let (_provider, exporter, log) = setup();

        log.info(
            &Context::new(),
            "Request processed",
            vec![log_attribute("sleep", 40)],
        );

        let logs = exporter.get_emitted_logs().unwrap();
        let record = &logs[0].record;
        assert_eq!(
            record.body(),
            Some(&AnyValue::String("Request processed".into()))
        );
        assert!(record.timestamp().is_some());
        let sleep = record
            .attributes_iter()
            .find(|(key, _)| key.as_str() == "sleep")
            .map(|(_, value)| value.clone());
        assert_eq!(sleep, Some(AnyValue::Int(40)));
    }

    #[test]
    fn record_is_correlated_with_active_span() {
        let (_provider, exporter, log) = setup();
        let tracer_provider = SdkTracerProvider::builder().build();
        let span = tracer_provider.tracer("test").start("op");
        let cx = Context::new().with_span(span);

        log.info(&cx, "inside span", vec![]);

        let logs = exporter.get_emitted_logs().unwrap();
        let trace_context = logs[0].record.trace_context().unwrap();
        assert_eq!(
            trace_context.trace_id,
            cx.span().span_context().trace_id()
        );
    }
}
