use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;

use crate::error::{ShutdownFailure, Signal, TelemetryError};

/// Upper bound on the time a shutdown may block, whatever the caller asks for.
pub const SHUTDOWN_BUDGET: Duration = Duration::from_secs(1);

/// Owns the SDK providers and shuts them down exactly once.
///
/// Shutdown runs traces, then metrics, then logs, each provider getting what
/// is left of the shared budget. Dropping the guard shuts down with
/// [`SHUTDOWN_BUDGET`] if [`shutdown`](Self::shutdown) was never called.
#[must_use = "dropping the ProviderGuard immediately shuts down all providers"]
pub(crate) struct ProviderGuard {
    tracer_provider: SdkTracerProvider,
    meter_provider: Option<SdkMeterProvider>,
    logger_provider: Option<SdkLoggerProvider>,
    shutdown_called: AtomicBool,
}

impl ProviderGuard {
    pub(crate) fn new(
        tracer_provider: SdkTracerProvider,
        meter_provider: Option<SdkMeterProvider>,
        logger_provider: Option<SdkLoggerProvider>,
    ) -> Self {
        Self {
            tracer_provider,
            meter_provider,
            logger_provider,
            shutdown_called: AtomicBool::new(false),
        }
    }

    pub(crate) fn tracer_provider(&self) -> &SdkTracerProvider {
        &self.tracer_provider
    }

    pub(crate) fn meter_provider(&self) -> Option<&SdkMeterProvider> {
        self.meter_provider.as_ref()
    }

    pub(crate) fn logger_provider(&self) -> Option<&SdkLoggerProvider> {
        self.logger_provider.as_ref()
    }

    /// Flush and shut down every provider within `min(deadline, SHUTDOWN_BUDGET)`.
    ///
    /// Safe to call multiple times; calls after the first return `Ok(())`.
    ///
    /// # Errors
    ///
    /// Returns [`TelemetryError::Shutdown`] listing every provider that failed
    /// or ran out of time. A failure never stops later providers from being
    /// shut down.
    pub(crate) fn shutdown(&self, deadline: Duration) -> Result<(), TelemetryError> {
        if self.shutdown_called.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let budget = deadline.min(SHUTDOWN_BUDGET);
        let started = Instant::now();
        let mut failures = Vec::new();

        let tracer_provider = &self.tracer_provider;
        run_step(Signal::Traces, budget, started, &mut failures, |timeout| {
            tracer_provider.shutdown_with_timeout(timeout)
        });
        if let Some(provider) = &self.meter_provider {
            run_step(Signal::Metrics, budget, started, &mut failures, |timeout| {
                provider.shutdown_with_timeout(timeout)
            });
        }
        if let Some(provider) = &self.logger_provider {
            run_step(Signal::Logs, budget, started, &mut failures, |timeout| {
                provider.shutdown_with_timeout(timeout)
            });
        }

        if failures.is_empty() {
            tracing::debug!(
                target: "otelemetry::lifecycle",
                elapsed = ?started.elapsed(),
                "providers shut down"
            );
            Ok(())
        } else {
            Err(TelemetryError::Shutdown(failures))
        }
    }
}

fn run_step(
    signal: Signal,
    budget: Duration,
    started: Instant,
    failures: &mut Vec<ShutdownFailure>,
    shutdown: impl FnOnce(Duration) -> OTelSdkResult,
) {
    let remaining = budget.saturating_sub(started.elapsed());
    let result = shutdown(remaining);

    // Out of budget: the provider was told to stop but had no time to flush.
    let error = match result {
        Err(error) => error,
        Ok(()) if remaining.is_zero() => OTelSdkError::Timeout(budget),
        Ok(()) => return,
    };

    tracing::warn!(
        target: "otelemetry::lifecycle",
        %signal,
        error = %error,
        "provider shutdown failed"
    );
    failures.push(ShutdownFailure { signal, error });
}

impl Drop for ProviderGuard {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown(SHUTDOWN_BUDGET) {
            tracing::warn!(target: "otelemetry::lifecycle", error = %err, "shutdown on drop failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_guard(with_optional: bool) -> ProviderGuard {
        ProviderGuard::new(
            SdkTracerProvider::builder().build(),
            with_optional.then(|| SdkMeterProvider::builder().build()),
            with_optional.then(|| SdkLoggerProvider::builder().build()),
        )
    }

    #[test]
    fn shutdown_succeeds_within_budget() {
        let guard = noop_guard(true);
        assert!(guard.shutdown(Duration::from_millis(500)).is_ok());
    }

    #[test]
    fn second_shutdown_is_a_noop() {
        let guard = noop_guard(true);
        let _ = guard.shutdown(Duration::ZERO);
        assert!(guard.shutdown(Duration::ZERO).is_ok());
    }

    #[test]
    fn zero_deadline_reports_a_timeout_per_provider() {
        let guard = noop_guard(true);

        let started = Instant::now();
        let err = guard.shutdown(Duration::ZERO).unwrap_err();

        assert!(started.elapsed() < SHUTDOWN_BUDGET);
        let signals: Vec<_> = err.shutdown_failures().iter().map(|f| f.signal).collect();
        assert_eq!(signals, vec![Signal::Traces, Signal::Metrics, Signal::Logs]);
        assert!(err
            .shutdown_failures()
            .iter()
            .all(|f| matches!(f.error, OTelSdkError::Timeout(_))));
    }

    #[test]
    fn absent_providers_are_skipped() {
        let guard = noop_guard(false);
        let err = guard.shutdown(Duration::ZERO).unwrap_err();
        assert_eq!(err.shutdown_failures().len(), 1);
        assert_eq!(err.shutdown_failures()[0].signal, Signal::Traces);
    }
}
