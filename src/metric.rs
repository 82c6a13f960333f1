use std::borrow::Cow;

use opentelemetry::metrics::{
    AsyncInstrument, AsyncInstrumentBuilder, Counter, Gauge, Histogram, HistogramBuilder,
    InstrumentBuilder, Meter, ObservableCounter, ObservableGauge, ObservableUpDownCounter,
    UpDownCounter,
};

/// Metrics half of the facade.
///
/// Every instrument constructor is a pass-through to the service's
/// [`Meter`]. Observable instruments register their callback on the builder
/// (`with_callback`); the `observe_*` helpers do that in one call.
#[derive(Clone, Debug)]
pub struct Metric {
    meter: Meter,
}

impl Metric {
    pub(crate) fn new(meter: Meter) -> Self {
        Self { meter }
    }

    pub fn meter(&self) -> &Meter {
        &self.meter
    }

    pub fn u64_counter(&self, name: impl Into<Cow<'static, str>>) -> InstrumentBuilder<'_, Counter<u64>> {
        self.meter.u64_counter(name)
    }

    pub fn f64_counter(&self, name: impl Into<Cow<'static, str>>) -> InstrumentBuilder<'_, Counter<f64>> {
        self.meter.f64_counter(name)
    }

    pub fn i64_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> InstrumentBuilder<'_, UpDownCounter<i64>> {
        self.meter.i64_up_down_counter(name)
    }

    pub fn f64_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> InstrumentBuilder<'_, UpDownCounter<f64>> {
        self.meter.f64_up_down_counter(name)
    }

    pub fn u64_histogram(&self, name: impl Into<Cow<'static, str>>) -> HistogramBuilder<'_, Histogram<u64>> {
        self.meter.u64_histogram(name)
    }

    pub fn f64_histogram(&self, name: impl Into<Cow<'static, str>>) -> HistogramBuilder<'_, Histogram<f64>> {
        self.meter.f64_histogram(name)
    }

    pub fn u64_gauge(&self, name: impl Into<Cow<'static, str>>) -> InstrumentBuilder<'_, Gauge<u64>> {
        self.meter.u64_gauge(name)
    }

    pub fn i64_gauge(&self, name: impl Into<Cow<'static, str>>) -> InstrumentBuilder<'_, Gauge<i64>> {
        self.meter.i64_gauge(name)
    }

    pub fn f64_gauge(&self, name: impl Into<Cow<'static, str>>) -> InstrumentBuilder<'_, Gauge<f64>> {
        self.meter.f64_gauge(name)
    }

    pub fn u64_observable_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableCounter<u64>, u64> {
        self.meter.u64_observable_counter(name)
    }

    pub fn f64_observable_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableCounter<f64>, f64> {
        self.meter.f64_observable_counter(name)
    }

    pub fn i64_observable_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableUpDownCounter<i64>, i64> {
        self.meter.i64_observable_up_down_counter(name)
    }

    pub fn f64_observable_up_down_counter(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableUpDownCounter<f64>, f64> {
        self.meter.f64_observable_up_down_counter(name)
    }

    pub fn u64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableGauge<u64>, u64> {
        self.meter.u64_observable_gauge(name)
    }

    pub fn i64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableGauge<i64>, i64> {
        self.meter.i64_observable_gauge(name)
    }

    pub fn f64_observable_gauge(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> AsyncInstrumentBuilder<'_, ObservableGauge<f64>, f64> {
        self.meter.f64_observable_gauge(name)
    }

    /// Register an observable u64 counter reporting through `callback` on
    /// every collection.
    pub fn observe_u64_counter<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableCounter<u64>
    where
        F: Fn(&dyn AsyncInstrument<u64>) + Send + Sync + 'static,
    {
        self.meter
            .u64_observable_counter(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_f64_counter<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableCounter<f64>
    where
        F: Fn(&dyn AsyncInstrument<f64>) + Send + Sync + 'static,
    {
        self.meter
            .f64_observable_counter(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_i64_up_down_counter<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableUpDownCounter<i64>
    where
        F: Fn(&dyn AsyncInstrument<i64>) + Send + Sync + 'static,
    {
        self.meter
            .i64_observable_up_down_counter(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_f64_up_down_counter<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableUpDownCounter<f64>
    where
        F: Fn(&dyn AsyncInstrument<f64>) + Send + Sync + 'static,
    {
        self.meter
            .f64_observable_up_down_counter(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_u64_gauge<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableGauge<u64>
    where
        F: Fn(&dyn AsyncInstrument<u64>) + Send + Sync + 'static,
    {
        self.meter
            .u64_observable_gauge(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_i64_gauge<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableGauge<i64>
    where
        F: Fn(&dyn AsyncInstrument<i64>) + Send + Sync + 'static,
    {
        self.meter
            .i64_observable_gauge(name)
            .with_callback(callback)
            .build()
    }

    pub fn observe_f64_gauge<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        callback: F,
    ) -> ObservableGauge<f64>
    where
        F: Fn(&dyn AsyncInstrument<f64>) + Send + Sync + 'static,
    {
        self.meter
            .f64_observable_gauge(name)
            .with_callback(callback)
            .build()
    }
}
