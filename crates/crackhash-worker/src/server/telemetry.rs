//! # Telemetry
//!
//! Console logging is always on: a `tracing_subscriber` registry with an
//! `EnvFilter` (default `info`, override with `RUST_LOG`) and a pretty `fmt`
//! layer.
//!
//! ## Feature matrix
//!
//! - `metrics`: Enables OpenTelemetry metrics (counters and a histogram for
//!   the task pipeline).
//! - `stdout`: Exports those metrics to stdout every few seconds.
//!
//! The recording functions at the bottom of this module compile to no-ops
//! when `metrics` is disabled, so call sites never need `cfg` guards.
//!
//! ```bash
//! cargo run --features metrics,stdout -- --manager-address localhost:8081
//! ```

// Disallow using `stdout` without `metrics`
#[cfg(all(feature = "stdout", not(feature = "metrics")))]
compile_error!("The 'stdout' feature requires 'metrics' to be enabled.");

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::{
    InstrumentationScope, KeyValue,
    metrics::{Counter, Histogram, Meter},
};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

impl TelemetryProviders {
    /// Flushes and stops any exporters. Safe to call when nothing is enabled.
    pub fn shutdown(&self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_thread_names(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true)
                .pretty(),
        )
        .try_init()?;

    #[cfg(feature = "metrics")]
    {
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        let scope = InstrumentationScope::builder("crackhash-worker")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("crackhash-worker")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let builder = sdkmetrics::SdkMeterProvider::builder().with_resource(resource());

    #[cfg(feature = "stdout")]
    let builder = {
        use opentelemetry_stdout::MetricExporter;
        let exporter = MetricExporter::default();
        let reader = sdkmetrics::PeriodicReader::builder(exporter)
            .with_interval(std::time::Duration::from_secs(5))
            .build();

        builder.with_reader(reader)
    };

    builder.build()
}

// Metric handles - only compiled when metrics feature is enabled
#[cfg(feature = "metrics")]
static TASKS_RECEIVED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PARTS_COMPLETED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PART_TIMEOUTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static PART_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static CANDIDATES_CHECKED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static TASKS_COMPLETED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static TASKS_DROPPED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static COMPLETION_FAILURES: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = TASKS_RECEIVED.set(
        meter
            .u64_counter("tasks_received")
            .with_description("Tasks accepted for execution")
            .build(),
    );

    let _ = PARTS_COMPLETED.set(
        meter
            .u64_counter("parts_completed")
            .with_description("Parts searched to completion or timeout")
            .build(),
    );

    let _ = PART_TIMEOUTS.set(
        meter
            .u64_counter("part_timeouts")
            .with_description("Parts cut short by the per-part deadline")
            .build(),
    );

    let _ = PART_DURATION_MS.set(
        meter
            .f64_histogram("part_duration")
            .with_unit("ms")
            .with_description("Wall-clock time spent searching one part")
            .build(),
    );

    let _ = CANDIDATES_CHECKED.set(
        meter
            .u64_counter("candidates_checked")
            .with_description("Candidate strings hashed and compared")
            .build(),
    );

    let _ = TASKS_COMPLETED.set(
        meter
            .u64_counter("tasks_completed")
            .with_description("Tasks fully aggregated and reported")
            .build(),
    );

    let _ = TASKS_DROPPED.set(
        meter
            .u64_counter("tasks_dropped")
            .with_description("Tasks discarded because a part failed")
            .build(),
    );

    let _ = COMPLETION_FAILURES.set(
        meter
            .u64_counter("completion_failures")
            .with_description("Completed tasks the manager did not accept")
            .build(),
    );
}

// Convenience functions that compile to no-ops when metrics are disabled
#[cfg(feature = "metrics")]
pub fn increment_tasks_received() {
    if let Some(counter) = TASKS_RECEIVED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_tasks_received() {}

#[cfg(feature = "metrics")]
pub fn increment_parts_completed() {
    if let Some(counter) = PARTS_COMPLETED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_parts_completed() {}

#[cfg(feature = "metrics")]
pub fn increment_part_timeouts() {
    if let Some(counter) = PART_TIMEOUTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_part_timeouts() {}

#[cfg(feature = "metrics")]
pub fn record_part_duration(duration_ms: f64) {
    if let Some(histogram) = PART_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn record_part_duration(_duration_ms: f64) {}

#[cfg(feature = "metrics")]
pub fn increment_candidates_checked(count: u64) {
    if let Some(counter) = CANDIDATES_CHECKED.get() {
        counter.add(count, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_candidates_checked(_count: u64) {}

#[cfg(feature = "metrics")]
pub fn increment_tasks_completed() {
    if let Some(counter) = TASKS_COMPLETED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_tasks_completed() {}

#[cfg(feature = "metrics")]
pub fn increment_tasks_dropped() {
    if let Some(counter) = TASKS_DROPPED.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_tasks_dropped() {}

#[cfg(feature = "metrics")]
pub fn increment_completion_failures() {
    if let Some(counter) = COMPLETION_FAILURES.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub fn increment_completion_failures() {}
