/*!
Observability infrastructure for CVKit.

This module provides:
- Structured logging setup on top of `tracing-subscriber`
- Prometheus counters for version store activity (`metrics` feature)

The version store swallows storage failures by contract; the warnings and the
error counter recorded here are the only trace they leave.
*/

#[cfg(feature = "metrics")]
use prometheus::{Counter, Encoder, Histogram, Registry, TextEncoder};
#[cfg(feature = "metrics")]
use once_cell::sync::OnceCell;
use tracing::subscriber::set_global_default;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry as TracingRegistry};

use crate::{CvError, Result};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line records
    #[default]
    Compact,
    /// One JSON object per record
    Json,
}

/// Global metrics instance. `None` if registration failed.
#[cfg(feature = "metrics")]
static METRICS: OnceCell<Option<CvMetrics>> = OnceCell::new();

/// Metrics collection for version store operations
#[cfg(feature = "metrics")]
#[derive(Debug)]
pub struct CvMetrics {
    pub versions_saved_total: Counter,
    pub versions_deleted_total: Counter,
    pub storage_errors_total: Counter,
    pub snapshot_size_bytes: Histogram,

    // Prometheus registry for scraping
    registry: Registry,
}

#[cfg(feature = "metrics")]
impl CvMetrics {
    fn new() -> Result<Self> {
        let registry = Registry::new();

        let versions_saved_total = Counter::new(
            "cvkit_versions_saved_total",
            "Total versions saved to the version store",
        )
        .map_err(|e| CvError::storage(format!("Failed to create versions_saved_total: {e}")))?;

        let versions_deleted_total = Counter::new(
            "cvkit_versions_deleted_total",
            "Total versions removed from the version store",
        )
        .map_err(|e| {
            CvError::storage(format!("Failed to create versions_deleted_total: {e}"))
        })?;

        let storage_errors_total = Counter::new(
            "cvkit_storage_errors_total",
            "Storage failures absorbed by the version store",
        )
        .map_err(|e| CvError::storage(format!("Failed to create storage_errors_total: {e}")))?;

        let snapshot_size_bytes = Histogram::with_opts(
            prometheus::HistogramOpts::new(
                "cvkit_snapshot_size_bytes",
                "Size of the serialized versions list in bytes",
            )
            .buckets(prometheus::exponential_buckets(512.0, 4.0, 8).map_err(|e| {
                CvError::storage(format!("Failed to build size buckets: {e}"))
            })?),
        )
        .map_err(|e| CvError::storage(format!("Failed to create snapshot_size_bytes: {e}")))?;

        for collector in [
            Box::new(versions_saved_total.clone()) as Box<dyn prometheus::core::Collector>,
            Box::new(versions_deleted_total.clone()),
            Box::new(storage_errors_total.clone()),
            Box::new(snapshot_size_bytes.clone()),
        ] {
            registry
                .register(collector)
                .map_err(|e| CvError::storage(format!("Failed to register metric: {e}")))?;
        }

        Ok(Self {
            versions_saved_total,
            versions_deleted_total,
            storage_errors_total,
            snapshot_size_bytes,
            registry,
        })
    }

    /// Get or initialize the global metrics instance
    pub fn global() -> Option<&'static CvMetrics> {
        METRICS
            .get_or_init(|| match Self::new() {
                Ok(metrics) => Some(metrics),
                Err(e) => {
                    tracing::warn!(error = %e, "Metrics disabled");
                    None
                }
            })
            .as_ref()
    }

    /// Gather metrics in Prometheus text format
    pub fn gather_metrics(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| CvError::storage(format!("Failed to encode metrics: {e}")))?;

        String::from_utf8(buffer)
            .map_err(|e| CvError::storage(format!("Failed to convert metrics to string: {e}")))
    }
}

pub(crate) fn record_version_saved(list_bytes: usize) {
    #[cfg(feature = "metrics")]
    {
        if let Some(metrics) = CvMetrics::global() {
            metrics.versions_saved_total.inc();
            metrics.snapshot_size_bytes.observe(list_bytes as f64);
        }
    }
    #[cfg(not(feature = "metrics"))]
    let _ = list_bytes;
}

pub(crate) fn record_version_deleted() {
    #[cfg(feature = "metrics")]
    {
        if let Some(metrics) = CvMetrics::global() {
            metrics.versions_deleted_total.inc();
        }
    }
}

pub(crate) fn record_storage_error() {
    #[cfg(feature = "metrics")]
    {
        if let Some(metrics) = CvMetrics::global() {
            metrics.storage_errors_total.inc();
        }
    }
}

/// Install the global tracing subscriber
///
/// Records are written to stderr so command output on stdout stays clean.
/// The filter comes from `RUST_LOG` when set, otherwise from
/// `default_directive` (for example `"info"` or `"cvkit_core=debug"`).
///
/// # Errors
/// * `CvError::Validation` - `default_directive` is not a valid filter
/// * `CvError::Storage` - a global subscriber is already installed
pub fn init_tracing(format: LogFormat, default_directive: &str) -> Result<()> {
    #[cfg(feature = "metrics")]
    CvMetrics::global();

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directive).map_err(|e| {
            CvError::validation(format!("Invalid log filter '{default_directive}': {e}"))
        })?,
    };

    let registry = TracingRegistry::default().with(filter);
    let installed = match format {
        LogFormat::Compact => set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
        ),
        LogFormat::Json => set_global_default(
            registry.with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            ),
        ),
    };
    installed.map_err(|e| {
        CvError::storage(format!("Failed to set global tracing subscriber: {e}"))
    })?;

    tracing::debug!(?format, "CVKit observability initialized");
    Ok(())
}

/// Initialize observability with default settings
pub fn init_default_observability() -> Result<()> {
    init_tracing(LogFormat::Compact, "info")
}
