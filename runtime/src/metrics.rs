//! Prometheus metrics for observability and monitoring.
//!
//! The store records:
//! - `store.actions.total`: actions reduced
//! - `store.reducer.duration_seconds`: time spent inside the reducer
//! - `store.effects.executed{type}`: effects started, by variant
//! - `store.effects.dropped`: effects dropped for lack of a runtime
//! - `store.shutdown.*`: graceful shutdown outcomes
//!
//! Metrics are no-ops until a recorder is installed.
//!
//! # Example
//!
//! ```rust,no_run
//! use request_state_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut recorder = MetricsRecorder::new();
//! recorder.install()?;
//!
//! // ... run the application ...
//!
//! if let Some(text) = recorder.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram, Unit};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use thiserror::Error;

// Re-export metrics macros for use in other crates
pub use metrics::{counter, gauge, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Process-wide Prometheus recorder.
///
/// Rendering is pull-based: callers decide where the text goes.
#[derive(Default)]
pub struct MetricsRecorder {
    handle: Option<PrometheusHandle>,
}

impl MetricsRecorder {
    /// Create a recorder that is not installed yet.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// Install the Prometheus recorder as the global metrics recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// # Note
    ///
    /// A process has one global recorder. If another one is already
    /// installed (e.g., by a previous test), this logs a warning and leaves
    /// this recorder without a handle.
    pub fn install(&mut self) -> Result<(), MetricsError> {
        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.000_01, 0.000_05, 0.000_1, 0.000_5, 0.001, 0.005, 0.01, 0.05, 0.1,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                register_metrics();
                tracing::info!("Metrics recorder installed");
                Ok(())
            },
            Err(BuildError::FailedToSetGlobalRecorder(_)) => {
                tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                Ok(())
            },
            Err(e) => Err(MetricsError::Install(e.to_string())),
        }
    }

    /// Whether this recorder owns the global recorder.
    #[must_use]
    pub const fn is_installed(&self) -> bool {
        self.handle.is_some()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if the recorder hasn't been installed.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("installed", &self.is_installed())
            .finish()
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    describe_counter!("store.actions.total", "Total number of actions reduced by stores");
    describe_histogram!(
        "store.reducer.duration_seconds",
        Unit::Seconds,
        "Time spent running the reducer for one action"
    );
    describe_counter!("store.effects.executed", "Effects started, labelled by variant");
    describe_counter!(
        "store.effects.dropped",
        "Effects dropped because no async runtime was available"
    );
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );
    describe_counter!("store.shutdown.initiated", "Graceful shutdowns started");
    describe_counter!("store.shutdown.completed", "Graceful shutdowns that drained all effects");
    describe_counter!("store.shutdown.timeout", "Graceful shutdowns that timed out");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninstalled_recorder_renders_nothing() {
        let recorder = MetricsRecorder::new();
        assert!(!recorder.is_installed());
        assert!(recorder.render().is_none());
    }

    // The only test in this binary that installs a recorder, so the first
    // install owns the process-wide slot.
    #[test]
    fn first_install_owns_the_global_recorder() -> Result<(), MetricsError> {
        let mut recorder = MetricsRecorder::new();
        recorder.install()?;
        assert!(recorder.is_installed());

        counter!("store.actions.total").increment(3);
        let text = recorder.render().unwrap_or_default();
        assert!(text.contains("store_actions_total"));

        let mut second = MetricsRecorder::new();
        second.install()?;
        assert!(!second.is_installed());
        assert!(second.render().is_none());
        assert!(recorder.is_installed());
        Ok(())
    }
}
