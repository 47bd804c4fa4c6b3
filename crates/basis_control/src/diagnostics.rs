//! Diagnostic reports published by controllers.
//!
//! [`Controller::post_data`](crate::Controller::post_data) builds a
//! [`ControllerReport`] and hands it to the controller's [`DiagnosticsSink`].
//! What happens to it from there is up to the sink.

use crate::state::ControllerState;
use parking_lot::Mutex;
use serde::Serialize;

/// Snapshot of a controller's state after its last cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerReport {
    /// Controller name.
    pub name: String,
    /// Lifecycle state when the report was taken.
    pub state: ControllerState,
    /// Number of successful update cycles since the last start.
    pub cycles: usize,
    /// Euclidean norm of the current potential.
    pub potential: f64,
    /// Euclidean norm of the current potential derivative.
    pub potential_dot: f64,
    /// The current control output.
    pub output: Vec<f64>,
    /// Gain κ.
    pub gain: f64,
    /// Whether transpose mode is active.
    pub use_jacobian_transpose: bool,
    /// Whether resources are reached through proxies.
    pub distributed: bool,
}

impl ControllerReport {
    /// Serializes the report as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Destination for controller reports.
pub trait DiagnosticsSink: Send + Sync {
    /// Receives one report.
    fn publish(&self, report: &ControllerReport);
}

/// Sink that emits each report as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn publish(&self, report: &ControllerReport) {
        tracing::info!(
            controller = %report.name,
            state = %report.state,
            cycles = report.cycles,
            potential = report.potential,
            potential_dot = report.potential_dot,
            output = ?report.output,
            gain = report.gain,
            transpose = report.use_jacobian_transpose,
            "controller diagnostics"
        );
    }
}

/// Sink that keeps every report in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<ControllerReport>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected reports, oldest first.
    #[must_use]
    pub fn reports(&self) -> Vec<ControllerReport> {
        self.reports.lock().clone()
    }

    /// Returns the most recent report.
    #[must_use]
    pub fn last(&self) -> Option<ControllerReport> {
        self.reports.lock().last().cloned()
    }

    /// Returns the number of collected reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Returns `true` if nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// Drops all collected reports.
    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn publish(&self, report: &ControllerReport) {
        self.reports.lock().push(report.clone());
    }
}
