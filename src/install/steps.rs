//! Tri-state step results and the per-run report.
//!
//! Every installation step resolves to one of three outcomes. The orchestrator
//! records each outcome in order and stops at the first failure, so individual
//! steps stay unit-testable without driving the whole sequence.

/// Result of a single installation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step made a change to the host.
    Completed,
    /// The step found its work already done and changed nothing.
    Skipped,
    /// The step failed; the run must stop.
    Failed(String),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed(_))
    }
}

/// One named step and how it resolved.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: &'static str,
    pub outcome: StepOutcome,
}

/// Ordered record of every step the orchestrator ran, plus soft-failure
/// warnings that were reported without aborting.
#[derive(Debug, Default)]
pub struct RunReport {
    steps: Vec<StepReport>,
    warnings: Vec<(&'static str, String)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &'static str, outcome: StepOutcome) {
        self.steps.push(StepReport { name, outcome });
    }

    /// Attach a soft-failure warning to a step. Warnings never affect the
    /// run's success.
    pub fn record_warning(&mut self, name: &'static str, message: String) {
        self.warnings.push((name, message));
    }

    pub fn warnings(&self) -> &[(&'static str, String)] {
        &self.warnings
    }

    pub fn warning_for(&self, name: &str) -> Option<&str> {
        self.warnings
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| m.as_str())
    }

    pub fn steps(&self) -> &[StepReport] {
        &self.steps
    }

    /// First failed step, if any. At most one exists since the run stops there.
    pub fn failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.outcome.is_failure())
    }

    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Completed)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Skipped)
            .count()
    }
}
