use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use hotwork_core_types::{Answer, Panel, TaskId};
use hotwork_form_surface::TabState;
use serde::Serialize;

/// Counters for one visited panel. `succeeded + failed == total` always.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PanelReport {
    pub panel: Panel,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub confirmed: bool,
}

impl PanelReport {
    pub fn new(panel: Panel) -> Self {
        Self {
            panel,
            total: 0,
            succeeded: 0,
            failed: 0,
            confirmed: false,
        }
    }

    pub fn record_success(&mut self) {
        self.total += 1;
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.total += 1;
        self.failed += 1;
    }

    /// Counts `count` items that could not be attempted as failures.
    pub fn fail_unattempted(&mut self, count: usize) {
        self.total += count;
        self.failed += count;
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.confirmed
    }
}

/// Outcome of applying one plan.
#[derive(Clone, Debug, Serialize)]
pub struct ApplyReport {
    pub task_id: Option<TaskId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub latency_ms: u64,
    /// Visited panels in application order. Skipped panels are absent.
    pub panels: Vec<PanelReport>,
    pub warnings: Vec<String>,
    /// Safety-analysis answers actually set, by ordinal.
    pub safety_analysis_applied: BTreeMap<String, Answer>,
    /// Every tab state the navigator entered.
    pub transitions: Vec<TabState>,
}

impl ApplyReport {
    pub fn new(task_id: Option<TaskId>) -> Self {
        let now = Utc::now();
        Self {
            task_id,
            started_at: now,
            finished_at: now,
            latency_ms: 0,
            panels: Vec::new(),
            warnings: Vec::new(),
            safety_analysis_applied: BTreeMap::new(),
            transitions: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn panel(&self, panel: Panel) -> Option<&PanelReport> {
        self.panels.iter().find(|report| report.panel == panel)
    }

    pub fn total_failed(&self) -> usize {
        self.panels.iter().map(|report| report.failed).sum()
    }

    pub fn all_confirmed(&self) -> bool {
        self.panels.iter().all(|report| report.confirmed)
    }

    pub fn finish(mut self, transitions: &[TabState]) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64;
        self.transitions = transitions.to_vec();
        self
    }
}
