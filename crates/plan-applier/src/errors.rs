use hotwork_core_types::Panel;
use thiserror::Error;

use crate::report::ApplyReport;

/// Errors that stop a task. Everything recoverable ends up in the report.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The UI surface went away while navigating or confirming.
    #[error("task aborted on {panel}: {reason}")]
    Aborted {
        panel: Panel,
        reason: String,
        partial: Box<ApplyReport>,
    },
}

impl ApplyError {
    /// Report of the panels handled before the abort.
    pub fn partial(&self) -> &ApplyReport {
        match self {
            ApplyError::Aborted { partial, .. } => partial,
        }
    }

    pub fn panel(&self) -> Panel {
        match self {
            ApplyError::Aborted { panel, .. } => *panel,
        }
    }
}
