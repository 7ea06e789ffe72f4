//! Sequential task runner: one permit record after another.

use std::sync::Arc;

use hotwork_core_types::{Panel, TaskId};
use hotwork_form_surface::{
    collect_questions, read_task_text, InteractionError, InteractionPolicy, UiSurface,
};
use hotwork_plan_applier::{ApplyError, ApplyReport, PlanApplier};
use hotwork_rule_engine::{planner, Plan, PlanBuilder, RuleError, RuleSet};
use serde::Serialize;
use tracing::{error, info, warn};

/// A record to fill, already located and open on its surface.
pub struct FormTask<'a> {
    pub id: TaskId,
    pub surface: &'a dyn UiSurface,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum TaskStatus {
    Completed {
        report: ApplyReport,
    },
    /// The session was lost; nothing after this task is attempted.
    Aborted {
        panel: Option<Panel>,
        reason: String,
        partial: Option<ApplyReport>,
    },
    /// The task could not be planned; the batch moves on.
    Failed {
        reason: String,
    },
    NotAttempted,
}

#[derive(Clone, Debug, Serialize)]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub plan: Option<Plan>,
    #[serde(flatten)]
    pub status: TaskStatus,
}

impl TaskOutcome {
    pub fn is_aborted(&self) -> bool {
        matches!(self.status, TaskStatus::Aborted { .. })
    }

    pub fn report(&self) -> Option<&ApplyReport> {
        match &self.status {
            TaskStatus::Completed { report } => Some(report),
            TaskStatus::Aborted { partial, .. } => partial.as_ref(),
            _ => None,
        }
    }
}

pub struct TaskRunner {
    builder: PlanBuilder,
    applier: PlanApplier,
    policy: InteractionPolicy,
}

impl TaskRunner {
    pub fn new(rules: Arc<RuleSet>, policy: InteractionPolicy) -> Result<Self, RuleError> {
        let builder = planner(rules)?;
        let applier = PlanApplier::new(builder.engine().clone(), policy.clone());
        Ok(Self {
            builder,
            applier,
            policy,
        })
    }

    pub fn builder(&self) -> &PlanBuilder {
        &self.builder
    }

    /// Reads the record and builds its plan.
    ///
    /// Safety-analysis questions are taken from whatever is on screen
    /// without opening any tab. When none are visible the applier
    /// discovers them on its own visit to the panel.
    pub async fn prepare(&self, task: &FormTask<'_>) -> Result<Plan, InteractionError> {
        let text = read_task_text(task.surface, &self.policy.timeouts).await?;
        if text.is_empty() {
            warn!(task = %task.id, "task text is empty; only base answers will apply");
        }
        let discovered = match collect_questions(task.surface).await {
            Ok(items) => items,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                warn!(task = %task.id, error = %err, "safety analysis questions not collected");
                Vec::new()
            }
        };
        if discovered.is_empty() {
            info!(task = %task.id, "no safety-analysis questions on screen yet");
        }
        Ok(self
            .builder
            .build(&text, &discovered)
            .with_task_id(task.id.clone()))
    }

    /// Plans and applies one task.
    pub async fn run_task(&self, task: &FormTask<'_>) -> TaskOutcome {
        let plan = match self.prepare(task).await {
            Ok(plan) => plan,
            Err(err) if err.is_fatal() => {
                error!(task = %task.id, error = %err, "session lost while planning");
                return TaskOutcome {
                    task_id: task.id.clone(),
                    plan: None,
                    status: TaskStatus::Aborted {
                        panel: None,
                        reason: err.to_string(),
                        partial: None,
                    },
                };
            }
            Err(err) => {
                warn!(task = %task.id, error = %err, "task could not be planned");
                return TaskOutcome {
                    task_id: task.id.clone(),
                    plan: None,
                    status: TaskStatus::Failed {
                        reason: err.to_string(),
                    },
                };
            }
        };

        let status = match self.applier.apply(task.surface, &plan).await {
            Ok(report) => {
                info!(
                    task = %task.id,
                    failed = report.total_failed(),
                    warnings = report.warnings.len(),
                    "task completed"
                );
                TaskStatus::Completed { report }
            }
            Err(err) => {
                error!(task = %task.id, error = %err, "task aborted");
                let panel = err.panel();
                let reason = err.to_string();
                let ApplyError::Aborted { partial, .. } = err;
                TaskStatus::Aborted {
                    panel: Some(panel),
                    reason,
                    partial: Some(*partial),
                }
            }
        };
        TaskOutcome {
            task_id: task.id.clone(),
            plan: Some(plan),
            status,
        }
    }

    /// Runs the tasks in order. A lost session stops the batch and the
    /// remaining tasks are reported as not attempted.
    pub async fn run_batch(&self, tasks: &[FormTask<'_>]) -> Vec<TaskOutcome> {
        let mut outcomes = Vec::with_capacity(tasks.len());
        let mut stopped = false;
        for task in tasks {
            if stopped {
                outcomes.push(TaskOutcome {
                    task_id: task.id.clone(),
                    plan: None,
                    status: TaskStatus::NotAttempted,
                });
                continue;
            }
            info!(task = %task.id, "starting task");
            let outcome = self.run_task(task).await;
            stopped = outcome.is_aborted();
            outcomes.push(outcome);
        }
        outcomes
    }
}
