use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hotwork_core_types::{Answer, HazardFlags, Panel, QuestionItem, TaskId, TaskText};
use serde::Serialize;
use tracing::info;

use crate::context::ContextExtractor;
use crate::engine::{AnswerEngine, ResolvedQuestion};

/// Everything needed to fill one permit record, decided before any UI work.
#[derive(Clone, Debug, Serialize)]
pub struct Plan {
    task_id: Option<TaskId>,
    task: TaskText,
    flags: HazardFlags,
    panel_answers: BTreeMap<Panel, BTreeMap<String, Answer>>,
    environmental_default: Answer,
    ppe_checklist: BTreeMap<String, BTreeSet<String>>,
    dynamic_questions: Vec<ResolvedQuestion>,
    warnings: Vec<String>,
}

impl Plan {
    pub fn task_id(&self) -> Option<&TaskId> {
        self.task_id.as_ref()
    }

    pub fn with_task_id(mut self, id: TaskId) -> Self {
        self.task_id = Some(id);
        self
    }

    pub fn task(&self) -> &TaskText {
        &self.task
    }

    pub fn flags(&self) -> &HazardFlags {
        &self.flags
    }

    /// Answer map of a keyed panel. The safety analysis map is keyed by
    /// ordinal; PPE categories have no answer map.
    pub fn answers(&self, panel: Panel) -> Option<&BTreeMap<String, Answer>> {
        self.panel_answers.get(&panel)
    }

    pub fn environmental_default(&self) -> Answer {
        self.environmental_default
    }

    pub fn ppe_checklist(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.ppe_checklist
    }

    pub fn dynamic_questions(&self) -> &[ResolvedQuestion] {
        &self.dynamic_questions
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Panels this plan touches, in application order.
    ///
    /// Keyed static panels are skipped when they carry no answers. The
    /// environmental analysis and safety analysis panels are always visited
    /// because their rows are only known once the panel is open.
    pub fn panels(&self) -> Vec<Panel> {
        Panel::ORDER
            .iter()
            .copied()
            .filter(|panel| match panel {
                Panel::Questionnaire | Panel::PpeRadios => self
                    .panel_answers
                    .get(panel)
                    .map_or(false, |answers| !answers.is_empty()),
                Panel::PpeCategories => self.ppe_checklist.values().any(|items| !items.is_empty()),
                Panel::EnvironmentalAnalysis | Panel::SafetyAnalysis => true,
            })
            .collect()
    }
}

/// Combines extraction and resolution into a [`Plan`].
#[derive(Clone, Debug)]
pub struct PlanBuilder {
    engine: AnswerEngine,
    extractor: Arc<ContextExtractor>,
}

impl PlanBuilder {
    pub fn new(engine: AnswerEngine, extractor: Arc<ContextExtractor>) -> Self {
        Self { engine, extractor }
    }

    pub fn engine(&self) -> &AnswerEngine {
        &self.engine
    }

    pub fn extractor(&self) -> &ContextExtractor {
        &self.extractor
    }

    /// Builds a plan from the task text and the safety-analysis questions
    /// discovered so far (possibly none).
    pub fn build(&self, task: &TaskText, discovered: &[QuestionItem]) -> Plan {
        let flags = self.extractor.extract(task);

        let mut panel_answers = BTreeMap::new();
        panel_answers.insert(Panel::Questionnaire, self.engine.questionnaire_answers());
        panel_answers.insert(Panel::PpeRadios, self.engine.ppe_radio_answers(&flags));

        let resolution = self.engine.resolve_questions(&flags, discovered);
        panel_answers.insert(Panel::SafetyAnalysis, resolution.by_ordinal());

        let plan = Plan {
            task_id: None,
            task: task.clone(),
            environmental_default: self.engine.environmental_default(),
            ppe_checklist: self.engine.ppe_checklist(&flags),
            flags,
            panel_answers,
            dynamic_questions: resolution.questions,
            warnings: resolution.warnings,
        };
        info!(
            raised = ?plan.flags.raised(),
            panels = ?plan.panels(),
            warnings = plan.warnings.len(),
            "plan built"
        );
        plan
    }
}
