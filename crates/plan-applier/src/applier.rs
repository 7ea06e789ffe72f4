//! Panel-by-panel application of a [`Plan`].
//!
//! Panels are visited in the fixed order the plan reports. Per-question
//! errors become failure counts and warnings; a failed confirm becomes a
//! warning and the panel is abandoned. Only a lost session during navigation
//! or confirm stops the task.

use std::collections::{BTreeMap, BTreeSet};

use hotwork_core_types::{Answer, Panel};
use hotwork_form_surface::{
    check_item, collect_questions, ordered_targets, selectors, wait_for_options, ClickChain,
    InteractionError, InteractionPolicy, RowFiller, RowTarget, TabNavigator, UiSurface,
};
use hotwork_rule_engine::engine::ordinal_or_position;
use hotwork_rule_engine::{AnswerEngine, Plan};
use tracing::{debug, info, warn};

use crate::errors::ApplyError;
use crate::report::{ApplyReport, PanelReport};

/// Drives a [`UiSurface`] through the panels of a plan.
#[derive(Clone, Debug)]
pub struct PlanApplier {
    engine: AnswerEngine,
    policy: InteractionPolicy,
}

impl PlanApplier {
    pub fn new(engine: AnswerEngine, policy: InteractionPolicy) -> Self {
        Self { engine, policy }
    }

    pub fn policy(&self) -> &InteractionPolicy {
        &self.policy
    }

    fn click_chain(&self) -> ClickChain {
        ClickChain::new(self.policy.click_order.clone())
    }

    fn toggle_chain(&self) -> ClickChain {
        if self.policy.toggle_order.is_empty() {
            return ClickChain::single_activation();
        }
        ClickChain::new(self.policy.toggle_order.clone())
    }

    /// Applies every panel of the plan. Returns the partial report inside
    /// [`ApplyError::Aborted`] when the session is lost.
    pub async fn apply(
        &self,
        surface: &dyn UiSurface,
        plan: &Plan,
    ) -> Result<ApplyReport, ApplyError> {
        let mut report = ApplyReport::new(plan.task_id().cloned());
        let mut nav = TabNavigator::new(surface, &self.policy);
        let panels = plan.panels();
        info!(task = ?plan.task_id(), panels = ?panels, "applying plan");

        for panel in panels {
            if let Err(err) = self.apply_panel(&mut nav, surface, plan, panel, &mut report).await {
                warn!(panel = %panel, error = %err, "session lost; aborting task");
                let partial = report.finish(nav.history());
                return Err(ApplyError::Aborted {
                    panel,
                    reason: err.to_string(),
                    partial: Box::new(partial),
                });
            }
        }

        let report = report.finish(nav.history());
        info!(
            panels = report.panels.len(),
            failed = report.total_failed(),
            warnings = report.warnings.len(),
            latency_ms = report.latency_ms,
            "plan applied"
        );
        Ok(report)
    }

    /// Navigates, fills and confirms one panel. Returns an error only when it
    /// is fatal; the panel's report is recorded either way.
    async fn apply_panel(
        &self,
        nav: &mut TabNavigator<'_>,
        surface: &dyn UiSurface,
        plan: &Plan,
        panel: Panel,
        report: &mut ApplyReport,
    ) -> Result<(), InteractionError> {
        let mut counts = PanelReport::new(panel);

        if let Err(err) = nav.goto_panel(panel).await {
            if err.is_fatal() {
                report.panels.push(counts);
                return Err(err);
            }
            counts.fail_unattempted(planned_items(plan, panel));
            report.warn(format!("{panel}: navigation failed: {err}"));
            report.panels.push(counts);
            return Ok(());
        }

        let filled = match panel {
            Panel::Questionnaire | Panel::PpeRadios => {
                let answers = plan.answers(panel).cloned().unwrap_or_default();
                self.fill_keyed(surface, panel, &answers, &mut counts, report)
                    .await
            }
            Panel::EnvironmentalAnalysis => {
                self.fill_uniform(surface, plan.environmental_default(), &mut counts, report)
                    .await
            }
            Panel::PpeCategories => {
                self.fill_checklist(surface, plan.ppe_checklist(), &mut counts, report)
                    .await
            }
            Panel::SafetyAnalysis => self.fill_dynamic(surface, plan, &mut counts, report).await,
        };
        if let Err(err) = filled {
            report.panels.push(counts);
            return Err(err);
        }

        match nav.confirm().await {
            Ok(()) => counts.confirmed = true,
            Err(err) if err.is_fatal() => {
                report.panels.push(counts);
                return Err(err);
            }
            Err(err) => {
                warn!(panel = %panel, error = %err, "confirm failed; moving on");
                report.warn(format!("{panel}: {err}"));
                nav.abandon();
            }
        }

        info!(
            panel = %panel,
            total = counts.total,
            succeeded = counts.succeeded,
            failed = counts.failed,
            confirmed = counts.confirmed,
            "panel done"
        );
        report.panels.push(counts);
        Ok(())
    }

    /// Loads the row index of the open panel, waiting for options first.
    /// `Ok(None)` means the panel could not be indexed and was recorded.
    async fn load_rows<'s>(
        &self,
        surface: &'s dyn UiSurface,
        panel: Panel,
        report: &mut ApplyReport,
    ) -> Result<Option<RowFiller<'s>>, InteractionError> {
        if !wait_for_options(surface, &self.policy.timeouts).await? {
            warn!(panel = %panel, "no options appeared on the panel");
        }
        let locators = match panel {
            Panel::SafetyAnalysis => selectors::safety_question_rows(),
            _ => selectors::question_rows(),
        };
        match RowFiller::load_from(surface, self.click_chain(), locators).await {
            Ok(filler) => Ok(Some(filler)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                report.warn(format!("{panel}: could not index rows: {err}"));
                Ok(None)
            }
        }
    }

    async fn fill_keyed(
        &self,
        surface: &dyn UiSurface,
        panel: Panel,
        answers: &BTreeMap<String, Answer>,
        counts: &mut PanelReport,
        report: &mut ApplyReport,
    ) -> Result<(), InteractionError> {
        let targets = ordered_targets(answers);
        let Some(mut filler) = self.load_rows(surface, panel, report).await? else {
            counts.fail_unattempted(targets.len());
            return Ok(());
        };
        for (key, answer) in targets {
            let target = RowTarget::Key(key);
            self.answer_row(&mut filler, panel, &target, answer, counts, report)
                .await;
        }
        Ok(())
    }

    async fn fill_uniform(
        &self,
        surface: &dyn UiSurface,
        answer: Answer,
        counts: &mut PanelReport,
        report: &mut ApplyReport,
    ) -> Result<(), InteractionError> {
        let panel = Panel::EnvironmentalAnalysis;
        let Some(mut filler) = self.load_rows(surface, panel, report).await? else {
            return Ok(());
        };
        for position in 0..filler.index().len() {
            let target = RowTarget::Position(position);
            self.answer_row(&mut filler, panel, &target, answer, counts, report)
                .await;
        }
        Ok(())
    }

    async fn fill_checklist(
        &self,
        surface: &dyn UiSurface,
        checklist: &BTreeMap<String, BTreeSet<String>>,
        counts: &mut PanelReport,
        report: &mut ApplyReport,
    ) -> Result<(), InteractionError> {
        let chain = self.toggle_chain();
        for (category, items) in checklist {
            for item in items {
                match check_item(surface, item, &chain).await {
                    Ok(outcome) => {
                        info!(category = %category, item = %item, ?outcome, "checklist item set");
                        counts.record_success();
                    }
                    Err(err) => {
                        warn!(category = %category, item = %item, error = %err, "checklist item not set");
                        report.warn(format!("{}: {category} / {item}: {err}", Panel::PpeCategories));
                        counts.record_failure();
                    }
                }
            }
        }
        Ok(())
    }

    /// Re-reads the safety-analysis questions on screen and resolves them
    /// again, so the answers match what is actually displayed.
    async fn fill_dynamic(
        &self,
        surface: &dyn UiSurface,
        plan: &Plan,
        counts: &mut PanelReport,
        report: &mut ApplyReport,
    ) -> Result<(), InteractionError> {
        let panel = Panel::SafetyAnalysis;
        if !wait_for_options(surface, &self.policy.timeouts).await? {
            warn!(panel = %panel, "no options appeared on the panel");
        }
        let items = match collect_questions(surface).await {
            Ok(items) => items,
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => {
                report.warn(format!("{panel}: could not read questions: {err}"));
                return Ok(());
            }
        };

        let resolution = self.engine.resolve_questions(plan.flags(), &items);
        report.warnings.extend(resolution.warnings.iter().cloned());
        let planned = plan.answers(panel);

        let Some(mut filler) = self.load_rows(surface, panel, report).await? else {
            counts.fail_unattempted(resolution.questions.len());
            return Ok(());
        };
        for (index, resolved) in resolution.questions.iter().enumerate() {
            let ordinal = ordinal_or_position(&resolved.item, index);
            match planned.and_then(|answers| answers.get(&ordinal)) {
                Some(previous) if *previous != resolved.answer => info!(
                    ordinal = %ordinal,
                    planned = %previous,
                    applied = %resolved.answer,
                    "answer changed since planning"
                ),
                None => debug!(ordinal = %ordinal, "question was not on screen when planning"),
                _ => {}
            }

            let target = if resolved.item.has_ordinal() {
                RowTarget::Ordinal(ordinal.clone())
            } else {
                RowTarget::Position(index)
            };
            if self
                .answer_row(&mut filler, panel, &target, resolved.answer, counts, report)
                .await
            {
                report.safety_analysis_applied.insert(ordinal, resolved.answer);
            }
        }
        Ok(())
    }

    /// Applies one answer and records the outcome. Any error, a lost session
    /// included, counts as a failure of this row only.
    async fn answer_row(
        &self,
        filler: &mut RowFiller<'_>,
        panel: Panel,
        target: &RowTarget,
        answer: Answer,
        counts: &mut PanelReport,
        report: &mut ApplyReport,
    ) -> bool {
        match filler.answer(target, answer).await {
            Ok(outcome) => {
                info!(panel = %panel, row = %target.describe(), answer = %answer, ?outcome, "answer applied");
                counts.record_success();
                true
            }
            Err(err) => {
                warn!(panel = %panel, row = %target.describe(), error = %err, "answer not applied");
                report.warn(format!("{panel}: row {}: {err}", target.describe()));
                counts.record_failure();
                false
            }
        }
    }
}

/// Items a panel would have handled, for counting a failed navigation.
fn planned_items(plan: &Plan, panel: Panel) -> usize {
    match panel {
        Panel::PpeCategories => plan.ppe_checklist().values().map(BTreeSet::len).sum(),
        Panel::EnvironmentalAnalysis => 0,
        _ => plan
            .answers(panel)
            .map_or(0, |answers| ordered_targets(answers).len()),
    }
}
