//! Human-readable rendering of plans and apply reports.

use std::fmt::Write as _;

use hotwork_core_types::Panel;
use hotwork_plan_applier::ApplyReport;
use hotwork_rule_engine::catalogue::{FallbackSpec, QuestionPattern};
use hotwork_rule_engine::Plan;

use crate::runner::{TaskOutcome, TaskStatus};

const RULE: &str = "==============================================";

fn or_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "(empty)"
    } else {
        text
    }
}

pub fn render_plan(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "====== HOT-WORK PLAN ======");
    if let Some(id) = plan.task_id() {
        let _ = writeln!(out, "task: {id}");
    }

    let _ = writeln!(out, "\nDescription:\n{}", or_empty(&plan.task().description));
    let _ = writeln!(
        out,
        "\nCharacteristics:\n{}",
        or_empty(&plan.task().characteristics)
    );

    let _ = writeln!(out, "\nFlags:");
    for (name, value) in plan.flags().iter() {
        let _ = writeln!(out, "  - {name}: {value}");
    }

    for panel in [Panel::Questionnaire, Panel::PpeRadios] {
        let _ = writeln!(out, "\n{}:", panel.name());
        match plan.answers(panel) {
            Some(answers) if !answers.is_empty() => {
                for (key, answer) in answers {
                    let _ = writeln!(out, "  - {key}: {answer}");
                }
            }
            _ => {
                let _ = writeln!(out, "  (none)");
            }
        }
    }

    let _ = writeln!(out, "\n{}:", Panel::PpeCategories.name());
    for (category, items) in plan.ppe_checklist() {
        let items: Vec<&str> = items.iter().map(String::as_str).collect();
        let _ = writeln!(out, "  - {category}: {}", items.join(", "));
    }

    let _ = writeln!(
        out,
        "\n{}: {}",
        Panel::EnvironmentalAnalysis.name(),
        plan.environmental_default()
    );

    let _ = writeln!(out, "\n{}:", Panel::SafetyAnalysis.name());
    if plan.dynamic_questions().is_empty() {
        let _ = writeln!(out, "  (no safety-analysis questions found on screen)");
    }
    for resolved in plan.dynamic_questions() {
        let key = resolved.item.recognized_key.as_deref().unwrap_or("-");
        let _ = writeln!(
            out,
            "  - {:>3} | {:<34} => {}",
            resolved.item.ordinal, key, resolved.answer
        );
    }

    if !plan.warnings().is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in plan.warnings() {
            let _ = writeln!(out, "  ! {warning}");
        }
    }
    let _ = writeln!(out, "{RULE}");
    out
}

pub fn render_report(report: &ApplyReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Applied in {} ms ({} failed, {} warnings)",
        report.latency_ms,
        report.total_failed(),
        report.warnings.len()
    );
    for panel in &report.panels {
        let _ = writeln!(
            out,
            "  {:<24} {:>3}/{:<3} failed={} {}",
            panel.panel.name(),
            panel.succeeded,
            panel.total,
            panel.failed,
            if panel.confirmed {
                "confirmed"
            } else {
                "NOT CONFIRMED"
            }
        );
    }
    if !report.safety_analysis_applied.is_empty() {
        let _ = writeln!(out, "  safety analysis applied:");
        for (ordinal, answer) in &report.safety_analysis_applied {
            let _ = writeln!(out, "    {ordinal} => {answer}");
        }
    }
    for warning in &report.warnings {
        let _ = writeln!(out, "  ! {warning}");
    }
    out
}

pub fn render_outcome(outcome: &TaskOutcome) -> String {
    let mut out = String::new();
    if let Some(plan) = &outcome.plan {
        out.push_str(&render_plan(plan));
    }
    match &outcome.status {
        TaskStatus::Completed { report } => out.push_str(&render_report(report)),
        TaskStatus::Aborted {
            panel,
            reason,
            partial,
        } => {
            let at = panel.map_or("planning", |panel| panel.name());
            let _ = writeln!(out, "Task {} aborted during {at}: {reason}", outcome.task_id);
            if let Some(report) = partial {
                out.push_str(&render_report(report));
            }
        }
        TaskStatus::Failed { reason } => {
            let _ = writeln!(out, "Task {} failed: {reason}", outcome.task_id);
        }
        TaskStatus::NotAttempted => {
            let _ = writeln!(out, "Task {} not attempted", outcome.task_id);
        }
    }
    out
}

/// One line per catalogue entry, in matching order.
pub fn render_catalogue(patterns: &[QuestionPattern]) -> String {
    let mut out = String::new();
    for (position, entry) in patterns.iter().enumerate() {
        let fallback = match entry.fallback {
            Some(FallbackSpec::Flag(flag)) => flag.to_string(),
            Some(FallbackSpec::Literal(answer)) => format!("always {answer}"),
            None => "NO".to_string(),
        };
        let _ = writeln!(
            out,
            "{:>2}. {:<42} -> {:<46} /{}/",
            position + 1,
            entry.key,
            fallback,
            entry.pattern
        );
    }
    out
}
