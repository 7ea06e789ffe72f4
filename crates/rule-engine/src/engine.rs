//! Answer resolution.
//!
//! Static panels start from the rule set's base answers and receive the
//! flag-driven adjustments from [`crate::catalogue`]. Dynamic questions are
//! recognized against the ordered question catalogue and resolved with the
//! precedence override rule, catalogue fallback, then NO.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use hotwork_core_types::{normalize_text, truncate_chars, Answer, HazardFlags, Panel, QuestionItem};
use regex::Regex;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalogue::{
    ChecklistAdjustment, ForcedAnswer, QuestionPattern, PPE_CHECKLIST_ADJUSTMENTS,
    PPE_RADIO_FORCES, QUESTION_PATTERNS,
};
use crate::errors::RuleError;
use crate::ruleset::{OverrideRule, RuleSet};

/// Longest slice of question text quoted in a warning.
pub const WARNING_TEXT_LIMIT: usize = 180;

#[derive(Debug)]
struct CompiledQuestion {
    key: String,
    regex: Regex,
    fallback: Option<OverrideRule>,
}

/// Ordered question catalogue. Recognition returns the first matching entry.
#[derive(Debug)]
pub struct QuestionCatalogue {
    entries: Vec<CompiledQuestion>,
}

impl QuestionCatalogue {
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_patterns(QUESTION_PATTERNS)
    }

    pub fn from_patterns(patterns: &[QuestionPattern]) -> Result<Self, RuleError> {
        Self::compile(patterns.iter().map(|entry| {
            (
                entry.key.to_string(),
                entry.pattern.to_string(),
                entry.fallback.map(OverrideRule::from),
            )
        }))
    }

    pub fn compile(
        entries: impl IntoIterator<Item = (String, String, Option<OverrideRule>)>,
    ) -> Result<Self, RuleError> {
        let mut compiled = Vec::new();
        for (key, pattern, fallback) in entries {
            let regex = Regex::new(&pattern).map_err(|err| RuleError::InvalidPattern {
                key: key.clone(),
                message: err.to_string(),
            })?;
            compiled.push(CompiledQuestion {
                key,
                regex,
                fallback,
            });
        }
        Ok(Self { entries: compiled })
    }

    /// Key of the first entry matching the normalized text.
    pub fn recognize(&self, normalized_text: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.regex.is_match(normalized_text))
            .map(|entry| entry.key.as_str())
    }

    pub fn fallback(&self, key: &str) -> Option<&OverrideRule> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.fallback.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Which layer produced a dynamic answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    Override,
    Fallback,
    Default,
    Unrecognized,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedQuestion {
    pub item: QuestionItem,
    pub answer: Answer,
    pub source: ResolutionSource,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DynamicResolution {
    pub questions: Vec<ResolvedQuestion>,
    pub warnings: Vec<String>,
}

impl DynamicResolution {
    /// Answers keyed by ordinal. Items without an ordinal are keyed by their
    /// 1-based position, zero-padded to three digits.
    pub fn by_ordinal(&self) -> BTreeMap<String, Answer> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, resolved)| (ordinal_or_position(&resolved.item, index), resolved.answer))
            .collect()
    }
}

pub fn ordinal_or_position(item: &QuestionItem, index: usize) -> String {
    if item.has_ordinal() {
        item.ordinal.clone()
    } else {
        format!("{:03}", index + 1)
    }
}

/// Decides answers from hazard flags and rules. Pure; shares its tables.
#[derive(Clone, Debug)]
pub struct AnswerEngine {
    rules: Arc<RuleSet>,
    catalogue: Arc<QuestionCatalogue>,
    radio_forces: &'static [ForcedAnswer],
    checklist_adjustments: &'static [ChecklistAdjustment],
}

impl AnswerEngine {
    pub fn new(rules: Arc<RuleSet>, catalogue: Arc<QuestionCatalogue>) -> Self {
        Self {
            rules,
            catalogue,
            radio_forces: PPE_RADIO_FORCES,
            checklist_adjustments: PPE_CHECKLIST_ADJUSTMENTS,
        }
    }

    pub fn with_adjustments(
        mut self,
        radio_forces: &'static [ForcedAnswer],
        checklist_adjustments: &'static [ChecklistAdjustment],
    ) -> Self {
        self.radio_forces = radio_forces;
        self.checklist_adjustments = checklist_adjustments;
        self
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn catalogue(&self) -> &QuestionCatalogue {
        &self.catalogue
    }

    /// Questionnaire answers come straight from the base set.
    pub fn questionnaire_answers(&self) -> BTreeMap<String, Answer> {
        self.rules.base_answers(Panel::Questionnaire).clone()
    }

    /// PPE radio base with the forced keys set from their flags: YES when
    /// any dependent flag is raised, NO otherwise. Keys the base does not
    /// carry are never introduced.
    pub fn ppe_radio_answers(&self, flags: &HazardFlags) -> BTreeMap<String, Answer> {
        let mut answers = self.rules.base_answers(Panel::PpeRadios).clone();
        for forced in self.radio_forces {
            if let Some(answer) = answers.get_mut(forced.key) {
                *answer = Answer::from_flag(flags.any_of(forced.any_of.iter().copied()));
            }
        }
        answers
    }

    pub fn ppe_checklist(&self, flags: &HazardFlags) -> BTreeMap<String, BTreeSet<String>> {
        let mut checklist = self.rules.category_checklists().clone();
        for adjustment in self.checklist_adjustments {
            match adjustment {
                ChecklistAdjustment::RestrictUnless {
                    category,
                    flag,
                    keep,
                } => {
                    if flags.get(flag) {
                        continue;
                    }
                    checklist.insert(
                        category.to_string(),
                        keep.iter().map(|item| item.to_string()).collect(),
                    );
                }
                ChecklistAdjustment::AddWhen {
                    category,
                    flag,
                    items,
                } => {
                    if flags.get(flag) {
                        checklist
                            .entry(category.to_string())
                            .or_default()
                            .extend(items.iter().map(|item| item.to_string()));
                    }
                }
            }
        }
        checklist
    }

    pub fn environmental_default(&self) -> Answer {
        self.rules.environmental_default()
    }

    /// Key of the first catalogue entry matching the text.
    pub fn recognize(&self, text: &str) -> Option<&str> {
        self.catalogue.recognize(&normalize_text(text))
    }

    /// Resolves one recognized key: override, then fallback, then NO.
    pub fn resolve_key(&self, key: &str, flags: &HazardFlags) -> (Answer, ResolutionSource) {
        if let Some(rule) = self.rules.override_rule(key) {
            return (rule.resolve(flags), ResolutionSource::Override);
        }
        if let Some(rule) = self.catalogue.fallback(key) {
            return (rule.resolve(flags), ResolutionSource::Fallback);
        }
        (Answer::No, ResolutionSource::Default)
    }

    /// Recognizes and answers every discovered question. Unrecognized
    /// questions are answered NO with exactly one warning each.
    pub fn resolve_questions(
        &self,
        flags: &HazardFlags,
        items: &[QuestionItem],
    ) -> DynamicResolution {
        let mut resolution = DynamicResolution::default();
        for (index, item) in items.iter().enumerate() {
            let normalized = if item.normalized_text.is_empty() {
                normalize_text(&item.raw_text)
            } else {
                item.normalized_text.clone()
            };
            let key = self.catalogue.recognize(&normalized).map(str::to_string);
            let (answer, source) = match key.as_deref() {
                Some(key) => self.resolve_key(key, flags),
                None => {
                    let ordinal = ordinal_or_position(item, index);
                    let message = format!(
                        "unrecognized safety-analysis question {ordinal}: {}",
                        truncate_chars(item.raw_text.trim(), WARNING_TEXT_LIMIT)
                    );
                    warn!(ordinal = %ordinal, "unrecognized safety-analysis question; answering NO");
                    resolution.warnings.push(message);
                    (Answer::No, ResolutionSource::Unrecognized)
                }
            };
            info!(
                ordinal = %item.ordinal,
                key = ?key,
                answer = %answer,
                source = ?source,
                "question resolved"
            );
            resolution.questions.push(ResolvedQuestion {
                item: item.clone().with_key(key),
                answer,
                source,
            });
        }
        resolution
    }
}
