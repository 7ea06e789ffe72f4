use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use hotwork_core_types::{Answer, HazardFlags, Panel};
use serde::Serialize;

use crate::catalogue::FallbackSpec;

/// How an override (or a catalogue fallback) produces an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum OverrideRule {
    Literal(Answer),
    Flag(String),
}

impl OverrideRule {
    pub fn resolve(&self, flags: &HazardFlags) -> Answer {
        match self {
            OverrideRule::Literal(answer) => *answer,
            OverrideRule::Flag(name) => Answer::from_flag(flags.get(name)),
        }
    }
}

impl From<FallbackSpec> for OverrideRule {
    fn from(value: FallbackSpec) -> Self {
        match value {
            FallbackSpec::Literal(answer) => OverrideRule::Literal(answer),
            FallbackSpec::Flag(flag) => OverrideRule::Flag(flag.to_string()),
        }
    }
}

/// Operator-maintained answer tables. Read-only once loaded.
#[derive(Clone, Debug, Serialize)]
pub struct RuleSet {
    #[serde(skip)]
    source: Option<PathBuf>,
    base_answers: BTreeMap<Panel, BTreeMap<String, Answer>>,
    category_checklists: BTreeMap<String, BTreeSet<String>>,
    override_rules: BTreeMap<String, OverrideRule>,
    environmental_default: Answer,
}

impl RuleSet {
    /// An empty rule set: no bases, no overrides, environmental default NO.
    pub fn empty() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RuleSetBuilder {
        RuleSetBuilder::default()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Base answers for a static panel. Panels without a base yield an empty map.
    pub fn base_answers(&self, panel: Panel) -> &BTreeMap<String, Answer> {
        static EMPTY: BTreeMap<String, Answer> = BTreeMap::new();
        self.base_answers.get(&panel).unwrap_or(&EMPTY)
    }

    pub fn category_checklists(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.category_checklists
    }

    pub fn override_rule(&self, key: &str) -> Option<&OverrideRule> {
        self.override_rules.get(key)
    }

    pub fn override_rules(&self) -> &BTreeMap<String, OverrideRule> {
        &self.override_rules
    }

    pub fn environmental_default(&self) -> Answer {
        self.environmental_default
    }
}

#[derive(Debug)]
pub struct RuleSetBuilder {
    inner: RuleSet,
}

impl Default for RuleSetBuilder {
    fn default() -> Self {
        Self {
            inner: RuleSet {
                source: None,
                base_answers: BTreeMap::new(),
                category_checklists: BTreeMap::new(),
                override_rules: BTreeMap::new(),
                environmental_default: Answer::No,
            },
        }
    }
}

impl RuleSetBuilder {
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.source = Some(path.into());
        self
    }

    pub fn base_answer(mut self, panel: Panel, key: impl Into<String>, answer: Answer) -> Self {
        self.inner
            .base_answers
            .entry(panel)
            .or_default()
            .insert(key.into(), answer);
        self
    }

    pub fn base_answers(
        mut self,
        panel: Panel,
        answers: impl IntoIterator<Item = (String, Answer)>,
    ) -> Self {
        self.inner
            .base_answers
            .entry(panel)
            .or_default()
            .extend(answers);
        self
    }

    pub fn category<I, S>(mut self, category: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .category_checklists
            .entry(category.into())
            .or_default()
            .extend(items.into_iter().map(Into::into));
        self
    }

    pub fn override_rule(mut self, key: impl Into<String>, rule: OverrideRule) -> Self {
        self.inner.override_rules.insert(key.into(), rule);
        self
    }

    pub fn environmental_default(mut self, answer: Answer) -> Self {
        self.inner.environmental_default = answer;
        self
    }

    pub fn build(self) -> RuleSet {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_base_is_empty() {
        let rules = RuleSet::empty();
        assert!(rules.base_answers(Panel::Questionnaire).is_empty());
        assert_eq!(rules.environmental_default(), Answer::No);
    }

    #[test]
    fn flag_override_reads_the_flag() {
        let mut builder = HazardFlags::builder();
        builder.raise("tem_chama");
        let flags = builder.build();
        assert_eq!(
            OverrideRule::Flag("tem_chama".into()).resolve(&flags),
            Answer::Yes
        );
        assert_eq!(
            OverrideRule::Flag("not_declared".into()).resolve(&flags),
            Answer::No
        );
        assert_eq!(
            OverrideRule::Literal(Answer::NotApplicable).resolve(&flags),
            Answer::NotApplicable
        );
    }
}
