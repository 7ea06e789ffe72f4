//! Question rows: indexing, location and option marking.
//!
//! Rows are indexed once per panel load. A row is located by ordinal first
//! and by free-text hint second. When an element goes stale the index is
//! rebuilt once and the single operation retried once; a second failure is
//! returned to the caller.

use std::collections::BTreeMap;

use hotwork_core_types::{extract_ordinal, normalize_text, Answer, AnswerKey};
use serde::Serialize;
use tracing::{debug, warn};

use crate::click::ClickChain;
use crate::errors::InteractionError;
use crate::ports::{ElementHandle, UiSurface};
use crate::query::Locator;
use crate::selectors;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionRow {
    pub element: ElementHandle,
    /// Empty when the row shows no three-digit number.
    pub ordinal: String,
    pub text: String,
    pub normalized_text: String,
}

#[derive(Clone, Debug, Default)]
pub struct RowIndex {
    rows: Vec<QuestionRow>,
    by_ordinal: BTreeMap<String, usize>,
}

impl RowIndex {
    /// Indexes the visible question rows, trying the card layout first.
    pub async fn build(surface: &dyn UiSurface) -> Result<Self, InteractionError> {
        Self::build_from(surface, &selectors::question_rows()).await
    }

    /// Indexes the rows found by the first locator that matches any.
    pub async fn build_from(
        surface: &dyn UiSurface,
        locators: &[Locator],
    ) -> Result<Self, InteractionError> {
        let mut elements = Vec::new();
        for locator in locators {
            elements = locator.resolve(surface).await?;
            if !elements.is_empty() {
                debug!(locator = %locator, rows = elements.len(), "question rows found");
                break;
            }
        }

        let mut index = RowIndex::default();
        for element in elements {
            let row = read_row(surface, element).await?;
            if !row.ordinal.is_empty() {
                index
                    .by_ordinal
                    .entry(row.ordinal.clone())
                    .or_insert(index.rows.len());
            }
            index.rows.push(row);
        }
        debug!(
            rows = index.rows.len(),
            ordinals = index.by_ordinal.len(),
            "row index built"
        );
        Ok(index)
    }

    pub fn rows(&self) -> &[QuestionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn by_ordinal(&self, ordinal: &str) -> Option<&QuestionRow> {
        self.by_ordinal.get(ordinal).map(|idx| &self.rows[*idx])
    }

    /// First row whose text contains the hint, both sides normalized.
    pub fn by_hint(&self, hint: &str) -> Option<&QuestionRow> {
        let needle = normalize_text(hint);
        if needle.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .find(|row| row.normalized_text.contains(&needle))
    }

    pub fn locate(&self, target: &RowTarget) -> Option<&QuestionRow> {
        match target {
            RowTarget::Key(key) => {
                if let Some(ordinal) = key.ordinal.as_deref() {
                    if let Some(row) = self.by_ordinal(ordinal) {
                        return Some(row);
                    }
                    if !key.hint.is_empty() {
                        warn!(key = %key.raw, "ordinal not on screen; falling back to hint");
                    }
                }
                self.by_hint(&key.hint)
            }
            RowTarget::Ordinal(ordinal) => self.by_ordinal(ordinal),
            RowTarget::Position(position) => self.rows.get(*position),
        }
    }
}

async fn read_row(
    surface: &dyn UiSurface,
    element: ElementHandle,
) -> Result<QuestionRow, InteractionError> {
    let row_text = surface.read_text(element).await?;

    let mut ordinal = None;
    if let Some(cell) = surface
        .find_within(element, &selectors::row_ordinal())
        .await?
        .first()
    {
        ordinal = extract_ordinal(&surface.read_text(*cell).await?);
    }
    let ordinal = ordinal.or_else(|| extract_ordinal(&row_text)).unwrap_or_default();

    let text = match surface
        .find_within(element, &selectors::row_question())
        .await?
        .first()
    {
        Some(cell) => surface.read_text(*cell).await?,
        None => row_text,
    };
    let text = text.trim().to_string();
    Ok(QuestionRow {
        element,
        ordinal,
        normalized_text: normalize_text(&text),
        text,
    })
}

/// How a row is addressed when applying an answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowTarget {
    /// Rule key: ordinal first, hint second.
    Key(AnswerKey),
    Ordinal(String),
    Position(usize),
}

impl RowTarget {
    pub fn describe(&self) -> String {
        match self {
            RowTarget::Key(key) => key.raw.clone(),
            RowTarget::Ordinal(ordinal) => ordinal.clone(),
            RowTarget::Position(position) => format!("#{}", position + 1),
        }
    }
}

/// Orders rule keys for application: one entry per ordinal, ascending,
/// then hint-only keys in key order. An explicit `001` key wins over any
/// `Q001...` key for the same row; among the others the first key wins.
/// Blank keys are dropped.
pub fn ordered_targets(answers: &BTreeMap<String, Answer>) -> Vec<(AnswerKey, Answer)> {
    let mut by_ordinal: BTreeMap<String, (AnswerKey, Answer)> = BTreeMap::new();
    let mut hint_only = Vec::new();
    for (raw, answer) in answers {
        let Some(key) = AnswerKey::parse(raw) else {
            warn!(key = %raw, "skipping blank answer key");
            continue;
        };
        let Some(ordinal) = key.ordinal.clone() else {
            hint_only.push((key, *answer));
            continue;
        };
        match by_ordinal.get(&ordinal) {
            Some((kept, _)) if kept.explicit || !key.explicit => {
                debug!(key = %raw, kept = %kept.raw, "row already addressed; key ignored");
            }
            _ => {
                by_ordinal.insert(ordinal, (key, *answer));
            }
        }
    }
    let mut targets: Vec<_> = by_ordinal.into_values().collect();
    targets.extend(hint_only);
    targets
}

/// Option-marking strategies, tried in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionStrategy {
    /// Label whose text is the answer, bound to its radio with `for`.
    LabelFor,
    /// Radio whose `value` reads as the answer.
    RadioByValue,
    /// Radio by position: YES first, NO second, N/A last.
    RadioByPosition,
}

impl OptionStrategy {
    pub fn fallback_chain() -> [OptionStrategy; 3] {
        [
            OptionStrategy::LabelFor,
            OptionStrategy::RadioByValue,
            OptionStrategy::RadioByPosition,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkOutcome {
    AlreadySelected,
    Marked(OptionStrategy),
}

/// Selects `answer` in the row. Already-selected options are left alone.
pub async fn mark_row_answer(
    surface: &dyn UiSurface,
    row: ElementHandle,
    answer: Answer,
    chain: &ClickChain,
) -> Result<MarkOutcome, InteractionError> {
    for strategy in OptionStrategy::fallback_chain() {
        match try_strategy(surface, row, answer, chain, strategy).await {
            Ok(Some(outcome)) => {
                if strategy != OptionStrategy::LabelFor {
                    warn!(?strategy, answer = %answer, "option marked by fallback strategy");
                }
                return Ok(outcome);
            }
            Ok(None) => {}
            Err(err) if err.is_fatal() || err.is_stale() => return Err(err),
            Err(err) => debug!(?strategy, error = %err, "option strategy failed"),
        }
    }
    Err(InteractionError::LocatorNotFound(format!(
        "no option '{}' in row",
        answer.label()
    )))
}

async fn try_strategy(
    surface: &dyn UiSurface,
    row: ElementHandle,
    answer: Answer,
    chain: &ClickChain,
    strategy: OptionStrategy,
) -> Result<Option<MarkOutcome>, InteractionError> {
    match strategy {
        OptionStrategy::LabelFor => {
            let labels = surface
                .find_within(row, &selectors::label().has_attr("for"))
                .await?;
            for label in labels {
                let text = surface.read_text(label).await?;
                if Answer::parse(&text) != Some(answer) {
                    continue;
                }
                let Some(target_id) = surface.attribute(label, "for").await? else {
                    continue;
                };
                let radio = surface
                    .find_within(row, &selectors::radio().id(&target_id))
                    .await?
                    .first()
                    .copied();
                if let Some(radio) = radio {
                    if surface.is_selected(radio).await? {
                        return Ok(Some(MarkOutcome::AlreadySelected));
                    }
                }
                chain.activate(surface, label).await?;
                return match radio {
                    Some(radio) if !surface.is_selected(radio).await? => Ok(None),
                    _ => Ok(Some(MarkOutcome::Marked(strategy))),
                };
            }
            Ok(None)
        }
        OptionStrategy::RadioByValue => {
            let radios = surface.find_within(row, &selectors::radio()).await?;
            for radio in radios {
                let value = surface.attribute(radio, "value").await?.unwrap_or_default();
                if Answer::parse(&value) == Some(answer) {
                    return select_radio(surface, radio, chain, strategy).await;
                }
            }
            Ok(None)
        }
        OptionStrategy::RadioByPosition => {
            let radios = surface.find_within(row, &selectors::radio()).await?;
            let position = match answer {
                Answer::Yes if !radios.is_empty() => Some(0),
                Answer::No if radios.len() >= 2 => Some(1),
                Answer::NotApplicable if radios.len() >= 3 => Some(radios.len() - 1),
                _ => None,
            };
            match position {
                Some(position) => select_radio(surface, radios[position], chain, strategy).await,
                None => Ok(None),
            }
        }
    }
}

async fn select_radio(
    surface: &dyn UiSurface,
    radio: ElementHandle,
    chain: &ClickChain,
    strategy: OptionStrategy,
) -> Result<Option<MarkOutcome>, InteractionError> {
    if surface.is_selected(radio).await? {
        return Ok(Some(MarkOutcome::AlreadySelected));
    }
    chain.activate(surface, radio).await?;
    if surface.is_selected(radio).await? {
        Ok(Some(MarkOutcome::Marked(strategy)))
    } else {
        Ok(None)
    }
}

/// Reads which answer is currently selected in a row, if any.
pub async fn current_selection(
    surface: &dyn UiSurface,
    row: ElementHandle,
) -> Result<Option<Answer>, InteractionError> {
    let radios = surface.find_within(row, &selectors::radio()).await?;
    let mut selected = None;
    for (position, radio) in radios.iter().enumerate() {
        if surface.is_selected(*radio).await? {
            selected = Some((position, *radio));
            break;
        }
    }
    let Some((position, radio)) = selected else {
        return Ok(None);
    };

    if let Some(value) = surface.attribute(radio, "value").await? {
        if let Some(answer) = Answer::parse(&value) {
            return Ok(Some(answer));
        }
    }
    if let Some(id) = surface.attribute(radio, "id").await? {
        let labels = surface
            .find_within(row, &selectors::label().attr("for", &id))
            .await?;
        if let Some(label) = labels.first() {
            if let Some(answer) = Answer::parse(&surface.read_text(*label).await?) {
                return Ok(Some(answer));
            }
        }
    }
    Ok(match position {
        0 => Some(Answer::Yes),
        1 => Some(Answer::No),
        p if radios.len() >= 3 && p == radios.len() - 1 => Some(Answer::NotApplicable),
        _ => None,
    })
}

/// Applies answers to the rows of the open panel with one-shot stale
/// recovery per operation.
pub struct RowFiller<'a> {
    surface: &'a dyn UiSurface,
    chain: ClickChain,
    locators: Vec<Locator>,
    index: RowIndex,
}

impl<'a> RowFiller<'a> {
    pub async fn load(
        surface: &'a dyn UiSurface,
        chain: ClickChain,
    ) -> Result<RowFiller<'a>, InteractionError> {
        Self::load_from(surface, chain, selectors::question_rows()).await
    }

    /// Indexes rows found through `locators`; reindexing uses them again.
    pub async fn load_from(
        surface: &'a dyn UiSurface,
        chain: ClickChain,
        locators: Vec<Locator>,
    ) -> Result<RowFiller<'a>, InteractionError> {
        let index = RowIndex::build_from(surface, &locators).await?;
        Ok(Self {
            surface,
            chain,
            locators,
            index,
        })
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub async fn reindex(&mut self) -> Result<(), InteractionError> {
        self.index = RowIndex::build_from(self.surface, &self.locators).await?;
        Ok(())
    }

    pub async fn answer(
        &mut self,
        target: &RowTarget,
        answer: Answer,
    ) -> Result<MarkOutcome, InteractionError> {
        match self.try_answer(target, answer).await {
            Err(err) if err.is_stale() => {
                warn!(row = %target.describe(), "stale row; rebuilding index and retrying once");
                self.reindex().await?;
                self.try_answer(target, answer).await
            }
            other => other,
        }
    }

    async fn try_answer(
        &self,
        target: &RowTarget,
        answer: Answer,
    ) -> Result<MarkOutcome, InteractionError> {
        let row = self.index.locate(target).ok_or_else(|| {
            InteractionError::LocatorNotFound(format!("row {}", target.describe()))
        })?;
        mark_row_answer(self.surface, row.element, answer, &self.chain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ordinal_keys_come_first_in_ascending_order() {
        let answers: BTreeMap<String, Answer> = [
            ("CINTO_PARA_QUEDISTA", Answer::Yes),
            ("Q010_LUVA", Answer::No),
            ("002", Answer::Yes),
            ("Q001_CINTO", Answer::No),
        ]
        .into_iter()
        .map(|(key, answer)| (key.to_string(), answer))
        .collect();
        let order: Vec<_> = ordered_targets(&answers)
            .into_iter()
            .map(|(key, _)| key.raw)
            .collect();
        assert_eq!(
            order,
            vec!["Q001_CINTO", "002", "Q010_LUVA", "CINTO_PARA_QUEDISTA"]
        );
    }

    #[test]
    fn explicit_ordinal_wins_over_prefixed_key() {
        let answers: BTreeMap<String, Answer> = [
            ("001", Answer::Yes),
            ("Q001_OUTRA", Answer::No),
            ("Q002_A", Answer::No),
            ("Q002_B", Answer::Yes),
        ]
        .into_iter()
        .map(|(key, answer)| (key.to_string(), answer))
        .collect();
        let targets: Vec<_> = ordered_targets(&answers)
            .into_iter()
            .map(|(key, answer)| (key.raw, answer))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("001".to_string(), Answer::Yes),
                ("Q002_A".to_string(), Answer::No),
            ]
        );
    }

    #[test]
    fn hint_lookup_is_normalized() {
        let index = RowIndex {
            rows: vec![QuestionRow {
                element: ElementHandle { id: 1, generation: 0 },
                ordinal: String::new(),
                text: "Cinto de segurança tipo paraquedista".into(),
                normalized_text: normalize_text("Cinto de segurança tipo paraquedista"),
            }],
            by_ordinal: BTreeMap::new(),
        };
        assert!(index.by_hint("segurança tipo").is_some());
        assert!(index.by_hint("").is_none());
        let key = AnswerKey::parse("Q099_CINTO").unwrap();
        assert!(index.locate(&RowTarget::Key(key)).is_some());
    }
}
