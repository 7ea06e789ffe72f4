//! Reading the record: task text and the questions currently on screen.

use hotwork_core_types::{QuestionItem, TaskText};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::errors::InteractionError;
use crate::policy::InteractionTimeouts;
use crate::ports::UiSurface;
use crate::query::Locator;
use crate::rows::{current_selection, RowIndex};
use crate::selectors;
use crate::wait::find_first;

static DESCRIPTION_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Descri[cç][aã]o\s*-\s*(.*?)(?:\n\s*\n|\n[A-ZÀ-Ú]|$)")
        .expect("description block pattern compiles")
});
static CHARACTERISTICS_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)Caracter[ií]sticas do trabalho\s*-\s*(.*?)(?:\n\s*\n|\n[A-ZÀ-Ú]|$)")
        .expect("characteristics block pattern compiles")
});
static DECORATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{25b6}\u{25c0}\u{25b2}\u{25bc}•\-\u{2013}\u{2014}]")
        .expect("decoration pattern compiles")
});

/// Collects the safety-analysis question rows on screen with their
/// current selection. Rows inside the safety-analysis container are
/// preferred; any visible form row is the fallback. Recognition is left to
/// the caller.
pub async fn collect_questions(
    surface: &dyn UiSurface,
) -> Result<Vec<QuestionItem>, InteractionError> {
    let index = RowIndex::build_from(surface, &selectors::safety_question_rows()).await?;
    let mut items = Vec::with_capacity(index.len());
    for row in index.rows() {
        let selection = current_selection(surface, row.element).await?;
        items.push(QuestionItem::new(row.ordinal.clone(), row.text.clone()).with_selection(selection));
    }
    debug!(questions = items.len(), "questions collected");
    Ok(items)
}

/// Waits until any radio is present, returning whether one appeared.
pub async fn wait_for_options(
    surface: &dyn UiSurface,
    timeouts: &InteractionTimeouts,
) -> Result<bool, InteractionError> {
    let radios = [Locator::anywhere(selectors::radio())];
    Ok(find_first(surface, &radios, timeouts.radio_wait(), timeouts.poll_interval())
        .await?
        .is_some())
}

/// Reads the task description and the characteristics.
///
/// Missing fields read as empty text; the caller decides whether an empty
/// task is acceptable.
pub async fn read_task_text(
    surface: &dyn UiSurface,
    timeouts: &InteractionTimeouts,
) -> Result<TaskText, InteractionError> {
    let record = find_first(
        surface,
        &[Locator::anywhere(selectors::record_container())],
        timeouts.locate(timeouts.marker()),
        timeouts.poll_interval(),
    )
    .await?;
    let header = match record {
        Some(record) => surface.read_text(record).await?,
        None => String::new(),
    };

    let description = read_description(surface, &header).await?;
    if description.is_empty() {
        warn!("no task description found");
    }
    let characteristics = read_characteristics(surface, &header).await?;
    if characteristics.is_empty() {
        warn!("no work characteristics found");
    }
    Ok(TaskText::new(description, characteristics))
}

async fn read_description(
    surface: &dyn UiSurface,
    header: &str,
) -> Result<String, InteractionError> {
    for locator in selectors::description_fields() {
        let Some(field) = locator.resolve(surface).await?.first().copied() else {
            continue;
        };
        let mut value = surface
            .attribute(field, "value")
            .await?
            .unwrap_or_default()
            .trim()
            .to_string();
        if value.is_empty() {
            value = surface.read_text(field).await?.trim().to_string();
        }
        if !value.is_empty() {
            debug!(locator = %locator, "description read from field");
            return Ok(value);
        }
    }

    let block = DESCRIPTION_BLOCK
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| collapse(&DECORATION.replace_all(m.as_str(), " ")))
        .unwrap_or_default();
    if !block.is_empty() {
        debug!("description read from record header");
    }
    Ok(block)
}

async fn read_characteristics(
    surface: &dyn UiSurface,
    header: &str,
) -> Result<String, InteractionError> {
    let mut tags: Vec<String> = Vec::new();
    for element in selectors::characteristic_items().resolve(surface).await? {
        push_unique(&mut tags, surface.read_text(element).await?.trim());
    }
    if !tags.is_empty() {
        return Ok(tags.join(", "));
    }

    if let Some(fieldset) = surface
        .find_all(&selectors::characteristics_fieldset())
        .await?
        .first()
    {
        let text = surface.read_text(*fieldset).await?;
        for line in text.lines() {
            if line.contains(selectors::CHARACTERISTICS_HEADING) {
                continue;
            }
            push_unique(&mut tags, line.trim());
        }
        if !tags.is_empty() {
            debug!("characteristics read from fieldset");
            return Ok(tags.join(", "));
        }
    }

    if let Some(block) = CHARACTERISTICS_BLOCK
        .captures(header)
        .and_then(|caps| caps.get(1))
    {
        let cleaned = DECORATION.replace_all(block.as_str(), " ");
        for line in cleaned.lines() {
            push_unique(&mut tags, line.trim());
        }
        if !tags.is_empty() {
            debug!("characteristics read from record header");
        }
    }
    Ok(tags.join(", "))
}

fn push_unique(tags: &mut Vec<String>, text: &str) {
    if !text.is_empty() && !tags.iter().any(|tag| tag == text) {
        tags.push(text.to_string());
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
