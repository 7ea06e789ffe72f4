//! PPE checklist items.

use serde::Serialize;
use tracing::debug;

use crate::click::ClickChain;
use crate::errors::InteractionError;
use crate::ports::{ElementHandle, UiSurface};
use crate::selectors;

/// Ways of finding the checkbox for an item, tried in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistStrategy {
    /// Table row with a cell mentioning the item.
    TableRow,
    /// Label mentioning the item, bound with `for`.
    LabelFor,
    /// Label mentioning the item next to a checkbox in the same parent.
    LabelSibling,
}

impl ChecklistStrategy {
    pub fn fallback_chain() -> [ChecklistStrategy; 3] {
        [
            ChecklistStrategy::TableRow,
            ChecklistStrategy::LabelFor,
            ChecklistStrategy::LabelSibling,
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    AlreadyChecked,
    Checked(ChecklistStrategy),
}

/// Checks the item's checkbox. Checked boxes are left alone and nothing is
/// ever unchecked.
pub async fn check_item(
    surface: &dyn UiSurface,
    item: &str,
    chain: &ClickChain,
) -> Result<CheckOutcome, InteractionError> {
    for strategy in ChecklistStrategy::fallback_chain() {
        let checkbox = match find_checkbox(surface, item, strategy).await {
            Ok(Some(checkbox)) => checkbox,
            Ok(None) => continue,
            Err(err) if err.is_fatal() || err.is_stale() => return Err(err),
            Err(err) => {
                debug!(?strategy, error = %err, "checklist lookup failed");
                continue;
            }
        };
        if surface.is_selected(checkbox).await? {
            return Ok(CheckOutcome::AlreadyChecked);
        }
        match chain.activate(surface, checkbox).await {
            Ok(_) => {}
            Err(err) if err.is_fatal() || err.is_stale() => return Err(err),
            Err(err) => {
                debug!(?strategy, error = %err, "checkbox did not accept the click");
                continue;
            }
        }
        if surface.is_selected(checkbox).await? {
            return Ok(CheckOutcome::Checked(strategy));
        }
    }
    Err(InteractionError::LocatorNotFound(format!(
        "checklist item '{item}'"
    )))
}

async fn find_checkbox(
    surface: &dyn UiSurface,
    item: &str,
    strategy: ChecklistStrategy,
) -> Result<Option<ElementHandle>, InteractionError> {
    match strategy {
        ChecklistStrategy::TableRow => {
            for row in surface.find_all(&selectors::checklist_row(item)).await? {
                if let Some(checkbox) = surface
                    .find_within(row, &selectors::checkbox())
                    .await?
                    .first()
                {
                    return Ok(Some(*checkbox));
                }
            }
            Ok(None)
        }
        ChecklistStrategy::LabelFor => {
            let labels = surface
                .find_all(&selectors::label_mentioning(item).has_attr("for"))
                .await?;
            for label in labels {
                let Some(target) = surface.attribute(label, "for").await? else {
                    continue;
                };
                if let Some(checkbox) = surface
                    .find_all(&selectors::checkbox().id(&target))
                    .await?
                    .first()
                {
                    return Ok(Some(*checkbox));
                }
            }
            Ok(None)
        }
        ChecklistStrategy::LabelSibling => {
            for label in surface.find_all(&selectors::label_mentioning(item)).await? {
                let Some(parent) = surface.parent(label).await? else {
                    continue;
                };
                if let Some(checkbox) = surface
                    .find_within(parent, &selectors::checkbox())
                    .await?
                    .first()
                {
                    return Ok(Some(*checkbox));
                }
            }
            Ok(None)
        }
    }
}
