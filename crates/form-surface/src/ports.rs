use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::InteractionError;
use crate::query::Query;

/// Reference to an element of the live form.
///
/// `generation` changes whenever the surface re-renders the element; a
/// handle with an old generation yields [`InteractionError::StaleReference`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub id: u64,
    pub generation: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Ways of activating an element, from the most user-like to the most forced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickMethod {
    /// Pointer moves to the element and double-activates it.
    PointerDouble,
    /// The element's own click.
    Direct,
    /// Script-dispatched click that ignores overlays.
    Forced,
}

impl ClickMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ClickMethod::PointerDouble => "pointer-double",
            ClickMethod::Direct => "direct",
            ClickMethod::Forced => "forced",
        }
    }
}

/// Port to the form being filled. A browser driver implements it in
/// production; [`crate::memory::MemoryForm`] implements it in memory.
#[async_trait]
pub trait UiSurface: Send + Sync {
    /// Visible elements matching the query, in document order.
    async fn find_all(&self, query: &Query) -> Result<Vec<ElementHandle>, InteractionError>;

    /// Visible descendants of `scope` matching the query.
    async fn find_within(
        &self,
        scope: ElementHandle,
        query: &Query,
    ) -> Result<Vec<ElementHandle>, InteractionError>;

    async fn parent(
        &self,
        element: ElementHandle,
    ) -> Result<Option<ElementHandle>, InteractionError>;

    async fn click(
        &self,
        element: ElementHandle,
        method: ClickMethod,
    ) -> Result<(), InteractionError>;

    /// Checked state of a radio or checkbox.
    async fn is_selected(&self, element: ElementHandle) -> Result<bool, InteractionError>;

    async fn is_displayed(&self, element: ElementHandle) -> Result<bool, InteractionError>;

    /// Rendered text of the element and its descendants.
    async fn read_text(&self, element: ElementHandle) -> Result<String, InteractionError>;

    async fn attribute(
        &self,
        element: ElementHandle,
        name: &str,
    ) -> Result<Option<String>, InteractionError>;

    async fn scroll_into_view(&self, element: ElementHandle) -> Result<(), InteractionError>;

    async fn bounding_box(&self, element: ElementHandle)
        -> Result<Option<Rect>, InteractionError>;
}
