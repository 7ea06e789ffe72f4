//! Error types for the interaction layer

use hotwork_core_types::Panel;
use thiserror::Error;

/// Interaction error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// No element matched any locator in the chain
    #[error("Element not found: {0}")]
    LocatorNotFound(String),

    /// A held element reference no longer points at the live form
    #[error("Stale element reference: {0}")]
    StaleReference(String),

    /// Every click method was rejected
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Tab was clicked but never became active
    #[error("Panel '{panel}' did not load within {waited_ms}ms")]
    PanelLoadTimeout { panel: Panel, waited_ms: u64 },

    /// Confirm sequence could not complete
    #[error("Confirm failed on panel '{panel}': {reason}")]
    ConfirmFailed { panel: Panel, reason: String },

    /// Tab could not be located or clicked
    #[error("Navigation to panel '{panel}' failed: {reason}")]
    NavigationFailed { panel: Panel, reason: String },

    /// Transition refused by the tab state machine
    #[error("Transition to {target} refused while {state}")]
    NavigationBlocked { target: String, state: String },

    /// The form (browser session) is gone
    #[error("Session lost: {0}")]
    SessionLost(String),
}

impl InteractionError {
    /// Only a lost session ends the run for the current task.
    pub fn is_fatal(&self) -> bool {
        matches!(self, InteractionError::SessionLost(_))
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, InteractionError::StaleReference(_))
    }
}
