//! Shared primitives for the hot-work permit filler.
//!
//! Everything here is plain data: the three-valued [`Answer`], the hazard
//! flag map, panel identities, questions discovered on screen and the text
//! normalizer every matcher runs through.

pub mod answer;
pub mod flags;
pub mod normalize;
pub mod panel;
pub mod question;
pub mod task;

use thiserror::Error;

pub use answer::Answer;
pub use flags::HazardFlags;
pub use normalize::{normalize_text, truncate_chars};
pub use panel::Panel;
pub use question::{extract_ordinal, AnswerKey, QuestionItem};
pub use task::{TaskId, TaskText};

/// Shared error type for values parsed from configuration or the screen.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("unrecognized answer: {0:?}")]
    UnrecognizedAnswer(String),
    #[error("unknown panel: {0:?}")]
    UnknownPanel(String),
}
