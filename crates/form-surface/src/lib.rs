//! Form interaction layer for the hot-work permit record.
//!
//! Everything here talks to the form through the [`UiSurface`] port:
//! - structured queries and locator chains ([`query`], [`selectors`])
//! - click fallback chains and bounded waits ([`click`], [`wait`])
//! - the tab state machine with its confirm sequence ([`tabs`])
//! - question rows with one-shot stale recovery ([`rows`])
//! - PPE checklist items ([`checklist`])
//!
//! [`memory::MemoryForm`] is an in-memory surface driven by YAML fixtures.

pub mod checklist;
pub mod click;
pub mod discover;
pub mod errors;
pub mod memory;
pub mod policy;
pub mod ports;
pub mod query;
pub mod rows;
pub mod selectors;
pub mod tabs;
pub mod wait;

pub use checklist::{check_item, CheckOutcome, ChecklistStrategy};
pub use click::ClickChain;
pub use discover::{collect_questions, read_task_text, wait_for_options};
pub use errors::InteractionError;
pub use memory::{FormEvent, FormFixture, MemoryForm, RowFixture};
pub use policy::{InteractionPolicy, InteractionTimeouts};
pub use ports::{ClickMethod, ElementHandle, Rect, UiSurface};
pub use query::{Locator, Query};
pub use rows::{
    current_selection, mark_row_answer, ordered_targets, MarkOutcome, OptionStrategy,
    QuestionRow, RowFiller, RowIndex, RowTarget,
};
pub use tabs::{is_tab_active, TabNavigator, TabState};
