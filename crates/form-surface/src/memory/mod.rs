//! In-memory permit form used by the simulator and the tests.

mod dom;
mod fixture;
mod form;

pub use fixture::{ChecklistLayout, FormFixture, RowFixture, RowLayout};
pub use form::{FormEvent, MemoryForm};
