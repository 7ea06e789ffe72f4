use std::fmt;

/// Identifier of one permit record (the step number typed into the search).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free text describing the planned work, as read from the record.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TaskText {
    pub description: String,
    pub characteristics: String,
}

impl TaskText {
    pub fn new(description: impl Into<String>, characteristics: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            characteristics: characteristics.into(),
        }
    }

    /// Description and characteristics joined by one space, unnormalized.
    pub fn combined(&self) -> String {
        format!("{} {}", self.description, self.characteristics)
    }

    pub fn is_empty(&self) -> bool {
        self.description.trim().is_empty() && self.characteristics.trim().is_empty()
    }
}
