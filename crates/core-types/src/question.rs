//! Questions as they appear on screen and the keys that address them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::answer::Answer;
use crate::normalize::normalize_text;

static ORDINAL_IN_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{3})\b").expect("ordinal pattern compiles"));
static Q_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Q(\d{3})").expect("question prefix pattern compiles"));
static BARE_ORDINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{3})$").expect("bare ordinal pattern compiles"));

/// First standalone three-digit number in `text`.
pub fn extract_ordinal(text: &str) -> Option<String> {
    ORDINAL_IN_TEXT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// A question row discovered on a panel. Transient: valid for one form load.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionItem {
    /// Three-digit sequence number, empty when the row shows none.
    pub ordinal: String,
    pub raw_text: String,
    pub normalized_text: String,
    pub recognized_key: Option<String>,
    pub current_selection: Option<Answer>,
}

impl QuestionItem {
    pub fn new(ordinal: impl Into<String>, raw_text: impl Into<String>) -> Self {
        let raw_text = raw_text.into();
        Self {
            ordinal: ordinal.into().trim().to_string(),
            normalized_text: normalize_text(&raw_text),
            raw_text,
            recognized_key: None,
            current_selection: None,
        }
    }

    pub fn with_selection(mut self, selection: Option<Answer>) -> Self {
        self.current_selection = selection;
        self
    }

    pub fn with_key(mut self, key: Option<String>) -> Self {
        self.recognized_key = key;
        self
    }

    pub fn has_ordinal(&self) -> bool {
        !self.ordinal.is_empty()
    }
}

/// A panel answer key from the rule file, split into its addressing parts.
///
/// | raw            | ordinal | explicit | hint      |
/// |----------------|---------|----------|-----------|
/// | `Q001_CINTO`   | `001`   | no       | `CINTO`   |
/// | `Q001`         | `001`   | no       |           |
/// | `001`          | `001`   | yes      |           |
/// | `CINTO_PARA`   |         | no       | `CINTO PARA` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerKey {
    pub raw: String,
    pub ordinal: Option<String>,
    pub explicit: bool,
    pub hint: String,
}

impl AnswerKey {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let (head, tail) = match trimmed.split_once('_') {
            Some((head, tail)) => (head, tail),
            None => (trimmed, ""),
        };
        let head_upper = head.trim().to_uppercase();
        let tail_hint = tail.trim().replace('_', " ");

        if let Some(caps) = Q_PREFIX.captures(&head_upper) {
            return Some(Self {
                raw: trimmed.to_string(),
                ordinal: caps.get(1).map(|m| m.as_str().to_string()),
                explicit: false,
                hint: tail_hint,
            });
        }
        if let Some(caps) = BARE_ORDINAL.captures(&head_upper) {
            return Some(Self {
                raw: trimmed.to_string(),
                ordinal: caps.get(1).map(|m| m.as_str().to_string()),
                explicit: true,
                hint: tail_hint,
            });
        }
        Some(Self {
            raw: trimmed.to_string(),
            ordinal: None,
            explicit: false,
            hint: trimmed.replace('_', " "),
        })
    }
}
