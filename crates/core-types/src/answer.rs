//! Three-valued questionnaire answer.

use std::fmt;
use std::str::FromStr;

use crate::normalize::normalize_text;
use crate::CoreError;

/// Answer to a yes/no/not-applicable question.
///
/// Every comparison goes through [`Answer::parse`], so `"Sim"`, `"yes"`,
/// `"1"` and `"true"` all read as [`Answer::Yes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Answer {
    Yes,
    No,
    NotApplicable,
}

impl Answer {
    /// Reads an answer from free text, accepting the usual synonyms.
    pub fn parse(raw: &str) -> Option<Self> {
        let norm = normalize_text(raw);
        match norm.as_str() {
            "SIM" | "S" | "YES" | "Y" | "TRUE" | "1" => Some(Answer::Yes),
            "NAO" | "N" | "NO" | "FALSE" | "0" => Some(Answer::No),
            "NA" | "N/A" | "N A" | "N.A." | "NAO APLICAVEL" | "NAO SE APLICA"
            | "NOT APPLICABLE" => Some(Answer::NotApplicable),
            _ => None,
        }
    }

    /// YES when the flag is set, NO otherwise.
    pub fn from_flag(value: bool) -> Self {
        if value {
            Answer::Yes
        } else {
            Answer::No
        }
    }

    /// Label as printed on the form.
    pub fn label(&self) -> &'static str {
        match self {
            Answer::Yes => "Sim",
            Answer::No => "Não",
            Answer::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Answer {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Answer::parse(s).ok_or_else(|| CoreError::UnrecognizedAnswer(s.to_string()))
    }
}

#[cfg(feature = "serde-full")]
mod serde_impl {
    use super::Answer;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    /// Shapes an answer can take in YAML: `Sim`, `true`, `1`.
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawAnswer {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    impl Serialize for Answer {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.label())
        }
    }

    impl<'de> Deserialize<'de> for Answer {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match RawAnswer::deserialize(deserializer)? {
                RawAnswer::Bool(value) => Ok(Answer::from_flag(value)),
                RawAnswer::Int(1) => Ok(Answer::Yes),
                RawAnswer::Int(0) => Ok(Answer::No),
                RawAnswer::Int(other) => Err(de::Error::custom(format!(
                    "unrecognized answer: {other}"
                ))),
                RawAnswer::Text(text) => Answer::parse(&text)
                    .ok_or_else(|| de::Error::custom(format!("unrecognized answer: {text:?}"))),
            }
        }
    }
}
