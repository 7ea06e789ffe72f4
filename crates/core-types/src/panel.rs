//! Form tabs the filler works on.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One panel of the permit form.
///
/// The declaration order is the application order: `Ord` on this enum is
/// the fixed panel sequence.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Panel {
    /// Main questionnaire ("Questionário PT").
    Questionnaire,
    /// Environmental analysis, answered with one uniform default.
    EnvironmentalAnalysis,
    /// Additional-PPE radios on the PPE tab.
    PpeRadios,
    /// PPE-by-category checklist on the PPE tab.
    PpeCategories,
    /// Dynamic safety analysis ("APN-1").
    SafetyAnalysis,
}

impl Panel {
    pub const ORDER: [Panel; 5] = [
        Panel::Questionnaire,
        Panel::EnvironmentalAnalysis,
        Panel::PpeRadios,
        Panel::PpeCategories,
        Panel::SafetyAnalysis,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Panel::Questionnaire => "questionnaire",
            Panel::EnvironmentalAnalysis => "environmental_analysis",
            Panel::PpeRadios => "ppe_radios",
            Panel::PpeCategories => "ppe_categories",
            Panel::SafetyAnalysis => "safety_analysis",
        }
    }

    /// Visible label of the tab that hosts this panel. Both PPE panels
    /// live on the same tab.
    pub fn tab_label(&self) -> &'static str {
        match self {
            Panel::Questionnaire => "Questionário PT",
            Panel::EnvironmentalAnalysis => "Análise Ambiental",
            Panel::PpeRadios | Panel::PpeCategories => "EPI",
            Panel::SafetyAnalysis => "APN-1",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Panel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::ORDER
            .into_iter()
            .find(|panel| panel.name() == s)
            .ok_or_else(|| CoreError::UnknownPanel(s.to_string()))
    }
}
