use std::collections::HashSet;

use hotwork_core_types::{normalize_text, HazardFlags, TaskText};
use regex::Regex;
use tracing::debug;

use crate::catalogue::{DerivedFlag, FlagPattern, DERIVED_FLAGS, FLAG_PATTERNS};
use crate::errors::RuleError;

#[derive(Debug)]
struct CompiledFlag {
    flag: String,
    regex: Regex,
}

#[derive(Debug, Clone)]
struct CompiledDerived {
    flag: String,
    any_of: Vec<String>,
}

/// Turns free task text into a complete [`HazardFlags`] map.
///
/// Every flag of the table is present in the output; the ones whose pattern
/// did not match are `false`. Derived flags are evaluated after the keyword
/// scan, in table order, so a derived flag may depend on an earlier one.
#[derive(Debug)]
pub struct ContextExtractor {
    flags: Vec<CompiledFlag>,
    derived: Vec<CompiledDerived>,
}

impl ContextExtractor {
    /// Extractor over the built-in keyword table.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_tables(FLAG_PATTERNS, DERIVED_FLAGS)
    }

    pub fn from_tables(
        patterns: &[FlagPattern],
        derived: &[DerivedFlag],
    ) -> Result<Self, RuleError> {
        let pairs = patterns
            .iter()
            .map(|entry| (entry.flag.to_string(), entry.pattern.to_string()));
        let derived = derived.iter().map(|entry| {
            (
                entry.flag.to_string(),
                entry.any_of.iter().map(|flag| flag.to_string()).collect(),
            )
        });
        Self::compile(pairs, derived)
    }

    /// Builds an extractor from owned `(flag, pattern)` and
    /// `(flag, any_of)` pairs.
    pub fn compile(
        patterns: impl IntoIterator<Item = (String, String)>,
        derived: impl IntoIterator<Item = (String, Vec<String>)>,
    ) -> Result<Self, RuleError> {
        let mut flags = Vec::new();
        let mut known = HashSet::new();
        for (flag, pattern) in patterns {
            let regex = Regex::new(&pattern).map_err(|err| RuleError::InvalidPattern {
                key: flag.clone(),
                message: err.to_string(),
            })?;
            known.insert(flag.clone());
            flags.push(CompiledFlag { flag, regex });
        }

        let mut compiled_derived = Vec::new();
        for (flag, any_of) in derived {
            if let Some(missing) = any_of.iter().find(|dep| !known.contains(dep.as_str())) {
                return Err(RuleError::InvalidCatalogue(format!(
                    "derived flag {flag} depends on unknown flag {missing}"
                )));
            }
            known.insert(flag.clone());
            compiled_derived.push(CompiledDerived { flag, any_of });
        }

        Ok(Self {
            flags,
            derived: compiled_derived,
        })
    }

    /// Flag names in declaration order, derived flags last.
    pub fn flag_names(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .map(|entry| entry.flag.as_str())
            .chain(self.derived.iter().map(|entry| entry.flag.as_str()))
    }

    pub fn extract(&self, task: &TaskText) -> HazardFlags {
        self.extract_text(&task.combined())
    }

    /// Scans already-joined task text. The text is normalized here.
    pub fn extract_text(&self, text: &str) -> HazardFlags {
        let normalized = normalize_text(text);
        let mut builder = HazardFlags::builder();
        for entry in &self.flags {
            builder.set(&entry.flag, entry.regex.is_match(&normalized));
        }
        for entry in &self.derived {
            let value = entry.any_of.iter().any(|dep| builder.get(dep));
            builder.set(&entry.flag, value);
        }
        let flags = builder.build();
        debug!(raised = ?flags.raised(), "hazard flags extracted");
        flags
    }
}
