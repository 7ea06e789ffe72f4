//! Hazard flags derived from the task text.

use std::collections::BTreeMap;

/// Named boolean hazard indicators, immutable once built.
///
/// Unknown names read as `false`.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HazardFlags {
    flags: BTreeMap<String, bool>,
}

impl HazardFlags {
    pub fn builder() -> HazardFlagsBuilder {
        HazardFlagsBuilder::default()
    }

    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn any_of<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().any(|name| self.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Flags in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.flags.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Names of the flags that are set.
    pub fn raised(&self) -> Vec<&str> {
        self.iter()
            .filter_map(|(name, value)| value.then_some(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, bool)> for HazardFlags {
    fn from_iter<T: IntoIterator<Item = (S, bool)>>(iter: T) -> Self {
        let mut builder = HazardFlags::builder();
        for (name, value) in iter {
            let name = name.into();
            if value {
                builder.raise(&name);
            } else {
                builder.declare(&name);
            }
        }
        builder.build()
    }
}

/// Accumulates flags; a raised flag can never be lowered again.
#[derive(Clone, Debug, Default)]
pub struct HazardFlagsBuilder {
    flags: BTreeMap<String, bool>,
}

impl HazardFlagsBuilder {
    /// Registers the flag as `false` unless it is already present.
    pub fn declare(&mut self, name: &str) -> &mut Self {
        self.flags.entry(name.to_string()).or_insert(false);
        self
    }

    pub fn raise(&mut self, name: &str) -> &mut Self {
        self.flags.insert(name.to_string(), true);
        self
    }

    pub fn set(&mut self, name: &str, value: bool) -> &mut Self {
        if value {
            self.raise(name)
        } else {
            self.declare(name)
        }
    }

    pub fn get(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn build(self) -> HazardFlags {
        HazardFlags { flags: self.flags }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raised_flag_stays_raised() {
        let mut builder = HazardFlags::builder();
        builder.raise("tem_chama").set("tem_chama", false).declare("tem_chama");
        let flags = builder.build();
        assert!(flags.get("tem_chama"));
    }

    #[test]
    fn unknown_flag_reads_false() {
        let flags: HazardFlags = [("tem_altura", true), ("tem_h2s", false)]
            .into_iter()
            .collect();
        assert!(flags.get("tem_altura"));
        assert!(!flags.get("tem_h2s"));
        assert!(!flags.get("tem_mergulho"));
        assert!(flags.contains("tem_h2s"));
        assert_eq!(flags.raised(), vec!["tem_altura"]);
        assert!(flags.any_of(["tem_h2s", "tem_altura"]));
    }
}
