//! Structured element queries.
//!
//! A [`Query`] is a small criteria value rather than a selector string so that
//! in-memory surfaces can evaluate it directly. [`Query::to_xpath`] renders the
//! equivalent XPath for drivers that speak it.

use std::fmt;

use hotwork_core_types::normalize_text;

use crate::errors::InteractionError;
use crate::ports::{ElementHandle, UiSurface};

/// How an attribute value is compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttrOp {
    Equals,
    Contains,
    StartsWith,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrFilter {
    pub name: String,
    pub op: AttrOp,
    pub value: String,
}

impl AttrFilter {
    pub fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Equals => actual == self.value,
            AttrOp::Contains => actual.contains(&self.value),
            AttrOp::StartsWith => actual.starts_with(&self.value),
        }
    }
}

/// Text criteria. Both sides are normalized before comparing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextMatch {
    Exact(String),
    Contains(String),
}

impl TextMatch {
    pub fn matches(&self, text: &str) -> bool {
        let text = normalize_text(text);
        match self {
            TextMatch::Exact(expected) => text == normalize_text(expected),
            TextMatch::Contains(needle) => text.contains(&normalize_text(needle)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    pub tag: Option<String>,
    pub attrs: Vec<AttrFilter>,
    pub text: Option<TextMatch>,
    pub has_descendant: Option<Box<Query>>,
}

impl Query {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::Equals,
            value: value.to_string(),
        });
        self
    }

    pub fn attr_contains(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::Contains,
            value: value.to_string(),
        });
        self
    }

    pub fn attr_starts_with(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrFilter {
            name: name.to_string(),
            op: AttrOp::StartsWith,
            value: value.to_string(),
        });
        self
    }

    pub fn has_attr(self, name: &str) -> Self {
        self.attr_contains(name, "")
    }

    pub fn id(self, value: &str) -> Self {
        self.attr("id", value)
    }

    pub fn class(self, value: &str) -> Self {
        self.attr_contains("class", value)
    }

    pub fn text_exact(mut self, text: &str) -> Self {
        self.text = Some(TextMatch::Exact(text.to_string()));
        self
    }

    pub fn text_contains(mut self, text: &str) -> Self {
        self.text = Some(TextMatch::Contains(text.to_string()));
        self
    }

    pub fn has(mut self, descendant: Query) -> Self {
        self.has_descendant = Some(Box::new(descendant));
        self
    }

    /// Tag comparison, `None` meaning any tag.
    pub fn matches_tag(&self, tag: &str) -> bool {
        self.tag
            .as_deref()
            .map_or(true, |expected| expected.eq_ignore_ascii_case(tag))
    }

    /// Absolute XPath (`//...`).
    pub fn to_xpath(&self) -> String {
        format!("//{}", self.step())
    }

    /// XPath relative to a context node (`.//...`).
    pub fn to_relative_xpath(&self) -> String {
        format!(".//{}", self.step())
    }

    fn step(&self) -> String {
        let mut out = self.tag.clone().unwrap_or_else(|| "*".to_string());
        for filter in &self.attrs {
            let value = xpath_literal(&filter.value);
            let predicate = match filter.op {
                AttrOp::Equals => format!("@{}={}", filter.name, value),
                AttrOp::Contains if filter.value.is_empty() => format!("@{}", filter.name),
                AttrOp::Contains => format!("contains(@{},{})", filter.name, value),
                AttrOp::StartsWith => format!("starts-with(@{},{})", filter.name, value),
            };
            out.push_str(&format!("[{predicate}]"));
        }
        match &self.text {
            Some(TextMatch::Exact(text)) => {
                out.push_str(&format!("[normalize-space()={}]", xpath_literal(text)))
            }
            Some(TextMatch::Contains(text)) => out.push_str(&format!(
                "[contains(normalize-space(),{})]",
                xpath_literal(text)
            )),
            None => {}
        }
        if let Some(descendant) = &self.has_descendant {
            out.push_str(&format!("[{}]", descendant.to_relative_xpath()));
        }
        out
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xpath())
    }
}

/// Quotes a string for XPath 1.0, which has no escape sequences.
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{value}'");
    }
    if !value.contains('"') {
        return format!("\"{value}\"");
    }
    let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// A query optionally restricted to the descendants of a scope element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locator {
    pub scope: Option<Query>,
    pub target: Query,
}

impl Locator {
    pub fn anywhere(target: Query) -> Self {
        Self {
            scope: None,
            target,
        }
    }

    pub fn within(scope: Query, target: Query) -> Self {
        Self {
            scope: Some(scope),
            target,
        }
    }

    /// Every element matching the locator, in document order.
    pub async fn resolve(
        &self,
        surface: &dyn UiSurface,
    ) -> Result<Vec<ElementHandle>, InteractionError> {
        match &self.scope {
            None => surface.find_all(&self.target).await,
            Some(scope) => {
                let mut found = Vec::new();
                for container in surface.find_all(scope).await? {
                    for element in surface.find_within(container, &self.target).await? {
                        if !found.contains(&element) {
                            found.push(element);
                        }
                    }
                }
                Ok(found)
            }
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "{}{}", scope.to_xpath(), &self.target.to_xpath()),
            None => f.write_str(&self.target.to_xpath()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_row_renders_as_xpath() {
        let query = Query::tag("div")
            .attr_starts_with("id", "questao_")
            .has(Query::tag("input").attr("type", "radio"));
        assert_eq!(
            query.to_xpath(),
            "//div[starts-with(@id,'questao_')][.//input[@type='radio']]"
        );
    }

    #[test]
    fn scoped_locator_renders_as_descendant_path() {
        let locator = Locator::within(
            Query::tag("app-botoes-etapa"),
            Query::tag("button").text_exact("Confirmar"),
        );
        assert_eq!(
            locator.to_string(),
            "//app-botoes-etapa//button[normalize-space()='Confirmar']"
        );
    }

    #[test]
    fn literal_with_both_quotes_uses_concat() {
        assert_eq!(xpath_literal("it's"), "\"it's\"");
        assert_eq!(
            xpath_literal(r#"a'b"c"#),
            r#"concat('a', "'", 'b"c')"#
        );
    }

    #[test]
    fn text_match_ignores_accents_and_case() {
        assert!(TextMatch::Exact("Não".into()).matches("  nao "));
        assert!(TextMatch::Contains("luva de raspa".into()).matches("LUVA DE RASPA (PAR)"));
        assert!(!TextMatch::Exact("Sim".into()).matches("Simples"));
    }

    #[test]
    fn attribute_filters() {
        let has_for = AttrFilter {
            name: "for".into(),
            op: AttrOp::Contains,
            value: String::new(),
        };
        assert!(has_for.matches(Some("q1")));
        assert!(!has_for.matches(None));
    }
}
