use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use hotwork_core_types::{Answer, Panel};
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::RuleError;
use crate::ruleset::{OverrideRule, RuleSet, RuleSetBuilder};

/// Sections may sit at the top level or inside one of these containers.
const CONTAINERS: &[&str] = &["regras", "bases"];

const QUESTIONNAIRE_BASE: &str = "qpt_base";
const PPE_RADIOS_BASE: &str = "epi_radios_base";
const PPE_CATEGORIES_BASE: &str = "epis_categoria_base";
const SAFETY_RULES: &str = "apn1_regras";
const SAFETY_ANSWERS: &str = "respostas";
const ENVIRONMENTAL_DEFAULT: &str = "analise_ambiental_padrao";

impl RuleSet {
    /// Reads a YAML rule file.
    pub fn load(path: &Path) -> Result<RuleSet, RuleError> {
        let content = fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => RuleError::NotFound {
                path: path.display().to_string(),
            },
            _ => RuleError::Io {
                path: path.display().to_string(),
                message: err.to_string(),
            },
        })?;
        let rules = parse_rules(&content, Some(path))?;
        debug!(path = %path.display(), "rule file loaded");
        Ok(rules)
    }

    pub fn from_yaml_str(content: &str) -> Result<RuleSet, RuleError> {
        parse_rules(content, None)
    }
}

fn parse_rules(content: &str, source: Option<&Path>) -> Result<RuleSet, RuleError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|err| RuleError::Invalid(format!("{}", err)))?;
    let root =
        serde_json::to_value(yaml_value).map_err(|err| RuleError::Invalid(format!("{}", err)))?;

    let mut builder = RuleSet::builder();
    if let Some(path) = source {
        builder = builder.source(path);
    }

    match &root {
        Value::Null => return Ok(builder.build()),
        Value::Object(_) => {}
        _ => {
            return Err(RuleError::Invalid(
                "top level of the rule file must be a mapping".into(),
            ))
        }
    }

    builder = read_answer_base(builder, &root, QUESTIONNAIRE_BASE, Panel::Questionnaire)?;
    builder = read_answer_base(builder, &root, PPE_RADIOS_BASE, Panel::PpeRadios)?;
    builder = read_categories(builder, &root)?;
    builder = read_overrides(builder, &root)?;

    if let Some((value, path)) = first_present(&root, ENVIRONMENTAL_DEFAULT) {
        if !value.is_null() {
            builder = builder.environmental_default(answer_from_value(value, &path)?);
        }
    }

    Ok(builder.build())
}

/// Looks a section up at the top level, then in each container.
fn first_present<'a>(root: &'a Value, key: &str) -> Option<(&'a Value, String)> {
    if let Some(value) = root.get(key) {
        return Some((value, key.to_string()));
    }
    CONTAINERS.iter().find_map(|container| {
        root.get(*container)
            .and_then(|inner| inner.get(key))
            .map(|value| (value, format!("{container}.{key}")))
    })
}

fn section_map<'a>(
    root: &'a Value,
    key: &str,
) -> Option<(&'a serde_json::Map<String, Value>, String)> {
    let (value, path) = first_present(root, key)?;
    match value {
        Value::Object(map) => Some((map, path)),
        Value::Null => None,
        _ => {
            warn!(section = %path, "rule section is not a mapping; ignoring it");
            None
        }
    }
}

fn read_answer_base(
    mut builder: RuleSetBuilder,
    root: &Value,
    key: &str,
    panel: Panel,
) -> Result<RuleSetBuilder, RuleError> {
    let Some((map, path)) = section_map(root, key) else {
        return Ok(builder);
    };
    let mut answers = BTreeMap::new();
    for (entry, value) in map {
        let answer = answer_from_value(value, &format!("{path}.{entry}"))?;
        answers.insert(entry.trim().to_string(), answer);
    }
    debug!(section = %path, entries = answers.len(), "answer base read");
    builder = builder.base_answers(panel, answers);
    Ok(builder)
}

fn read_categories(
    mut builder: RuleSetBuilder,
    root: &Value,
) -> Result<RuleSetBuilder, RuleError> {
    let Some((map, path)) = section_map(root, PPE_CATEGORIES_BASE) else {
        return Ok(builder);
    };
    for (category, value) in map {
        let items: BTreeSet<String> = match value {
            Value::Array(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) if !text.trim().is_empty() => {
                        Some(text.trim().to_string())
                    }
                    Value::Null => None,
                    other => {
                        warn!(section = %path, category = %category, item = %other, "skipping non-text checklist item");
                        None
                    }
                })
                .collect(),
            Value::String(text) if !text.trim().is_empty() => {
                std::iter::once(text.trim().to_string()).collect()
            }
            Value::Null => BTreeSet::new(),
            other => {
                return Err(RuleError::InvalidValue {
                    path: format!("{path}.{category}"),
                    message: format!("expected a list of items, got {other}"),
                })
            }
        };
        builder = builder.category(category.trim(), items);
    }
    Ok(builder)
}

fn read_overrides(
    mut builder: RuleSetBuilder,
    root: &Value,
) -> Result<RuleSetBuilder, RuleError> {
    let Some((rules, path)) = section_map(root, SAFETY_RULES) else {
        return Ok(builder);
    };
    let answers = match rules.get(SAFETY_ANSWERS) {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => return Ok(builder),
        Some(_) => {
            warn!(section = %path, "{SAFETY_ANSWERS} is not a mapping; ignoring it");
            return Ok(builder);
        }
    };
    for (key, value) in answers {
        let rule = override_from_value(value, &format!("{path}.{SAFETY_ANSWERS}.{key}"))?;
        builder = builder.override_rule(key.trim(), rule);
    }
    Ok(builder)
}

fn override_from_value(value: &Value, path: &str) -> Result<OverrideRule, RuleError> {
    match value {
        Value::Null => Ok(OverrideRule::Literal(Answer::No)),
        Value::String(text) => match Answer::parse(text) {
            Some(answer) => Ok(OverrideRule::Literal(answer)),
            None if !text.trim().is_empty() => Ok(OverrideRule::Flag(text.trim().to_string())),
            None => Err(RuleError::InvalidValue {
                path: path.to_string(),
                message: "empty override".into(),
            }),
        },
        other => answer_from_value(other, path).map(OverrideRule::Literal),
    }
}

fn answer_from_value(value: &Value, path: &str) -> Result<Answer, RuleError> {
    let parsed = match value {
        Value::Bool(flag) => Some(Answer::from_flag(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(Answer::Yes),
            Some(0) => Some(Answer::No),
            _ => None,
        },
        Value::String(text) => Answer::parse(text),
        _ => None,
    };
    parsed.ok_or_else(|| RuleError::InvalidValue {
        path: path.to_string(),
        message: format!("not an answer: {value}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sections_resolve_from_top_level_then_containers() {
        let rules = RuleSet::from_yaml_str(
            r#"
qpt_base:
  "001": Sim
regras:
  qpt_base:
    "002": Não
bases:
  epi_radios_base:
    Q001_CINTO: "Não"
"#,
        )
        .unwrap();
        let questionnaire = rules.base_answers(Panel::Questionnaire);
        assert_eq!(questionnaire.get("001"), Some(&Answer::Yes));
        assert!(questionnaire.get("002").is_none());
        assert_eq!(
            rules.base_answers(Panel::PpeRadios).get("Q001_CINTO"),
            Some(&Answer::No)
        );
    }

    #[test]
    fn overrides_distinguish_literals_from_flags() {
        let rules = RuleSet::from_yaml_str(
            r#"
apn1_regras:
  respostas:
    espaco_confinado: tem_espaco_confinado
    mergulho: "N/A"
    sobre_o_mar: true
    radiacao_ionizante: ~
"#,
        )
        .unwrap();
        assert_eq!(
            rules.override_rule("espaco_confinado"),
            Some(&OverrideRule::Flag("tem_espaco_confinado".into()))
        );
        assert_eq!(
            rules.override_rule("mergulho"),
            Some(&OverrideRule::Literal(Answer::NotApplicable))
        );
        assert_eq!(
            rules.override_rule("sobre_o_mar"),
            Some(&OverrideRule::Literal(Answer::Yes))
        );
        assert_eq!(
            rules.override_rule("radiacao_ionizante"),
            Some(&OverrideRule::Literal(Answer::No))
        );
    }

    #[test]
    fn categories_accept_lists_and_single_items() {
        let rules = RuleSet::from_yaml_str(
            r#"
epis_categoria_base:
  Luvas: ["LUVA DE VAQUETA", ""]
  Cabeça: CAPACETE
"#,
        )
        .unwrap();
        let categories = rules.category_checklists();
        assert_eq!(categories["Luvas"].len(), 1);
        assert!(categories["Cabeça"].contains("CAPACETE"));
    }

    #[test]
    fn empty_document_is_an_empty_rule_set() {
        let rules = RuleSet::from_yaml_str("").unwrap();
        assert!(rules.override_rules().is_empty());
        assert_eq!(rules.environmental_default(), Answer::No);
    }

    #[test]
    fn environmental_default_can_be_overridden() {
        let rules = RuleSet::from_yaml_str("analise_ambiental_padrao: N/A\n").unwrap();
        assert_eq!(rules.environmental_default(), Answer::NotApplicable);
    }

    #[test]
    fn invalid_base_answer_names_its_path() {
        let err = RuleSet::from_yaml_str("qpt_base:\n  \"001\": talvez\n").unwrap_err();
        match err {
            RuleError::InvalidValue { path, .. } => assert_eq!(path, "qpt_base.001"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn non_mapping_top_level_is_rejected() {
        assert!(matches!(
            RuleSet::from_yaml_str("- a\n- b\n"),
            Err(RuleError::Invalid(_))
        ));
    }

    #[test]
    fn load_reads_from_disk_and_remembers_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("rules.yaml");
        std::fs::write(&file_path, "qpt_base:\n  \"001\": Sim\n").unwrap();
        let rules = RuleSet::load(&file_path).unwrap();
        assert_eq!(rules.source(), Some(file_path.as_path()));

        let missing = RuleSet::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(missing, RuleError::NotFound { .. }));
    }
}
