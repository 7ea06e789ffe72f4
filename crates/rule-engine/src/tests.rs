use std::sync::Arc;

use hotwork_core_types::{Answer, Panel, QuestionItem, TaskText};
use pretty_assertions::assert_eq;

use crate::{planner, ResolutionSource, RuleSet};

const RULES: &str = r#"
qpt_base:
  "001": Sim
  "002": Não
  "003_HINT_LOCAL": "N/A"
regras:
  epi_radios_base:
    Q001_CINTO: Não
    Q003_COLETE: Não
    Q006_PROT_FACIAL: Não
bases:
  epis_categoria_base:
    Óculos:
      - ÓCULOS SEGURANÇA CONTRA IMPACTO
      - ÓCULOS AMPLA VISÃO
    Luvas:
      - LUVA DE VAQUETA
apn1_regras:
  respostas:
    espaco_confinado: tem_espaco_confinado
    mergulho: N/A
"#;

fn rules() -> Arc<RuleSet> {
    Arc::new(RuleSet::from_yaml_str(RULES).unwrap())
}

#[test]
fn open_flame_at_height_builds_a_full_plan() {
    let plan = planner(rules())
        .unwrap()
        .build(&TaskText::new("Trabalho com chama aberta em altura", ""), &[]);

    assert!(plan.flags().get("tem_chama"));
    assert!(plan.flags().get("tem_altura"));
    assert!(plan.flags().get("hazard_olhos"));

    let radios = plan.answers(Panel::PpeRadios).unwrap();
    assert_eq!(radios.get("Q001_CINTO"), Some(&Answer::Yes));
    assert_eq!(radios.get("Q003_COLETE"), Some(&Answer::No));
    assert_eq!(radios.get("Q006_PROT_FACIAL"), Some(&Answer::Yes));

    let checklist = plan.ppe_checklist();
    assert_eq!(checklist["Óculos"].len(), 2);
    assert!(checklist["Luvas"].contains("LUVA ARAMIDA"));

    assert_eq!(plan.panels(), Panel::ORDER.to_vec());
}

#[test]
fn text_without_keywords_passes_bases_through() {
    let plan = planner(rules())
        .unwrap()
        .build(&TaskText::new("Inspeção visual de rotina", "área externa"), &[]);

    assert!(plan.flags().raised().is_empty());
    let radios = plan.answers(Panel::PpeRadios).unwrap();
    assert!(radios.values().all(|answer| *answer == Answer::No));
    assert_eq!(
        plan.answers(Panel::Questionnaire).unwrap().get("003_HINT_LOCAL"),
        Some(&Answer::NotApplicable)
    );
    assert_eq!(
        plan.ppe_checklist()["Óculos"].iter().collect::<Vec<_>>(),
        vec!["ÓCULOS SEGURANÇA CONTRA IMPACTO"]
    );
}

#[test]
fn protective_radios_are_forced_down_when_the_hazard_is_absent() {
    let yaml = RULES.replace("Q001_CINTO: Não", "Q001_CINTO: Sim")
        .replace("Q003_COLETE: Não", "Q003_COLETE: Sim")
        .replace("Q006_PROT_FACIAL: Não", "Q006_PROT_FACIAL: Sim");
    let rules = Arc::new(RuleSet::from_yaml_str(&yaml).unwrap());
    let plan = planner(rules)
        .unwrap()
        .build(&TaskText::new("Inspeção visual", ""), &[]);

    let radios = plan.answers(Panel::PpeRadios).unwrap();
    assert_eq!(radios["Q001_CINTO"], Answer::No);
    assert_eq!(radios["Q003_COLETE"], Answer::No);
    assert_eq!(radios["Q006_PROT_FACIAL"], Answer::No);
}

#[test]
fn explicit_and_prefixed_keys_for_one_row_both_reach_the_plan() {
    // The plan keeps the rule keys verbatim; the applier picks one per row.
    let yaml = RULES.replace("\"001\": Sim", "\"001\": Sim\n  Q001_OUTRA: Não");
    let rules = Arc::new(RuleSet::from_yaml_str(&yaml).unwrap());
    let plan = planner(rules).unwrap().build(&TaskText::default(), &[]);
    let answers = plan.answers(Panel::Questionnaire).unwrap();
    assert_eq!(answers["001"], Answer::Yes);
    assert_eq!(answers["Q001_OUTRA"], Answer::No);
}

#[test]
fn safety_questions_follow_all_three_layers() {
    let discovered = vec![
        QuestionItem::new("001", "Trabalho em espaço confinado?"),
        QuestionItem::new("002", "Atividade de mergulho?"),
        QuestionItem::new("003", "Trabalho sobre o mar?"),
        QuestionItem::new("004", "Pergunta que ninguém conhece"),
    ];
    let plan = planner(rules()).unwrap().build(
        &TaskText::new("Reparo dentro de vaso", "sobre o mar"),
        &discovered,
    );

    let sources: Vec<_> = plan
        .dynamic_questions()
        .iter()
        .map(|resolved| (resolved.item.ordinal.as_str(), resolved.answer, resolved.source))
        .collect();
    assert_eq!(
        sources,
        vec![
            ("001", Answer::Yes, ResolutionSource::Override),
            ("002", Answer::NotApplicable, ResolutionSource::Override),
            ("003", Answer::Yes, ResolutionSource::Fallback),
            ("004", Answer::No, ResolutionSource::Unrecognized),
        ]
    );
    assert_eq!(plan.warnings().len(), 1);
    assert!(plan.warnings()[0].contains("004"));
}
