#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use hotwork_core_types::TaskText;
use hotwork_form_surface::memory::{FormFixture, MemoryForm, RowFixture};
use hotwork_form_surface::InteractionPolicy;
use hotwork_plan_applier::PlanApplier;
use hotwork_rule_engine::{planner, Plan, RuleSet};

pub const RULES: &str = r#"
qpt_base:
  "001": Sim
  "002": Não
  Q003_EXTINTOR: "N/A"
epi_radios_base:
  Q001_CINTO: Não
  Q003_COLETE: Não
  Q006_PROT_FACIAL: Não
epis_categoria_base:
  Óculos:
    - ÓCULOS SEGURANÇA CONTRA IMPACTO
    - ÓCULOS AMPLA VISÃO
  Luvas:
    - LUVA DE VAQUETA
apn1_regras:
  respostas:
    espaco_confinado: tem_espaco_confinado
analise_ambiental_padrao: "N/A"
"#;

pub fn rules() -> Arc<RuleSet> {
    Arc::new(RuleSet::from_yaml_str(RULES).unwrap())
}

pub fn fixture() -> FormFixture {
    FormFixture {
        description: "Trabalho com chama aberta em altura".into(),
        characteristics: vec!["TRABALHO A QUENTE".into()],
        questionnaire: vec![
            RowFixture::new("001", "Existe permissão de trabalho emitida?"),
            RowFixture::new("002", "Há isolamento elétrico?"),
            RowFixture::new("003", "Extintor disponível no local?"),
        ],
        environmental: vec![
            RowFixture::new("001", "Geração de resíduos?"),
            RowFixture::new("002", "Emissão de ruído?"),
        ],
        ppe_radios: vec![
            RowFixture::new("001", "Cinto de segurança tipo paraquedista"),
            RowFixture::new("003", "Colete salva-vidas"),
            RowFixture::new("006", "Protetor facial"),
        ],
        ppe_categories: BTreeMap::from([
            (
                "Luvas".to_string(),
                vec![
                    "LUVA ARAMIDA".to_string(),
                    "LUVA DE RASPA".to_string(),
                    "LUVA DE VAQUETA".to_string(),
                ],
            ),
            (
                "Óculos".to_string(),
                vec![
                    "ÓCULOS AMPLA VISÃO".to_string(),
                    "ÓCULOS SEGURANÇA CONTRA IMPACTO".to_string(),
                ],
            ),
        ]),
        safety_analysis: vec![
            RowFixture::new("001", "Haverá trabalho em altura acima de 2 m (NR-35)?"),
            RowFixture::new("002", "Haverá entrada em espaço confinado?"),
            RowFixture::new("003", "Pergunta sem padrão conhecido"),
        ],
        ..FormFixture::default()
    }
}

pub fn form() -> MemoryForm {
    MemoryForm::from_fixture(&fixture())
}

/// Builds the plan and an applier sharing its engine.
pub fn prepare(rules: Arc<RuleSet>, task: &TaskText) -> (Plan, PlanApplier) {
    let builder = planner(rules).unwrap();
    let plan = builder.build(task, &[]);
    let applier = PlanApplier::new(builder.engine().clone(), InteractionPolicy::default());
    (plan, applier)
}

pub fn task() -> TaskText {
    TaskText::new("Trabalho com chama aberta em altura", "TRABALHO A QUENTE")
}
