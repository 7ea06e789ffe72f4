//! Built-in keyword tables.
//!
//! The tables are plain data so they can be audited and extended without
//! touching the matching code. Every pattern runs against text that already
//! went through [`hotwork_core_types::normalize_text`], so patterns are written
//! in upper case without accents.

use hotwork_core_types::Answer;

/// A hazard flag raised when its pattern matches the task text.
#[derive(Clone, Copy, Debug)]
pub struct FlagPattern {
    pub flag: &'static str,
    pub pattern: &'static str,
}

/// A flag computed from other flags once the keyword scan is done.
#[derive(Clone, Copy, Debug)]
pub struct DerivedFlag {
    pub flag: &'static str,
    pub any_of: &'static [&'static str],
}

/// What a recognized question falls back to when no override rule names it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackSpec {
    /// Answer with the value of a hazard flag.
    Flag(&'static str),
    /// Answer with a fixed value.
    Literal(Answer),
}

/// One entry of the ordered question catalogue. The first match wins.
#[derive(Clone, Copy, Debug)]
pub struct QuestionPattern {
    pub key: &'static str,
    pub pattern: &'static str,
    pub fallback: Option<FallbackSpec>,
}

pub const FLAG_PATTERNS: &[FlagPattern] = &[
    FlagPattern {
        flag: "tem_espaco_confinado",
        pattern: r"\b(ESPACO CONFINADO|INTERIOR DE|DENTRO DE|TANQUE|VASO|CALDEIRA)\b",
    },
    FlagPattern {
        flag: "tem_altura",
        pattern: r"\b(EM ALTURA|NR\s*-?\s*35|ACIMA DE 2\s*M)\b",
    },
    FlagPattern {
        flag: "tem_acesso_cordas",
        pattern: r"\b(ACESSO POR CORDAS|TRABALHO POR CORDAS|ALPINISMO INDUSTRIAL)\b",
    },
    FlagPattern {
        flag: "tem_sobre_o_mar",
        pattern: r"\bSOBRE O MAR\b",
    },
    FlagPattern {
        flag: "tem_chama",
        pattern: r"\b(CHAMA ABERTA|OXICORTE|MACARICO|SOLDA|SOLDAGEM|CORTE|ESMERIL)\b",
    },
    FlagPattern {
        flag: "tem_trat_mec",
        pattern: r"\b(TRATAMENTO MECANICO|TRAT\.?\s*MEC)\b",
    },
    FlagPattern {
        flag: "tem_lixadeira",
        pattern: r"\b(ESMERILHADEIRA|ESMERIL|LIXADEIRA|POLITRIZ|DESBASTE)\b",
    },
    FlagPattern {
        flag: "tem_hidrojato",
        pattern: r"\b(HIDROJATEAMENTO|HIDRO ?JATO|JATO DE AGUA)\b",
    },
    FlagPattern {
        flag: "tem_partes_moveis",
        pattern: r"\b(PARTES MOVEIS|EIXO GIRANDO|CORREIA|ENGRENAGEM)\b",
    },
    FlagPattern {
        flag: "tem_pressurizado",
        pattern: r"\b(PRESSURIZAD\w*|PRESSAO|ABERTURA DE LINHA|ABERTURA DE EQUIPAMENTO)\b",
    },
    FlagPattern {
        flag: "tem_eletricidade",
        pattern: r"\b(ELETRIC\w*|ENERGIZAD\w*|PAINEL|QUADRO ELETRICO|ARCO ELETRICO)\b",
    },
    FlagPattern {
        flag: "tem_h2s",
        pattern: r"\b(H2S|SULFETO DE HIDROGENIO)\b",
    },
    FlagPattern {
        flag: "tem_radiacao",
        pattern: r"\bRADIACAO IONIZANTE\b",
    },
    FlagPattern {
        flag: "tem_mergulho",
        pattern: r"\bMERGULHO\b",
    },
    FlagPattern {
        flag: "tem_temperatura_extrema",
        pattern: r"\b(TEMPERATURA EXTREMA|SUPERFICIE QUENTE|PROTECAO TERMICA|FRIO EXTREMO|CRIOGENIC\w*)\b",
    },
    FlagPattern {
        flag: "tem_intervencao_controle_ou_protecao_paineis",
        pattern: r"\b(CIRCUITO DE CONTROLE|CIRCUITO DE PROTECAO|PAINEL ELETRIC\w*|PAINEIS ELETRIC\w*)\b",
    },
    FlagPattern {
        flag: "tem_intervencao_nobreak_cc_critico",
        pattern: r"\b(NO-?BREAK|CORRENTE CONTINUA|CC CRITIC\w*|DC CRITIC\w*)\b",
    },
    FlagPattern {
        flag: "tem_interferencia_outras_areas",
        pattern: r"\b(INTERFERIR NA SEGURANCA OPERACIONAL|OUTRAS AREAS)\b",
    },
    FlagPattern {
        flag: "tem_centelha_faisca_estatica",
        pattern: r"\b(CENTELH\w*|FAISC\w*|ESTATICA)\b",
    },
    FlagPattern {
        flag: "tem_produtos_quimicos",
        pattern: r"\b(PRODUTOS QUIMICOS|SUBSTANCIA CORROSIVA|TOXIC\w*|ASFIXIANTE)\b",
    },
    FlagPattern {
        flag: "tem_co2",
        pattern: r"\b(CO2|DIOXIDO DE CARBONO)\b",
    },
    FlagPattern {
        flag: "tem_sci_indisp",
        pattern: r"\b(INDISPONIBILIDADE.*COMBATE A INCENDIO|PROVOCANDO SUA INDISPONIBILIDADE)\b",
    },
];

pub const DERIVED_FLAGS: &[DerivedFlag] = &[DerivedFlag {
    flag: "hazard_olhos",
    any_of: &["tem_chama", "tem_trat_mec", "tem_lixadeira"],
}];

pub const QUESTION_PATTERNS: &[QuestionPattern] = &[
    QuestionPattern {
        key: "alteracao_condicoes_operacionais",
        pattern: r"ALTERACAO.*CONDICOES OPERACIONAIS|PARADA DE SISTEMAS DE SEGURANCA|PROVOCAR EMERGENCIA",
        fallback: Some(FallbackSpec::Literal(Answer::No)),
    },
    QuestionPattern {
        key: "temperatura_extrema",
        pattern: r"TEMPERATURA EXTREMA|PROTECAO TERMICA",
        fallback: Some(FallbackSpec::Flag("tem_temperatura_extrema")),
    },
    QuestionPattern {
        key: "intervencao_controle_ou_protecao_paineis",
        pattern: r"INTERVENCAO EM CIRCUITO DE CONTROLE|CIRCUITO DE PROTECAO.*PAINEIS ELETRIC",
        fallback: Some(FallbackSpec::Flag(
            "tem_intervencao_controle_ou_protecao_paineis",
        )),
    },
    QuestionPattern {
        key: "intervencao_nobreak_cc_critico",
        pattern: r"NO-?BREAK|CORRENTE CONTINUA CRITIC",
        fallback: Some(FallbackSpec::Flag("tem_intervencao_nobreak_cc_critico")),
    },
    QuestionPattern {
        key: "interfere_outras_areas",
        pattern: r"INTERFERIR NA SEGURANCA OPERACIONAL DE OUTRAS AREAS",
        fallback: Some(FallbackSpec::Flag("tem_interferencia_outras_areas")),
    },
    QuestionPattern {
        key: "espaco_confinado",
        pattern: r"ESPACO CONFINADO",
        fallback: Some(FallbackSpec::Flag("tem_espaco_confinado")),
    },
    QuestionPattern {
        key: "altura_nr35",
        pattern: r"NR-?35|TRABALHO EM ALTURA|ACIMA DE 2 ?M",
        fallback: Some(FallbackSpec::Flag("tem_altura")),
    },
    QuestionPattern {
        key: "sobre_o_mar",
        pattern: r"SOBRE O MAR",
        fallback: Some(FallbackSpec::Flag("tem_sobre_o_mar")),
    },
    QuestionPattern {
        key: "risco_h2s",
        pattern: r"\bH2S\b",
        fallback: Some(FallbackSpec::Flag("tem_h2s")),
    },
    QuestionPattern {
        key: "chama_aberta_area_classificada",
        pattern: r"CHAMA ABERTA|SOLDA|SOLDAGEM|CORTE|ESMERIL",
        fallback: Some(FallbackSpec::Flag("tem_chama")),
    },
    QuestionPattern {
        key: "risco_centelha_faisca_estatica",
        pattern: r"CENTELH|FAISC|ELETRICIDADE ESTATICA",
        fallback: Some(FallbackSpec::Flag("tem_centelha_faisca_estatica")),
    },
    QuestionPattern {
        key: "radiacao_ionizante",
        pattern: r"RADIACAO IONIZANTE",
        fallback: Some(FallbackSpec::Flag("tem_radiacao")),
    },
    QuestionPattern {
        key: "abertura_linha_pressurizado",
        pattern: r"ABERTURA DE EQUIPAMENTO|ABERTURA DE LINHA|PRESSURIZAD",
        fallback: Some(FallbackSpec::Flag("tem_pressurizado")),
    },
    QuestionPattern {
        key: "choque_ou_arco_eletrico",
        pattern: r"CHOQUE ELETRICO|ARCO ELETRICO|TRABALHO ENERGIZADO",
        fallback: Some(FallbackSpec::Flag("tem_eletricidade")),
    },
    QuestionPattern {
        key: "partes_moveis",
        pattern: r"PARTES MOVEIS",
        fallback: Some(FallbackSpec::Flag("tem_partes_moveis")),
    },
    QuestionPattern {
        key: "produtos_quimicos",
        pattern: r"PRODUTOS QUIMICOS|SUBSTANCIA CORROSIVA|TOXIC|ASFIXIANTE",
        fallback: Some(FallbackSpec::Flag("tem_produtos_quimicos")),
    },
    QuestionPattern {
        key: "mergulho",
        pattern: r"MERGULHO",
        fallback: Some(FallbackSpec::Flag("tem_mergulho")),
    },
    QuestionPattern {
        key: "hidrojateamento",
        pattern: r"HIDROJATEAMENTO|HIDROJATO",
        fallback: Some(FallbackSpec::Flag("tem_hidrojato")),
    },
    QuestionPattern {
        key: "combate_incendio_co2",
        pattern: r"COMBATE A INCENDIO.*CO2|PROTEGID[OA]S? POR CO2",
        fallback: Some(FallbackSpec::Flag("tem_co2")),
    },
    QuestionPattern {
        key: "combate_incendio_indisponibilidade",
        pattern: r"PROVOCANDO SUA INDISPONIBILIDADE|INDISPONIBILIDADE.*AREAS PROTEGIDAS",
        fallback: Some(FallbackSpec::Flag("tem_sci_indisp")),
    },
];

/// PPE radio answers forced to YES when any of the listed flags is raised.
/// Keys missing from the base set are left alone.
#[derive(Clone, Copy, Debug)]
pub struct ForcedAnswer {
    pub key: &'static str,
    pub any_of: &'static [&'static str],
}

pub const PPE_RADIO_FORCES: &[ForcedAnswer] = &[
    ForcedAnswer {
        key: "Q001_CINTO",
        any_of: &["tem_altura", "tem_acesso_cordas", "tem_sobre_o_mar"],
    },
    ForcedAnswer {
        key: "Q003_COLETE",
        any_of: &["tem_sobre_o_mar"],
    },
    ForcedAnswer {
        key: "Q006_PROT_FACIAL",
        any_of: &["hazard_olhos"],
    },
];

/// Adjustments to the PPE checklist driven by hazard flags.
#[derive(Clone, Copy, Debug)]
pub enum ChecklistAdjustment {
    /// While `flag` is lowered, `category` holds only `keep`, created if absent.
    /// While `flag` is lowered, an existing `category` keeps only `keep`.
    RestrictUnless {
        category: &'static str,
        flag: &'static str,
        keep: &'static [&'static str],
    },
    /// While `flag` is raised, `items` are added to `category`.
    AddWhen {
        category: &'static str,
        flag: &'static str,
        items: &'static [&'static str],
    },
}

pub const PPE_CHECKLIST_ADJUSTMENTS: &[ChecklistAdjustment] = &[
    ChecklistAdjustment::RestrictUnless {
        category: "Óculos",
        flag: "hazard_olhos",
        keep: &["ÓCULOS SEGURANÇA CONTRA IMPACTO"],
    },
    ChecklistAdjustment::AddWhen {
        category: "Luvas",
        flag: "tem_chama",
        items: &["LUVA ARAMIDA", "LUVA DE RASPA"],
    },
    ChecklistAdjustment::AddWhen {
        category: "Corpo",
        flag: "tem_hidrojato",
        items: &["AVENTAL / ROUPA IMPERMEÁVEL (HIDROJATO)"],
    },
];
