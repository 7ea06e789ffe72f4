use std::collections::BTreeMap;

use hotwork_core_types::{Answer, Panel};
use serde::{Deserialize, Serialize};

use super::dom::Dom;

/// Declarative description of a permit record, as stored in YAML fixtures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFixture {
    pub description: String,
    /// Characteristic chips.
    pub characteristics: Vec<String>,
    /// Lines of a "Características do trabalho" fieldset.
    pub characteristics_fieldset: Vec<String>,
    /// Free-text lines rendered in the record header, e.g.
    /// `Descrição - Solda de suporte`.
    pub record_lines: Vec<String>,
    pub questionnaire: Vec<RowFixture>,
    pub environmental: Vec<RowFixture>,
    pub ppe_radios: Vec<RowFixture>,
    pub ppe_categories: BTreeMap<String, Vec<String>>,
    pub safety_analysis: Vec<RowFixture>,
    /// Show a message box after every confirm.
    pub confirm_dialog: bool,
    pub layout: RowLayout,
    pub checklist_layout: ChecklistLayout,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowLayout {
    #[default]
    Cards,
    Table,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistLayout {
    #[default]
    Table,
    LabelFor,
    LabelSibling,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowFixture {
    pub ordinal: String,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<Answer>,
    /// Labels carry `for` pointing at their radio.
    pub label_for: bool,
    /// Radios carry the option text as `value`.
    pub values: bool,
}

impl Default for RowFixture {
    fn default() -> Self {
        Self {
            ordinal: String::new(),
            text: String::new(),
            options: vec!["Sim".into(), "Não".into(), "N/A".into()],
            selected: None,
            label_for: true,
            values: true,
        }
    }
}

impl RowFixture {
    pub fn new(ordinal: &str, text: &str) -> Self {
        Self {
            ordinal: ordinal.to_string(),
            text: text.to_string(),
            ..Self::default()
        }
    }
}

/// Container id of each panel's content.
pub(crate) fn container_id(panel: Panel) -> &'static str {
    match panel {
        Panel::Questionnaire => "QPT",
        Panel::EnvironmentalAnalysis => "AMB",
        Panel::PpeRadios | Panel::PpeCategories => "EPI",
        Panel::SafetyAnalysis => "APN1",
    }
}

const TABS: [(Panel, &str); 4] = [
    (Panel::Questionnaire, "app-questionario-pt"),
    (Panel::EnvironmentalAnalysis, "app-analise-ambiental"),
    (Panel::PpeRadios, "app-epi"),
    (Panel::SafetyAnalysis, "app-apn1"),
];

pub(crate) struct BuiltForm {
    pub dom: Dom,
    pub confirm_button: usize,
    pub message_box: usize,
}

pub(crate) fn build(fixture: &FormFixture) -> BuiltForm {
    let mut dom = Dom::new();

    let data = dom.add(Dom::ROOT, "app-dados-da-etapa");
    let description = dom.add(data, "textarea");
    dom.set_attr(description, "formcontrolname", "descricao")
        .set_attr(description, "value", &fixture.description);
    let tags = dom.add(data, "app-input-caracteristicas");
    for tag in &fixture.characteristics {
        let span = dom.add_text(tags, "span", tag);
        dom.set_attr(span, "class", "nomecaracteristica");
    }
    if !fixture.characteristics_fieldset.is_empty() {
        let set = dom.add(data, "fieldset");
        dom.add_text(set, "legend", "Características do trabalho");
        for line in &fixture.characteristics_fieldset {
            dom.add_text(set, "div", line);
        }
    }
    for line in &fixture.record_lines {
        dom.add_text(data, "p", line);
    }

    let strip = dom.add(Dom::ROOT, "app-tabs");
    let list = dom.add(strip, "ul");
    dom.set_attr(list, "class", "nav tabAplat");
    for (panel, _) in TABS {
        let item = dom.add(list, "li");
        let link = dom.add_text(item, "a", panel.tab_label());
        dom.set_attr(link, "role", "tab")
            .set_attr(link, "data-panel", container_id(panel));
    }

    for (panel, tag) in TABS {
        let container = dom.add(Dom::ROOT, tag);
        dom.set_attr(container, "id", container_id(panel));
        dom.set_hidden(container, true);
        match panel {
            Panel::Questionnaire => {
                add_rows(&mut dom, container, "QPT", &fixture.questionnaire, fixture.layout)
            }
            Panel::EnvironmentalAnalysis => {
                add_rows(&mut dom, container, "AMB", &fixture.environmental, fixture.layout)
            }
            Panel::SafetyAnalysis => {
                add_rows(&mut dom, container, "APN1", &fixture.safety_analysis, fixture.layout)
            }
            Panel::PpeRadios | Panel::PpeCategories => {
                let extra = dom.add(container, "div");
                dom.set_attr(extra, "class", "epi-adicional");
                add_rows(&mut dom, extra, "EPI", &fixture.ppe_radios, fixture.layout);
                add_checklist(&mut dom, container, &fixture.ppe_categories, fixture.checklist_layout);
            }
        }
    }

    let footer = dom.add(Dom::ROOT, "app-botoes-etapa");
    let confirm_button = dom.add_text(footer, "button", "Confirmar");
    dom.add_text(footer, "button", "Fechar");

    let message_box = dom.add(Dom::ROOT, "app-messagebox");
    dom.add_text(message_box, "p", "Dados salvos");
    dom.add_text(message_box, "button", "Ok");
    dom.set_hidden(message_box, true);

    BuiltForm {
        dom,
        confirm_button,
        message_box,
    }
}

fn add_rows(dom: &mut Dom, parent: usize, prefix: &str, rows: &[RowFixture], layout: RowLayout) {
    let table = match layout {
        RowLayout::Cards => parent,
        RowLayout::Table => dom.add(parent, "table"),
    };
    for (index, row) in rows.iter().enumerate() {
        let group = format!("{prefix}_{}", index + 1);
        let (element, cell) = match layout {
            RowLayout::Cards => ("div", "div"),
            RowLayout::Table => ("tr", "td"),
        };
        let row_node = dom.add(table, element);
        dom.set_attr(row_node, "class", "row");
        if layout == RowLayout::Cards {
            dom.set_attr(row_node, "id", &format!("questao_{group}"));
        }
        if !row.ordinal.is_empty() {
            let ordinal = dom.add_text(row_node, cell, &row.ordinal);
            dom.set_attr(ordinal, "class", "ordem");
        }
        let question = dom.add_text(row_node, cell, &row.text);
        dom.set_attr(question, "class", "pergunta");

        let options = dom.add(row_node, cell);
        dom.set_attr(options, "class", "opcoes");
        for (position, option) in row.options.iter().enumerate() {
            let span = dom.add(options, "span");
            let radio = dom.add(span, "input");
            let radio_id = format!("{group}_{}", position + 1);
            dom.set_attr(radio, "type", "radio")
                .set_attr(radio, "name", &group)
                .set_attr(radio, "id", &radio_id)
                .set_attr(radio, "data-option", option);
            if row.values {
                dom.set_attr(radio, "value", option);
            }
            if row.selected.is_some() && row.selected == Answer::parse(option) {
                if let Some(node) = dom.node_mut(radio) {
                    node.checked = true;
                }
            }
            let label = dom.add_text(span, "label", option);
            if row.label_for {
                dom.set_attr(label, "for", &radio_id);
            }
        }
    }
}

fn add_checklist(
    dom: &mut Dom,
    parent: usize,
    categories: &BTreeMap<String, Vec<String>>,
    layout: ChecklistLayout,
) {
    let mut counter = 0;
    for (category, items) in categories {
        let section = dom.add(parent, "div");
        dom.set_attr(section, "class", "categoria");
        dom.add_text(section, "h5", category);
        let table = match layout {
            ChecklistLayout::Table => Some(dom.add(section, "table")),
            _ => None,
        };
        for item in items {
            counter += 1;
            let checkbox_id = format!("epi_{counter}");
            match table {
                Some(table) => {
                    let tr = dom.add(table, "tr");
                    let cell = dom.add(tr, "td");
                    let checkbox = dom.add(cell, "input");
                    dom.set_attr(checkbox, "type", "checkbox")
                        .set_attr(checkbox, "id", &checkbox_id)
                        .set_attr(checkbox, "data-item", item);
                    dom.add_text(tr, "td", item);
                }
                None => {
                    let holder = dom.add(section, "div");
                    let checkbox = dom.add(holder, "input");
                    dom.set_attr(checkbox, "type", "checkbox")
                        .set_attr(checkbox, "id", &checkbox_id)
                        .set_attr(checkbox, "data-item", item);
                    let label = dom.add_text(holder, "label", item);
                    if layout == ChecklistLayout::LabelFor {
                        dom.set_attr(label, "for", &checkbox_id);
                    }
                }
            }
        }
    }
}
