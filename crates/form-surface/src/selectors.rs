//! Element queries for the permit form.

use hotwork_core_types::Panel;

use crate::query::{Locator, Query};

pub const CONFIRM_LABEL: &str = "Confirmar";
pub const DIALOG_OK_LABEL: &str = "Ok";

/// Radio input.
pub fn radio() -> Query {
    Query::tag("input").attr("type", "radio")
}

pub fn checkbox() -> Query {
    Query::tag("input").attr("type", "checkbox")
}

pub fn label() -> Query {
    Query::tag("label")
}

/// Tab links for a panel, most specific first.
pub fn tab_link(panel: Panel) -> Vec<Locator> {
    let link = Query::tag("a").text_exact(panel.tab_label());
    vec![
        Locator::within(Query::tag("app-tabs"), link.clone()),
        Locator::anywhere(link),
    ]
}

/// Elements whose presence shows a panel's content was rendered.
pub fn ready_markers(panel: Panel) -> Vec<Locator> {
    let queries = match panel {
        Panel::Questionnaire => vec![
            Query::tag("app-questionario-pt"),
            Query::tag("app-questionario"),
            Query::tag("div").attr_contains("id", "question"),
        ],
        Panel::EnvironmentalAnalysis => vec![
            Query::tag("app-analise-ambiental"),
            Query::tag("app-analiseambiental"),
            Query::tag("div").id("AMB"),
        ],
        Panel::PpeRadios | Panel::PpeCategories => vec![
            Query::tag("app-epi"),
            Query::tag("div").id("EPI"),
        ],
        Panel::SafetyAnalysis => vec![
            Query::tag("app-apn1"),
            Query::tag("div").id("APN1"),
            radio(),
        ],
    };
    queries.into_iter().map(Locator::anywhere).collect()
}

pub fn confirm_buttons() -> Vec<Locator> {
    let button = Query::tag("button").text_exact(CONFIRM_LABEL);
    vec![
        Locator::within(Query::tag("app-botoes-etapa"), button.clone()),
        Locator::anywhere(button),
    ]
}

pub fn dialog_ok_buttons() -> Vec<Locator> {
    let button = Query::tag("button").text_exact(DIALOG_OK_LABEL);
    vec![
        Locator::within(Query::tag("app-messagebox"), button.clone()),
        Locator::anywhere(button),
    ]
}

fn card_row() -> Query {
    Query::tag("div")
        .attr_starts_with("id", "questao_")
        .has(radio())
}

fn table_row() -> Query {
    Query::tag("tr").has(radio())
}

/// Question rows: card layout first, table rows as the fallback.
pub fn question_rows() -> Vec<Locator> {
    vec![Locator::anywhere(card_row()), Locator::anywhere(table_row())]
}

/// Safety-analysis rows, scoped to its container before any form row.
pub fn safety_question_rows() -> Vec<Locator> {
    let containers = [Query::tag("app-apn1"), Query::tag("div").id("APN1")];
    let mut locators = Vec::new();
    for row in [card_row(), table_row()] {
        for container in &containers {
            locators.push(Locator::within(container.clone(), row.clone()));
        }
    }
    locators.extend(question_rows());
    locators
}

/// Ordinal cell inside a question row.
pub fn row_ordinal() -> Query {
    Query::any().class("ordem")
}

/// Question text cell inside a question row.
pub fn row_question() -> Query {
    Query::any().class("pergunta")
}

pub const CHARACTERISTICS_HEADING: &str = "Características do trabalho";

/// Description inputs, most specific first.
pub fn description_fields() -> Vec<Locator> {
    let by_control = Query::tag("textarea").attr_contains("formcontrolname", "descr");
    let labelled = Query::tag("div").has(label().text_contains("Descrição"));
    vec![
        Locator::within(Query::tag("app-dados-da-etapa"), by_control.clone()),
        Locator::anywhere(by_control),
        Locator::anywhere(Query::tag("textarea").attr_contains("name", "descr")),
        Locator::within(labelled.clone(), Query::tag("textarea")),
        Locator::within(labelled, Query::tag("input")),
    ]
}

/// Header block of the record, read as text when no field matches.
pub fn record_container() -> Query {
    Query::tag("app-dados-da-etapa")
}

pub fn characteristics_fieldset() -> Query {
    Query::tag("fieldset").text_contains(CHARACTERISTICS_HEADING)
}

pub fn characteristic_items() -> Locator {
    Locator::within(
        Query::tag("app-input-caracteristicas"),
        Query::tag("span").attr("class", "nomecaracteristica"),
    )
}

/// Table rows whose cell mentions the checklist item.
pub fn checklist_row(item: &str) -> Query {
    Query::tag("tr").has(Query::tag("td").text_contains(item))
}

pub fn label_mentioning(item: &str) -> Query {
    label().text_contains(item)
}
