//! RFM segment offers: per-offer targeting documents and their actions.

use std::collections::HashMap;

use passcheck_ingest::Loaded;
use passcheck_model::{
    Action, ActionsCatalog, CheckResult, ConditionSetting, ControlSetting, Ledger, PromoDocument,
    Reporter, RequirementRow, RequirementTable, SubjectKey, parse_int,
};

use super::common::{index_actions, join_ids, report_index, report_load};
use crate::compare::CompareMode;
use crate::extract::column_parameter;
use crate::index::{Index, KeyOf, int_column, text_column};
use crate::lookup::{Selector, find_award, find_control_setting, find_held_item, show};
use crate::matcher::{ABSENT, Expect, FieldCheck, Matcher, Observed};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "rfm-offers";

/// Season points granted by every offer action.
pub const POINTS_ITEM: i64 = 17909;

const TECHITEM_PREFIX: &str = "techitem";

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub actions: Loaded<ActionsCatalog>,
    /// Targeting documents keyed by offer name.
    pub documents: Vec<(String, Loaded<PromoDocument>)>,
}

pub struct Context {
    offers: Index<String, RequirementRow>,
    /// Parsed `action` cell of every offer that has a readable one.
    action_of: HashMap<String, i64>,
    /// `techitem(<id>)` column and the item it names.
    techitem_column: Option<(String, i64)>,
    actions: Index<i64, Action>,
    documents: HashMap<String, PromoDocument>,
}

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "Offer actions in catalog",
        run: check_presence,
    },
    Phase {
        title: "Offer action awards and price",
        run: check_content,
    },
    Phase {
        title: "RFM targeting documents",
        run: check_documents,
    },
];

pub fn run(inputs: Inputs, reporter: &mut dyn Reporter) -> Ledger {
    let mut recorder = Recorder::new(FEATURE, reporter);
    let context = Context::build(inputs, &mut recorder);
    run_phases(&context, PHASES, &mut recorder);
    recorder.finish()
}

impl Context {
    fn build(inputs: Inputs, recorder: &mut Recorder<'_>) -> Self {
        report_load(recorder, "requirements", &inputs.requirements);
        report_load(recorder, "actions", &inputs.actions);
        let mut documents = HashMap::new();
        for (name, loaded) in inputs.documents {
            report_load(recorder, &format!("RFM document {name}"), &loaded);
            if loaded.is_ok() {
                documents.insert(name, loaded.value);
            }
        }

        let table = inputs.requirements.value;
        let techitem_column = table
            .headers
            .iter()
            .filter(|header| header.starts_with(TECHITEM_PREFIX))
            .find_map(|header| column_parameter(header).map(|(_, id)| (header.clone(), id)));
        if techitem_column.is_none() {
            recorder.info("no techitem(<id>) column in requirements, hasItems checks skipped");
        }

        let offers = Index::build(table.rows, |row| text_column(row, "offer"));
        report_index(recorder, "requirements offer", &offers);
        let mut action_of = HashMap::new();
        for (name, row) in offers.iter() {
            match int_column(row, "action") {
                KeyOf::Key(id) => {
                    action_of.insert(name.clone(), id);
                }
                KeyOf::Blank => recorder.warn(
                    Some(SubjectKey::from(name.as_str())),
                    format!("offer {name} has no action id, its action checks are skipped"),
                ),
                KeyOf::Malformed(raw) => recorder.warn(
                    Some(SubjectKey::from(name.as_str())),
                    format!("offer {name}: action '{raw}' is not an integer, its action checks are skipped"),
                ),
            }
        }
        let actions = index_actions(&inputs.actions.value);
        report_index(recorder, "catalog action", &actions);

        recorder.info(format!(
            "{} offers in requirements, {} catalog actions, {} RFM documents",
            offers.len(),
            actions.len(),
            documents.len()
        ));

        Self {
            offers,
            action_of,
            techitem_column,
            actions,
            documents,
        }
    }

    /// Offers with a readable action id, in requirement order.
    fn offers_with_action(&self) -> impl Iterator<Item = (&String, i64, &RequirementRow)> {
        self.offers
            .iter()
            .filter_map(|(name, row)| self.action_of.get(name).map(|&id| (name, id, row)))
    }
}

fn check_presence(context: &Context, recorder: &mut Recorder<'_>) {
    for (name, id, _) in context.offers_with_action() {
        Matcher::presence(
            recorder,
            &SubjectKey::from(name.as_str()),
            "ACTION_EXISTS",
            format!("action {id} is in the actions catalog"),
            context.actions.contains_key(&id),
        );
    }
}

fn check_content(context: &Context, recorder: &mut Recorder<'_>) {
    for (name, id, row) in context.offers_with_action() {
        let subject = SubjectKey::from(name.as_str());
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "action of offer",
            |recorder, action| {
                let points = find_award(&action.awards, &Selector::Item(POINTS_ITEM));
                let check = FieldCheck::new(
                    "AWARD_POINTS_CHECK",
                    format!("points award count of action {id}"),
                    Expect::cell(row, "award"),
                    points.and_then(|award| show(award.count.as_ref())),
                )
                .mode(CompareMode::Integer)
                .presence(
                    "AWARD_POINTS_PRESENT",
                    format!("action {id} awards item {POINTS_ITEM}"),
                );
                Matcher::evaluate(recorder, &subject, check);

                let cash = find_award(&action.need_resources, &Selector::Kind("cash".into()));
                let check = FieldCheck::new(
                    "PRICE_CHECK",
                    format!("cash price in needResources of action {id}"),
                    Expect::cell(row, "price"),
                    cash.and_then(|resource| show(resource.count.as_ref())),
                )
                .mode(CompareMode::Float)
                .presence(
                    "PRICE_PRESENT",
                    format!("action {id} needs a cash resource"),
                );
                Matcher::evaluate(recorder, &subject, check);
            },
        );
    }
}

fn check_documents(context: &Context, recorder: &mut Recorder<'_>) {
    for (name, row) in context.offers.iter() {
        let subject = SubjectKey::from(name.as_str());
        Matcher::with_record(
            recorder,
            &subject,
            context.documents.get(name),
            "RFM document for offer",
            |recorder, document| {
                if let Some(&id) = context.action_of.get(name) {
                    let listed = document.lists_award(id);
                    recorder.record(
                        CheckResult::new(
                            subject.clone(),
                            "ACTION_IN_AWARDS",
                            format!("action {id} is listed in the document awards"),
                            listed,
                        )
                        .with_values(id.to_string(), join_ids(&document.award_ids())),
                    );
                }
                check_window(recorder, &subject, row, document);
                let (settings, conditions) = match &document.parameters {
                    Some(parameters) => (
                        parameters.control_settings.as_slice(),
                        parameters.settings_by_conditions.as_slice(),
                    ),
                    None => (&[][..], &[][..]),
                };
                check_control_settings(recorder, &subject, row, settings);
                check_segments(recorder, &subject, row, conditions);
                if let Some((column, item_id)) = &context.techitem_column {
                    check_techitem(recorder, &subject, row, conditions, column, *item_id);
                }
            },
        );
    }
}

fn check_window(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    document: &PromoDocument,
) {
    let bounds = [
        ("START_DATE_CHECK", "start date", "start", &document.from),
        ("END_DATE_CHECK", "end date", "end", &document.to),
    ];
    for (tag, label, column, actual) in bounds {
        let check = FieldCheck::new(tag, label, Expect::cell(row, column), actual.clone())
            .mode(CompareMode::Date);
        Matcher::evaluate(recorder, subject, check);
    }
}

/// Display texts: discount badge, points counter, crossed-out price.
fn check_control_settings(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    settings: &[ControlSetting],
) {
    let texts = [
        ("DISCOUNT_CHECK", "discount text", "/discount", "discount"),
        ("COUNT_CHECK", "points counter text", "/count", "award"),
        ("OLD_PRICE_CHECK", "old price text", "/txtCost", "old_price"),
    ];
    for (tag, label, suffix, column) in texts {
        let expected = match (column, row.value(column)) {
            (_, None) => Expect::Blank,
            ("discount", Some(discount)) => Expect::value(format!("-{discount}%")),
            ("award", Some(award)) => Expect::value(format!("x{award}")),
            (_, Some(value)) => Expect::value(value),
        };
        let actual = find_control_setting(settings, suffix)
            .and_then(|setting| show(setting.text_key_fit.as_ref()));
        let check = FieldCheck::new(tag, format!("{label} in controlSettings"), expected, actual)
            .details(format!("displayObject ending with {suffix}"));
        Matcher::evaluate(recorder, subject, check);
    }
}

fn check_segments(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    conditions: &[ConditionSetting],
) {
    let actual = conditions
        .iter()
        .find_map(|setting| setting.conditions.excluded_segments.as_ref())
        .map(|segments| segments.joined());
    let check = FieldCheck::new(
        "SEGMENTS_CHECK",
        "segments in settingsByConditions",
        Expect::cell(row, "segment"),
        actual,
    )
    .mode(CompareMode::IdSet);
    Matcher::evaluate(recorder, subject, check);
}

/// The offer is gated by holding a tech item; the column names the item
/// and holds the required count.
fn check_techitem(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    conditions: &[ConditionSetting],
    column: &str,
    item_id: i64,
) {
    let Some(raw) = row.value(column) else {
        return;
    };
    let expected = match parse_int(raw.trim_end_matches('%')) {
        Ok(count) => count,
        Err(err) => {
            recorder.warn(Some(subject.clone()), format!("{column}: {err}"));
            return;
        }
    };

    let held: Vec<_> = conditions
        .iter()
        .flat_map(|setting| setting.conditions.has_items.iter())
        .collect();
    let item = conditions
        .iter()
        .find_map(|setting| find_held_item(&setting.conditions.has_items, item_id));
    let seen = held
        .iter()
        .filter_map(|item| show(item.item_id.as_ref()))
        .collect::<Vec<_>>();

    let found = item.is_some();
    recorder.record(
        CheckResult::new(
            subject.clone(),
            "TECHITEM_ID_CHECK",
            format!("hasItems holds tech item {item_id}"),
            found,
        )
        .with_values(
            item_id.to_string(),
            if found {
                item_id.to_string()
            } else if seen.is_empty() {
                ABSENT.to_string()
            } else {
                join_ids(&seen)
            },
        ),
    );
    let Some(item) = item else {
        return;
    };
    match show(item.count.as_ref()) {
        Some(count) => {
            let check = FieldCheck::new(
                "TECHITEM_COUNT_CHECK",
                format!("count of tech item {item_id} in hasItems"),
                Expect::value(expected.to_string()),
                Observed::Found(count),
            )
            .mode(CompareMode::Integer);
            Matcher::evaluate(recorder, subject, check);
        }
        None => recorder.warn(
            Some(subject.clone()),
            format!("tech item {item_id} is in hasItems without a count"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{json, table};
    use passcheck_model::NullReporter;

    const ACTIONS: &str = r#"[{"@id": 300,
        "awards": [{"type": "item", "itemId": 17909, "count": 50}],
        "needResources": [{"type": "cash", "count": 4.99}]}]"#;

    const DOCUMENT: &str = r#"{
        "from": "2024-06-01 07:00:00", "to": "2024-06-08 23:59:59",
        "awards": [300],
        "parameters": {
            "controlSettings": [
                {"displayObject": "offer/discount", "textKeyFit": "-40%"},
                {"displayObject": "offer/count", "textKeyFit": "x50"},
                {"displayObject": "offer/txtCost", "textKeyFit": "8.99"}
            ],
            "settingsByConditions": [
                {"conditions": {"isNotInOneOfRFM30Segments": "3,1,2"}},
                {"conditions": {"hasItems": [{"itemID": 17908, "count": 1}]}}
            ]
        }
    }"#;

    fn requirements() -> Loaded<RequirementTable> {
        table(&[&[
            ("offer", "rfm1"),
            ("action", "300"),
            ("award", "50"),
            ("price", "4.99"),
            ("start", "2024-06-01 7:00:00"),
            ("end", "2024-06-08 23:59:59"),
            ("discount", "40"),
            ("old_price", "8.99"),
            ("segment", "1, 2, 3"),
            ("techitem(17908)", "1"),
        ]])
    }

    fn inputs(document: Option<&str>) -> Inputs {
        Inputs {
            requirements: requirements(),
            actions: json(ACTIONS, "actions.json"),
            documents: document
                .map(|text| vec![("rfm1".to_string(), json(text, "rfm1.json"))])
                .unwrap_or_default(),
        }
    }

    #[test]
    fn matching_offer_passes_every_check() {
        let ledger = run(inputs(Some(DOCUMENT)), &mut NullReporter);
        let summary = ledger.summary();
        assert_eq!(summary.failed_checks, 0, "{:?}", ledger.entries());
        // catalog 1, points 2, price 2, awards 1, dates 2, texts 3, segments 1, techitem 2
        assert_eq!(summary.total_checks, 14);
        assert!(
            ledger
                .checks()
                .all(|check| check.subject == SubjectKey::Alias("rfm1".into()))
        );
    }

    #[test]
    fn missing_document_warns_and_skips_document_checks() {
        let ledger = run(inputs(None), &mut NullReporter);
        assert_eq!(ledger.summary().failed_checks, 0);
        assert_eq!(ledger.summary().total_checks, 5);
        assert_eq!(ledger.summary().warnings, 1);
    }

    #[test]
    fn offer_without_action_id_warns_that_action_checks_are_skipped() {
        let inputs = Inputs {
            requirements: table(&[&[("offer", "rfm1"), ("action", ""), ("award", "50")]]),
            ..inputs(None)
        };
        let ledger = run(inputs, &mut NullReporter);
        let notice = ledger
            .notices()
            .find(|notice| notice.subject == Some(SubjectKey::Alias("rfm1".into())))
            .expect("notice for rfm1");
        assert_eq!(notice.message, "offer rfm1 has no action id, its action checks are skipped");
    }

    #[test]
    fn wrong_techitem_reports_the_items_seen() {
        let document = DOCUMENT.replace("17908", "17000");
        let ledger = run(inputs(Some(&document)), &mut NullReporter);
        let techitem = ledger
            .checks()
            .find(|check| check.tag == "TECHITEM_ID_CHECK")
            .expect("techitem check");
        assert!(!techitem.passed());
        assert_eq!(techitem.actual.as_deref(), Some("17000"));
        assert!(ledger.checks().all(|check| check.tag != "TECHITEM_COUNT_CHECK"));
    }

    #[test]
    fn discount_text_mismatch_fails() {
        let document = DOCUMENT.replace("-40%", "-30%");
        let ledger = run(inputs(Some(&document)), &mut NullReporter);
        let failed: Vec<_> = ledger.checks().filter(|check| !check.passed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].tag, "DISCOUNT_CHECK");
        assert_eq!(failed[0].expected.as_deref(), Some("-40%"));
    }
}
