//! End-to-end runs of the feature checklists on in-memory inputs.

use passcheck_ingest::Loaded;
use passcheck_model::{
    CheckResult, Ledger, NullReporter, Recorded, Reporter, RequirementRow, RequirementTable,
};
use passcheck_validate::features::{lottery, reminders, weekly_quests};
use serde::de::DeserializeOwned;

fn table(rows: &[&[(&str, &str)]]) -> Loaded<RequirementTable> {
    let rows: Vec<RequirementRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, cells)| {
            RequirementRow::new(
                idx + 2,
                cells
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            )
        })
        .collect();
    let headers = rows
        .first()
        .map(|row| row.columns().map(|(name, _)| name.to_string()).collect())
        .unwrap_or_default();
    Loaded::ready(RequirementTable { headers, rows }, "requirements.csv")
}

fn json<T: DeserializeOwned>(text: &str, name: &str) -> Loaded<T> {
    Loaded::ready(serde_json::from_str(text).expect("parse fixture"), name)
}

fn lottery_inputs(actions: &str) -> lottery::Inputs {
    lottery::Inputs {
        requirements: table(&[
            &[
                ("action", "101"),
                ("type", "item"),
                ("count", "5"),
                ("itemId", "17909"),
                ("probability", "50"),
            ],
            &[
                ("action", "102"),
                ("type", "buff"),
                ("count", "1"),
                ("itemId", "7"),
                ("probability", "100"),
            ],
        ]),
        promo: json(
            r#"{"awards": [101, 102], "parameters": {"seasonPassActions": [500]}}"#,
            "promo.json",
        ),
        actions: json(actions, "actions.json"),
    }
}

const LOTTERY_ACTIONS: &str = r#"[
    {"@id": 101, "needAction": "500", "awardPackets": [
        {"probability": 50, "awards": [{"type": "item", "itemId": 17909, "count": 5}]}]},
    {"@id": 102, "needAction": "501", "awardPackets": [
        {"probability": 100, "awards": [{"type": "buff", "id": 7, "count": 2}]}]}
]"#;

/// Collects everything forwarded to the reporter.
#[derive(Default)]
struct Collecting {
    features: Vec<String>,
    entries: Vec<Recorded>,
}

impl Reporter for Collecting {
    fn begin(&mut self, feature: &str) {
        self.features.push(feature.to_string());
    }

    fn entry(&mut self, recorded: &Recorded) {
        self.entries.push(recorded.clone());
    }
}

fn checks(ledger: &Ledger) -> Vec<CheckResult> {
    ledger.checks().cloned().collect()
}

#[test]
fn double_points_window_and_multiplier_pass() {
    let inputs = reminders::Inputs {
        requirements: table(&[&[
            ("alias", "double points(2)"),
            ("from", "2024-06-01"),
            ("to", "2024-06-08"),
        ]]),
        end_news_promo: json("{}", "end-news-promo.json"),
        double_points_promo: json(
            r#"{"from": "2024-06-01", "to": "2024-06-08"}"#,
            "double-points-promo.json",
        ),
        promo: json(
            r#"{"parameters": {"promotionAwardMultiplier": "2"}}"#,
            "promo.json",
        ),
    };
    let ledger = reminders::run(inputs, &mut NullReporter);
    let double_points: Vec<_> = ledger
        .checks()
        .filter(|check| check.subject.to_string() == "double points(2)")
        .collect();
    assert_eq!(double_points.len(), 3);
    assert!(double_points.iter().all(|check| check.passed()));
    assert_eq!(ledger.summary().failed_checks, 0);
}

#[test]
fn runs_on_unchanged_inputs_are_identical() {
    let first = lottery::run(lottery_inputs(LOTTERY_ACTIONS), &mut NullReporter);
    let second = lottery::run(lottery_inputs(LOTTERY_ACTIONS), &mut NullReporter);
    assert_eq!(checks(&first), checks(&second));
    assert_eq!(first.summary(), second.summary());
    assert!(first.summary().failed_checks > 0);
}

#[test]
fn totals_add_up_and_reporter_sees_every_entry() {
    let mut reporter = Collecting::default();
    let ledger = lottery::run(lottery_inputs(LOTTERY_ACTIONS), &mut reporter);
    let summary = ledger.summary();
    assert_eq!(
        summary.total_checks,
        summary.passed_checks + summary.failed_checks
    );
    assert_eq!(reporter.features, vec![lottery::FEATURE.to_string()]);
    assert_eq!(reporter.entries, ledger.entries());
}

#[test]
fn failures_are_grouped_by_subject() {
    let ledger = lottery::run(lottery_inputs(LOTTERY_ACTIONS), &mut NullReporter);
    let groups = ledger.errors_by_subject();
    let subjects: Vec<String> = groups
        .iter()
        .filter_map(|group| group.subject.map(ToString::to_string))
        .collect();
    // 102 awards a buff count of 2 and needs 501 instead of 500
    assert_eq!(subjects, vec!["102".to_string()]);
    assert_eq!(groups[0].entries.len(), 2);
}

#[test]
fn grouped_quest_catalog_is_indexed() {
    let inputs = weekly_quests::Inputs {
        requirements: table(&[&[
            ("Неделя", "1"),
            ("complexity", "9001"),
            ("type", "kill"),
            ("alias", "kill_9001"),
            ("minLevel", ""),
            ("maxLevel", ""),
            ("minValue", "10"),
        ]]),
        promo: json(r#"{"quests": [{"id": 1, "exercises": {"list": [9001]}}]}"#, "promo.json"),
        actions: json(
            r##"[[{"@id": 9001, "#children": [{"type": "Kill", "alias": "kill_9001", "minValue": 10}]}]]"##,
            "actions.json",
        ),
    };
    let ledger = weekly_quests::run(inputs, &mut NullReporter);
    assert_eq!(ledger.summary().failed_checks, 0, "{:?}", ledger.entries());
    assert!(ledger.summary().total_checks >= 4);
}
