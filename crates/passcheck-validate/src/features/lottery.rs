//! Lottery rewards: award packets of the lottery actions.

use passcheck_ingest::Loaded;
use passcheck_model::{
    Action, ActionsCatalog, CheckResult, Ledger, PromoDocument, Reporter, RequirementRow,
    RequirementTable, SubjectKey,
};

use super::common::{
    index_actions, join_ids, report_index, report_load, same_value, season_pass_actions,
};
use crate::compare::CompareMode;
use crate::index::{Grouped, Index, int_column};
use crate::lookup::Selector;
use crate::matcher::{Expect, FieldCheck, Matcher};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "lottery";

const FOUND: &str = "found";
const NOT_FOUND: &str = "not found";

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub promo: Loaded<PromoDocument>,
    pub actions: Loaded<ActionsCatalog>,
}

pub struct Context {
    requirements: Grouped<i64, RequirementRow>,
    promo: PromoDocument,
    actions: Index<i64, Action>,
    season_pass: Option<String>,
}

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "Lottery actions in promo and catalog",
        run: check_presence,
    },
    Phase {
        title: "Lottery award packets",
        run: check_packets,
    },
    Phase {
        title: "Lottery needAction",
        run: check_need_action,
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
        report_load(recorder, "promo", &inputs.promo);
        report_load(recorder, "actions", &inputs.actions);

        let requirements =
            Index::grouped(inputs.requirements.value.rows, |row| int_column(row, "action"));
        report_index(recorder, "requirements action", &requirements.groups);
        for orphan in &requirements.orphans {
            recorder.warn(
                None,
                format!("requirements line {} has no action above it, ignored", orphan.line),
            );
        }
        let actions = index_actions(&inputs.actions.value);
        report_index(recorder, "catalog action", &actions);

        Self {
            requirements,
            season_pass: season_pass_actions(&inputs.promo.value),
            promo: inputs.promo.value,
            actions,
        }
    }
}

fn check_presence(context: &Context, recorder: &mut Recorder<'_>) {
    let groups = &context.requirements.groups;
    recorder.info(format!(
        "{} actions in requirements: {}",
        groups.len(),
        join_ids(groups.keys())
    ));
    for &id in groups.keys() {
        Matcher::presence(
            recorder,
            &SubjectKey::Id(id),
            "PROMO_AWARD_PRESENT",
            format!("action {id} is listed in promo awards"),
            context.promo.lists_award(id),
        );
    }
    for &id in groups.keys() {
        Matcher::presence(
            recorder,
            &SubjectKey::Id(id),
            "ACTION_PRESENT",
            format!("action {id} is in the actions catalog"),
            context.actions.contains_key(&id),
        );
    }
}

fn check_packets(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, rows) in context.requirements.groups.iter() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "action",
            |recorder, action| {
                let packets = match action.award_packets.as_deref() {
                    Some(packets) if !packets.is_empty() => packets,
                    _ => {
                        recorder.error(
                            Some(subject.clone()),
                            format!("action {id} has no awardPackets"),
                        );
                        return;
                    }
                };
                recorder.info(format!("action {id}: {} award packets", packets.len()));
                for row in rows {
                    check_packet_row(recorder, &subject, action, row);
                }
            },
        );
    }
}

/// A requirement row matches when some packet with the same probability
/// holds an award agreeing on every non-empty column.
fn check_packet_row(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    action: &Action,
    row: &RequirementRow,
) {
    let kind = row.value("type");
    let count = row.value("count");
    let item_id = row.value("itemId");
    let probability = row.get("probability").unwrap_or_default();

    let found = action
        .award_packets
        .iter()
        .flatten()
        .filter(|packet| {
            let written = packet
                .probability
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            same_value(&written, probability)
        })
        .flat_map(|packet| packet.awards.iter())
        .any(|award| {
            let kind_matches = kind.is_none_or(|kind| award.is_kind(kind));
            let count_matches = count.is_none_or(|count| {
                award
                    .count
                    .as_ref()
                    .is_some_and(|own| same_value(&own.to_string(), count))
            });
            let id_matches = item_id.is_none_or(|item_id| {
                award
                    .identity()
                    .is_some_and(|own| same_value(&own.to_string(), item_id))
            });
            kind_matches && count_matches && id_matches
        });

    let mut reward = Vec::new();
    if let Some(kind) = kind {
        reward.push(kind.to_string());
    }
    if let Some(item_id) = item_id {
        let selector = Selector::for_award(kind.unwrap_or("item"), item_id.parse().ok());
        reward.push(selector.describe());
    }
    if let Some(count) = count {
        reward.push(format!("x{count}"));
    }
    reward.dedup();

    recorder.record(
        CheckResult::new(
            subject.clone(),
            "PACKET_AWARD",
            format!(
                "award {} in action {subject} with probability {probability}%",
                reward.join(" ")
            ),
            found,
        )
        .with_values(FOUND, if found { FOUND } else { NOT_FOUND })
        .with_details(format!(
            "type={}, count={}, itemId={}, probability={probability}",
            kind.unwrap_or_default(),
            count.unwrap_or_default(),
            item_id.unwrap_or_default()
        )),
    );
}

fn check_need_action(context: &Context, recorder: &mut Recorder<'_>) {
    let Some(season_pass) = context.season_pass.as_deref() else {
        recorder.warn(
            None,
            "seasonPassActions is not configured in promo, needAction checks skipped",
        );
        return;
    };
    for &id in context.requirements.groups.keys() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "action",
            |recorder, action| {
                let check = FieldCheck::new(
                    "NEED_ACTION",
                    format!("needAction of action {id} matches seasonPassActions"),
                    Expect::value(season_pass),
                    action.need_action().map(ToString::to_string),
                )
                .mode(CompareMode::IdSet)
                .presence(
                    "NEED_ACTION_PRESENT",
                    format!("action {id} has needAction"),
                );
                Matcher::evaluate(recorder, &subject, check);
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{json, table};
    use passcheck_model::{LedgerEntry, NullReporter};

    fn inputs(
        requirements: Loaded<RequirementTable>,
        promo: &str,
        actions: &str,
    ) -> Inputs {
        Inputs {
            requirements,
            promo: json(promo, "promo.json"),
            actions: json(actions, "actions.json"),
        }
    }

    #[test]
    fn matching_packets_pass_every_check() {
        let requirements = table(&[
            &[
                ("action", "101"),
                ("type", "item"),
                ("count", "5"),
                ("itemId", "17909"),
                ("probability", "50"),
            ],
            &[
                ("action", ""),
                ("type", "Buff"),
                ("count", "1"),
                ("itemId", "7"),
                ("probability", "50"),
            ],
        ]);
        let promo = r#"{"awards": [101], "parameters": {"seasonPassActions": [500, 501]}}"#;
        let actions = r#"[{"@id": 101, "needAction": "501,500", "awardPackets": [
            {"probability": 50, "awards": [
                {"type": "item", "itemId": 17909, "count": 5},
                {"type": "buff", "id": 7, "count": 1}
            ]}
        ]}]"#;

        let ledger = run(inputs(requirements, promo, actions), &mut NullReporter);
        let summary = ledger.summary();
        assert_eq!(summary.failed_checks, 0, "{:?}", ledger.entries());
        // promo, catalog, two packet rows, needAction presence and value
        assert_eq!(summary.total_checks, 6);
    }

    #[test]
    fn missing_action_fails_presence_and_skips_content() {
        let requirements = table(&[&[
            ("action", "101"),
            ("type", "item"),
            ("count", "5"),
            ("itemId", "17909"),
            ("probability", "50"),
        ]]);
        let promo = r#"{"awards": [101], "parameters": {"seasonPassActions": [500]}}"#;
        let ledger = run(inputs(requirements, promo, "[]"), &mut NullReporter);

        let failed: Vec<_> = ledger.checks().filter(|check| !check.passed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].tag, "ACTION_PRESENT");
        assert_eq!(failed[0].expected.as_deref(), Some("present"));
        assert_eq!(failed[0].actual.as_deref(), Some("absent"));
        assert_eq!(ledger.summary().total_checks, 2);
    }

    #[test]
    fn probability_mismatch_fails_packet_check() {
        let requirements = table(&[&[
            ("action", "101"),
            ("type", "item"),
            ("count", "5"),
            ("itemId", "17909"),
            ("probability", "25"),
        ]]);
        let promo = r#"{"awards": [101]}"#;
        let actions = r#"[{"@id": 101, "awardPackets": [
            {"probability": 50, "awards": [{"type": "item", "itemId": 17909, "count": 5}]}
        ]}]"#;
        let ledger = run(inputs(requirements, promo, actions), &mut NullReporter);

        let packet = ledger
            .checks()
            .find(|check| check.tag == "PACKET_AWARD")
            .expect("packet check");
        assert!(!packet.passed());
        assert_eq!(packet.actual.as_deref(), Some(NOT_FOUND));
        // seasonPassActions missing: one warning, no needAction checks
        assert!(ledger.checks().all(|check| check.tag != "NEED_ACTION_PRESENT"));
        assert_eq!(ledger.summary().warnings, 1);
    }

    #[test]
    fn missing_award_packets_is_an_error_notice() {
        let requirements = table(&[&[("action", "101"), ("probability", "50")]]);
        let promo = r#"{"awards": [101]}"#;
        let ledger = run(inputs(requirements, promo, r#"[{"@id": 101}]"#), &mut NullReporter);
        assert_eq!(ledger.summary().errors, 1);
        assert!(ledger.entries().iter().any(|recorded| matches!(
            &recorded.entry,
            LedgerEntry::Notice(notice) if notice.message.contains("awardPackets")
        )));
    }
}
