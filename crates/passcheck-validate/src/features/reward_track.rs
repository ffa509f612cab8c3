//! Main reward track: free and paid actions of every level.

use std::collections::HashSet;

use passcheck_ingest::Loaded;
use passcheck_model::{
    Action, ActionsCatalog, CheckResult, Ledger, PromoDocument, Reporter, RequirementRow,
    RequirementTable, SubjectKey, parse_int,
};

use super::common::{index_actions, join_ids, report_index, report_load, season_pass_actions};
use crate::compare::CompareMode;
use crate::extract::column_parameter;
use crate::index::{Index, int_column};
use crate::lookup::{Selector, find_award, show};
use crate::matcher::{ABSENT, Expect, FieldCheck, Matcher, PRESENT};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "reward-track";

const FREE_COLUMN: &str = "action_free";
const PAID_COLUMN: &str = "action_paid";
const RESOURCE_PREFIX: &str = "needResources";

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub promo: Loaded<PromoDocument>,
    pub actions: Loaded<ActionsCatalog>,
}

pub struct Context {
    free: Index<i64, RequirementRow>,
    paid: Index<i64, RequirementRow>,
    /// `needResources (<itemId>)` column and the item it names.
    resource_column: Option<(String, i64)>,
    promo: PromoDocument,
    actions: Index<i64, Action>,
    season_pass: Option<String>,
}

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "Reward track actions in promo and catalog",
        run: check_presence,
    },
    Phase {
        title: "Reward track action content",
        run: check_content,
    },
    Phase {
        title: "Reward track needAction",
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

        let table = inputs.requirements.value;
        let resource_column = table
            .headers
            .iter()
            .filter(|header| header.starts_with(RESOURCE_PREFIX))
            .find_map(|header| column_parameter(header).map(|(_, id)| (header.clone(), id)));
        let free = Index::build(table.rows.iter().cloned(), |row| int_column(row, FREE_COLUMN));
        let paid = Index::build(table.rows, |row| int_column(row, PAID_COLUMN));
        report_index(recorder, "requirements action_free", &free);
        report_index(recorder, "requirements action_paid", &paid);
        let actions = index_actions(&inputs.actions.value);
        report_index(recorder, "catalog action", &actions);

        recorder.info(format!(
            "{} free and {} paid actions in requirements, {} awards in promo, {} catalog actions",
            free.len(),
            paid.len(),
            inputs.promo.value.awards.len(),
            actions.len()
        ));

        Self {
            free,
            paid,
            resource_column,
            season_pass: season_pass_actions(&inputs.promo.value),
            promo: inputs.promo.value,
            actions,
        }
    }
}

fn check_presence(context: &Context, recorder: &mut Recorder<'_>) {
    let tracks = [
        (&context.free, "free", "ACTION_FREE_IN_PROMO"),
        (&context.paid, "paid", "ACTION_PAID_IN_PROMO"),
    ];
    for (index, track, tag) in tracks {
        for &id in index.keys() {
            Matcher::presence(
                recorder,
                &SubjectKey::Id(id),
                tag,
                format!("{track} action {id} is listed in promo awards"),
                context.promo.lists_award(id),
            );
        }
    }

    let required: HashSet<i64> = context.free.keys().chain(context.paid.keys()).copied().collect();
    let service: HashSet<i64> = context
        .promo
        .parameters
        .as_ref()
        .map(|parameters| parameters.service_actions().into_iter().collect())
        .unwrap_or_default();
    let mut seen = HashSet::new();
    for id in context.promo.award_ids() {
        if required.contains(&id) || !seen.insert(id) {
            continue;
        }
        if service.contains(&id) {
            recorder.info(format!(
                "promo award {id} is a season pass service action, not expected in requirements"
            ));
        } else {
            recorder.info(format!("promo award {id} is not in the requirements table"));
        }
    }

    let tracks = [
        (&context.free, "free", "ACTION_FREE_IN_ACTIONS"),
        (&context.paid, "paid", "ACTION_PAID_IN_ACTIONS"),
    ];
    for (index, track, tag) in tracks {
        for &id in index.keys() {
            Matcher::presence(
                recorder,
                &SubjectKey::Id(id),
                tag,
                format!("{track} action {id} is in the actions catalog"),
                context.actions.contains_key(&id),
            );
        }
    }
}

fn check_content(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.free.iter() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "free action",
            |recorder, action| {
                if let Some((column, item_id)) = &context.resource_column {
                    check_resource(recorder, &subject, action, row, column, *item_id);
                }
                check_award(recorder, &subject, action, row, "award_1");
            },
        );
    }

    for (&id, row) in context.paid.iter() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "paid action",
            |recorder, action| {
                check_award(recorder, &subject, action, row, "award_2");
                check_pass_requirement(recorder, context, &subject, action);
            },
        );
    }
}

/// A positive cell requires the resource with that count, zero forbids it.
fn check_resource(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    action: &Action,
    row: &RequirementRow,
    column: &str,
    item_id: i64,
) {
    let Some(raw) = row.value(column) else {
        return;
    };
    let resource = find_award(&action.need_resources, &Selector::Item(item_id));
    match parse_int(raw) {
        Ok(0) => {
            Matcher::absence(
                recorder,
                subject,
                "NEED_RESOURCES_ABSENCE",
                format!("no needResources item {item_id} when the requirement is 0"),
                resource.is_some(),
            );
        }
        Ok(count) => {
            let check = FieldCheck::new(
                "NEED_RESOURCES_COUNT",
                format!("needResources item {item_id} count"),
                Expect::value(count.to_string()),
                resource.and_then(|resource| show(resource.count.as_ref())),
            )
            .mode(CompareMode::Integer)
            .presence(
                "NEED_RESOURCES_PRESENCE",
                format!("needResources item {item_id} is present"),
            );
            Matcher::evaluate(recorder, subject, check);
        }
        Err(err) => recorder.warn(Some(subject.clone()), format!("{column}: {err}")),
    }
}

/// `<prefix>_type`, `<prefix>_id` and `<prefix>_qty` against the action awards.
fn check_award(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    action: &Action,
    row: &RequirementRow,
    prefix: &str,
) {
    let kind = row.value(&format!("{prefix}_type"));
    let award_id = row.value(&format!("{prefix}_id"));
    let quantity = row.value(&format!("{prefix}_qty"));
    let (Some(kind), Some(award_id), Some(quantity)) = (kind, award_id, quantity) else {
        return;
    };

    // A cash award is only ever written with the id `cash`; any other id
    // cannot match and is reported as a missing award.
    let selector = match kind.to_lowercase().as_str() {
        "item" | "buff" => match parse_int(award_id) {
            Ok(id) => Some(Selector::for_award(kind, Some(id))),
            Err(err) => {
                recorder.warn(Some(subject.clone()), format!("{prefix}_id: {err}"));
                return;
            }
        },
        "cash" if !award_id.eq_ignore_ascii_case("cash") => None,
        other => Some(Selector::Kind(other.to_string())),
    };
    let award = selector
        .as_ref()
        .and_then(|selector| find_award(&action.awards, selector));
    let check = FieldCheck::new(
        "AWARD_COUNT",
        format!("{kind} award {award_id} count"),
        Expect::value(quantity),
        award.and_then(|award| show(award.count.as_ref())),
    )
    .mode(CompareMode::Integer)
    .presence(
        "AWARD_PRESENCE",
        format!("{kind} award {award_id} is present"),
    );
    Matcher::evaluate(recorder, subject, check);
}

/// A paid action must be gated by a season pass or battle pass purchase.
fn check_pass_requirement(
    recorder: &mut Recorder<'_>,
    context: &Context,
    subject: &SubjectKey,
    action: &Action,
) {
    let need_action = action.need_action().map(ToString::to_string);
    let found = need_action.is_some();
    Matcher::presence(
        recorder,
        subject,
        "NEED_ACTION_PRESENCE",
        "paid action has needAction",
        found,
    );
    let Some(need_action) = need_action else {
        return;
    };

    let gated_by: Vec<i64> = need_action
        .split(',')
        .filter_map(|id| parse_int(id).ok())
        .collect();
    let passes = context
        .promo
        .parameters
        .as_ref()
        .map(|parameters| parameters.service_actions())
        .unwrap_or_default();
    let gated = passes.iter().any(|id| gated_by.contains(id));
    recorder.record(
        CheckResult::new(
            subject.clone(),
            "NEED_ACTION_SEASON_PASS",
            "needAction contains a season pass or battle pass id",
            gated,
        )
        .with_values(PRESENT, if gated { PRESENT } else { ABSENT })
        .with_details(format!(
            "needAction {need_action}, pass actions {}",
            join_ids(&passes)
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
    for (&id, _) in context.paid.iter() {
        let subject = SubjectKey::Id(id);
        // Absence was already reported with the action content.
        let Some(need_action) = context
            .actions
            .get(&id)
            .and_then(|action| action.need_action())
        else {
            continue;
        };
        let check = FieldCheck::new(
            "NEED_ACTION_VALUE",
            format!("needAction of action {id} matches seasonPassActions"),
            Expect::value(season_pass),
            Some(need_action.to_string()),
        )
        .mode(CompareMode::IdSet)
        .details("needAction must list exactly the season pass actions");
        Matcher::evaluate(recorder, &subject, check);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{json, table};
    use passcheck_model::NullReporter;

    const PROMO: &str = r#"{
        "awards": [1, 2, 500, 900],
        "parameters": {"seasonPassActions": [500], "battlepassAction": 501}
    }"#;

    fn requirements() -> Loaded<RequirementTable> {
        table(&[&[
            ("action_free", "1"),
            ("action_paid", "2"),
            ("needResources (17886)", "10"),
            ("award_1_type", "item"),
            ("award_1_id", "17909"),
            ("award_1_qty", "3"),
            ("award_2_type", "cash"),
            ("award_2_id", "cash"),
            ("award_2_qty", "100"),
        ]])
    }

    fn inputs(requirements: Loaded<RequirementTable>, actions: &str) -> Inputs {
        Inputs {
            requirements,
            promo: json(PROMO, "promo.json"),
            actions: json(actions, "actions.json"),
        }
    }

    #[test]
    fn complete_track_passes() {
        let actions = r#"[
            {"@id": 1, "needResources": [{"type": "item", "itemId": 17886, "count": 10}],
             "awards": [{"type": "item", "itemId": 17909, "count": 3}]},
            {"@id": 2, "needAction": "500", "awards": [{"type": "cash", "count": 100}]}
        ]"#;
        let ledger = run(inputs(requirements(), actions), &mut NullReporter);
        let summary = ledger.summary();
        assert_eq!(summary.failed_checks, 0, "{:?}", ledger.entries());
        // presence 4; free: resource 2 + award 2; paid: award 2 + needAction 2; value 1
        assert_eq!(summary.total_checks, 13);
    }

    #[test]
    fn cash_award_needs_cash_id() {
        let requirements = table(&[&[
            ("action_free", ""),
            ("action_paid", "2"),
            ("award_2_type", "cash"),
            ("award_2_id", "17"),
            ("award_2_qty", "100"),
        ]]);
        let actions = r#"[{"@id": 2, "needAction": "500", "awards": [{"type": "cash", "count": 100}]}]"#;
        let ledger = run(inputs(requirements, actions), &mut NullReporter);
        let presence = ledger
            .checks()
            .find(|check| check.tag == "AWARD_PRESENCE")
            .expect("award presence check");
        assert!(!presence.passed());
        assert_eq!(presence.subject, SubjectKey::Id(2));
        assert!(ledger.checks().all(|check| check.tag != "AWARD_COUNT"));
    }

    #[test]
    fn missing_catalog_action_fails_once_and_skips_content() {
        let actions = r#"[
            {"@id": 2, "needAction": "500", "awards": [{"type": "cash", "count": 100}]}
        ]"#;
        let ledger = run(inputs(requirements(), actions), &mut NullReporter);
        let failed: Vec<_> = ledger.checks().filter(|check| !check.passed()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].tag, "ACTION_FREE_IN_ACTIONS");
        assert_eq!(failed[0].subject, SubjectKey::Id(1));
        assert_eq!(failed[0].actual.as_deref(), Some(ABSENT));
        assert!(
            ledger
                .checks()
                .filter(|check| check.subject == SubjectKey::Id(1))
                .all(|check| check.tag.starts_with("ACTION_FREE_IN"))
        );
    }

    #[test]
    fn zero_resource_requires_absence() {
        let requirements = table(&[&[
            ("action_free", "1"),
            ("action_paid", ""),
            ("needResources (17886)", "0"),
        ]]);
        let actions = r#"[{"@id": 1, "needResources": [{"type": "item", "itemId": 17886, "count": 5}]}]"#;
        let ledger = run(inputs(requirements, actions), &mut NullReporter);
        let absence = ledger
            .checks()
            .find(|check| check.tag == "NEED_RESOURCES_ABSENCE")
            .expect("absence check");
        assert!(!absence.passed());
        assert_eq!(absence.actual.as_deref(), Some(PRESENT));
    }

    #[test]
    fn paid_action_without_pass_gate_fails() {
        let actions = r#"[
            {"@id": 1, "needResources": [{"type": "item", "itemId": 17886, "count": 10}],
             "awards": [{"type": "item", "itemId": 17909, "count": 3}]},
            {"@id": 2, "needAction": "777", "awards": [{"type": "cash", "count": 100}]}
        ]"#;
        let ledger = run(inputs(requirements(), actions), &mut NullReporter);
        let failed: Vec<_> = ledger
            .checks()
            .filter(|check| !check.passed())
            .map(|check| check.tag)
            .collect();
        assert_eq!(failed, vec!["NEED_ACTION_SEASON_PASS", "NEED_ACTION_VALUE"]);
    }
}
