//! Weekly quests: exercise configuration and quest awards per complexity.

use std::collections::{HashMap, HashSet};

use passcheck_ingest::Loaded;
use passcheck_model::{
    Action, ActionsCatalog, ExerciseConfig, Ledger, PromoDocument, Quest, Reporter,
    RequirementRow, RequirementTable, Scalar, SubjectKey,
};

use super::common::{index_actions, join_ids, report_index, report_load};
use crate::compare::CompareMode;
use crate::extract::parameter_columns;
use crate::index::{Index, int_column, scalar_id, text_column};
use crate::lookup::{Selector, find_award, show};
use crate::matcher::{Expect, FieldCheck, Matcher};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "weekly-quests";

pub const WEEK_COLUMN: &str = "Неделя";
const COMPLEXITY_COLUMN: &str = "complexity";
const AWARD_PREFIX: &str = "count(";

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub promo: Loaded<PromoDocument>,
    pub actions: Loaded<ActionsCatalog>,
}

pub struct Context {
    complexities: Index<i64, RequirementRow>,
    actions: Index<i64, Action>,
    quests: Index<i64, Quest>,
    /// Complexity id to the quest listing it as an exercise.
    quest_of: HashMap<i64, i64>,
    /// Every exercise listed by the promo quests, in order.
    promo_exercises: Vec<i64>,
}

/// Integer fields of the first `#children` entry, compared only when both
/// sides carry a value.
const LEVEL_FIELDS: &[(&str, &str, fn(&ExerciseConfig) -> Option<&Scalar>)] = &[
    ("MIN_LEVEL_MATCH", "minLevel", |config| config.min_level.as_ref()),
    ("MAX_LEVEL_MATCH", "maxLevel", |config| config.max_level.as_ref()),
    ("MIN_VALUE_MATCH", "minValue", |config| config.min_value.as_ref()),
];

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "Weekly quest exercises in catalog and promo",
        run: check_presence,
    },
    Phase {
        title: "Weekly quest exercise configuration",
        run: check_exercises,
    },
    Phase {
        title: "Weekly quest awards",
        run: check_awards,
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

        let rows = inputs.requirements.value.rows;
        let weeks = Index::group_by(rows.iter(), |row| text_column(row, WEEK_COLUMN));
        for (week, rows) in weeks.iter() {
            let ids = rows.iter().filter_map(|row| row.value(COMPLEXITY_COLUMN));
            recorder.info(format!("week {week}: {}", join_ids(ids)));
        }
        let complexities = Index::build(rows, |row| int_column(row, COMPLEXITY_COLUMN));
        report_index(recorder, "requirements complexity", &complexities);

        let actions = index_actions(&inputs.actions.value);
        report_index(recorder, "catalog complexity", &actions);

        let promo = inputs.promo.value;
        let mut quest_of = HashMap::new();
        let mut promo_exercises = Vec::new();
        for quest in &promo.quests {
            let Some(quest_id) = quest.id.as_ref().and_then(Scalar::as_i64) else {
                continue;
            };
            for exercise in quest.exercises.list.iter().filter_map(Scalar::as_i64) {
                quest_of.insert(exercise, quest_id);
                promo_exercises.push(exercise);
            }
        }
        let quests = Index::build(promo.quests, |quest| scalar_id(quest.id.as_ref()));
        report_index(recorder, "promo quest", &quests);

        Self {
            complexities,
            actions,
            quests,
            quest_of,
            promo_exercises,
        }
    }
}

fn check_presence(context: &Context, recorder: &mut Recorder<'_>) {
    for &id in context.complexities.keys() {
        Matcher::presence(
            recorder,
            &SubjectKey::Id(id),
            "COMPLEXITY_IN_ACTIONS",
            format!("complexity {id} is in the actions catalog"),
            context.actions.contains_key(&id),
        );
    }
    for &id in context.complexities.keys() {
        Matcher::presence(
            recorder,
            &SubjectKey::Id(id),
            "COMPLEXITY_IN_PROMO",
            format!("complexity {id} is listed in promo quest exercises"),
            context.quest_of.contains_key(&id),
        );
    }
    let mut reported = HashSet::new();
    for &id in &context.promo_exercises {
        if !context.complexities.contains_key(&id) && reported.insert(id) {
            recorder.warn(
                Some(SubjectKey::Id(id)),
                format!("complexity {id} is in promo quests but not in the requirements table"),
            );
        }
    }
}

fn check_exercises(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.complexities.iter() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "complexity",
            |recorder, action| {
                let Some(config) = action.children.first() else {
                    recorder.warn(
                        Some(subject.clone()),
                        format!("complexity {id} has no #children block"),
                    );
                    return;
                };
                check_exercise(recorder, &subject, row, config);
            },
        );
    }
}

fn check_exercise(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    config: &ExerciseConfig,
) {
    let type_check = FieldCheck::new(
        "TYPE_MATCH",
        "exercise type",
        Expect::cell(row, "type"),
        config.kind.clone(),
    )
    .mode(CompareMode::CaseInsensitive);
    Matcher::evaluate(recorder, subject, type_check);

    let alias_check = FieldCheck::new(
        "ALIAS_MATCH",
        "exercise alias",
        Expect::cell(row, "alias"),
        config.alias.clone(),
    );
    Matcher::evaluate(recorder, subject, alias_check);

    for &(tag, column, observe) in LEVEL_FIELDS {
        let Some(actual) = observe(config) else {
            continue;
        };
        let check = FieldCheck::new(
            tag,
            format!("exercise {column}"),
            Expect::cell(row, column),
            Some(actual.to_string()),
        )
        .mode(CompareMode::Integer);
        Matcher::evaluate(recorder, subject, check);
    }
}

fn check_awards(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.complexities.iter() {
        let subject = SubjectKey::Id(id);
        let quest = context
            .quest_of
            .get(&id)
            .and_then(|quest_id| context.quests.get(quest_id));
        Matcher::with_record(
            recorder,
            &subject,
            quest,
            "quest for complexity",
            |recorder, quest| {
                for column in parameter_columns(row.columns(), AWARD_PREFIX) {
                    let (item_id, header, value) = match column {
                        Ok(column) => column,
                        Err(header) => {
                            recorder.warn(
                                Some(subject.clone()),
                                format!("column '{header}' names no item id"),
                            );
                            continue;
                        }
                    };
                    if value.is_empty() {
                        continue;
                    }
                    let award = find_award(&quest.awards.custom, &Selector::ItemId(item_id));
                    let check = FieldCheck::new(
                        "AWARD_COUNT",
                        format!("quest award {item_id} count"),
                        Expect::value(value),
                        award.and_then(|award| show(award.count.as_ref())),
                    )
                    .mode(CompareMode::Integer)
                    .presence("AWARD_PRESENCE", format!("quest award {item_id} is present"))
                    .details(format!("requirements column {header}"));
                    Matcher::evaluate(recorder, &subject, check);
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{json, table};
    use passcheck_model::NullReporter;

    const ACTIONS: &str = r##"[
        [{"@id": 301, "#children": [{"type": "Kill", "alias": "hunter", "minLevel": 5, "maxLevel": 20, "minValue": 10}]}],
        [{"@id": 302, "#children": [{"type": "win", "alias": "winner"}]}]
    ]"##;
    const PROMO: &str = r#"{"quests": [
        {"id": 1, "exercises": {"list": [301, 302]}, "awards": {"custom": [{"itemId": 17909, "count": 50}]}},
        {"id": 2, "exercises": {"list": [399]}, "awards": {"custom": []}}
    ]}"#;

    fn inputs(requirements: Loaded<RequirementTable>) -> Inputs {
        Inputs {
            requirements,
            promo: json(PROMO, "promo.json"),
            actions: json(ACTIONS, "actions.json"),
        }
    }

    #[test]
    fn exercise_and_award_checks_follow_requirements() {
        let requirements = table(&[
            &[
                ("Неделя", "1"),
                ("complexity", "301"),
                ("type", "kill"),
                ("alias", "hunter"),
                ("minLevel", "5"),
                ("maxLevel", "20"),
                ("minValue", "10"),
                ("count(17909)", "50"),
                ("count(17908)", ""),
            ],
            &[
                ("Неделя", "1"),
                ("complexity", "302"),
                ("type", "win"),
                ("alias", "winner"),
                ("minLevel", "3"),
                ("maxLevel", ""),
                ("minValue", ""),
                ("count(17909)", "40"),
                ("count(17908)", "1"),
            ],
        ]);
        let ledger = run(inputs(requirements), &mut NullReporter);

        let failed: Vec<_> = ledger
            .checks()
            .filter(|check| !check.passed())
            .map(|check| (check.subject.clone(), check.tag))
            .collect();
        assert_eq!(
            failed,
            vec![
                (SubjectKey::Id(302), "AWARD_COUNT"),
                (SubjectKey::Id(302), "AWARD_PRESENCE"),
            ]
        );
        // 399 is only in the promo
        assert_eq!(ledger.summary().warnings, 1);
    }

    #[test]
    fn missing_complexity_skips_configuration_checks() {
        let requirements = table(&[&[
            ("Неделя", "2"),
            ("complexity", "310"),
            ("type", "kill"),
        ]]);
        let ledger = run(inputs(requirements), &mut NullReporter);
        let tags: Vec<_> = ledger.checks().map(|check| check.tag).collect();
        assert_eq!(tags, vec!["COMPLEXITY_IN_ACTIONS", "COMPLEXITY_IN_PROMO"]);
        assert_eq!(ledger.summary().failed_checks, 2);
    }
}
