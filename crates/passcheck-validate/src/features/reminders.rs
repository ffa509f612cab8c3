//! End-of-campaign reminder windows, double points and cash exchange.

use passcheck_ingest::Loaded;
use passcheck_model::{
    Ledger, PromoDocument, PromoParameters, Reporter, RequirementRow, RequirementTable, SubjectKey,
};

use super::common::{report_index, report_load, season_pass_actions};
use crate::compare::CompareMode;
use crate::extract::parenthesized_int;
use crate::index::{Index, text_column};
use crate::matcher::{Expect, FieldCheck, Matcher};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "reminders";

pub const END_NEWS: &str = "end news";
pub const DOUBLE_POINTS: &str = "double points(2)";
pub const CASH_EXCHANGE: &str = "itemsToCashExchange";

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub end_news_promo: Loaded<PromoDocument>,
    pub double_points_promo: Loaded<PromoDocument>,
    pub promo: Loaded<PromoDocument>,
}

pub struct Context {
    requirements: Index<String, RequirementRow>,
    end_news: PromoDocument,
    double_points: PromoDocument,
    promo: PromoDocument,
}

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "End news window",
        run: check_end_news,
    },
    Phase {
        title: "Double points window",
        run: check_double_points,
    },
    Phase {
        title: "Cash to points exchange rate",
        run: check_cash_exchange,
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
        report_load(recorder, "end news promo", &inputs.end_news_promo);
        report_load(recorder, "double points promo", &inputs.double_points_promo);
        report_load(recorder, "promo", &inputs.promo);

        let requirements =
            Index::build(inputs.requirements.value.rows, |row| text_column(row, "alias"));
        report_index(recorder, "requirements alias", &requirements);
        Self {
            requirements,
            end_news: inputs.end_news_promo.value,
            double_points: inputs.double_points_promo.value,
            promo: inputs.promo.value,
        }
    }

    fn parameters(&self) -> Option<&PromoParameters> {
        self.promo.parameters.as_ref()
    }

    /// The first row whose alias satisfies `accept`.
    fn row_where(&self, accept: impl Fn(&str) -> bool) -> Option<(&String, &RequirementRow)> {
        self.requirements.iter().find(|(alias, _)| accept(alias))
    }
}

/// `from` and `to` of a requirement row against a window promo.
fn check_window(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    window: &PromoDocument,
    tags: [&'static str; 2],
) {
    let sides = [("from", &window.from, "start"), ("to", &window.to, "end")];
    for ((column, actual, edge), tag) in sides.into_iter().zip(tags) {
        let check = FieldCheck::new(
            tag,
            format!("{subject} window {edge} date"),
            Expect::cell(row, column),
            actual.clone(),
        )
        .mode(CompareMode::Date);
        Matcher::evaluate(recorder, subject, check);
    }
}

fn check_end_news(context: &Context, recorder: &mut Recorder<'_>) {
    let subject = SubjectKey::from(END_NEWS);
    let Some(row) = context.requirements.get(&END_NEWS.to_string()) else {
        recorder.error(Some(subject), format!("no requirements row for '{END_NEWS}'"));
        return;
    };
    check_window(
        recorder,
        &subject,
        row,
        &context.end_news,
        ["END_NEWS_FROM", "END_NEWS_TO"],
    );

    for (compare, tag) in [("any", "END_NEWS_ANY"), ("not", "END_NEWS_NOT")] {
        match context.end_news.action_filter(compare) {
            Some(filter) => {
                let check = FieldCheck::new(
                    tag,
                    format!("end news '{compare}' action condition"),
                    Expect::cell(row, compare),
                    Some(filter.items.joined()),
                )
                .mode(CompareMode::IdSet);
                Matcher::evaluate(recorder, &subject, check);
            }
            None => recorder.error(
                Some(subject.clone()),
                format!("end news promo has no ActionContain filter with compare '{compare}'"),
            ),
        }
    }

    match season_pass_actions(&context.promo) {
        Some(season_pass) => {
            let check = FieldCheck::new(
                "END_NEWS_SEASON_PASS",
                "end news 'not' condition matches seasonPassActions",
                Expect::cell(row, "not"),
                Some(season_pass),
            )
            .mode(CompareMode::IdSet)
            .details("'not' must list the seasonPassActions of the main promo");
            Matcher::evaluate(recorder, &subject, check);
        }
        None => recorder.error(
            Some(subject),
            "main promo has no seasonPassActions parameter",
        ),
    }
}

fn check_double_points(context: &Context, recorder: &mut Recorder<'_>) {
    let found = context
        .requirements
        .get(&DOUBLE_POINTS.to_string())
        .map(|row| (DOUBLE_POINTS, row))
        .or_else(|| {
            context
                .row_where(|alias| alias.starts_with("double points"))
                .map(|(alias, row)| (alias.as_str(), row))
        });
    let Some((alias, row)) = found else {
        recorder.error(
            Some(SubjectKey::from(DOUBLE_POINTS)),
            format!("no requirements row for '{DOUBLE_POINTS}'"),
        );
        return;
    };
    let subject = SubjectKey::from(alias);
    check_window(
        recorder,
        &subject,
        row,
        &context.double_points,
        ["DOUBLE_POINTS_FROM", "DOUBLE_POINTS_TO"],
    );

    let turn_on = context
        .parameters()
        .and_then(|parameters| parameters.promotion_award_multiplier_turn_on.clone());
    let check = FieldCheck::new(
        "MULTIPLIER_TURN_ON",
        "multiplier turn-on date",
        Expect::cell(row, "MultiplierTurnOn"),
        turn_on,
    )
    .mode(CompareMode::Date)
    .details("promotionAwardMultiplierTurnOn of the main promo");
    Matcher::evaluate(recorder, &subject, check);

    let Some(multiplier) = parenthesized_int(alias) else {
        recorder.warn(
            Some(subject),
            format!("cannot read the multiplier from alias '{alias}'"),
        );
        return;
    };
    let configured = context
        .parameters()
        .and_then(|parameters| parameters.promotion_award_multiplier.as_ref())
        .map(ToString::to_string);
    let check = FieldCheck::new(
        "MULTIPLIER_VALUE",
        "points multiplier",
        Expect::value(multiplier.to_string()),
        configured,
    )
    .mode(CompareMode::Integer)
    .details("promotionAwardMultiplier of the main promo");
    Matcher::evaluate(recorder, &subject, check);
}

fn check_cash_exchange(context: &Context, recorder: &mut Recorder<'_>) {
    let Some((alias, _)) = context.row_where(|alias| alias.contains(CASH_EXCHANGE)) else {
        recorder.error(
            Some(SubjectKey::from(CASH_EXCHANGE)),
            format!("no requirements row for '{CASH_EXCHANGE}'"),
        );
        return;
    };
    let subject = SubjectKey::from(alias.as_str());
    let Some(rate) = parenthesized_int(alias) else {
        recorder.warn(
            Some(subject),
            format!("cannot read the exchange rate from alias '{alias}'"),
        );
        return;
    };
    let configured = context
        .parameters()
        .and_then(|parameters| parameters.items_to_cash_exchange.as_ref())
        .map(ToString::to_string);
    let check = FieldCheck::new(
        "CASH_EXCHANGE_RATE",
        "cash to points exchange rate",
        Expect::value(rate.to_string()),
        configured,
    )
    .mode(CompareMode::Integer)
    .details("itemsToCashExchange of the main promo");
    Matcher::evaluate(recorder, &subject, check);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::fixtures::{json, table};
    use passcheck_model::NullReporter;

    const END_NEWS_PROMO: &str = r#"{
        "from": "2024-05-28 10:00:00", "to": "2024-05-31 23:59:59",
        "filters": [
            {"type": "ActionContain", "conditions": {"actions": {"compare": "any", "items": [10, 11]}}},
            {"type": "ActionContain", "conditions": {"actions": {"compare": "not", "items": [500, 501]}}}
        ]
    }"#;
    const DOUBLE_POINTS_PROMO: &str =
        r#"{"from": "2024-05-10 7:00:00", "to": "2024-05-12 23:59:59"}"#;
    const MAIN_PROMO: &str = r#"{"parameters": {
        "seasonPassActions": [501, 500],
        "promotionAwardMultiplier": 2,
        "promotionAwardMultiplierTurnOn": "2024-05-10 07:00:00",
        "itemsToCashExchange": "15"
    }}"#;

    fn inputs(requirements: Loaded<RequirementTable>, main_promo: &str) -> Inputs {
        Inputs {
            requirements,
            end_news_promo: json(END_NEWS_PROMO, "end-news-promo.json"),
            double_points_promo: json(DOUBLE_POINTS_PROMO, "double-points-promo.json"),
            promo: json(main_promo, "promo.json"),
        }
    }

    fn requirements() -> Loaded<RequirementTable> {
        table(&[
            &[
                ("alias", "end news"),
                ("from", "2024-05-28 10:00:00"),
                ("to", "2024-05-31 23:59:59"),
                ("any", "11,10"),
                ("not", "500,501"),
                ("MultiplierTurnOn", ""),
            ],
            &[
                ("alias", "double points(2)"),
                ("from", "2024-05-10 07:00:00"),
                ("to", "2024-05-12 23:59:59"),
                ("any", ""),
                ("not", ""),
                ("MultiplierTurnOn", "2024-05-10 7:00:00"),
            ],
            &[
                ("alias", "itemsToCashExchange(15)"),
                ("from", ""),
                ("to", ""),
                ("any", ""),
                ("not", ""),
                ("MultiplierTurnOn", ""),
            ],
        ])
    }

    #[test]
    fn consistent_configuration_passes() {
        let ledger = run(inputs(requirements(), MAIN_PROMO), &mut NullReporter);
        let summary = ledger.summary();
        assert_eq!(summary.failed_checks, 0, "{:?}", ledger.entries());
        assert_eq!(summary.errors, 0);
        // end news: 2 dates, any, not, season pass; double points: 2 dates,
        // turn-on, multiplier; cash exchange: rate
        assert_eq!(summary.total_checks, 10);
    }

    #[test]
    fn wrong_multiplier_fails_and_missing_season_pass_is_an_error() {
        let promo = r#"{"parameters": {"promotionAwardMultiplier": 3, "itemsToCashExchange": 15}}"#;
        let ledger = run(inputs(requirements(), promo), &mut NullReporter);
        let failed: Vec<_> = ledger
            .checks()
            .filter(|check| !check.passed())
            .map(|check| check.tag)
            .collect();
        assert_eq!(failed, vec!["MULTIPLIER_TURN_ON", "MULTIPLIER_VALUE"]);
        assert_eq!(ledger.summary().errors, 1);
    }

    #[test]
    fn missing_rows_are_reported_as_errors() {
        let requirements = table(&[&[("alias", "something else")]]);
        let ledger = run(inputs(requirements, MAIN_PROMO), &mut NullReporter);
        assert_eq!(ledger.summary().total_checks, 0);
        assert_eq!(ledger.summary().errors, 3);
    }
}
