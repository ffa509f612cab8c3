//! Shop offers: shop actions, their promo placement and offer pricing.

use std::collections::BTreeMap;

use passcheck_ingest::Loaded;
use passcheck_model::{
    Action, ActionsCatalog, Award, BuyWindowOffer, Ledger, Offer, OffersCatalog, PromoDocument,
    Reporter, RequirementRow, RequirementTable, SubjectKey,
};

use super::common::{index_actions, report_index, report_load};
use crate::compare::CompareMode;
use crate::extract::parameter_columns;
use crate::index::{Index, KeyOf, int_column, scalar_id};
use crate::lookup::{Selector, find_award, show};
use crate::matcher::{Expect, FieldCheck, Matcher};
use crate::phase::{Phase, run_phases};
use crate::recorder::Recorder;

pub const FEATURE: &str = "shop-offers";

/// Aliases placed through `parameters.buyWindowParams.<alias>.actionId`
/// instead of the promo award list.
pub const BUY_WINDOW_ALIASES: &[&str] = &["passOffer", "mainOffer", "subscriptionOffer"];

/// Aliases exempt from some checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AliasPolicy {
    pub alias: &'static str,
    pub skip_promo_check: bool,
    pub skip_offer_check: bool,
}

pub const ALIAS_POLICIES: &[AliasPolicy] = &[AliasPolicy {
    // Subscription points grant: not a shop purchase.
    alias: "Выдача очков подписки",
    skip_promo_check: true,
    skip_offer_check: true,
}];

fn policy(alias: Option<&str>) -> Option<&'static AliasPolicy> {
    let alias = alias?;
    ALIAS_POLICIES.iter().find(|policy| policy.alias == alias)
}

pub struct Inputs {
    pub requirements: Loaded<RequirementTable>,
    pub promo: Loaded<PromoDocument>,
    pub actions: Loaded<ActionsCatalog>,
    pub offers: Loaded<OffersCatalog>,
}

pub struct Context {
    rows: Index<i64, RequirementRow>,
    promo: PromoDocument,
    actions: Index<i64, Action>,
    offers: Index<i64, Offer>,
    catalog: OffersCatalog,
}

pub const PHASES: &[Phase<Context>] = &[
    Phase {
        title: "Shop actions in catalog",
        run: check_presence,
    },
    Phase {
        title: "Shop action rewards",
        run: check_rewards,
    },
    Phase {
        title: "Shop actions in promo",
        run: check_placement,
    },
    Phase {
        title: "Action and offer links",
        run: check_offer_links,
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
        report_load(recorder, "offers", &inputs.offers);

        let rows = Index::build(inputs.requirements.value.rows, |row| int_column(row, "Action"));
        report_index(recorder, "requirements Action", &rows);
        let actions = index_actions(&inputs.actions.value);
        report_index(recorder, "catalog action", &actions);
        let catalog = inputs.offers.value;
        let offers = Index::build(catalog.flatten_offers(), |offer| scalar_id(offer.id.as_ref()));
        report_index(recorder, "catalog offer", &offers);

        recorder.info(format!(
            "{} actions in requirements, {} catalog actions, {} offers, {} prices, {} awards in promo",
            rows.len(),
            actions.len(),
            offers.len(),
            catalog.prices.len(),
            inputs.promo.value.awards.len()
        ));

        Self {
            rows,
            promo: inputs.promo.value,
            actions,
            offers,
            catalog,
        }
    }
}

fn alias_of(row: &RequirementRow) -> &str {
    row.value("alias").unwrap_or("unknown")
}

fn check_presence(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.rows.iter() {
        Matcher::presence(
            recorder,
            &SubjectKey::Id(id),
            "ACTION_EXISTS",
            format!("action {id} ({}) is in the actions catalog", alias_of(row)),
            context.actions.contains_key(&id),
        );
    }
}

fn check_rewards(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.rows.iter() {
        let subject = SubjectKey::Id(id);
        Matcher::with_record(
            recorder,
            &subject,
            context.actions.get(&id),
            "action",
            |recorder, action| {
                let lists = [
                    ("Award_", &action.awards, "AWARD_CHECK", "AWARD_PRESENT", "award"),
                    (
                        "NeedResources",
                        &action.need_resources,
                        "NEED_RESOURCE_CHECK",
                        "NEED_RESOURCE_PRESENT",
                        "needResources",
                    ),
                ];
                for (prefix, entries, tag, presence_tag, what) in lists {
                    check_item_columns(
                        recorder,
                        &subject,
                        row,
                        prefix,
                        entries,
                        (tag, presence_tag),
                        what,
                    );
                }
            },
        );
    }
}

/// Every non-empty `<prefix>...(<itemId>)` cell is an item count.
fn check_item_columns(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    prefix: &str,
    entries: &[Award],
    (tag, presence_tag): (&'static str, &'static str),
    what: &str,
) {
    let columns = row.columns().filter(|(_, value)| !value.is_empty());
    for column in parameter_columns(columns, prefix) {
        let (item_id, header, value) = match column {
            Ok(column) => column,
            Err(header) => {
                recorder.warn(
                    Some(subject.clone()),
                    format!("column '{header}' does not name an item id, ignored"),
                );
                continue;
            }
        };
        let entry = find_award(entries, &Selector::Item(item_id));
        let check = FieldCheck::new(
            tag,
            format!("{what} item {item_id} count"),
            Expect::value(value),
            entry.and_then(|entry| show(entry.count.as_ref())),
        )
        .mode(CompareMode::Integer)
        .presence(presence_tag, format!("{what} has item {item_id}"))
        .details(format!("column {header}"));
        Matcher::evaluate(recorder, subject, check);
    }
}

fn check_placement(context: &Context, recorder: &mut Recorder<'_>) {
    let buy_window = match &context.promo.parameters {
        None => {
            recorder.warn(None, "promo has no parameters, buyWindowParams checks skipped");
            None
        }
        Some(parameters) => {
            if parameters.buy_window_params.is_none() {
                recorder.warn(
                    None,
                    "promo parameters have no buyWindowParams, buy window checks skipped",
                );
            }
            parameters.buy_window_params.as_ref()
        }
    };

    for (&id, row) in context.rows.iter() {
        let subject = SubjectKey::Id(id);
        let alias = row.value("alias");
        if let Some(alias) = alias.filter(|alias| BUY_WINDOW_ALIASES.contains(alias)) {
            if let Some(params) = buy_window {
                check_buy_window(recorder, &subject, id, alias, params);
            }
            continue;
        }
        if policy(alias).is_some_and(|policy| policy.skip_promo_check) {
            recorder.info(format!(
                "action {id} ({}) is not expected in promo awards",
                alias_of(row)
            ));
            continue;
        }
        Matcher::presence(
            recorder,
            &subject,
            "ACTION_IN_PROMO_AWARDS",
            format!("action {id} ({}) is listed in promo awards", alias_of(row)),
            context.promo.lists_award(id),
        );
    }
}

fn check_buy_window(
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    id: i64,
    alias: &str,
    params: &BTreeMap<String, BuyWindowOffer>,
) {
    let path = format!("parameters.buyWindowParams.{alias}");
    let entry = params.get(alias);
    if !Matcher::presence(
        recorder,
        subject,
        "OFFER_PARAM_EXISTS",
        format!("{path} is configured"),
        entry.is_some(),
    ) {
        return;
    }
    let check = FieldCheck::new(
        "ACTION_IN_PROMO_PARAM",
        format!("{path}.actionId"),
        Expect::value(id.to_string()),
        entry.and_then(|entry| show(entry.action_id.as_ref())),
    )
    .mode(CompareMode::Integer)
    .presence("ACTION_ID_EXISTS", format!("{path} has actionId"));
    Matcher::evaluate(recorder, subject, check);
}

fn check_offer_links(context: &Context, recorder: &mut Recorder<'_>) {
    for (&id, row) in context.rows.iter() {
        let subject = SubjectKey::Id(id);
        let alias = alias_of(row);
        if policy(row.value("alias")).is_some_and(|policy| policy.skip_offer_check) {
            recorder.info(format!("action {id} ({alias}) has no shop offer to check"));
            continue;
        }
        let offer_id = match int_column(row, "Offer") {
            KeyOf::Key(offer_id) => offer_id,
            KeyOf::Blank => {
                recorder.warn(Some(subject), format!("no Offer id for action {id} ({alias})"));
                continue;
            }
            KeyOf::Malformed(raw) => {
                recorder.warn(
                    Some(subject),
                    format!("Offer id '{raw}' of action {id} is not an integer"),
                );
                continue;
            }
        };

        let offer = context.offers.get(&offer_id);
        if !Matcher::presence(
            recorder,
            &subject,
            "OFFER_EXISTS",
            format!("offer {offer_id} is in the offers catalog"),
            offer.is_some(),
        ) {
            continue;
        }
        let Some(offer) = offer else {
            continue;
        };

        let check = FieldCheck::new(
            "ACTION_OFFER_MATCH",
            format!("actionId of offer {offer_id}"),
            Expect::value(id.to_string()),
            show(offer.action_id.as_ref()),
        )
        .mode(CompareMode::Integer)
        .presence(
            "ACTION_ID_IN_OFFER",
            format!("offer {offer_id} has actionId"),
        );
        Matcher::evaluate(recorder, &subject, check);
        if offer.action_id.is_none() {
            continue;
        }

        check_price(context, recorder, &subject, row, offer_id, offer);
    }
}

/// The price lives in `prices` when the offer names a packet, on the offer
/// itself otherwise.
fn check_price(
    context: &Context,
    recorder: &mut Recorder<'_>,
    subject: &SubjectKey,
    row: &RequirementRow,
    offer_id: i64,
    offer: &Offer,
) {
    let Some(expected) = row.value("Price") else {
        recorder.warn(
            Some(subject.clone()),
            format!("no Price for action {subject} ({})", alias_of(row)),
        );
        return;
    };

    let check = match &offer.packet_id {
        Some(packet) => {
            let usd = packet
                .as_i64()
                .and_then(|packet| context.catalog.price(packet))
                .and_then(|price| price.usd.as_ref());
            FieldCheck::new(
                "PRICE_MATCH",
                format!("USD price of offer {offer_id} (packet {packet})"),
                Expect::value(expected),
                show(usd),
            )
            .presence("PRICE_EXISTS", format!("prices has USD for packet {packet}"))
        }
        None => FieldCheck::new(
            "PRICE_DIRECT_MATCH",
            format!("USD price of offer {offer_id}"),
            Expect::value(expected),
            show(offer.usd.as_ref().filter(|usd| !usd.is_blank())),
        )
        .presence("PRICE_EXISTS", format!("offer {offer_id} has USD")),
    };
    Matcher::evaluate(recorder, subject, check.mode(CompareMode::Float));
}
