use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{error, info, info_span};

use passcheck_ingest::{Loaded, load_document, load_requirements};
use passcheck_model::{Ledger, NullReporter, PromoDocument, Reporter};
use passcheck_report::{ConsoleReporter, ledger_json, write_csv_file, write_log};
use passcheck_validate::Feature;
use passcheck_validate::features::{
    lottery, reminders, reward_track, rfm_offers, shop_offers, weekly_quests,
};

use crate::cli::{CatalogArgs, OutputArgs, RemindersArgs, RfmArgs, ShopArgs};
use crate::summary::apply_table_style;
use crate::types::FeatureRun;

const RFM_PREFIX: &str = "rfm";

pub fn run_reminders(args: &RemindersArgs) -> Result<FeatureRun> {
    execute(Feature::Reminders, &args.output, |reporter| {
        let inputs = reminders::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            end_news_promo: load_document("end news promo", &args.end_news_promo),
            double_points_promo: load_document("double points promo", &args.double_points_promo),
            promo: load_document("promo", &args.promo.promo),
        };
        reminders::run(inputs, reporter)
    })
}

pub fn run_lottery(args: &CatalogArgs) -> Result<FeatureRun> {
    execute(Feature::Lottery, &args.output, |reporter| {
        let inputs = lottery::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            promo: load_document("promo", &args.promo.promo),
            actions: load_document("actions", &args.actions.actions),
        };
        lottery::run(inputs, reporter)
    })
}

pub fn run_reward_track(args: &CatalogArgs) -> Result<FeatureRun> {
    execute(Feature::RewardTrack, &args.output, |reporter| {
        let inputs = reward_track::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            promo: load_document("promo", &args.promo.promo),
            actions: load_document("actions", &args.actions.actions),
        };
        reward_track::run(inputs, reporter)
    })
}

pub fn run_weekly_quests(args: &CatalogArgs) -> Result<FeatureRun> {
    execute(Feature::WeeklyQuests, &args.output, |reporter| {
        let inputs = weekly_quests::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            promo: load_document("promo", &args.promo.promo),
            actions: load_document("actions", &args.actions.actions),
        };
        weekly_quests::run(inputs, reporter)
    })
}

pub fn run_rfm_offers(args: &RfmArgs) -> Result<FeatureRun> {
    let files = if args.rfm_files.is_empty() {
        discover_rfm_files(Path::new(".")).context("discover RFM documents")?
    } else {
        args.rfm_files.clone()
    };
    info!(count = files.len(), "RFM documents selected");
    execute(Feature::RfmOffers, &args.output, |reporter| {
        let documents = files
            .iter()
            .map(|(name, path)| {
                let loaded: Loaded<PromoDocument> = load_document("rfm document", path);
                (name.clone(), loaded)
            })
            .collect();
        let inputs = rfm_offers::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            actions: load_document("actions", &args.actions.actions),
            documents,
        };
        rfm_offers::run(inputs, reporter)
    })
}

pub fn run_shop_offers(args: &ShopArgs) -> Result<FeatureRun> {
    execute(Feature::ShopOffers, &args.output, |reporter| {
        let inputs = shop_offers::Inputs {
            requirements: load_requirements(&args.requirements.requirements),
            promo: load_document("promo", &args.promo.promo),
            actions: load_document("actions", &args.actions.actions),
            offers: load_document("offers", &args.offers),
        };
        shop_offers::run(inputs, reporter)
    })
}

pub fn run_features() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Command", "Feature", "Subject", "Inputs"]);
    apply_table_style(&mut table);
    for feature in Feature::ALL {
        table.add_row(vec![
            feature.command().to_string(),
            feature.title().to_string(),
            feature.subject().to_string(),
            feature.inputs().join(", "),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Run one audit and write its reports.
fn execute<F>(feature: Feature, output: &OutputArgs, audit: F) -> Result<FeatureRun>
where
    F: FnOnce(&mut dyn Reporter) -> Ledger,
{
    let span = info_span!("audit", feature = feature.command());
    let _guard = span.enter();
    let started = Instant::now();

    let ledger = if output.json {
        audit(&mut NullReporter)
    } else {
        let mut console = ConsoleReporter::stdout(output.no_narrative);
        audit(&mut console)
    };
    info!(
        checks = ledger.summary().total_checks,
        elapsed_ms = started.elapsed().as_millis(),
        "audit finished"
    );

    let mut run = FeatureRun {
        feature,
        ledger,
        log: None,
        report: None,
        errors: Vec::new(),
        json: output.json,
    };

    match write_log(&output.log, feature.command(), &run.ledger) {
        Ok(()) => run.log = Some(output.log.clone()),
        Err(err) => {
            error!(error = %err, "detailed log not written");
            run.errors.push(format!("detailed log: {err}"));
        }
    }
    match write_csv_file(&output.report, &run.ledger) {
        Ok(()) => run.report = Some(output.report.clone()),
        Err(err) => {
            error!(error = %err, "CSV report not written");
            run.errors.push(format!("CSV report: {err}"));
        }
    }

    if output.json {
        let text = ledger_json(feature.command(), &run.ledger).context("encode ledger as JSON")?;
        println!("{text}");
    }
    Ok(run)
}

/// `rfm*.json` files in `dir`, named by file stem, sorted by name.
fn discover_rfm_files(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let path = entry.with_context(|| format!("read {}", dir.display()))?.path();
        if !path.is_file() {
            continue;
        }
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if is_json && stem.to_lowercase().starts_with(RFM_PREFIX) {
            found.push((stem.to_string(), path.clone()));
        }
    }
    found.sort();
    Ok(found)
}
