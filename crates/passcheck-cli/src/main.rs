//! Season pass promo auditor CLI.

use clap::{ColorChoice, Parser};
use passcheck_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;
mod types;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    run_features, run_lottery, run_reminders, run_reward_track, run_rfm_offers, run_shop_offers,
    run_weekly_quests,
};
use crate::summary::print_summary;
use crate::types::FeatureRun;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    apply_narrative_colors(cli.color.color);
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let outcome = match &cli.command {
        Command::Reminders(args) => run_reminders(args),
        Command::Lottery(args) => run_lottery(args),
        Command::RewardTrack(args) => run_reward_track(args),
        Command::WeeklyQuests(args) => run_weekly_quests(args),
        Command::RfmOffers(args) => run_rfm_offers(args),
        Command::ShopOffers(args) => run_shop_offers(args),
        Command::Features => {
            let code = match run_features() {
                Ok(()) => 0,
                Err(error) => {
                    eprintln!("error: {error:#}");
                    1
                }
            };
            std::process::exit(code);
        }
    };
    std::process::exit(exit_code(outcome));
}

fn exit_code(outcome: anyhow::Result<FeatureRun>) -> i32 {
    match outcome {
        Ok(run) => {
            if !run.json {
                print_summary(&run);
            }
            if run.has_failures() { 1 } else { 0 }
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    }
}

/// The console narrative colours through `colored`, which has its own switch.
fn apply_narrative_colors(choice: ColorChoice) {
    let enabled = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
