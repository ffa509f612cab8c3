//! CLI argument definitions for the season pass auditor.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "passcheck",
    version,
    about = "Season pass promo auditor - cross-check configs against the requirements table",
    long_about = "Cross-validate season pass promo configuration against a requirements table.\n\n\
                  Each subcommand audits one feature area, narrates every check, writes a\n\
                  detailed log and a CSV of issues, and exits with status 1 when a check fails."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write diagnostics to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// End news and double points windows, points multiplier, cash exchange.
    Reminders(RemindersArgs),

    /// Lottery award packets and probabilities.
    Lottery(CatalogArgs),

    /// Free and paid reward track levels.
    RewardTrack(CatalogArgs),

    /// Weekly quests grouped by complexity.
    WeeklyQuests(CatalogArgs),

    /// RFM segment offers and their targeting documents.
    RfmOffers(RfmArgs),

    /// Shop offers, buy windows and prices.
    ShopOffers(ShopArgs),

    /// List the audited feature areas and their inputs.
    Features,
}

#[derive(Args)]
pub struct RequirementsArg {
    /// Requirements table (CSV).
    #[arg(long = "requirements", value_name = "PATH", default_value = "requirements.csv")]
    pub requirements: PathBuf,
}

#[derive(Args)]
pub struct PromoArg {
    /// Main promo document (JSON).
    #[arg(long = "promo", value_name = "PATH", default_value = "promo.json")]
    pub promo: PathBuf,
}

#[derive(Args)]
pub struct ActionsArg {
    /// Actions catalog (JSON).
    #[arg(long = "actions", value_name = "PATH", default_value = "actions.json")]
    pub actions: PathBuf,
}

#[derive(Args)]
pub struct OutputArgs {
    /// Detailed log of every entry.
    #[arg(long = "log", value_name = "PATH", default_value = "validation_detailed.log")]
    pub log: PathBuf,

    /// CSV report of failed checks and notices.
    #[arg(long = "report", value_name = "PATH", default_value = "validation_report.csv")]
    pub report: PathBuf,

    /// Suppress the real-time narrative (`-q` only quiets diagnostics).
    #[arg(long = "no-narrative")]
    pub no_narrative: bool,

    /// Print the ledger as JSON on stdout instead of the narrative and tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct RemindersArgs {
    #[command(flatten)]
    pub requirements: RequirementsArg,

    /// End news reminder promo (JSON).
    #[arg(long = "end-news-promo", value_name = "PATH", default_value = "end-news-promo.json")]
    pub end_news_promo: PathBuf,

    /// Double points reminder promo (JSON).
    #[arg(
        long = "double-points-promo",
        value_name = "PATH",
        default_value = "double-points-promo.json"
    )]
    pub double_points_promo: PathBuf,

    #[command(flatten)]
    pub promo: PromoArg,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Inputs shared by the lottery, reward track and weekly quest audits.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub requirements: RequirementsArg,

    #[command(flatten)]
    pub promo: PromoArg,

    #[command(flatten)]
    pub actions: ActionsArg,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct RfmArgs {
    #[command(flatten)]
    pub requirements: RequirementsArg,

    #[command(flatten)]
    pub actions: ActionsArg,

    /// Targeting document for one offer, as NAME=PATH (repeatable).
    ///
    /// Without any, every `rfm*.json` in the current directory is used,
    /// named after its file stem.
    #[arg(long = "rfm-file", value_name = "NAME=PATH", value_parser = parse_named_path)]
    pub rfm_files: Vec<(String, PathBuf)>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args)]
pub struct ShopArgs {
    #[command(flatten)]
    pub requirements: RequirementsArg,

    #[command(flatten)]
    pub promo: PromoArg,

    #[command(flatten)]
    pub actions: ActionsArg,

    /// Offers catalog (JSON).
    #[arg(long = "offers", value_name = "PATH", default_value = "offers.json")]
    pub offers: PathBuf,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_named_path(value: &str) -> Result<(String, PathBuf), String> {
    let (name, path) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got `{value}`"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("expected NAME=PATH, got `{value}`"));
    }
    Ok((name.to_string(), PathBuf::from(path)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments parse")
    }

    #[test]
    fn catalog_subcommands_use_default_inputs() {
        let cli = parse(&["passcheck", "lottery"]);
        let Command::Lottery(args) = cli.command else {
            panic!("expected lottery");
        };
        assert_eq!(args.requirements.requirements, PathBuf::from("requirements.csv"));
        assert_eq!(args.promo.promo, PathBuf::from("promo.json"));
        assert_eq!(args.actions.actions, PathBuf::from("actions.json"));
        assert_eq!(args.output.log, PathBuf::from("validation_detailed.log"));
        assert_eq!(args.output.report, PathBuf::from("validation_report.csv"));
        assert!(!args.output.no_narrative);
    }

    #[test]
    fn rfm_files_are_repeatable() {
        let cli = parse(&[
            "passcheck",
            "rfm-offers",
            "--rfm-file",
            "rfm1=docs/rfm1.json",
            "--rfm-file",
            "rfm2 = docs/rfm2.json",
        ]);
        let Command::RfmOffers(args) = cli.command else {
            panic!("expected rfm-offers");
        };
        assert_eq!(
            args.rfm_files,
            vec![
                ("rfm1".to_string(), PathBuf::from("docs/rfm1.json")),
                ("rfm2".to_string(), PathBuf::from("docs/rfm2.json")),
            ]
        );
    }

    #[test]
    fn rfm_file_without_name_is_rejected() {
        assert!(Cli::try_parse_from(["passcheck", "rfm-offers", "--rfm-file", "rfm1.json"]).is_err());
        assert!(Cli::try_parse_from(["passcheck", "rfm-offers", "--rfm-file", "=rfm1.json"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = parse(&[
            "passcheck",
            "shop-offers",
            "--offers",
            "shop.json",
            "--json",
            "--log-level",
            "debug",
        ]);
        assert!(matches!(cli.log_level, Some(LogLevelArg::Debug)));
        let Command::ShopOffers(args) = cli.command else {
            panic!("expected shop-offers");
        };
        assert_eq!(args.offers, PathBuf::from("shop.json"));
        assert!(args.output.json);
    }

    #[test]
    fn reminders_take_both_window_promos() {
        let cli = parse(&[
            "passcheck",
            "reminders",
            "--end-news-promo",
            "a.json",
            "--double-points-promo",
            "b.json",
        ]);
        let Command::Reminders(args) = cli.command else {
            panic!("expected reminders");
        };
        assert_eq!(args.end_news_promo, PathBuf::from("a.json"));
        assert_eq!(args.double_points_promo, PathBuf::from("b.json"));
    }

    #[test]
    fn narrative_switch_and_verbosity_quiet_coexist() {
        let cli = parse(&["passcheck", "reward-track", "--no-narrative", "-q"]);
        assert!(cli.verbosity.is_present());
        let Command::RewardTrack(args) = cli.command else {
            panic!("expected reward-track");
        };
        assert!(args.output.no_narrative);
    }
}
