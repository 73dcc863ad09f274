use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use steamdash_core::{
    filter::{FilterInput, FilterKind, GenreChoice},
    report::ReportKind,
};

#[derive(Debug, Parser)]
#[command(name = "dash-runner", version, about = "Steam catalog OLAP dashboard")]
pub struct Cli {
    #[command(flatten)]
    pub runtime: RuntimeArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Args)]
pub struct RuntimeArgs {
    /// SQLite catalog to read (or write, for `seed`).
    #[arg(long, global = true, value_name = "PATH", default_value = "steam.db")]
    pub db: PathBuf,

    /// Dashboard config; built-in defaults when omitted.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one report.
    Report(ReportArgs),
    /// List the reports and the filters each one reads.
    Reports,
    /// Write a deterministic demo catalog.
    Seed(SeedArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Html,
    Text,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Report identifier (rollup, drilldown, dice, slice, pivot).
    #[arg(value_parser = parse_report_kind)]
    pub report: ReportKind,

    /// Release year range, e.g. 2010:2020.
    #[arg(long, value_name = "LO:HI", value_parser = parse_range)]
    pub years: Option<(i64, i64)>,

    /// User score range, e.g. 50:100.
    #[arg(long, value_name = "LO:HI", value_parser = parse_range)]
    pub scores: Option<(i64, i64)>,

    /// Price range in whole units, e.g. 0:50.
    #[arg(long, value_name = "LO:HI", value_parser = parse_range)]
    pub price: Option<(i64, i64)>,

    /// Restrict to one genre; "All" keeps every genre.
    #[arg(long, value_name = "NAME")]
    pub genre: Option<String>,

    /// Also run the title listing (dice only).
    #[arg(long)]
    pub list_titles: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write output here instead of stdout.
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

impl ReportArgs {
    /// Only flags the user actually passed become filter input, so a flag the
    /// report does not read is rejected rather than silently ignored.
    pub fn filter_input(&self) -> FilterInput {
        let mut input = FilterInput::new();
        for (kind, range) in [
            (FilterKind::YearRange, self.years),
            (FilterKind::ScoreRange, self.scores),
            (FilterKind::PriceRange, self.price),
        ] {
            if let Some((low, high)) = range {
                input = input.with_range(kind, low, high);
            }
        }
        if let Some(genre) = &self.genre {
            input = input.with_genre(GenreChoice::parse(genre));
        }
        if self.list_titles {
            input = input.with_detail();
        }
        input
    }
}

#[derive(Debug, Args)]
pub struct SeedArgs {
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 5_000)]
    pub titles: usize,
}

fn parse_report_kind(raw: &str) -> Result<ReportKind, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_range(raw: &str) -> Result<(i64, i64), String> {
    let (low, high) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LO:HI, got `{raw}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<i64>()
            .map_err(|_| format!("`{part}` is not an integer"))
    };
    Ok((parse(low)?, parse(high)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use steamdash_core::filter::FilterValue;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dash-runner").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    #[test]
    fn report_flags_become_filter_input() {
        let cli = parse(&[
            "report",
            "dice",
            "--years",
            "2010:2020",
            "--scores",
            "50:100",
            "--genre",
            "RPG",
            "--list-titles",
        ]);
        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        assert_eq!(args.report, ReportKind::Dice);
        assert_eq!(args.format, OutputFormat::Json);

        let input = args.filter_input();
        assert!(input.run_detail);
        assert_eq!(input.values.len(), 3);
        assert_eq!(
            input.values.get(&FilterKind::Genre),
            Some(&FilterValue::Genre(GenreChoice::Only("RPG".to_string())))
        );
    }

    #[test]
    fn omitted_flags_leave_filters_unset() {
        let cli = parse(&["report", "slice"]);
        let Command::Report(args) = cli.command else {
            panic!("expected report subcommand");
        };
        let input = args.filter_input();
        assert!(input.values.is_empty());
        assert!(!input.run_detail);
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = parse(&["reports", "--db", "catalog.db"]);
        assert_eq!(cli.runtime.db, PathBuf::from("catalog.db"));
        assert!(matches!(cli.command, Command::Reports));
    }

    #[test]
    fn malformed_range_is_rejected() {
        let err = Cli::try_parse_from(["dash-runner", "report", "dice", "--years", "2010-2020"]);
        assert!(err.is_err());
    }

    #[test]
    fn unknown_report_is_rejected() {
        let err = Cli::try_parse_from(["dash-runner", "report", "heatmap"]);
        assert!(err.is_err());
    }

    #[test]
    fn range_parser_accepts_spaces() {
        assert_eq!(parse_range(" 0 : 50 "), Ok((0, 50)));
        assert!(parse_range("abc:1").is_err());
    }
}
