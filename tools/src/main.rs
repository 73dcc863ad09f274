//! dash-runner: command-line view controller for the Steam catalog dashboard.
//!
//! Usage:
//!   dash-runner --db steam.db seed --seed 42 --titles 5000
//!   dash-runner --db steam.db reports
//!   dash-runner --db steam.db report dice --years 2010:2020 --scores 50:100 --list-titles
//!   dash-runner --db steam.db report pivot --format html --out pivot.html

mod cli;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use steamdash_core::{
    catalog_generator::CatalogGenerator,
    config::DashConfig,
    dashboard::{Dashboard, ReportOutcome},
    filter::FilterValue,
    render::{html_escape, html_page, visual_to_text, Visual},
    report::RenderedReport,
    store::DashStore,
};

use cli::{Cli, Command, OutputFormat, ReportArgs, SeedArgs};

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let db = cli.runtime.db.to_string_lossy().into_owned();

    match cli.command {
        Command::Seed(args) => seed(&db, &args),
        Command::Reports => {
            let dashboard = Dashboard::open(&db, load_config(cli.runtime.config.as_deref())?)?;
            list_reports(&dashboard);
            Ok(())
        }
        Command::Report(args) => {
            let dashboard = Dashboard::open(&db, load_config(cli.runtime.config.as_deref())?)?;
            report(&dashboard, &args)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<DashConfig> {
    match path {
        Some(path) => DashConfig::load(&path.to_string_lossy()),
        None => Ok(DashConfig::default()),
    }
}

fn seed(db: &str, args: &SeedArgs) -> Result<()> {
    let mut store = DashStore::open(db)?;
    store.migrate()?;
    let existing = store.title_count()?;
    if existing > 0 {
        bail!("{db} already holds {existing} titles; seed into a fresh file");
    }

    let catalog = CatalogGenerator::new(args.seed).generate(args.titles);
    let written = store.insert_titles(&catalog)?;
    log::info!("seeded {written} titles into {db} (seed {})", args.seed);
    println!("Seeded {written} titles into {db} (seed {})", args.seed);
    Ok(())
}

fn list_reports(dashboard: &Dashboard) {
    for listing in dashboard.reports() {
        println!(
            "{:<10} {}  [{}, {}]",
            listing.report.id(),
            listing.title,
            listing.chart,
            listing.attribution.id()
        );
        if listing.filters.is_empty() {
            println!("           (no filters)");
        }
        for filter in &listing.filters {
            match filter.bounds {
                Some(slider) => println!(
                    "           --{:<7} {}  range {}..={}  default {}:{}",
                    filter.kind.key(),
                    filter.label,
                    slider.min,
                    slider.max,
                    slider.default_low,
                    slider.default_high
                ),
                None => println!(
                    "           --{:<7} {}  default All",
                    filter.kind.key(),
                    filter.label
                ),
            }
        }
    }
}

fn report(dashboard: &Dashboard, args: &ReportArgs) -> Result<()> {
    let outcome = dashboard.render_outcome(args.report, &args.filter_input());

    let body = match (&outcome, args.format) {
        (_, OutputFormat::Json) => serde_json::to_string_pretty(&outcome)?,
        (ReportOutcome::Rendered { report }, OutputFormat::Html) => report_html(report)?,
        (ReportOutcome::Rendered { report }, OutputFormat::Text) => report_text(report),
        (ReportOutcome::Failed { kind, message, .. }, _) => {
            bail!("{} failed ({kind:?}): {message}", args.report)
        }
    };

    match &args.out {
        Some(path) => {
            fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} to {}", args.report, path.display());
        }
        None => println!("{body}"),
    }

    if let ReportOutcome::Failed { message, .. } = &outcome {
        bail!("{} failed: {message}", args.report);
    }
    Ok(())
}

fn report_text(report: &RenderedReport) -> String {
    let mut sections = vec![filter_summary(report), visual_to_text(&report.visual)];
    if let Some(detail) = &report.detail {
        sections.push(visual_to_text(detail));
    }
    sections.join("\n\n")
}

fn report_html(report: &RenderedReport) -> Result<String> {
    let Visual::Chart { spec, .. } = &report.visual else {
        bail!("{} does not produce a chart", report.report);
    };
    let mut page = html_page(&report.title, spec)?;
    if let Some(detail) = &report.detail {
        let listing = format!("<pre>{}</pre>\n</body>", html_escape(&visual_to_text(detail)));
        page = page.replacen("</body>", &listing, 1);
    }
    Ok(page)
}

fn filter_summary(report: &RenderedReport) -> String {
    let parts: Vec<String> = report
        .filters
        .iter()
        .map(|(kind, value)| match value {
            FilterValue::Range(range) => format!("{}={range}", kind.key()),
            FilterValue::Genre(choice) => format!("{}={choice}", kind.key()),
        })
        .collect();
    let filters = if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" ")
    };
    format!(
        "{}\nfilters: {filters}  source rows: {}  titles dropped: {}",
        report.report.title(),
        report.source_rows,
        report.shaping.dropped_titles
    )
}
