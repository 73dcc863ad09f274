//! View controller: owns the catalog connection and routes a report
//! selection plus raw filter input to exactly one report.
//!
//! FLOW (one render, nothing kept between renders):
//!   1. Look up the report for the selected kind
//!   2. Resolve raw input against the report's declared filters
//!   3. Run the report (query → shape → render)
//!
//! RULES:
//!   - Every render re-queries the store; no results are cached.
//!   - A failed render never takes the controller down. `render_outcome`
//!     turns the error into a user-facing message and the next selection
//!     renders normally.

use serde::Serialize;

use crate::{
    config::DashConfig,
    error::{DashResult, ErrorKind},
    filter::{FilterInput, FilterSpec, FilterValues},
    report::{RenderedReport, Report, ReportKind, ReportRegistry},
    shaper::Attribution,
    store::DashStore,
};

/// Result of one render as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Rendered {
        report: Box<RenderedReport>,
    },
    Failed {
        report: ReportKind,
        kind: ErrorKind,
        message: String,
    },
}

impl ReportOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, ReportOutcome::Rendered { .. })
    }
}

/// One entry of the view selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportListing {
    pub report: ReportKind,
    pub title: &'static str,
    pub chart: &'static str,
    pub attribution: Attribution,
    pub filters: Vec<FilterSpec>,
}

pub struct Dashboard {
    store: DashStore,
    config: DashConfig,
    registry: ReportRegistry,
}

impl Dashboard {
    /// Open `db_path` read-only and wire every report to `config`.
    pub fn open(db_path: &str, config: DashConfig) -> DashResult<Self> {
        let store = DashStore::open_read_only(db_path)?;
        log::info!("opened catalog {db_path} read-only");
        Self::from_store(store, config)
    }

    /// Build a controller around an existing store (used in tests).
    pub fn from_store(store: DashStore, config: DashConfig) -> DashResult<Self> {
        config.validate()?;
        let registry = ReportRegistry::build(&config);
        Ok(Self {
            store,
            config,
            registry,
        })
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// Selector entries in display order.
    pub fn reports(&self) -> Vec<ReportListing> {
        self.registry
            .iter()
            .map(|report| ReportListing {
                report: report.kind(),
                title: report.kind().title(),
                chart: report.kind().chart(),
                attribution: report.attribution(),
                filters: report.filters(),
            })
            .collect()
    }

    /// Resolve filters and run one report.
    pub fn render(&self, kind: ReportKind, input: &FilterInput) -> DashResult<RenderedReport> {
        let report = self.registry.get(kind)?;
        let filters = resolve_filters(report, input)?;
        log::info!(
            "rendering {kind} with {} filter(s){}",
            filters.iter().count(),
            if filters.run_detail { " + detail" } else { "" }
        );

        let rendered = report.run(&self.store, &filters)?;
        log::info!(
            "{kind}: {} source rows, {} titles dropped, {} shaped",
            rendered.source_rows,
            rendered.shaping.dropped_titles,
            rendered.shaping.output_rows
        );
        Ok(rendered)
    }

    /// Parse a selector entry (id or title) and render it.
    pub fn render_named(&self, name: &str, input: &FilterInput) -> DashResult<RenderedReport> {
        let kind: ReportKind = name.parse()?;
        self.render(kind, input)
    }

    /// Render, converting any failure into a `Failed` outcome.
    pub fn render_outcome(&self, kind: ReportKind, input: &FilterInput) -> ReportOutcome {
        match self.render(kind, input) {
            Ok(report) => ReportOutcome::Rendered {
                report: Box::new(report),
            },
            Err(err) => {
                log::warn!("{kind} failed: {err}");
                ReportOutcome::Failed {
                    report: kind,
                    kind: err.kind(),
                    message: err.to_string(),
                }
            }
        }
    }
}

fn resolve_filters(report: &dyn Report, input: &FilterInput) -> DashResult<FilterValues> {
    FilterValues::resolve(report.kind().id(), &report.filters(), input)
}
