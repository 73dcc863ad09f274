//! Report trait and registry.
//!
//! RULE: Every report implements Report.
//! A report declares the filters it reads, builds its queries through
//! `QueryBuilder`, fetches through `DashStore`, shapes with `shaper` and
//! hands one visual to `render`. Reports never talk to each other.
//!
//! REGISTRATION ORDER (fixed, matches the view selector):
//!   1. Roll-Up
//!   2. Drill-Down
//!   3. Dice
//!   4. Slice
//!   5. Pivot

mod dice;
mod drilldown;
mod pivot;
mod rollup;
mod slice;

pub use dice::DiceReport;
pub use drilldown::DrillDownReport;
pub use pivot::PivotReport;
pub use rollup::RollUpReport;
pub use slice::SliceReport;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    config::DashConfig,
    error::{DashError, DashResult},
    filter::{FilterSpec, FilterValues},
    render::{ChartStyle, Visual},
    shaper::{Attribution, ExplodeStats},
    store::DashStore,
};

/// Serialised with the same identifiers as `id()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    RollUp,
    DrillDown,
    Dice,
    Slice,
    Pivot,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::RollUp,
        ReportKind::DrillDown,
        ReportKind::Dice,
        ReportKind::Slice,
        ReportKind::Pivot,
    ];

    /// Stable identifier used on the command line and in logs.
    pub fn id(self) -> &'static str {
        match self {
            ReportKind::RollUp => "rollup",
            ReportKind::DrillDown => "drilldown",
            ReportKind::Dice => "dice",
            ReportKind::Slice => "slice",
            ReportKind::Pivot => "pivot",
        }
    }

    /// Entry shown in the view selector.
    pub fn title(self) -> &'static str {
        match self {
            ReportKind::RollUp => "Roll-Up: Total Player Count by Genre",
            ReportKind::DrillDown => "Drill-Down: Average Playtime by Year and Genre",
            ReportKind::Dice => "Dice: Games by Release Year and User Score",
            ReportKind::Slice => "Slice: Reviews by Genre within a Price Range",
            ReportKind::Pivot => "Pivot: Lifetime vs Recent Playtime by Genre",
        }
    }

    /// Chart family drawn by the report.
    pub fn chart(self) -> &'static str {
        match self {
            ReportKind::RollUp => "donut",
            ReportKind::DrillDown => "line",
            ReportKind::Dice => "bar",
            ReportKind::Slice => "grouped_bar",
            ReportKind::Pivot => "horizontal_overlay_bar",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ReportKind {
    type Err = DashError;

    /// Accepts the identifier (any case) or the exact selector title.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        ReportKind::ALL
            .into_iter()
            .find(|kind| kind.id().eq_ignore_ascii_case(wanted) || kind.title() == wanted)
            .ok_or_else(|| DashError::UnknownReport {
                name: raw.to_string(),
            })
    }
}

/// Everything one render produced: the main visual, an optional detail
/// listing, and the bookkeeping needed to explain the picture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedReport {
    pub report: ReportKind,
    pub title: String,
    pub visual: Visual,
    pub detail: Option<Visual>,
    pub source_rows: usize,
    pub shaping: ExplodeStats,
    pub filters: FilterValues,
}

/// The contract every report must fulfill.
pub trait Report: Send {
    fn kind(&self) -> ReportKind;

    /// Filters this report reads, with slider geometry from config.
    fn filters(&self) -> Vec<FilterSpec>;

    /// How a multi-genre title contributes to the main visual.
    fn attribution(&self) -> Attribution;

    /// Query, shape and render against already-resolved filter values.
    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport>;
}

/// All reports in selector order.
pub struct ReportRegistry {
    reports: Vec<Box<dyn Report>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self {
            reports: Vec::new(),
        }
    }

    /// Build a registry with all five reports wired to `config`.
    pub fn build(config: &DashConfig) -> Self {
        let mut registry = ReportRegistry::new();
        registry.register(Box::new(RollUpReport::new(config)));
        registry.register(Box::new(DrillDownReport::new(config)));
        registry.register(Box::new(DiceReport::new(config)));
        registry.register(Box::new(SliceReport::new(config)));
        registry.register(Box::new(PivotReport::new(config)));
        registry
    }

    pub fn register(&mut self, report: Box<dyn Report>) {
        self.reports.push(report);
    }

    pub fn get(&self, kind: ReportKind) -> DashResult<&dyn Report> {
        self.reports
            .iter()
            .find(|report| report.kind() == kind)
            .map(|report| report.as_ref())
            .ok_or_else(|| DashError::UnknownReport {
                name: kind.id().to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Report> {
        self.reports.iter().map(|report| report.as_ref())
    }

}

impl Default for ReportRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Base chart style shared by every report.
fn base_style(config: &DashConfig, title: &str) -> ChartStyle {
    ChartStyle {
        title: title.to_string(),
        title_font_size: config.charts.title_font_size,
        ..ChartStyle::default()
    }
}

/// Shaping stats for reports whose rows never pass through explode.
fn passthrough_stats(rows: usize) -> ExplodeStats {
    ExplodeStats {
        input_titles: rows,
        dropped_titles: 0,
        output_rows: rows,
    }
}
