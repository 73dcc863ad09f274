//! Roll-up: share of total peak concurrent users per genre.
//!
//! Source rows are summed per genre combination in SQL, exploded to single
//! genres, re-summed, then genres under the share threshold fold into one
//! "Others" slice of a donut chart.

use super::{base_style, RenderedReport, Report, ReportKind};
use crate::{
    config::DashConfig,
    error::DashResult,
    filter::{FilterSpec, FilterValues},
    query::QueryBuilder,
    render::{render_chart, ChartKind, ShapedTable},
    shaper::{self, Attribution},
    store::DashStore,
    types::GenreTotal,
};

const CHART_TITLE: &str = "Total Player Count by Genre";
const ATTRIBUTION: Attribution = Attribution::PerGenre;

pub struct RollUpReport {
    config: DashConfig,
    queries: QueryBuilder,
}

impl RollUpReport {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
            queries: QueryBuilder::new(config),
        }
    }
}

impl Report for RollUpReport {
    fn kind(&self) -> ReportKind {
        ReportKind::RollUp
    }

    fn filters(&self) -> Vec<FilterSpec> {
        Vec::new()
    }

    fn attribution(&self) -> Attribution {
        ATTRIBUTION
    }

    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport> {
        let rows = store.fetch(&self.queries.rollup())?.decode(|row| {
            Ok(GenreTotal {
                genres: row.opt_text("genres")?,
                titles: row.count("titles")?,
                total_peak_users: row.opt_f64("total_peak_users")?.unwrap_or(0.0),
            })
        })?;
        let source_rows = rows.len();

        let (exploded, stats) = shaper::explode(rows);
        shaper::check_dropped(&stats, self.config.max_dropped_row_ratio)?;
        let exploded = shaper::attribute(exploded, ATTRIBUTION);

        let totals = shaper::sum_by_genre(&exploded, |row| row.total_peak_users);
        let slices = shaper::bucket_small_shares(
            totals,
            self.config.others_threshold_pct,
            &self.config.others_label,
        );

        let charts = &self.config.charts;
        let mut style = base_style(&self.config, CHART_TITLE);
        style.legend_title = Some("Genres".to_string());
        style.palette = charts.rollup_palette.clone();

        let visual = render_chart(
            &ShapedTable::from_rows(&slices)?,
            &ChartKind::Pie {
                category: "genre".to_string(),
                value: "value".to_string(),
                hole: charts.rollup_hole,
            },
            &style,
        );

        Ok(RenderedReport {
            report: self.kind(),
            title: CHART_TITLE.to_string(),
            visual,
            detail: None,
            source_rows,
            shaping: stats,
            filters: filters.clone(),
        })
    }
}
