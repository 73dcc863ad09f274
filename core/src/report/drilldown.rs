//! Drill-down: average two-week playtime per release year, one line per
//! configured genre, smoothed with a trailing rolling mean.

use super::{base_style, passthrough_stats, RenderedReport, Report, ReportKind};
use crate::{
    config::DashConfig,
    error::{DashError, DashResult},
    filter::{FilterSpec, FilterValues},
    query::QueryBuilder,
    render::{render_chart, ChartKind, ShapedTable},
    shaper::{self, Attribution},
    store::DashStore,
    types::{Year, YearlyPlaytime},
};

const CHART_TITLE: &str = "Average Playtime (Last Two Weeks) by Year and Genre";
// Genres are matched in SQL, one query each, so a title feeds every line
// it belongs to.
const ATTRIBUTION: Attribution = Attribution::PerGenre;

pub struct DrillDownReport {
    config: DashConfig,
    queries: QueryBuilder,
}

impl DrillDownReport {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
            queries: QueryBuilder::new(config),
        }
    }

    fn fetch_genre(&self, store: &DashStore, genre: &str) -> DashResult<Vec<YearlyPlaytime>> {
        store.fetch(&self.queries.drilldown(genre))?.decode(|row| {
            let year = row.i64("release_year")?;
            Ok(YearlyPlaytime {
                genre: row.text("genre")?,
                release_year: Year::try_from(year).map_err(|_| DashError::Malformed {
                    column: "release_year".to_string(),
                    reason: format!("year {year} out of range"),
                })?,
                average_playtime: row.f64("average_playtime")?,
            })
        })
    }
}

impl Report for DrillDownReport {
    fn kind(&self) -> ReportKind {
        ReportKind::DrillDown
    }

    fn filters(&self) -> Vec<FilterSpec> {
        Vec::new()
    }

    fn attribution(&self) -> Attribution {
        ATTRIBUTION
    }

    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport> {
        let mut points = Vec::new();
        for genre in &self.config.drilldown_genres {
            let rows = self.fetch_genre(store, genre)?;
            log::debug!("drilldown: {} yearly points for {genre}", rows.len());
            points.extend(rows);
        }
        let source_rows = points.len();

        let smoothed = shaper::smooth_by_genre(points, self.config.smoothing_window);

        let charts = &self.config.charts;
        let mut style = base_style(&self.config, CHART_TITLE);
        style.x_title = Some("Release Year".to_string());
        style.y_title = Some("Average Playtime (Hours)".to_string());
        style.legend_title = Some("Genre".to_string());
        style.palette = charts.drilldown_palette.clone();
        style.value_range = Some(charts.drilldown_y_range);

        let visual = render_chart(
            &ShapedTable::from_rows(&smoothed)?,
            &ChartKind::Line {
                x: "release_year".to_string(),
                y: "average_playtime_smoothed".to_string(),
                series: "genre".to_string(),
                marker_size: charts.drilldown_marker_size,
            },
            &style,
        );

        Ok(RenderedReport {
            report: self.kind(),
            title: CHART_TITLE.to_string(),
            visual,
            detail: None,
            source_rows,
            shaping: passthrough_stats(source_rows),
            filters: filters.clone(),
        })
    }
}
