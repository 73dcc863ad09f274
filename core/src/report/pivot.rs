//! Pivot: lifetime against recent average playtime per genre, drawn as
//! overlaid horizontal bars.

use serde::Serialize;

use super::{base_style, RenderedReport, Report, ReportKind};
use crate::{
    config::DashConfig,
    error::DashResult,
    filter::{FilterSpec, FilterValues},
    query::QueryBuilder,
    render::{render_chart, ChartKind, ShapedTable},
    shaper::{self, Attribution},
    store::DashStore,
    types::{Genre, PlaytimeAverages},
};

const CHART_TITLE: &str = "Average Playtime by Genre";
const ATTRIBUTION: Attribution = Attribution::PerGenre;

#[derive(Debug, Serialize)]
struct GenrePlaytime {
    genre: Genre,
    avg_playtime_forever: f64,
    avg_playtime_recent: f64,
}

pub struct PivotReport {
    config: DashConfig,
    queries: QueryBuilder,
}

impl PivotReport {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
            queries: QueryBuilder::new(config),
        }
    }
}

impl Report for PivotReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Pivot
    }

    fn filters(&self) -> Vec<FilterSpec> {
        Vec::new()
    }

    fn attribution(&self) -> Attribution {
        ATTRIBUTION
    }

    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport> {
        let rows = store.fetch(&self.queries.pivot())?.decode(|row| {
            Ok(PlaytimeAverages {
                genres: row.opt_text("genres")?,
                titles: row.count("titles")?,
                avg_playtime_forever: row.f64("avg_playtime_forever")?,
                avg_playtime_recent: row.f64("avg_playtime_recent")?,
            })
        })?;
        let source_rows = rows.len();

        let (exploded, stats) = shaper::explode(rows);
        shaper::check_dropped(&stats, self.config.max_dropped_row_ratio)?;
        let exploded = shaper::attribute(exploded, ATTRIBUTION);

        let per_genre: Vec<GenrePlaytime> = shaper::mean_by_genre(&exploded, |row| {
            [row.avg_playtime_forever, row.avg_playtime_recent]
        })
        .into_iter()
        .map(|(genre, [forever, recent])| GenrePlaytime {
            genre,
            avg_playtime_forever: forever,
            avg_playtime_recent: recent,
        })
        .collect();

        let charts = &self.config.charts;
        let mut style = base_style(&self.config, CHART_TITLE);
        style.x_title = Some("Average Playtime (Hours)".to_string());
        style.y_title = Some("Genre".to_string());
        style.legend_title = Some("Playtime".to_string());
        style.palette = vec![
            charts.pivot_forever_color.clone(),
            charts.pivot_recent_color.clone(),
        ];
        style.width = Some(charts.pivot_width);
        style.height = Some(charts.pivot_height);
        style.background = Some(charts.pivot_background.clone());

        let visual = render_chart(
            &ShapedTable::from_rows(&per_genre)?,
            &ChartKind::HorizontalOverlayBar {
                y: "genre".to_string(),
                measures: vec![
                    "avg_playtime_forever".to_string(),
                    "avg_playtime_recent".to_string(),
                ],
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
