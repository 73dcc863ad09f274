//! Slice: average positive and negative review counts per genre, for
//! titles inside one price band.

use serde::Serialize;

use super::{base_style, RenderedReport, Report, ReportKind};
use crate::{
    config::DashConfig,
    error::{DashError, DashResult},
    filter::{FilterKind, FilterSpec, FilterValues},
    query::QueryBuilder,
    render::{render_chart, ChartKind, ShapedTable},
    shaper::{self, Attribution},
    store::DashStore,
    types::{Genre, ReviewAverages},
};

const CHART_TITLE: &str = "Average Positive and Negative Reviews by Genre";
const ATTRIBUTION: Attribution = Attribution::LeadingPerGenre;

#[derive(Debug, Serialize)]
struct GenreReviews {
    genre: Genre,
    avg_positive_reviews: f64,
    avg_negative_reviews: f64,
}

pub struct SliceReport {
    config: DashConfig,
    queries: QueryBuilder,
}

impl SliceReport {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
            queries: QueryBuilder::new(config),
        }
    }
}

impl Report for SliceReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Slice
    }

    fn filters(&self) -> Vec<FilterSpec> {
        vec![FilterSpec::declare(
            FilterKind::PriceRange,
            &self.config.filters,
        )]
    }

    fn attribution(&self) -> Attribution {
        ATTRIBUTION
    }

    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport> {
        let price = filters
            .range(FilterKind::PriceRange)
            .ok_or(DashError::FilterTypeMismatch {
                filter: FilterKind::PriceRange.key(),
                expected: "range",
            })?;

        let rows = store.fetch(&self.queries.slice(price))?.decode(|row| {
            Ok(ReviewAverages {
                genres: row.opt_text("genres")?,
                titles: row.count("titles")?,
                avg_positive_reviews: row.f64("avg_positive_reviews")?,
                avg_negative_reviews: row.f64("avg_negative_reviews")?,
            })
        })?;
        let source_rows = rows.len();

        let (exploded, stats) = shaper::explode(rows);
        shaper::check_dropped(&stats, self.config.max_dropped_row_ratio)?;

        // Rows arrive ordered by average positive reviews, so each genre keeps
        // the figures of its strongest combination.
        let per_genre: Vec<GenreReviews> = shaper::attribute(exploded, ATTRIBUTION)
            .into_iter()
            .map(|row| GenreReviews {
                genre: row.genre,
                avg_positive_reviews: row.record.avg_positive_reviews,
                avg_negative_reviews: row.record.avg_negative_reviews,
            })
            .collect();

        let mut style = base_style(&self.config, CHART_TITLE);
        style.x_title = Some("Genre".to_string());
        style.y_title = Some("Average Review Count".to_string());
        style.legend_title = Some("Review Type".to_string());
        style.palette = self.config.charts.slice_palette.clone();

        let visual = render_chart(
            &ShapedTable::from_rows(&per_genre)?,
            &ChartKind::GroupedBar {
                x: "genre".to_string(),
                measures: vec![
                    "avg_positive_reviews".to_string(),
                    "avg_negative_reviews".to_string(),
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
