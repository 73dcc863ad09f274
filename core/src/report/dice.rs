//! Dice: titles inside a release-year × user-score sub-cube, counted per
//! genre. An optional genre filter narrows the cube further.
//!
//! The detail listing only runs when the caller asks for it explicitly.
//! It is capped at `detail_row_cap` titles and shows each title once.

use serde::Serialize;

use super::{base_style, RenderedReport, Report, ReportKind};
use crate::{
    config::DashConfig,
    error::{DashError, DashResult},
    filter::{FilterKind, FilterSpec, FilterValues, GenreChoice, IntRange},
    query::QueryBuilder,
    render::{render_chart, render_table, ChartKind, ShapedTable, Visual},
    shaper::{self, Attribution},
    store::DashStore,
    types::{HasGenres, TitleIdentity, TitleListing, Year},
};

const CHART_TITLE: &str = "Number of Games per Genre Given Minimum User Score";
const LISTING_TITLE: &str = "Games Matching the Selected Filters";
const ATTRIBUTION: Attribution = Attribution::PerGenre;
const LISTING_ATTRIBUTION: Attribution = Attribution::PerTitle;
const LISTING_COLUMNS: [&str; 6] = [
    "name",
    "release_date",
    "genres",
    "peak_ccu",
    "user_score",
    "price",
];

/// One title inside the sub-cube; only its genres matter for the count.
#[derive(Debug, Clone)]
struct DicedTitle {
    app_id: i64,
    genres: Option<String>,
}

impl HasGenres for DicedTitle {
    fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }
}

impl TitleIdentity for DicedTitle {
    type Key = i64;

    fn identity(&self) -> i64 {
        self.app_id
    }
}

#[derive(Debug, Serialize)]
struct ListingRow<'a> {
    name: &'a str,
    release_date: &'a str,
    release_year: Year,
    genres: Option<&'a str>,
    peak_ccu: i64,
    user_score: i64,
    price: f64,
}

impl<'a> From<&'a TitleListing> for ListingRow<'a> {
    fn from(title: &'a TitleListing) -> Self {
        Self {
            name: &title.name,
            release_date: &title.release_date,
            release_year: title.release_year,
            genres: title.genres.as_deref(),
            peak_ccu: title.peak_ccu,
            user_score: title.user_score,
            price: title.price,
        }
    }
}

pub struct DiceReport {
    config: DashConfig,
    queries: QueryBuilder,
}

impl DiceReport {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            config: config.clone(),
            queries: QueryBuilder::new(config),
        }
    }

    fn listing(
        &self,
        store: &DashStore,
        years: IntRange,
        scores: IntRange,
        genre: &GenreChoice,
    ) -> DashResult<Visual> {
        let query = self
            .queries
            .dice_listing(years, scores, genre, self.config.detail_row_cap);
        let titles = store.fetch(&query)?.decode(|row| {
            let year = row.i64("release_year")?;
            Ok(TitleListing {
                name: row.text("name")?,
                release_date: row.text("release_date")?,
                release_year: Year::try_from(year).map_err(|_| DashError::Malformed {
                    column: "release_year".to_string(),
                    reason: format!("year {year} out of range"),
                })?,
                genres: row.opt_text("genres")?,
                peak_ccu: row.i64("peak_ccu")?,
                user_score: row.i64("user_score")?,
                price: row.opt_f64("price")?.unwrap_or(0.0),
            })
        })?;

        let (exploded, stats) = shaper::explode(titles);
        shaper::check_dropped(&stats, self.config.max_dropped_row_ratio)?;
        let unique = shaper::attribute(exploded, LISTING_ATTRIBUTION);
        log::debug!(
            "dice listing: {} exploded rows collapsed to {} titles",
            stats.output_rows,
            unique.len()
        );

        let rows: Vec<ListingRow<'_>> = unique
            .iter()
            .map(|row| ListingRow::from(&row.record))
            .collect();
        Ok(render_table(
            &ShapedTable::from_rows(&rows)?,
            LISTING_TITLE,
            &LISTING_COLUMNS,
        ))
    }
}

impl Report for DiceReport {
    fn kind(&self) -> ReportKind {
        ReportKind::Dice
    }

    fn filters(&self) -> Vec<FilterSpec> {
        let bounds = &self.config.filters;
        vec![
            FilterSpec::declare(FilterKind::YearRange, bounds),
            FilterSpec::declare(FilterKind::ScoreRange, bounds),
            FilterSpec::declare(FilterKind::Genre, bounds),
        ]
    }

    fn attribution(&self) -> Attribution {
        ATTRIBUTION
    }

    fn run(&self, store: &DashStore, filters: &FilterValues) -> DashResult<RenderedReport> {
        let years = required_range(filters, FilterKind::YearRange)?;
        let scores = required_range(filters, FilterKind::ScoreRange)?;
        let genre = filters.genre();

        let titles = store
            .fetch(&self.queries.dice_genres(years, scores, &genre))?
            .decode(|row| {
                Ok(DicedTitle {
                    app_id: row.i64("app_id")?,
                    genres: row.opt_text("genres")?,
                })
            })?;
        let source_rows = titles.len();

        let (exploded, stats) = shaper::explode(titles);
        shaper::check_dropped(&stats, self.config.max_dropped_row_ratio)?;
        let exploded = shaper::attribute(exploded, ATTRIBUTION);
        let counts = shaper::count_by_genre(&exploded);

        let mut style = base_style(&self.config, CHART_TITLE);
        style.x_title = Some("Genre".to_string());
        style.y_title = Some("Number of Games".to_string());
        style.legend_title = Some("Genre".to_string());
        style.palette = self.config.charts.dice_palette.clone();

        let visual = render_chart(
            &ShapedTable::from_rows(&counts)?,
            &ChartKind::Bar {
                x: "genre".to_string(),
                y: "count".to_string(),
            },
            &style,
        );

        let detail = if filters.run_detail {
            Some(self.listing(store, years, scores, &genre)?)
        } else {
            None
        };

        Ok(RenderedReport {
            report: self.kind(),
            title: CHART_TITLE.to_string(),
            visual,
            detail,
            source_rows,
            shaping: stats,
            filters: filters.clone(),
        })
    }
}

fn required_range(filters: &FilterValues, kind: FilterKind) -> DashResult<IntRange> {
    filters.range(kind).ok_or(DashError::FilterTypeMismatch {
        filter: kind.key(),
        expected: "range",
    })
}
