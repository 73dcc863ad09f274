//! SQL construction for the five reports.
//!
//! Every statement is static text plus numbered bind parameters; filter
//! values are never spliced into the SQL string. Values reaching this module
//! have already been bounds-checked by `filter::FilterValues::resolve`.

use rusqlite::types::Value as SqlValue;

use crate::config::{DashConfig, GenreMatch, QualityPredicates};
use crate::error::{DashError, DashResult};
use crate::filter::{GenreChoice, IntRange};

/// A read-only statement and the values bound to its `?N` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Collects bind values and hands out their placeholders.
#[derive(Debug, Default)]
struct Binder {
    params: Vec<SqlValue>,
}

impl Binder {
    fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        self.params.push(value.into());
        format!("?{}", self.params.len())
    }

    fn finish(self, sql: String) -> BoundQuery {
        BoundQuery {
            sql,
            params: self.params,
        }
    }
}

fn where_clause(predicates: &[String]) -> String {
    if predicates.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", predicates.join("\n  AND "))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QueryBuilder {
    genre_match: GenreMatch,
    quality: QualityPredicates,
}

impl QueryBuilder {
    pub fn new(config: &DashConfig) -> Self {
        Self {
            genre_match: config.genre_match,
            quality: config.quality,
        }
    }

    fn genre_predicate(&self, placeholder: &str) -> String {
        match self.genre_match {
            GenreMatch::Membership => format!("has_genre(ai.Genres, {placeholder})"),
            GenreMatch::Substring => format!("instr(ai.Genres, {placeholder}) > 0"),
        }
    }

    fn playtime_predicates(&self) -> Vec<String> {
        if self.quality.require_positive_playtime {
            vec![
                "a.average_playtime_twoweeks > 0".to_string(),
                "a.average_playtime_forever > 0".to_string(),
            ]
        } else {
            Vec::new()
        }
    }

    /// Roll-up: summed peak users and title count per genre combination.
    pub fn rollup(&self) -> BoundQuery {
        let sql = "
SELECT
    ai.Genres AS genres,
    COUNT(*) AS titles,
    SUM(a.peak_ccu) AS total_peak_users
FROM app a
JOIN app_info ai ON a.info_id = ai.info_id
GROUP BY ai.Genres
ORDER BY ai.Genres"
            .to_string();
        Binder::default().finish(sql)
    }

    /// Drill-down: average two-week playtime per release year for one genre.
    pub fn drilldown(&self, genre: &str) -> BoundQuery {
        let mut binder = Binder::default();
        let genre_ph = binder.bind(genre.to_string());

        let mut predicates = vec![
            self.genre_predicate(&genre_ph),
            "release_year(ai.release_date) IS NOT NULL".to_string(),
        ];
        predicates.extend(self.playtime_predicates());

        let sql = format!(
            "
SELECT
    AVG(a.average_playtime_twoweeks) AS average_playtime,
    {genre_ph} AS genre,
    release_year(ai.release_date) AS release_year
FROM app_info ai
JOIN app a ON a.info_id = ai.info_id
{where_sql}
GROUP BY release_year
ORDER BY release_year",
            where_sql = where_clause(&predicates),
        );
        binder.finish(sql)
    }

    fn dice_predicates(
        &self,
        binder: &mut Binder,
        years: IntRange,
        scores: IntRange,
        genre: &GenreChoice,
    ) -> Vec<String> {
        let score_low = binder.bind(scores.low);
        let score_high = binder.bind(scores.high);
        let year_low = binder.bind(years.low);
        let year_high = binder.bind(years.high);

        let mut predicates = vec![
            format!("a.user_score BETWEEN {score_low} AND {score_high}"),
            format!("release_year(ai.release_date) BETWEEN {year_low} AND {year_high}"),
        ];
        if let GenreChoice::Only(name) = genre {
            let genre_ph = binder.bind(name.clone());
            predicates.push(self.genre_predicate(&genre_ph));
        }
        predicates
    }

    /// Dice: genre fields of every title inside the year × score sub-cube.
    pub fn dice_genres(&self, years: IntRange, scores: IntRange, genre: &GenreChoice) -> BoundQuery {
        let mut binder = Binder::default();
        let predicates = self.dice_predicates(&mut binder, years, scores, genre);
        let sql = format!(
            "
SELECT
    a.app_id AS app_id,
    ai.Genres AS genres
FROM app_info ai
JOIN app a ON a.info_id = ai.info_id
{where_sql}
ORDER BY a.app_id",
            where_sql = where_clause(&predicates),
        );
        binder.finish(sql)
    }

    /// Dice detail listing: the titles themselves, most-played first.
    pub fn dice_listing(
        &self,
        years: IntRange,
        scores: IntRange,
        genre: &GenreChoice,
        row_cap: usize,
    ) -> BoundQuery {
        let mut binder = Binder::default();
        let predicates = self.dice_predicates(&mut binder, years, scores, genre);
        let limit_ph = binder.bind(i64::try_from(row_cap).unwrap_or(i64::MAX));
        let sql = format!(
            "
SELECT
    ai.name AS name,
    ai.release_date AS release_date,
    release_year(ai.release_date) AS release_year,
    ai.Genres AS genres,
    a.peak_ccu AS peak_ccu,
    a.user_score AS user_score,
    ai.Price AS price
FROM app_info ai
JOIN app a ON a.info_id = ai.info_id
{where_sql}
ORDER BY a.peak_ccu DESC, ai.name ASC, a.app_id ASC
LIMIT {limit_ph}",
            where_sql = where_clause(&predicates),
        );
        binder.finish(sql)
    }

    /// Slice: review averages per genre combination inside a price band.
    pub fn slice(&self, price: IntRange) -> BoundQuery {
        let mut binder = Binder::default();
        let price_low = binder.bind(price.low);
        let price_high = binder.bind(price.high);

        let mut predicates = vec![format!("ai.Price BETWEEN {price_low} AND {price_high}")];
        if self.quality.require_positive_reviews {
            predicates.push("a.positive_reviews > 0".to_string());
            predicates.push("a.negative_reviews > 0".to_string());
        }

        let sql = format!(
            "
SELECT
    ai.Genres AS genres,
    COUNT(*) AS titles,
    AVG(a.positive_reviews) AS avg_positive_reviews,
    AVG(a.negative_reviews) AS avg_negative_reviews
FROM app a
JOIN app_info ai ON a.info_id = ai.info_id
{where_sql}
GROUP BY ai.Genres
ORDER BY avg_positive_reviews DESC, ai.Genres ASC",
            where_sql = where_clause(&predicates),
        );
        binder.finish(sql)
    }

    /// Pivot: lifetime and recent playtime averages per genre combination.
    pub fn pivot(&self) -> BoundQuery {
        let sql = format!(
            "
SELECT
    ai.Genres AS genres,
    COUNT(*) AS titles,
    AVG(a.average_playtime_forever) AS avg_playtime_forever,
    AVG(a.average_playtime_twoweeks) AS avg_playtime_recent
FROM app a
JOIN app_info ai ON a.info_id = ai.info_id
{where_sql}
GROUP BY ai.Genres
ORDER BY ai.Genres",
            where_sql = where_clause(&self.playtime_predicates()),
        );
        Binder::default().finish(sql)
    }
}

// ── Read-only guardrail ──────────────────────────────────────────

/// Reject anything but a single SELECT / WITH ... SELECT statement.
pub fn ensure_read_only(raw_sql: &str) -> DashResult<()> {
    let candidate = strip_trailing_semicolons(raw_sql);
    if candidate.is_empty() {
        return Err(rejected("empty statement"));
    }
    if candidate.contains(';') {
        return Err(rejected("multi-statement SQL"));
    }

    let normalized = candidate.to_ascii_lowercase();
    if let Some(keyword) = first_mutating_keyword(&normalized) {
        return Err(rejected(&format!("mutating keyword `{keyword}`")));
    }
    if !(normalized.starts_with("select") || normalized.starts_with("with")) {
        return Err(rejected("statement must start with SELECT or WITH"));
    }
    Ok(())
}

fn strip_trailing_semicolons(raw_sql: &str) -> &str {
    let mut candidate = raw_sql.trim();
    while let Some(stripped) = candidate.strip_suffix(';') {
        candidate = stripped.trim_end();
    }
    candidate
}

fn first_mutating_keyword(normalized_sql: &str) -> Option<&str> {
    const MUTATING_KEYWORDS: &[&str] = &[
        "insert", "update", "delete", "create", "alter", "drop", "replace", "truncate", "attach",
        "detach", "pragma", "vacuum", "reindex", "begin", "commit", "rollback",
    ];

    normalized_sql
        .split(|ch: char| !ch.is_ascii_alphanumeric() && ch != '_')
        .find(|token| MUTATING_KEYWORDS.contains(token))
}

fn rejected(reason: &str) -> DashError {
    DashError::UnsupportedStatement {
        reason: reason.to_string(),
    }
}
