//! Result shaping: turns raw source rows into the tables charts consume.
//!
//! Steps, in the order reports apply them:
//!   1. Explode     one row per (row, genre) from the comma-joined field
//!   2. Attribute   the report's declared `Attribution` strategy
//!   3. Aggregate   sum / mean / count per genre, or per genre × year
//!   4. Derive      share percentages, "Others" bucketing, rolling means
//!
//! Rows without a usable genre field are dropped during explode. Losses are
//! counted in titles, so a grouped source row weighs as many titles as it
//! stands for; `check_dropped` turns an unbounded loss into a `ShapingError`.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use serde::Serialize;

use crate::error::{DashError, DashResult};
use crate::types::{Genre, HasGenres, TitleIdentity, Year, YearlyPlaytime};

/// Split a comma-joined genre field. Tokens are trimmed; empty tokens are
/// skipped, so `"Action,,RPG"` and `"Action, RPG"` both give two genres.
pub fn split_genres(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|token| !token.is_empty())
}

// ── Explode ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploded<T> {
    pub genre: Genre,
    pub record: T,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExplodeStats {
    /// Titles behind the input rows.
    pub input_titles: usize,
    /// Titles lost because their row had no genre.
    pub dropped_titles: usize,
    /// Exploded (row, genre) pairs.
    pub output_rows: usize,
}

impl ExplodeStats {
    pub fn dropped_ratio(&self) -> f64 {
        if self.input_titles == 0 {
            0.0
        } else {
            self.dropped_titles as f64 / self.input_titles as f64
        }
    }
}

/// One output row per genre of each input row; every other field is shared.
pub fn explode<T: HasGenres + Clone>(rows: Vec<T>) -> (Vec<Exploded<T>>, ExplodeStats) {
    let mut stats = ExplodeStats::default();
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        stats.input_titles += row.titles();
        let genres: Vec<Genre> = row
            .genres()
            .map(|raw| split_genres(raw).map(str::to_string).collect())
            .unwrap_or_default();
        if genres.is_empty() {
            stats.dropped_titles += row.titles();
            continue;
        }
        for genre in genres {
            out.push(Exploded {
                genre,
                record: row.clone(),
            });
        }
    }

    stats.output_rows = out.len();
    if stats.dropped_titles > 0 {
        log::warn!(
            "explode dropped {} of {} titles with no genre",
            stats.dropped_titles,
            stats.input_titles
        );
    }
    (out, stats)
}

/// Fail when more than `max_ratio` of the input titles were dropped.
pub fn check_dropped(stats: &ExplodeStats, max_ratio: f64) -> DashResult<()> {
    if stats.dropped_ratio() > max_ratio {
        return Err(DashError::DroppedRowsExceeded {
            dropped: stats.dropped_titles,
            total: stats.input_titles,
            max_ratio,
        });
    }
    Ok(())
}

// ── Attribution & deduplication ─────────────────────────────────

/// How a title with several genres contributes after explode. Every report
/// declares one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// Count the title once under each of its genres (genre-level totals).
    PerGenre,
    /// Keep one row per title identity (detail listings).
    PerTitle,
    /// Keep only the first row per genre; input arrives ranked.
    LeadingPerGenre,
}

impl Attribution {
    pub fn id(self) -> &'static str {
        match self {
            Attribution::PerGenre => "per_genre",
            Attribution::PerTitle => "per_title",
            Attribution::LeadingPerGenre => "leading_per_genre",
        }
    }
}

/// Drop rows repeating on `key`, keeping the first occurrence in order.
pub fn dedupe_by_key<T, K, F>(rows: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    rows.into_iter().filter(|row| seen.insert(key(row))).collect()
}

/// Apply an attribution strategy to exploded rows.
pub fn attribute<T: TitleIdentity>(
    rows: Vec<Exploded<T>>,
    attribution: Attribution,
) -> Vec<Exploded<T>> {
    match attribution {
        Attribution::PerGenre => rows,
        Attribution::PerTitle => dedupe_by_key(rows, |row| row.record.identity()),
        Attribution::LeadingPerGenre => dedupe_by_key(rows, |row| row.genre.clone()),
    }
}

// ── Aggregation ─────────────────────────────────────────────────

/// Sum `value` per genre, genres in ascending order.
pub fn sum_by_genre<T>(rows: &[Exploded<T>], value: impl Fn(&T) -> f64) -> Vec<(Genre, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        *totals.entry(row.genre.as_str()).or_insert(0.0) += value(&row.record);
    }
    totals
        .into_iter()
        .map(|(genre, total)| (genre.to_string(), total))
        .collect()
}

/// Arithmetic mean of each of the `N` measures per genre.
pub fn mean_by_genre<T, const N: usize>(
    rows: &[Exploded<T>],
    measures: impl Fn(&T) -> [f64; N],
) -> Vec<(Genre, [f64; N])> {
    let mut acc: BTreeMap<&str, ([f64; N], usize)> = BTreeMap::new();
    for row in rows {
        let entry = acc.entry(row.genre.as_str()).or_insert(([0.0; N], 0));
        for (slot, value) in entry.0.iter_mut().zip(measures(&row.record)) {
            *slot += value;
        }
        entry.1 += 1;
    }
    acc.into_iter()
        .map(|(genre, (sums, n))| (genre.to_string(), sums.map(|s| s / n as f64)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenreCount {
    pub genre: Genre,
    pub count: usize,
}

/// Rows per genre, most frequent first; ties break on genre name.
pub fn count_by_genre<T>(rows: &[Exploded<T>]) -> Vec<GenreCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in rows {
        *counts.entry(row.genre.as_str()).or_insert(0) += 1;
    }
    let mut out: Vec<GenreCount> = counts
        .into_iter()
        .map(|(genre, count)| GenreCount {
            genre: genre.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.genre.cmp(&b.genre)));
    out
}

// ── Share bucketing (roll-up) ───────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareSlice {
    pub genre: Genre,
    pub value: f64,
    pub percentage: f64,
}

/// Compute each genre's share of the grand total and fold every genre whose
/// share is strictly below `threshold_pct` into one `others_label` bucket,
/// appended last. No bucket is added when nothing falls below the threshold.
pub fn bucket_small_shares(
    totals: Vec<(Genre, f64)>,
    threshold_pct: f64,
    others_label: &str,
) -> Vec<ShareSlice> {
    let grand_total: f64 = totals.iter().map(|(_, v)| v).sum();
    let share = |value: f64| {
        if grand_total > 0.0 {
            value / grand_total * 100.0
        } else {
            0.0
        }
    };
    if grand_total <= 0.0 {
        return totals
            .into_iter()
            .map(|(genre, value)| ShareSlice {
                genre,
                value,
                percentage: 0.0,
            })
            .collect();
    }

    let mut kept = Vec::with_capacity(totals.len());
    let mut others_value = 0.0;
    let mut folded = 0usize;
    for (genre, value) in totals {
        let percentage = share(value);
        if percentage < threshold_pct {
            others_value += value;
            folded += 1;
        } else {
            kept.push(ShareSlice {
                genre,
                value,
                percentage,
            });
        }
    }

    if folded > 0 {
        log::debug!("folded {folded} genres into '{others_label}'");
        kept.push(ShareSlice {
            genre: others_label.to_string(),
            value: others_value,
            percentage: share(others_value),
        });
    }
    kept
}

// ── Smoothing (drill-down) ──────────────────────────────────────

/// Trailing rolling mean over `window` points using whatever points are
/// available at the start of the series: `[10, 20, 30]`, window 2 →
/// `[10, 15, 25]`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            let slice = &values[start..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedPoint {
    pub genre: Genre,
    pub release_year: Year,
    pub average_playtime: f64,
    pub average_playtime_smoothed: f64,
}

/// Smooth each genre's series independently over year-ordered points.
/// Output is ordered by year, then by the genre's first appearance.
pub fn smooth_by_genre(points: Vec<YearlyPlaytime>, window: usize) -> Vec<SmoothedPoint> {
    let mut genre_order: Vec<Genre> = Vec::new();
    let mut series: BTreeMap<Genre, Vec<YearlyPlaytime>> = BTreeMap::new();
    for point in points {
        if !series.contains_key(&point.genre) {
            genre_order.push(point.genre.clone());
        }
        series.entry(point.genre.clone()).or_default().push(point);
    }

    let mut out = Vec::new();
    for (rank, genre) in genre_order.iter().enumerate() {
        let Some(mut rows) = series.remove(genre) else {
            continue;
        };
        rows.sort_by_key(|p| p.release_year);
        let values: Vec<f64> = rows.iter().map(|p| p.average_playtime).collect();
        let smoothed = rolling_mean(&values, window);
        for (point, average_playtime_smoothed) in rows.into_iter().zip(smoothed) {
            out.push((
                rank,
                SmoothedPoint {
                    genre: point.genre,
                    release_year: point.release_year,
                    average_playtime: point.average_playtime,
                    average_playtime_smoothed,
                },
            ));
        }
    }

    out.sort_by_key(|(rank, p)| (p.release_year, *rank));
    out.into_iter().map(|(_, p)| p).collect()
}
