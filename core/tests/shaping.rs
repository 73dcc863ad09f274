//! Result shaping: explode, attribution, aggregation, share bucketing, smoothing.

use steamdash_core::{
    error::{DashError, ErrorKind},
    shaper::{
        self, attribute, bucket_small_shares, count_by_genre, explode, rolling_mean,
        smooth_by_genre, split_genres, Attribution,
    },
    types::{GenreTotal, ReviewAverages, TitleListing, YearlyPlaytime},
};

// ── Helpers ──────────────────────────────────────────────────────

fn total(genres: Option<&str>, peak: f64) -> GenreTotal {
    GenreTotal {
        genres: genres.map(str::to_string),
        titles: 1,
        total_peak_users: peak,
    }
}

fn reviews(genres: &str, positive: f64) -> ReviewAverages {
    ReviewAverages {
        genres: Some(genres.to_string()),
        titles: 1,
        avg_positive_reviews: positive,
        avg_negative_reviews: 1.0,
    }
}

fn listing(name: &str, genres: &str) -> TitleListing {
    TitleListing {
        name: name.to_string(),
        release_date: "Mar 3, 2015".to_string(),
        release_year: 2015,
        genres: Some(genres.to_string()),
        peak_ccu: 1_200,
        user_score: 80,
        price: 19.99,
    }
}

fn point(genre: &str, year: i32, avg: f64) -> YearlyPlaytime {
    YearlyPlaytime {
        genre: genre.to_string(),
        release_year: year,
        average_playtime: avg,
    }
}

// ── Explode ──────────────────────────────────────────────────────

/// A two-genre row becomes two rows carrying identical other fields.
#[test]
fn explode_splits_combination_into_one_row_per_genre() {
    let (rows, stats) = explode(vec![total(Some("Action,RPG"), 300.0)]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].genre, "Action");
    assert_eq!(rows[1].genre, "RPG");
    assert_eq!(rows[0].record, rows[1].record);
    assert_eq!(stats.input_titles, 1);
    assert_eq!(stats.dropped_titles, 0);
    assert_eq!(stats.output_rows, 2);
}

/// Whitespace and empty tokens never become genres.
#[test]
fn split_genres_trims_and_skips_empty_tokens() {
    let genres: Vec<&str> = split_genres(" Action , ,RPG,").collect();
    assert_eq!(genres, vec!["Action", "RPG"]);
}

/// Rows with no usable genre field are dropped and counted.
#[test]
fn explode_counts_rows_without_genres() {
    let (rows, stats) = explode(vec![
        total(None, 10.0),
        total(Some(""), 20.0),
        total(Some("Indie"), 30.0),
    ]);
    assert_eq!(rows.len(), 1);
    assert_eq!(stats.dropped_titles, 2);
    assert!((stats.dropped_ratio() - 2.0 / 3.0).abs() < 1e-9);
}

/// A grouped row weighs as many titles as it stands for, so one NULL-genre
/// group hiding ten titles outweighs a two-title group.
#[test]
fn dropped_ratio_counts_titles_behind_grouped_rows() {
    let (rows, stats) = explode(vec![
        GenreTotal {
            titles: 10,
            ..total(None, 10_000.0)
        },
        GenreTotal {
            titles: 2,
            ..total(Some("Action"), 20.0)
        },
    ]);
    assert_eq!(rows.len(), 1);
    assert_eq!(stats.input_titles, 12);
    assert_eq!(stats.dropped_titles, 10);

    let err = shaper::check_dropped(&stats, 0.5).unwrap_err();
    assert!(matches!(
        err,
        DashError::DroppedRowsExceeded {
            dropped: 10,
            total: 12,
            ..
        }
    ));
}

/// The dropped-row bound is inclusive: exactly at the limit passes.
#[test]
fn dropped_rows_fail_only_above_the_bound() {
    let (_, stats) = explode(vec![total(None, 1.0), total(Some("Action"), 1.0)]);
    assert!(shaper::check_dropped(&stats, 0.5).is_ok());

    let err = shaper::check_dropped(&stats, 0.25).unwrap_err();
    assert!(matches!(
        err,
        DashError::DroppedRowsExceeded {
            dropped: 1,
            total: 2,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Shaping);
}

// ── Attribution ─────────────────────────────────────────────────

/// Per-title attribution keeps a three-genre title exactly once.
#[test]
fn per_title_attribution_collapses_exploded_title() {
    let (rows, _) = explode(vec![listing("Stellar Colony", "Action,RPG,Strategy")]);
    assert_eq!(rows.len(), 3);

    let per_title = attribute(rows.clone(), Attribution::PerTitle);
    assert_eq!(per_title.len(), 1);
    assert_eq!(per_title[0].record.name, "Stellar Colony");

    let per_genre = attribute(rows, Attribution::PerGenre);
    assert_eq!(per_genre.len(), 3);
}

/// Distinct titles sharing a name but not a release date stay distinct.
#[test]
fn per_title_attribution_keys_on_name_date_and_peak() {
    let mut remaster = listing("Stellar Colony", "Action");
    remaster.release_date = "Jan 9, 2021".to_string();
    let (rows, _) = explode(vec![listing("Stellar Colony", "Action"), remaster]);
    assert_eq!(attribute(rows, Attribution::PerTitle).len(), 2);
}

/// Leading-per-genre keeps each genre's first row from ranked input.
#[test]
fn leading_per_genre_keeps_first_row_of_each_genre() {
    let (rows, _) = explode(vec![
        reviews("Action,RPG", 100.0),
        reviews("Action", 50.0),
        reviews("Strategy,RPG", 30.0),
    ]);
    let leading = attribute(rows, Attribution::LeadingPerGenre);
    let kept: Vec<(&str, f64)> = leading
        .iter()
        .map(|row| (row.genre.as_str(), row.record.avg_positive_reviews))
        .collect();
    assert_eq!(
        kept,
        vec![("Action", 100.0), ("RPG", 100.0), ("Strategy", 30.0)]
    );
}

// ── Aggregation ─────────────────────────────────────────────────

#[test]
fn count_by_genre_orders_by_count_then_name() {
    let (rows, _) = explode(vec![
        total(Some("RPG,Action"), 0.0),
        total(Some("Strategy"), 0.0),
        total(Some("Action"), 0.0),
    ]);
    let counts = count_by_genre(&rows);
    let order: Vec<(&str, usize)> = counts.iter().map(|c| (c.genre.as_str(), c.count)).collect();
    assert_eq!(order, vec![("Action", 2), ("RPG", 1), ("Strategy", 1)]);
}

#[test]
fn mean_by_genre_averages_each_measure() {
    let (rows, _) = explode(vec![
        total(Some("Action,RPG"), 100.0),
        total(Some("Action"), 300.0),
    ]);
    let means = shaper::mean_by_genre(&rows, |r| [r.total_peak_users, r.total_peak_users * 2.0]);
    assert_eq!(means[0], ("Action".to_string(), [200.0, 400.0]));
    assert_eq!(means[1], ("RPG".to_string(), [100.0, 200.0]));
}

// ── Share bucketing ─────────────────────────────────────────────

/// Percentages over every slice, "Others" included, sum to 100.
#[test]
fn bucketed_percentages_sum_to_one_hundred() {
    let totals = vec![
        ("Action".to_string(), 800.0),
        ("Indie".to_string(), 190.0),
        ("Puzzle".to_string(), 10.0),
        ("RPG".to_string(), 500.0),
    ];
    let slices = bucket_small_shares(totals, 5.0, "Others");
    let sum: f64 = slices.iter().map(|s| s.percentage).sum();
    assert!((sum - 100.0).abs() < 1e-9, "sum was {sum}");
}

/// "Others" exists iff some genre is strictly below the threshold, and
/// its value is the sum of the folded genres.
#[test]
fn others_bucket_holds_only_genres_strictly_below_threshold() {
    let totals = vec![
        ("Action".to_string(), 90.0),
        ("Casual".to_string(), 3.0),
        ("Racing".to_string(), 2.0),
        ("Sports".to_string(), 5.0),
    ];
    let slices = bucket_small_shares(totals, 5.0, "Others");
    let genres: Vec<&str> = slices.iter().map(|s| s.genre.as_str()).collect();
    // Sports sits exactly on 5% and stays.
    assert_eq!(genres, vec!["Action", "Sports", "Others"]);
    let others = slices.last().unwrap();
    assert_eq!(others.value, 5.0);
    assert!((others.percentage - 5.0).abs() < 1e-9);
}

#[test]
fn no_others_bucket_when_every_share_clears_threshold() {
    let totals = vec![("Action".to_string(), 60.0), ("RPG".to_string(), 40.0)];
    let slices = bucket_small_shares(totals, 5.0, "Others");
    assert_eq!(slices.len(), 2);
    assert!(slices.iter().all(|s| s.genre != "Others"));
}

/// A zero grand total yields 0% shares and no bucketing.
#[test]
fn zero_total_gives_zero_percentages() {
    let totals = vec![("Action".to_string(), 0.0), ("RPG".to_string(), 0.0)];
    let slices = bucket_small_shares(totals, 5.0, "Others");
    assert_eq!(slices.len(), 2);
    assert!(slices.iter().all(|s| s.percentage == 0.0));
}

// ── Smoothing ───────────────────────────────────────────────────

#[test]
fn rolling_mean_uses_partial_windows_at_series_start() {
    assert_eq!(rolling_mean(&[10.0, 20.0, 30.0], 2), vec![10.0, 15.0, 25.0]);
    assert_eq!(rolling_mean(&[10.0, 20.0, 30.0], 1), vec![10.0, 20.0, 30.0]);
    assert!(rolling_mean(&[], 2).is_empty());
}

/// Each genre is smoothed on its own series, never across genres.
#[test]
fn smoothing_is_independent_per_genre() {
    let points = vec![
        point("Action", 2011, 20.0),
        point("RPG", 2010, 100.0),
        point("Action", 2010, 10.0),
        point("RPG", 2011, 300.0),
        point("Action", 2012, 30.0),
    ];
    let smoothed = smooth_by_genre(points, 2);

    let action: Vec<f64> = smoothed
        .iter()
        .filter(|p| p.genre == "Action")
        .map(|p| p.average_playtime_smoothed)
        .collect();
    let rpg: Vec<f64> = smoothed
        .iter()
        .filter(|p| p.genre == "RPG")
        .map(|p| p.average_playtime_smoothed)
        .collect();
    assert_eq!(action, vec![10.0, 15.0, 25.0]);
    assert_eq!(rpg, vec![100.0, 200.0]);

    let years: Vec<i32> = smoothed.iter().map(|p| p.release_year).collect();
    assert_eq!(years, vec![2010, 2010, 2011, 2011, 2012]);
}
