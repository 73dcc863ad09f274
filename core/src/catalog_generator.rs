//! Deterministic demo catalog generation.
//!
//! Produces titles with the same shape as the real dataset: "Mon DD, YYYY"
//! release dates (a few unparseable ones included), comma-joined genre
//! lists, skewed concurrent-user counts and sparse playtime figures.
//! Same seed = same catalog.

use crate::rng::{SeedRng, SeedStream};
use crate::store::{NewMetric, NewTitle};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const GENRES: [&str; 14] = [
    "Action",
    "Adventure",
    "Casual",
    "Indie",
    "RPG",
    "Simulation",
    "Strategy",
    "Sports",
    "Racing",
    "Massively Multiplayer",
    "Early Access",
    "Free to Play",
    "Education",
    "Utilities",
];

const UNDATED: [&str; 3] = ["Coming soon", "To be announced", "Q4 2025"];

pub const FIRST_RELEASE_YEAR: i64 = 1998;
pub const LAST_RELEASE_YEAR: i64 = 2025;

/// Deterministic catalog generator using curated word lists.
pub struct CatalogGenerator {
    names: SeedRng,
    dates: SeedRng,
    genres: SeedRng,
    metrics: SeedRng,
}

impl CatalogGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            names: SeedRng::new(seed, SeedStream::Names),
            dates: SeedRng::new(seed, SeedStream::Dates),
            genres: SeedRng::new(seed, SeedStream::Genres),
            metrics: SeedRng::new(seed, SeedStream::Metrics),
        }
    }

    /// Generate `count` titles with their metrics.
    pub fn generate(&mut self, count: usize) -> Vec<(NewTitle, NewMetric)> {
        (0..count).map(|index| self.next_title(index)).collect()
    }

    fn next_title(&mut self, index: usize) -> (NewTitle, NewMetric) {
        let name = self.title_name(index);
        let release_date = self.release_date();
        let genres = self.genre_list();
        let price = self.price();
        let metric = self.metric();
        (
            NewTitle {
                name,
                release_date,
                genres,
                price,
            },
            metric,
        )
    }

    /// "Prefix Noun" or "Prefix Noun: Suffix", numbered to stay unique.
    fn title_name(&mut self, index: usize) -> String {
        let prefix = self.names.pick(Self::prefixes());
        let noun = self.names.pick(Self::nouns());
        if self.names.chance(0.3) {
            let suffix = self.names.pick(Self::suffixes());
            format!("{prefix} {noun}: {suffix} #{index}")
        } else {
            format!("{prefix} {noun} #{index}")
        }
    }

    fn release_date(&mut self) -> Option<String> {
        if self.dates.chance(0.01) {
            return None;
        }
        if self.dates.chance(0.03) {
            return Some(self.dates.pick(&UNDATED).to_string());
        }
        let year = self.dates.range_inclusive(FIRST_RELEASE_YEAR, LAST_RELEASE_YEAR);
        let month = self.dates.pick(&MONTHS);
        let day = self.dates.range_inclusive(1, 28);
        Some(format!("{month} {day}, {year}"))
    }

    /// One to four distinct genres; a small share of titles has none.
    fn genre_list(&mut self) -> Option<String> {
        if self.genres.chance(0.02) {
            return None;
        }
        let wanted = self.genres.range_inclusive(1, 4) as usize;
        let mut picked: Vec<&str> = Vec::with_capacity(wanted);
        while picked.len() < wanted {
            let genre = *self.genres.pick(&GENRES);
            if !picked.contains(&genre) {
                picked.push(genre);
            }
        }
        Some(picked.join(","))
    }

    fn price(&mut self) -> f64 {
        if self.metrics.chance(0.25) {
            return 0.0;
        }
        let dollars = self.metrics.pareto(2.0, 1.6).min(199.0);
        (dollars * 100.0).round() / 100.0
    }

    fn metric(&mut self) -> NewMetric {
        let m = &mut self.metrics;
        let peak_ccu = if m.chance(0.4) {
            0
        } else {
            m.pareto(1.0, 0.9).min(900_000.0) as i64
        };
        let positive_reviews = m.pareto(1.0, 0.8).min(2_000_000.0) as i64 - 1;
        let negative_reviews = (positive_reviews as f64 * m.next_f64() * 0.4) as i64;
        let (forever, recent) = if m.chance(0.55) {
            (0, 0)
        } else {
            let forever = m.range_inclusive(10, 6_000);
            let recent = if m.chance(0.5) {
                0
            } else {
                m.range_inclusive(1, forever.min(2_000))
            };
            (forever, recent)
        };
        let user_score = if m.chance(0.7) { 0 } else { m.range_inclusive(20, 100) };

        NewMetric {
            peak_ccu,
            positive_reviews,
            negative_reviews,
            average_playtime_forever: forever,
            average_playtime_twoweeks: recent,
            user_score,
        }
    }

    fn prefixes() -> &'static [&'static str] {
        &[
            "Crimson", "Silent", "Iron", "Lost", "Neon", "Hollow", "Eternal", "Broken", "Stellar",
            "Wild", "Frozen", "Golden", "Shadow", "Rusty", "Tiny", "Last", "Hidden", "Endless",
        ]
    }

    fn nouns() -> &'static [&'static str] {
        &[
            "Kingdom", "Frontier", "Legion", "Garden", "Harbor", "Circuit", "Dungeon", "Voyage",
            "Colony", "Arena", "Orchard", "Citadel", "Rally", "League", "Workshop", "Expedition",
        ]
    }

    fn suffixes() -> &'static [&'static str] {
        &[
            "Remastered",
            "Definitive Edition",
            "Origins",
            "Reloaded",
            "Gold Edition",
            "Chapter One",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_produces_identical_catalogs() {
        let a = CatalogGenerator::new(42).generate(200);
        let b = CatalogGenerator::new(42).generate(200);
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = CatalogGenerator::new(1).generate(50);
        let b = CatalogGenerator::new(2).generate(50);
        assert_ne!(a, b);
    }

    #[test]
    fn genre_lists_hold_one_to_four_distinct_genres() {
        for (title, _) in CatalogGenerator::new(7).generate(500) {
            let Some(genres) = title.genres else { continue };
            let parts: Vec<&str> = genres.split(',').collect();
            assert!((1..=4).contains(&parts.len()), "bad genre list {genres}");
            let mut unique = parts.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), parts.len(), "duplicate genre in {genres}");
        }
    }

    #[test]
    fn metrics_are_non_negative() {
        for (title, metric) in CatalogGenerator::new(99).generate(500) {
            assert!(title.price >= 0.0 && title.price <= 200.0);
            assert!(metric.peak_ccu >= 0);
            assert!(metric.positive_reviews >= 0);
            assert!(metric.negative_reviews >= 0);
            assert!(metric.average_playtime_twoweeks <= metric.average_playtime_forever);
            assert!((0..=100).contains(&metric.user_score));
        }
    }
}
