//! Shared record types flowing from the data source into the shaper.

use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// A genre label as it appears inside the comma-joined `Genres` column.
pub type Genre = String;

/// Calendar year parsed from a title's release date.
pub type Year = i32;

/// One row of the roll-up source query: a genre combination and its
/// summed peak concurrent users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreTotal {
    pub genres: Option<String>,
    pub titles: usize,
    pub total_peak_users: f64,
}

/// Average two-week playtime for one genre in one release year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyPlaytime {
    pub genre: Genre,
    pub release_year: Year,
    pub average_playtime: f64,
}

/// Review averages for one genre combination (slice source rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAverages {
    pub genres: Option<String>,
    pub titles: usize,
    pub avg_positive_reviews: f64,
    pub avg_negative_reviews: f64,
}

/// Playtime averages for one genre combination (pivot source rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaytimeAverages {
    pub genres: Option<String>,
    pub titles: usize,
    pub avg_playtime_forever: f64,
    pub avg_playtime_recent: f64,
}

/// A single title that passed the dice filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleListing {
    pub name: String,
    pub release_date: String,
    pub release_year: Year,
    pub genres: Option<String>,
    pub peak_ccu: i64,
    pub user_score: i64,
    pub price: f64,
}

/// Rows that carry a comma-joined genre field and can be exploded.
pub trait HasGenres {
    fn genres(&self) -> Option<&str>;

    /// Titles this row stands for. Grouped rows override it.
    fn titles(&self) -> usize {
        1
    }
}

/// Rows that know which title, or title group, they describe.
pub trait TitleIdentity {
    type Key: Eq + Hash;

    fn identity(&self) -> Self::Key;
}

impl HasGenres for GenreTotal {
    fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }

    fn titles(&self) -> usize {
        self.titles
    }
}

impl HasGenres for ReviewAverages {
    fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }

    fn titles(&self) -> usize {
        self.titles
    }
}

impl HasGenres for PlaytimeAverages {
    fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }

    fn titles(&self) -> usize {
        self.titles
    }
}

/// Grouped rows: one per genre combination.
impl TitleIdentity for GenreTotal {
    type Key = Option<String>;

    fn identity(&self) -> Self::Key {
        self.genres.clone()
    }
}

impl TitleIdentity for ReviewAverages {
    type Key = Option<String>;

    fn identity(&self) -> Self::Key {
        self.genres.clone()
    }
}

impl TitleIdentity for PlaytimeAverages {
    type Key = Option<String>;

    fn identity(&self) -> Self::Key {
        self.genres.clone()
    }
}

impl HasGenres for TitleListing {
    fn genres(&self) -> Option<&str> {
        self.genres.as_deref()
    }
}

/// Identity of a listed title: (name, release date, peak users).
impl TitleIdentity for TitleListing {
    type Key = (String, String, i64);

    fn identity(&self) -> Self::Key {
        (self.name.clone(), self.release_date.clone(), self.peak_ccu)
    }
}
