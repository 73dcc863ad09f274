//! Filter declarations and validated filter values.
//!
//! Every report declares the filters it reads. The controller resolves the
//! caller's raw input against those declarations: bounds are checked here,
//! before any SQL is built, so an out-of-range slider is a configuration
//! problem and never reaches the data source.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{FilterBounds, SliderConfig};
use crate::error::{DashError, DashResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    YearRange,
    ScoreRange,
    PriceRange,
    Genre,
}

impl FilterKind {
    pub fn key(self) -> &'static str {
        match self {
            FilterKind::YearRange => "years",
            FilterKind::ScoreRange => "scores",
            FilterKind::PriceRange => "price",
            FilterKind::Genre => "genre",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterKind::YearRange => "Select Release Year Range",
            FilterKind::ScoreRange => "Select User Score Range",
            FilterKind::PriceRange => "Select Price Range",
            FilterKind::Genre => "Select Genre",
        }
    }

    fn slider(self, bounds: &FilterBounds) -> Option<SliderConfig> {
        match self {
            FilterKind::YearRange => Some(bounds.years),
            FilterKind::ScoreRange => Some(bounds.scores),
            FilterKind::PriceRange => Some(bounds.price),
            FilterKind::Genre => None,
        }
    }
}

/// Inclusive integer interval selected on a two-ended slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntRange {
    pub low: i64,
    pub high: i64,
}

impl IntRange {
    pub const fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

/// Categorical genre selector with an "All" sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreChoice {
    #[default]
    All,
    Only(String),
}

impl GenreChoice {
    pub const ALL_SENTINEL: &'static str = "All";

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(Self::ALL_SENTINEL) {
            GenreChoice::All
        } else {
            GenreChoice::Only(trimmed.to_string())
        }
    }
}

impl fmt::Display for GenreChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenreChoice::All => f.write_str(Self::ALL_SENTINEL),
            GenreChoice::Only(genre) => f.write_str(genre),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Range(IntRange),
    Genre(GenreChoice),
}

/// Declaration of one filter a report reads, with its slider geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub label: &'static str,
    /// `None` for categorical filters.
    pub bounds: Option<SliderConfig>,
}

impl FilterSpec {
    pub fn declare(kind: FilterKind, bounds: &FilterBounds) -> Self {
        Self {
            kind,
            label: kind.label(),
            bounds: kind.slider(bounds),
        }
    }

    fn default_value(&self) -> FilterValue {
        match self.bounds {
            Some(slider) => FilterValue::Range(IntRange::new(slider.default_low, slider.default_high)),
            None => FilterValue::Genre(GenreChoice::All),
        }
    }

    fn validate(&self, value: &FilterValue) -> DashResult<()> {
        let filter = self.kind.key();
        match (self.bounds, value) {
            (Some(slider), FilterValue::Range(range)) => {
                for bound in [range.low, range.high] {
                    if bound < slider.min || bound > slider.max {
                        return Err(DashError::FilterOutOfRange {
                            filter,
                            value: bound,
                            min: slider.min,
                            max: slider.max,
                        });
                    }
                }
                if range.low > range.high {
                    return Err(DashError::InvertedRange {
                        filter,
                        low: range.low,
                        high: range.high,
                    });
                }
                Ok(())
            }
            (None, FilterValue::Genre(_)) => Ok(()),
            (Some(_), FilterValue::Genre(_)) => Err(DashError::FilterTypeMismatch {
                filter,
                expected: "range",
            }),
            (None, FilterValue::Range(_)) => Err(DashError::FilterTypeMismatch {
                filter,
                expected: "genre",
            }),
        }
    }
}

/// Raw, unvalidated filter input as collected from the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterInput {
    pub values: BTreeMap<FilterKind, FilterValue>,
    /// Explicit trigger for the detail listing. The listing query never runs
    /// on filter changes alone.
    pub run_detail: bool,
}

impl FilterInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, kind: FilterKind, low: i64, high: i64) -> Self {
        self.values
            .insert(kind, FilterValue::Range(IntRange::new(low, high)));
        self
    }

    pub fn with_genre(mut self, choice: GenreChoice) -> Self {
        self.values.insert(FilterKind::Genre, FilterValue::Genre(choice));
        self
    }

    pub fn with_detail(mut self) -> Self {
        self.run_detail = true;
        self
    }
}

/// Filter values after resolution: exactly the filters a report declared,
/// each one inside its slider bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterValues {
    values: BTreeMap<FilterKind, FilterValue>,
    pub run_detail: bool,
}

impl FilterValues {
    /// Resolve `input` against a report's declarations. Declared filters the
    /// caller left out take their slider defaults; filters the report does
    /// not declare are rejected.
    pub fn resolve(
        report: &'static str,
        specs: &[FilterSpec],
        input: &FilterInput,
    ) -> DashResult<Self> {
        if let Some(extra) = input
            .values
            .keys()
            .find(|kind| !specs.iter().any(|spec| spec.kind == **kind))
        {
            return Err(DashError::UnexpectedFilter {
                report,
                filter: extra.key(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in specs {
            let value = input
                .values
                .get(&spec.kind)
                .cloned()
                .unwrap_or_else(|| spec.default_value());
            spec.validate(&value)?;
            values.insert(spec.kind, value);
        }

        Ok(Self {
            values,
            run_detail: input.run_detail,
        })
    }

    pub fn range(&self, kind: FilterKind) -> Option<IntRange> {
        match self.values.get(&kind) {
            Some(FilterValue::Range(range)) => Some(*range),
            _ => None,
        }
    }

    pub fn genre(&self) -> GenreChoice {
        match self.values.get(&FilterKind::Genre) {
            Some(FilterValue::Genre(choice)) => choice.clone(),
            _ => GenreChoice::All,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterKind, &FilterValue)> {
        self.values.iter()
    }
}
