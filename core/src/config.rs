use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

/// A two-ended integer slider: the allowed interval and its initial position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliderConfig {
    pub min: i64,
    pub max: i64,
    pub default_low: i64,
    pub default_high: i64,
}

impl SliderConfig {
    pub const fn new(min: i64, max: i64, default_low: i64, default_high: i64) -> Self {
        Self {
            min,
            max,
            default_low,
            default_high,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterBounds {
    pub years: SliderConfig,
    pub scores: SliderConfig,
    pub price: SliderConfig,
}

impl Default for FilterBounds {
    fn default() -> Self {
        Self {
            years: SliderConfig::new(2000, 2025, 2010, 2025),
            scores: SliderConfig::new(0, 100, 1, 100),
            price: SliderConfig::new(0, 200, 0, 50),
        }
    }
}

/// How a single genre is matched against the comma-joined `Genres` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenreMatch {
    /// Exact membership in the split genre set.
    #[default]
    Membership,
    /// Case-sensitive substring containment. "RPG" also matches "RPGMaker".
    Substring,
}

/// Data-quality predicates applied to the source queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityPredicates {
    /// Keep only titles with `average_playtime_forever > 0` and
    /// `average_playtime_twoweeks > 0` (drill-down, pivot).
    pub require_positive_playtime: bool,
    /// Keep only titles with positive and negative review counts `> 0` (slice).
    pub require_positive_reviews: bool,
}

impl Default for QualityPredicates {
    fn default() -> Self {
        Self {
            require_positive_playtime: true,
            require_positive_reviews: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyleConfig {
    pub title_font_size: u32,
    pub rollup_palette: Vec<String>,
    pub rollup_hole: f64,
    pub drilldown_palette: Vec<String>,
    pub drilldown_y_range: (f64, f64),
    pub drilldown_marker_size: u32,
    pub dice_palette: Vec<String>,
    pub slice_palette: Vec<String>,
    pub pivot_forever_color: String,
    pub pivot_recent_color: String,
    pub pivot_background: String,
    pub pivot_width: u32,
    pub pivot_height: u32,
}

/// Largest drill-down point size; the mark area is its square.
pub const MAX_MARKER_SIZE: u32 = 64;

impl ChartStyleConfig {
    pub fn validate(&self) -> DashResult<()> {
        if self.title_font_size == 0 {
            return Err(invalid("charts.title_font_size must be greater than zero".into()));
        }
        if !(0.0..1.0).contains(&self.rollup_hole) {
            return Err(invalid(format!(
                "charts.rollup_hole {} must be within [0, 1)",
                self.rollup_hole
            )));
        }
        let (low, high) = self.drilldown_y_range;
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(invalid(format!(
                "charts.drilldown_y_range ({low}, {high}) must be finite and increasing"
            )));
        }
        if self.drilldown_marker_size == 0 || self.drilldown_marker_size > MAX_MARKER_SIZE {
            return Err(invalid(format!(
                "charts.drilldown_marker_size {} must be within [1, {MAX_MARKER_SIZE}]",
                self.drilldown_marker_size
            )));
        }
        if self.pivot_width == 0 || self.pivot_height == 0 {
            return Err(invalid(format!(
                "charts.pivot size {}x{} must be non-zero",
                self.pivot_width, self.pivot_height
            )));
        }
        Ok(())
    }
}

fn palette(colors: &[&str]) -> Vec<String> {
    colors.iter().map(|c| c.to_string()).collect()
}

impl Default for ChartStyleConfig {
    fn default() -> Self {
        Self {
            title_font_size: 24,
            rollup_palette: palette(&[
                "rgb(103,0,31)",
                "rgb(178,24,43)",
                "rgb(214,96,77)",
                "rgb(244,165,130)",
                "rgb(253,219,199)",
                "rgb(247,247,247)",
                "rgb(209,229,240)",
                "rgb(146,197,222)",
                "rgb(67,147,195)",
                "rgb(33,102,172)",
                "rgb(5,48,97)",
            ]),
            rollup_hole: 0.4,
            drilldown_palette: palette(&[
                "rgb(228,26,28)",
                "rgb(55,126,184)",
                "rgb(77,175,74)",
                "rgb(152,78,163)",
                "rgb(255,127,0)",
                "rgb(255,255,51)",
                "rgb(166,86,40)",
                "rgb(247,129,191)",
                "rgb(153,153,153)",
            ]),
            drilldown_y_range: (0.0, 2000.0),
            drilldown_marker_size: 8,
            dice_palette: palette(&[
                "rgb(102,194,165)",
                "rgb(252,141,98)",
                "rgb(141,160,203)",
                "rgb(231,138,195)",
                "rgb(166,216,84)",
                "rgb(255,217,47)",
                "rgb(229,196,148)",
                "rgb(179,179,179)",
            ]),
            slice_palette: palette(&["rgb(228,26,28)", "rgb(55,126,184)"]),
            pivot_forever_color: "#B0B0B0".into(),
            pivot_recent_color: "#404040".into(),
            pivot_background: "#f0f2f6".into(),
            pivot_width: 1000,
            pivot_height: 700,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub filters: FilterBounds,
    /// Genres whose share of the roll-up total is strictly below this
    /// percentage are folded into the "Others" bucket.
    pub others_threshold_pct: f64,
    pub others_label: String,
    pub smoothing_window: usize,
    pub drilldown_genres: Vec<String>,
    pub genre_match: GenreMatch,
    pub quality: QualityPredicates,
    /// Upper bound on the share of source rows the explode step may drop
    /// for a missing genre field before the render fails.
    pub max_dropped_row_ratio: f64,
    pub detail_row_cap: usize,
    pub charts: ChartStyleConfig,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            filters: FilterBounds::default(),
            others_threshold_pct: 5.0,
            others_label: "Others".into(),
            smoothing_window: 2,
            drilldown_genres: ["Action", "Adventure", "RPG", "Simulation", "Strategy", "Sports"]
                .iter()
                .map(|g| g.to_string())
                .collect(),
            genre_match: GenreMatch::default(),
            quality: QualityPredicates::default(),
            max_dropped_row_ratio: 0.5,
            detail_row_cap: 500,
            charts: ChartStyleConfig::default(),
        }
    }
}

impl DashConfig {
    /// Load `dashboard.json`-style config from disk and validate it.
    /// Missing keys fall back to the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dashboard config {path}"))?;
        let config: DashConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dashboard config {path}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> DashResult<()> {
        for (name, slider) in [
            ("years", &self.filters.years),
            ("scores", &self.filters.scores),
            ("price", &self.filters.price),
        ] {
            if slider.min > slider.max {
                return Err(invalid(format!(
                    "slider '{name}' has min {} > max {}",
                    slider.min, slider.max
                )));
            }
            let inside = |v: i64| v >= slider.min && v <= slider.max;
            if !inside(slider.default_low)
                || !inside(slider.default_high)
                || slider.default_low > slider.default_high
            {
                return Err(invalid(format!(
                    "slider '{name}' default ({}, {}) is not inside [{}, {}]",
                    slider.default_low, slider.default_high, slider.min, slider.max
                )));
            }
        }
        if !(0.0..=100.0).contains(&self.others_threshold_pct) {
            return Err(invalid(format!(
                "others_threshold_pct {} must be within [0, 100]",
                self.others_threshold_pct
            )));
        }
        if self.smoothing_window == 0 {
            return Err(invalid("smoothing_window must be at least 1".into()));
        }
        if self.drilldown_genres.is_empty() {
            return Err(invalid("drilldown_genres must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.max_dropped_row_ratio) {
            return Err(invalid(format!(
                "max_dropped_row_ratio {} must be within [0, 1]",
                self.max_dropped_row_ratio
            )));
        }
        if self.detail_row_cap == 0 {
            return Err(invalid("detail_row_cap must be greater than zero".into()));
        }
        self.charts.validate()
    }
}

fn invalid(reason: String) -> DashError {
    DashError::InvalidConfig { reason }
}
