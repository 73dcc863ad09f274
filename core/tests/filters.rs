//! Filter resolution and dashboard config validation.

use steamdash_core::{
    config::{ChartStyleConfig, DashConfig, FilterBounds, SliderConfig, MAX_MARKER_SIZE},
    error::{DashError, ErrorKind},
    filter::{FilterInput, FilterKind, FilterSpec, FilterValues, GenreChoice, IntRange},
};

fn dice_specs() -> Vec<FilterSpec> {
    let bounds = FilterBounds::default();
    vec![
        FilterSpec::declare(FilterKind::YearRange, &bounds),
        FilterSpec::declare(FilterKind::ScoreRange, &bounds),
        FilterSpec::declare(FilterKind::Genre, &bounds),
    ]
}

/// Declared filters left out by the caller take their slider defaults.
#[test]
fn missing_filters_take_slider_defaults() {
    let values = FilterValues::resolve("dice", &dice_specs(), &FilterInput::new()).unwrap();
    assert_eq!(
        values.range(FilterKind::YearRange),
        Some(IntRange::new(2010, 2025))
    );
    assert_eq!(
        values.range(FilterKind::ScoreRange),
        Some(IntRange::new(1, 100))
    );
    assert_eq!(values.genre(), GenreChoice::All);
    assert!(!values.run_detail);
}

/// Slider endpoints themselves are valid selections.
#[test]
fn slider_bounds_are_inclusive() {
    let input = FilterInput::new()
        .with_range(FilterKind::YearRange, 2000, 2025)
        .with_range(FilterKind::ScoreRange, 0, 0);
    let values = FilterValues::resolve("dice", &dice_specs(), &input).unwrap();
    assert_eq!(
        values.range(FilterKind::ScoreRange),
        Some(IntRange::new(0, 0))
    );
}

#[test]
fn out_of_range_value_is_a_configuration_error() {
    let input = FilterInput::new().with_range(FilterKind::YearRange, 1999, 2020);
    let err = FilterValues::resolve("dice", &dice_specs(), &input).unwrap_err();
    assert!(matches!(
        err,
        DashError::FilterOutOfRange {
            filter: "years",
            value: 1999,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn inverted_range_is_rejected() {
    let input = FilterInput::new().with_range(FilterKind::ScoreRange, 80, 20);
    let err = FilterValues::resolve("dice", &dice_specs(), &input).unwrap_err();
    assert!(matches!(err, DashError::InvertedRange { filter: "scores", .. }));
}

/// A filter the report does not declare is an error, not silently ignored.
#[test]
fn undeclared_filter_is_rejected() {
    let input = FilterInput::new().with_range(FilterKind::PriceRange, 0, 50);
    let err = FilterValues::resolve("dice", &dice_specs(), &input).unwrap_err();
    assert!(matches!(
        err,
        DashError::UnexpectedFilter {
            report: "dice",
            filter: "price"
        }
    ));

    let err = FilterValues::resolve("rollup", &[], &input).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn detail_trigger_survives_resolution() {
    let input = FilterInput::new().with_detail();
    let values = FilterValues::resolve("dice", &dice_specs(), &input).unwrap();
    assert!(values.run_detail);
}

#[test]
fn genre_choice_parses_all_sentinel() {
    assert_eq!(GenreChoice::parse("All"), GenreChoice::All);
    assert_eq!(GenreChoice::parse(" all "), GenreChoice::All);
    assert_eq!(GenreChoice::parse(""), GenreChoice::All);
    assert_eq!(
        GenreChoice::parse(" RPG "),
        GenreChoice::Only("RPG".to_string())
    );
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn default_config_is_valid() {
    DashConfig::default().validate().unwrap();
}

#[test]
fn slider_default_outside_bounds_is_invalid() {
    let mut config = DashConfig::default();
    config.filters.price = SliderConfig::new(0, 200, 0, 250);
    let err = config.validate().unwrap_err();
    assert!(matches!(err, DashError::InvalidConfig { .. }));
}

#[test]
fn zero_smoothing_window_is_invalid() {
    let config = DashConfig {
        smoothing_window: 0,
        ..DashConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn threshold_outside_percent_range_is_invalid() {
    let config = DashConfig {
        others_threshold_pct: 120.0,
        ..DashConfig::default()
    };
    assert!(config.validate().is_err());
}

fn with_charts(charts: ChartStyleConfig) -> DashConfig {
    DashConfig {
        charts,
        ..DashConfig::default()
    }
}

/// Chart settings that would break rendering are caught at load time.
#[test]
fn chart_settings_are_bounded() {
    let oversized = with_charts(ChartStyleConfig {
        drilldown_marker_size: u32::MAX,
        ..ChartStyleConfig::default()
    });
    assert!(matches!(
        oversized.validate(),
        Err(DashError::InvalidConfig { .. })
    ));

    let largest = with_charts(ChartStyleConfig {
        drilldown_marker_size: MAX_MARKER_SIZE,
        ..ChartStyleConfig::default()
    });
    largest.validate().unwrap();

    let full_hole = with_charts(ChartStyleConfig {
        rollup_hole: 1.0,
        ..ChartStyleConfig::default()
    });
    assert!(full_hole.validate().is_err());

    let inverted_axis = with_charts(ChartStyleConfig {
        drilldown_y_range: (2000.0, 0.0),
        ..ChartStyleConfig::default()
    });
    assert!(inverted_axis.validate().is_err());

    let flat_pivot = with_charts(ChartStyleConfig {
        pivot_height: 0,
        ..ChartStyleConfig::default()
    });
    assert!(flat_pivot.validate().is_err());
}

/// Keys missing from the JSON fall back to the defaults.
#[test]
fn partial_config_json_keeps_defaults() {
    let config: DashConfig =
        serde_json::from_str(r#"{ "others_threshold_pct": 2.5, "genre_match": "substring" }"#)
            .unwrap();
    assert_eq!(config.others_threshold_pct, 2.5);
    assert_eq!(config.smoothing_window, 2);
    assert_eq!(config.filters, FilterBounds::default());
    config.validate().unwrap();
}

/// The shipped config file matches the built-in defaults.
#[test]
fn shipped_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/dashboard.json");
    let config = DashConfig::load(path).unwrap();
    assert_eq!(config, DashConfig::default());
}
