//! View controller: selection routing, empty catalogs, failure handling,
//! and a full pass over a seeded demo catalog.

use steamdash_core::{
    catalog_generator::CatalogGenerator,
    config::DashConfig,
    dashboard::{Dashboard, ReportOutcome},
    error::{DashError, ErrorKind},
    filter::{FilterInput, FilterKind},
    render::{visual_to_text, Visual},
    report::ReportKind,
    shaper::Attribution,
    store::{DashStore, NewMetric, NewTitle},
};

fn empty_dashboard(config: DashConfig) -> Dashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    let store = DashStore::in_memory().unwrap();
    store.migrate().unwrap();
    Dashboard::from_store(store, config).unwrap()
}

fn seeded_dashboard(seed: u64, titles: usize) -> Dashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut store = DashStore::in_memory().unwrap();
    store.migrate().unwrap();
    let catalog = CatalogGenerator::new(seed).generate(titles);
    assert_eq!(store.insert_titles(&catalog).unwrap(), titles);
    Dashboard::from_store(store, DashConfig::default()).unwrap()
}

/// An empty catalog renders a valid, empty chart for every report.
#[test]
fn empty_catalog_renders_empty_charts() {
    let dash = empty_dashboard(DashConfig::default());
    for kind in ReportKind::ALL {
        let report = dash.render(kind, &FilterInput::new()).unwrap();
        let Visual::Chart { spec, .. } = &report.visual else {
            panic!("{kind} should render a chart");
        };
        assert!(spec["data"]["values"].as_array().unwrap().is_empty());
        assert!(spec["title"]["subtitle"].is_string(), "{kind} lacks empty notice");
        assert_eq!(report.source_rows, 0);
    }
}

#[test]
fn selector_lists_five_reports_in_order() {
    let dash = empty_dashboard(DashConfig::default());
    let listing = dash.reports();
    let kinds: Vec<ReportKind> = listing.iter().map(|l| l.report).collect();
    assert_eq!(kinds, ReportKind::ALL.to_vec());

    let dice = &listing[2];
    let keys: Vec<&str> = dice.filters.iter().map(|f| f.kind.key()).collect();
    assert_eq!(keys, vec!["years", "scores", "genre"]);
    assert_eq!(listing[3].filters[0].kind, FilterKind::PriceRange);
    assert!(listing[0].filters.is_empty());
}

#[test]
fn reports_resolve_by_id_or_title() {
    assert_eq!("dice".parse::<ReportKind>().unwrap(), ReportKind::Dice);
    assert_eq!("PIVOT".parse::<ReportKind>().unwrap(), ReportKind::Pivot);
    assert_eq!(
        ReportKind::RollUp.title().parse::<ReportKind>().unwrap(),
        ReportKind::RollUp
    );

    let dash = empty_dashboard(DashConfig::default());
    let err = dash.render_named("heatmap", &FilterInput::new()).unwrap_err();
    assert!(matches!(err, DashError::UnknownReport { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

/// A failed render becomes a message; the next render still works.
#[test]
fn failed_render_is_reported_and_controller_recovers() {
    let dash = empty_dashboard(DashConfig::default());
    let bad = FilterInput::new().with_range(FilterKind::YearRange, 1990, 2020);

    match dash.render_outcome(ReportKind::Dice, &bad) {
        ReportOutcome::Failed {
            report,
            kind,
            message,
        } => {
            assert_eq!(report, ReportKind::Dice);
            assert_eq!(kind, ErrorKind::Configuration);
            assert!(message.contains("years"), "message was {message}");
        }
        ReportOutcome::Rendered { .. } => panic!("out-of-range filter must fail"),
    }

    assert!(dash
        .render_outcome(ReportKind::Dice, &FilterInput::new())
        .is_rendered());
}

#[test]
fn filter_for_another_report_is_rejected() {
    let dash = empty_dashboard(DashConfig::default());
    let input = FilterInput::new().with_range(FilterKind::PriceRange, 0, 50);
    let outcome = dash.render_outcome(ReportKind::RollUp, &input);
    assert!(!outcome.is_rendered());
}

/// Losing more rows to missing genres than the configured ratio fails the
/// render with a shaping error.
#[test]
fn excessive_dropped_rows_fail_the_render() {
    let titles = [None, Some(""), Some(" , "), Some("Action")];
    let build = |ratio| {
        let store = DashStore::in_memory().unwrap();
        store.migrate().unwrap();
        for (i, genres) in titles.iter().enumerate() {
            store
                .insert_title(
                    &NewTitle {
                        name: format!("Title {i}"),
                        release_date: Some("Jan 1, 2015".to_string()),
                        genres: genres.map(str::to_string),
                        price: 0.0,
                    },
                    &NewMetric {
                        peak_ccu: 100,
                        ..NewMetric::default()
                    },
                )
                .unwrap();
        }
        let config = DashConfig {
            max_dropped_row_ratio: ratio,
            ..DashConfig::default()
        };
        Dashboard::from_store(store, config).unwrap()
    };

    let strict = build(0.5);
    match strict.render_outcome(ReportKind::RollUp, &FilterInput::new()) {
        ReportOutcome::Failed { kind, .. } => assert_eq!(kind, ErrorKind::Shaping),
        ReportOutcome::Rendered { .. } => panic!("3 of 4 rows dropped must fail"),
    }

    let lenient = build(1.0);
    let report = lenient.render(ReportKind::RollUp, &FilterInput::new()).unwrap();
    assert_eq!(report.shaping.dropped_titles, 3);
}

/// Titles without genres share one source group; the bound still counts
/// every one of them.
#[test]
fn dropped_titles_are_counted_through_grouped_queries() {
    let build = |ratio| {
        let store = DashStore::in_memory().unwrap();
        store.migrate().unwrap();
        let metric = |peak_ccu| NewMetric {
            peak_ccu,
            average_playtime_forever: 50,
            average_playtime_twoweeks: 5,
            ..NewMetric::default()
        };
        for i in 0..10 {
            let title = NewTitle {
                name: format!("Untagged {i}"),
                release_date: Some("Jan 1, 2015".to_string()),
                genres: None,
                price: 0.0,
            };
            store.insert_title(&title, &metric(1_000)).unwrap();
        }
        for i in 0..2 {
            let title = NewTitle {
                name: format!("Tagged {i}"),
                release_date: Some("Jan 1, 2015".to_string()),
                genres: Some("Action".to_string()),
                price: 0.0,
            };
            store.insert_title(&title, &metric(10)).unwrap();
        }
        let config = DashConfig {
            max_dropped_row_ratio: ratio,
            ..DashConfig::default()
        };
        Dashboard::from_store(store, config).unwrap()
    };

    let strict = build(0.5);
    for kind in [ReportKind::RollUp, ReportKind::Pivot] {
        match strict.render_outcome(kind, &FilterInput::new()) {
            ReportOutcome::Failed { kind: error, message, .. } => {
                assert_eq!(error, ErrorKind::Shaping);
                assert!(message.contains("10 of 12"), "message was {message}");
            }
            ReportOutcome::Rendered { .. } => panic!("{kind}: 10 of 12 titles dropped must fail"),
        }
    }

    let lenient = build(1.0);
    let report = lenient.render(ReportKind::RollUp, &FilterInput::new()).unwrap();
    assert_eq!(report.source_rows, 2);
    assert_eq!(report.shaping.input_titles, 12);
    assert_eq!(report.shaping.dropped_titles, 10);
}

/// Each report names how a multi-genre title contributes.
#[test]
fn every_report_declares_its_attribution() {
    let dash = empty_dashboard(DashConfig::default());
    let declared: Vec<(ReportKind, Attribution)> = dash
        .reports()
        .iter()
        .map(|listing| (listing.report, listing.attribution))
        .collect();
    assert_eq!(
        declared,
        vec![
            (ReportKind::RollUp, Attribution::PerGenre),
            (ReportKind::DrillDown, Attribution::PerGenre),
            (ReportKind::Dice, Attribution::PerGenre),
            (ReportKind::Slice, Attribution::LeadingPerGenre),
            (ReportKind::Pivot, Attribution::PerGenre),
        ]
    );
}

/// An empty listing is still a table: headers, no rows, and readable text.
#[test]
fn empty_catalog_renders_empty_listing_table() {
    let dash = empty_dashboard(DashConfig::default());
    let report = dash
        .render(ReportKind::Dice, &FilterInput::new().with_detail())
        .unwrap();
    let Some(detail) = &report.detail else {
        panic!("detail listing was requested");
    };
    let Visual::Table { grid } = detail else {
        panic!("listing should render a table");
    };
    assert_eq!(grid.columns[0], "name");
    assert_eq!(grid.columns.len(), 6);
    assert!(grid.rows.is_empty());

    let text = visual_to_text(detail);
    assert!(text.contains("name"));
    assert!(text.contains("(no rows)"));
}

/// Text output leads with the charted category, not alphabetical order.
#[test]
fn chart_text_follows_encoded_field_order() {
    let dash = seeded_dashboard(11, 200);

    let dice = dash.render(ReportKind::Dice, &FilterInput::new()).unwrap();
    let text = visual_to_text(&dice.visual);
    let header = text.lines().nth(1).unwrap();
    assert!(header.starts_with("genre"), "header was {header:?}");
    assert!(header.find("genre") < header.find("count"));

    let slice = dash.render(ReportKind::Slice, &FilterInput::new()).unwrap();
    let text = visual_to_text(&slice.visual);
    let header = text.lines().nth(1).unwrap();
    let positions: Vec<usize> = ["genre", "avg_positive_reviews", "avg_negative_reviews"]
        .iter()
        .map(|column| header.find(column).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "header was {header:?}");
}

/// JSON output names reports with the same identifiers the CLI accepts.
#[test]
fn outcome_json_uses_report_ids() {
    let dash = empty_dashboard(DashConfig::default());
    let outcome = dash.render_outcome(ReportKind::RollUp, &FilterInput::new());
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "rendered");
    assert_eq!(json["report"]["report"], "rollup");

    for kind in ReportKind::ALL {
        assert_eq!(serde_json::to_value(kind).unwrap(), kind.id());
    }
    let failed = dash.render_outcome(
        ReportKind::DrillDown,
        &FilterInput::new().with_range(FilterKind::PriceRange, 0, 10),
    );
    let json = serde_json::to_value(&failed).unwrap();
    assert_eq!(json["report"], "drilldown");
}

#[test]
fn invalid_config_is_rejected_at_construction() {
    let store = DashStore::in_memory().unwrap();
    let config = DashConfig {
        drilldown_genres: Vec::new(),
        ..DashConfig::default()
    };
    assert!(matches!(
        Dashboard::from_store(store, config),
        Err(DashError::InvalidConfig { .. })
    ));
}

#[test]
fn missing_catalog_file_is_a_data_source_error() {
    let err = Dashboard::open("/nonexistent/dir/steam.db", DashConfig::default())
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::DataSource);
}

/// Every report renders over a realistic seeded catalog, and rendering is
/// repeatable: the same selection yields the same output.
#[test]
fn seeded_catalog_renders_every_report_repeatably() {
    let dash = seeded_dashboard(2024, 400);
    for kind in ReportKind::ALL {
        let input = if kind == ReportKind::Dice {
            FilterInput::new().with_detail()
        } else {
            FilterInput::new()
        };
        let first = dash.render(kind, &input).unwrap();
        let second = dash.render(kind, &input).unwrap();
        assert_eq!(first, second, "{kind} is not repeatable");
        assert!(first.source_rows > 0, "{kind} found no rows");
    }
}

/// Listed titles never exceed the cap and each title appears once.
#[test]
fn seeded_dice_listing_has_unique_titles() {
    let dash = seeded_dashboard(7, 400);
    let input = FilterInput::new().with_detail();
    let report = dash.render(ReportKind::Dice, &input).unwrap();
    let Some(Visual::Table { grid }) = report.detail else {
        panic!("expected listing");
    };
    assert!(grid.rows.len() <= dash.config().detail_row_cap);
    let mut names: Vec<&String> = grid.rows.iter().map(|row| &row[0]).collect();
    let total = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), total);
}
