//! Layout integration tests

use filigree_core::stats::{Column, GroupKey, GroupSummarizer, Table};
use filigree_core::{
    box_plots, density_layout, histogram2d, histogram2d_layout, qhistograms, quantile_bins, Bins,
    BoxPlotConfig, CenterMap, Color, DensityConfig, FiligreeError, LayoutError, Palette, PlotData,
    QuantileHistogramConfig,
};
use proptest::prelude::*;
use rstest::rstest;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn assert_span(actual: [f64; 2], expected: [f64; 2]) {
    assert!(
        (actual[0] - expected[0]).abs() < 1e-12 && (actual[1] - expected[1]).abs() < 1e-12,
        "{actual:?} != {expected:?}"
    );
}

fn letters_table(extra: Option<f64>) -> Table {
    let mut groups = vec!["A", "A", "A", "A", "A", "B", "B", "B", "B", "B"];
    let mut values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0];
    if let Some(v) = extra {
        groups.push("A");
        values.push(v);
    }
    Table::from_columns([("group", Column::from(groups)), ("value", Column::from(values))]).unwrap()
}

#[test]
fn test_box_plots_tally_outliers_per_group() {
    init_tracing();
    let config = BoxPlotConfig {
        jitter: false,
        ..Default::default()
    };
    let data = box_plots(&letters_table(Some(100.0)), "group", "value", &config, None).unwrap();

    assert_eq!(data.boxes.group, vec![GroupKey::from("A"), GroupKey::from("B")]);
    assert_eq!(data.boxes.n, vec![6, 5]);
    assert_eq!(data.boxes.nho, vec![1, 0]);
    assert_eq!(data.boxes.nlo, vec![0, 0]);
    assert!((data.boxes.pho[0] - 1.0 / 6.0).abs() < 1e-12);

    // without jitter outliers sit on the group center
    assert_eq!(data.outliers.x, vec![0.0]);
    assert_eq!(data.outliers.y, vec![100.0]);
    assert_eq!(data.means.y[1], [30.0, 30.0]);
    assert_span(data.means.x[1], [0.6, 1.4]);
}

#[test]
fn test_box_plot_jitter_stays_inside_box() {
    let data = box_plots(
        &letters_table(Some(100.0)),
        "group",
        "value",
        &BoxPlotConfig::default(),
        None,
    )
    .unwrap();
    let x = data.outliers.x[0];
    assert!(x.abs() <= 0.4 * 0.8);
}

#[test]
fn test_box_plots_use_center_map() {
    let mut centers = CenterMap::new();
    centers.insert(GroupKey::from("A"), 10.0);
    centers.insert(GroupKey::from("B"), 20.0);
    let data = box_plots(
        &letters_table(None),
        "group",
        "value",
        &BoxPlotConfig::default(),
        Some(&centers),
    )
    .unwrap();
    assert_span(data.means.x[0], [9.6, 10.4]);
    assert_span(data.means.x[1], [19.6, 20.4]);

    centers.remove(&GroupKey::from("B"));
    let err = box_plots(
        &letters_table(None),
        "group",
        "value",
        &BoxPlotConfig::default(),
        Some(&centers),
    )
    .unwrap_err();
    assert!(matches!(err, FiligreeError::Layout(LayoutError::MissingCenter { .. })));
}

#[test]
fn test_box_plot_json_shape() {
    let data = box_plots(&letters_table(None), "group", "value", &BoxPlotConfig::default(), None).unwrap();
    let value = data.to_value().unwrap();
    for key in ["boxes", "outliers", "means"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
    // NaN separators reach JSON as null
    assert!(value["boxes"]["x"][0][5].is_null());
    assert_eq!(value["boxes"]["group"][0], "A");
}

#[test]
fn test_qhistograms_labels_and_medians() {
    init_tracing();
    let data = qhistograms(
        &letters_table(None),
        "group",
        "value",
        &QuantileHistogramConfig::default(),
        None,
    )
    .unwrap();

    // 11 default levels give 10 bins per group
    assert_eq!(data.histograms.group.len(), 20);
    assert_eq!(data.histograms.name[0], "25.0-30.0");
    assert_eq!(data.histograms.name[9], "70.0-75.0");
    assert_eq!(data.medians.y, vec![[3.0, 3.0], [30.0, 30.0]]);
    assert_span(data.medians.x[1], [0.6, 1.4]);

    let value = data.to_value().unwrap();
    assert!(value["histograms"]["lower"].is_array());
    assert!(value["medians"]["group"].is_array());
}

#[rstest]
#[case(vec![0.25, 0.75])]
#[case(vec![0.5, 0.5, 0.5])]
fn test_qhistograms_need_three_levels(#[case] quantiles: Vec<f64>) {
    let config = QuantileHistogramConfig {
        quantiles,
        ..Default::default()
    };
    let err = qhistograms(&letters_table(None), "group", "value", &config, None).unwrap_err();
    assert!(matches!(
        err,
        FiligreeError::Layout(LayoutError::TooFewQuantiles { .. })
    ));
}

#[rstest]
#[case(0.5)]
#[case(0.8)]
#[case(3.0)]
fn test_tallest_bin_matches_width(#[case] width: f64) {
    let summary = GroupSummarizer::new()
        .with_quantiles(&[0.1, 0.3, 0.5, 0.7, 0.9])
        .unwrap()
        .summarize_sample(GroupKey::Int(0), &[1.0, 2.0, 4.0, 8.0, 16.0, 32.0]);
    let config = QuantileHistogramConfig {
        width,
        ..Default::default()
    };
    let bins = quantile_bins(&summary, &config).unwrap();
    let tallest = bins.iter().map(|b| b.height).fold(0.0, f64::max);
    assert!((tallest - width).abs() < 1e-12);
}

#[test]
fn test_histogram2d_layout_from_table() {
    let table = Table::new()
        .with_column("x", vec![0.0, 0.0, 1.0, 2.0])
        .unwrap()
        .with_column("y", vec![0.0, 0.0, 1.0, 2.0])
        .unwrap();
    let data = histogram2d_layout(
        &table,
        "x",
        "y",
        &Bins::Count(2),
        &Bins::Count(2),
        &DensityConfig::default(),
        None,
    )
    .unwrap();

    let cells = &data.histogram2d;
    assert_eq!(cells.len(), 4);
    assert_eq!(cells.frequency.iter().sum::<usize>(), 4);
    assert_eq!(cells.frequency[0], 2);
    assert_eq!(cells.density[0], 1.0);
    assert_eq!(cells.share[0], 0.5);
    assert!(data.to_json().unwrap().starts_with("{\"histogram2d\":"));
}

#[test]
fn test_histogram2d_layout_with_caller_palette() {
    let table = Table::new()
        .with_column("x", vec![0.0, 0.0, 1.0, 2.0])
        .unwrap()
        .with_column("y", vec![0.0, 0.0, 1.0, 2.0])
        .unwrap();
    let palette = Palette::new(vec![Color::rgb(1.0, 1.0, 1.0), Color::rgb(1.0, 0.0, 0.0)]).unwrap();
    let data = histogram2d_layout(
        &table,
        "x",
        "y",
        &Bins::Count(2),
        &Bins::Count(2),
        &DensityConfig::default(),
        Some(&palette),
    )
    .unwrap();

    let cells = &data.histogram2d;
    assert_eq!(cells.color[0], "#FF0000");
    assert!(cells.color.iter().all(|c| c == "#FF0000" || c == "#FFFFFF"));
}

proptest! {
    #[test]
    fn test_qhist_area_equals_covered_mass(
        values in prop::collection::btree_set(-1000i32..1000, 5..60),
        width in 0.1..5.0f64,
    ) {
        let sample: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        let summarizer = GroupSummarizer::new().with_quantiles(&[0.1, 0.25, 0.5, 0.75, 0.9]).unwrap();
        let summary = summarizer.summarize_sample(GroupKey::Int(1), &sample);
        let config = QuantileHistogramConfig { width, ..Default::default() };

        let bins = quantile_bins(&summary, &config).unwrap();
        let area: f64 = bins.iter().map(|b| b.scale * b.span()).sum();
        prop_assert!((area - 0.8).abs() < 1e-9);

        let doubled = QuantileHistogramConfig { width: 2.0 * width, ..config };
        for (a, b) in bins.iter().zip(quantile_bins(&summary, &doubled).unwrap()) {
            prop_assert!((2.0 * a.height - b.height).abs() < 1e-9);
        }
    }

    #[test]
    fn test_density_preserves_counted_rows(
        points in prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 1..200),
        nx in 1usize..8,
        ny in 1usize..8,
        group_largest in any::<bool>(),
    ) {
        let (x, y): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
        let grid = histogram2d(&x, &y, &Bins::Count(nx), &Bins::Count(ny)).unwrap();
        prop_assert_eq!(grid.counted(), x.len());

        let cells = density_layout(&grid, &Palette::cividis256(), group_largest).unwrap();
        prop_assert_eq!(cells.frequency.iter().sum::<usize>(), grid.counted());
        prop_assert!(cells.density.iter().all(|d| (0.0..=1.0).contains(d)));
        prop_assert_eq!(cells.color.len(), cells.len());
        if !group_largest {
            prop_assert_eq!(cells.density.iter().cloned().fold(0.0, f64::max), 1.0);
        }
    }
}
