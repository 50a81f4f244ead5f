use super::{render, text_bars, TEXT_BAR_WIDTH, TITLE, Y_LABEL};
use crate::metrics::{Measurement, Metrics, MetricsEntry};

fn entry(btree: Option<f64>, gin: Option<f64>) -> MetricsEntry {
    MetricsEntry {
        btree: Measurement {
            time: btree,
            size: 1.0,
        },
        gin: Measurement {
            time: gin,
            size: 0.5,
        },
        speedup: btree.zip(gin).map(|(btree, gin)| btree / gin),
    }
}

fn metrics() -> Metrics {
    Metrics::from([
        ("Array Query".to_owned(), entry(Some(10.0), Some(2.0))),
        ("JSONB Query".to_owned(), entry(None, Some(5.0))),
    ])
}

#[test]
pub fn render_svg() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index_comparison_from_json.svg");

    render(&path, &metrics()).unwrap();

    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains(TITLE));
    assert!(svg.contains(Y_LABEL));
    assert!(svg.contains("B-tree"));
    assert!(svg.contains("GIN"));
}

#[test]
pub fn render_without_any_timing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chart.svg");
    let metrics = Metrics::from([("Array Query".to_owned(), entry(None, None))]);

    render(&path, &metrics).unwrap();

    assert!(path.exists());
}

#[test]
pub fn text_bars_scale_to_largest_time() {
    let lines = text_bars(&metrics());

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Array Query B-tree"));
    assert!(lines[0].ends_with(&format!("|{} 10.00", "#".repeat(TEXT_BAR_WIDTH))));
    assert!(lines[1].ends_with(&format!("|{} 2.00", "#".repeat(TEXT_BAR_WIDTH / 5))));
    assert!(lines[2].ends_with("|N/A"));
    assert!(lines[3].ends_with(&format!("|{} 5.00", "#".repeat(TEXT_BAR_WIDTH / 2))));
}
