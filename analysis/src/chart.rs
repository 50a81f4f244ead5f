use crate::metrics::{max_time, Metrics};
use plotters::{drawing::DrawingAreaErrorKind, prelude::*};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub const TITLE: &str = "B-tree vs GIN Performance Comparison";
pub const Y_LABEL: &str = "Execution Time (ms)";

const BTREE_COLOR: RGBColor = RGBColor(250, 128, 114); // salmon
const GIN_COLOR: RGBColor = RGBColor(135, 206, 235); // skyblue

const SIZE: (u32, u32) = (1000, 600);
const TITLE_FONT_SIZE: u32 = 32;
const AXIS_LABEL_FONT_SIZE: u32 = 20;
const TICK_LABEL_FONT_SIZE: u32 = 16;
const BAR_WIDTH: f64 = 0.35;

/// width of the longest bar in the terminal rendering
pub const TEXT_BAR_WIDTH: usize = 40;

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to draw chart")]
    Draw(#[from] DrawingAreaErrorKind<std::io::Error>),
}

#[derive(Debug, Clone, Copy)]
enum Family {
    BTree,
    Gin,
}

impl Family {
    const ALL: [Family; 2] = [Family::BTree, Family::Gin];

    fn label(self) -> &'static str {
        match self {
            Self::BTree => "B-tree",
            Self::Gin => "GIN",
        }
    }

    fn color(self) -> RGBColor {
        match self {
            Self::BTree => BTREE_COLOR,
            Self::Gin => GIN_COLOR,
        }
    }

    /// offset of the bar centre from the group centre
    fn offset(self) -> f64 {
        match self {
            Self::BTree => -BAR_WIDTH / 2.0,
            Self::Gin => BAR_WIDTH / 2.0,
        }
    }

    fn time(self, metrics: &Metrics, query: &str) -> Option<f64> {
        metrics.get(query).and_then(|entry| match self {
            Self::BTree => entry.btree.time,
            Self::Gin => entry.gin.time,
        })
    }
}

/// Grouped bar chart with one group per query, queries without a timing get no bar
pub fn render(path: &Path, metrics: &Metrics) -> Result<(), ChartError> {
    let queries = metrics.keys().map(String::as_str).collect::<Vec<_>>();
    let groups = queries.len();
    let top = max_time(metrics)
        .filter(|time| *time > 0.0)
        .map_or(1.0, |time| time * 1.1);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let label = |x: &f64| {
        let index = x.round();
        if index >= 0.0 && (x - index).abs() < 0.3 {
            queries
                .get(index as usize)
                .map(|query| (*query).to_owned())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(groups as f64 - 0.5), 0.0..top)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.max(1))
        .x_label_formatter(&label)
        .x_desc("Query")
        .y_desc(Y_LABEL)
        .label_style(("sans-serif", TICK_LABEL_FONT_SIZE))
        .axis_desc_style(("sans-serif", AXIS_LABEL_FONT_SIZE))
        .draw()?;

    for family in Family::ALL {
        let color = family.color();
        let bars = queries
            .iter()
            .enumerate()
            .filter_map(|(index, query)| {
                family
                    .time(metrics, query)
                    .map(|time| (index as f64 + family.offset(), time))
            })
            .map(|(centre, time)| {
                Rectangle::new(
                    [
                        (centre - BAR_WIDTH / 2.0 + 0.01, 0.0),
                        (centre + BAR_WIDTH / 2.0 - 0.01, time),
                    ],
                    color.filled(),
                )
            });

        chart
            .draw_series(bars)?
            .label(family.label())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    debug!(path = ?path, groups, "Rendered chart");

    Ok(())
}

/// Terminal rendering of the chart, two bars per query scaled to the largest time
pub fn text_bars(metrics: &Metrics) -> Vec<String> {
    let top = max_time(metrics).filter(|time| *time > 0.0);
    let name_width = metrics.keys().map(String::len).max().unwrap_or(0);

    metrics
        .keys()
        .flat_map(|query| {
            Family::ALL.map(|family| {
                let bar = match (family.time(metrics, query), top) {
                    (Some(time), Some(top)) => format!(
                        "{} {time:.2}",
                        "#".repeat((time / top * TEXT_BAR_WIDTH as f64).round() as usize)
                    ),
                    (Some(time), None) => format!("{time:.2}"),
                    (None, _) => "N/A".to_owned(),
                };

                format!("{query:<name_width$} {:<6} |{bar}", family.label())
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "chart_test.rs"]
mod chart_test;
