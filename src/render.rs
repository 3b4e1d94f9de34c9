//! Chart descriptions and the sinks that render them.
//!
//! The cleaning and aggregation code never touches this module; the manager turns
//! each view into a [`Chart`] and hands it to a [`Render`] implementation.

use crate::decompose::Decomposition;
use crate::model::Series;
use crate::views::{Composition, DayType, DayTypeSplit, TimeOfDayView};
use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

const ENERGY_LABEL: &str = "Energy (kWh)";
const TIME_FORMAT: &str = "%H:%M";
const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Scatter,
    Area,
    Donut,
    Decomposition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub kind: ChartKind,
    pub series: Vec<ChartSeries>,
}

impl Chart {
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(|s| s.points.is_empty())
    }
}

pub trait Render {
    /// Render `chart` under the name `name`.
    fn render(&self, name: &str, chart: &Chart) -> Result<()>;
}

/// Writes every chart as a pretty-printed JSON document `<dir>/<name>.json`.
pub struct JsonRenderer {
    dir: PathBuf,
}

impl JsonRenderer {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn chart_file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl Render for JsonRenderer {
    fn render(&self, name: &str, chart: &Chart) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {:?}", self.dir))?;

        let file = self.chart_file(name);
        let writer = File::create(&file).with_context(|| format!("failed to create {file:?}"))?;
        let mut writer = BufWriter::new(writer);
        serde_json::to_writer_pretty(&mut writer, chart).context("failed to serialize chart")?;
        writer.flush().context("failed to flush writer stream")?;

        log::info!("rendered {file:?}");
        Ok(())
    }
}

fn points_from_series(series: &Series, format: &str) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|r| ChartPoint {
            x: r.timestamp.format(format).to_string(),
            y: Some(r.kwh),
        })
        .collect()
}

fn points_from_view(view: &TimeOfDayView) -> Vec<ChartPoint> {
    view.iter()
        .map(|(time, &kwh)| ChartPoint {
            x: time.format(TIME_FORMAT).to_string(),
            y: Some(kwh),
        })
        .collect()
}

pub fn series_chart(series: &Series, resolution_label: &str, scatter: bool) -> Chart {
    Chart {
        title: format!("Energy consumption per {resolution_label}"),
        x_label: "Date".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: if scatter {
            ChartKind::Scatter
        } else {
            ChartKind::Line
        },
        series: vec![ChartSeries {
            name: "kwh".to_string(),
            points: points_from_series(series, DATETIME_FORMAT),
        }],
    }
}

pub fn daily_totals_chart(daily: &Series) -> Chart {
    Chart {
        title: "Energy consumption per day".to_string(),
        x_label: "Date".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Line,
        series: vec![ChartSeries {
            name: "kwh".to_string(),
            points: points_from_series(daily, DATE_FORMAT),
        }],
    }
}

pub fn decomposition_chart(dec: &Decomposition) -> Chart {
    let component = |name: &str, vals: Vec<Option<f64>>| ChartSeries {
        name: name.to_string(),
        points: dec
            .timestamps
            .iter()
            .zip(vals)
            .map(|(ts, y)| ChartPoint {
                x: ts.format(DATE_FORMAT).to_string(),
                y,
            })
            .collect(),
    };

    Chart {
        title: "Trend decomposition".to_string(),
        x_label: "Date".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Decomposition,
        series: vec![
            component("Observed", dec.observed.iter().copied().map(Some).collect()),
            component("Trend", dec.trend.clone()),
            component("Seasonality", dec.seasonal.iter().copied().map(Some).collect()),
            component("Residual", dec.resid.clone()),
        ],
    }
}

pub fn daytime_chart(view: &TimeOfDayView) -> Chart {
    Chart {
        title: "Energy consumption daily daytime average".to_string(),
        x_label: "Day time".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Area,
        series: vec![ChartSeries {
            name: "kwh".to_string(),
            points: points_from_view(view),
        }],
    }
}

/// Both day types plotted over the same time axis; slots a day type lacks have no `y`.
pub fn daytype_chart(split: &DayTypeSplit) -> Chart {
    let axis = split.time_axis();
    let series = [DayType::Weekday, DayType::Weekend]
        .into_iter()
        .map(|day_type| {
            let view = split.get(day_type);
            ChartSeries {
                name: day_type.label().to_string(),
                points: axis
                    .iter()
                    .map(|time| ChartPoint {
                        x: time.format(TIME_FORMAT).to_string(),
                        y: view.get(time).copied(),
                    })
                    .collect(),
            }
        })
        .collect();

    Chart {
        title: "Energy consumption daytype average".to_string(),
        x_label: "Day time".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Line,
        series,
    }
}

fn points_from_composition(comp: &Composition) -> Vec<ChartPoint> {
    comp.entries()
        .iter()
        .map(|(label, val)| ChartPoint {
            x: label.clone(),
            y: Some(*val),
        })
        .collect()
}

pub fn daywise_chart(comp: &Composition) -> Chart {
    Chart {
        title: "Energy consumption daywise average".to_string(),
        x_label: "Day".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Line,
        series: vec![ChartSeries {
            name: "kwh".to_string(),
            points: points_from_composition(comp),
        }],
    }
}

pub fn composition_chart(comp: &Composition) -> Chart {
    Chart {
        title: "Energy consumption daytype average composition".to_string(),
        x_label: "Day".to_string(),
        y_label: ENERGY_LABEL.to_string(),
        kind: ChartKind::Donut,
        series: vec![ChartSeries {
            name: "kwh".to_string(),
            points: points_from_composition(comp),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::{OutlierFilter, clean};
    use crate::model::RawRecord;
    use crate::views::day_type_split;
    use std::env;

    #[test]
    fn daytype_chart_keeps_both_day_types() {
        let series = clean(
            &[
                RawRecord::new("06-01-2020 10:00", 1.0),
                RawRecord::new("06-01-2020 10:10", 0.5),
            ],
            OutlierFilter::NONE,
        )
        .unwrap();

        let chart = daytype_chart(&day_type_split(&series));

        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].name, "Weekday");
        assert_eq!(chart.series[0].points[1].x, "10:10");
        assert_eq!(chart.series[1].points.len(), 2);
        assert!(chart.series[1].points.iter().all(|p| p.y.is_none()));
        assert!(!chart.is_empty());
    }

    #[test]
    fn daytype_chart_aligns_day_types_on_shared_axis() {
        let series = clean(
            &[
                RawRecord::new("06-01-2020 10:00", 0.2),
                RawRecord::new("11-01-2020 10:00", 0.4),
                RawRecord::new("11-01-2020 10:10", 0.6),
            ],
            OutlierFilter::NONE,
        )
        .unwrap();

        let chart = daytype_chart(&day_type_split(&series));

        let weekday = &chart.series[0].points;
        let weekend = &chart.series[1].points;
        assert_eq!(
            weekday,
            &vec![
                ChartPoint {
                    x: "10:00".to_string(),
                    y: Some(0.2)
                },
                ChartPoint {
                    x: "10:10".to_string(),
                    y: None
                },
            ]
        );
        assert_eq!(weekend[0].y, Some(0.4));
        assert_eq!(weekend[1].y, Some(0.6));
    }

    #[test]
    fn json_renderer_writes_chart_document() {
        let dir = env::temp_dir().join(format!("kwh-eda-{}-render", std::process::id()));
        let renderer = JsonRenderer::new(&dir);
        let chart = composition_chart(&Composition::new([("Monday", 0.25), ("Sunday", 0.5)]));

        renderer.render("usage-composition", &chart).unwrap();

        let contents = fs::read_to_string(renderer.chart_file("usage-composition")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(value["kind"], "donut");
        assert_eq!(value["series"][0]["points"][1]["x"], "Sunday");
        assert_eq!(value["series"][0]["points"][1]["y"], 0.5);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn empty_series_renders_without_points() {
        let chart = series_chart(&Series::default(), "minute", true);

        assert_eq!(chart.kind, ChartKind::Scatter);
        assert_eq!(chart.title, "Energy consumption per minute");
        assert!(chart.is_empty());
    }
}
