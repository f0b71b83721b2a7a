//! Plotly figure construction
//!
//! Turns a [`Layout`] into a plotly-compatible figure: a heatmap strip of
//! per-sample record counts above a jittered scatter of allelic fraction,
//! with red half-purity lines and a slider that filters points by
//! population frequency. The figure serializes to plotly's JSON schema and
//! can be wrapped in a standalone HTML page.

use crate::core::error::Result;
use crate::layout::{Layout, PlotPoint};
use serde::Serialize;
use std::io::Write;

pub const DEFAULT_FILTER_STEPS: usize = 10;
pub const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const HEATMAP_DOMAIN: [f64; 2] = [0.92, 1.0];
const SCATTER_DOMAIN: [f64; 2] = [0.0, 0.88];
const LINE_COLOR: &str = "red";
const LINE_WIDTH: f64 = 2.5;

#[derive(Debug, Clone, PartialEq)]
pub struct FigureConfig {
    pub title: String,
    /// Number of slider positions over [0, max population frequency].
    pub filter_steps: usize,
    /// Character window of the sample key used as tick label.
    pub label_range: Option<(usize, usize)>,
}

impl Default for FigureConfig {
    fn default() -> Self {
        FigureConfig {
            title: "Allelic Frequency Plot".to_string(),
            filter_steps: DEFAULT_FILTER_STEPS,
            label_range: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: FigureLayout,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Scatter(ScatterTrace),
    Heatmap(HeatmapTrace),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub visible: bool,
    pub mode: &'static str,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub marker: Marker,
    /// Gene, protein change and read depth per point.
    pub customdata: Vec<(String, String, u32)>,
    pub hovertemplate: &'static str,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub color: Vec<Option<f64>>,
    pub colorscale: &'static str,
    pub reversescale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cmax: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapTrace {
    pub visible: bool,
    pub z: Vec<Vec<usize>>,
    pub x: Vec<usize>,
    pub y: Vec<&'static str>,
    pub text: Vec<Vec<String>>,
    pub colorscale: &'static str,
    pub showscale: bool,
    pub zmin: usize,
    pub zmax: usize,
    pub hovertemplate: &'static str,
    pub xaxis: &'static str,
    pub yaxis: &'static str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showgrid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showticklabels: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zeroline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickwidth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tick0: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dtick: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickmode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickvals: Option<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticktext: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickangle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Shape {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub xref: &'static str,
    pub yref: &'static str,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub line: ShapeLine,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeLine {
    pub color: &'static str,
    pub width: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Annotation {
    pub x: usize,
    pub y: usize,
    pub xref: &'static str,
    pub yref: &'static str,
    pub text: String,
    pub showarrow: bool,
    pub font: Font,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Font {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Slider {
    pub active: usize,
    pub currentvalue: CurrentValue,
    pub pad: Pad,
    pub steps: Vec<SliderStep>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurrentValue {
    pub visible: bool,
    pub prefix: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pad {
    pub t: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SliderStep {
    pub method: &'static str,
    pub label: String,
    pub args: Vec<VisibilityUpdate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisibilityUpdate {
    pub visible: Vec<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HoverLabel {
    pub bgcolor: &'static str,
    pub font: Font,
}

#[derive(Debug, Clone, Serialize)]
pub struct FigureLayout {
    pub title: Title,
    pub showlegend: bool,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub xaxis2: Axis,
    pub yaxis2: Axis,
    pub shapes: Vec<Shape>,
    pub annotations: Vec<Annotation>,
    pub sliders: Vec<Slider>,
    pub hoverlabel: HoverLabel,
}

impl Figure {
    /// Scatter traces, one per filter step, in slider order.
    pub fn scatter_traces(&self) -> impl Iterator<Item = &ScatterTrace> {
        self.data.iter().filter_map(|t| match t {
            Trace::Scatter(s) => Some(s),
            _ => None,
        })
    }

    pub fn heatmap(&self) -> Option<&HeatmapTrace> {
        self.data.iter().find_map(|t| match t {
            Trace::Heatmap(h) => Some(h),
            _ => None,
        })
    }

    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Standalone page that renders the figure with plotly.js from its CDN.
    pub fn write_html<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = serde_json::to_string(self)?;
        write!(
            writer,
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{src}"></script>
</head>
<body>
<div id="afplot" style="width:100%;height:95vh;"></div>
<script>
const figure = {json};
Plotly.newPlot("afplot", figure.data, figure.layout);
</script>
</body>
</html>
"#,
            title = html_escape(&self.layout.title.text),
            src = PLOTLY_JS_URL,
            json = json.replace("</", "<\\/"),
        )?;
        writer.flush()?;
        Ok(())
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `steps` evenly spaced thresholds over [0, max]; a single 0 when there is nothing to filter.
pub fn filter_thresholds(max: Option<f64>, steps: usize) -> Vec<f64> {
    match max {
        Some(max) if steps > 1 && max > 0.0 => (0..steps)
            .map(|i| max * i as f64 / (steps - 1) as f64)
            .collect(),
        _ => vec![0.0],
    }
}

/// Does `point` survive slider step `step` with the given threshold?
///
/// The first step is the unfiltered view; later steps keep annotated points
/// whose population frequency is strictly above the threshold.
#[inline]
pub fn passes_filter(point: &PlotPoint, step: usize, threshold: f64) -> bool {
    step == 0 || point.population_freq.is_some_and(|f| f > threshold)
}

/// Tick label for a sample key.
pub fn sample_label(key: &str, range: Option<(usize, usize)>) -> String {
    match range {
        Some((start, end)) if start < end => {
            let label: String = key.chars().skip(start).take(end - start).collect();
            if label.is_empty() {
                key.to_string()
            } else {
                label
            }
        }
        _ => key.to_string(),
    }
}

pub struct FigureBuilder {
    config: FigureConfig,
}

impl FigureBuilder {
    pub fn new(config: FigureConfig) -> Self {
        FigureBuilder { config }
    }

    pub fn build(&self, layout: &Layout) -> Figure {
        let thresholds = filter_thresholds(layout.max_population_freq(), self.config.filter_steps);
        let cmin = layout.min_population_freq();
        let cmax = layout.max_population_freq();

        let mut data: Vec<Trace> = thresholds
            .iter()
            .enumerate()
            .map(|(step, &threshold)| {
                Trace::Scatter(self.scatter(layout, step, threshold, cmin, cmax))
            })
            .collect();
        data.push(Trace::Heatmap(self.heatmap(layout)));

        let figure_layout = FigureLayout {
            title: Title {
                text: self.config.title.clone(),
            },
            showlegend: false,
            xaxis: self.heatmap_xaxis(layout),
            yaxis: Axis {
                domain: Some(HEATMAP_DOMAIN),
                anchor: Some("x"),
                visible: Some(false),
                ..Axis::default()
            },
            xaxis2: self.scatter_xaxis(layout),
            yaxis2: Axis {
                domain: Some(SCATTER_DOMAIN),
                anchor: Some("x2"),
                range: Some([-0.1, 1.1]),
                showgrid: Some(false),
                zeroline: Some(false),
                ticks: Some("outside"),
                tickwidth: Some(2.0),
                tick0: Some(0.0),
                dtick: Some(0.2),
                title: Some(Title {
                    text: "allelic fraction".to_string(),
                }),
                ..Axis::default()
            },
            shapes: layout
                .slots
                .iter()
                .map(|slot| Shape {
                    kind: "line",
                    xref: "x2",
                    yref: "y2",
                    x0: slot.line.x0,
                    x1: slot.line.x1,
                    y0: slot.line.y,
                    y1: slot.line.y,
                    line: ShapeLine {
                        color: LINE_COLOR,
                        width: LINE_WIDTH,
                    },
                })
                .collect(),
            annotations: layout
                .slots
                .iter()
                .map(|slot| Annotation {
                    x: slot.rank,
                    y: 0,
                    xref: "x",
                    yref: "y",
                    text: slot.count.to_string(),
                    showarrow: false,
                    font: Font {
                        color: Some("#ffffff"),
                        ..Font::default()
                    },
                })
                .collect(),
            sliders: vec![self.slider(&thresholds)],
            hoverlabel: HoverLabel {
                bgcolor: "white",
                font: Font {
                    size: Some(16),
                    family: Some("Rockwell"),
                    ..Font::default()
                },
            },
        };

        Figure {
            data,
            layout: figure_layout,
        }
    }

    fn scatter(
        &self,
        layout: &Layout,
        step: usize,
        threshold: f64,
        cmin: Option<f64>,
        cmax: Option<f64>,
    ) -> ScatterTrace {
        let points: Vec<&PlotPoint> = layout
            .points
            .iter()
            .filter(|p| passes_filter(p, step, threshold))
            .collect();

        ScatterTrace {
            name: format!("population frequency > {:.2}", threshold),
            visible: step == 0,
            mode: "markers",
            x: points.iter().map(|p| p.x).collect(),
            y: points.iter().map(|p| p.tumor_freq).collect(),
            marker: Marker {
                color: points.iter().map(|p| p.population_freq).collect(),
                colorscale: "Viridis",
                reversescale: true,
                cmin,
                cmax,
            },
            customdata: points
                .iter()
                .map(|p| (p.gene.clone(), p.protein_change.clone(), p.read_depth()))
                .collect(),
            hovertemplate: "<extra></extra>allelic_fraction: %{y:.3f}<br>Gene: %{customdata[0]} <br>Protein Change: %{customdata[1]} <br>Read Depth: %{customdata[2]:d}",
            xaxis: "x2",
            yaxis: "y2",
        }
    }

    fn heatmap(&self, layout: &Layout) -> HeatmapTrace {
        let counts = layout.counts();
        HeatmapTrace {
            visible: true,
            zmax: counts.iter().copied().max().unwrap_or(0),
            z: vec![counts],
            x: layout.slots.iter().map(|s| s.rank).collect(),
            y: vec![""],
            text: vec![layout
                .slots
                .iter()
                .map(|s| sample_label(&s.key, self.config.label_range))
                .collect()],
            colorscale: "Viridis",
            showscale: false,
            zmin: 0,
            hovertemplate: "<extra></extra>%{text}<br>Num Mutations: %{z:d}",
            xaxis: "x",
            yaxis: "y",
        }
    }

    fn slot_range(layout: &Layout) -> [f64; 2] {
        [0.5, layout.slots.len() as f64 + 0.5]
    }

    fn heatmap_xaxis(&self, layout: &Layout) -> Axis {
        Axis {
            anchor: Some("y"),
            matches: Some("x2"),
            range: Some(Self::slot_range(layout)),
            showticklabels: Some(false),
            ticks: Some("outside"),
            tick0: Some(1.0),
            dtick: Some(1.0),
            tickwidth: Some(2.0),
            ..Axis::default()
        }
    }

    fn scatter_xaxis(&self, layout: &Layout) -> Axis {
        Axis {
            anchor: Some("y2"),
            range: Some(Self::slot_range(layout)),
            showgrid: Some(false),
            ticks: Some("outside"),
            tickwidth: Some(2.0),
            tickmode: Some("array"),
            tickvals: Some(layout.slots.iter().map(|s| s.rank).collect()),
            ticktext: Some(
                layout
                    .slots
                    .iter()
                    .map(|s| sample_label(&s.key, self.config.label_range))
                    .collect(),
            ),
            tickangle: Some(270.0),
            ..Axis::default()
        }
    }

    fn slider(&self, thresholds: &[f64]) -> Slider {
        let traces = thresholds.len() + 1;
        let steps = thresholds
            .iter()
            .enumerate()
            .map(|(i, threshold)| {
                let mut visible = vec![false; traces];
                visible[i] = true;
                visible[traces - 1] = true;
                SliderStep {
                    method: "update",
                    label: format!("{:.2}", threshold),
                    args: vec![VisibilityUpdate { visible }],
                }
            })
            .collect();

        Slider {
            active: 0,
            currentvalue: CurrentValue {
                visible: false,
                prefix: "population frequency > ",
            },
            pad: Pad { t: 100 },
            steps,
        }
    }
}
