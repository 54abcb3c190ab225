//! Presentation-Object Emitter: maps a chart spec onto the presentation
//! file format's native chart model. The native type set is materially
//! smaller than the canvas backend's, so kinds it cannot express faithfully
//! are approximated (composed becomes a bar chart) or handed back as a
//! pre-rasterized image request (waterfall, gauge, treemap, small heatmaps).

use serde::Serialize;

use crate::emit::{downsampled_table, synthesized_column_series, usable_series};
use crate::spec::{ChartKind, ChartSpec, SeriesSpec};
use crate::table::Table;
use crate::transform::{heatmap_plan, HeatmapPlan};
use crate::CompilerConfig;

/// Default chart placement on a slide, in inches.
const SLIDE_X: f64 = 0.5;
const SLIDE_Y: f64 = 1.2;
const SLIDE_W: f64 = 9.0;
const SLIDE_H: f64 = 5.0;

/// The presentation format's native chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideNativeType {
    Pie,
    Doughnut,
    Line,
    Bar,
    Area,
    Radar,
    Scatter,
}

/// One native series: pptx-style parallel labels/values arrays.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideSeries {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideChartOptions {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub chart_colors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_grouping: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_percent: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cat_axis_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val_axis_title: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideChartSpec {
    pub chart_type: SlideNativeType,
    pub series: Vec<SlideSeries>,
    pub options: SlideChartOptions,
}

/// What the slide builder should place: a native chart object, or an image
/// rendered through the raster pipeline for the kinds the native model
/// cannot express.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SlidePlan {
    Native(SlideChartSpec),
    Image(SlideImageFallback),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideImageFallback {
    pub render_as_image: bool,
    pub kind: String,
}

fn image_fallback(kind: ChartKind) -> SlidePlan {
    SlidePlan::Image(SlideImageFallback {
        render_as_image: true,
        kind: kind.name().to_string(),
    })
}

pub fn emit_presentation(spec: &ChartSpec, config: &CompilerConfig) -> Option<SlidePlan> {
    if spec.table.is_empty() {
        return None;
    }

    // Not natively representable: hand back an image request. An oversize
    // heatmap degrades to stacked columns first, same as every backend.
    match spec.kind {
        ChartKind::Waterfall | ChartKind::Gauge | ChartKind::Treemap => {
            // The "no chart" rule still applies before the image fallback.
            usable_series(spec)?;
            return Some(image_fallback(spec.kind));
        }
        ChartKind::Heatmap => {
            return match heatmap_plan(&spec.table, config) {
                HeatmapPlan::Grid(_) => Some(image_fallback(spec.kind)),
                HeatmapPlan::FallbackStacked => {
                    let mut fallback = spec.clone();
                    fallback.kind = ChartKind::StackedColumn;
                    fallback.series = synthesized_column_series(&spec.table);
                    emit_presentation(&fallback, config)
                }
            };
        }
        _ => {}
    }

    let valid = usable_series(spec)?;
    let table = downsampled_table(spec, config.presentation_max_points);

    let chart_type = match spec.kind {
        ChartKind::Pie => SlideNativeType::Pie,
        ChartKind::Donut => SlideNativeType::Doughnut,
        ChartKind::Line => SlideNativeType::Line,
        ChartKind::Area | ChartKind::StackedArea => SlideNativeType::Area,
        ChartKind::Radar => SlideNativeType::Radar,
        ChartKind::Scatter => SlideNativeType::Scatter,
        // Column, bar, stacked column; composed is approximated as bar.
        _ => SlideNativeType::Bar,
    };

    let (series, chart_colors) = match spec.kind {
        ChartKind::Pie | ChartKind::Donut => {
            let value_col = spec.value_column_index(&valid)?;
            let series = vec![SlideSeries {
                name: valid
                    .first()
                    .map(|s| s.label.clone())
                    .or_else(|| table.headers.get(value_col).cloned())
                    .unwrap_or_default(),
                labels: table.category_labels(),
                values: table.numeric_column(value_col),
            }];
            (series, config.general_palette.row_colours(table.rows.len()))
        }
        ChartKind::Scatter => {
            let series = vec![
                SlideSeries {
                    name: "X-Values".to_string(),
                    labels: Vec::new(),
                    values: table.numeric_column(0),
                },
                SlideSeries {
                    name: valid.first().map(|s| s.label.clone()).unwrap_or_default(),
                    labels: Vec::new(),
                    values: table.numeric_column(1),
                },
            ];
            let colours = series_colours(&valid, config);
            (series, colours)
        }
        _ => (series_from_columns(&table, &valid), series_colours(&valid, config)),
    };

    let options = SlideChartOptions {
        x: SLIDE_X,
        y: SLIDE_Y,
        w: SLIDE_W,
        h: SLIDE_H,
        chart_colors,
        bar_dir: match spec.kind {
            ChartKind::Bar => Some("bar".to_string()),
            ChartKind::Column | ChartKind::StackedColumn | ChartKind::Composed => {
                Some("col".to_string())
            }
            _ => None,
        },
        bar_grouping: spec.kind.is_stacked().then(|| "stacked".to_string()),
        show_percent: matches!(spec.kind, ChartKind::Pie | ChartKind::Donut).then_some(true),
        hole_size: (spec.kind == ChartKind::Donut).then_some(50),
        cat_axis_title: spec.x_axis_label.clone(),
        val_axis_title: spec.y_axis_label.clone(),
    };

    Some(SlidePlan::Native(SlideChartSpec {
        chart_type,
        series,
        options,
    }))
}

fn series_from_columns(table: &Table, valid: &[SeriesSpec]) -> Vec<SlideSeries> {
    let labels = table.category_labels();
    valid
        .iter()
        .map(|s| {
            let col = table.column_index(&s.data_column).unwrap_or(0);
            SlideSeries {
                name: s.label.clone(),
                labels: labels.clone(),
                values: table.numeric_column(col),
            }
        })
        .collect()
}

fn series_colours(valid: &[SeriesSpec], config: &CompilerConfig) -> Vec<String> {
    valid
        .iter()
        .enumerate()
        .map(|(i, s)| config.general_palette.colour_for(s, i))
        .collect()
}
