//! Canvas-Chart Emitter: maps a chart spec onto the imperative canvas
//! charting library's config shape (`type` + `data.labels`/`data.datasets`
//! + `options`). Tick formatting stays abstract (`ValueFormat`) inside the
//! config and is only re-expressed as JavaScript source at the text
//! serialization boundary, since functions cannot cross it natively.

use serde::Serialize;
use serde_json::{json, Value};

use crate::emit::{downsampled_table, synthesized_column_series, usable_series};
use crate::palette::Palette;
use crate::spec::{ChartKind, ChartSpec, SeriesSpec, ValueFormat};
use crate::table::Table;
use crate::transform::{gauge_reading, heatmap_plan, treemap_leaves, waterfall_segments, HeatmapPlan};
use crate::CompilerConfig;

/// Placeholder the tick callback occupies inside the serializable config.
/// `render_config_text` swaps it for real function source.
const TICK_CALLBACK_MARKER: &str = "__tick_callback__";

/// Either a single colour for a whole dataset or one colour per element
/// (pie slices, waterfall segments, heat-map cells).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colour {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDataset {
    pub label: String,
    pub data: Value,
    pub background_color: Colour,
    pub border_color: Colour,
    /// Dataset-level type override, used by composed charts to overlay
    /// lines on a bar base.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub dataset_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasData {
    pub labels: Vec<String>,
    pub datasets: Vec<CanvasDataset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickConfig {
    pub callback: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasAxis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stacked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<TickConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasScales {
    pub x: CanvasAxis,
    pub y: CanvasAxis,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasLegend {
    pub display: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasTooltip {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasPlugins {
    pub legend: CanvasLegend,
    pub tooltip: CanvasTooltip,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOptions {
    pub responsive: bool,
    pub animation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<String>,
    pub plugins: CanvasPlugins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<CanvasScales>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circumference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CanvasChartConfig {
    #[serde(rename = "type")]
    pub chart_type: String,
    pub data: CanvasData,
    pub options: CanvasOptions,
}

/// A compiled canvas chart: the serializable config plus the abstract
/// formatting rule resolved only when the config crosses the text boundary.
#[derive(Debug, Clone)]
pub struct CanvasChart {
    pub config: CanvasChartConfig,
    pub value_format: ValueFormat,
}

/// Compile a spec for the web canvas view: general palette, 500-point
/// ceiling. Returns `None` for empty data or zero valid series.
pub fn emit_canvas(spec: &ChartSpec, config: &CompilerConfig) -> Option<CanvasChart> {
    emit_canvas_with(spec, config, &config.general_palette, config.canvas_max_points)
}

/// Compile with an explicit palette and ceiling; the raster builder reuses
/// this with the print palette and its own tighter ceiling.
pub(crate) fn emit_canvas_with(
    spec: &ChartSpec,
    config: &CompilerConfig,
    palette: &Palette,
    ceiling: usize,
) -> Option<CanvasChart> {
    if spec.table.is_empty() {
        return None;
    }

    // Heatmap resolves its degrade policy first: an oversize grid becomes a
    // stacked-column chart with one series per grid column.
    if spec.kind == ChartKind::Heatmap {
        match heatmap_plan(&spec.table, config) {
            HeatmapPlan::FallbackStacked => {
                let mut fallback = spec.clone();
                fallback.kind = ChartKind::StackedColumn;
                fallback.series = synthesized_column_series(&spec.table);
                return emit_canvas_with(&fallback, config, palette, ceiling);
            }
            HeatmapPlan::Grid(grid) => {
                let cfg = matrix_config(grid);
                return Some(CanvasChart {
                    config: cfg,
                    value_format: spec.value_format,
                });
            }
        }
    }

    let valid = usable_series(spec)?;
    let table = downsampled_table(spec, ceiling);

    let cfg = match spec.kind {
        ChartKind::Pie | ChartKind::Donut => pie_config(spec, &table, &valid, palette)?,
        ChartKind::Gauge => gauge_config(spec, &table, &valid, palette)?,
        ChartKind::Waterfall => waterfall_config(spec, &table, &valid)?,
        ChartKind::Treemap => treemap_config(spec, &table, &valid, palette)?,
        ChartKind::Scatter => scatter_config(spec, &table, &valid, palette),
        _ => cartesian_config(spec, &table, &valid, palette),
    };

    Some(CanvasChart {
        config: cfg,
        value_format: spec.value_format,
    })
}

fn plugins(legend: bool) -> CanvasPlugins {
    CanvasPlugins {
        legend: CanvasLegend { display: legend },
        tooltip: CanvasTooltip { enabled: true },
    }
}

fn axis_title(text: &Option<String>) -> Option<AxisTitle> {
    text.as_ref().map(|t| AxisTitle {
        display: true,
        text: t.clone(),
    })
}

fn tick_marker() -> Option<TickConfig> {
    Some(TickConfig {
        callback: TICK_CALLBACK_MARKER.to_string(),
    })
}

/// Cartesian scales with the format callback on the value axis. A horizontal
/// bar chart's value axis is x; everywhere else it is y.
fn cartesian_scales(spec: &ChartSpec, stacked: bool) -> CanvasScales {
    let stacked_flag = stacked.then_some(true);
    let value_axis_is_x = spec.kind == ChartKind::Bar;
    CanvasScales {
        x: CanvasAxis {
            stacked: stacked_flag,
            title: axis_title(&spec.x_axis_label),
            ticks: if value_axis_is_x { tick_marker() } else { None },
        },
        y: CanvasAxis {
            stacked: stacked_flag,
            title: axis_title(&spec.y_axis_label),
            ticks: if value_axis_is_x { None } else { tick_marker() },
        },
    }
}

fn cartesian_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> CanvasChartConfig {
    let (chart_type, fill) = match spec.kind {
        ChartKind::Area | ChartKind::StackedArea => ("line", true),
        ChartKind::Line => ("line", false),
        ChartKind::Radar => ("radar", false),
        _ => ("bar", false),
    };
    let stacked = spec.kind.is_stacked();

    let datasets = valid
        .iter()
        .enumerate()
        .map(|(i, series)| {
            let colour = palette.colour_for(series, i);
            let col = table.column_index(&series.data_column).unwrap_or(0);
            let values: Vec<Value> = table.numeric_column(col).into_iter().map(|v| json!(v)).collect();
            CanvasDataset {
                label: series.label.clone(),
                data: Value::Array(values),
                background_color: Colour::One(colour.clone()),
                border_color: Colour::One(colour),
                dataset_type: (spec.kind == ChartKind::Composed && i > 0)
                    .then(|| "line".to_string()),
                fill: fill.then_some(true),
                stack: (spec.kind == ChartKind::StackedColumn).then(|| "total".to_string()),
            }
        })
        .collect();

    CanvasChartConfig {
        chart_type: chart_type.to_string(),
        data: CanvasData {
            labels: table.category_labels(),
            datasets,
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: (spec.kind == ChartKind::Bar).then(|| "y".to_string()),
            plugins: plugins(true),
            scales: (spec.kind != ChartKind::Radar).then(|| cartesian_scales(spec, stacked)),
            rotation: None,
            circumference: None,
            cutout: None,
        },
    }
}

fn pie_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> Option<CanvasChartConfig> {
    let value_col = spec.value_column_index(valid)?;
    let values: Vec<Value> = table.numeric_column(value_col).into_iter().map(|v| json!(v)).collect();
    let label = valid
        .first()
        .map(|s| s.label.clone())
        .or_else(|| table.headers.get(value_col).cloned())
        .unwrap_or_default();

    Some(CanvasChartConfig {
        chart_type: if spec.kind == ChartKind::Donut {
            "doughnut".to_string()
        } else {
            "pie".to_string()
        },
        data: CanvasData {
            labels: table.category_labels(),
            datasets: vec![CanvasDataset {
                label,
                data: Value::Array(values),
                background_color: Colour::Many(palette.row_colours(table.rows.len())),
                border_color: Colour::One("#FFFFFF".to_string()),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(true),
            scales: None,
            rotation: None,
            circumference: None,
            cutout: (spec.kind == ChartKind::Donut).then(|| "60%".to_string()),
        },
    })
}

/// A gauge is a half doughnut: the clamped percentage plus its neutral
/// remainder, rotated to open upward.
fn gauge_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> Option<CanvasChartConfig> {
    let value_col = spec.value_column_index(valid)?;
    let reading = gauge_reading(table, value_col, spec.gauge_max, palette)?;

    Some(CanvasChartConfig {
        chart_type: "doughnut".to_string(),
        data: CanvasData {
            labels: vec!["value".to_string(), "remainder".to_string()],
            datasets: vec![CanvasDataset {
                label: valid.first().map(|s| s.label.clone()).unwrap_or_default(),
                data: json!([reading.percentage, 100.0 - reading.percentage]),
                background_color: Colour::Many(vec![reading.fill_colour, reading.remainder_colour]),
                border_color: Colour::One("#FFFFFF".to_string()),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(false),
            scales: None,
            rotation: Some(-90.0),
            circumference: Some(180.0),
            cutout: Some("70%".to_string()),
        },
    })
}

/// Waterfall as floating bars: each datum is a `[start, end]` pair with a
/// per-segment colour.
fn waterfall_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
) -> Option<CanvasChartConfig> {
    let value_col = spec.value_column_index(valid)?;
    let segments = waterfall_segments(table, value_col);

    let labels: Vec<String> = segments.iter().map(|s| s.label.clone()).collect();
    let data: Vec<Value> = segments.iter().map(|s| json!([s.start, s.end])).collect();
    let colours: Vec<String> = segments.iter().map(|s| s.colour.clone()).collect();

    Some(CanvasChartConfig {
        chart_type: "bar".to_string(),
        data: CanvasData {
            labels,
            datasets: vec![CanvasDataset {
                label: valid.first().map(|s| s.label.clone()).unwrap_or_default(),
                data: Value::Array(data),
                background_color: Colour::Many(colours.clone()),
                border_color: Colour::Many(colours),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(false),
            scales: Some(cartesian_scales(spec, false)),
            rotation: None,
            circumference: None,
            cutout: None,
        },
    })
}

fn treemap_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> Option<CanvasChartConfig> {
    let value_col = spec.value_column_index(valid)?;
    let leaves = treemap_leaves(table, value_col, palette);
    let data: Vec<Value> = leaves
        .iter()
        .map(|l| json!({ "label": l.label, "size": l.size }))
        .collect();
    let colours: Vec<String> = leaves.iter().map(|l| l.colour.clone()).collect();

    Some(CanvasChartConfig {
        chart_type: "treemap".to_string(),
        data: CanvasData {
            labels: Vec::new(),
            datasets: vec![CanvasDataset {
                label: table.headers.get(value_col).cloned().unwrap_or_default(),
                data: Value::Array(data),
                background_color: Colour::Many(colours),
                border_color: Colour::One("#FFFFFF".to_string()),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(false),
            scales: None,
            rotation: None,
            circumference: None,
            cutout: None,
        },
    })
}

/// Heat-map grid as a matrix chart: one datum per cell with its
/// pre-interpolated colour.
fn matrix_config(grid: crate::transform::HeatmapGrid) -> CanvasChartConfig {
    let mut data = Vec::new();
    let mut colours = Vec::new();
    for (r, row) in grid.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            data.push(json!({
                "x": grid.col_labels[c],
                "y": grid.row_labels[r],
                "v": cell.value,
            }));
            colours.push(cell.colour.clone());
        }
    }

    CanvasChartConfig {
        chart_type: "matrix".to_string(),
        data: CanvasData {
            labels: grid.row_labels,
            datasets: vec![CanvasDataset {
                label: "values".to_string(),
                data: Value::Array(data),
                background_color: Colour::Many(colours),
                border_color: Colour::One("#FFFFFF".to_string()),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(false),
            scales: None,
            rotation: None,
            circumference: None,
            cutout: None,
        },
    }
}

/// Scatter reads columns 0 and 1 as arbitrary X/Y, the one kind where the
/// first column is not a category key.
fn scatter_config(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> CanvasChartConfig {
    let points: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            json!({
                "x": row.first().map(|c| c.as_number()).unwrap_or(0.0),
                "y": row.get(1).map(|c| c.as_number()).unwrap_or(0.0),
            })
        })
        .collect();
    let label = valid.first().map(|s| s.label.clone()).unwrap_or_default();
    let colour = valid
        .first()
        .map(|s| palette.colour_for(s, 0))
        .unwrap_or_else(|| palette.colour_at(0).to_string());

    CanvasChartConfig {
        chart_type: "scatter".to_string(),
        data: CanvasData {
            labels: Vec::new(),
            datasets: vec![CanvasDataset {
                label,
                data: Value::Array(points),
                background_color: Colour::One(colour.clone()),
                border_color: Colour::One(colour),
                dataset_type: None,
                fill: None,
                stack: None,
            }],
        },
        options: CanvasOptions {
            responsive: true,
            animation: true,
            index_axis: None,
            plugins: plugins(true),
            scales: Some(cartesian_scales(spec, false)),
            rotation: None,
            circumference: None,
            cutout: None,
        },
    }
}

/// JavaScript source for the tick formatter of each format rule. Only
/// produced here, at the serialization boundary.
fn tick_formatter_source(format: ValueFormat) -> &'static str {
    match format {
        ValueFormat::Number => "function(value) { return value.toLocaleString(); }",
        ValueFormat::Percent => "function(value) { return value + '%'; }",
        ValueFormat::Currency => "function(value) { return '$' + value.toLocaleString(); }",
    }
}

/// Serialize the config as text, splicing the tick formatter's function
/// source over its placeholder. This is the one place formatting logic
/// becomes executable payload.
pub fn render_config_text(chart: &CanvasChart) -> String {
    let json = serde_json::to_string(&chart.config).unwrap_or_else(|_| "null".to_string());
    let marker = format!("\"{}\"", TICK_CALLBACK_MARKER);
    json.replace(&marker, tick_formatter_source(chart.value_format))
}

/// A script statement that instantiates the chart on a canvas element.
pub fn render_embed_script(chart: &CanvasChart, element_id: &str) -> String {
    format!(
        "new Chart(document.getElementById('{}'), {});",
        element_id,
        render_config_text(chart)
    )
}
