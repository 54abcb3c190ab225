//! Declarative-Component Emitter: the same logical kind mapping as the
//! canvas backend, but returned as data/props consumed directly by a
//! component render function. Series are re-validated here because this
//! emitter can be handed a dataset that never went through the validator
//! (the CMS preview path calls it directly).

use serde::Serialize;
use serde_json::{json, Value};

use crate::emit::{downsampled_table, synthesized_column_series, usable_series};
use crate::palette::{Palette, WATERFALL_TOTAL};
use crate::spec::{ChartKind, ChartSpec, SeriesSpec, ValueFormat};
use crate::table::Table;
use crate::transform::{gauge_reading, heatmap_plan, treemap_leaves, waterfall_segments, HeatmapPlan};
use crate::CompilerConfig;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSeries {
    /// Key into each data row this series reads.
    pub data_key: String,
    pub name: String,
    pub colour: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    /// Per-series shape override for composed charts.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub series_type: Option<String>,
}

/// Props for the component renderer: which component to mount, the row
/// objects it binds to, and one entry per series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentChartProps {
    pub component: String,
    /// Data key of the category axis (the first column's header).
    pub x_key: String,
    pub data: Value,
    pub series: Vec<ComponentSeries>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_label: Option<String>,
    pub value_format: ValueFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_angle: Option<f64>,
}

pub fn emit_component(spec: &ChartSpec, config: &CompilerConfig) -> Option<ComponentChartProps> {
    if spec.table.is_empty() {
        return None;
    }

    if spec.kind == ChartKind::Heatmap {
        return match heatmap_plan(&spec.table, config) {
            HeatmapPlan::FallbackStacked => {
                let mut fallback = spec.clone();
                fallback.kind = ChartKind::StackedColumn;
                fallback.series = synthesized_column_series(&spec.table);
                emit_component(&fallback, config)
            }
            HeatmapPlan::Grid(grid) => {
                let mut cells = Vec::new();
                for (r, row) in grid.cells.iter().enumerate() {
                    for (c, cell) in row.iter().enumerate() {
                        cells.push(json!({
                            "row": grid.row_labels[r],
                            "col": grid.col_labels[c],
                            "value": cell.value,
                            "fill": cell.colour,
                        }));
                    }
                }
                Some(base_props(spec, "Heatmap", Value::Array(cells), Vec::new()))
            }
        };
    }

    let valid = usable_series(spec)?;
    let palette = &config.general_palette;
    let table = downsampled_table(spec, config.canvas_max_points);

    match spec.kind {
        ChartKind::Pie | ChartKind::Donut => {
            let value_col = spec.value_column_index(&valid)?;
            let colours = palette.row_colours(table.rows.len());
            let slices: Vec<Value> = table
                .category_labels()
                .into_iter()
                .zip(table.numeric_column(value_col))
                .zip(colours)
                .map(|((name, value), fill)| json!({ "name": name, "value": value, "fill": fill }))
                .collect();
            let mut props = base_props(spec, "PieChart", Value::Array(slices), Vec::new());
            if spec.kind == ChartKind::Donut {
                props.inner_radius = Some("60%".to_string());
            }
            Some(props)
        }
        ChartKind::Gauge => {
            let value_col = spec.value_column_index(&valid)?;
            let reading = gauge_reading(&table, value_col, spec.gauge_max, palette)?;
            let slices = json!([
                { "name": "value", "value": reading.percentage, "fill": reading.fill_colour },
                { "name": "remainder", "value": 100.0 - reading.percentage, "fill": reading.remainder_colour },
            ]);
            let mut props = base_props(spec, "PieChart", slices, Vec::new());
            props.inner_radius = Some("70%".to_string());
            props.start_angle = Some(180.0);
            props.end_angle = Some(0.0);
            Some(props)
        }
        ChartKind::Waterfall => {
            let value_col = spec.value_column_index(&valid)?;
            let bars: Vec<Value> = waterfall_segments(&table, value_col)
                .into_iter()
                .map(|s| json!({ "name": s.label, "range": [s.start, s.end], "fill": s.colour }))
                .collect();
            // Per-bar colours live on the data rows; the series-level colour
            // is the total colour so legends have something sensible.
            let series = vec![ComponentSeries {
                data_key: "range".to_string(),
                name: valid.first().map(|s| s.label.clone()).unwrap_or_default(),
                colour: WATERFALL_TOTAL.to_string(),
                stack_id: None,
                series_type: None,
            }];
            Some(base_props(spec, "BarChart", Value::Array(bars), series))
        }
        ChartKind::Treemap => {
            let value_col = spec.value_column_index(&valid)?;
            let leaves: Vec<Value> = treemap_leaves(&table, value_col, palette)
                .into_iter()
                .map(|l| json!({ "name": l.label, "size": l.size, "fill": l.colour }))
                .collect();
            Some(base_props(spec, "Treemap", Value::Array(leaves), Vec::new()))
        }
        ChartKind::Scatter => {
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
            let series = valid
                .first()
                .map(|s| {
                    vec![ComponentSeries {
                        data_key: "y".to_string(),
                        name: s.label.clone(),
                        colour: palette.colour_for(s, 0),
                        stack_id: None,
                        series_type: None,
                    }]
                })
                .unwrap_or_default();
            Some(base_props(spec, "ScatterChart", Value::Array(points), series))
        }
        _ => Some(cartesian_props(spec, &table, &valid, palette)),
    }
}

fn component_name(kind: ChartKind) -> &'static str {
    match kind {
        ChartKind::Line => "LineChart",
        ChartKind::Area | ChartKind::StackedArea => "AreaChart",
        ChartKind::Radar => "RadarChart",
        ChartKind::Composed => "ComposedChart",
        _ => "BarChart",
    }
}

fn cartesian_props(
    spec: &ChartSpec,
    table: &Table,
    valid: &[SeriesSpec],
    palette: &Palette,
) -> ComponentChartProps {
    // One object per row: the category key plus every valid series column.
    let labels = table.category_labels();
    let rows: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let mut obj = serde_json::Map::new();
            obj.insert(x_key(table), json!(label));
            for series in valid {
                if let Some(col) = table.column_index(&series.data_column) {
                    let v = table.rows[i].get(col).map(|c| c.as_number()).unwrap_or(0.0);
                    obj.insert(series.data_column.clone(), json!(v));
                }
            }
            Value::Object(obj)
        })
        .collect();

    let series = valid
        .iter()
        .enumerate()
        .map(|(i, s)| ComponentSeries {
            data_key: s.data_column.clone(),
            name: s.label.clone(),
            colour: palette.colour_for(s, i),
            stack_id: spec.kind.is_stacked().then(|| "stack".to_string()),
            series_type: match spec.kind {
                ChartKind::Composed if i == 0 => Some("bar".to_string()),
                ChartKind::Composed => Some("line".to_string()),
                _ => None,
            },
        })
        .collect();

    let mut props = base_props(spec, component_name(spec.kind), Value::Array(rows), series);
    if spec.kind == ChartKind::Bar {
        props.layout = Some("vertical".to_string());
    }
    props
}

fn x_key(table: &Table) -> String {
    table.headers.first().cloned().unwrap_or_else(|| "name".to_string())
}

fn base_props(
    spec: &ChartSpec,
    component: &str,
    data: Value,
    series: Vec<ComponentSeries>,
) -> ComponentChartProps {
    ComponentChartProps {
        component: component.to_string(),
        x_key: x_key(&spec.table),
        data,
        series,
        x_axis_label: spec.x_axis_label.clone(),
        y_axis_label: spec.y_axis_label.clone(),
        value_format: spec.value_format,
        layout: None,
        inner_radius: None,
        start_angle: None,
        end_angle: None,
    }
}
