use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::table::{parse_table, Table};

/// Closed enumeration of the chart kinds the compiler understands. Every
/// backend maps each kind to its own native type (or an approximation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Column,
    Bar,
    Area,
    StackedColumn,
    StackedArea,
    Pie,
    Donut,
    Scatter,
    Radar,
    Composed,
    Waterfall,
    Gauge,
    Treemap,
    Heatmap,
}

impl ChartKind {
    /// Parse the CMS `chartType` string. Accepts kebab-case, camelCase and
    /// snake_case spellings. An unknown kind falls back to `Line` rather
    /// than failing the chart.
    pub fn parse(raw: &str) -> ChartKind {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "line" => ChartKind::Line,
            "column" => ChartKind::Column,
            "bar" => ChartKind::Bar,
            "area" => ChartKind::Area,
            "stackedcolumn" => ChartKind::StackedColumn,
            "stackedarea" => ChartKind::StackedArea,
            "pie" => ChartKind::Pie,
            "donut" | "doughnut" => ChartKind::Donut,
            "scatter" => ChartKind::Scatter,
            "radar" => ChartKind::Radar,
            "composed" => ChartKind::Composed,
            "waterfall" => ChartKind::Waterfall,
            "gauge" => ChartKind::Gauge,
            "treemap" => ChartKind::Treemap,
            "heatmap" => ChartKind::Heatmap,
            _ => {
                warn!("Unknown chart kind '{}', falling back to line", raw);
                ChartKind::Line
            }
        }
    }

    /// Kinds that derive their own value columns per row instead of reading
    /// the configured series list, so they survive an empty series config.
    pub fn derives_own_columns(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Donut | ChartKind::Treemap | ChartKind::Heatmap | ChartKind::Gauge
        )
    }

    /// Kinds whose colours are assigned per row rather than per series.
    pub fn colours_per_row(self) -> bool {
        matches!(
            self,
            ChartKind::Pie | ChartKind::Donut | ChartKind::Treemap | ChartKind::Heatmap
        )
    }

    /// Kinds eligible for stride decimation when the row count exceeds a
    /// backend ceiling. Derived-category kinds keep every row.
    pub fn downsamples(self) -> bool {
        matches!(
            self,
            ChartKind::Line
                | ChartKind::Column
                | ChartKind::Bar
                | ChartKind::Area
                | ChartKind::StackedColumn
                | ChartKind::StackedArea
                | ChartKind::Scatter
                | ChartKind::Radar
                | ChartKind::Composed
        )
    }

    pub fn is_stacked(self) -> bool {
        matches!(self, ChartKind::StackedColumn | ChartKind::StackedArea)
    }

    /// Canonical kebab-case name, as the CMS spells it.
    pub fn name(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Column => "column",
            ChartKind::Bar => "bar",
            ChartKind::Area => "area",
            ChartKind::StackedColumn => "stacked-column",
            ChartKind::StackedArea => "stacked-area",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Scatter => "scatter",
            ChartKind::Radar => "radar",
            ChartKind::Composed => "composed",
            ChartKind::Waterfall => "waterfall",
            ChartKind::Gauge => "gauge",
            ChartKind::Treemap => "treemap",
            ChartKind::Heatmap => "heatmap",
        }
    }
}

/// Tick/tooltip formatting hint. Controls presentation only, never mutates
/// the underlying values. Resolved to concrete formatting logic at each
/// backend's serialization point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    #[default]
    Number,
    Percent,
    Currency,
}

/// One requested data series: a display label plus the column it reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub label: String,
    pub data_column: String,
    #[serde(default, alias = "color")]
    pub colour: Option<String>,
}

/// The CMS section contract: the raw shape chart content arrives in.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub chart_data: Option<String>,
    #[serde(default)]
    pub chart_series: Vec<SeriesSpec>,
    #[serde(default)]
    pub x_axis_label: Option<String>,
    #[serde(default)]
    pub y_axis_label: Option<String>,
    #[serde(default)]
    pub y_axis_format: Option<ValueFormat>,
    #[serde(default)]
    pub gauge_max: Option<f64>,
    #[serde(default)]
    pub value_column: Option<String>,
}

/// The canonical, backend-agnostic description of one chart. Built fresh
/// per compile request and never mutated; transforms derive new rows.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub table: Table,
    pub series: Vec<SeriesSpec>,
    pub x_axis_label: Option<String>,
    pub y_axis_label: Option<String>,
    pub value_format: ValueFormat,
    pub gauge_max: Option<f64>,
    pub value_column: Option<String>,
}

impl ChartSpec {
    /// Build a spec from a CMS section. An empty or absent dataset yields
    /// `None` ("no chart"), never an error; a structurally unparseable table
    /// is a contract violation and propagates.
    pub fn from_section(section: &Section) -> Result<Option<ChartSpec>> {
        let raw_data = match &section.chart_data {
            Some(d) => d,
            None => return Ok(None),
        };
        let table = parse_table(raw_data)?;
        if table.is_empty() {
            return Ok(None);
        }

        let kind = ChartKind::parse(section.chart_type.as_deref().unwrap_or(""));

        Ok(Some(ChartSpec {
            kind,
            table,
            series: section.chart_series.clone(),
            x_axis_label: section.x_axis_label.clone(),
            y_axis_label: section.y_axis_label.clone(),
            value_format: section.y_axis_format.unwrap_or_default(),
            gauge_max: section.gauge_max,
            value_column: section.value_column.clone(),
        }))
    }

    /// Column index the derived-category kinds (pie, gauge, treemap) read
    /// their values from: an explicit `valueColumn` override wins, then the
    /// first surviving series' column, then the second parsed column.
    pub fn value_column_index(&self, valid_series: &[SeriesSpec]) -> Option<usize> {
        if let Some(name) = &self.value_column {
            if let Some(idx) = self.table.column_index(name) {
                return Some(idx);
            }
            warn!("Configured value column '{}' not found, using fallback", name);
        }
        if let Some(series) = valid_series.first() {
            if let Some(idx) = self.table.column_index(&series.data_column) {
                return Some(idx);
            }
        }
        if self.table.headers.len() > 1 {
            Some(1)
        } else {
            None
        }
    }
}
