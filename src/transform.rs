//! Derived-series transforms: the per-chart-kind numeric derivations shared
//! by every backend emitter, so the kind-to-semantics mapping exists exactly
//! once. All transforms read the source table and produce new derived data,
//! leaving the spec untouched.

use log::warn;

use crate::palette::{
    Palette, GAUGE_REMAINDER, HEATMAP_DARK, HEATMAP_LIGHT, WATERFALL_NEGATIVE,
    WATERFALL_POSITIVE, WATERFALL_TOTAL,
};
use crate::table::{Cell, Table};
use crate::CompilerConfig;

// =============================================================================
// Waterfall
// =============================================================================

/// One floating bar of a waterfall chart.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallSegment {
    pub label: String,
    /// Cumulative total before this row's value was applied.
    pub start: f64,
    /// `start` plus this row's individual value.
    pub end: f64,
    pub colour: String,
}

/// Derive waterfall segments from one value column: each row floats from the
/// running total to the running total plus its own value. Intermediate rows
/// are coloured by the sign of their individual value; the final row always
/// takes the total colour.
pub fn waterfall_segments(table: &Table, value_col: usize) -> Vec<WaterfallSegment> {
    let labels = table.category_labels();
    let values = table.numeric_column(value_col);
    let last = values.len().saturating_sub(1);

    let mut running = 0.0;
    let mut segments = Vec::with_capacity(values.len());
    for (i, (label, value)) in labels.into_iter().zip(values).enumerate() {
        let start = running;
        running += value;
        let colour = if i == last {
            WATERFALL_TOTAL
        } else if value < 0.0 {
            WATERFALL_NEGATIVE
        } else {
            WATERFALL_POSITIVE
        };
        segments.push(WaterfallSegment {
            label,
            start,
            end: running,
            colour: colour.to_string(),
        });
    }
    segments
}

// =============================================================================
// Gauge
// =============================================================================

/// A gauge rendered as a 180° arc: the filled share plus the neutral
/// remainder always sum to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeReading {
    pub value: f64,
    pub max: f64,
    /// `value / max * 100`, clamped to `[0, 100]`.
    pub percentage: f64,
    pub fill_colour: String,
    pub remainder_colour: String,
}

/// Read the gauge value from the first data row of the given column and
/// clamp it against `gauge_max`. A missing or non-positive maximum reads
/// as 100 so the gauge still degrades to something renderable.
pub fn gauge_reading(
    table: &Table,
    value_col: usize,
    gauge_max: Option<f64>,
    palette: &Palette,
) -> Option<GaugeReading> {
    let row = table.rows.first()?;
    let value = row.get(value_col)?.as_number();
    let max = match gauge_max {
        Some(m) if m > 0.0 => m,
        Some(m) => {
            warn!("Ignoring non-positive gaugeMax {}", m);
            100.0
        }
        None => 100.0,
    };
    let percentage = (value / max * 100.0).clamp(0.0, 100.0);
    Some(GaugeReading {
        value,
        max,
        percentage,
        fill_colour: palette.colour_at(0).to_string(),
        remainder_colour: GAUGE_REMAINDER.to_string(),
    })
}

// =============================================================================
// Heatmap
// =============================================================================

/// One coloured cell of a heat-map grid.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapCell {
    pub value: f64,
    pub colour: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapGrid {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `cells[row][col]`, matching `row_labels` × `col_labels`.
    pub cells: Vec<Vec<HeatmapCell>>,
}

/// How a heatmap request should actually be rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum HeatmapPlan {
    Grid(HeatmapGrid),
    /// The grid exceeds the legibility threshold; every backend renders it
    /// as a stacked-column chart instead. A degrade policy, not an error.
    FallbackStacked,
}

/// Build the heat-map colour grid: rows × non-category columns, each cell
/// linearly interpolated between the light and dark anchors over the global
/// min/max. A flat grid (`max == min`) maps every cell to ratio 0.
pub fn heatmap_plan(table: &Table, config: &CompilerConfig) -> HeatmapPlan {
    let n_rows = table.rows.len();
    let n_cols = table.headers.len().saturating_sub(1);
    if n_rows > config.heatmap_max_rows || n_cols > config.heatmap_max_cols {
        warn!(
            "Heatmap grid {}x{} exceeds {}x{}, falling back to stacked columns",
            n_rows, n_cols, config.heatmap_max_rows, config.heatmap_max_cols
        );
        return HeatmapPlan::FallbackStacked;
    }

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut values = Vec::with_capacity(n_rows);
    for (r, row) in table.rows.iter().enumerate() {
        let mut row_values = Vec::with_capacity(n_cols);
        for col in 1..=n_cols {
            let v = match row.get(col) {
                Some(Cell::Num(n)) => *n,
                // Missing or non-numeric cells read as 0 in a matrix context.
                _ => {
                    warn!(
                        "Heatmap cell at row {}, column '{}' is not numeric, reading as 0",
                        r,
                        table.headers.get(col).map(String::as_str).unwrap_or("")
                    );
                    0.0
                }
            };
            min = min.min(v);
            max = max.max(v);
            row_values.push(v);
        }
        values.push(row_values);
    }

    let span = max - min;
    let cells = values
        .into_iter()
        .map(|row_values| {
            row_values
                .into_iter()
                .map(|v| {
                    let ratio = if span > 0.0 { (v - min) / span } else { 0.0 };
                    HeatmapCell {
                        value: v,
                        colour: lerp_hex(HEATMAP_LIGHT, HEATMAP_DARK, ratio),
                    }
                })
                .collect()
        })
        .collect();

    HeatmapPlan::Grid(HeatmapGrid {
        row_labels: table.category_labels(),
        col_labels: table.headers.iter().skip(1).cloned().collect(),
        cells,
    })
}

/// Linear interpolation between two `#RRGGBB` colours.
pub fn lerp_hex(from: &str, to: &str, t: f64) -> String {
    let (fr, fg, fb) = parse_hex(from);
    let (tr, tg, tb) = parse_hex(to);
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    format!("#{:02X}{:02X}{:02X}", mix(fr, tr), mix(fg, tg), mix(fb, tb))
}

fn parse_hex(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    let byte = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|s| u8::from_str_radix(s, 16).ok())
            .unwrap_or(0)
    };
    (byte(0..2), byte(2..4), byte(4..6))
}

// =============================================================================
// Treemap
// =============================================================================

/// One leaf of a treemap. Sizes are the raw values; area packing is the
/// rendering backend's own layout concern.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapLeaf {
    pub label: String,
    pub size: f64,
    pub colour: String,
}

pub fn treemap_leaves(table: &Table, value_col: usize, palette: &Palette) -> Vec<TreemapLeaf> {
    let labels = table.category_labels();
    let sizes = table.numeric_column(value_col);
    labels
        .into_iter()
        .zip(sizes)
        .enumerate()
        .map(|(i, (label, size))| TreemapLeaf {
            label,
            size,
            colour: palette.colour_at(i).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    #[test]
    fn test_waterfall_cumulative_invariant() {
        let table = parse_table("step,delta\nOpen,100\nQ1,25\nQ2,-40\nClose,85\n").unwrap();
        let segments = waterfall_segments(&table, 1);
        assert_eq!(segments.len(), 4);

        // Cumulative total after all rows equals the sum of all values.
        let sum: f64 = table.numeric_column(1).iter().sum();
        assert_eq!(segments.last().unwrap().end, sum);
        // The final segment starts at the cumulative total before it.
        assert_eq!(segments[3].start, 100.0 + 25.0 - 40.0);

        assert_eq!(segments[0].colour, WATERFALL_POSITIVE);
        assert_eq!(segments[2].colour, WATERFALL_NEGATIVE);
        assert_eq!(segments[3].colour, WATERFALL_TOTAL);
    }

    #[test]
    fn test_waterfall_segment_chain() {
        let table = parse_table("step,delta\na,10\nb,5\nc,-3\n").unwrap();
        let segments = waterfall_segments(&table, 1);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 10.0);
        assert_eq!(segments[1].start, 10.0);
        assert_eq!(segments[1].end, 15.0);
        assert_eq!(segments[2].start, 15.0);
        assert_eq!(segments[2].end, 12.0);
    }

    #[test]
    fn test_gauge_clamps_both_ends() {
        let palette = Palette::general();
        let low = parse_table("label,score\nRisk,-10\n").unwrap();
        let reading = gauge_reading(&low, 1, Some(100.0), &palette).unwrap();
        assert_eq!(reading.percentage, 0.0);

        let high = parse_table("label,score\nRisk,150\n").unwrap();
        let reading = gauge_reading(&high, 1, Some(100.0), &palette).unwrap();
        assert_eq!(reading.percentage, 100.0);
    }

    #[test]
    fn test_gauge_defaults_missing_max() {
        let palette = Palette::general();
        let table = parse_table("label,score\nRisk,62\n").unwrap();
        let reading = gauge_reading(&table, 1, None, &palette).unwrap();
        assert_eq!(reading.max, 100.0);
        assert_eq!(reading.percentage, 62.0);

        let reading = gauge_reading(&table, 1, Some(-5.0), &palette).unwrap();
        assert_eq!(reading.max, 100.0);
    }

    #[test]
    fn test_heatmap_scale_endpoints() {
        let config = CompilerConfig::default();
        let table = parse_table("region,q1,q2\nNorth,0,50\nSouth,100,25\n").unwrap();
        let plan = heatmap_plan(&table, &config);
        let grid = match plan {
            HeatmapPlan::Grid(g) => g,
            _ => panic!("expected grid"),
        };
        assert_eq!(grid.col_labels, vec!["q1", "q2"]);
        assert_eq!(grid.cells[0][0].colour, HEATMAP_LIGHT.to_string());
        assert_eq!(grid.cells[1][0].colour, HEATMAP_DARK.to_string());
    }

    #[test]
    fn test_heatmap_degenerate_scale() {
        let config = CompilerConfig::default();
        let table = parse_table("region,q1,q2\nNorth,5,5\nSouth,5,5\n").unwrap();
        let plan = heatmap_plan(&table, &config);
        let grid = match plan {
            HeatmapPlan::Grid(g) => g,
            _ => panic!("expected grid"),
        };
        for row in &grid.cells {
            for cell in row {
                assert_eq!(cell.colour, HEATMAP_LIGHT.to_string());
            }
        }
    }

    #[test]
    fn test_heatmap_non_numeric_cell_reads_zero() {
        let config = CompilerConfig::default();
        let table = parse_table("region,q1,q2\nNorth,n/a,10\nSouth,5,10\n").unwrap();
        let grid = match heatmap_plan(&table, &config) {
            HeatmapPlan::Grid(g) => g,
            _ => panic!("expected grid"),
        };
        assert_eq!(grid.cells[0][0].value, 0.0);
        // The defaulted cell still participates in the colour scale.
        assert_eq!(grid.cells[0][0].colour, HEATMAP_LIGHT.to_string());
        assert_eq!(grid.cells[0][1].colour, HEATMAP_DARK.to_string());
    }

    #[test]
    fn test_heatmap_oversize_falls_back() {
        let config = CompilerConfig::default();
        let mut data = String::from("region,v\n");
        for i in 0..(config.heatmap_max_rows + 1) {
            data.push_str(&format!("r{},1\n", i));
        }
        let table = parse_table(&data).unwrap();
        assert_eq!(heatmap_plan(&table, &config), HeatmapPlan::FallbackStacked);

        let mut wide = String::from("region");
        for i in 0..(config.heatmap_max_cols + 1) {
            wide.push_str(&format!(",c{}", i));
        }
        wide.push_str("\nNorth");
        for _ in 0..(config.heatmap_max_cols + 1) {
            wide.push_str(",1");
        }
        wide.push('\n');
        let table = parse_table(&wide).unwrap();
        assert_eq!(heatmap_plan(&table, &config), HeatmapPlan::FallbackStacked);
    }

    #[test]
    fn test_lerp_hex() {
        assert_eq!(lerp_hex("#000000", "#FFFFFF", 0.0), "#000000");
        assert_eq!(lerp_hex("#000000", "#FFFFFF", 1.0), "#FFFFFF");
        assert_eq!(lerp_hex("#000000", "#FFFFFF", 0.5), "#808080");
    }

    #[test]
    fn test_treemap_leaves_keep_raw_sizes() {
        let palette = Palette::general();
        let table = parse_table("sector,weight\nTech,40\nEnergy,15\n").unwrap();
        let leaves = treemap_leaves(&table, 1, &palette);
        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0].size, 40.0);
        assert_eq!(leaves[1].label, "Energy");
        assert_eq!(leaves[0].colour, palette.colour_at(0));
        assert_eq!(leaves[1].colour, palette.colour_at(1));
    }
}
