//! Backend emitters. Each one consumes the shared spec/transform stages and
//! produces its backend's native configuration shape; only the final
//! serialization shape varies per backend.

pub mod canvas;
pub mod component;
pub mod presentation;
pub mod raster;

use crate::downsample::downsample;
use crate::spec::{ChartKind, ChartSpec, SeriesSpec};
use crate::table::Table;
use crate::validate::filter_series;

/// Validate the requested series and apply the "no chart" rule: kinds that
/// read configured series compile to nothing when no series survives. Kinds
/// that derive their own columns (pie, donut, treemap, heatmap) keep going
/// with an empty list. A gauge sits between the two: its positional fallback
/// applies only when no series was configured at all, so configured series
/// that were all dropped still mean no chart.
pub(crate) fn usable_series(spec: &ChartSpec) -> Option<Vec<SeriesSpec>> {
    let valid = filter_series(&spec.series, &spec.table);
    if valid.is_empty() && !spec.kind.derives_own_columns() {
        return None;
    }
    if spec.kind == ChartKind::Gauge && valid.is_empty() && !spec.series.is_empty() {
        return None;
    }
    Some(valid)
}

/// Apply the backend's point ceiling to the spec's rows, for the kinds that
/// downsample. Derived rows only; the source spec is untouched.
pub(crate) fn downsampled_table(spec: &ChartSpec, ceiling: usize) -> Table {
    if spec.kind.downsamples() && spec.table.rows.len() > ceiling {
        spec.table.with_rows(downsample(&spec.table.rows, ceiling))
    } else {
        spec.table.clone()
    }
}

/// One synthetic series per non-category column. Used when a heatmap
/// degrades to stacked columns: the grid's columns become the series.
pub(crate) fn synthesized_column_series(table: &Table) -> Vec<SeriesSpec> {
    table
        .headers
        .iter()
        .skip(1)
        .map(|h| SeriesSpec {
            label: h.clone(),
            data_column: h.clone(),
            colour: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{ChartKind, ChartSpec, ValueFormat};
    use crate::table::parse_table;

    fn spec_with(kind: ChartKind, data: &str, series: Vec<SeriesSpec>) -> ChartSpec {
        ChartSpec {
            kind,
            table: parse_table(data).unwrap(),
            series,
            x_axis_label: None,
            y_axis_label: None,
            value_format: ValueFormat::Number,
            gauge_max: None,
            value_column: None,
        }
    }

    #[test]
    fn test_no_valid_series_is_no_chart_for_series_kinds() {
        let series = vec![SeriesSpec {
            label: "Missing".to_string(),
            data_column: "nope".to_string(),
            colour: None,
        }];
        let spec = spec_with(ChartKind::Line, "m,v\nJan,1\n", series.clone());
        assert!(usable_series(&spec).is_none());

        // Derived-column kinds survive the same situation.
        let spec = spec_with(ChartKind::Pie, "m,v\nJan,1\n", series);
        assert_eq!(usable_series(&spec), Some(vec![]));
    }

    #[test]
    fn test_gauge_fallback_only_without_configured_series() {
        // No series configured: the gauge reads its positional column.
        let spec = spec_with(ChartKind::Gauge, "label,score\nRisk,62\n", vec![]);
        assert_eq!(usable_series(&spec), Some(vec![]));

        // A configured series that the validator dropped is not the same
        // situation: the author asked for a column that does not exist.
        let ghost = vec![SeriesSpec {
            label: "Score".to_string(),
            data_column: "ghost".to_string(),
            colour: None,
        }];
        let spec = spec_with(ChartKind::Gauge, "label,score\nRisk,62\n", ghost);
        assert!(usable_series(&spec).is_none());
    }

    #[test]
    fn test_downsampled_table_respects_kind() {
        let mut data = String::from("x,v\n");
        for i in 0..30 {
            data.push_str(&format!("{},{}\n", i, i));
        }
        let line = spec_with(ChartKind::Line, &data, vec![]);
        assert!(downsampled_table(&line, 10).rows.len() <= 11);

        // Pie keeps every slice regardless of the ceiling.
        let pie = spec_with(ChartKind::Pie, &data, vec![]);
        assert_eq!(downsampled_table(&pie, 10).rows.len(), 30);
    }

    #[test]
    fn test_synthesized_series_cover_value_columns() {
        let table = parse_table("region,q1,q2,q3\nNorth,1,2,3\n").unwrap();
        let series = synthesized_column_series(&table);
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].label, "q1");
        assert_eq!(series[2].data_column, "q3");
    }
}
