use log::warn;

use crate::spec::SeriesSpec;
use crate::table::Table;

/// Filter the requested series down to those whose `data_column` actually
/// exists in the parsed table. A series referencing a missing column is
/// dropped with a diagnostic, never silently re-pointed at a wrong column.
/// Order of the survivors is preserved, and the filter is idempotent.
pub fn filter_series(series: &[SeriesSpec], table: &Table) -> Vec<SeriesSpec> {
    series
        .iter()
        .filter(|s| {
            let present = table.column_index(&s.data_column).is_some();
            if !present {
                warn!(
                    "Dropping series '{}': column '{}' not present in chart data",
                    s.label, s.data_column
                );
            }
            present
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    fn series(label: &str, column: &str) -> SeriesSpec {
        SeriesSpec {
            label: label.to_string(),
            data_column: column.to_string(),
            colour: None,
        }
    }

    #[test]
    fn test_drops_missing_column() {
        let table = parse_table("month,fed,ecb\nJan,1,2\n").unwrap();
        let requested = vec![series("Fed", "fed"), series("BoE", "boe"), series("ECB", "ecb")];
        let valid = filter_series(&requested, &table);
        assert_eq!(valid.len(), 2);
        assert_eq!(valid[0].label, "Fed");
        assert_eq!(valid[1].label, "ECB");
    }

    #[test]
    fn test_idempotent() {
        let table = parse_table("month,fed\nJan,1\n").unwrap();
        let requested = vec![series("Fed", "fed"), series("BoE", "boe")];
        let once = filter_series(&requested, &table);
        let twice = filter_series(&once, &table);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_valid_spec_is_untouched() {
        let table = parse_table("month,fed,ecb\nJan,1,2\n").unwrap();
        let requested = vec![series("Fed", "fed"), series("ECB", "ecb")];
        assert_eq!(filter_series(&requested, &table), requested);
    }

    #[test]
    fn test_all_dropped_yields_empty() {
        let table = parse_table("month,fed\nJan,1\n").unwrap();
        let requested = vec![series("BoE", "boe")];
        assert!(filter_series(&requested, &table).is_empty());
    }
}
