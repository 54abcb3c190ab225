use crate::spec::SeriesSpec;

/// Fixed colours used by the derived transforms.
pub const WATERFALL_POSITIVE: &str = "#2E7D32";
pub const WATERFALL_NEGATIVE: &str = "#C62828";
pub const WATERFALL_TOTAL: &str = "#1F4E79";
/// Neutral gray filling the unused remainder of a gauge arc.
pub const GAUGE_REMAINDER: &str = "#D9D9D9";
/// Anchor colours of the heat-map linear scale.
pub const HEATMAP_LIGHT: &str = "#DEEBF7";
pub const HEATMAP_DARK: &str = "#1F4E79";

/// An ordered brand palette. Colour assignment is a pure function of index,
/// so the same series order always yields the same colours.
#[derive(Debug, Clone)]
pub struct Palette(Vec<String>);

impl Palette {
    pub fn new<S: Into<String>>(colours: Vec<S>) -> Palette {
        Palette(colours.into_iter().map(Into::into).collect())
    }

    /// The 7-entry palette used for general data series.
    pub fn general() -> Palette {
        Palette::new(vec![
            "#1F4E79", "#C55A11", "#2E7D32", "#7030A0", "#2E9BC6", "#BF9000", "#C62828",
        ])
    }

    /// The 6-entry palette matched to the print/raster reference design.
    pub fn print() -> Palette {
        Palette::new(vec![
            "#1B365D", "#B85C1E", "#3A6B35", "#6B3FA0", "#2F7E9E", "#9E7C1B",
        ])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Palette entry for index `i`, wrapping modulo the palette length.
    pub fn colour_at(&self, i: usize) -> &str {
        &self.0[i % self.0.len()]
    }

    /// Colour for the series at index `i`: its explicit colour when set,
    /// otherwise the palette entry at that index.
    pub fn colour_for(&self, series: &SeriesSpec, i: usize) -> String {
        series
            .colour
            .clone()
            .unwrap_or_else(|| self.colour_at(i).to_string())
    }

    /// One colour per row, for the kinds that colour slices/leaves/cells
    /// rather than whole series.
    pub fn row_colours(&self, row_count: usize) -> Vec<String> {
        (0..row_count).map(|i| self.colour_at(i).to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(colour: Option<&str>) -> SeriesSpec {
        SeriesSpec {
            label: "s".to_string(),
            data_column: "v".to_string(),
            colour: colour.map(String::from),
        }
    }

    #[test]
    fn test_palette_sizes() {
        assert_eq!(Palette::general().len(), 7);
        assert_eq!(Palette::print().len(), 6);
    }

    #[test]
    fn test_modulo_assignment_over_two_cycles() {
        let palette = Palette::general();
        let spec = series(None);
        for i in 0..(palette.len() * 2) {
            assert_eq!(
                palette.colour_for(&spec, i),
                palette.colour_at(i % palette.len())
            );
        }
    }

    #[test]
    fn test_explicit_colour_wins() {
        let palette = Palette::general();
        assert_eq!(palette.colour_for(&series(Some("#ABCDEF")), 3), "#ABCDEF");
    }

    #[test]
    fn test_row_colours_wrap() {
        let palette = Palette::print();
        let colours = palette.row_colours(8);
        assert_eq!(colours.len(), 8);
        assert_eq!(colours[0], colours[6]);
        assert_eq!(colours[1], colours[7]);
    }
}
