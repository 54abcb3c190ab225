// Library exports for chartforge

pub mod batch;
pub mod downsample;
pub mod emit;
pub mod palette;
pub mod spec;
pub mod table;
pub mod transform;
pub mod validate;

use palette::Palette;

/// Injectable compiler configuration: the brand palettes and the per-backend
/// point and grid ceilings. Everything here is part of the output contract,
/// so tests substitute deterministic fixtures and callers override branding
/// without touching any transform logic.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// 7-entry palette for general data series.
    pub general_palette: Palette,
    /// 6-entry palette matched to the print/raster reference design.
    pub print_palette: Palette,
    /// Point ceiling for the interactive web canvas view.
    pub canvas_max_points: usize,
    /// Point ceiling for native presentation charts. Dense native charts are
    /// unusable in slide software and balloon file sizes.
    pub presentation_max_points: usize,
    /// Point ceiling imposed by the external rasterization service's
    /// payload limits.
    pub raster_max_points: usize,
    /// Heat-map grids larger than this fall back to stacked columns.
    pub heatmap_max_rows: usize,
    pub heatmap_max_cols: usize,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            general_palette: Palette::general(),
            print_palette: Palette::print(),
            canvas_max_points: 500,
            presentation_max_points: 100,
            raster_max_points: 100,
            heatmap_max_rows: 20,
            heatmap_max_cols: 15,
        }
    }
}
