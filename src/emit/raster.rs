//! Raster-Image Request Builder: sits downstream of the canvas emitter and
//! wraps its config into the stateless rasterization service's payload.
//! Animation and responsiveness are stripped (meaningless for a static
//! image), the print palette replaces the general one to match the
//! reference design, and the service's own tighter point ceiling is
//! enforced even when the upstream spec was already reduced.

use serde::Serialize;

use crate::emit::canvas::{emit_canvas_with, render_config_text};
use crate::spec::ChartSpec;
use crate::CompilerConfig;

/// Request parameters of the rasterization endpoint.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub device_pixel_ratio: f64,
}

impl Default for RasterOptions {
    fn default() -> Self {
        RasterOptions {
            width: 800,
            height: 450,
            background_color: "#FFFFFF".to_string(),
            device_pixel_ratio: 2.0,
        }
    }
}

/// The JSON body posted to the rasterization endpoint. `chart` is the canvas
/// config as text with the tick formatter already spliced in as function
/// source, since the service evaluates it as a script.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterPayload {
    pub chart: String,
    pub width: u32,
    pub height: u32,
    pub background_color: String,
    pub format: String,
    pub device_pixel_ratio: f64,
}

pub fn build_raster_request(
    spec: &ChartSpec,
    config: &CompilerConfig,
    options: &RasterOptions,
) -> Option<RasterPayload> {
    let mut chart = emit_canvas_with(spec, config, &config.print_palette, config.raster_max_points)?;
    chart.config.options.animation = false;
    chart.config.options.responsive = false;

    Some(RasterPayload {
        chart: render_config_text(&chart),
        width: options.width,
        height: options.height,
        background_color: options.background_color.clone(),
        format: "png".to_string(),
        device_pixel_ratio: options.device_pixel_ratio,
    })
}
