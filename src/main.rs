use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use chartforge::emit::canvas::{emit_canvas, render_embed_script};
use chartforge::emit::component::emit_component;
use chartforge::emit::presentation::emit_presentation;
use chartforge::emit::raster::{build_raster_request, RasterOptions};
use chartforge::spec::{ChartSpec, Section};
use chartforge::CompilerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    Canvas,
    Component,
    Presentation,
    Raster,
}

#[derive(Parser, Debug)]
#[command(name = "chartforge")]
#[command(about = "Compile a CMS chart section into a rendering backend's native config", long_about = None)]
struct Args {
    /// Which rendering backend to emit for
    #[arg(long, value_enum, default_value_t = Backend::Canvas)]
    backend: Backend,

    /// Section JSON file (reads stdin when omitted)
    #[arg(long)]
    section: Option<PathBuf>,

    /// For the canvas backend: print the embeddable script for this element
    /// id instead of the config JSON
    #[arg(long)]
    element_id: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let raw = match &args.section {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read section file {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read section JSON from stdin")?;
            buf
        }
    };

    let section: Section = serde_json::from_str(&raw).context("Section JSON is malformed")?;
    let config = CompilerConfig::default();

    let spec = match ChartSpec::from_section(&section).context("Failed to build chart spec")? {
        Some(spec) => spec,
        None => {
            println!("null");
            return Ok(());
        }
    };

    let output = match args.backend {
        Backend::Canvas => match emit_canvas(&spec, &config) {
            Some(chart) => {
                if let Some(element_id) = &args.element_id {
                    println!("{}", render_embed_script(&chart, element_id));
                    return Ok(());
                }
                serde_json::to_value(&chart.config)?
            }
            None => serde_json::Value::Null,
        },
        Backend::Component => emit_component(&spec, &config)
            .map(|props| serde_json::to_value(&props))
            .transpose()?
            .unwrap_or(serde_json::Value::Null),
        Backend::Presentation => emit_presentation(&spec, &config)
            .map(|plan| serde_json::to_value(&plan))
            .transpose()?
            .unwrap_or(serde_json::Value::Null),
        Backend::Raster => build_raster_request(&spec, &config, &RasterOptions::default())
            .map(|payload| serde_json::to_value(&payload))
            .transpose()?
            .unwrap_or(serde_json::Value::Null),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
