//! Sequential raster batch runner. Rendering every chart of a document is
//! deliberately one-in-flight to bound memory and connection usage; one bad
//! chart is logged and replaced by a placeholder outcome so the rest of the
//! batch still renders. Retries, timeouts and cancellation belong to the
//! caller and its network client, not here.

use anyhow::Result;
use image::ImageFormat;
use log::{debug, warn};

use crate::emit::raster::{build_raster_request, RasterOptions, RasterPayload};
use crate::spec::{ChartSpec, Section};
use crate::CompilerConfig;

/// The external rasterization endpoint. The surrounding system supplies the
/// actual network client; the compiler only builds payloads and checks
/// responses.
pub trait RasterService {
    fn rasterize(&self, payload: &RasterPayload) -> Result<Vec<u8>>;
}

/// Per-chart result of a batch render.
#[derive(Debug)]
pub enum BatchOutcome {
    /// A PNG ready for the caller to re-encode and embed.
    Rendered { index: usize, png: Vec<u8> },
    /// The section compiled to "no chart"; nothing to place.
    Skipped { index: usize },
    /// Build or render failed; the document layer should place an explicit
    /// placeholder for this chart.
    Failed { index: usize, reason: String },
}

/// Render a document's charts strictly one at a time.
pub fn render_batch<S: RasterService>(
    service: &S,
    sections: &[Section],
    config: &CompilerConfig,
    options: &RasterOptions,
) -> Vec<BatchOutcome> {
    sections
        .iter()
        .enumerate()
        .map(|(index, section)| match render_one(service, section, config, options) {
            Ok(Some(png)) => {
                debug!("Rendered chart {} ({} bytes)", index, png.len());
                BatchOutcome::Rendered { index, png }
            }
            Ok(None) => BatchOutcome::Skipped { index },
            Err(err) => {
                warn!("Chart {} failed to render, skipping: {:#}", index, err);
                BatchOutcome::Failed {
                    index,
                    reason: format!("{:#}", err),
                }
            }
        })
        .collect()
}

fn render_one<S: RasterService>(
    service: &S,
    section: &Section,
    config: &CompilerConfig,
    options: &RasterOptions,
) -> Result<Option<Vec<u8>>> {
    let spec = match ChartSpec::from_section(section)? {
        Some(spec) => spec,
        None => return Ok(None),
    };
    let payload = match build_raster_request(&spec, config, options) {
        Some(payload) => payload,
        None => return Ok(None),
    };

    let bytes = service.rasterize(&payload)?;
    if image::guess_format(&bytes).ok() != Some(ImageFormat::Png) {
        anyhow::bail!("rasterization service returned non-PNG content");
    }
    Ok(Some(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SeriesSpec;
    use std::cell::RefCell;

    const PNG_MAGIC: &[u8] = &[137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 0];

    /// Scripted service: one canned response per call, recording payloads.
    struct StubService {
        responses: RefCell<Vec<Result<Vec<u8>>>>,
        calls: RefCell<usize>,
    }

    impl StubService {
        fn new(responses: Vec<Result<Vec<u8>>>) -> Self {
            StubService {
                responses: RefCell::new(responses),
                calls: RefCell::new(0),
            }
        }
    }

    impl RasterService for StubService {
        fn rasterize(&self, _payload: &RasterPayload) -> Result<Vec<u8>> {
            *self.calls.borrow_mut() += 1;
            self.responses.borrow_mut().remove(0)
        }
    }

    fn line_section() -> Section {
        Section {
            chart_type: Some("line".to_string()),
            chart_data: Some("x,v\n1,10\n2,20\n".to_string()),
            chart_series: vec![SeriesSpec {
                label: "V".to_string(),
                data_column: "v".to_string(),
                colour: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_failure_does_not_abort_batch() {
        let service = StubService::new(vec![
            Ok(PNG_MAGIC.to_vec()),
            Err(anyhow::anyhow!("connection reset")),
            Ok(PNG_MAGIC.to_vec()),
        ]);
        let sections = vec![line_section(), line_section(), line_section()];
        let outcomes = render_batch(
            &service,
            &sections,
            &CompilerConfig::default(),
            &RasterOptions::default(),
        );

        assert_eq!(outcomes.len(), 3);
        assert!(matches!(outcomes[0], BatchOutcome::Rendered { .. }));
        assert!(matches!(outcomes[1], BatchOutcome::Failed { .. }));
        assert!(matches!(outcomes[2], BatchOutcome::Rendered { index: 2, .. }));
        assert_eq!(*service.calls.borrow(), 3);
    }

    #[test]
    fn test_non_png_response_is_failure() {
        let service = StubService::new(vec![Ok(b"<html>502 Bad Gateway</html>".to_vec())]);
        let outcomes = render_batch(
            &service,
            &[line_section()],
            &CompilerConfig::default(),
            &RasterOptions::default(),
        );
        match &outcomes[0] {
            BatchOutcome::Failed { reason, .. } => assert!(reason.contains("non-PNG")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_section_skipped_without_service_call() {
        let service = StubService::new(vec![]);
        let empty = Section::default();
        let outcomes = render_batch(
            &service,
            &[empty],
            &CompilerConfig::default(),
            &RasterOptions::default(),
        );
        assert!(matches!(outcomes[0], BatchOutcome::Skipped { index: 0 }));
        assert_eq!(*service.calls.borrow(), 0);
    }
}
