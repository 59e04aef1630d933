//! PNG snapshot export pipeline.
//!
//! Control flow for one invocation: sweep stale artifacts, locate the
//! capture target, snapshot the semantic colors, expand layout, build the
//! composition and override sheet, reparent the target, rasterize (the only
//! await point), then restore the live tree unconditionally and emit the
//! file download only after rasterization fully succeeded.
//!
//! The pipeline is not reentrant: wrapper and stylesheet ids are global, so
//! at most one invocation may be in flight. A second concurrent call is a
//! caller error; the startup sweep makes sequential re-invocation safe even
//! after an unhandled failure.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

pub mod capture;
pub mod compose;

pub use capture::{sweep_stale_artifacts, CaptureSession};
pub use compose::{snapshot_colors, SemanticColorSet, DEFAULT_EXPORT_TITLE};

use crate::error::{Error, Result};
use crate::panel::Document;
use crate::rendering::layout::build_scene;
use crate::rendering::raster::{RasterOptions, Rasterizer};
use crate::TimelineConfig;

/// Well-known id of the capture target in the live tree
pub const CAPTURE_TARGET_ID: &str = "timeline-capture";
/// Id of the transient export wrapper
pub const WRAPPER_ID: &str = "png-export-wrapper";
/// Id of the transient override stylesheet
pub const OVERRIDE_STYLE_ID: &str = "png-export-light-theme";
/// Download filename prefix; the full name is `<prefix>-YYYY-MM-DD.png`
pub const FILENAME_PREFIX: &str = "redteam-timeline";
/// Capture density multiplier for sharpness
pub const EXPORT_PIXEL_RATIO: f32 = 2.0;

/// Caller-tunable knobs for one export invocation
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory the download lands in
    pub out_dir: PathBuf,
    /// Filename date stamp; `None` means today
    pub date: Option<NaiveDate>,
    pub pixel_ratio: f32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            out_dir: PathBuf::from("."),
            date: None,
            pixel_ratio: EXPORT_PIXEL_RATIO,
        }
    }
}

/// `redteam-timeline-YYYY-MM-DD.png`
pub fn png_filename(date: NaiveDate) -> String {
    format!("{}-{}.png", FILENAME_PREFIX, date.format("%Y-%m-%d"))
}

/// Run the full snapshot pipeline against the live document and write the
/// PNG download. The live tree is returned to its exact pre-call state on
/// every path out of this function.
pub async fn export_to_png(
    doc: &mut Document,
    config: Option<&TimelineConfig>,
    rasterizer: &dyn Rasterizer,
    opts: &ExportOptions,
) -> Result<PathBuf> {
    sweep_stale_artifacts(doc);

    let target = doc
        .by_id(CAPTURE_TARGET_ID)
        .ok_or_else(|| Error::TargetNotFound(CAPTURE_TARGET_ID.to_string()))?;
    let colors = snapshot_colors(doc);

    let mut session = CaptureSession::begin(doc, target);
    let result = match session.compose(config, &colors) {
        Ok(wrapper) => {
            // Building the scene doubles as the forced layout pass: every
            // box is resolved before the rasterizer sees the wrapper.
            let scene = build_scene(session.doc(), wrapper);
            let raster_opts = RasterOptions {
                pixel_ratio: opts.pixel_ratio,
                ..Default::default()
            };
            rasterizer.rasterize(scene, raster_opts).await
        }
        Err(e) => Err(e),
    };
    // Unconditional: runs whether rasterization succeeded, failed or the
    // compose step never got off the ground.
    session.finish();

    let screenshot = result?;
    let date = opts.date.unwrap_or_else(|| chrono::Local::now().date_naive());
    let path = opts.out_dir.join(png_filename(date));
    write_download(&path, &screenshot.png_data)?;
    info!(
        "exported timeline snapshot to {} ({}x{})",
        path.display(),
        screenshot.width,
        screenshot.height
    );
    Ok(path)
}

fn write_download(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes)?;
    Ok(())
}
