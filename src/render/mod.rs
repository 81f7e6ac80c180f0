//! Chart rendering
//!
//! Charts are composed as SVG documents ([`svg`]) and rasterized to PNG with
//! resvg. Text uses whatever system fonts fontdb finds; labels are dropped
//! silently on a machine without fonts.

pub mod charts;
pub mod svg;

pub use charts::{
    plot_annual_anomalies, plot_annual_series, plot_monthly_anomalies, plot_monthly_climatology,
    plot_return_levels, plot_wind_rose, ChartContext,
};

use crate::constants::{COLORS, FALLBACK_PALETTE};
use crate::errors::{CmipVisError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Chart color for an experiment. Unknown experiments take the
/// `index`-th fallback color, cycling.
pub fn color_for(experiment: &str, index: usize) -> &'static str {
    COLORS
        .iter()
        .find(|(name, _)| *name == experiment)
        .map(|(_, color)| *color)
        .unwrap_or_else(|| FALLBACK_PALETTE[index % FALLBACK_PALETTE.len()])
}

/// Rasterizes an SVG document and writes it as PNG, creating parent directories.
pub fn write_png(svg: &str, path: &Path) -> Result<()> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| CmipVisError::RenderError(format!("invalid chart SVG: {e}")))?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        CmipVisError::RenderError(format!(
            "cannot allocate {}x{} canvas",
            size.width(),
            size.height()
        ))
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);
    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    let png = pixmap
        .encode_png()
        .map_err(|e| CmipVisError::RenderError(format!("PNG encoding failed: {e}")))?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, png)?;
    debug!(path = %path.display(), "Wrote chart");
    Ok(())
}
