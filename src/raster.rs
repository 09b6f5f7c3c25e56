//! Image DPI normalization
//!
//! Re-encodes a raster image as an RGB PNG whose `pHYs` chunk records the
//! target resolution. Pixels are not resampled; the overlay controls the
//! printed size through explicit placement boxes.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tempfile::{NamedTempFile, TempPath};

use crate::error::Result;

/// Resolution written when the caller does not ask for another one
pub const DEFAULT_DPI: u32 = 300;

const METRES_PER_INCH: f64 = 0.0254;

/// A re-encoded image living in its own temporary file.
///
/// The file is removed when this value is dropped.
#[derive(Debug)]
pub struct NormalizedImage {
    path: TempPath,
    pub width: u32,
    pub height: u32,
    pub dpi: u32,
}

impl NormalizedImage {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Pixels per metre for a given DPI, as stored in a PNG `pHYs` chunk
pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / METRES_PER_INCH).round() as u32
}

/// DPI recovered from a pixels-per-metre value
pub fn ppm_to_dpi(ppm: u32) -> u32 {
    (ppm as f64 * METRES_PER_INCH).round() as u32
}

/// Decode `path`, convert it to RGB and write it to a fresh temporary PNG tagged
/// with `target_dpi`.
///
/// Returns `None` when the image cannot be decoded or written; the failure is
/// logged.
pub fn normalize_image(path: &Path, target_dpi: u32) -> Option<NormalizedImage> {
    match try_normalize_image(path, target_dpi) {
        Ok(normalized) => {
            tracing::debug!(
                image = %path.display(),
                dpi = target_dpi,
                output = %normalized.path().display(),
                "image resolution adjusted"
            );
            Some(normalized)
        }
        Err(e) => {
            tracing::warn!(image = %path.display(), error = %e, "could not adjust image resolution");
            None
        }
    }
}

/// Fallible form of [`normalize_image`]
pub fn try_normalize_image(path: &Path, target_dpi: u32) -> Result<NormalizedImage> {
    let rgb = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgb8();
    let (width, height) = rgb.dimensions();

    let temp = tempfile::Builder::new()
        .prefix("journal-figure-")
        .suffix(".png")
        .tempfile()?;

    write_png_with_dpi(&temp, width, height, rgb.as_raw(), target_dpi)?;

    Ok(NormalizedImage {
        path: temp.into_temp_path(),
        width,
        height,
        dpi: target_dpi,
    })
}

fn write_png_with_dpi(
    file: &NamedTempFile,
    width: u32,
    height: u32,
    rgb: &[u8],
    dpi: u32,
) -> Result<()> {
    let out = BufWriter::new(file.reopen()?);
    let mut encoder = png::Encoder::new(out, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let ppm = dpi_to_ppm(dpi);
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: ppm,
        yppu: ppm,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header()?;
    writer.write_image_data(rgb)?;
    writer.finish()?;
    Ok(())
}

/// Read the resolution recorded in a PNG's `pHYs` chunk, if any
pub fn read_png_dpi(path: &Path) -> Result<Option<(u32, u32)>> {
    let decoder = png::Decoder::new(std::io::BufReader::new(File::open(path)?));
    let reader = decoder
        .read_info()
        .map_err(|e| crate::error::Error::General(format!("PNG decode error: {}", e)))?;

    Ok(reader.info().pixel_dims.and_then(|dims| match dims.unit {
        png::Unit::Meter => Some((ppm_to_dpi(dims.xppu), ppm_to_dpi(dims.yppu))),
        png::Unit::Unspecified => None,
    }))
}
