//! Image capability used by the normalizer and the cover composer.

use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::{Error, Result};

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Decode/resize operations the pipeline needs from an image library.
pub trait ImageBackend: Send + Sync {
    /// Intrinsic dimensions of the image at `path`.
    fn dimensions(&self, path: &Path) -> Result<Dimensions>;

    /// Fit the image at `path` inside `width`x`height`, keeping its aspect
    /// ratio, center it on an opaque `background` canvas of exactly that
    /// size and overwrite `path` with the result.
    fn resize_and_pad(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        background: [u8; 3],
    ) -> Result<Dimensions>;
}

/// [`ImageBackend`] built on the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RasterBackend {
    fn dimensions(&self, path: &Path) -> Result<Dimensions> {
        let (width, height) = image::image_dimensions(path).map_err(|e| Error::image(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize_and_pad(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        background: [u8; 3],
    ) -> Result<Dimensions> {
        let source = image::open(path).map_err(|e| Error::image(path, e))?;
        let canvas = letterbox(&source, width, height, background);

        let format = ImageFormat::from_path(path).map_err(|e| Error::image(path, e))?;
        let staged = staging_path(path);
        DynamicImage::ImageRgba8(canvas)
            .to_rgb8()
            .save_with_format(&staged, format)
            .map_err(|e| {
                let _ = fs::remove_file(&staged);
                Error::image(path, e)
            })?;
        fs::rename(&staged, path)
            .map_err(|e| Error::environment(format!("cannot replace {}", path.display()), e))?;

        Ok(Dimensions { width, height })
    }
}

/// Scale `source` to fit and center it on a `width`x`height` canvas.
pub(crate) fn letterbox(
    source: &DynamicImage,
    width: u32,
    height: u32,
    background: [u8; 3],
) -> RgbaImage {
    let fitted = source.resize(width, height, FilterType::Lanczos3).to_rgba8();
    let [r, g, b] = background;
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
    let x = (i64::from(width) - i64::from(fitted.width())) / 2;
    let y = (i64::from(height) - i64::from(fitted.height())) / 2;
    imageops::overlay(&mut canvas, &fitted, x, y);
    canvas
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
