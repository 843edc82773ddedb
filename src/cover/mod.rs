//! Cover image composition.
//!
//! The cover is the first normalized page at its own size, optionally with
//! the book title drawn over it. The title is laid out as SVG (see
//! [`title_overlay`]), rasterized with `resvg` and alpha-composited onto
//! the page.

mod shaper;
mod title;

use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use resvg::{tiny_skia, usvg};

pub use shaper::{FontShaper, TextMetrics, TextShaper, TextStyle, VerticalAnchor};
pub use title::{
    BOX_FILL, BOX_PADDING, TEXT_FILL, TITLE_FONT_SIZE, TITLE_MARGIN, TitleLayout, TitleLine,
    layout_title, title_overlay,
};

use crate::error::{Error, Result};
use crate::imaging::Dimensions;

/// Archive path of the cover image.
pub const COVER_FILE: &str = "cover.jpg";

/// Compose the cover from `first_page` and write it as JPEG to `output`.
///
/// `overlay` builds the SVG fragment for a cover of the given size; it is
/// only called for a non-blank `title`.
pub fn compose_cover<F>(
    first_page: &Path,
    title: &str,
    output: &Path,
    overlay: F,
) -> Result<Dimensions>
where
    F: FnOnce(&str, u32, u32) -> Result<String>,
{
    let page = image::open(first_page).map_err(|e| Error::image(first_page, e))?;
    let (width, height) = (page.width(), page.height());
    let mut canvas = page.to_rgba8();

    if !title.trim().is_empty() {
        let fragment = overlay(title.trim(), width, height)?;
        let layer = rasterize(&fragment, width, height)?;
        imageops::overlay(&mut canvas, &layer, 0, 0);
    }

    DynamicImage::ImageRgba8(canvas)
        .to_rgb8()
        .save_with_format(output, ImageFormat::Jpeg)
        .map_err(|e| Error::Render(format!("cannot encode cover {}: {e}", output.display())))?;

    log::debug!("cover written to {} ({width}x{height})", output.display());
    Ok(Dimensions { width, height })
}

/// Render an SVG fragment onto a transparent `width`x`height` layer.
pub fn rasterize(fragment: &str, width: u32, height: u32) -> Result<RgbaImage> {
    let document = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
         viewBox=\"0 0 {width} {height}\">{fragment}</svg>"
    );
    let tree = usvg::Tree::from_str(&document, &usvg::Options::default())
        .map_err(|e| Error::Render(format!("invalid title overlay: {e}")))?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("cannot allocate {width}x{height} overlay")))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let mut layer = RgbaImage::new(width, height);
    for (dst, src) in layer.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn page(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("001.png");
        RgbImage::from_pixel(200, 300, Rgb([200, 40, 40])).save(&path).unwrap();
        path
    }

    #[test]
    fn test_rasterize_draws_rect() {
        let square = "<rect x=\"10\" y=\"10\" width=\"20\" height=\"20\" fill=\"#000000\"/>";
        let layer = rasterize(square, 50, 50).unwrap();
        assert_eq!(layer.get_pixel(20, 20).0, [0, 0, 0, 255]);
        assert_eq!(layer.get_pixel(45, 45).0[3], 0);
    }

    #[test]
    fn test_rasterize_rejects_broken_markup() {
        assert!(matches!(rasterize("<rect", 10, 10), Err(Error::Render(_))));
    }

    #[test]
    fn test_cover_without_title_keeps_page_size() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(COVER_FILE);
        let dims = compose_cover(&page(dir.path()), "", &out, |_, _, _| {
            panic!("overlay must not be built for an empty title")
        })
        .unwrap();
        assert_eq!(dims, Dimensions { width: 200, height: 300 });
        assert_eq!(image::open(&out).unwrap().dimensions(), (200, 300));
    }

    #[test]
    fn test_cover_title_overlay_is_composited() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(COVER_FILE);
        compose_cover(&page(dir.path()), "Title", &out, |title, w, h| {
            assert_eq!((title, w, h), ("Title", 200, 300));
            Ok("<rect x=\"0\" y=\"100\" width=\"200\" height=\"100\" fill=\"#000000\"/>".into())
        })
        .unwrap();

        let cover = image::open(&out).unwrap().to_rgb8();
        let covered = cover.get_pixel(100, 150).0;
        let bare = cover.get_pixel(100, 20).0;
        assert!(covered.iter().all(|&c| c < 30), "{covered:?}");
        assert!(bare[0] > 150, "{bare:?}");
    }

    #[test]
    fn test_installed_font_overlay_draws_text_and_bands() {
        let title = "Real Title";
        let shaper = match FontShaper::system_for(title) {
            Ok(shaper) => shaper,
            Err(e) => {
                eprintln!("skipping: {e}");
                return;
            }
        };

        let fragment = title_overlay(title, 400, 600, &shaper).unwrap();
        let layer = rasterize(&fragment, 400, 600).unwrap();
        assert!(layer.pixels().any(|p| p.0 == [0, 0, 0, 255]), "no backing band");
        assert!(
            layer.pixels().any(|p| p.0[3] == 255 && p.0[0] > 200),
            "no glyph pixels"
        );
        assert!(layer.pixels().any(|p| p.0[3] == 0), "overlay covers the whole page");
    }

    #[test]
    fn test_cover_overlay_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(COVER_FILE);
        let err = compose_cover(&page(dir.path()), "Title", &out, |_, _, _| {
            Err(Error::Render("no font".into()))
        })
        .unwrap_err();
        assert!(matches!(err, Error::Render(_)));
    }
}
