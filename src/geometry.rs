//! Placement of the magnification panel on a page.

/// Offsets of the magnifiable panel, in percent of the page canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelRect {
    pub left_percent: f64,
    pub top_percent: f64,
}

/// Compute where the panel is anchored for an image centered on the page.
///
/// `image_width`/`image_height` must be the dimensions of the normalized
/// image. The formula assumes the normalizer centers the image on the
/// canvas; change both together.
pub fn panel_rect(
    page_width: u32,
    page_height: u32,
    image_width: u32,
    image_height: u32,
) -> PanelRect {
    PanelRect {
        left_percent: axis_offset(page_width, image_width),
        top_percent: axis_offset(page_height, image_height),
    }
}

fn axis_offset(page: u32, image: u32) -> f64 {
    if page == 0 {
        return 0.0;
    }
    let page = f64::from(page);
    let offset = (page / 2.0 - f64::from(image) / 2.0).floor();
    offset / page * 100.0
}

/// Format a percentage for inline CSS, trimming trailing zeros.
pub fn css_percent(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0%".to_string()
    } else {
        format!("{s}%")
    }
}
