//! One XHTML document per page.

use std::path::PathBuf;

use super::{escape_xml, href_encode, padded_index};
use crate::geometry::{css_percent, panel_rect};
use crate::imaging::PageImage;
use crate::options::BuildOptions;

pub const STYLESHEET_FILE: &str = "style.css";

/// Shared stylesheet referenced by every page.
pub const STYLESHEET: &str = r#"@page { margin: 0; }
html, body { margin: 0; padding: 0; }
body {
  background-position: center center;
  background-repeat: no-repeat;
  background-size: contain;
}
#PV { position: absolute; top: 0; left: 0; width: 100%; height: 100%; }
#PV div { position: absolute; }
#PV a.app-amzn-magnify { display: block; width: 100%; height: 100%; }
.PV-P { display: none; position: absolute; z-index: 2; }
.PV-P img { position: absolute; top: 0; left: 0; }
"#;

/// A generated page document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDocument {
    /// 1-based position in reading order.
    pub index: usize,
    /// Archive path, e.g. `00001.xhtml`.
    pub file_name: String,
    /// Where the document was written in the workspace.
    pub path: PathBuf,
}

impl PageDocument {
    pub fn id(&self) -> String {
        page_id(self.index)
    }
}

/// File name of the page at 1-based `index`.
pub fn page_file_name(index: usize) -> String {
    format!("{}.xhtml", padded_index(index))
}

/// Manifest id of the page at 1-based `index`.
pub fn page_id(index: usize) -> String {
    format!("page_{}", padded_index(index))
}

/// Render the XHTML for the page at 1-based `index`.
pub fn page_xhtml(index: usize, image: &PageImage, title: &str, options: &BuildOptions) -> String {
    let (width, height) = (options.page_width, options.page_height);
    let image_url = href_encode(&image.href());

    let mut html = String::new();
    html.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
"#,
    );
    html.push_str(&format!("  <title>{}</title>\n", escape_xml(title)));
    html.push_str(&format!(
        "  <link href=\"{}\" type=\"text/css\" rel=\"stylesheet\"/>\n",
        STYLESHEET_FILE
    ));
    html.push_str(&format!(
        "  <meta name=\"viewport\" content=\"width={width}, height={height}\"/>\n"
    ));
    html.push_str(&format!(
        "  <style type=\"text/css\">\
         html, body {{ width: {width}px; height: {height}px; }}</style>\n"
    ));
    html.push_str("</head>\n");
    html.push_str(&format!(
        "<body style=\"background-image: url('{}')\">\n",
        escape_xml(&image_url)
    ));

    if options.region_magnification {
        html.push_str(&panel_view(index, image, &image_url, options));
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Tap region plus the magnified panel it targets.
fn panel_view(index: usize, image: &PageImage, image_url: &str, options: &BuildOptions) -> String {
    let rect = panel_rect(
        options.page_width,
        options.page_height,
        image.normalized.width,
        image.normalized.height,
    );
    let left = css_percent(rect.left_percent);
    let top = css_percent(rect.top_percent);
    let region_width = css_percent(extent_percent(image.normalized.width, options.page_width));
    let region_height = css_percent(extent_percent(image.normalized.height, options.page_height));

    let region_id = format!("PV-{}", padded_index(index));
    let target_id = format!("{region_id}-P");
    let magnify = format!("{{\"targetId\":\"{target_id}\",\"ordinal\":1}}");

    let mut html = String::new();
    html.push_str("  <div id=\"PV\">\n");
    html.push_str(&format!(
        "    <div id=\"{region_id}\" style=\"left: {left}; top: {top}; \
         width: {region_width}; height: {region_height};\">\n"
    ));
    html.push_str(&format!(
        "      <a class=\"app-amzn-magnify\" data-app-amzn-magnify=\"{}\"></a>\n",
        escape_xml(&magnify)
    ));
    html.push_str("    </div>\n  </div>\n");
    html.push_str(&format!(
        "  <div class=\"PV-P\" id=\"{target_id}\" style=\"left: {left}; top: {top};\">\n"
    ));
    html.push_str(&format!(
        "    <img src=\"{}\" width=\"{}\" height=\"{}\" alt=\"\"/>\n",
        escape_xml(image_url),
        image.normalized.width,
        image.normalized.height
    ));
    html.push_str("  </div>\n");
    html
}

fn extent_percent(image: u32, page: u32) -> f64 {
    if page == 0 {
        0.0
    } else {
        f64::from(image) / f64::from(page) * 100.0
    }
}
