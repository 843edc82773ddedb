//! Generated EPUB documents.
//!
//! Every user-supplied string (title, author, language) passes through
//! [`escape_xml`] before it is placed in a document.

mod container;
mod nav;
mod package;
mod page;

use std::borrow::Cow;
use std::path::Path;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

pub use container::{CONTAINER_FILE, container_xml};
pub use nav::{NAV_FILE, NCX_FILE, nav_xhtml, toc_ncx};
pub use package::{PACKAGE_FILE, PackageInput, content_opf, manifest_entries};
pub use page::{PageDocument, STYLESHEET, STYLESHEET_FILE, page_file_name, page_id, page_xhtml};

/// A manifest `<item>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub id: String,
    pub href: String,
    pub media_type: String,
    pub properties: Option<String>,
}

impl ManifestEntry {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }
}

/// Escape XML special characters.
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Characters escaped when an archive path is used as a URL.
const HREF_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode an archive path for use in `href`/`src`/`url()`.
pub fn href_encode(path: &str) -> String {
    utf8_percent_encode(path, HREF_ESCAPES).to_string()
}

/// Zero-padded 1-based page number, e.g. `00001`.
pub fn padded_index(index: usize) -> String {
    format!("{index:05}")
}

/// Guess media type from file extension.
pub fn guess_media_type(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xhtml" | "html" | "htm" => "application/xhtml+xml",
        "css" => "text/css",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => "application/octet-stream",
    }
}
