//! content.opf: metadata, manifest and spine.

use super::nav::{NAV_FILE, NCX_FILE};
use super::page::{PageDocument, STYLESHEET_FILE};
use super::{ManifestEntry, escape_xml, guess_media_type, href_encode, padded_index};
use crate::cover::COVER_FILE;
use crate::imaging::PageImage;
use crate::options::BuildOptions;

pub const PACKAGE_FILE: &str = "content.opf";

/// Everything the package descriptor is generated from.
#[derive(Debug, Clone, Copy)]
pub struct PackageInput<'a> {
    /// Book UUID, without the `urn:uuid:` prefix.
    pub identifier: &'a str,
    pub title: &'a str,
    pub options: &'a BuildOptions,
    pub images: &'a [PageImage],
    pub pages: &'a [PageDocument],
    /// `dcterms:modified` timestamp (`CCYY-MM-DDThh:mm:ssZ`).
    pub modified: &'a str,
}

/// Manifest entries for every item the package declares.
///
/// Order: cover, NCX, nav, stylesheet, images, pages.
pub fn manifest_entries(images: &[PageImage], pages: &[PageDocument]) -> Vec<ManifestEntry> {
    let mut entries = Vec::with_capacity(images.len() + pages.len() + 4);
    entries.push(
        ManifestEntry::new("cover", COVER_FILE, guess_media_type(COVER_FILE))
            .with_properties("cover-image"),
    );
    entries.push(ManifestEntry::new("ncx", NCX_FILE, guess_media_type(NCX_FILE)));
    entries.push(
        ManifestEntry::new("nav", NAV_FILE, guess_media_type(NAV_FILE)).with_properties("nav"),
    );
    entries.push(ManifestEntry::new("css", STYLESHEET_FILE, guess_media_type(STYLESHEET_FILE)));

    for (i, image) in images.iter().enumerate() {
        let href = image.href();
        let media_type = guess_media_type(&href);
        let id = format!("image_{}", padded_index(i + 1));
        entries.push(ManifestEntry::new(id, href, media_type));
    }
    for page in pages {
        entries.push(ManifestEntry::new(
            page.id(),
            page.file_name.clone(),
            guess_media_type(&page.file_name),
        ));
    }
    entries
}

/// Generate content.opf.
pub fn content_opf(input: &PackageInput<'_>) -> String {
    let options = input.options;
    let orientation = options.orientation();

    let mut opf = String::new();
    opf.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="BookID">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
"#,
    );

    // Dublin Core metadata
    opf.push_str(&format!("    <dc:title>{}</dc:title>\n", escape_xml(input.title)));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        escape_xml(&options.language)
    ));
    opf.push_str(&format!(
        "    <dc:identifier id=\"BookID\">urn:uuid:{}</dc:identifier>\n",
        escape_xml(input.identifier)
    ));
    opf.push_str(&format!(
        "    <dc:contributor id=\"contributor\">{}</dc:contributor>\n",
        escape_xml(&options.author)
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        escape_xml(input.modified)
    ));

    // Fixed layout
    opf.push_str("    <meta name=\"cover\" content=\"cover\"/>\n");
    opf.push_str(&format!(
        "    <meta property=\"rendition:orientation\">{orientation}</meta>\n"
    ));
    opf.push_str(&format!(
        "    <meta property=\"rendition:spread\">{orientation}</meta>\n"
    ));
    opf.push_str("    <meta property=\"rendition:layout\">pre-paginated</meta>\n");

    // Reader extensions
    opf.push_str(&format!(
        "    <meta name=\"original-resolution\" content=\"{}x{}\"/>\n",
        options.page_width, options.page_height
    ));
    opf.push_str("    <meta name=\"book-type\" content=\"comic\"/>\n");
    opf.push_str(&format!(
        "    <meta name=\"RegionMagnification\" content=\"{}\"/>\n",
        options.region_magnification
    ));
    opf.push_str(&format!(
        "    <meta name=\"primary-writing-mode\" content=\"{}\"/>\n",
        options.reading_direction.writing_mode()
    ));
    opf.push_str("    <meta name=\"zero-gutter\" content=\"true\"/>\n");
    opf.push_str("    <meta name=\"zero-margin\" content=\"true\"/>\n");
    opf.push_str("    <meta name=\"ke-border-color\" content=\"#ffffff\"/>\n");
    opf.push_str("    <meta name=\"ke-border-width\" content=\"0\"/>\n");
    opf.push_str("  </metadata>\n");

    // Manifest
    opf.push_str("  <manifest>\n");
    for item in manifest_entries(input.images, input.pages) {
        let properties = item
            .properties
            .map(|p| format!(" properties=\"{}\"", escape_xml(&p)))
            .unwrap_or_default();
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"{}\"{}/>\n",
            escape_xml(&item.id),
            escape_xml(&href_encode(&item.href)),
            escape_xml(&item.media_type),
            properties
        ));
    }
    opf.push_str("  </manifest>\n");

    // Spine
    opf.push_str(&format!(
        "  <spine toc=\"ncx\" page-progression-direction=\"{}\">\n",
        options.reading_direction.page_progression()
    ));
    for page in input.pages {
        opf.push_str(&format!("    <itemref idref=\"{}\"/>\n", escape_xml(&page.id())));
    }
    opf.push_str("  </spine>\n");

    opf.push_str("</package>\n");
    opf
}
