//! EPUB 3 navigation document and legacy NCX.

use super::page::PageDocument;
use super::{escape_xml, href_encode, padded_index};

pub const NAV_FILE: &str = "nav.xhtml";
pub const NCX_FILE: &str = "toc.ncx";

/// Generate nav.xhtml: a `toc` nav and an identical `page-list` nav.
pub fn nav_xhtml(pages: &[PageDocument], title: &str) -> String {
    let mut items = String::new();
    for page in pages {
        items.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape_xml(&href_encode(&page.file_name)),
            page.index
        ));
    }

    let mut nav = String::new();
    nav.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head>
"#,
    );
    nav.push_str(&format!("  <title>{}</title>\n", escape_xml(title)));
    nav.push_str("  <meta charset=\"utf-8\"/>\n</head>\n<body>\n");

    nav.push_str("  <nav epub:type=\"toc\" id=\"toc\">\n    <ol>\n");
    nav.push_str(&items);
    nav.push_str("    </ol>\n  </nav>\n");

    nav.push_str("  <nav epub:type=\"page-list\" id=\"page-list\" hidden=\"\">\n    <ol>\n");
    nav.push_str(&items);
    nav.push_str("    </ol>\n  </nav>\n");

    nav.push_str("</body>\n</html>\n");
    nav
}

/// Generate toc.ncx in `language`.
///
/// `dtb:maxPageNumber` is one more than the page count: numbering counts the
/// cover, which has no navPoint of its own.
pub fn toc_ncx(pages: &[PageDocument], identifier: &str, title: &str, language: &str) -> String {
    let total = pages.len();
    let max_page_number = total + 1;

    let mut ncx = String::new();
    ncx.push_str(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1" "#,
    );
    ncx.push_str(&format!("xml:lang=\"{}\">\n  <head>\n", escape_xml(language)));
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"urn:uuid:{}\"/>\n",
        escape_xml(identifier)
    ));
    ncx.push_str("    <meta name=\"dtb:depth\" content=\"1\"/>\n");
    ncx.push_str(&format!(
        "    <meta name=\"dtb:totalPageCount\" content=\"{total}\"/>\n"
    ));
    ncx.push_str(&format!(
        "    <meta name=\"dtb:maxPageNumber\" content=\"{max_page_number}\"/>\n"
    ));
    ncx.push_str("    <meta name=\"generated\" content=\"true\"/>\n");
    ncx.push_str("  </head>\n");
    ncx.push_str(&format!(
        "  <docTitle><text>{}</text></docTitle>\n",
        escape_xml(title)
    ));
    ncx.push_str("  <navMap>\n");

    for page in pages {
        ncx.push_str(&format!(
            "    <navPoint id=\"{}\" playOrder=\"{}\">\
             <navLabel><text>{}</text></navLabel><content src=\"{}\"/></navPoint>\n",
            padded_index(page.index),
            page.index,
            page.index,
            escape_xml(&href_encode(&page.file_name))
        ));
    }

    ncx.push_str("  </navMap>\n</ncx>\n");
    ncx
}
