//! End-to-end build tests.
//!
//! Each test generates its page images with the `image` crate inside a
//! temporary directory, runs a build and reads the archive back.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use epub_manga::cover::{TextMetrics, TextShaper, TextStyle};
use epub_manga::{BuildOptions, BuildRequest, EpubBuilder, Error, ReadingDirection};
use quick_xml::Reader;
use quick_xml::events::Event;
use tempfile::TempDir;
use zip::{CompressionMethod, ZipArchive};

const WIDTH: u32 = 60;
const HEIGHT: u32 = 80;

struct Fixture {
    dir: TempDir,
    source: PathBuf,
    workspace_root: PathBuf,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("pages");
        let workspace_root = dir.path().join("tmp");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&workspace_root).unwrap();
        for (i, name) in names.iter().enumerate() {
            // distinct colours and shapes per page
            let shade = (i * 40 % 255) as u8;
            image::RgbImage::from_pixel(20 + i as u32, 30, image::Rgb([shade, 0, 255 - shade]))
                .save(source.join(name))
                .unwrap();
        }
        Self {
            dir,
            source,
            workspace_root,
        }
    }

    fn options(&self) -> BuildOptions {
        BuildOptions {
            page_width: WIDTH,
            page_height: HEIGHT,
            workspace_root: Some(self.workspace_root.clone()),
            ..BuildOptions::default()
        }
    }

    fn request(&self, output: &str) -> BuildRequest {
        BuildRequest::new(&self.source, self.dir.path().join(output), "")
            .with_options(self.options())
    }

    fn workspace_is_clean(&self) -> bool {
        fs::read_dir(&self.workspace_root).unwrap().count() == 0
    }
}

fn open(path: &Path) -> ZipArchive<File> {
    ZipArchive::new(File::open(path).unwrap()).unwrap()
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str) -> String {
    let mut content = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|_| panic!("missing entry {name}"))
        .read_to_string(&mut content)
        .unwrap();
    content
}

fn entry_names(archive: &mut ZipArchive<File>) -> Vec<String> {
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

struct Opf {
    /// (id, href)
    manifest: Vec<(String, String)>,
    spine: Vec<String>,
    progression: String,
}

fn parse_opf(content: &str) -> Opf {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut opf = Opf {
        manifest: Vec::new(),
        spine: Vec::new(),
        progression: String::new(),
    };
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) => match e.name().as_ref() {
                b"item" => {
                    let mut id = String::new();
                    let mut href = String::new();
                    for attr in e.attributes().flatten() {
                        match attr.key.as_ref() {
                            b"id" => id = String::from_utf8(attr.value.to_vec()).unwrap(),
                            b"href" => href = String::from_utf8(attr.value.to_vec()).unwrap(),
                            _ => {}
                        }
                    }
                    opf.manifest.push((id, href));
                }
                b"itemref" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"idref" {
                            opf.spine.push(String::from_utf8(attr.value.to_vec()).unwrap());
                        }
                    }
                }
                b"spine" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"page-progression-direction" {
                            opf.progression = String::from_utf8(attr.value.to_vec()).unwrap();
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    opf
}

#[test]
fn test_manifest_matches_archive() {
    let fixture = Fixture::new(&["a.png", "b.png", "c.png"]);
    let request = fixture.request("book.epub");
    EpubBuilder::new().build(&request).unwrap();

    let mut archive = open(&request.output_file);
    let opf = parse_opf(&read_entry(&mut archive, "content.opf"));

    // images + pages + cover, nav, ncx, stylesheet
    assert_eq!(opf.manifest.len(), 3 + 3 + 4);

    let hrefs: BTreeSet<_> = opf.manifest.iter().map(|(_, href)| href.as_str()).collect();
    assert_eq!(hrefs.len(), opf.manifest.len(), "duplicate manifest hrefs");
    let ids: BTreeSet<_> = opf.manifest.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids.len(), opf.manifest.len(), "duplicate manifest ids");

    for name in entry_names(&mut archive) {
        if name == "mimetype" || name == "content.opf" || name.starts_with("META-INF/") {
            continue;
        }
        assert!(hrefs.contains(name.as_str()), "{name} is archived but not in the manifest");
    }
    for href in hrefs {
        assert!(archive.by_name(href).is_ok(), "{href} is declared but not archived");
    }
}

#[test]
fn test_archive_layout() {
    let fixture = Fixture::new(&["a.png"]);
    let request = fixture.request("book.epub");
    EpubBuilder::new().build(&request).unwrap();

    let mut archive = open(&request.output_file);
    {
        let first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "mimetype");
        assert_eq!(first.compression(), CompressionMethod::Stored);
    }
    assert_eq!(read_entry(&mut archive, "mimetype"), "application/epub+zip");

    let container = read_entry(&mut archive, "META-INF/container.xml");
    assert!(container.contains("full-path=\"content.opf\""));

    let names = entry_names(&mut archive);
    for expected in [
        "toc.ncx",
        "nav.xhtml",
        "style.css",
        "cover.jpg",
        "00001.xhtml",
        "images/a.png",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {expected}");
    }
}

#[test]
fn test_pages_follow_file_name_order() {
    // created out of order on purpose
    let fixture = Fixture::new(&["c.png", "a.png", "b.png"]);
    let request = fixture.request("book.epub");
    EpubBuilder::new().build(&request).unwrap();

    let mut archive = open(&request.output_file);
    for (page, image) in [
        ("00001.xhtml", "images/a.png"),
        ("00002.xhtml", "images/b.png"),
        ("00003.xhtml", "images/c.png"),
    ] {
        let html = read_entry(&mut archive, page);
        assert!(html.contains(&format!("url('{image}')")), "{page} should show {image}");
    }

    let opf = parse_opf(&read_entry(&mut archive, "content.opf"));
    assert_eq!(opf.spine, vec!["page_00001", "page_00002", "page_00003"]);
}

#[test]
fn test_direction_changes_attribute_not_order() {
    let fixture = Fixture::new(&["1.png", "2.png", "3.png", "4.png"]);

    let rtl = fixture.request("rtl.epub");
    let mut ltr = fixture.request("ltr.epub");
    ltr.options.reading_direction = ReadingDirection::Ltr;

    let builder = EpubBuilder::new();
    builder.build(&rtl).unwrap();
    builder.build(&ltr).unwrap();

    let rtl_opf = parse_opf(&read_entry(&mut open(&rtl.output_file), "content.opf"));
    let ltr_opf = parse_opf(&read_entry(&mut open(&ltr.output_file), "content.opf"));

    assert_eq!(rtl_opf.progression, "rtl");
    assert_eq!(ltr_opf.progression, "ltr");
    assert_eq!(rtl_opf.spine, ltr_opf.spine);
}

#[test]
fn test_images_are_normalized_to_canvas() {
    let fixture = Fixture::new(&["wide.png", "tall.png"]);
    let request = fixture.request("book.epub");
    EpubBuilder::new().build(&request).unwrap();

    let mut archive = open(&request.output_file);
    for name in ["images/wide.png", "images/tall.png", "cover.jpg"] {
        let mut data = Vec::new();
        archive.by_name(name).unwrap().read_to_end(&mut data).unwrap();
        let img = image::load_from_memory(&data).unwrap();
        assert_eq!((img.width(), img.height()), (WIDTH, HEIGHT), "{name}");
    }
}

#[test]
fn test_decode_failure_leaves_nothing_behind() {
    let fixture = Fixture::new(&["1.png", "3.png", "4.png", "5.png"]);
    fs::write(fixture.source.join("2.png"), b"this is not a png").unwrap();
    let request = fixture.request("book.epub");

    let err = EpubBuilder::new().build(&request).unwrap_err();

    match err {
        Error::ImageDecode { path, .. } => assert!(path.ends_with("2.png"), "{}", path.display()),
        other => panic!("expected ImageDecode, got {other:?}"),
    }
    assert!(!request.output_file.exists());
    assert!(fixture.workspace_is_clean());
}

#[test]
fn test_builds_differ_only_in_identifier() {
    let fixture = Fixture::new(&["1.png", "2.png"]);
    let first = fixture.request("first.epub");
    let second = fixture.request("second.epub");

    let builder = EpubBuilder::new();
    let first_report = builder.build(&first).unwrap();
    let second_report = builder.build(&second).unwrap();
    assert_ne!(first_report.identifier, second_report.identifier);

    let mut a = open(&first.output_file);
    let mut b = open(&second.output_file);
    assert_eq!(entry_names(&mut a), entry_names(&mut b));

    for name in ["00001.xhtml", "00002.xhtml", "nav.xhtml", "style.css"] {
        assert_eq!(read_entry(&mut a, name), read_entry(&mut b, name), "{name}");
    }

    let opf_a = parse_opf(&read_entry(&mut a, "content.opf"));
    let opf_b = parse_opf(&read_entry(&mut b, "content.opf"));
    assert_eq!(opf_a.manifest, opf_b.manifest);
    assert_eq!(opf_a.spine, opf_b.spine);

    let ncx_a = read_entry(&mut a, "toc.ncx");
    let ncx_b = read_entry(&mut b, "toc.ncx");
    assert!(ncx_a.contains(&first_report.identifier));
    assert_eq!(
        ncx_a.replace(&first_report.identifier, "ID"),
        ncx_b.replace(&second_report.identifier, "ID")
    );
    assert!(fixture.workspace_is_clean());
}

#[test]
fn test_identifier_appears_only_in_package_and_ncx() {
    let fixture = Fixture::new(&["1.png", "2.png", "3.png"]);
    let request = fixture.request("book.epub");
    let report = EpubBuilder::new().build(&request).unwrap();
    let needle = report.identifier.as_bytes();

    let mut archive = open(&request.output_file);
    let mut holders = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();
        if bytes.windows(needle.len()).any(|w| w == needle) {
            holders.push(entry.name().to_string());
        }
    }
    holders.sort();
    assert_eq!(holders, vec!["content.opf", "toc.ncx"]);
}

#[test]
fn test_ncx_page_numbers() {
    let names: Vec<String> = (1..=10).map(|i| format!("{i:03}.png")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let fixture = Fixture::new(&refs);
    let request = fixture.request("book.epub");
    EpubBuilder::new().build(&request).unwrap();

    let ncx = read_entry(&mut open(&request.output_file), "toc.ncx");
    assert!(ncx.contains("<meta name=\"dtb:totalPageCount\" content=\"10\"/>"));
    assert!(ncx.contains("<meta name=\"dtb:maxPageNumber\" content=\"11\"/>"));
    assert!(ncx.contains("<navPoint id=\"00010\" playOrder=\"10\">"));
}

#[test]
fn test_hidden_files_are_skipped() {
    let fixture = Fixture::new(&["1.png", "2.png"]);
    fs::write(fixture.source.join(".DS_Store"), b"junk").unwrap();
    fs::create_dir(fixture.source.join("extras")).unwrap();
    let request = fixture.request("book.epub");

    let report = EpubBuilder::new().build(&request).unwrap();
    assert_eq!(report.page_count, 2);
}

#[test]
fn test_empty_source_is_invalid() {
    let fixture = Fixture::new(&[]);
    let request = fixture.request("book.epub");

    let err = EpubBuilder::new().build(&request).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{err:?}");
    assert!(!request.output_file.exists());
    assert!(fixture.workspace_is_clean());
}

/// Block glyphs: each char is a 10x20 box.
struct BlockShaper;

impl TextShaper for BlockShaper {
    fn measure(&self, text: &str, style: &TextStyle) -> epub_manga::Result<TextMetrics> {
        let width = text.chars().count() as f64 * 10.0;
        Ok(TextMetrics {
            x: style.x - width / 2.0,
            y: style.y - 10.0,
            width,
            height: 20.0,
        })
    }

    fn to_path(&self, text: &str, style: &TextStyle) -> epub_manga::Result<String> {
        let width = text.chars().count() as f64 * 10.0;
        Ok(format!(
            "<path fill=\"{}\" d=\"M{} {} h{} v-20 h-{} Z\"/>",
            style.fill,
            style.x - width / 2.0,
            style.y,
            width,
            width
        ))
    }
}

#[test]
fn test_titled_cover_and_escaped_metadata() {
    let fixture = Fixture::new(&["1.png"]);
    let mut request = fixture.request("book.epub");
    request.title = "Tom & Jerry <Vol. 1>".into();
    request.options.author = "Ann \"A\" Author".into();

    EpubBuilder::new()
        .with_text_shaper(BlockShaper)
        .build(&request)
        .unwrap();

    let mut archive = open(&request.output_file);
    let opf = read_entry(&mut archive, "content.opf");
    assert!(opf.contains("<dc:title>Tom &amp; Jerry &lt;Vol. 1&gt;</dc:title>"));
    assert!(opf.contains("Ann &quot;A&quot; Author"));

    let mut cover = Vec::new();
    archive.by_name("cover.jpg").unwrap().read_to_end(&mut cover).unwrap();
    let cover = image::load_from_memory(&cover).unwrap();
    assert_eq!((cover.width(), cover.height()), (WIDTH, HEIGHT));
}

#[test]
fn test_magnification_toggle() {
    let fixture = Fixture::new(&["1.png"]);
    let on = fixture.request("on.epub");
    let mut off = fixture.request("off.epub");
    off.options.region_magnification = false;

    let builder = EpubBuilder::new();
    builder.build(&on).unwrap();
    builder.build(&off).unwrap();

    let mut on_archive = open(&on.output_file);
    let mut off_archive = open(&off.output_file);
    assert!(read_entry(&mut on_archive, "00001.xhtml").contains("app-amzn-magnify"));
    assert!(!read_entry(&mut off_archive, "00001.xhtml").contains("app-amzn-magnify"));
    assert!(
        read_entry(&mut off_archive, "content.opf")
            .contains("name=\"RegionMagnification\" content=\"false\"")
    );
}
