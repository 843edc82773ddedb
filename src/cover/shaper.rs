//! Text metrics and vector outlines for the cover title.

use std::fs;
use std::path::Path;

use rustybuzz::{Face, Feature, UnicodeBuffer};
use ttf_parser::{GlyphId, OutlineBuilder, Tag};

use crate::error::{Error, Result};

/// Which point of the text box `TextStyle::y` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    /// `y` is the vertical middle of the text box.
    Middle,
    /// `y` is the baseline.
    Baseline,
}

/// Where and how a run of text is drawn. `x` is always the horizontal center.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub anchor: VerticalAnchor,
    pub fill: String,
}

/// Bounding box of rendered text, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextMetrics {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Text measurement and outline capability.
pub trait TextShaper {
    /// Bounding box of `text` drawn with `style`.
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics>;

    /// `text` drawn with `style` as a single SVG `<path>` element.
    fn to_path(&self, text: &str, style: &TextStyle) -> Result<String>;
}

/// Families tried, in order, when no font file is configured. The Japanese
/// faces cover most manga titles the Latin ones cannot draw.
const FALLBACK_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "IPAGothic",
    "IPAexGothic",
    "Noto Sans CJK JP",
    "Noto Sans JP",
    "Source Han Sans JP",
    "Hiragino Sans",
    "Yu Gothic",
    "MS Gothic",
    "TakaoGothic",
    "VL Gothic",
    "Helvetica",
    "Arial",
];

fn features() -> [Feature; 2] {
    [
        Feature::new(Tag::from_bytes(b"liga"), 1, ..),
        Feature::new(Tag::from_bytes(b"kern"), 1, ..),
    ]
}

/// [`TextShaper`] backed by a TrueType/OpenType font, shaped with rustybuzz.
pub struct FontShaper {
    data: Vec<u8>,
    index: u32,
}

impl std::fmt::Debug for FontShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontShaper")
            .field("data_len", &self.data.len())
            .field("index", &self.index)
            .finish()
    }
}

impl FontShaper {
    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self> {
        Face::from_slice(&data, index)
            .ok_or_else(|| Error::Render("unusable font data".into()))?;
        Ok(Self { data, index })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .map_err(|e| Error::Render(format!("cannot read font {}: {e}", path.display())))?;
        Self::from_bytes(data, 0)
    }

    /// Find an installed face with a glyph for every character of `text`.
    ///
    /// The generic sans-serif family is tried first, then each fallback
    /// family, then every other installed face.
    pub fn system_for(text: &str) -> Result<Self> {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();

        let mut families = vec![fontdb::Family::SansSerif];
        families.extend(FALLBACK_FAMILIES.iter().map(|&name| fontdb::Family::Name(name)));

        let preferred = families.iter().filter_map(|family| {
            db.query(&fontdb::Query {
                families: std::slice::from_ref(family),
                weight: fontdb::Weight::BOLD,
                ..fontdb::Query::default()
            })
        });
        let installed = db.faces().map(|face| face.id);

        for id in preferred.chain(installed) {
            let covering = db
                .with_face_data(id, |data, index| {
                    let face = Face::from_slice(data, index)?;
                    missing_glyphs(&face, text)
                        .is_empty()
                        .then(|| (data.to_vec(), index))
                })
                .flatten();
            if let Some((data, index)) = covering {
                log::debug!("using system font face {index} ({} bytes)", data.len());
                return Self::from_bytes(data, index);
            }
        }

        Err(Error::Render(format!(
            "no installed font has glyphs for the title {text:?}; pass a font file"
        )))
    }

    /// Load `path` when given, otherwise a system font covering `text`.
    pub fn load(path: Option<&Path>, text: &str) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::system_for(text),
        }
    }

    fn face(&self) -> Result<Face<'_>> {
        Face::from_slice(&self.data, self.index)
            .ok_or_else(|| Error::Render("unusable font data".into()))
    }
}

/// Characters of `text` the face cannot draw. Whitespace and controls
/// never need a glyph.
fn missing_glyphs(face: &Face<'_>, text: &str) -> Vec<char> {
    text.chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .filter(|&c| face.glyph_index(c).is_none())
        .collect()
}

/// One positioned glyph, in font units relative to the run origin.
struct Glyph {
    id: GlyphId,
    x: f64,
    y: f64,
}

/// Shaped run of text in font units.
struct Run {
    glyphs: Vec<Glyph>,
    advance: f64,
}

fn shape_run(face: &Face<'_>, text: &str) -> Result<Run> {
    let missing = missing_glyphs(face, text);
    if !missing.is_empty() {
        return Err(Error::Render(format!(
            "font has no glyphs for {:?}",
            missing.into_iter().collect::<String>()
        )));
    }

    let mut buffer = UnicodeBuffer::new();
    buffer.push_str(text);
    buffer.guess_segment_properties();
    let shaped = rustybuzz::shape(face, &features(), buffer);

    let mut glyphs = Vec::with_capacity(shaped.len());
    let mut pen = 0.0;
    for (info, pos) in shaped.glyph_infos().iter().zip(shaped.glyph_positions()) {
        glyphs.push(Glyph {
            id: GlyphId(info.glyph_id as u16),
            x: pen + f64::from(pos.x_offset),
            y: f64::from(pos.y_offset),
        });
        pen += f64::from(pos.x_advance);
    }
    Ok(Run {
        glyphs,
        advance: pen,
    })
}

/// Box and baseline of a run placed according to `style`.
struct Placement {
    metrics: TextMetrics,
    baseline: f64,
    scale: f64,
}

fn place(face: &Face<'_>, run: &Run, style: &TextStyle) -> Placement {
    let scale = style.font_size / f64::from(face.units_per_em().max(1));
    let ascender = f64::from(face.ascender()) * scale;
    let descender = f64::from(face.descender()) * scale;
    let height = ascender - descender;
    let width = run.advance * scale;

    let (top, baseline) = match style.anchor {
        VerticalAnchor::Middle => {
            let top = style.y - height / 2.0;
            (top, top + ascender)
        }
        VerticalAnchor::Baseline => (style.y - ascender, style.y),
    };

    Placement {
        metrics: TextMetrics {
            x: style.x - width / 2.0,
            y: top,
            width,
            height,
        },
        baseline,
        scale,
    }
}

impl TextShaper for FontShaper {
    fn measure(&self, text: &str, style: &TextStyle) -> Result<TextMetrics> {
        let face = self.face()?;
        let run = shape_run(&face, text)?;
        Ok(place(&face, &run, style).metrics)
    }

    fn to_path(&self, text: &str, style: &TextStyle) -> Result<String> {
        let face = self.face()?;
        let run = shape_run(&face, text)?;
        let placement = place(&face, &run, style);

        let mut d = String::new();
        for glyph in &run.glyphs {
            let mut builder = SvgPathBuilder {
                d: &mut d,
                origin_x: placement.metrics.x + glyph.x * placement.scale,
                origin_y: placement.baseline - glyph.y * placement.scale,
                scale: placement.scale,
            };
            face.outline_glyph(glyph.id, &mut builder);
        }

        Ok(format!(
            "<path fill=\"{}\" d=\"{}\"/>",
            crate::markup::escape_xml(&style.fill),
            d.trim_end()
        ))
    }
}

/// Emits glyph outlines as SVG path commands in canvas coordinates.
struct SvgPathBuilder<'a> {
    d: &'a mut String,
    origin_x: f64,
    origin_y: f64,
    scale: f64,
}

impl SvgPathBuilder<'_> {
    fn point(&self, x: f32, y: f32) -> String {
        format!(
            "{} {}",
            num(self.origin_x + f64::from(x) * self.scale),
            num(self.origin_y - f64::from(y) * self.scale)
        )
    }
}

impl OutlineBuilder for SvgPathBuilder<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.d.push_str(&format!("M{p} "));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.point(x, y);
        self.d.push_str(&format!("L{p} "));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let c = self.point(x1, y1);
        let p = self.point(x, y);
        self.d.push_str(&format!("Q{c} {p} "));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let c1 = self.point(x1, y1);
        let c2 = self.point(x2, y2);
        let p = self.point(x, y);
        self.d.push_str(&format!("C{c1} {c2} {p} "));
    }

    fn close(&mut self) {
        self.d.push_str("Z ");
    }
}

/// Format a coordinate with at most two decimals.
pub(crate) fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}
