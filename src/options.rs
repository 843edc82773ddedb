//! Build configuration.
//!
//! [`BuildOptions`] is the immutable configuration of one build. Callers
//! start from [`BuildOptions::default`] and apply a [`BuildOverrides`] on
//! top; every field left as `None` in the overrides keeps its default.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default page canvas width in pixels.
pub const DEFAULT_PAGE_WIDTH: u32 = 1072;
/// Default page canvas height in pixels.
pub const DEFAULT_PAGE_HEIGHT: u32 = 1448;
/// Default contributor written to the package descriptor.
pub const DEFAULT_AUTHOR: &str = "EPUB Manga Generator";
/// Default `dc:language`.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Reading direction of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum ReadingDirection {
    Ltr,
    #[default]
    Rtl,
}

impl ReadingDirection {
    /// Value of the spine `page-progression-direction` attribute.
    pub fn page_progression(self) -> &'static str {
        match self {
            ReadingDirection::Ltr => "ltr",
            ReadingDirection::Rtl => "rtl",
        }
    }

    /// Value of the `primary-writing-mode` metadata entry.
    pub fn writing_mode(self) -> &'static str {
        match self {
            ReadingDirection::Ltr => "horizontal-lr",
            ReadingDirection::Rtl => "horizontal-rl",
        }
    }
}

impl fmt::Display for ReadingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.page_progression())
    }
}

impl FromStr for ReadingDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ltr" => Ok(ReadingDirection::Ltr),
            "rtl" => Ok(ReadingDirection::Rtl),
            other => Err(Error::InvalidInput(format!(
                "unknown reading direction '{other}' (expected ltr or rtl)"
            ))),
        }
    }
}

/// Configuration for one build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    pub page_width: u32,
    pub page_height: u32,
    pub reading_direction: ReadingDirection,
    pub author: String,
    pub language: String,
    /// Emit tap-to-zoom panels and the `RegionMagnification` flag.
    pub region_magnification: bool,
    /// Directory under which the build workspace is created.
    /// `None` uses the platform temp directory.
    pub workspace_root: Option<PathBuf>,
    /// Font used for the cover title. `None` looks up a system sans-serif.
    pub font_path: Option<PathBuf>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_PAGE_WIDTH,
            page_height: DEFAULT_PAGE_HEIGHT,
            reading_direction: ReadingDirection::default(),
            author: DEFAULT_AUTHOR.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            region_magnification: true,
            workspace_root: None,
            font_path: None,
        }
    }
}

/// Caller-supplied values that replace [`BuildOptions`] fields one by one.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default, rename_all = "camelCase"))]
pub struct BuildOverrides {
    pub page_width: Option<u32>,
    pub page_height: Option<u32>,
    pub reading_direction: Option<ReadingDirection>,
    pub author: Option<String>,
    pub language: Option<String>,
    pub region_magnification: Option<bool>,
    pub workspace_root: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
}

impl BuildOverrides {
    /// Layer `other` on top of `self`: fields set in `other` win.
    pub fn or(self, other: BuildOverrides) -> BuildOverrides {
        BuildOverrides {
            page_width: other.page_width.or(self.page_width),
            page_height: other.page_height.or(self.page_height),
            reading_direction: other.reading_direction.or(self.reading_direction),
            author: other.author.or(self.author),
            language: other.language.or(self.language),
            region_magnification: other.region_magnification.or(self.region_magnification),
            workspace_root: other.workspace_root.or(self.workspace_root),
            font_path: other.font_path.or(self.font_path),
        }
    }
}

impl BuildOptions {
    /// Apply `overrides` field by field, keeping current values for unset fields.
    pub fn merged(mut self, overrides: BuildOverrides) -> Self {
        if let Some(width) = overrides.page_width {
            self.page_width = width;
        }
        if let Some(height) = overrides.page_height {
            self.page_height = height;
        }
        if let Some(direction) = overrides.reading_direction {
            self.reading_direction = direction;
        }
        if let Some(author) = overrides.author {
            self.author = author;
        }
        if let Some(language) = overrides.language {
            self.language = language;
        }
        if let Some(enabled) = overrides.region_magnification {
            self.region_magnification = enabled;
        }
        if overrides.workspace_root.is_some() {
            self.workspace_root = overrides.workspace_root;
        }
        if overrides.font_path.is_some() {
            self.font_path = overrides.font_path;
        }
        self
    }

    /// Check the options once before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.page_width == 0 || self.page_height == 0 {
            return Err(Error::InvalidInput(format!(
                "page canvas must be non-empty, got {}x{}",
                self.page_width, self.page_height
            )));
        }
        if self.language.trim().is_empty() {
            return Err(Error::InvalidInput("language must not be empty".into()));
        }
        Ok(())
    }

    /// `portrait` unless the canvas is wider than it is tall.
    pub fn orientation(&self) -> &'static str {
        if self.page_width > self.page_height {
            "landscape"
        } else {
            "portrait"
        }
    }
}

/// Everything needed for one build. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub source_directory: PathBuf,
    pub output_file: PathBuf,
    pub title: String,
    pub options: BuildOptions,
}

impl BuildRequest {
    pub fn new(
        source_directory: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            source_directory: source_directory.into(),
            output_file: output_file.into(),
            title: title.into(),
            options: BuildOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_overrides(mut self, overrides: BuildOverrides) -> Self {
        self.options = self.options.merged(overrides);
        self
    }
}
