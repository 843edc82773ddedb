//! # epub-manga
//!
//! Package a directory of comic/manga page images into a fixed-layout EPUB.
//!
//! ## Features
//!
//! - Pages resized and letterboxed to one canvas (default 1072x1448)
//! - Right-to-left or left-to-right page progression
//! - Cover built from the first page with an optional word-wrapped title
//! - Kindle-style region magnification panels
//! - EPUB 3 navigation plus legacy NCX
//!
//! ## Quick Start
//!
//! ```no_run
//! use epub_manga::convert;
//!
//! convert("chapter-01/", "chapter-01.epub", "Chapter 1", None)?;
//! # Ok::<(), epub_manga::Error>(())
//! ```
//!
//! ## Options
//!
//! ```no_run
//! use epub_manga::{BuildOverrides, BuildRequest, EpubBuilder, ReadingDirection};
//!
//! let overrides = BuildOverrides {
//!     reading_direction: Some(ReadingDirection::Ltr),
//!     author: Some("Jane Doe".into()),
//!     ..BuildOverrides::default()
//! };
//! let request = BuildRequest::new("pages/", "book.epub", "My Comic").with_overrides(overrides);
//! EpubBuilder::new().build(&request)?;
//! # Ok::<(), epub_manga::Error>(())
//! ```

pub mod archive;
pub mod builder;
pub mod cover;
pub mod error;
pub mod geometry;
pub mod imaging;
pub mod markup;
pub mod options;
pub mod workspace;

pub use builder::{BuildReport, EpubBuilder, convert};
pub use error::{Error, Result};
pub use options::{BuildOptions, BuildOverrides, BuildRequest, ReadingDirection};
