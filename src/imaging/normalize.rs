//! Source enumeration and page normalization.

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::backend::{Dimensions, ImageBackend};
use crate::error::{Error, Result};

/// Letterbox colour for every page.
pub const PAGE_BACKGROUND: [u8; 3] = [255, 255, 255];

/// One page image owned by a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub source_path: PathBuf,
    pub normalized_path: PathBuf,
    /// File name shared by the source, the workspace copy and the archive entry.
    pub file_name: String,
    pub original: Dimensions,
    pub normalized: Dimensions,
}

impl PageImage {
    /// Path of this image inside the archive.
    pub fn href(&self) -> String {
        format!("images/{}", self.file_name)
    }
}

/// List the page images of `dir` in reading order.
///
/// Reading order is file-name order so that identical inputs always produce
/// identical page numbering. Hidden files and sub-directories are skipped.
pub fn list_source_images(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "source directory {} does not exist",
            dir.display()
        )));
    }

    let entries = fs::read_dir(dir)
        .map_err(|e| Error::environment(format!("cannot list {}", dir.display()), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| Error::environment(format!("cannot list {}", dir.display()), e))?;
        let path = entry.path();
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            log::debug!("skipping hidden file {}", path.display());
            continue;
        }
        if !path.is_file() {
            log::warn!("skipping non-file entry {}", path.display());
            continue;
        }
        files.push(path);
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    if files.is_empty() {
        return Err(Error::InvalidInput(format!(
            "source directory {} contains no images",
            dir.display()
        )));
    }
    Ok(files)
}

/// Copy `sources` into `images_dir`, keeping file names.
pub fn copy_sources(sources: &[PathBuf], images_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(images_dir)
        .map_err(|e| Error::environment(format!("cannot create {}", images_dir.display()), e))?;

    sources
        .iter()
        .map(|src| {
            let name = src.file_name().ok_or_else(|| {
                Error::InvalidInput(format!("source path {} has no file name", src.display()))
            })?;
            let dest = images_dir.join(name);
            fs::copy(src, &dest).map_err(|e| {
                Error::environment(format!("cannot copy {} into workspace", src.display()), e)
            })?;
            Ok(dest)
        })
        .collect()
}

/// Resize and pad every copied page to the canvas, in place.
///
/// `sources[i]` is the original of `copies[i]`. The returned pages keep the
/// input order. The first failure aborts the whole batch.
pub fn normalize_pages(
    backend: &dyn ImageBackend,
    sources: &[PathBuf],
    copies: &[PathBuf],
    width: u32,
    height: u32,
) -> Result<Vec<PageImage>> {
    let jobs: Vec<(&PathBuf, &PathBuf)> = sources.iter().zip(copies).collect();

    #[cfg(feature = "parallel")]
    let iter = jobs.into_par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = jobs.into_iter();

    iter.map(|(source, copy)| normalize_one(backend, source, copy, width, height))
        .collect()
}

fn normalize_one(
    backend: &dyn ImageBackend,
    source: &Path,
    copy: &Path,
    width: u32,
    height: u32,
) -> Result<PageImage> {
    let original = backend.dimensions(copy)?;
    backend.resize_and_pad(copy, width, height, PAGE_BACKGROUND)?;
    // Measure again: the panel geometry must use what was actually written.
    let normalized = backend.dimensions(copy)?;
    log::debug!(
        "normalized {} ({}x{} -> {}x{})",
        source.display(),
        original.width,
        original.height,
        normalized.width,
        normalized.height
    );

    Ok(PageImage {
        source_path: source.to_path_buf(),
        normalized_path: copy.to_path_buf(),
        file_name: copy
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        original,
        normalized,
    })
}
