//! Build orchestration.
//!
//! A build runs every stage in order inside its own [`Workspace`]:
//! normalize pages, compose the cover, write page/nav/NCX/OPF/container
//! documents, then pack the archive. The workspace is released before the
//! result, success or failure, is returned.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::archive::{ArchiveEntry, write_archive};
use crate::cover::{COVER_FILE, FontShaper, TextShaper, compose_cover, title_overlay};
use crate::error::{Error, Result};
use crate::imaging::{
    ImageBackend, PageImage, RasterBackend, copy_sources, list_source_images, normalize_pages,
};
use crate::markup::{
    CONTAINER_FILE, NAV_FILE, NCX_FILE, PACKAGE_FILE, PackageInput, PageDocument, STYLESHEET,
    STYLESHEET_FILE, container_xml, content_opf, nav_xhtml, page_file_name, page_xhtml, toc_ncx,
};
use crate::options::{BuildOverrides, BuildRequest};
use crate::workspace::Workspace;

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub output_file: PathBuf,
    /// Book UUID embedded in the package and NCX.
    pub identifier: String,
    pub page_count: usize,
}

/// Builds fixed-layout EPUB packages from directories of page images.
///
/// # Example
///
/// ```no_run
/// use epub_manga::{BuildRequest, EpubBuilder};
///
/// let request = BuildRequest::new("pages/", "book.epub", "My Manga");
/// let report = EpubBuilder::new().build(&request)?;
/// println!("{} pages", report.page_count);
/// # Ok::<(), epub_manga::Error>(())
/// ```
pub struct EpubBuilder {
    backend: Box<dyn ImageBackend>,
    shaper: Option<Box<dyn TextShaper>>,
}

impl EpubBuilder {
    /// Builder with the `image`-crate backend and the configured font.
    pub fn new() -> Self {
        Self {
            backend: Box::new(RasterBackend::new()),
            shaper: None,
        }
    }

    /// Replace the image capability.
    pub fn with_image_backend(mut self, backend: impl ImageBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Use `shaper` for the cover title instead of loading a font.
    pub fn with_text_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    /// Run one build.
    pub fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
        request.options.validate()?;
        let sources = list_source_images(&request.source_directory)?;

        let workspace = Workspace::acquire(request.options.workspace_root.as_deref())?;
        let result = self.assemble(request, &sources, &workspace);
        let released = workspace.release();

        let report = result?;
        released?;
        log::info!(
            "wrote {} ({} pages)",
            report.output_file.display(),
            report.page_count
        );
        Ok(report)
    }

    fn assemble(
        &self,
        request: &BuildRequest,
        sources: &[PathBuf],
        workspace: &Workspace,
    ) -> Result<BuildReport> {
        let options = &request.options;
        let title = request.title.as_str();

        log::info!(
            "normalizing {} pages to {}x{}",
            sources.len(),
            options.page_width,
            options.page_height
        );
        let copies = copy_sources(sources, &workspace.images_dir())?;
        let images = normalize_pages(
            self.backend.as_ref(),
            sources,
            &copies,
            options.page_width,
            options.page_height,
        )?;
        let first = images
            .first()
            .ok_or_else(|| Error::InvalidInput("no pages to build".into()))?;

        log::info!("composing cover");
        let cover_path = workspace.file(COVER_FILE);
        compose_cover(&first.normalized_path, title, &cover_path, |title, width, height| {
            match &self.shaper {
                Some(shaper) => title_overlay(title, width, height, shaper.as_ref()),
                None => {
                    let font = FontShaper::load(options.font_path.as_deref(), title)?;
                    title_overlay(title, width, height, &font)
                }
            }
        })?;

        log::info!("writing page documents");
        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let index = i + 1;
            let file_name = page_file_name(index);
            let path = workspace.write(&file_name, page_xhtml(index, image, title, options))?;
            pages.push(PageDocument {
                index,
                file_name,
                path,
            });
        }
        workspace.write(STYLESHEET_FILE, STYLESHEET)?;

        log::info!("writing navigation and package documents");
        let identifier = Uuid::new_v4().to_string();
        let modified = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        workspace.write(NAV_FILE, nav_xhtml(&pages, title))?;
        workspace.write(NCX_FILE, toc_ncx(&pages, &identifier, title, &options.language))?;
        workspace.write(
            PACKAGE_FILE,
            content_opf(&PackageInput {
                identifier: &identifier,
                title,
                options,
                images: &images,
                pages: &pages,
                modified: &modified,
            }),
        )?;
        workspace.write(CONTAINER_FILE, container_xml())?;

        log::info!("packing {}", request.output_file.display());
        let entries = archive_entries(workspace, &images, &pages);
        write_archive(&request.output_file, &entries)?;

        Ok(BuildReport {
            output_file: request.output_file.clone(),
            identifier,
            page_count: pages.len(),
        })
    }
}

impl Default for EpubBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Archive layout: descriptors, shared files, cover, pages, then images.
fn archive_entries(
    workspace: &Workspace,
    images: &[PageImage],
    pages: &[PageDocument],
) -> Vec<ArchiveEntry> {
    let mut entries: Vec<ArchiveEntry> = [
        CONTAINER_FILE,
        PACKAGE_FILE,
        NCX_FILE,
        NAV_FILE,
        STYLESHEET_FILE,
        COVER_FILE,
    ]
    .into_iter()
    .map(|name| ArchiveEntry::file(name, workspace.file(name)))
    .collect();

    entries.extend(
        pages
            .iter()
            .map(|page| ArchiveEntry::file(page.file_name.clone(), page.path.clone())),
    );
    entries.extend(
        images
            .iter()
            .map(|image| ArchiveEntry::file(image.href(), image.normalized_path.clone())),
    );
    entries
}

/// Convert `source` into a fixed-layout EPUB at `output`.
///
/// `overrides` replace the default [`BuildOptions`](crate::BuildOptions)
/// field by field.
pub fn convert(
    source: impl AsRef<Path>,
    output: impl AsRef<Path>,
    title: &str,
    overrides: Option<BuildOverrides>,
) -> Result<()> {
    let request = BuildRequest::new(source.as_ref(), output.as_ref(), title)
        .with_overrides(overrides.unwrap_or_default());
    EpubBuilder::new().build(&request).map(|_| ())
}
