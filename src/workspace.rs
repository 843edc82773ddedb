//! Per-build temporary workspace.
//!
//! A [`Workspace`] owns a uniquely named directory. Dropping it removes the
//! directory, so every exit path of a build (including `?` early returns and
//! panics) cleans up. [`Workspace::release`] removes it explicitly and
//! reports failures.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::{Error, Result};

const PREFIX: &str = "epub-manga-";

/// Exclusive, self-removing build directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh workspace under `root`, or the platform temp dir.
    pub fn acquire(root: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(|e| Error::environment("cannot create build workspace", e))?;

        log::debug!("acquired workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the normalized page images.
    pub fn images_dir(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    /// Absolute path of a workspace-relative file.
    pub fn file(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write `contents` to a workspace-relative path, creating parents.
    pub fn write(&self, relative: &str, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.file(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::environment(format!("cannot create {}", parent.display()), e))?;
        }
        fs::write(&path, contents)
            .map_err(|e| Error::environment(format!("cannot write {}", path.display()), e))?;
        Ok(path)
    }

    /// Remove the workspace now.
    pub fn release(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|e| Error::environment(format!("cannot remove {}", path.display()), e))?;
        log::debug!("released workspace {}", path.display());
        Ok(())
    }
}
