//! Filesystem artifact store.
//!
//! The destination tree is the only state this crate has: every operation
//! re-reads the filesystem as ground truth and the single concurrency
//! guarantee is atomic replace-by-rename. Content is staged into a
//! temporary file *inside the destination root* so the final rename never
//! crosses a filesystem boundary, and a reader polling the destination
//! path sees either the previous complete artifact or the new one, never a
//! mixture.

use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::StoreError;

/// Filesystem-backed artifact storage rooted at the destination folder.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at the given directory. The directory is
    /// created lazily on the first save, so constructing a store never
    /// touches the disk.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Durably persist `content` at `relative` under the root.
    ///
    /// Empty content is rejected outright: a zero-byte artifact must never
    /// shadow previously published content after a partial render. The
    /// write is staged to a temp file on the same volume, parents are
    /// created, and the temp file is atomically renamed onto the target.
    /// Success is judged by the target existing afterwards, not by the
    /// rename's return value.
    ///
    /// On any failure the previous artifact, if one exists, is untouched;
    /// the target is never opened for in-place writing.
    pub fn save(&self, content: &[u8], relative: &Path) -> Result<PathBuf, StoreError> {
        if content.is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let target = self.root.join(relative);
        let parent = target
            .parent()
            .ok_or_else(|| StoreError::invalid_path(relative))?
            .to_path_buf();

        fs::create_dir_all(&self.root)?;
        let mut staged = NamedTempFile::new_in(&self.root)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;

        fs::create_dir_all(&parent)?;
        staged.persist(&target).map_err(|err| err.error)?;

        if target.exists() {
            Ok(target)
        } else {
            Err(StoreError::missing_after_move(&target))
        }
    }

    /// Delete the artifact at `relative`, cascading to its `.gz` sibling.
    ///
    /// Idempotent: a file that is already absent counts as deleted.
    pub fn delete(&self, relative: &Path) -> Result<(), StoreError> {
        let target = self.root.join(relative);
        remove_if_present(&target)?;
        remove_if_present(&gz_sibling(&target))?;
        Ok(())
    }

    /// Remove the entire destination tree.
    ///
    /// Returns true iff the root no longer exists afterwards; a root that
    /// never existed already counts as purged.
    pub fn purge_all(&self) -> bool {
        if let Err(err) = fs::remove_dir_all(&self.root)
            && err.kind() != ErrorKind::NotFound
        {
            warn!(root = %self.root.display(), error = %err, "failed to remove cache root");
        }
        !self.root.exists()
    }

    /// All regular files under `start`, skipping dot-prefixed entries at
    /// every level. Order follows directory traversal and is not sorted.
    /// A missing start directory yields an empty list.
    pub fn artifact_files(&self, start: &Path) -> Vec<PathBuf> {
        WalkDir::new(start)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .collect()
    }
}

/// The compressed sibling of an artifact path (`page.html` → `page.html.gz`).
pub(crate) fn gz_sibling(path: &Path) -> PathBuf {
    let mut sibling = OsString::from(path.as_os_str());
    sibling.push(".gz");
    PathBuf::from(sibling)
}

fn remove_if_present(path: &Path) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}
