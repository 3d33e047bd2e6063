//! Gzip variant encoding.
//!
//! Each artifact may carry a precompressed `.gz` sibling so the delivery
//! layer can serve it without compressing on the fly. The variant is
//! best-effort: producing it can fail without invalidating the primary
//! artifact, and purging the primary removes the sibling.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::StoreError;
use crate::store::gz_sibling;

/// Write the `.gz` sibling for a just-persisted artifact.
///
/// Reads the artifact fully, encodes at the best ratio, and stages the
/// output next to the artifact before atomically renaming it into place,
/// the same discipline as the primary write. The sibling is created or
/// overwritten; a previously missing sibling is not an error.
pub fn compress_artifact(path: &Path) -> Result<PathBuf, StoreError> {
    let data = fs::read(path)?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(&data)?;
    let compressed = encoder.finish()?;

    let parent = path.parent().ok_or_else(|| StoreError::invalid_path(path))?;
    let mut staged = tempfile::NamedTempFile::new_in(parent)?;
    staged.write_all(&compressed)?;
    staged.as_file().sync_all()?;

    let target = gz_sibling(path);
    staged.persist(&target).map_err(|err| err.error)?;
    Ok(target)
}
