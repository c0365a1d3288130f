//! Filesystem-backed media store.

use std::fs;
use std::path::{Path, PathBuf};

use super::{MediaKey, MediaStore, PixelData};
use crate::error::{Error, Result};

/// Writes crops into a directory as `<md5(book/page/ordinal)>.<ext>`.
///
/// The returned reference is the file name relative to the directory, so
/// re-running the same document yields the same references.
#[derive(Debug, Clone)]
pub struct DirMediaStore {
    root: PathBuf,
}

impl DirMediaStore {
    /// Create a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory the store writes into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Relative reference a key would be stored under.
    pub fn reference_for(&self, key: &MediaKey, pixels: &PixelData) -> String {
        format!("{}.{}", key.digest(), pixels.extension())
    }
}

impl MediaStore for DirMediaStore {
    fn persist(&self, key: &MediaKey, pixels: &PixelData) -> Result<String> {
        if pixels.is_empty() {
            return Err(Error::MediaStore(format!(
                "empty crop for {}",
                key.canonical()
            )));
        }

        fs::create_dir_all(&self.root)
            .map_err(|e| Error::MediaStore(format!("{}: {}", self.root.display(), e)))?;

        let reference = self.reference_for(key, pixels);
        let path = self.root.join(&reference);
        fs::write(&path, &pixels.data)
            .map_err(|e| Error::MediaStore(format!("{}: {}", path.display(), e)))?;

        log::debug!("Stored {} as {}", key.canonical(), path.display());
        Ok(reference)
    }
}
