//! Media collaborators: page rasterization and crop persistence.
//!
//! The layout pipeline never touches pixels itself. It asks a
//! [`PageRasterizer`] for the pixels under an image or table span and hands
//! them to a [`MediaStore`], which returns a stable reference.

mod pixels;
mod store;

pub use pixels::PixelData;
pub use store::DirMediaStore;

use md5::{Digest, Md5};

use crate::error::Result;
use crate::model::{BBox, ContentType};

/// Produces pixel data for a region of a page.
pub trait PageRasterizer: Send + Sync {
    /// Crop `bbox` (page points) out of page `page_idx`.
    fn crop(&self, page_idx: usize, bbox: &BBox) -> Result<PixelData>;
}

/// Persists cropped media and returns a stable reference.
pub trait MediaStore: Send + Sync {
    /// Store `pixels` under `key`, returning a path or key for later lookup.
    fn persist(&self, key: &MediaKey, pixels: &PixelData) -> Result<String>;
}

/// Deterministic identity of one cropped media item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaKey {
    /// Book / document identifier
    pub book_id: String,
    /// Page index (0-based)
    pub page_idx: usize,
    /// Position among the page's media spans (0-based)
    pub ordinal: usize,
    /// Image or table
    pub content_type: ContentType,
}

impl MediaKey {
    /// Create a media key.
    pub fn new(
        book_id: impl Into<String>,
        page_idx: usize,
        ordinal: usize,
        content_type: ContentType,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            page_idx,
            ordinal,
            content_type,
        }
    }

    /// Canonical string form, `book/page/ordinal`.
    pub fn canonical(&self) -> String {
        format!("{}/{}/{}", self.book_id, self.page_idx, self.ordinal)
    }

    /// Hex md5 of the canonical form, usable as a file stem.
    pub fn digest(&self) -> String {
        let hash = Md5::digest(self.canonical().as_bytes());
        hash.iter().map(|b| format!("{:02x}", b)).collect()
    }
}
