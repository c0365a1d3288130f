//! Cropping image and table spans to media storage.

use crate::media::{MediaKey, MediaStore, PageRasterizer};
use crate::model::Span;

/// Crops image/table spans and records the stored reference on each span.
///
/// Both collaborators are optional; without either the step is a no-op.
pub struct MediaExtractor<'a> {
    book_id: &'a str,
    rasterizer: Option<&'a dyn PageRasterizer>,
    store: Option<&'a dyn MediaStore>,
}

impl<'a> MediaExtractor<'a> {
    /// Create an extractor for one book.
    pub fn new(
        book_id: &'a str,
        rasterizer: Option<&'a dyn PageRasterizer>,
        store: Option<&'a dyn MediaStore>,
    ) -> Self {
        Self {
            book_id,
            rasterizer,
            store,
        }
    }

    /// Whether both collaborators are present.
    pub fn is_enabled(&self) -> bool {
        self.rasterizer.is_some() && self.store.is_some()
    }

    /// Attach media references to the image and table spans of a page.
    ///
    /// Ordinals count media spans in slice order starting at 0, so the same
    /// input always yields the same keys. A failed crop or store is logged
    /// and leaves the span in place without a reference.
    pub fn extract(&self, page_idx: usize, spans: &mut [Span]) {
        let (Some(rasterizer), Some(store)) = (self.rasterizer, self.store) else {
            return;
        };

        let mut stored = 0usize;
        let mut failed = 0usize;
        let media = spans.iter_mut().filter(|s| s.content_type.is_media());

        for (ordinal, span) in media.enumerate() {
            let key = MediaKey::new(self.book_id, page_idx, ordinal, span.content_type);
            let result = rasterizer
                .crop(page_idx, &span.bbox)
                .and_then(|pixels| store.persist(&key, &pixels));

            match result {
                Ok(reference) => {
                    span.image_path = Some(reference);
                    stored += 1;
                }
                Err(e) => {
                    log::warn!(
                        "Page {}: could not store {} {} at {}: {}",
                        page_idx,
                        span.content_type,
                        ordinal,
                        span.bbox,
                        e
                    );
                    span.image_path = None;
                    failed += 1;
                }
            }
        }

        log::debug!(
            "Page {}: stored {} media crops, {} failed",
            page_idx,
            stored,
            failed
        );
    }
}
