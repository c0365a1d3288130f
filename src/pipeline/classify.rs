//! Raw detections to typed spans.

use super::CoordinateScaler;
use crate::error::{Error, Result};
use crate::model::{BBox, ContentType, Span};
use crate::provider::{Category, RawDetection};

/// Turns a page's raw detections into spans.
///
/// Only image, table, equation and text detections become spans. Removal
/// regions come from their own providers and column markers feed the
/// layout builder, so both are ignored here. Span boxes are clipped to the
/// page; a detection lying entirely off the page is malformed.
#[derive(Debug, Clone, Copy)]
pub struct SpanClassifier<'a> {
    page_idx: usize,
    scaler: &'a CoordinateScaler,
    page: BBox,
}

impl<'a> SpanClassifier<'a> {
    /// Create a classifier for one page.
    pub fn new(page_idx: usize, scaler: &'a CoordinateScaler, page: BBox) -> Self {
        Self {
            page_idx,
            scaler,
            page,
        }
    }

    /// Classify every detection, skipping malformed entries with a warning.
    pub fn classify(&self, detections: &[RawDetection]) -> Vec<Span> {
        let mut spans = Vec::with_capacity(detections.len());
        for (i, det) in detections.iter().enumerate() {
            match self.classify_one(det) {
                Ok(Some(span)) => spans.push(span),
                Ok(None) => {}
                Err(e) => log::warn!("Page {}: detection {}: {}, skipping", self.page_idx, i, e),
            }
        }

        log::debug!(
            "Page {}: classified {} spans from {} detections",
            self.page_idx,
            spans.len(),
            detections.len()
        );
        spans
    }

    /// `Ok(None)` for detections that are not spans.
    fn classify_one(&self, det: &RawDetection) -> Result<Option<Span>> {
        let malformed = |msg: String| Error::MalformedDetection(msg);

        let id = det
            .category_id
            .ok_or_else(|| malformed("no category".to_string()))?;
        let Some(category) = Category::from_id(id) else {
            log::debug!("Page {}: unknown category {}", self.page_idx, id);
            return Ok(None);
        };
        if !Category::SPAN_CATEGORIES.contains(&category) {
            return Ok(None);
        }
        let Some(content_type) = category.content_type() else {
            return Ok(None);
        };

        let poly = det
            .poly
            .as_deref()
            .ok_or_else(|| malformed(format!("{} without polygon", content_type)))?;
        let bbox = self.scaler.scale_polygon(poly).ok_or_else(|| {
            malformed(format!("{} with unusable polygon {:?}", content_type, poly))
        })?;
        let bbox = bbox
            .intersection(&self.page)
            .ok_or_else(|| malformed(format!("{} outside the page: {}", content_type, bbox)))?;

        let content = match content_type {
            ContentType::Text => det.text.clone(),
            ContentType::InlineEquation | ContentType::InterlineEquation => det.latex.clone(),
            ContentType::Image | ContentType::Table => {
                return Ok(Some(Span::new(bbox, content_type)));
            }
        };
        let content =
            content.ok_or_else(|| malformed(format!("{} without content", content_type)))?;

        Ok(Some(Span::new(bbox, content_type).with_content(content)))
    }
}
