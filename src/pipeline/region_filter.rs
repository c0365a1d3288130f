//! Header / footer / page-number / footnote removal.

use crate::model::{DropReason, DroppedRecord, RegionBoxes, Span};

/// Moves spans that fall inside removal regions into a [`DroppedRecord`].
#[derive(Debug, Clone, Copy)]
pub struct RegionFilter {
    threshold: f64,
}

impl RegionFilter {
    /// `threshold` is the fraction of a span's area that must lie inside a
    /// region for the span to be dropped.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Split `spans` into survivors and dropped spans.
    ///
    /// Reasons are tried in [`DropReason::ALL`] order and the first match
    /// wins. The result always satisfies
    /// `survivors.len() + dropped.len() == spans.len()`.
    pub fn filter(&self, spans: Vec<Span>, regions: &RegionBoxes) -> (Vec<Span>, DroppedRecord) {
        let mut survivors = Vec::with_capacity(spans.len());
        let mut dropped = DroppedRecord::default();

        for span in spans {
            match self.drop_reason(&span, regions) {
                Some(reason) => dropped.push(span, reason),
                None => survivors.push(span),
            }
        }

        if !dropped.is_empty() {
            log::debug!("Dropped {} spans in removal regions", dropped.len());
        }
        (survivors, dropped)
    }

    fn drop_reason(&self, span: &Span, regions: &RegionBoxes) -> Option<DropReason> {
        DropReason::ALL.into_iter().find(|&reason| {
            regions
                .get(reason)
                .iter()
                .any(|region| span.bbox.overlap_ratio_in(region) > self.threshold)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, ContentType};

    fn bbox(x0: i32, y0: i32, x1: i32, y1: i32) -> BBox {
        BBox::new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_text_in_header_dropped() {
        let regions = RegionBoxes {
            header: vec![bbox(0, 0, 612, 40)],
            ..Default::default()
        };
        let title = Span::text(bbox(50, 10, 200, 30), "Running title");
        let body = Span::text(bbox(50, 100, 200, 112), "Body");

        let (kept, dropped) =
            RegionFilter::new(0.5).filter(vec![title.clone(), body.clone()], &regions);
        assert_eq!(kept, vec![body]);
        assert_eq!(dropped.text.header, vec![title]);
        assert_eq!(dropped.len(), 1);
    }

    #[test]
    fn test_buckets_follow_content_type() {
        let regions = RegionBoxes {
            footer: vec![bbox(0, 700, 612, 792)],
            ..Default::default()
        };
        let spans = vec![
            Span::new(bbox(10, 710, 60, 760), ContentType::Image),
            Span::new(bbox(100, 710, 300, 760), ContentType::Table),
            Span::new(bbox(320, 710, 400, 730), ContentType::InterlineEquation)
                .with_content("E=mc^2"),
        ];
        let (kept, dropped) = RegionFilter::new(0.5).filter(spans, &regions);
        assert!(kept.is_empty());
        assert_eq!(dropped.image.footer.len(), 1);
        assert_eq!(dropped.table.footer.len(), 1);
        // Equations share the text bucket
        assert_eq!(dropped.text.footer.len(), 1);
    }

    #[test]
    fn test_first_reason_wins() {
        let area = bbox(0, 0, 100, 100);
        let regions = RegionBoxes {
            page_no: vec![area],
            footnote: vec![area],
            ..Default::default()
        };
        let span = Span::text(bbox(10, 10, 20, 20), "3");
        let (_, dropped) = RegionFilter::new(0.5).filter(vec![span], &regions);
        assert_eq!(dropped.text.page_no.len(), 1);
        assert!(dropped.text.footnote.is_empty());
    }

    #[test]
    fn test_partial_overlap_kept() {
        let regions = RegionBoxes {
            header: vec![bbox(0, 0, 612, 40)],
            ..Default::default()
        };
        // Only 10 of 30 points of height fall inside the header
        let span = Span::text(bbox(10, 30, 100, 60), "Near the top");
        let (kept, dropped) = RegionFilter::new(0.5).filter(vec![span], &regions);
        assert_eq!(kept.len(), 1);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_conservation() {
        let regions = RegionBoxes {
            header: vec![bbox(0, 0, 612, 50)],
            footer: vec![bbox(0, 740, 612, 792)],
            ..Default::default()
        };
        let spans: Vec<Span> = (0..20)
            .map(|i| Span::text(bbox(10, i * 40, 100, i * 40 + 20), format!("line {}", i)))
            .collect();
        let total = spans.len();
        let (kept, dropped) = RegionFilter::new(0.5).filter(spans, &regions);
        assert_eq!(
            kept.len() + dropped.text.len() + dropped.image.len() + dropped.table.len(),
            total
        );
    }
}
