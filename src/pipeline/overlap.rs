//! Duplicate span removal.

use crate::model::Span;

/// Discards the smaller of two spans that overlap heavily.
///
/// The detector often reports nested boxes at different granularities (a
/// whole table and one of its cells). Only the larger box survives.
#[derive(Debug, Clone, Copy)]
pub struct OverlapResolver {
    threshold: f64,
}

impl OverlapResolver {
    /// `threshold` is the intersection area over the smaller box's area
    /// above which two spans count as duplicates.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Remove duplicates, keeping the survivors in input order.
    ///
    /// On equal areas the later span is discarded. Running this again on
    /// its own output removes nothing.
    pub fn resolve(&self, spans: Vec<Span>) -> Vec<Span> {
        let mut removed = vec![false; spans.len()];

        for i in 0..spans.len() {
            if removed[i] {
                continue;
            }
            for j in (i + 1)..spans.len() {
                if removed[j] {
                    continue;
                }
                let ratio = spans[i].bbox.overlap_ratio_of_smaller(&spans[j].bbox);
                if ratio <= self.threshold {
                    continue;
                }
                if spans[j].area() > spans[i].area() {
                    removed[i] = true;
                    break;
                }
                removed[j] = true;
            }
        }

        let before = spans.len();
        let kept: Vec<Span> = spans
            .into_iter()
            .zip(removed)
            .filter_map(|(span, gone)| (!gone).then_some(span))
            .collect();

        if kept.len() < before {
            log::debug!("Removed {} duplicate spans", before - kept.len());
        }
        kept
    }
}
