//! Equation alignment and reclassification.
//!
//! The formula detector reports inline equations with a box that rarely
//! lines up with the surrounding OCR text, and sometimes tags an inline
//! formula as an interline one. Both are fixed here, before any span is
//! merged into a line.

use crate::model::{BBox, ContentType, Span};

/// Aligns inline equations to their text line and retags misdetected
/// interline equations.
///
/// Neighbours are searched on the same visual line only, and no further
/// away horizontally than `max_gap_factor` times the equation's height, so
/// text across a column gutter is not mistaken for a neighbour.
#[derive(Debug, Clone, Copy)]
pub struct InlineEquationNormalizer {
    line_overlap: f64,
    max_height_factor: f64,
    max_gap_factor: f64,
}

impl InlineEquationNormalizer {
    /// `line_overlap` is the vertical overlap ratio for two spans to share a
    /// line; `max_height_factor` bounds how much taller than its neighbour
    /// an interline equation may be and still be retagged.
    pub fn new(line_overlap: f64, max_height_factor: f64) -> Self {
        Self {
            line_overlap,
            max_height_factor,
            max_gap_factor: 2.0,
        }
    }

    /// Set the largest horizontal gap to a neighbour, as a multiple of the
    /// equation's height.
    pub fn with_max_gap_factor(mut self, factor: f64) -> Self {
        self.max_gap_factor = factor;
        self
    }

    /// Run both passes. The result is sorted by top edge then left edge.
    pub fn normalize(&self, mut spans: Vec<Span>) -> Vec<Span> {
        spans.sort_by_key(|s| (s.bbox.y0, s.bbox.x0));
        self.align_inline(&mut spans);
        self.retag_interline(&mut spans);
        spans
    }

    /// Copy the vertical extent of the nearest text neighbour on the same
    /// line onto each inline equation, preferring the left neighbour.
    ///
    /// An equation that would end up inside its neighbour's box keeps its
    /// own box and is separated from the text by the de-overlap pass.
    fn align_inline(&self, spans: &mut [Span]) {
        let mut aligned = 0usize;
        for i in 0..spans.len() {
            if spans[i].content_type != ContentType::InlineEquation {
                continue;
            }
            let eq = spans[i].bbox;
            let neighbour = self.nearest_on_line(spans, i, |t| t == ContentType::Text);
            let Some(neighbour) = neighbour else {
                continue;
            };
            if let Some(target) = eq.with_y(neighbour.y0, neighbour.y1) {
                if target != eq && !neighbour.contains(&target) {
                    spans[i].bbox = target;
                    aligned += 1;
                }
            }
        }
        if aligned > 0 {
            log::debug!("Aligned {} inline equations to their text line", aligned);
        }
    }

    /// Retag interline equations that sit inside a text line.
    fn retag_interline(&self, spans: &mut [Span]) {
        let mut retagged = 0usize;
        for i in 0..spans.len() {
            if spans[i].content_type != ContentType::InterlineEquation {
                continue;
            }
            let eq = spans[i].bbox;
            let Some(neighbour) = self.nearest_on_line(spans, i, ContentType::is_inline) else {
                continue;
            };
            if f64::from(eq.height()) > self.max_height_factor * f64::from(neighbour.height()) {
                continue;
            }
            let Some(target) = eq.with_y(neighbour.y0, neighbour.y1) else {
                continue;
            };
            spans[i].bbox = target;
            spans[i].content_type = ContentType::InlineEquation;
            retagged += 1;
        }
        if retagged > 0 {
            log::debug!("Retagged {} interline equations as inline", retagged);
        }
    }

    /// The nearest span on the same line as `spans[index]` whose type
    /// passes `accept`: the closest one to the left, else the closest one
    /// to the right. Ties go to the earlier span. Spans beyond the gap
    /// bound are ignored.
    fn nearest_on_line<F>(&self, spans: &[Span], index: usize, accept: F) -> Option<BBox>
    where
        F: Fn(ContentType) -> bool,
    {
        let eq = spans[index].bbox;
        let max_gap = self.max_gap_factor * f64::from(eq.height());
        let on_line = spans.iter().enumerate().filter(|(j, s)| {
            *j != index && accept(s.content_type) && eq.y_overlap_ratio(&s.bbox) > self.line_overlap
        });

        let mut left: Option<(i32, usize, BBox)> = None;
        let mut right: Option<(i32, usize, BBox)> = None;
        for (j, s) in on_line {
            let b = s.bbox;
            if b.center_x2() < eq.center_x2() {
                let gap = eq.x0.saturating_sub(b.x1);
                if f64::from(gap) > max_gap {
                    continue;
                }
                if left.map_or(true, |(g, k, _)| (gap, j) < (g, k)) {
                    left = Some((gap, j, b));
                }
            } else {
                let gap = b.x0.saturating_sub(eq.x1);
                if f64::from(gap) > max_gap {
                    continue;
                }
                if right.map_or(true, |(g, k, _)| (gap, j) < (g, k)) {
                    right = Some((gap, j, b));
                }
            }
        }

        left.or(right).map(|(_, _, b)| b)
    }
}
