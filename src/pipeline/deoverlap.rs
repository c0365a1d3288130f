//! Residual bbox collision removal.

use crate::model::{BBox, Span};

/// Clips spans so that no two of them share more than `tolerance` square
/// points.
///
/// Spans are visited top to bottom, left to right. A span colliding with an
/// earlier one is clipped so that it abuts it; only when that would leave
/// nothing of the later span is the earlier span clipped instead. Two spans
/// with the same box share it, split across its longer side. Clipping only
/// ever shrinks boxes, so one pass is enough.
#[derive(Debug, Clone, Copy)]
pub struct DeoverlapResolver {
    tolerance: i64,
}

impl DeoverlapResolver {
    /// Create a resolver tolerating `tolerance` square points of overlap.
    pub fn new(tolerance: i64) -> Self {
        Self { tolerance }
    }

    /// Clip every collision. No span is removed; the result is sorted by
    /// top edge then left edge.
    pub fn resolve(&self, mut spans: Vec<Span>) -> Vec<Span> {
        spans.sort_by_key(|s| (s.bbox.y0, s.bbox.x0));

        let mut accepted: Vec<Span> = Vec::with_capacity(spans.len());
        let mut clipped = 0usize;

        for mut span in spans {
            for earlier in accepted.iter_mut() {
                let overlap = span.bbox.intersection_area(&earlier.bbox);
                if overlap == 0 || overlap <= self.tolerance {
                    continue;
                }

                clipped += 1;
                if span.bbox == earlier.bbox {
                    match split_in_two(&span.bbox) {
                        Some((first, second)) => {
                            earlier.bbox = first;
                            span.bbox = second;
                        }
                        None => log::warn!(
                            "Cannot separate {} and {} spans sharing {}",
                            earlier.content_type,
                            span.content_type,
                            span.bbox
                        ),
                    }
                } else if let Some(b) = clip_against(&span.bbox, &earlier.bbox) {
                    span.bbox = b;
                } else if let Some(b) = largest_remainder(&earlier.bbox, &span.bbox) {
                    earlier.bbox = b;
                }
            }
            accepted.push(span);
        }

        if clipped > 0 {
            log::debug!("Clipped {} overlapping span pairs", clipped);
        }
        accepted
    }
}

/// Shrink `moving` so that it abuts `fixed`.
///
/// The axis with the thinner overlap is tried first and, on each axis, the
/// side `moving`'s centre lies on. Returns `None` when every option leaves
/// a zero-area box, i.e. `moving` lies inside `fixed`.
fn clip_against(moving: &BBox, fixed: &BBox) -> Option<BBox> {
    let inter = moving.intersection(fixed)?;

    let before_x = BBox::new(moving.x0, moving.y0, fixed.x0, moving.y1);
    let after_x = BBox::new(fixed.x1, moving.y0, moving.x1, moving.y1);
    let before_y = BBox::new(moving.x0, moving.y0, moving.x1, fixed.y0);
    let after_y = BBox::new(moving.x0, fixed.y1, moving.x1, moving.y1);

    let horizontal = if moving.center_x2() < fixed.center_x2() {
        [before_x, after_x]
    } else {
        [after_x, before_x]
    };
    let vertical = if moving.center_y2() < fixed.center_y2() {
        [before_y, after_y]
    } else {
        [after_y, before_y]
    };

    let ordered = if inter.height() > inter.width() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    ordered.into_iter().flatten().flatten().next()
}

/// Halves of `b` across its longer side: top and bottom when it is at least
/// as tall as wide, else left and right. `None` for a one-point box.
fn split_in_two(b: &BBox) -> Option<(BBox, BBox)> {
    if b.height() >= b.width() {
        let mid = b.y0 + b.height() / 2;
        Some((b.with_y(b.y0, mid)?, b.with_y(mid, b.y1)?))
    } else {
        let mid = b.x0 + b.width() / 2;
        Some((
            BBox::new(b.x0, b.y0, mid, b.y1)?,
            BBox::new(mid, b.y0, b.x1, b.y1)?,
        ))
    }
}

/// The largest part of `target` left after removing `cut` along one axis.
/// Ties keep the earliest of top, bottom, left, right.
fn largest_remainder(target: &BBox, cut: &BBox) -> Option<BBox> {
    [
        BBox::new(target.x0, target.y0, target.x1, cut.y0),
        BBox::new(target.x0, cut.y1, target.x1, target.y1),
        BBox::new(target.x0, target.y0, cut.x0, target.y1),
        BBox::new(cut.x1, target.y0, target.x1, target.y1),
    ]
    .into_iter()
    .flatten()
    .fold(None, |best: Option<BBox>, b| match best {
        Some(best) if best.area() >= b.area() => Some(best),
        _ => Some(b),
    })
}
