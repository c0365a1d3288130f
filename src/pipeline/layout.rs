//! Column detection cleanup and reading-order tree construction.
//!
//! Column and sub-column detections are noisy: near-duplicates, boxes that
//! poke slightly into their neighbour, and full-width bands crossing tall
//! columns. [`LayoutRegionBuilder`] reconciles them into regions that are
//! pairwise either disjoint or nested, arranges them in a tree under the
//! page, fills vertical gaps, and ranks every node in reading order.

use std::cmp::Ordering;

use super::CoordinateScaler;
use crate::model::{BBox, LayoutRegion, LayoutTree, RegionId, RegionKind, Span};
use crate::provider::{Category, RawDetection};

/// Upper bound on conflict-resolution rounds per page.
const MAX_ROUNDS: usize = 256;

/// A column region during conflict resolution.
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    bbox: BBox,
    kind: RegionKind,
    score: Option<f64>,
}

/// Repair for one conflicting pair of candidates.
#[derive(Debug, Clone, PartialEq)]
enum Fix {
    /// Remove the candidate at this index
    Drop(usize),
    /// Replace candidate boxes
    Reshape(Vec<(usize, BBox)>),
    /// Cut `overlap` out of the candidate at `loser`
    Cut { loser: usize, overlap: BBox },
}

/// Spans assigned to one leaf region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSpans {
    /// Leaf region id
    pub region: RegionId,
    /// Reading-order rank of the leaf
    pub rank: u32,
    /// Spans whose home is this leaf
    pub spans: Vec<Span>,
}

/// Builds the reading-order tree of a page.
#[derive(Debug, Clone, Copy)]
pub struct LayoutRegionBuilder {
    duplicate_iou: f64,
    containment_ratio: f64,
}

impl LayoutRegionBuilder {
    /// Regions with IoU at or above `duplicate_iou` are duplicates; a region
    /// with at least `containment_ratio` of its area inside another is
    /// nested in it.
    pub fn new(duplicate_iou: f64, containment_ratio: f64) -> Self {
        Self {
            duplicate_iou,
            containment_ratio,
        }
    }

    /// Build the tree for one page from its column detections.
    pub fn build(
        &self,
        page_idx: usize,
        page: BBox,
        scaler: &CoordinateScaler,
        detections: &[RawDetection],
    ) -> LayoutTree {
        let candidates = collect_candidates(page_idx, page, scaler, detections);
        let regions = self.resolve_conflicts(page_idx, candidates);

        let mut tree = LayoutTree::new(page);
        insert_regions(&mut tree, regions);
        let root = tree.root();
        add_fillers(&mut tree, root);
        order_children(&mut tree, root);
        tree.assign_ranks();

        log::debug!(
            "Page {}: layout tree with {} regions, {} leaves",
            page_idx,
            tree.len(),
            tree.leaves().len()
        );
        tree
    }

    /// Repair conflicts one at a time until every pair of regions is
    /// disjoint or nested.
    fn resolve_conflicts(&self, page_idx: usize, mut regions: Vec<Candidate>) -> Vec<Candidate> {
        for _ in 0..MAX_ROUNDS {
            match self.first_conflict(&regions) {
                Some(fix) => apply_fix(&mut regions, fix),
                None => return regions,
            }
        }
        log::warn!(
            "Page {}: column conflicts still unresolved after {} rounds",
            page_idx,
            MAX_ROUNDS
        );
        regions
    }

    fn first_conflict(&self, regions: &[Candidate]) -> Option<Fix> {
        for i in 0..regions.len() {
            for j in (i + 1)..regions.len() {
                let (a, b) = (&regions[i], &regions[j]);
                let Some(inter) = a.bbox.intersection(&b.bbox) else {
                    continue;
                };

                if a.bbox.iou(&b.bbox) >= self.duplicate_iou {
                    // Lower score goes; on a tie the later one
                    let drop_first =
                        matches!(b.score.partial_cmp(&a.score), Some(Ordering::Greater));
                    return Some(Fix::Drop(if drop_first { i } else { j }));
                }

                if a.bbox.overlap_ratio_of_smaller(&b.bbox) >= self.containment_ratio {
                    let child = if b.bbox.area() > a.bbox.area() { i } else { j };
                    if regions[child].bbox == inter {
                        continue;
                    }
                    return Some(Fix::Reshape(vec![(child, inter)]));
                }

                return Some(partial_overlap_fix(i, j, &a.bbox, &b.bbox, inter));
            }
        }
        None
    }
}

fn apply_fix(regions: &mut Vec<Candidate>, fix: Fix) {
    match fix {
        Fix::Drop(index) => {
            let dropped = regions.remove(index);
            log::debug!("Dropped duplicate column region {}", dropped.bbox);
        }
        Fix::Reshape(boxes) => {
            for (index, bbox) in boxes {
                regions[index].bbox = bbox;
            }
        }
        Fix::Cut { loser, overlap } => {
            let region = regions.remove(loser);
            let fragments = region.bbox.subtract(&overlap);
            log::debug!(
                "Split column region {} into {} fragments",
                region.bbox,
                fragments.len()
            );
            for (n, bbox) in fragments.into_iter().enumerate() {
                let fragment = Candidate {
                    bbox,
                    ..region.clone()
                };
                regions.insert(loser + n, fragment);
            }
        }
    }
}

/// Repair for two regions that overlap without either containing the other.
///
/// Regions that straddle each other's edge are split at the middle of the
/// overlap, across the thinner side of the overlap when they straddle on
/// both axes. Regions that cross (a wide band over a tall column) leave
/// the overlap to the region whose centre line runs closer to it; the other
/// region is cut around it.
fn partial_overlap_fix(i: usize, j: usize, a: &BBox, b: &BBox, inter: BBox) -> Fix {
    let straddle_x = straddles(a.x0, a.x1, b.x0, b.x1);
    let straddle_y = straddles(a.y0, a.y1, b.y0, b.y1);

    let split = match (straddle_x, straddle_y) {
        (true, true) if inter.width() <= inter.height() => split_x(i, j, a, b, inter),
        (true, true) => split_y(i, j, a, b, inter),
        (true, false) => split_x(i, j, a, b, inter),
        (false, true) => split_y(i, j, a, b, inter),
        (false, false) => None,
    };
    if let Some(fix) = split {
        return fix;
    }

    let loser = if axis_distance(b, &inter) < axis_distance(a, &inter) {
        i
    } else {
        j
    };
    Fix::Cut {
        loser,
        overlap: inter,
    }
}

/// Whether each range holds exactly one end of the other.
fn straddles(a0: i32, a1: i32, b0: i32, b1: i32) -> bool {
    (a0 < b0 && b0 < a1 && a1 < b1) || (b0 < a0 && a0 < b1 && b1 < a1)
}

fn split_x(i: usize, j: usize, a: &BBox, b: &BBox, inter: BBox) -> Option<Fix> {
    let mid = inter.x0 + inter.width() / 2;
    let ((li, left), (ri, right)) = if a.x0 < b.x0 {
        ((i, a), (j, b))
    } else {
        ((j, b), (i, a))
    };
    let left = BBox::new(left.x0, left.y0, mid, left.y1)?;
    let right = BBox::new(mid, right.y0, right.x1, right.y1)?;
    Some(Fix::Reshape(vec![(li, left), (ri, right)]))
}

fn split_y(i: usize, j: usize, a: &BBox, b: &BBox, inter: BBox) -> Option<Fix> {
    let mid = inter.y0 + inter.height() / 2;
    let ((ui, upper), (li, lower)) = if a.y0 < b.y0 {
        ((i, a), (j, b))
    } else {
        ((j, b), (i, a))
    };
    let upper = BBox::new(upper.x0, upper.y0, upper.x1, mid)?;
    let lower = BBox::new(lower.x0, mid, lower.x1, lower.y1)?;
    Some(Fix::Reshape(vec![(ui, upper), (li, lower)]))
}

/// Distance from the overlap's centre to a region's centre line, relative to
/// the region's thickness. Wide regions run horizontally, tall ones
/// vertically.
fn axis_distance(region: &BBox, overlap: &BBox) -> f64 {
    if region.width() >= region.height() {
        (overlap.center_y2() - region.center_y2()).abs() as f64 / f64::from(region.height())
    } else {
        (overlap.center_x2() - region.center_x2()).abs() as f64 / f64::from(region.width())
    }
}

/// Scale and clamp the column detections of a page.
fn collect_candidates(
    page_idx: usize,
    page: BBox,
    scaler: &CoordinateScaler,
    detections: &[RawDetection],
) -> Vec<Candidate> {
    detections
        .iter()
        .filter_map(|det| {
            let kind = match det.category() {
                Some(Category::FullColumn) => RegionKind::FullColumn,
                Some(Category::SubColumn) => RegionKind::SubColumn,
                other => {
                    log::debug!(
                        "Page {}: ignoring non-column subfield detection {:?}",
                        page_idx,
                        other
                    );
                    return None;
                }
            };
            let bbox = det
                .poly
                .as_deref()
                .and_then(|p| scaler.scale_polygon(p))
                .and_then(|b| b.intersection(&page));
            if bbox.is_none() {
                log::warn!(
                    "Page {}: column detection without a usable polygon, skipping",
                    page_idx
                );
            }
            Some(Candidate {
                bbox: bbox?,
                kind,
                score: det.score,
            })
        })
        .collect()
}

/// Insert regions largest first, each under the smallest node containing it.
fn insert_regions(tree: &mut LayoutTree, mut regions: Vec<Candidate>) {
    regions.sort_by(|a, b| {
        b.bbox
            .area()
            .cmp(&a.bbox.area())
            .then_with(|| (a.bbox.y0, a.bbox.x0).cmp(&(b.bbox.y0, b.bbox.x0)))
            .then_with(|| a.bbox.cmp(&b.bbox))
    });

    for region in regions {
        let mut parent = tree.root();
        loop {
            let next = children_of(tree, parent)
                .into_iter()
                .filter_map(|id| tree.get(id).map(|r| (id, r.bbox)))
                .filter(|(_, bbox)| bbox.contains(&region.bbox))
                .min_by_key(|(id, bbox)| (bbox.area(), *id));
            match next {
                Some((id, _)) => parent = id,
                None => break,
            }
        }
        tree.add_child(
            parent,
            LayoutRegion::new(region.bbox, region.kind, region.score),
        );
    }
}

fn children_of(tree: &LayoutTree, id: RegionId) -> Vec<RegionId> {
    tree.get(id).map(|r| r.children.clone()).unwrap_or_default()
}

/// Cover the vertical stretches of every internal node that none of its
/// children reach with full-width filler leaves.
fn add_fillers(tree: &mut LayoutTree, id: RegionId) {
    let children = children_of(tree, id);
    if children.is_empty() {
        return;
    }
    let Some(bbox) = tree.get(id).map(|r| r.bbox) else {
        return;
    };

    let mut ranges: Vec<(i32, i32)> = children
        .iter()
        .filter_map(|c| tree.get(*c).map(|r| (r.bbox.y0, r.bbox.y1)))
        .collect();
    ranges.sort_unstable();

    let mut gaps = Vec::new();
    let mut cursor = bbox.y0;
    for (y0, y1) in ranges {
        if y0 > cursor {
            gaps.push((cursor, y0));
        }
        cursor = cursor.max(y1);
    }
    if cursor < bbox.y1 {
        gaps.push((cursor, bbox.y1));
    }

    for (y0, y1) in gaps {
        if let Some(filler) = BBox::new(bbox.x0, y0, bbox.x1, y1) {
            tree.add_child(id, LayoutRegion::new(filler, RegionKind::Filler, None));
        }
    }

    for child in children {
        add_fillers(tree, child);
    }
}

/// Order the children of every node: top-to-bottom bands of vertically
/// overlapping regions, left-to-right inside a band.
fn order_children(tree: &mut LayoutTree, id: RegionId) {
    let children = children_of(tree, id);
    if children.is_empty() {
        return;
    }

    let mut entries: Vec<(BBox, RegionId)> = children
        .iter()
        .filter_map(|c| tree.get(*c).map(|r| (r.bbox, *c)))
        .collect();
    entries.sort_by_key(|(b, c)| (b.y0, b.x0, b.y1, b.x1, *c));

    let mut ordered = Vec::with_capacity(entries.len());
    let mut band: Vec<(BBox, RegionId)> = Vec::new();
    let mut band_end = i32::MIN;
    for entry in entries {
        if !band.is_empty() && entry.0.y0 >= band_end {
            flush_band(&mut band, &mut ordered);
        }
        band_end = if band.is_empty() {
            entry.0.y1
        } else {
            band_end.max(entry.0.y1)
        };
        band.push(entry);
    }
    flush_band(&mut band, &mut ordered);

    tree.set_children(id, ordered.clone());
    for child in ordered {
        order_children(tree, child);
    }
}

fn flush_band(band: &mut Vec<(BBox, RegionId)>, ordered: &mut Vec<RegionId>) {
    band.sort_by_key(|(b, c)| (b.x0, b.y0, b.x1, b.y1, *c));
    ordered.extend(band.drain(..).map(|(_, c)| c));
}

/// Distribute spans over the leaves of `tree`.
///
/// A span goes to the leaf it overlaps most, or to the leaf with the
/// nearest centre when it overlaps none. Ties go to the earlier leaf in
/// reading order. Every span is assigned; leaves are returned in reading
/// order, each with its spans in input order.
pub fn assign_spans(tree: &LayoutTree, spans: Vec<Span>) -> Vec<RegionSpans> {
    let mut assigned: Vec<RegionSpans> = tree
        .leaves()
        .into_iter()
        .filter_map(|id| {
            tree.get(id).map(|r| RegionSpans {
                region: id,
                rank: r.rank,
                spans: Vec::new(),
            })
        })
        .collect();
    let boxes: Vec<BBox> = assigned
        .iter()
        .filter_map(|a| tree.get(a.region).map(|r| r.bbox))
        .collect();
    if boxes.is_empty() {
        return assigned;
    }

    for span in spans {
        let best_overlap = boxes
            .iter()
            .enumerate()
            .map(|(n, b)| (span.bbox.intersection_area(b), n))
            .filter(|(area, _)| *area > 0)
            .min_by_key(|(area, n)| (std::cmp::Reverse(*area), *n))
            .map(|(_, n)| n);

        let home = best_overlap.or_else(|| {
            boxes
                .iter()
                .enumerate()
                .min_by_key(|(n, b)| (span.bbox.center_distance2(b), *n))
                .map(|(n, _)| n)
        });

        if let Some(n) = home {
            assigned[n].spans.push(span);
        }
    }
    assigned
}
