//! Span-to-line and line-to-block grouping.

use super::RegionSpans;
use crate::model::{Block, Line, Span};

/// Lines of one leaf region, top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionLines {
    /// Reading-order rank of the leaf
    pub rank: u32,
    /// Lines in the region
    pub lines: Vec<Line>,
}

/// Groups the spans of each leaf region into lines.
#[derive(Debug, Clone, Copy)]
pub struct LineMerger {
    overlap: f64,
}

impl LineMerger {
    /// `overlap` is the vertical overlap, as a fraction of the shorter
    /// height, above which two spans share a line.
    pub fn new(overlap: f64) -> Self {
        Self { overlap }
    }

    /// Build lines for every region. Regions come out ordered by rank and
    /// lines inside a region by top edge.
    pub fn merge(&self, mut regions: Vec<RegionSpans>) -> Vec<RegionLines> {
        regions.sort_by_key(|r| r.rank);
        regions
            .into_iter()
            .map(|r| RegionLines {
                rank: r.rank,
                lines: self.merge_region(r.spans),
            })
            .collect()
    }

    /// Group one region's spans into lines.
    pub fn merge_region(&self, mut spans: Vec<Span>) -> Vec<Line> {
        if spans.is_empty() {
            return vec![];
        }

        spans.sort_by_key(|s| (s.bbox.y0, s.bbox.x0));

        let mut lines: Vec<Line> = Vec::new();
        let mut current: Vec<Span> = Vec::new();

        for span in spans {
            let joins = current.last().is_some_and(|last| {
                !last.content_type.is_block_level()
                    && !span.content_type.is_block_level()
                    && last.bbox.y_overlap_ratio(&span.bbox) > self.overlap
            });
            if !joins {
                lines.extend(Line::from_spans(std::mem::take(&mut current)));
            }
            current.push(span);
        }
        lines.extend(Line::from_spans(current));

        lines.sort_by_key(|l| l.bbox.y0);
        lines
    }
}

/// Groups consecutive lines of a region into blocks.
#[derive(Debug, Clone, Copy)]
pub struct BlockMerger {
    gap_factor: f64,
    indent_tolerance: i32,
}

impl BlockMerger {
    /// `gap_factor` bounds the vertical gap between lines of one block as a
    /// multiple of the region's median line height; `indent_tolerance`
    /// bounds the left-edge shift between them.
    pub fn new(gap_factor: f64, indent_tolerance: i32) -> Self {
        Self {
            gap_factor,
            indent_tolerance,
        }
    }

    /// Build the page's blocks, region by region in reading order.
    pub fn merge(&self, regions: Vec<RegionLines>) -> Vec<Block> {
        regions
            .into_iter()
            .flat_map(|r| self.merge_region(r.lines))
            .collect()
    }

    /// Group one region's lines into blocks.
    pub fn merge_region(&self, lines: Vec<Line>) -> Vec<Block> {
        if lines.is_empty() {
            return vec![];
        }

        let max_gap = self.gap_factor * median_line_height(&lines);
        let mut blocks: Vec<Block> = Vec::new();
        let mut current: Vec<Line> = Vec::new();

        for line in lines {
            if self.should_break_block(&current, &line, max_gap) {
                blocks.extend(Block::from_lines(std::mem::take(&mut current)));
            }
            current.push(line);
        }
        blocks.extend(Block::from_lines(current));

        blocks
    }

    /// Determine if `line` starts a new block after `current`.
    fn should_break_block(&self, current: &[Line], line: &Line, max_gap: f64) -> bool {
        let Some(prev) = current.last() else {
            return false;
        };

        // Media and display equations stand alone
        if prev.is_block_level() || line.is_block_level() {
            return true;
        }

        let gap = line.bbox.y0.saturating_sub(prev.bbox.y1);
        if f64::from(gap) > max_gap {
            return true;
        }

        let shift = line.bbox.x0.saturating_sub(prev.bbox.x0);
        if shift.saturating_abs() <= self.indent_tolerance {
            return false;
        }

        // An indented first line followed by a flush second line
        let first_line_indent = current.len() == 1 && shift < 0;
        !(first_line_indent && shift.saturating_neg() <= 2 * self.indent_tolerance)
    }
}

/// Median height of the text lines, falling back to all lines.
fn median_line_height(lines: &[Line]) -> f64 {
    let mut heights: Vec<i32> = lines
        .iter()
        .filter(|l| !l.is_block_level())
        .map(|l| l.bbox.height())
        .collect();
    if heights.is_empty() {
        heights = lines.iter().map(|l| l.bbox.height()).collect();
    }
    heights.sort_unstable();

    let mid = heights.len() / 2;
    if heights.len() % 2 == 0 {
        f64::from(heights[mid - 1] + heights[mid]) / 2.0
    } else {
        f64::from(heights[mid])
    }
}
