//! Page-level types.

use serde::{Deserialize, Serialize};

use super::{BBox, ContentType, LayoutTree, Span};

/// Page dimensions in points (1 point = 1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    /// Page width in points
    pub width: f64,
    /// Page height in points
    pub height: f64,
}

impl PageSize {
    /// Create a page size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(612.0, 792.0)
    }

    /// A4 (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(595.0, 842.0)
    }

    /// The whole page as a box, or `None` for a page smaller than a point.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::new(0, 0, self.width as i32, self.height as i32)
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

/// Spans sharing a visual line, ordered left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Union of the member span boxes
    pub bbox: BBox,
    /// Member spans, left to right
    pub spans: Vec<Span>,
}

impl Line {
    /// Build a line, sorting spans left to right. Returns `None` for no spans.
    pub fn from_spans(mut spans: Vec<Span>) -> Option<Self> {
        spans.sort_by_key(|s| (s.bbox.x0, s.bbox.y0));
        let bbox = BBox::union_all(spans.iter().map(|s| &s.bbox))?;
        Some(Self { bbox, spans })
    }

    /// Whether the line is a single image, table or interline equation.
    pub fn is_block_level(&self) -> bool {
        self.spans.len() == 1 && self.spans[0].content_type.is_block_level()
    }

    /// Text of the line's text and equation spans, space separated.
    pub fn text(&self) -> String {
        self.spans
            .iter()
            .filter_map(|s| s.content.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Lines grouped into one block, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Union of the member line boxes
    pub bbox: BBox,
    /// Member lines, top to bottom
    pub lines: Vec<Line>,
}

impl Block {
    /// Build a block from lines already in reading order.
    pub fn from_lines(lines: Vec<Line>) -> Option<Self> {
        let bbox = BBox::union_all(lines.iter().map(|l| &l.bbox))?;
        Some(Self { bbox, lines })
    }

    /// All spans of the block in reading order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }

    /// Text of the block, lines joined with spaces.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Why a span was removed from the page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Inside a page-number region
    PageNo,
    /// Inside a running header
    Header,
    /// Inside a running footer
    Footer,
    /// Inside a footnote
    Footnote,
}

impl DropReason {
    /// All reasons in attribution priority order.
    pub const ALL: [DropReason; 4] = [
        DropReason::PageNo,
        DropReason::Header,
        DropReason::Footer,
        DropReason::Footnote,
    ];
}

/// The four kinds of removal regions for one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionBoxes {
    /// Page-number regions
    pub page_no: Vec<BBox>,
    /// Header regions
    pub header: Vec<BBox>,
    /// Footer regions
    pub footer: Vec<BBox>,
    /// Footnote regions
    pub footnote: Vec<BBox>,
}

impl RegionBoxes {
    /// Regions for one reason.
    pub fn get(&self, reason: DropReason) -> &[BBox] {
        match reason {
            DropReason::PageNo => &self.page_no,
            DropReason::Header => &self.header,
            DropReason::Footer => &self.footer,
            DropReason::Footnote => &self.footnote,
        }
    }

    /// Total number of regions.
    pub fn len(&self) -> usize {
        self.page_no.len() + self.header.len() + self.footer.len() + self.footnote.len()
    }

    /// Check if no removal regions are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dropped spans of one content bucket, split by reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedBucket {
    /// Dropped for overlapping a page-number region
    pub page_no: Vec<Span>,
    /// Dropped for overlapping a header
    pub header: Vec<Span>,
    /// Dropped for overlapping a footer
    pub footer: Vec<Span>,
    /// Dropped for overlapping a footnote
    pub footnote: Vec<Span>,
}

impl DroppedBucket {
    fn reason_mut(&mut self, reason: DropReason) -> &mut Vec<Span> {
        match reason {
            DropReason::PageNo => &mut self.page_no,
            DropReason::Header => &mut self.header,
            DropReason::Footer => &mut self.footer,
            DropReason::Footnote => &mut self.footnote,
        }
    }

    /// Number of spans in the bucket.
    pub fn len(&self) -> usize {
        self.page_no.len() + self.header.len() + self.footer.len() + self.footnote.len()
    }

    /// Check if the bucket holds no spans.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Audit record of spans removed by region filtering.
///
/// Equation spans are recorded in the `text` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedRecord {
    /// Dropped text and equation spans
    pub text: DroppedBucket,
    /// Dropped image spans
    pub image: DroppedBucket,
    /// Dropped table spans
    pub table: DroppedBucket,
}

impl DroppedRecord {
    /// Record a span under its content bucket and reason.
    pub fn push(&mut self, span: Span, reason: DropReason) {
        let bucket = match span.content_type {
            ContentType::Image => &mut self.image,
            ContentType::Table => &mut self.table,
            ContentType::Text | ContentType::InlineEquation | ContentType::InterlineEquation => {
                &mut self.text
            }
        };
        bucket.reason_mut(reason).push(span);
    }

    /// Total number of dropped spans.
    pub fn len(&self) -> usize {
        self.text.len() + self.image.len() + self.table.len()
    }

    /// Check if nothing was dropped.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Flattened media and equation spans of a page, for export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaRecord {
    /// Image spans in reading order
    pub images: Vec<Span>,
    /// Table spans in reading order
    pub tables: Vec<Span>,
    /// Interline equation spans in reading order
    pub interline_equations: Vec<Span>,
    /// Inline equation spans in reading order
    pub inline_equations: Vec<Span>,
}

/// Structured result for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page index (0-based)
    pub page_idx: usize,

    /// Page dimensions in points
    pub page_size: PageSize,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,

    /// Leaf layout regions in reading order
    pub layout_bboxes: Vec<BBox>,

    /// Full column / reading-order tree
    pub layout_tree: LayoutTree,

    /// Flattened media and equation spans
    #[serde(flatten)]
    pub qa: QaRecord,

    /// Spans removed by region filtering
    pub dropped: DroppedRecord,

    /// Regions used for removal
    pub removed_regions: RegionBoxes,
}

impl PageRecord {
    /// All spans in the final blocks, in reading order.
    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.blocks.iter().flat_map(|b| b.spans())
    }

    /// Get plain text content of the page.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Check if the page has no content blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(x0: i32, y0: i32, x1: i32, y1: i32) -> BBox {
        BBox::new(x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_line_sorts_left_to_right() {
        let line = Line::from_spans(vec![
            Span::text(bbox(50, 0, 80, 10), "world"),
            Span::text(bbox(0, 1, 40, 11), "hello"),
        ])
        .unwrap();
        assert_eq!(line.text(), "hello world");
        assert_eq!(line.bbox, bbox(0, 0, 80, 11));
        assert!(Line::from_spans(vec![]).is_none());
    }

    #[test]
    fn test_block_level_line() {
        let line = Line::from_spans(vec![Span::new(bbox(0, 0, 10, 10), ContentType::Table)])
            .unwrap();
        assert!(line.is_block_level());
    }

    #[test]
    fn test_dropped_record_buckets() {
        let mut dropped = DroppedRecord::default();
        dropped.push(Span::text(bbox(0, 0, 10, 10), "x"), DropReason::Header);
        dropped.push(
            Span::new(bbox(0, 0, 10, 10), ContentType::InlineEquation),
            DropReason::Footer,
        );
        dropped.push(Span::new(bbox(0, 0, 10, 10), ContentType::Image), DropReason::Footer);
        dropped.push(Span::new(bbox(0, 0, 10, 10), ContentType::Table), DropReason::PageNo);

        assert_eq!(dropped.text.header.len(), 1);
        assert_eq!(dropped.text.footer.len(), 1);
        assert_eq!(dropped.image.footer.len(), 1);
        assert_eq!(dropped.table.page_no.len(), 1);
        assert_eq!(dropped.len(), 4);
    }

    #[test]
    fn test_page_size() {
        assert!(!PageSize::a4().is_landscape());
        assert_eq!(PageSize::letter().bbox(), Some(bbox(0, 0, 612, 792)));
        assert_eq!(PageSize::new(0.5, 10.0).bbox(), None);
    }
}
