//! Pipeline options and configuration.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Thresholds and switches for the layout pipeline.
///
/// Every field has a default, so a JSON options file only needs to list
/// the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Book / document identifier used in media keys
    pub book_id: String,

    /// Intersection over the smaller area above which the smaller of two
    /// spans is discarded as a duplicate
    pub duplicate_overlap_ratio: f64,

    /// Fraction of a span inside a header/footer/page-number/footnote
    /// region above which the span is dropped
    pub region_drop_ratio: f64,

    /// Vertical overlap (fraction of the shorter height) for two spans to
    /// count as the same visual line during equation normalization
    pub equation_line_overlap: f64,

    /// An interline equation taller than this multiple of its text
    /// neighbour's height keeps its own line
    pub equation_max_height_factor: f64,

    /// Largest horizontal gap between an equation and its text neighbour,
    /// as a multiple of the equation's height
    pub equation_max_gap_factor: f64,

    /// Intersection area (square points) tolerated between two spans
    pub deoverlap_tolerance: i64,

    /// IoU above which two column detections are treated as the same region
    pub layout_duplicate_iou: f64,

    /// Intersection over the smaller area above which a column detection is
    /// nested inside another
    pub layout_containment_ratio: f64,

    /// Vertical overlap (fraction of the shorter height) for two spans to
    /// merge into one line
    pub line_merge_overlap: f64,

    /// Largest vertical gap between lines of one block, as a multiple of
    /// the median line height
    pub block_gap_factor: f64,

    /// Largest left-edge shift (points) between lines of one block
    pub block_indent_tolerance: i32,

    /// Process pages on a thread pool
    pub parallel: bool,

    /// Pages to process
    pub pages: PageRange,
}

impl PipelineOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Set the book identifier.
    pub fn with_book_id(mut self, book_id: impl Into<String>) -> Self {
        self.book_id = book_id.into();
        self
    }

    /// Set the duplicate-span overlap ratio.
    pub fn with_duplicate_overlap_ratio(mut self, ratio: f64) -> Self {
        self.duplicate_overlap_ratio = ratio;
        self
    }

    /// Set the region drop ratio.
    pub fn with_region_drop_ratio(mut self, ratio: f64) -> Self {
        self.region_drop_ratio = ratio;
        self
    }

    /// Set the line merge overlap.
    pub fn with_line_merge_overlap(mut self, ratio: f64) -> Self {
        self.line_merge_overlap = ratio;
        self
    }

    /// Set the block gap factor.
    pub fn with_block_gap_factor(mut self, factor: f64) -> Self {
        self.block_gap_factor = factor;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the page range.
    pub fn with_pages(mut self, pages: PageRange) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            book_id: "document".to_string(),
            duplicate_overlap_ratio: 0.65,
            region_drop_ratio: 0.5,
            equation_line_overlap: 0.5,
            equation_max_height_factor: 1.5,
            equation_max_gap_factor: 2.0,
            deoverlap_tolerance: 0,
            layout_duplicate_iou: 0.9,
            layout_containment_ratio: 0.9,
            line_merge_overlap: 0.6,
            block_gap_factor: 1.0,
            block_indent_tolerance: 20,
            parallel: true,
            pages: PageRange::All,
        }
    }
}

/// Inclusive range of 0-based page indices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageRange {
    /// Every page of the document
    #[default]
    All,
    /// `start` to the last page
    From(usize),
    /// `start..=end`
    Range(usize, usize),
}

impl PageRange {
    /// Resolve against a document's page count.
    ///
    /// Fails when the range starts or ends past the last page, or when the
    /// start lies after the end.
    pub fn resolve(&self, page_count: usize) -> Result<RangeInclusive<usize>> {
        let (start, end) = match *self {
            PageRange::All => {
                if page_count == 0 {
                    return Err(Error::PageOutOfRange(0, 0));
                }
                (0, page_count - 1)
            }
            PageRange::From(start) => (start, page_count.saturating_sub(1)),
            PageRange::Range(start, end) => (start, end),
        };

        if start >= page_count {
            return Err(Error::PageOutOfRange(start, page_count));
        }
        if end >= page_count {
            return Err(Error::PageOutOfRange(end, page_count));
        }
        if start > end {
            return Err(Error::InvalidPageRange(format!("{}-{}", start, end)));
        }
        Ok(start..=end)
    }

    /// Parse a range string: `"all"`, `"3"`, `"3-7"` or `"3-"`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s == "all" {
            return Ok(PageRange::All);
        }

        let invalid = || Error::InvalidPageRange(s.to_string());

        if let Some((start, end)) = s.split_once('-') {
            let start: usize = start.trim().parse().map_err(|_| invalid())?;
            let end = end.trim();
            if end.is_empty() {
                return Ok(PageRange::From(start));
            }
            let end: usize = end.parse().map_err(|_| invalid())?;
            return Ok(PageRange::Range(start, end));
        }

        let page: usize = s.parse().map_err(|_| invalid())?;
        Ok(PageRange::Range(page, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = PipelineOptions::new()
            .with_book_id("paper")
            .with_line_merge_overlap(0.7)
            .sequential();

        assert_eq!(options.book_id, "paper");
        assert_eq!(options.line_merge_overlap, 0.7);
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = PipelineOptions::default();
        assert!(options.parallel);
        assert_eq!(options.duplicate_overlap_ratio, 0.65);
        assert_eq!(options.pages, PageRange::All);
    }

    #[test]
    fn test_partial_options_json() {
        let options: PipelineOptions =
            serde_json::from_str(r#"{"region_drop_ratio": 0.8, "parallel": false}"#).unwrap();
        assert_eq!(options.region_drop_ratio, 0.8);
        assert!(!options.parallel);
        assert_eq!(options.duplicate_overlap_ratio, 0.65);
    }

    #[test]
    fn test_page_range_parse() {
        assert_eq!(PageRange::parse("all").unwrap(), PageRange::All);
        assert_eq!(PageRange::parse("").unwrap(), PageRange::All);
        assert_eq!(PageRange::parse("4").unwrap(), PageRange::Range(4, 4));
        assert_eq!(PageRange::parse("2-5").unwrap(), PageRange::Range(2, 5));
        assert_eq!(PageRange::parse("3-").unwrap(), PageRange::From(3));
        assert!(PageRange::parse("a-b").is_err());
        assert!(PageRange::parse("x").is_err());
    }

    #[test]
    fn test_page_range_resolve() {
        assert_eq!(PageRange::All.resolve(3).unwrap(), 0..=2);
        assert_eq!(PageRange::From(1).resolve(3).unwrap(), 1..=2);
        assert_eq!(PageRange::Range(1, 1).resolve(3).unwrap(), 1..=1);

        assert!(matches!(
            PageRange::Range(0, 3).resolve(3),
            Err(Error::PageOutOfRange(3, 3))
        ));
        assert!(matches!(
            PageRange::From(5).resolve(3),
            Err(Error::PageOutOfRange(5, 3))
        ));
        assert!(matches!(
            PageRange::Range(2, 1).resolve(3),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(PageRange::All.resolve(0).is_err());
    }
}
