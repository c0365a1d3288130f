//! Span walks over finished blocks and QA list extraction.
//!
//! [`SpanVisitor`] lets callers observe every span of a page in reading
//! order without touching the block structure. [`QAExtractor`] is the
//! visitor that collects media and equation spans for export.
//!
//! # Example
//!
//! ```
//! use pagelayout::model::{Block, Span};
//! use pagelayout::pipeline::{walk_blocks, SpanVisitor, VisitorAction};
//!
//! struct TextCounter(usize);
//!
//! impl<'a> SpanVisitor<'a> for TextCounter {
//!     fn visit_text(&mut self, _span: &'a Span) -> VisitorAction {
//!         self.0 += 1;
//!         VisitorAction::Continue
//!     }
//! }
//!
//! let blocks: Vec<Block> = Vec::new();
//! let mut counter = TextCounter(0);
//! walk_blocks(&blocks, &mut counter);
//! assert_eq!(counter.0, 0);
//! ```

use crate::model::{Block, ContentType, QaRecord, Span};

/// Action returned by visitor methods to control the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitorAction {
    /// Keep walking.
    #[default]
    Continue,

    /// Skip the rest of the current block.
    SkipBlock,

    /// End the walk.
    Stop,
}

/// Trait for visiting the spans of finished blocks.
///
/// All methods return `VisitorAction::Continue` by default.
pub trait SpanVisitor<'a> {
    /// Called before the spans of a block.
    fn visit_block(&mut self, block: &'a Block) -> VisitorAction {
        let _ = block;
        VisitorAction::Continue
    }

    /// Called for a text span.
    fn visit_text(&mut self, span: &'a Span) -> VisitorAction {
        let _ = span;
        VisitorAction::Continue
    }

    /// Called for an image span.
    fn visit_image(&mut self, span: &'a Span) -> VisitorAction {
        let _ = span;
        VisitorAction::Continue
    }

    /// Called for a table span.
    fn visit_table(&mut self, span: &'a Span) -> VisitorAction {
        let _ = span;
        VisitorAction::Continue
    }

    /// Called for an inline equation span.
    fn visit_inline_equation(&mut self, span: &'a Span) -> VisitorAction {
        let _ = span;
        VisitorAction::Continue
    }

    /// Called for an interline equation span.
    fn visit_interline_equation(&mut self, span: &'a Span) -> VisitorAction {
        let _ = span;
        VisitorAction::Continue
    }
}

/// Walk `blocks` in order, dispatching every span to `visitor`.
pub fn walk_blocks<'a, V>(blocks: &'a [Block], visitor: &mut V)
where
    V: SpanVisitor<'a> + ?Sized,
{
    for block in blocks {
        match visitor.visit_block(block) {
            VisitorAction::Continue => {}
            VisitorAction::SkipBlock => continue,
            VisitorAction::Stop => return,
        }

        for span in block.spans() {
            let action = match span.content_type {
                ContentType::Text => visitor.visit_text(span),
                ContentType::Image => visitor.visit_image(span),
                ContentType::Table => visitor.visit_table(span),
                ContentType::InlineEquation => visitor.visit_inline_equation(span),
                ContentType::InterlineEquation => visitor.visit_interline_equation(span),
            };
            match action {
                VisitorAction::Continue => {}
                VisitorAction::SkipBlock => break,
                VisitorAction::Stop => return,
            }
        }
    }
}

/// Media and equation spans of a page, borrowed from its blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QaLists<'a> {
    /// Image spans in reading order
    pub images: Vec<&'a Span>,
    /// Table spans in reading order
    pub tables: Vec<&'a Span>,
    /// Interline equation spans in reading order
    pub interline_equations: Vec<&'a Span>,
    /// Inline equation spans in reading order
    pub inline_equations: Vec<&'a Span>,
}

impl QaLists<'_> {
    /// Clone the referenced spans into an owned record.
    pub fn to_record(&self) -> QaRecord {
        let owned = |spans: &[&Span]| -> Vec<Span> {
            spans.iter().map(|&s| s.clone()).collect()
        };
        QaRecord {
            images: owned(&self.images),
            tables: owned(&self.tables),
            interline_equations: owned(&self.interline_equations),
            inline_equations: owned(&self.inline_equations),
        }
    }

    /// Total number of extracted spans.
    pub fn len(&self) -> usize {
        self.images.len()
            + self.tables.len()
            + self.interline_equations.len()
            + self.inline_equations.len()
    }

    /// Check if nothing was extracted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Collects the QA lists of a page.
#[derive(Debug, Default)]
pub struct QAExtractor<'a> {
    lists: QaLists<'a>,
}

impl<'a> QAExtractor<'a> {
    /// Extract the QA lists from finished blocks.
    pub fn extract(blocks: &'a [Block]) -> QaLists<'a> {
        let mut extractor = QAExtractor::default();
        walk_blocks(blocks, &mut extractor);
        extractor.lists
    }
}

impl<'a> SpanVisitor<'a> for QAExtractor<'a> {
    fn visit_image(&mut self, span: &'a Span) -> VisitorAction {
        self.lists.images.push(span);
        VisitorAction::Continue
    }

    fn visit_table(&mut self, span: &'a Span) -> VisitorAction {
        self.lists.tables.push(span);
        VisitorAction::Continue
    }

    fn visit_inline_equation(&mut self, span: &'a Span) -> VisitorAction {
        self.lists.inline_equations.push(span);
        VisitorAction::Continue
    }

    fn visit_interline_equation(&mut self, span: &'a Span) -> VisitorAction {
        self.lists.interline_equations.push(span);
        VisitorAction::Continue
    }
}
