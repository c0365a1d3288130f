//! The per-page layout pipeline.
//!
//! Each stage is a small value type with one entry point. [`PageAssembler`]
//! runs them in order for every page:
//!
//! 1. [`CoordinateScaler`] maps model pixels to page points
//! 2. [`SpanClassifier`] turns raw detections into typed spans
//! 3. [`OverlapResolver`] removes near-duplicate spans
//! 4. [`RegionFilter`] drops headers, footers, footnotes and page numbers
//! 5. [`MediaExtractor`] crops images and tables
//! 6. [`InlineEquationNormalizer`] aligns and retags equations
//! 7. [`DeoverlapResolver`] clips remaining overlaps
//! 8. [`StandaloneBlockAdjuster`] aligns floated block spans
//! 9. [`LayoutRegionBuilder`] builds the ranked region tree
//! 10. [`LineMerger`] and [`BlockMerger`] group spans into blocks
//! 11. [`QAExtractor`] collects media and equation lists

mod assembler;
mod classify;
mod deoverlap;
mod equation;
mod layout;
mod media;
mod merge;
mod options;
mod overlap;
mod qa;
mod region_filter;
mod scale;
mod standalone;

pub use assembler::PageAssembler;
pub use classify::SpanClassifier;
pub use deoverlap::DeoverlapResolver;
pub use equation::InlineEquationNormalizer;
pub use layout::{assign_spans, LayoutRegionBuilder, RegionSpans};
pub use media::MediaExtractor;
pub use merge::{BlockMerger, LineMerger, RegionLines};
pub use options::{PageRange, PipelineOptions};
pub use overlap::OverlapResolver;
pub use qa::{walk_blocks, QAExtractor, QaLists, SpanVisitor, VisitorAction};
pub use region_filter::RegionFilter;
pub use scale::CoordinateScaler;
pub use standalone::StandaloneBlockAdjuster;
