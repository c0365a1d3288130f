//! Document model types for reconstructed page layout.
//!
//! This module defines the output representation of the layout pipeline:
//! pages made of blocks, blocks made of lines, lines made of typed spans,
//! plus the reading-order layout tree and the audit records for removed
//! content.

mod bbox;
mod document;
mod layout;
mod page;
mod span;

pub use bbox::BBox;
pub use document::DocumentModel;
pub use layout::{LayoutRegion, LayoutTree, RegionId, RegionKind};
pub use page::{
    Block, DropReason, DroppedBucket, DroppedRecord, Line, PageRecord, PageSize, QaRecord,
    RegionBoxes,
};
pub use span::{ContentType, Span};
