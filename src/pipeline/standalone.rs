//! Alignment of floated block-level spans to the text beside them.

use crate::model::{ContentType, Span};

/// Pulls down the top edge of images, tables and interline equations that
/// overhang the text line immediately to their left.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandaloneBlockAdjuster;

impl StandaloneBlockAdjuster {
    /// Create an adjuster.
    pub fn new() -> Self {
        Self
    }

    /// Adjust block-level spans in place.
    ///
    /// A text or inline-equation span qualifies as the left neighbour of a
    /// block span when it starts further left and its vertical range lies
    /// strictly inside the block's. Of several candidates the one reaching
    /// furthest right wins, then the topmost.
    pub fn adjust(&self, spans: &mut [Span]) {
        let mut adjusted = 0usize;

        for i in 0..spans.len() {
            if !spans[i].content_type.is_block_level() {
                continue;
            }
            let block = spans[i].bbox;

            let neighbour = spans
                .iter()
                .filter(|t| {
                    matches!(
                        t.content_type,
                        ContentType::Text | ContentType::InlineEquation
                    )
                })
                .map(|t| t.bbox)
                .filter(|t| t.x0 < block.x0 && block.y0 < t.y0 && block.y1 > t.y1)
                .min_by_key(|t| (std::cmp::Reverse(t.x1), t.y0));

            if let Some(t) = neighbour {
                if let Some(b) = block.with_y(t.y0, block.y1) {
                    spans[i].bbox = b;
                    adjusted += 1;
                }
            }
        }

        if adjusted > 0 {
            log::debug!("Aligned {} block spans to their left neighbour", adjusted);
        }
    }
}
