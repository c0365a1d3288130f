//! JSON export of processed documents.

use crate::error::{Error, Result};
use crate::model::DocumentModel;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
    /// One compact page record per line (JSON Lines)
    Lines,
}

/// Convert a document model to JSON.
///
/// Pages are written in ascending index order, so equal models always
/// produce identical output.
pub fn to_json(doc: &DocumentModel, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
        JsonFormat::Lines => doc
            .iter()
            .map(serde_json::to_string)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(|lines| lines.join("\n")),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BBox, Block, DroppedRecord, LayoutTree, Line, PageRecord, PageSize, QaRecord, RegionBoxes,
        Span,
    };

    fn page(page_idx: usize, text: &str) -> PageRecord {
        let size = PageSize::letter();
        let bbox = BBox::new(72, 72, 300, 84).unwrap();
        let line = Line::from_spans(vec![Span::text(bbox, text)]).unwrap();
        PageRecord {
            page_idx,
            page_size: size,
            blocks: Block::from_lines(vec![line]).into_iter().collect(),
            layout_bboxes: vec![],
            layout_tree: LayoutTree::new(size.bbox().unwrap()),
            qa: QaRecord::default(),
            dropped: DroppedRecord::default(),
            removed_regions: RegionBoxes::default(),
        }
    }

    #[test]
    fn test_to_json_pretty() {
        let mut doc = DocumentModel::new();
        doc.commit(page(0, "Hello")).unwrap();

        let json = to_json(&doc, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"blocks\""));
        assert!(json.contains("Hello"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let mut doc = DocumentModel::new();
        doc.commit(page(0, "Hello")).unwrap();

        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_commit_order_does_not_change_output() {
        let mut forward = DocumentModel::new();
        forward.commit(page(0, "first")).unwrap();
        forward.commit(page(1, "second")).unwrap();

        let mut reverse = DocumentModel::new();
        reverse.commit(page(1, "second")).unwrap();
        reverse.commit(page(0, "first")).unwrap();

        assert_eq!(
            to_json(&forward, JsonFormat::Compact).unwrap(),
            to_json(&reverse, JsonFormat::Compact).unwrap()
        );
    }

    #[test]
    fn test_to_json_lines_one_page_per_line() {
        let mut doc = DocumentModel::new();
        doc.commit(page(4, "later")).unwrap();
        doc.commit(page(1, "earlier")).unwrap();

        let json = to_json(&doc, JsonFormat::Lines).unwrap();
        let pages: Vec<PageRecord> = json
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].page_idx, 1);
        assert_eq!(pages[1].page_idx, 4);
        assert_eq!(&pages[1], doc.get(4).unwrap());
    }

    #[test]
    fn test_json_round_trips_model() {
        let mut doc = DocumentModel::new();
        doc.commit(page(3, "Hello")).unwrap();

        let json = to_json(&doc, JsonFormat::Compact).unwrap();
        let back: DocumentModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, doc);
    }
}
