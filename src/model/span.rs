//! Span-level types.

use serde::{Deserialize, Serialize};

use super::BBox;

/// Content category of a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// Recognized text
    Text,
    /// A picture or figure
    Image,
    /// A table region
    Table,
    /// A formula flowing inside a text line
    InlineEquation,
    /// A formula set on its own line
    InterlineEquation,
}

impl ContentType {
    /// Whether spans of this type occupy a line of their own.
    pub fn is_block_level(self) -> bool {
        matches!(
            self,
            ContentType::Image | ContentType::Table | ContentType::InterlineEquation
        )
    }

    /// Whether spans of this type flow inside a text line.
    pub fn is_inline(self) -> bool {
        matches!(self, ContentType::Text | ContentType::InlineEquation)
    }

    /// Whether spans of this type are cropped to media storage.
    pub fn is_media(self) -> bool {
        matches!(self, ContentType::Image | ContentType::Table)
    }

    /// Whether spans of this type carry recognized content.
    pub fn has_content(self) -> bool {
        !self.is_media()
    }

    /// Short lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Image => "image",
            ContentType::Table => "table",
            ContentType::InlineEquation => "inline_equation",
            ContentType::InterlineEquation => "interline_equation",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified, positioned unit of page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// Position on the page
    pub bbox: BBox,

    /// Content category
    #[serde(rename = "type")]
    pub content_type: ContentType,

    /// Recognized text or LaTeX (text and equation spans only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Reference to the persisted crop (image and table spans only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

impl Span {
    /// Create a span without content.
    pub fn new(bbox: BBox, content_type: ContentType) -> Self {
        Self {
            bbox,
            content_type,
            content: None,
            image_path: None,
        }
    }

    /// Create a text span.
    pub fn text(bbox: BBox, text: impl Into<String>) -> Self {
        Self::new(bbox, ContentType::Text).with_content(text)
    }

    /// Attach recognized content.
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Copy of this span at a different position.
    pub fn with_bbox(mut self, bbox: BBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Copy of this span with a different content type.
    pub fn retagged(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Copy of this span carrying a media reference.
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Span area in square points.
    pub fn area(&self) -> i64 {
        self.bbox.area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_classes() {
        assert!(ContentType::Image.is_block_level());
        assert!(ContentType::Table.is_block_level());
        assert!(ContentType::InterlineEquation.is_block_level());
        assert!(!ContentType::Text.is_block_level());
        assert!(ContentType::InlineEquation.is_inline());
        assert!(ContentType::Table.is_media());
        assert!(!ContentType::InterlineEquation.is_media());
    }

    #[test]
    fn test_span_serialization() {
        let span = Span::text(BBox::new(0, 0, 10, 10).unwrap(), "hello");
        let json = serde_json::to_string(&span).unwrap();
        assert_eq!(json, r#"{"bbox":[0,0,10,10],"type":"text","content":"hello"}"#);
    }
}
