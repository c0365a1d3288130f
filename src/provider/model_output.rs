//! Layout-model JSON output.
//!
//! The model emits one entry per page:
//!
//! ```json
//! {
//!   "layout_dets": [{"category_id": 15, "poly": [x0,y0,x1,y0,x1,y1,x0,y1], "text": "..."}],
//!   "subfield_dets": [{"category_id": 12, "poly": [...]}],
//!   "page_info": {"page_no": 0, "width": 1654, "height": 2339}
//! }
//! ```
//!
//! Coordinates are model pixels; the pipeline scales them to page points.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{DetectionProvider, PageGeometryProvider, RegionBboxProvider};
use crate::error::{Error, Result};
use crate::model::{BBox, ContentType};
use crate::pipeline::CoordinateScaler;

/// Detection category emitted by the layout model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Picture or figure (1)
    Image,
    /// Running header (3)
    Header,
    /// Page number (4)
    PageNumber,
    /// Footnote (5)
    Footnote,
    /// Running footer (6)
    Footer,
    /// Table (7)
    Table,
    /// Full-width column marker (11)
    FullColumn,
    /// Sub-column marker (12)
    SubColumn,
    /// Inline formula (13)
    InlineEquation,
    /// Display formula (14)
    InterlineEquation,
    /// OCR text line (15)
    Text,
}

impl Category {
    /// Categories that become spans.
    pub const SPAN_CATEGORIES: [Category; 5] = [
        Category::Image,
        Category::Table,
        Category::InlineEquation,
        Category::InterlineEquation,
        Category::Text,
    ];

    /// Categories that describe columns.
    pub const COLUMN_CATEGORIES: [Category; 2] = [Category::FullColumn, Category::SubColumn];

    /// Map a model category id. Unknown ids yield `None`.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Category::Image),
            3 => Some(Category::Header),
            4 => Some(Category::PageNumber),
            5 => Some(Category::Footnote),
            6 => Some(Category::Footer),
            7 => Some(Category::Table),
            11 => Some(Category::FullColumn),
            12 => Some(Category::SubColumn),
            13 => Some(Category::InlineEquation),
            14 => Some(Category::InterlineEquation),
            15 => Some(Category::Text),
            _ => None,
        }
    }

    /// The model category id.
    pub fn id(self) -> u32 {
        match self {
            Category::Image => 1,
            Category::Header => 3,
            Category::PageNumber => 4,
            Category::Footnote => 5,
            Category::Footer => 6,
            Category::Table => 7,
            Category::FullColumn => 11,
            Category::SubColumn => 12,
            Category::InlineEquation => 13,
            Category::InterlineEquation => 14,
            Category::Text => 15,
        }
    }

    /// Span content type for span categories.
    pub fn content_type(self) -> Option<ContentType> {
        match self {
            Category::Image => Some(ContentType::Image),
            Category::Table => Some(ContentType::Table),
            Category::InlineEquation => Some(ContentType::InlineEquation),
            Category::InterlineEquation => Some(ContentType::InterlineEquation),
            Category::Text => Some(ContentType::Text),
            _ => None,
        }
    }

    /// Whether this is a column marker.
    pub fn is_column(self) -> bool {
        Self::COLUMN_CATEGORIES.contains(&self)
    }
}

/// One raw detection. Every field is optional so that malformed entries can
/// be reported and skipped instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    /// Model category id
    #[serde(default)]
    pub category_id: Option<u32>,
    /// Eight-number polygon `[x0,y0,x1,y0,x1,y1,x0,y1]` in model pixels
    #[serde(default)]
    pub poly: Option<Vec<f64>>,
    /// Detector confidence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// OCR text (text detections)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// LaTeX source (equation detections)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latex: Option<String>,
}

impl RawDetection {
    /// Create a detection with a category and polygon.
    pub fn new(category: Category, poly: [f64; 8]) -> Self {
        Self {
            category_id: Some(category.id()),
            poly: Some(poly.to_vec()),
            ..Default::default()
        }
    }

    /// Build the polygon of an axis-aligned rectangle.
    pub fn rect(category: Category, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(category, [x0, y0, x1, y0, x1, y1, x0, y1])
    }

    /// Set OCR text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set LaTeX source.
    pub fn with_latex(mut self, latex: impl Into<String>) -> Self {
        self.latex = Some(latex.into());
        self
    }

    /// Set detector confidence.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Known category, if the id is present and recognized.
    pub fn category(&self) -> Option<Category> {
        self.category_id.and_then(Category::from_id)
    }
}

/// Size of the image the model ran on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSize {
    /// Width in model pixels
    pub width: f64,
    /// Height in model pixels
    pub height: f64,
}

/// Page metadata in the model output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPageInfo {
    /// Page number as reported by the model
    #[serde(default)]
    pub page_no: usize,
    /// Image width in model pixels
    pub width: f64,
    /// Image height in model pixels
    pub height: f64,
}

/// Model output for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPage {
    /// Content and removal-region detections
    #[serde(default)]
    pub layout_dets: Vec<RawDetection>,
    /// Column / sub-column detections
    #[serde(default)]
    pub subfield_dets: Vec<RawDetection>,
    /// Rendered image size
    pub page_info: ModelPageInfo,
}

impl ModelPage {
    /// Create an empty page of the given model size.
    pub fn new(page_no: usize, width: f64, height: f64) -> Self {
        Self {
            layout_dets: Vec::new(),
            subfield_dets: Vec::new(),
            page_info: ModelPageInfo {
                page_no,
                width,
                height,
            },
        }
    }

    /// Rendered image size.
    pub fn model_size(&self) -> ModelSize {
        ModelSize {
            width: self.page_info.width,
            height: self.page_info.height,
        }
    }
}

/// Detections for one page, as consumed by the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PageDetections {
    /// Rendered image size the coordinates refer to
    pub model_size: ModelSize,
    /// Content and removal-region detections
    pub layout_dets: Vec<RawDetection>,
    /// Column markers
    pub subfield_dets: Vec<RawDetection>,
}

impl PageDetections {
    /// Split a model page into content detections and column markers.
    ///
    /// Column categories found among `layout_dets` are moved to
    /// `subfield_dets`.
    pub fn from_page(page: &ModelPage) -> Self {
        let mut layout_dets = Vec::with_capacity(page.layout_dets.len());
        let mut subfield_dets = page.subfield_dets.clone();
        for det in &page.layout_dets {
            if det.category().is_some_and(Category::is_column) {
                subfield_dets.push(det.clone());
            } else {
                layout_dets.push(det.clone());
            }
        }
        Self {
            model_size: page.model_size(),
            layout_dets,
            subfield_dets,
        }
    }
}

/// The layout model's output for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelOutput {
    /// Pages in document order
    pub pages: Vec<ModelPage>,
}

impl ModelOutput {
    /// Parse model output from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse model output from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse model output from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, page_idx: usize) -> Result<&ModelPage> {
        self.pages
            .get(page_idx)
            .ok_or(Error::PageOutOfRange(page_idx, self.pages.len()))
    }
}

impl DetectionProvider for ModelOutput {
    fn detections(&self, page_idx: usize) -> Result<PageDetections> {
        Ok(PageDetections::from_page(self.page(page_idx)?))
    }
}

/// Region boxes of one category, read from the model output.
pub struct CategoryRegionProvider {
    output: Arc<ModelOutput>,
    geometry: Arc<dyn PageGeometryProvider>,
    category: Category,
}

impl CategoryRegionProvider {
    /// Read regions of `category`, scaled with the page's geometry.
    pub fn new(
        output: Arc<ModelOutput>,
        geometry: Arc<dyn PageGeometryProvider>,
        category: Category,
    ) -> Self {
        Self {
            output,
            geometry,
            category,
        }
    }
}

impl RegionBboxProvider for CategoryRegionProvider {
    fn bboxes(&self, page_idx: usize) -> Result<Vec<BBox>> {
        let page = self.output.page(page_idx)?;
        let page_size = self.geometry.page_size(page_idx)?;
        let scaler = CoordinateScaler::new(page_idx, page.model_size(), page_size)?;

        Ok(page
            .layout_dets
            .iter()
            .filter(|det| det.category() == Some(self.category))
            .filter_map(|det| det.poly.as_deref().and_then(|p| scaler.scale_polygon(p)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;
    use crate::provider::FixedSizeGeometry;

    const SAMPLE: &str = r#"[
        {
            "layout_dets": [
                {"category_id": 15, "poly": [100, 100, 300, 100, 300, 140, 100, 140], "text": "Hello"},
                {"category_id": 3, "poly": [0, 0, 1224, 0, 1224, 60, 0, 60]},
                {"category_id": 12, "poly": [0, 80, 612, 80, 612, 1500, 0, 1500]},
                {"poly": [1, 2, 3, 4, 5, 6, 7, 8]}
            ],
            "page_info": {"page_no": 0, "width": 1224, "height": 1584}
        }
    ]"#;

    #[test]
    fn test_category_ids_round_trip() {
        for id in [1, 3, 4, 5, 6, 7, 11, 12, 13, 14, 15] {
            assert_eq!(Category::from_id(id).unwrap().id(), id);
        }
        assert_eq!(Category::from_id(2), None);
        assert_eq!(Category::Text.content_type(), Some(ContentType::Text));
        assert_eq!(Category::Header.content_type(), None);
    }

    #[test]
    fn test_parse_model_output() {
        let output = ModelOutput::from_json_str(SAMPLE).unwrap();
        assert_eq!(output.page_count(), 1);
        let page = &output.pages[0];
        assert_eq!(page.layout_dets.len(), 4);
        assert_eq!(page.layout_dets[0].text.as_deref(), Some("Hello"));
        assert_eq!(page.layout_dets[3].category_id, None);
    }

    #[test]
    fn test_column_markers_moved_to_subfields() {
        let output = ModelOutput::from_json_str(SAMPLE).unwrap();
        let dets = output.detections(0).unwrap();
        assert_eq!(dets.layout_dets.len(), 3);
        assert_eq!(dets.subfield_dets.len(), 1);
        assert!(matches!(
            output.detections(1),
            Err(Error::PageOutOfRange(1, 1))
        ));
    }

    #[test]
    fn test_category_region_provider() {
        let output = Arc::new(ModelOutput::from_json_str(SAMPLE).unwrap());
        let geometry = Arc::new(FixedSizeGeometry::new(1, PageSize::letter()));
        let headers = CategoryRegionProvider::new(output, geometry, Category::Header);
        let boxes = headers.bboxes(0).unwrap();
        assert_eq!(boxes, vec![BBox::new(0, 0, 612, 30).unwrap()]);
    }
}
