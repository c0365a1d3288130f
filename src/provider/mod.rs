//! Input collaborators for the layout pipeline.
//!
//! The pipeline consumes page geometry, raw detections and removal-region
//! boxes through the traits in this module. [`ModelOutput`] implements the
//! detection side for the layout model's JSON output, and
//! [`CategoryRegionProvider`] derives removal regions from the same output.

mod geometry;
mod model_output;

pub use geometry::{FixedDpiGeometry, FixedSizeGeometry};
pub use model_output::{
    Category, CategoryRegionProvider, ModelOutput, ModelPage, ModelPageInfo, ModelSize,
    PageDetections, RawDetection,
};

use std::sync::Arc;

use crate::error::Result;
use crate::model::{BBox, PageSize, RegionBoxes};

/// Page count and page dimensions of the source document.
pub trait PageGeometryProvider: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Size of page `page_idx` in points.
    fn page_size(&self, page_idx: usize) -> Result<PageSize>;
}

/// Raw layout-model detections per page.
pub trait DetectionProvider: Send + Sync {
    /// Detections and column markers for page `page_idx`.
    fn detections(&self, page_idx: usize) -> Result<PageDetections>;
}

/// One kind of removal region (header, footer, ...) per page.
pub trait RegionBboxProvider: Send + Sync {
    /// Region boxes for page `page_idx`, in page points.
    fn bboxes(&self, page_idx: usize) -> Result<Vec<BBox>>;
}

/// A provider that never reports any region.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegions;

impl RegionBboxProvider for NoRegions {
    fn bboxes(&self, _page_idx: usize) -> Result<Vec<BBox>> {
        Ok(Vec::new())
    }
}

/// The four removal-region collaborators.
#[derive(Clone)]
pub struct RegionProviders {
    /// Page-number regions
    pub page_no: Arc<dyn RegionBboxProvider>,
    /// Header regions
    pub header: Arc<dyn RegionBboxProvider>,
    /// Footer regions
    pub footer: Arc<dyn RegionBboxProvider>,
    /// Footnote regions
    pub footnote: Arc<dyn RegionBboxProvider>,
}

impl RegionProviders {
    /// Providers that never remove anything.
    pub fn none() -> Self {
        let none: Arc<dyn RegionBboxProvider> = Arc::new(NoRegions);
        Self {
            page_no: none.clone(),
            header: none.clone(),
            footer: none.clone(),
            footnote: none,
        }
    }

    /// Providers reading header / page-number / footer / footnote detections
    /// from the model output.
    pub fn from_model(
        output: Arc<ModelOutput>,
        geometry: Arc<dyn PageGeometryProvider>,
    ) -> Self {
        let provider = |category| -> Arc<dyn RegionBboxProvider> {
            Arc::new(CategoryRegionProvider::new(
                output.clone(),
                geometry.clone(),
                category,
            ))
        };
        Self {
            page_no: provider(Category::PageNumber),
            header: provider(Category::Header),
            footer: provider(Category::Footer),
            footnote: provider(Category::Footnote),
        }
    }

    /// Collect all four region lists for one page.
    pub fn collect(&self, page_idx: usize) -> Result<RegionBoxes> {
        Ok(RegionBoxes {
            page_no: self.page_no.bboxes(page_idx)?,
            header: self.header.bboxes(page_idx)?,
            footer: self.footer.bboxes(page_idx)?,
            footnote: self.footnote.bboxes(page_idx)?,
        })
    }
}

impl Default for RegionProviders {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for RegionProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionProviders").finish_non_exhaustive()
    }
}
