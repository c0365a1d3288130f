//! Simple page geometry providers.

use super::{ModelOutput, PageGeometryProvider};
use crate::error::{Error, Result};
use crate::model::PageSize;

/// Points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Page sizes derived from the model's image sizes at a known render DPI.
///
/// The layout model runs on page renders; a page rendered at `dpi` that is
/// `w` pixels wide is `w * 72 / dpi` points wide.
#[derive(Debug, Clone)]
pub struct FixedDpiGeometry {
    sizes: Vec<PageSize>,
}

impl FixedDpiGeometry {
    /// Derive page sizes from every page of `output`.
    pub fn from_model(output: &ModelOutput, dpi: f64) -> Result<Self> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(Error::Other(format!("invalid render dpi: {}", dpi)));
        }
        let scale = POINTS_PER_INCH / dpi;
        let sizes = output
            .pages
            .iter()
            .map(|p| PageSize::new(p.page_info.width * scale, p.page_info.height * scale))
            .collect();
        Ok(Self { sizes })
    }
}

impl PageGeometryProvider for FixedDpiGeometry {
    fn page_count(&self) -> usize {
        self.sizes.len()
    }

    fn page_size(&self, page_idx: usize) -> Result<PageSize> {
        self.sizes
            .get(page_idx)
            .copied()
            .ok_or(Error::PageOutOfRange(page_idx, self.sizes.len()))
    }
}

/// Every page has the same size.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeGeometry {
    page_count: usize,
    size: PageSize,
}

impl FixedSizeGeometry {
    /// `page_count` pages of `size`.
    pub fn new(page_count: usize, size: PageSize) -> Self {
        Self { page_count, size }
    }
}

impl PageGeometryProvider for FixedSizeGeometry {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn page_size(&self, page_idx: usize) -> Result<PageSize> {
        if page_idx >= self.page_count {
            return Err(Error::PageOutOfRange(page_idx, self.page_count));
        }
        Ok(self.size)
    }
}
