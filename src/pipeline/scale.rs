//! Model pixel-space to page point-space conversion.

use crate::error::{Error, Result};
use crate::model::{BBox, PageSize};
use crate::provider::ModelSize;

/// Converts model polygons into page boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateScaler {
    horizontal_ratio: f64,
    vertical_ratio: f64,
}

impl CoordinateScaler {
    /// Build a scaler for one page.
    ///
    /// Fails with [`Error::InvalidScale`] if either ratio is not a positive
    /// finite number.
    pub fn new(page_idx: usize, model: ModelSize, page: PageSize) -> Result<Self> {
        let horizontal_ratio = model.width / page.width;
        let vertical_ratio = model.height / page.height;

        let usable = |r: f64| r.is_finite() && r > 0.0;
        if !usable(horizontal_ratio) || !usable(vertical_ratio) {
            return Err(Error::InvalidScale {
                page: page_idx,
                horizontal: horizontal_ratio,
                vertical: vertical_ratio,
            });
        }

        Ok(Self {
            horizontal_ratio,
            vertical_ratio,
        })
    }

    /// Model width divided by page width.
    pub fn horizontal_ratio(&self) -> f64 {
        self.horizontal_ratio
    }

    /// Model height divided by page height.
    pub fn vertical_ratio(&self) -> f64 {
        self.vertical_ratio
    }

    /// Reduce an 8-number polygon to its bounding box in page points.
    ///
    /// Each coordinate is divided by its ratio and truncated toward zero.
    /// Returns `None` for polygons with fewer than eight numbers, non-finite
    /// coordinates, or a zero-area result.
    pub fn scale_polygon(&self, poly: &[f64]) -> Option<BBox> {
        if poly.len() < 8 || poly[..8].iter().any(|v| !v.is_finite()) {
            return None;
        }

        let xs = poly[..8].iter().step_by(2);
        let ys = poly[..8].iter().skip(1).step_by(2);
        let (min_x, max_x) = min_max(xs)?;
        let (min_y, max_y) = min_max(ys)?;

        BBox::new(
            (min_x / self.horizontal_ratio).trunc() as i32,
            (min_y / self.vertical_ratio).trunc() as i32,
            (max_x / self.horizontal_ratio).trunc() as i32,
            (max_y / self.vertical_ratio).trunc() as i32,
        )
    }
}

fn min_max<'a>(values: impl Iterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
