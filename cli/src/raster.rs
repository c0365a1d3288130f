//! Media cropping from pre-rendered page images.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GenericImageView, ImageFormat};

use pagelayout::{BBox, Error, PageGeometryProvider, PageRasterizer, PixelData, Result};

/// File extensions tried for each page image, in order.
const EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Crops page regions out of page renders stored as `page-<idx>.<ext>`.
///
/// The render may have any resolution; bboxes in points are scaled by the
/// ratio between the image size and the page size.
pub struct ImageDirRasterizer {
    dir: PathBuf,
    geometry: Arc<dyn PageGeometryProvider>,
}

impl ImageDirRasterizer {
    pub fn new(dir: impl Into<PathBuf>, geometry: Arc<dyn PageGeometryProvider>) -> Self {
        Self {
            dir: dir.into(),
            geometry,
        }
    }

    fn page_image_path(&self, page_idx: usize) -> Option<PathBuf> {
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("page-{}.{}", page_idx, ext)))
            .find(|p| p.is_file())
    }
}

impl PageRasterizer for ImageDirRasterizer {
    fn crop(&self, page_idx: usize, bbox: &BBox) -> Result<PixelData> {
        let path = self.page_image_path(page_idx).ok_or_else(|| {
            Error::Rasterize(format!(
                "no image for page {} in {}",
                page_idx,
                self.dir.display()
            ))
        })?;
        let page = self.geometry.page_size(page_idx)?;
        let img = open_image(&path)?;

        let (width, height) = img.dimensions();
        let sx = f64::from(width) / page.width;
        let sy = f64::from(height) / page.height;

        let clamp = |v: f64, max: u32| -> u32 { v.max(0.0).min(f64::from(max)) as u32 };
        let x0 = clamp(f64::from(bbox.x0) * sx, width);
        let y0 = clamp(f64::from(bbox.y0) * sy, height);
        let x1 = clamp(f64::from(bbox.x1) * sx, width);
        let y1 = clamp(f64::from(bbox.y1) * sy, height);
        if x1 <= x0 || y1 <= y0 {
            return Err(Error::Rasterize(format!(
                "crop {} is outside page {}",
                bbox, page_idx
            )));
        }

        let cropped = img.crop_imm(x0, y0, x1 - x0, y1 - y0);
        let mut buf = Cursor::new(Vec::new());
        cropped
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| Error::Rasterize(format!("PNG encoding failed: {}", e)))?;

        Ok(PixelData::png(buf.into_inner(), x1 - x0, y1 - y0))
    }
}

fn open_image(path: &Path) -> Result<image::DynamicImage> {
    image::open(path).map_err(|e| Error::Rasterize(format!("{}: {}", path.display(), e)))
}
