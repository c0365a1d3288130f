//! # pagelayout
//!
//! Page layout analysis and reading-order reconstruction for Rust.
//!
//! This library takes the output of a document layout detection model
//! (text lines, images, tables, equations, headers, column markers) and
//! turns every page into clean, ordered blocks of spans, ready for
//! rendering or export.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pagelayout::{process_model_file, render, PipelineOptions};
//!
//! fn main() -> pagelayout::Result<()> {
//!     // Detections rendered at 200 dpi
//!     let doc = process_model_file("model.json", 200.0, PipelineOptions::default())?;
//!
//!     let json = render::to_json(&doc, render::JsonFormat::Pretty)?;
//!     println!("{}", json);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Coordinate scaling**: model pixels to page points, per axis
//! - **Span cleanup**: duplicate removal, header/footer filtering, de-overlap
//! - **Equation handling**: inline alignment and interline retagging
//! - **Reading order**: column-aware layout tree with ranked leaf regions
//! - **Media cropping**: images and tables through pluggable rasterizers
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod error;
pub mod media;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use media::{DirMediaStore, MediaKey, MediaStore, PageRasterizer, PixelData};
pub use model::{
    BBox, Block, ContentType, DocumentModel, DropReason, DroppedRecord, LayoutRegion, LayoutTree,
    Line, PageRecord, PageSize, QaRecord, RegionBoxes, RegionId, RegionKind, Span,
};
pub use pipeline::{PageAssembler, PageRange, PipelineOptions};
pub use provider::{
    DetectionProvider, FixedDpiGeometry, FixedSizeGeometry, ModelOutput, PageGeometryProvider,
    RegionBboxProvider, RegionProviders,
};
pub use render::JsonFormat;

use std::path::Path;
use std::sync::Arc;

/// Run the pipeline over a detection model's output.
///
/// Header, footer, footnote and page-number regions are taken from the same
/// output. No media is cropped.
///
/// # Arguments
///
/// * `output` - Parsed model output
/// * `geometry` - Page sizes in points
/// * `options` - Pipeline options
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pagelayout::provider::{ModelOutput, ModelPage};
/// use pagelayout::{process_model, FixedSizeGeometry, PageSize, PipelineOptions};
///
/// let output = ModelOutput { pages: vec![ModelPage::new(0, 1224.0, 1584.0)] };
/// let geometry = Arc::new(FixedSizeGeometry::new(1, PageSize::letter()));
/// let doc = process_model(output, geometry, PipelineOptions::default()).unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
pub fn process_model(
    output: ModelOutput,
    geometry: Arc<dyn PageGeometryProvider>,
    options: PipelineOptions,
) -> Result<DocumentModel> {
    assembler_for(Arc::new(output), geometry)
        .with_options(options)
        .process()
}

/// Parse a model output file and run the pipeline.
///
/// Page sizes are derived from the model's image sizes at `dpi`.
///
/// # Example
///
/// ```no_run
/// use pagelayout::{process_model_file, PageRange, PipelineOptions};
///
/// let options = PipelineOptions::new()
///     .with_pages(PageRange::Range(0, 9))
///     .sequential();
/// let doc = process_model_file("model.json", 200.0, options).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn process_model_file<P: AsRef<Path>>(
    path: P,
    dpi: f64,
    options: PipelineOptions,
) -> Result<DocumentModel> {
    let output = ModelOutput::from_path(path)?;
    let geometry = Arc::new(FixedDpiGeometry::from_model(&output, dpi)?);
    process_model(output, geometry, options)
}

/// Extract the plain text of a model output file in reading order.
///
/// # Example
///
/// ```no_run
/// use pagelayout::extract_text;
///
/// let text = extract_text("model.json", 200.0).unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P, dpi: f64) -> Result<String> {
    let doc = process_model_file(path, dpi, PipelineOptions::default())?;
    Ok(doc.plain_text())
}

/// Process a model output file and serialize the result to JSON.
///
/// # Example
///
/// ```no_run
/// use pagelayout::{to_json, JsonFormat};
///
/// let json = to_json("model.json", 200.0, JsonFormat::Pretty).unwrap();
/// std::fs::write("layout.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, dpi: f64, format: JsonFormat) -> Result<String> {
    let doc = process_model_file(path, dpi, PipelineOptions::default())?;
    render::to_json(&doc, format)
}

/// Build an assembler whose removal regions come from `output`.
pub fn assembler_for(
    output: Arc<ModelOutput>,
    geometry: Arc<dyn PageGeometryProvider>,
) -> PageAssembler {
    let regions = RegionProviders::from_model(output.clone(), geometry.clone());
    PageAssembler::new(geometry, output).with_regions(regions)
}
