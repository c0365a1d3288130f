//! Per-page orchestration and document assembly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{
    assign_spans, BlockMerger, CoordinateScaler, DeoverlapResolver, InlineEquationNormalizer,
    LayoutRegionBuilder, LineMerger, MediaExtractor, OverlapResolver, PageRange, PipelineOptions,
    QAExtractor, RegionFilter, SpanClassifier, StandaloneBlockAdjuster,
};
use crate::error::{Error, Result};
use crate::media::{MediaStore, PageRasterizer};
use crate::model::{DocumentModel, PageRecord};
use crate::provider::{DetectionProvider, PageGeometryProvider, RegionProviders};

/// Runs the layout pipeline over pages and collects the results.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use pagelayout::model::PageSize;
/// use pagelayout::pipeline::PageAssembler;
/// use pagelayout::provider::{FixedSizeGeometry, ModelOutput, ModelPage};
///
/// let output = ModelOutput { pages: vec![ModelPage::new(0, 612.0, 792.0)] };
/// let geometry = Arc::new(FixedSizeGeometry::new(1, PageSize::letter()));
/// let assembler = PageAssembler::new(geometry, Arc::new(output));
///
/// let doc = assembler.process().unwrap();
/// assert_eq!(doc.page_count(), 1);
/// ```
#[derive(Clone)]
pub struct PageAssembler {
    geometry: Arc<dyn PageGeometryProvider>,
    detections: Arc<dyn DetectionProvider>,
    regions: RegionProviders,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
    store: Option<Arc<dyn MediaStore>>,
    options: PipelineOptions,
}

impl PageAssembler {
    /// Create an assembler with default options, no removal regions and no
    /// media cropping.
    pub fn new(
        geometry: Arc<dyn PageGeometryProvider>,
        detections: Arc<dyn DetectionProvider>,
    ) -> Self {
        Self {
            geometry,
            detections,
            regions: RegionProviders::none(),
            rasterizer: None,
            store: None,
            options: PipelineOptions::default(),
        }
    }

    /// Set the removal-region providers.
    pub fn with_regions(mut self, regions: RegionProviders) -> Self {
        self.regions = regions;
        self
    }

    /// Crop image and table spans with `rasterizer` into `store`.
    pub fn with_media(
        mut self,
        rasterizer: Arc<dyn PageRasterizer>,
        store: Arc<dyn MediaStore>,
    ) -> Self {
        self.rasterizer = Some(rasterizer);
        self.store = Some(store);
        self
    }

    /// Set the pipeline options.
    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    /// The pipeline options.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.geometry.page_count()
    }

    /// Process the configured page range into a new document.
    pub fn process(&self) -> Result<DocumentModel> {
        self.process_range(&self.options.pages)
    }

    /// Process `range` into a new document.
    pub fn process_range(&self, range: &PageRange) -> Result<DocumentModel> {
        let mut doc = DocumentModel::new();
        self.process_into(range, &mut doc)?;
        Ok(doc)
    }

    /// Process `range`, committing each finished page into `doc`.
    ///
    /// The range is checked against the page count before any page is
    /// processed. If a page fails, pages committed so far stay in `doc`
    /// and the error of the lowest failing page is returned.
    pub fn process_into(&self, range: &PageRange, doc: &mut DocumentModel) -> Result<()> {
        let pages = range.resolve(self.page_count())?;
        log::info!(
            "Processing pages {}..={} ({})",
            pages.start(),
            pages.end(),
            if self.options.parallel {
                "parallel"
            } else {
                "sequential"
            }
        );

        let before = doc.page_count();
        let result = if self.options.parallel {
            self.run_parallel(pages.collect(), doc)
        } else {
            self.run_sequential(pages, doc)
        };

        log::info!("Committed {} pages", doc.page_count() - before);
        result
    }

    fn run_sequential(
        &self,
        pages: impl Iterator<Item = usize>,
        doc: &mut DocumentModel,
    ) -> Result<()> {
        for page_idx in pages {
            let record = self.process_page(page_idx)?;
            doc.commit(record)?;
        }
        Ok(())
    }

    fn run_parallel(&self, pages: Vec<usize>, doc: &mut DocumentModel) -> Result<()> {
        let (tx, rx) = crossbeam_channel::unbounded::<(usize, Result<PageRecord>)>();
        let cancelled = AtomicBool::new(false);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                pages.into_par_iter().for_each_with(tx, |tx, page_idx| {
                    if cancelled.load(Ordering::Relaxed) {
                        return;
                    }
                    // The receiver outlives every sender
                    let _ = tx.send((page_idx, self.process_page(page_idx)));
                });
            });

            let mut first_error: Option<(usize, Error)> = None;
            for (page_idx, result) in rx.iter() {
                let outcome = result.and_then(|record| doc.commit(record));
                if let Err(e) = outcome {
                    log::warn!("Page {} failed: {}", page_idx, e);
                    cancelled.store(true, Ordering::Relaxed);
                    if first_error.as_ref().map_or(true, |(p, _)| page_idx < *p) {
                        first_error = Some((page_idx, e));
                    }
                }
            }

            match first_error {
                Some((_, e)) => Err(e),
                None => Ok(()),
            }
        })
    }

    /// Run the full pipeline on one page.
    pub fn process_page(&self, page_idx: usize) -> Result<PageRecord> {
        let o = &self.options;

        let page_size = self.geometry.page_size(page_idx)?;
        let detections = self.detections.detections(page_idx)?;
        let scaler = CoordinateScaler::new(page_idx, detections.model_size, page_size)?;
        let page_bbox = page_size.bbox().ok_or_else(|| {
            Error::Provider(format!(
                "page {} has no usable size: {}x{}",
                page_idx, page_size.width, page_size.height
            ))
        })?;

        let classifier = SpanClassifier::new(page_idx, &scaler, page_bbox);
        let spans = classifier.classify(&detections.layout_dets);
        let spans = OverlapResolver::new(o.duplicate_overlap_ratio).resolve(spans);

        let removed_regions = self.regions.collect(page_idx)?;
        let (mut spans, dropped) =
            RegionFilter::new(o.region_drop_ratio).filter(spans, &removed_regions);

        MediaExtractor::new(&o.book_id, self.rasterizer.as_deref(), self.store.as_deref())
            .extract(page_idx, &mut spans);

        let equations =
            InlineEquationNormalizer::new(o.equation_line_overlap, o.equation_max_height_factor)
                .with_max_gap_factor(o.equation_max_gap_factor);
        let spans = equations.normalize(spans);
        let mut spans = DeoverlapResolver::new(o.deoverlap_tolerance).resolve(spans);
        StandaloneBlockAdjuster::new().adjust(&mut spans);

        let layout = LayoutRegionBuilder::new(o.layout_duplicate_iou, o.layout_containment_ratio);
        let layout_tree = layout.build(page_idx, page_bbox, &scaler, &detections.subfield_dets);
        let assigned = assign_spans(&layout_tree, spans);

        let lines = LineMerger::new(o.line_merge_overlap).merge(assigned);
        let blocks = BlockMerger::new(o.block_gap_factor, o.block_indent_tolerance).merge(lines);
        let qa = QAExtractor::extract(&blocks).to_record();

        log::debug!(
            "Page {}: {} blocks, {} dropped spans",
            page_idx,
            blocks.len(),
            dropped.len()
        );

        Ok(PageRecord {
            page_idx,
            page_size,
            layout_bboxes: layout_tree.leaf_bboxes(),
            blocks,
            layout_tree,
            qa,
            dropped,
            removed_regions,
        })
    }
}

impl std::fmt::Debug for PageAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageAssembler")
            .field("page_count", &self.page_count())
            .field("media", &(self.rasterizer.is_some() && self.store.is_some()))
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
