//! Integration tests for the page pipeline.

use std::sync::Arc;

use pagelayout::provider::{Category, ModelPage, RawDetection, RegionBboxProvider};
use pagelayout::render::{to_json, JsonFormat};
use pagelayout::{
    BBox, ContentType, DocumentModel, Error, FixedSizeGeometry, ModelOutput, PageAssembler,
    PageRange, PageRecord, PageSize, PipelineOptions, RegionProviders, Result, Span,
};

/// Model images are rendered at twice the page's point size.
const SCALE: f64 = 2.0;

fn bbox(x0: i32, y0: i32, x1: i32, y1: i32) -> BBox {
    BBox::new(x0, y0, x1, y1).unwrap()
}

/// A detection given in page points.
fn det(category: Category, x0: i32, y0: i32, x1: i32, y1: i32) -> RawDetection {
    RawDetection::rect(
        category,
        f64::from(x0) * SCALE,
        f64::from(y0) * SCALE,
        f64::from(x1) * SCALE,
        f64::from(y1) * SCALE,
    )
}

fn text(x0: i32, y0: i32, x1: i32, y1: i32, content: &str) -> RawDetection {
    det(Category::Text, x0, y0, x1, y1).with_text(content)
}

fn model_page(page_no: usize, layout_dets: Vec<RawDetection>) -> ModelPage {
    let mut page = ModelPage::new(page_no, 612.0 * SCALE, 792.0 * SCALE);
    page.layout_dets = layout_dets;
    page
}

fn assembler(pages: Vec<ModelPage>) -> PageAssembler {
    let count = pages.len();
    let geometry = Arc::new(FixedSizeGeometry::new(count, PageSize::letter()));
    PageAssembler::new(geometry, Arc::new(ModelOutput { pages }))
}

fn single_page(dets: Vec<RawDetection>) -> PageRecord {
    assembler(vec![model_page(0, dets)])
        .with_options(PipelineOptions::new().sequential())
        .process_page(0)
        .unwrap()
}

/// The same boxes on every page.
struct StaticRegions(Vec<BBox>);

impl RegionBboxProvider for StaticRegions {
    fn bboxes(&self, _page_idx: usize) -> Result<Vec<BBox>> {
        Ok(self.0.clone())
    }
}

fn header_and_footer() -> RegionProviders {
    RegionProviders {
        header: Arc::new(StaticRegions(vec![bbox(0, 0, 612, 50)])),
        footer: Arc::new(StaticRegions(vec![bbox(0, 742, 612, 792)])),
        ..RegionProviders::none()
    }
}

fn span_count(page: &PageRecord) -> usize {
    page.spans().count()
}

#[test]
fn test_nested_duplicate_keeps_larger_span() {
    let page = single_page(vec![
        det(Category::Image, 100, 100, 120, 120),
        det(Category::Table, 102, 102, 112, 112),
    ]);

    let spans: Vec<&Span> = page.spans().collect();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].content_type, ContentType::Image);
    assert_eq!(spans[0].bbox.area(), 400);
    assert_eq!(page.qa.images.len(), 1);
    assert!(page.qa.tables.is_empty());
}

#[test]
fn test_text_inside_header_is_dropped() {
    let page = assembler(vec![model_page(
        0,
        vec![
            text(72, 20, 300, 32, "Running head"),
            text(72, 100, 300, 112, "Body text"),
        ],
    )])
    .with_regions(header_and_footer())
    .process_page(0)
    .unwrap();

    assert_eq!(page.dropped.text.header.len(), 1);
    assert_eq!(
        page.dropped.text.header[0].content.as_deref(),
        Some("Running head")
    );
    assert!(!page.plain_text().contains("Running head"));
    assert_eq!(page.plain_text(), "Body text");
    assert_eq!(page.removed_regions.header, vec![bbox(0, 0, 612, 50)]);
}

#[test]
fn test_inline_equation_aligned_to_left_text() {
    let page = single_page(vec![
        text(72, 10, 200, 20, "where"),
        det(Category::InlineEquation, 204, 14, 240, 24).with_latex("x^2"),
    ]);

    assert_eq!(page.blocks.len(), 1);
    assert_eq!(page.blocks[0].lines.len(), 1);

    let eq = &page.qa.inline_equations;
    assert_eq!(eq.len(), 1);
    assert_eq!((eq[0].bbox.y0, eq[0].bbox.y1), (10, 20));
    assert_eq!(eq[0].content.as_deref(), Some("x^2"));
}

#[test]
fn test_spaced_text_forms_separate_blocks() {
    let page = single_page(vec![
        text(72, 300, 400, 312, "third"),
        text(72, 100, 400, 112, "first"),
        text(72, 200, 400, 212, "second"),
    ]);

    assert_eq!(page.blocks.len(), 3);
    let texts: Vec<String> = page.blocks.iter().map(|b| b.text()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
    assert!(page.blocks.iter().all(|b| b.lines.len() == 1));
}

#[test]
fn test_table_only_page_qa_lists() {
    let page = single_page(vec![det(Category::Table, 72, 200, 540, 400)]);

    assert_eq!(page.blocks.len(), 1);
    assert_eq!(page.qa.tables.len(), 1);
    assert_eq!(page.qa.tables[0], page.blocks[0].lines[0].spans[0]);
    assert!(page.qa.images.is_empty());
    assert!(page.qa.interline_equations.is_empty());
    assert!(page.qa.inline_equations.is_empty());
}

#[test]
fn test_every_span_accounted_for() {
    let dets = vec![
        text(72, 20, 300, 32, "header"),
        text(72, 100, 540, 112, "body one"),
        text(72, 114, 540, 126, "body two"),
        det(Category::Image, 72, 150, 300, 300),
        det(Category::Table, 320, 150, 540, 300),
        det(Category::InterlineEquation, 150, 320, 450, 350).with_latex("E = mc^2"),
        det(Category::Image, 500, 750, 540, 780),
        text(300, 760, 320, 770, "7"),
    ];
    let total = dets.len();

    let page = assembler(vec![model_page(0, dets)])
        .with_regions(header_and_footer())
        .process_page(0)
        .unwrap();

    assert_eq!(span_count(&page) + page.dropped.len(), total);
    assert_eq!(page.dropped.text.header.len(), 1);
    assert_eq!(page.dropped.text.footer.len(), 1);
    assert_eq!(page.dropped.image.footer.len(), 1);
    assert!(page.dropped.table.is_empty());
}

#[test]
fn test_final_spans_do_not_overlap() {
    let page = single_page(vec![
        text(72, 100, 300, 115, "caption beside"),
        det(Category::Image, 290, 105, 500, 300),
        text(72, 112, 300, 127, "next line"),
        det(Category::InterlineEquation, 100, 310, 400, 340).with_latex("a+b"),
        det(Category::Table, 380, 290, 540, 500),
    ]);

    let spans: Vec<&Span> = page.spans().collect();
    assert_eq!(spans.len(), 5);
    for (i, a) in spans.iter().enumerate() {
        for b in &spans[i + 1..] {
            assert_eq!(
                a.bbox.intersection_area(&b.bbox),
                0,
                "{} overlaps {}",
                a.bbox,
                b.bbox
            );
        }
    }
}

#[test]
fn test_two_columns_read_left_first() {
    let mut page = model_page(
        0,
        vec![
            text(320, 100, 600, 112, "right top"),
            text(20, 400, 280, 412, "left bottom"),
        ],
    );
    page.subfield_dets = vec![
        det(Category::SubColumn, 310, 0, 612, 792),
        det(Category::SubColumn, 0, 0, 300, 792),
    ];

    let record = assembler(vec![page]).process_page(0).unwrap();
    assert_eq!(record.plain_text(), "left bottom\n\nright top");
    assert_eq!(
        record.layout_bboxes,
        vec![bbox(0, 0, 300, 792), bbox(310, 0, 612, 792)]
    );

    let mut ranks: Vec<u32> = record
        .layout_tree
        .leaves()
        .into_iter()
        .filter_map(|id| record.layout_tree.get(id))
        .map(|r| r.rank)
        .collect();
    let count = ranks.len();
    ranks.dedup();
    assert_eq!(ranks.len(), count);
}

fn sample_document(pages: usize) -> Vec<ModelPage> {
    (0..pages)
        .map(|i| {
            let y = 100 + (i as i32) * 7;
            model_page(
                i,
                vec![
                    text(72, y, 540, y + 12, &format!("page {} first", i)),
                    text(72, y + 14, 290, y + 26, &format!("page {} second", i)),
                    det(Category::Image, 72, 300, 300, 500),
                    det(Category::InlineEquation, 300, y + 15, 340, y + 27).with_latex("y"),
                    text(72, 20, 300, 32, "header"),
                ],
            )
        })
        .collect()
}

#[test]
fn test_output_is_deterministic() {
    let run = || {
        let doc = assembler(sample_document(6))
            .with_regions(header_and_footer())
            .process()
            .unwrap();
        to_json(&doc, JsonFormat::Compact).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_parallel_matches_sequential() {
    let parallel = assembler(sample_document(8))
        .with_regions(header_and_footer())
        .with_options(PipelineOptions::new().with_parallel(true))
        .process()
        .unwrap();
    let sequential = assembler(sample_document(8))
        .with_regions(header_and_footer())
        .with_options(PipelineOptions::new().sequential())
        .process()
        .unwrap();

    assert_eq!(parallel.page_count(), 8);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_out_of_range_fails_before_work() {
    let assembler = assembler(sample_document(3));
    let mut doc = DocumentModel::new();

    let result = assembler.process_into(&PageRange::Range(1, 5), &mut doc);
    assert!(matches!(result, Err(Error::PageOutOfRange(5, 3))));
    assert!(doc.is_empty());

    let result = assembler.process_into(&PageRange::Range(2, 1), &mut doc);
    assert!(matches!(result, Err(Error::InvalidPageRange(_))));
    assert!(doc.is_empty());
}

#[test]
fn test_sub_range_processed() {
    let doc = assembler(sample_document(5))
        .process_range(&PageRange::Range(1, 3))
        .unwrap();
    let pages: Vec<usize> = doc.pages.keys().copied().collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[test]
fn test_bad_scale_stops_range_keeping_finished_pages() {
    let mut pages = sample_document(4);
    pages[2].page_info.height = f64::NAN;

    let assembler = assembler(pages).with_options(PipelineOptions::new().sequential());
    let mut doc = DocumentModel::new();
    let result = assembler.process_into(&PageRange::All, &mut doc);

    assert!(matches!(result, Err(Error::InvalidScale { page: 2, .. })));
    let done: Vec<usize> = doc.pages.keys().copied().collect();
    assert_eq!(done, vec![0, 1]);
    assert!(doc.iter().all(|p| !p.blocks.is_empty()));
}

#[test]
fn test_malformed_detections_skipped() {
    let mut missing_poly = text(72, 200, 300, 212, "lost");
    missing_poly.poly = None;
    let unknown = RawDetection {
        category_id: Some(99),
        ..det(Category::Text, 72, 300, 300, 312)
    };
    let missing_text = det(Category::Text, 72, 400, 300, 412);

    let page = single_page(vec![
        text(72, 100, 300, 112, "kept"),
        missing_poly,
        unknown,
        missing_text,
    ]);
    assert_eq!(page.plain_text(), "kept");
}

#[test]
fn test_equation_sharing_text_box_is_kept() {
    let dets = vec![
        text(100, 10, 130, 20, "n"),
        det(Category::InlineEquation, 100, 14, 130, 24).with_latex("k"),
    ];
    let total = dets.len();
    let page = single_page(dets);

    assert_eq!(span_count(&page) + page.dropped.len(), total);
    assert_eq!(page.qa.inline_equations.len(), 1);
    assert_eq!(page.qa.inline_equations[0].content.as_deref(), Some("k"));
    let spans: Vec<&Span> = page.spans().collect();
    assert_eq!(spans[0].bbox.intersection_area(&spans[1].bbox), 0);
}

#[test]
fn test_off_page_coordinates_clipped() {
    let wide = RawDetection::rect(Category::Text, -4.0e9, 200.0, 4.0e9, 224.0).with_text("wide");
    let gone = RawDetection::rect(Category::Image, 5000.0, 5000.0, 6000.0, 6000.0);

    let doc = assembler(vec![model_page(0, vec![wide, gone, text(72, 300, 300, 312, "kept")])])
        .process()
        .unwrap();

    let page = doc.get(0).unwrap();
    assert_eq!(page.plain_text(), "wide\n\nkept");
    assert_eq!(page.blocks[0].bbox, bbox(0, 100, 612, 112));
    assert!(page.qa.images.is_empty());
}
