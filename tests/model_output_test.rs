//! Integration tests driving the pipeline from model JSON.

use std::sync::Arc;

use pagelayout::provider::{Category, DetectionProvider};
use pagelayout::{
    assembler_for, process_model, render, BBox, FixedDpiGeometry, JsonFormat, ModelOutput,
    PageGeometryProvider, PipelineOptions,
};

// Two pages rendered at 144 dpi (twice the point size of US Letter)
const MODEL_JSON: &str = r#"[
    {
        "layout_dets": [
            {"category_id": 3, "poly": [0, 0, 1224, 0, 1224, 80, 0, 80], "score": 0.97},
            {"category_id": 15, "poly": [144, 30, 600, 30, 600, 60, 144, 60], "text": "Journal of Layout"},
            {"category_id": 4, "poly": [580, 1520, 640, 1520, 640, 1550, 580, 1550]},
            {"category_id": 15, "poly": [590, 1524, 630, 1524, 630, 1546, 590, 1546], "text": "1"},
            {"category_id": 11, "poly": [0, 100, 1224, 100, 1224, 300, 0, 300]},
            {"category_id": 15, "poly": [144, 200, 1080, 200, 1080, 240, 144, 240], "text": "A Title"},
            {"category_id": 15, "poly": [40, 400, 560, 400, 560, 424, 40, 424], "text": "Left column."},
            {"category_id": 15, "poly": [660, 400, 1180, 400, 1180, 424, 660, 424], "text": "Right column."},
            {"category_id": 2, "poly": [0, 0, 10, 0, 10, 10, 0, 10]},
            {"poly": [0, 0, 10, 0, 10, 10, 0, 10]}
        ],
        "subfield_dets": [
            {"category_id": 12, "poly": [0, 300, 600, 300, 600, 1500, 0, 1500]},
            {"category_id": 12, "poly": [620, 300, 1224, 300, 1224, 1500, 620, 1500]}
        ],
        "page_info": {"page_no": 0, "width": 1224, "height": 1584}
    },
    {
        "layout_dets": [
            {"category_id": 15, "poly": [144, 200, 1080, 200, 1080, 240, 144, 240], "text": "Second page"},
            {"category_id": 14, "poly": [300, 300, 900, 300, 900, 380, 300, 380], "latex": "\\int_0^1 x\\,dx"}
        ],
        "page_info": {"page_no": 1, "width": 1224, "height": 1584}
    }
]"#;

fn output() -> ModelOutput {
    ModelOutput::from_json_str(MODEL_JSON).unwrap()
}

fn geometry(output: &ModelOutput) -> Arc<dyn PageGeometryProvider> {
    Arc::new(FixedDpiGeometry::from_model(output, 144.0).unwrap())
}

#[test]
fn test_columns_moved_to_subfields() {
    let output = output();
    let dets = output.detections(0).unwrap();
    assert_eq!(dets.subfield_dets.len(), 3);
    assert!(dets
        .layout_dets
        .iter()
        .all(|d| !d.category().is_some_and(Category::is_column)));
}

#[test]
fn test_model_regions_remove_header_and_page_number() {
    let output = output();
    let geometry = geometry(&output);
    let doc = process_model(output, geometry, PipelineOptions::default()).unwrap();

    let page = doc.get(0).unwrap();
    assert_eq!(page.dropped.text.header.len(), 1);
    assert_eq!(page.dropped.text.page_no.len(), 1);
    assert_eq!(page.removed_regions.header.len(), 1);
    assert_eq!(page.removed_regions.page_no.len(), 1);
    assert_eq!(
        page.plain_text(),
        "A Title\n\nLeft column.\n\nRight column."
    );
}

#[test]
fn test_reading_order_band_then_columns() {
    let output = Arc::new(output());
    let geometry = geometry(&output);
    let page = assembler_for(output, geometry).process_page(0).unwrap();

    let leaves = &page.layout_bboxes;
    let pos = |b: BBox| leaves.iter().position(|l| *l == b).unwrap();
    let band = pos(BBox::new(0, 50, 612, 150).unwrap());
    let left = pos(BBox::new(0, 150, 300, 750).unwrap());
    let right = pos(BBox::new(310, 150, 612, 750).unwrap());
    assert!(band < left && left < right);
}

#[test]
fn test_second_page_equation() {
    let output = output();
    let geometry = geometry(&output);
    let doc = process_model(output, geometry, PipelineOptions::new().sequential()).unwrap();

    let page = doc.get(1).unwrap();
    assert_eq!(page.qa.interline_equations.len(), 1);
    assert_eq!(
        page.qa.interline_equations[0].content.as_deref(),
        Some("\\int_0^1 x\\,dx")
    );
    assert!(page.dropped.is_empty());
}

#[test]
fn test_json_export_is_stable() {
    let first = {
        let output = output();
        let geometry = geometry(&output);
        process_model(output, geometry, PipelineOptions::default()).unwrap()
    };
    let second = {
        let output = output();
        let geometry = geometry(&output);
        process_model(output, geometry, PipelineOptions::new().sequential()).unwrap()
    };

    let a = render::to_json(&first, JsonFormat::Pretty).unwrap();
    let b = render::to_json(&second, JsonFormat::Pretty).unwrap();
    assert_eq!(a, b);

    let value: serde_json::Value = serde_json::from_str(&a).unwrap();
    let pages = value["pages"].as_object().unwrap();
    let keys: Vec<&String> = pages.keys().collect();
    assert_eq!(keys, vec!["0", "1"]);
    assert!(pages["0"]["tables"].as_array().unwrap().is_empty());
}
