use std::sync::Arc;

use crate::common::{png_source, stroke, StaticContainer, MARKER};
use lastminute_core::draw::composite::{blank_canvas, decode_base64_payload, decode_rgba};
use lastminute_core::draw::model::Color;
use lastminute_core::draw::settings::CaptureSettings;
use lastminute_core::draw::{
    capture_region, CaptureRequest, ContainerMetrics, RegionKind, SourceImage,
};

fn circled_request() -> CaptureRequest {
    // Padded region is exactly (50, 20)-(150, 60).
    CaptureRequest {
        strokes: vec![stroke(&[(62.0, 32.0), (100.0, 48.0), (138.0, 40.0)])],
        canvas_size: (200.0, 100.0),
        ..CaptureRequest::default()
    }
}

#[test]
fn live_container_is_cropped_at_bitmap_scale() {
    let mut bitmap = blank_canvas(400, 200, Color::WHITE);
    bitmap.put_pixel(100, 40, MARKER);
    let request = CaptureRequest {
        container: Some(Arc::new(StaticContainer::showing(bitmap, (200.0, 100.0)))),
        source: Some(SourceImage::new(png_source(10, 10), "unrelated")),
        ..circled_request()
    };

    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::CroppedRegion);
    assert_eq!((result.width, result.height), (200, 80));

    let image = decode_rgba(&result.png).expect("png");
    assert_eq!(image.get_pixel(0, 0), &MARKER);
    // Ink is composited before the crop: the stroke passes through (100, 48) logical.
    let inked = image.get_pixel(100, 56);
    assert!(inked[0] > inked[1], "expected red ink, got {inked:?}");
}

#[test]
fn scrolled_container_is_cropped_from_the_visible_viewport() {
    // Content is 200x400 logical px rendered at 2x; the user is scrolled 150px down.
    let decoy = image::Rgba([0, 0, 200, 255]);
    let mut bitmap = blank_canvas(400, 800, Color::WHITE);
    bitmap.put_pixel(100, 40, decoy);
    bitmap.put_pixel(100, 340, MARKER);
    let mut container = StaticContainer::showing(bitmap, (200.0, 100.0));
    container.metrics = ContainerMetrics {
        scroll_size: (200.0, 400.0),
        client_size: (200.0, 100.0),
        scroll_offset: (0.0, 150.0),
    };
    let request = CaptureRequest {
        container: Some(Arc::new(container)),
        ..circled_request()
    };

    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::CroppedRegion);
    assert_eq!((result.width, result.height), (200, 80));

    let image = decode_rgba(&result.png).expect("png");
    assert_eq!(image.get_pixel(0, 0), &MARKER);
    assert!(image.pixels().all(|p| *p != decoy));
    let inked = image.get_pixel(100, 56);
    assert!(inked[0] > inked[1], "expected red ink, got {inked:?}");
}

#[test]
fn failing_screenshot_without_source_draws_on_blank() {
    let request = CaptureRequest {
        container: Some(Arc::new(StaticContainer::failing((200.0, 100.0)))),
        ..circled_request()
    };
    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::DrawnOnBlank);
    assert_eq!((result.width, result.height), (200, 100));
}

#[test]
fn failing_screenshot_skips_the_source_image() {
    let request = CaptureRequest {
        container: Some(Arc::new(StaticContainer::failing((200.0, 100.0)))),
        source: Some(SourceImage::new(png_source(40, 20), "diagram")),
        ..circled_request()
    };
    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::DrawnOnBlank);
}

#[test]
fn unavailable_screenshot_backend_uses_source_image() {
    let mut container = StaticContainer::failing((200.0, 100.0));
    container.capturable = false;
    let request = CaptureRequest {
        container: Some(Arc::new(container)),
        source: Some(SourceImage::new(png_source(400, 200), "supply curve")),
        ..circled_request()
    };
    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::DrawnOnSource);
    assert_eq!((result.width, result.height), (400, 200));
    assert!(result.label.contains("supply curve"));
}

#[test]
fn source_image_can_be_a_file_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slide.png");
    let png = decode_base64_payload(&png_source(100, 50)).unwrap();
    std::fs::write(&path, png).unwrap();

    let request = CaptureRequest {
        source: Some(SourceImage::new(path.to_string_lossy(), "slide")),
        ..circled_request()
    };
    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::DrawnOnSource);
    assert_eq!((result.width, result.height), (100, 50));

    // Strokes are scaled by 0.5 onto the smaller image.
    let image = decode_rgba(&result.png).unwrap();
    let inked = image.get_pixel(50, 24);
    assert!(inked[0] > 0, "expected ink at scaled position, got {inked:?}");
}

#[test]
fn undecodable_source_falls_back_to_blank() {
    let request = CaptureRequest {
        source: Some(SourceImage::new("data:image/png;base64,AAAA", "broken")),
        ..circled_request()
    };
    let result = capture_region(&request, &CaptureSettings::default()).expect("capture");
    assert_eq!(result.region_kind, RegionKind::DrawnOnBlank);

    let image = decode_rgba(&result.png).unwrap();
    assert_eq!(image.get_pixel(5, 95), &image::Rgba([255, 255, 255, 255]));
}

#[test]
fn result_encodes_as_png_data_url() {
    let result = capture_region(&circled_request(), &CaptureSettings::default()).expect("capture");
    let url = result.data_url();
    assert!(url.starts_with("data:image/png;base64,"));
    assert_eq!(decode_base64_payload(&url).unwrap(), result.png);
}
