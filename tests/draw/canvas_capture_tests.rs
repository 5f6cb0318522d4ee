use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use crate::common::stroke;
use lastminute_core::draw::input::{ClientRect, PointerEvent};
use lastminute_core::draw::model::{Point, StrokeStyle};
use lastminute_core::draw::settings::CaptureSettings;
use lastminute_core::draw::{
    annotation_sink, capture_on_stroke_complete, configure_annotation_sink, spawn_capture,
    Annotation, AnnotationSink, CaptureRequest, RegionKind, StrokeCanvas,
};
use serial_test::serial;

fn wait_for(sink: &AnnotationSink) -> Option<Annotation> {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if let Some(annotation) = sink.get_annotation() {
            return Some(annotation);
        }
        sleep(Duration::from_millis(10));
    }
    None
}

#[test]
fn worker_publishes_result_to_sink() {
    let sink = Arc::new(AnnotationSink::default());
    let request = CaptureRequest {
        strokes: vec![stroke(&[(20.0, 20.0), (80.0, 60.0)])],
        canvas_size: (120.0, 90.0),
        ..CaptureRequest::default()
    };
    spawn_capture(request, CaptureSettings::default(), Arc::clone(&sink))
        .unwrap()
        .join()
        .unwrap();

    let annotation = sink.get_annotation().expect("annotation");
    assert_eq!(annotation.region_kind, RegionKind::DrawnOnBlank);
    assert!(annotation.image_data.starts_with("data:image/png;base64,"));
}

#[test]
fn worker_leaves_sink_untouched_for_dots() {
    let sink = Arc::new(AnnotationSink::default());
    let request = CaptureRequest {
        strokes: vec![stroke(&[(20.0, 20.0)])],
        canvas_size: (120.0, 90.0),
        ..CaptureRequest::default()
    };
    spawn_capture(request, CaptureSettings::default(), Arc::clone(&sink))
        .unwrap()
        .join()
        .unwrap();
    assert!(sink.get_annotation().is_none());
}

#[test]
fn completed_gesture_on_canvas_reaches_sink() {
    let sink = Arc::new(AnnotationSink::default());
    let mut canvas = StrokeCanvas::new(StrokeStyle::default());
    canvas.mount(ClientRect {
        left: 10.0,
        top: 10.0,
        width: 160.0,
        height: 120.0,
    });
    canvas.set_on_stroke_complete(Some(capture_on_stroke_complete(
        None,
        None,
        CaptureSettings::default(),
        Arc::clone(&sink),
    )));

    canvas.handle_event(&PointerEvent::MouseDown {
        client: Point::new(40.0, 40.0),
    });
    canvas.handle_event(&PointerEvent::MouseMove {
        client: Point::new(90.0, 70.0),
    });
    canvas.handle_event(&PointerEvent::MouseUp);

    let annotation = wait_for(&sink).expect("capture published");
    assert_eq!(annotation.region_kind, RegionKind::DrawnOnBlank);
}

#[test]
#[serial]
fn global_sink_is_shared() {
    let sink = annotation_sink();
    sink.clear_annotation();
    annotation_sink().set_annotation("data:x".into(), RegionKind::DrawnOnSource, "label".into());
    assert_eq!(sink.get_annotation().map(|a| a.label), Some("label".to_string()));
    sink.clear_annotation();
    assert!(annotation_sink().get_annotation().is_none());
}

#[test]
#[serial]
fn shared_sink_takes_configured_ttl() {
    let settings = CaptureSettings {
        annotation_ttl_secs: 5,
        ..CaptureSettings::default()
    };
    let sink = configure_annotation_sink(&settings);
    assert_eq!(annotation_sink().ttl(), Duration::from_secs(5));

    let written = Instant::now();
    sink.set_annotation_at("data:x".into(), RegionKind::DrawnOnBlank, "x".into(), written);
    assert!(sink.get_annotation_at(written + Duration::from_secs(6)).is_none());

    sink.clear_annotation();
    configure_annotation_sink(&CaptureSettings::default());
    assert_eq!(annotation_sink().ttl(), Duration::from_secs(300));
}
