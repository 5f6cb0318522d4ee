use crate::common::stroke;
use lastminute_core::draw::bounds::BoundingBox;
use lastminute_core::draw::settings::CaptureSettings;
use lastminute_core::draw::{capture_region, CaptureRequest};

#[test]
fn small_stroke_near_corner_is_padded_and_clamped() {
    let strokes = vec![stroke(&[(10.0, 10.0), (15.0, 15.0)])];
    let region = BoundingBox::capture_region(&strokes, (300.0, 300.0), 12.0, 20.0)
        .expect("27x27 region is above threshold");
    assert_eq!(region, BoundingBox::new(0.0, 0.0, 27.0, 27.0));
}

#[test]
fn click_without_drag_emits_nothing() {
    let request = CaptureRequest {
        strokes: vec![stroke(&[(40.0, 40.0)])],
        canvas_size: (300.0, 300.0),
        ..CaptureRequest::default()
    };
    assert!(capture_region(&request, &CaptureSettings::default()).is_none());
}

#[test]
fn tiny_region_after_clamping_emits_nothing() {
    // Padding gives 1..26 but the viewport clips it to 1..15.
    let request = CaptureRequest {
        strokes: vec![stroke(&[(13.0, 13.0), (14.0, 14.0)])],
        canvas_size: (15.0, 15.0),
        ..CaptureRequest::default()
    };
    assert!(capture_region(&request, &CaptureSettings::default()).is_none());
}

#[test]
fn growing_strokes_never_shrink_the_box() {
    let mut strokes = vec![stroke(&[(100.0, 100.0), (120.0, 110.0)])];
    let mut previous = BoundingBox::envelope(&strokes).expect("box");

    for (x, y) in [(90.0, 130.0), (110.0, 105.0), (200.0, 40.0)] {
        strokes[0].push(lastminute_core::draw::model::Point::new(x, y));
        let next = BoundingBox::envelope(&strokes).expect("box");
        assert!(next.contains_box(&previous));
        previous = next;
    }

    strokes.push(stroke(&[(5.0, 5.0), (6.0, 6.0)]));
    let next = BoundingBox::envelope(&strokes).expect("box");
    assert!(next.contains_box(&previous));
}

#[test]
fn single_point_strokes_do_not_widen_the_box() {
    let real = stroke(&[(100.0, 100.0), (140.0, 120.0)]);
    let with_dot = vec![real.clone(), stroke(&[(0.0, 0.0)])];
    assert_eq!(
        BoundingBox::envelope(&with_dot),
        BoundingBox::envelope(&[real])
    );
}
