pub mod bounds;
pub mod canvas;
pub mod capture;
pub mod composite;
pub mod input;
pub mod model;
pub mod render;
pub mod session;
pub mod settings;
pub mod sink;

pub use canvas::StrokeCanvas;
pub use capture::{
    capture_on_stroke_complete, capture_region, spawn_capture, CapturableContainer,
    CaptureRequest, CaptureResult, ContainerMetrics, RegionKind, SourceImage,
};
pub use session::DrawingSession;
pub use sink::{annotation_sink, configure_annotation_sink, Annotation, AnnotationSink};
