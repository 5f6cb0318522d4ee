use crate::draw::bounds::BoundingBox;
use crate::draw::model::{Point, Stroke};

/// Strokes drawn on one overlay instance, in logical viewport coordinates.
///
/// Strokes are stored at the coordinates they were drawn at and are not
/// re-derived when the viewport is resized, so a stroke continued across a
/// resize will misalign with the content underneath.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DrawingSession {
    viewport: (f32, f32),
    strokes: Vec<Stroke>,
    in_progress: Option<Stroke>,
    active: bool,
}

impl DrawingSession {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport: (width, height),
            ..Self::default()
        }
    }

    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn in_progress(&self) -> Option<&Stroke> {
        self.in_progress.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin_stroke(&mut self, point: Point) {
        self.in_progress = Some(Stroke::begin(point));
        self.active = true;
    }

    pub fn extend_stroke(&mut self, point: Point) -> bool {
        if !self.active {
            return false;
        }
        match self.in_progress.as_mut() {
            Some(stroke) => {
                stroke.push(point);
                true
            }
            None => false,
        }
    }

    /// Ends the gesture. Returns true when a stroke was committed.
    pub fn end_stroke(&mut self) -> bool {
        self.active = false;
        match self.in_progress.take() {
            Some(stroke) if !stroke.is_degenerate() => {
                self.strokes.push(stroke);
                true
            }
            _ => false,
        }
    }

    /// Drops the in-progress gesture without committing it.
    pub fn abandon_stroke(&mut self) {
        self.in_progress = None;
        self.active = false;
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
        self.abandon_stroke();
    }

    pub fn capture_region(&self, padding: f32, min_size: f32) -> Option<BoundingBox> {
        BoundingBox::capture_region(&self.strokes, self.viewport, padding, min_size)
    }
}
