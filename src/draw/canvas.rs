use crate::draw::input::{client_to_local, InputCommand, PointerEvent, PointerPhase, ViewportElement};
use crate::draw::model::{Point, StrokeStyle};
use crate::draw::render::{copy_rect, render_stroke, render_strokes, stroke_pixel_bounds};
use crate::draw::session::DrawingSession;
use image::RgbaImage;

pub type StrokeCompleteHook = Box<dyn FnMut(&DrawingSession) + Send>;

/// Free-hand drawing overlay bound to a viewport element.
///
/// The backing buffer is kept at the element's size in whole pixels. Committed
/// strokes live in their own layer so the in-progress stroke can be redrawn
/// incrementally without touching the rest of the canvas.
pub struct StrokeCanvas<V> {
    element: Option<V>,
    session: DrawingSession,
    style: StrokeStyle,
    committed: RgbaImage,
    composed: RgbaImage,
    accepting_input: bool,
    on_stroke_complete: Option<StrokeCompleteHook>,
}

impl<V> std::fmt::Debug for StrokeCanvas<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeCanvas")
            .field("mounted", &self.element.is_some())
            .field("session", &self.session)
            .field("style", &self.style)
            .field("buffer", &self.composed.dimensions())
            .field("accepting_input", &self.accepting_input)
            .finish()
    }
}

impl<V: ViewportElement> StrokeCanvas<V> {
    pub fn new(style: StrokeStyle) -> Self {
        Self {
            element: None,
            session: DrawingSession::default(),
            style,
            committed: RgbaImage::new(0, 0),
            composed: RgbaImage::new(0, 0),
            accepting_input: true,
            on_stroke_complete: None,
        }
    }

    pub fn mount(&mut self, element: V) {
        let rect = element.client_rect();
        self.element = Some(element);
        self.session = DrawingSession::default();
        self.accepting_input = true;
        self.resize(rect.width, rect.height);
    }

    pub fn unmount(&mut self) {
        self.element = None;
        self.session = DrawingSession::default();
        self.committed = RgbaImage::new(0, 0);
        self.composed = RgbaImage::new(0, 0);
    }

    pub fn is_mounted(&self) -> bool {
        self.element.is_some()
    }

    pub fn set_on_stroke_complete(&mut self, hook: Option<StrokeCompleteHook>) {
        self.on_stroke_complete = hook;
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Current on-screen pixels: committed strokes plus the in-progress stroke.
    pub fn pixels(&self) -> &RgbaImage {
        &self.composed
    }

    pub fn is_accepting_input(&self) -> bool {
        self.accepting_input
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if self.element.is_none() {
            return;
        }
        self.session.set_viewport(width, height);
        let (w, h) = (width.max(0.0).floor() as u32, height.max(0.0).floor() as u32);
        if self.committed.dimensions() != (w, h) {
            tracing::debug!(width = w, height = h, "reallocating stroke canvas buffer");
        }
        self.redraw_all((w, h));
    }

    pub fn begin_stroke(&mut self, point: Point) {
        if self.element.is_none() || !self.accepting_input {
            return;
        }
        self.session.begin_stroke(point);
    }

    pub fn extend_stroke(&mut self, point: Point) {
        if self.element.is_none() || !self.accepting_input {
            return;
        }
        if !self.session.extend_stroke(point) {
            return;
        }
        let Some(stroke) = self.session.in_progress() else {
            return;
        };
        // In-progress bounds only grow, so this rect also covers the previous preview.
        if let Some(rect) = stroke_pixel_bounds(stroke, self.style, self.composed.dimensions()) {
            copy_rect(&self.committed, &mut self.composed, rect);
            render_stroke(&mut self.composed, stroke, self.style, Some(rect));
        }
    }

    pub fn end_stroke(&mut self) {
        if self.element.is_none() {
            return;
        }
        let pending = self.session.in_progress().cloned();
        if !self.session.end_stroke() {
            self.composed = self.committed.clone();
            return;
        }
        if let Some(stroke) = pending {
            render_stroke(&mut self.committed, &stroke, self.style, None);
        }
        self.composed = self.committed.clone();
        if let Some(hook) = self.on_stroke_complete.as_mut() {
            hook(&self.session);
        }
    }

    pub fn clear(&mut self) {
        if self.element.is_none() {
            return;
        }
        self.session.clear();
        let size = self.committed.dimensions();
        self.redraw_all(size);
    }

    /// Stops accepting pointer input and ends the drawing session. Strokes
    /// drawn before the exit never reach a later capture.
    pub fn exit_draw_mode(&mut self) {
        self.accepting_input = false;
        let (width, height) = self.session.viewport();
        self.session = DrawingSession::new(width, height);
        if self.element.is_some() {
            let size = self.committed.dimensions();
            self.redraw_all(size);
        }
    }

    pub fn enter_draw_mode(&mut self) {
        self.accepting_input = true;
    }

    pub fn handle_event(&mut self, event: &PointerEvent) -> Option<InputCommand> {
        let rect = self.element.as_ref()?.client_rect();
        if matches!(event, PointerEvent::Wheel { .. }) {
            if self.accepting_input {
                self.exit_draw_mode();
                return Some(InputCommand::ExitDrawMode);
            }
            return None;
        }
        if !self.accepting_input {
            return None;
        }

        let local = event.client_position().map(|client| client_to_local(client, rect));
        match (event.phase(), local) {
            (Some(PointerPhase::Down), Some(point)) => self.begin_stroke(point),
            (Some(PointerPhase::Move), Some(point)) => self.extend_stroke(point),
            (Some(PointerPhase::Up), _) => self.end_stroke(),
            _ => {}
        }
        None
    }

    fn redraw_all(&mut self, size: (u32, u32)) {
        self.committed = RgbaImage::new(size.0, size.1);
        render_strokes(&mut self.committed, self.session.strokes(), self.style);
        self.composed = self.committed.clone();
        if let Some(stroke) = self.session.in_progress() {
            render_stroke(&mut self.composed, stroke, self.style, None);
        }
    }
}
