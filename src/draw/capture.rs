use crate::draw::bounds::{BoundingBox, PixelRect};
use crate::draw::canvas::StrokeCompleteHook;
use crate::draw::composite::{
    blank_canvas, crop, decode_base64_payload, decode_rgba, encode_png, png_data_url,
};
use crate::draw::model::{Stroke, StrokeStyle};
use crate::draw::render::render_strokes;
use crate::draw::session::DrawingSession;
use crate::draw::settings::CaptureSettings;
use crate::draw::sink::AnnotationSink;
use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContainerMetrics {
    pub scroll_size: (f32, f32),
    pub client_size: (f32, f32),
    pub scroll_offset: (f32, f32),
}

impl ContainerMetrics {
    pub fn is_scrolled(&self) -> bool {
        self.scroll_size.0 > self.client_size.0 || self.scroll_size.1 > self.client_size.1
    }

    /// Visible viewport inside a bitmap of the full scrollable content.
    pub fn visible_rect(&self, bitmap: (u32, u32)) -> Option<PixelRect> {
        if self.scroll_size.0 <= 0.0 || self.scroll_size.1 <= 0.0 {
            return None;
        }
        let scale = (
            bitmap.0 as f32 / self.scroll_size.0,
            bitmap.1 as f32 / self.scroll_size.1,
        );
        let (left, top) = self.scroll_offset;
        BoundingBox::new(
            left,
            top,
            left + self.client_size.0,
            top + self.client_size.1,
        )
        .to_pixel_rect(scale, bitmap)
    }
}

/// A possibly scrollable element whose rendered content can be captured.
pub trait CapturableContainer {
    fn metrics(&self) -> ContainerMetrics;

    /// Renders the full scrollable content of the container.
    fn render_bitmap(&self) -> Result<RgbaImage>;

    /// False when no screenshot backend is available at all.
    fn is_capturable(&self) -> bool {
        true
    }
}

pub type SharedContainer = Arc<dyn CapturableContainer + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// A `data:` URL or a filesystem path.
    pub src: String,
    pub alt_text: String,
}

impl SourceImage {
    pub fn new(src: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt_text: alt_text.into(),
        }
    }

    pub fn load(&self) -> Result<RgbaImage> {
        let bytes = if self.src.trim_start().starts_with("data:") {
            decode_base64_payload(&self.src)?
        } else {
            std::fs::read(&self.src)
                .with_context(|| format!("read source image {}", self.src))?
        };
        decode_rgba(&bytes).with_context(|| format!("decode source image '{}'", self.alt_text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    CroppedRegion,
    DrawnOnSource,
    DrawnOnBlank,
}

impl RegionKind {
    /// Next strategy to try when this one fails. A failed crop skips the
    /// source image since the live container was the intended source.
    pub fn fallback(self) -> Option<RegionKind> {
        match self {
            Self::CroppedRegion | Self::DrawnOnSource => Some(Self::DrawnOnBlank),
            Self::DrawnOnBlank => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub region_kind: RegionKind,
    pub label: String,
}

impl CaptureResult {
    pub fn data_url(&self) -> String {
        png_data_url(&self.png)
    }
}

#[derive(Clone, Default)]
pub struct CaptureRequest {
    pub strokes: Vec<Stroke>,
    pub canvas_size: (f32, f32),
    pub container: Option<SharedContainer>,
    pub source: Option<SourceImage>,
}

impl std::fmt::Debug for CaptureRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureRequest")
            .field("strokes", &self.strokes.len())
            .field("canvas_size", &self.canvas_size)
            .field("container", &self.container.is_some())
            .field("source", &self.source)
            .finish()
    }
}

impl CaptureRequest {
    pub fn from_session(
        session: &DrawingSession,
        container: Option<SharedContainer>,
        source: Option<SourceImage>,
    ) -> Self {
        Self {
            strokes: session.strokes().to_vec(),
            canvas_size: session.viewport(),
            container,
            source,
        }
    }
}

pub fn select_strategy(has_capturable_container: bool, has_source: bool) -> RegionKind {
    if has_capturable_container {
        RegionKind::CroppedRegion
    } else if has_source {
        RegionKind::DrawnOnSource
    } else {
        RegionKind::DrawnOnBlank
    }
}

/// Runs the strategy chain for one completed stroke.
///
/// Returns `None` when the strokes do not enclose a useful region, or when
/// every strategy failed. Failures are logged, never returned.
pub fn capture_region(request: &CaptureRequest, settings: &CaptureSettings) -> Option<CaptureResult> {
    let Some(region) = BoundingBox::capture_region(
        &request.strokes,
        request.canvas_size,
        settings.padding,
        settings.min_region_size,
    ) else {
        tracing::debug!("annotation region below threshold, skipping capture");
        return None;
    };

    let has_container = request
        .container
        .as_ref()
        .is_some_and(|container| container.is_capturable());
    let mut strategy = select_strategy(has_container, request.source.is_some());
    loop {
        match run_strategy(strategy, request, region, settings) {
            Ok(result) => {
                tracing::debug!(
                    kind = ?result.region_kind,
                    width = result.width,
                    height = result.height,
                    "annotation captured"
                );
                return Some(result);
            }
            Err(err) => {
                tracing::warn!(strategy = ?strategy, "capture strategy failed: {err:#}");
                strategy = strategy.fallback()?;
            }
        }
    }
}

fn run_strategy(
    kind: RegionKind,
    request: &CaptureRequest,
    region: BoundingBox,
    settings: &CaptureSettings,
) -> Result<CaptureResult> {
    let (image, label) = match kind {
        RegionKind::CroppedRegion => {
            let container = request
                .container
                .as_deref()
                .ok_or_else(|| anyhow!("no capturable container"))?;
            let image = crop_container_region(
                container,
                &request.strokes,
                request.canvas_size,
                region,
                settings,
            )?;
            (image, "Cropped region of the lesson the student circled".to_string())
        }
        RegionKind::DrawnOnSource => {
            let source = request
                .source
                .as_ref()
                .ok_or_else(|| anyhow!("no source image"))?;
            let image = draw_on_source(source, &request.strokes, request.canvas_size, settings.stroke)?;
            let label = if source.alt_text.trim().is_empty() {
                "Student annotation drawn on the lesson image".to_string()
            } else {
                format!("Student annotation drawn on {}", source.alt_text.trim())
            };
            (image, label)
        }
        RegionKind::DrawnOnBlank => {
            let image = draw_on_blank(&request.strokes, request.canvas_size, settings)?;
            (image, "Student sketch on a blank canvas".to_string())
        }
    };

    let png = encode_png(&image)?;
    Ok(CaptureResult {
        png,
        width: image.width(),
        height: image.height(),
        region_kind: kind,
        label,
    })
}

/// Scale from overlay logical pixels to bitmap pixels, per axis.
pub fn overlay_scale(canvas_size: (f32, f32), bitmap: (u32, u32)) -> Result<(f32, f32)> {
    if canvas_size.0 <= 0.0 || canvas_size.1 <= 0.0 || bitmap.0 == 0 || bitmap.1 == 0 {
        return Err(anyhow!(
            "cannot scale {:?} overlay onto {:?} bitmap",
            canvas_size,
            bitmap
        ));
    }
    Ok((
        bitmap.0 as f32 / canvas_size.0,
        bitmap.1 as f32 / canvas_size.1,
    ))
}

/// Reduces a full-content capture to what is currently visible.
pub fn visible_viewport(bitmap: RgbaImage, metrics: ContainerMetrics) -> Result<RgbaImage> {
    if !metrics.is_scrolled() {
        return Ok(bitmap);
    }
    let rect = metrics
        .visible_rect(bitmap.dimensions())
        .ok_or_else(|| anyhow!("visible viewport is empty for {:?}", metrics))?;
    crop(&bitmap, rect)
}

pub fn crop_container_region(
    container: &dyn CapturableContainer,
    strokes: &[Stroke],
    canvas_size: (f32, f32),
    region: BoundingBox,
    settings: &CaptureSettings,
) -> Result<RgbaImage> {
    let bitmap = container
        .render_bitmap()
        .context("capture container bitmap")?;
    let mut viewport = visible_viewport(bitmap, container.metrics())?;
    let scale = overlay_scale(canvas_size, viewport.dimensions())?;

    if settings.composite_strokes_on_crop {
        draw_scaled_strokes(&mut viewport, strokes, scale, settings.stroke);
    }

    let rect = region
        .to_pixel_rect(scale, viewport.dimensions())
        .ok_or_else(|| anyhow!("crop of {:?} at scale {:?} is empty", region, scale))?;
    crop(&viewport, rect)
}

pub fn draw_on_source(
    source: &SourceImage,
    strokes: &[Stroke],
    canvas_size: (f32, f32),
    style: StrokeStyle,
) -> Result<RgbaImage> {
    let mut image = source.load()?;
    let scale = overlay_scale(canvas_size, image.dimensions())?;
    draw_scaled_strokes(&mut image, strokes, scale, style);
    Ok(image)
}

pub fn draw_on_blank(
    strokes: &[Stroke],
    canvas_size: (f32, f32),
    settings: &CaptureSettings,
) -> Result<RgbaImage> {
    let width = canvas_size.0.max(0.0).floor() as u32;
    let height = canvas_size.1.max(0.0).floor() as u32;
    if width == 0 || height == 0 {
        return Err(anyhow!("no drawing surface for a {:?} canvas", canvas_size));
    }
    let mut image = blank_canvas(width, height, settings.blank_background);
    render_strokes(&mut image, strokes, settings.stroke);
    Ok(image)
}

fn draw_scaled_strokes(image: &mut RgbaImage, strokes: &[Stroke], scale: (f32, f32), style: StrokeStyle) {
    let style = StrokeStyle {
        width: style.width * (scale.0 + scale.1) / 2.0,
        ..style
    };
    let scaled: Vec<Stroke> = strokes
        .iter()
        .filter(|stroke| !stroke.is_degenerate())
        .map(|stroke| stroke.scaled(scale.0, scale.1))
        .collect();
    render_strokes(image, &scaled, style);
}

/// Captures on a worker thread and publishes the result to `sink`.
/// Overlapping captures may finish in any order; the sink keeps the last write.
pub fn spawn_capture(
    request: CaptureRequest,
    settings: CaptureSettings,
    sink: Arc<AnnotationSink>,
) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("region-capture".into())
        .spawn(move || {
            if let Some(result) = capture_region(&request, &settings) {
                sink.publish(&result);
            }
        })
        .context("spawn region capture thread")
}

/// Hook for [`StrokeCanvas`](crate::draw::canvas::StrokeCanvas) that starts a
/// capture after every committed stroke.
pub fn capture_on_stroke_complete(
    container: Option<SharedContainer>,
    source: Option<SourceImage>,
    settings: CaptureSettings,
    sink: Arc<AnnotationSink>,
) -> StrokeCompleteHook {
    Box::new(move |session: &DrawingSession| {
        let request = CaptureRequest::from_session(session, container.clone(), source.clone());
        if let Err(err) = spawn_capture(request, settings.clone(), Arc::clone(&sink)) {
            tracing::warn!("annotation capture not started: {err:#}");
        }
    })
}
