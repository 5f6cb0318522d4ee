use crate::draw::capture::{CaptureResult, RegionKind};
use crate::draw::settings::CaptureSettings;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

pub const ANNOTATION_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Base64 PNG data URL.
    pub image_data: String,
    pub region_kind: RegionKind,
    pub label: String,
}

#[derive(Debug)]
struct Slot {
    annotation: Annotation,
    written_at: Instant,
}

#[derive(Debug)]
struct State {
    slot: Option<Slot>,
    ttl: Duration,
}

/// Single-slot mailbox holding the most recent annotation. Reads past the
/// freshness window behave as if the slot were empty.
#[derive(Debug)]
pub struct AnnotationSink {
    state: Mutex<State>,
}

impl Default for AnnotationSink {
    fn default() -> Self {
        Self::new(ANNOTATION_TTL)
    }
}

static ANNOTATION_SINK: Lazy<Arc<AnnotationSink>> = Lazy::new(|| Arc::new(AnnotationSink::default()));

pub fn annotation_sink() -> Arc<AnnotationSink> {
    Arc::clone(&ANNOTATION_SINK)
}

/// Applies the configured freshness window to the shared sink and returns it.
pub fn configure_annotation_sink(settings: &CaptureSettings) -> Arc<AnnotationSink> {
    let sink = annotation_sink();
    sink.set_ttl(settings.annotation_ttl());
    tracing::debug!(ttl_secs = settings.annotation_ttl_secs, "annotation sink configured");
    sink
}

impl AnnotationSink {
    pub fn new(ttl: Duration) -> Self {
        Self {
            state: Mutex::new(State { slot: None, ttl }),
        }
    }

    pub fn from_settings(settings: &CaptureSettings) -> Self {
        Self::new(settings.annotation_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.lock().ttl
    }

    pub fn set_ttl(&self, ttl: Duration) {
        self.lock().ttl = ttl;
    }

    pub fn set_annotation(&self, image_data: String, region_kind: RegionKind, label: String) {
        self.set_annotation_at(image_data, region_kind, label, Instant::now());
    }

    pub fn set_annotation_at(
        &self,
        image_data: String,
        region_kind: RegionKind,
        label: String,
        now: Instant,
    ) {
        self.lock().slot = Some(Slot {
            annotation: Annotation {
                image_data,
                region_kind,
                label,
            },
            written_at: now,
        });
    }

    pub fn publish(&self, result: &CaptureResult) {
        tracing::debug!(kind = ?result.region_kind, bytes = result.png.len(), "publishing annotation");
        self.set_annotation(result.data_url(), result.region_kind, result.label.clone());
    }

    pub fn get_annotation(&self) -> Option<Annotation> {
        self.get_annotation_at(Instant::now())
    }

    pub fn get_annotation_at(&self, now: Instant) -> Option<Annotation> {
        let state = self.lock();
        let slot = state.slot.as_ref()?;
        if now.saturating_duration_since(slot.written_at) >= state.ttl {
            return None;
        }
        Some(slot.annotation.clone())
    }

    pub fn clear_annotation(&self) {
        self.lock().slot = None;
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
