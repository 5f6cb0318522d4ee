use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::draw::bounds::{DEFAULT_MIN_REGION_SIZE, DEFAULT_REGION_PADDING};
use crate::draw::model::{Color, StrokeStyle};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureSettings {
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default = "default_min_region_size")]
    pub min_region_size: f32,
    #[serde(default)]
    pub stroke: StrokeStyle,
    #[serde(default = "default_blank_background")]
    #[serde(alias = "blank_background_color")]
    pub blank_background: Color,
    #[serde(default = "default_annotation_ttl_secs")]
    pub annotation_ttl_secs: u64,
    #[serde(default = "default_composite_strokes_on_crop")]
    pub composite_strokes_on_crop: bool,
}

fn default_padding() -> f32 {
    DEFAULT_REGION_PADDING
}

fn default_min_region_size() -> f32 {
    DEFAULT_MIN_REGION_SIZE
}

fn default_blank_background() -> Color {
    Color::WHITE
}

fn default_annotation_ttl_secs() -> u64 {
    300
}

fn default_composite_strokes_on_crop() -> bool {
    true
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            min_region_size: default_min_region_size(),
            stroke: StrokeStyle::default(),
            blank_background: default_blank_background(),
            annotation_ttl_secs: default_annotation_ttl_secs(),
            composite_strokes_on_crop: default_composite_strokes_on_crop(),
        }
    }
}

impl CaptureSettings {
    pub fn annotation_ttl(&self) -> Duration {
        Duration::from_secs(self.annotation_ttl_secs)
    }

    /// Replaces nonsensical values with defaults.
    pub fn sanitized(mut self) -> Self {
        if !self.padding.is_finite() || self.padding < 0.0 {
            self.padding = default_padding();
        }
        if !self.min_region_size.is_finite() || self.min_region_size < 0.0 {
            self.min_region_size = default_min_region_size();
        }
        if !self.stroke.width.is_finite() || self.stroke.width <= 0.0 {
            self.stroke.width = StrokeStyle::default().width;
        }
        self
    }
}
