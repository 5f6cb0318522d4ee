//! Lesson content produced by the generation pipeline and the logic that
//! decides which beat images accompany which topic page.

pub mod layout;
pub mod matcher;

pub use matcher::{match_beats_to_topics, match_beats_to_topics_with, MatcherSettings, TopicBeatAssignment};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Upper bound on beats kept from a pipeline document.
pub const MAX_BEATS: usize = 6;
/// Every beat carries exactly this many image steps after parsing.
pub const STEPS_PER_BEAT: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCard {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub subtopics: Vec<String>,
    #[serde(default)]
    pub story: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageStep {
    #[serde(default)]
    pub step_label: String,
    #[serde(default)]
    pub prompt: String,
    /// Base64 payload or `data:` URL. Empty means no image.
    #[serde(default)]
    pub image_data: String,
}

impl ImageStep {
    pub fn has_image(&self) -> bool {
        !self.image_data.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beat {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub narrative: String,
    #[serde(default)]
    pub is_decision: bool,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub image_steps: Vec<ImageStep>,
}

impl Beat {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn has_image(&self) -> bool {
        self.image_steps.iter().any(ImageStep::has_image)
    }

    pub fn images(&self) -> impl Iterator<Item = &ImageStep> {
        self.image_steps.iter().filter(|step| step.has_image())
    }
}

/// Parses the pipeline's `{"beats": [...]}` document.
///
/// Values are coerced leniently: strings are trimmed, blank choices dropped,
/// at most [`MAX_BEATS`] beats are kept and each ends up with exactly
/// [`STEPS_PER_BEAT`] image steps. A document without a `beats` array yields
/// no beats.
pub fn parse_story_beats(json: &str) -> Result<Vec<Beat>> {
    let doc: Value = serde_json::from_str(json).context("parse story beats document")?;
    let Some(raw) = doc.get("beats").and_then(Value::as_array) else {
        tracing::debug!("story beats document has no beats array");
        return Ok(Vec::new());
    };

    let beats: Vec<Beat> = raw.iter().take(MAX_BEATS).map(parse_beat).collect();
    if raw.len() > MAX_BEATS {
        tracing::debug!(dropped = raw.len() - MAX_BEATS, "truncated story beats");
    }
    Ok(beats)
}

fn parse_beat(raw: &Value) -> Beat {
    let mut image_steps: Vec<ImageStep> = raw
        .get("image_steps")
        .and_then(Value::as_array)
        .map(|steps| {
            steps
                .iter()
                .take(STEPS_PER_BEAT)
                .map(|step| ImageStep {
                    step_label: text(step.get("step_label")),
                    prompt: text(step.get("prompt")),
                    image_data: text(step.get("image_data")),
                })
                .collect()
        })
        .unwrap_or_default();
    image_steps.resize_with(STEPS_PER_BEAT, ImageStep::default);

    let choices = raw
        .get("choices")
        .and_then(Value::as_array)
        .map(|choices| {
            choices
                .iter()
                .map(|choice| text(Some(choice)))
                .filter(|choice| !choice.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Beat {
        label: text(raw.get("label")),
        narrative: text(raw.get("narrative")),
        is_decision: raw.get("is_decision").map(truthy).unwrap_or(false),
        choices,
        image_steps,
    }
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Decodes a step's image payload, bare base64 or `data:` URL.
pub fn decode_image_payload(image_data: &str) -> Result<Vec<u8>> {
    crate::draw::composite::decode_base64_payload(image_data)
}
