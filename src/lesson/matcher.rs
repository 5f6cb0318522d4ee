use crate::lesson::{Beat, TopicCard};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// Normalized labels shorter than this never take part in label
    /// matching. `1` only skips empty labels.
    #[serde(default = "default_min_label_chars")]
    pub min_label_chars: usize,
    /// Images shown per topic page.
    #[serde(default = "default_max_images_per_topic")]
    pub max_images_per_topic: usize,
}

fn default_min_label_chars() -> usize {
    1
}

fn default_max_images_per_topic() -> usize {
    2
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            min_label_chars: default_min_label_chars(),
            max_images_per_topic: default_max_images_per_topic(),
        }
    }
}

/// Beat indices assigned to each topic, in assignment order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicBeatAssignment {
    slots: Vec<Vec<usize>>,
}

impl TopicBeatAssignment {
    fn with_topics(count: usize) -> Self {
        Self {
            slots: vec![Vec::new(); count],
        }
    }

    pub fn topic_count(&self) -> usize {
        self.slots.len()
    }

    /// Beat indices for `topic`. Unknown topics have no beats.
    pub fn beats_for(&self, topic: usize) -> &[usize] {
        self.slots.get(topic).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn resolve<'a>(&self, topic: usize, beats: &'a [Beat]) -> Vec<&'a Beat> {
        self.beats_for(topic)
            .iter()
            .filter_map(|&index| beats.get(index))
            .collect()
    }

    /// True when no topic received any beat.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[usize])> {
        self.slots
            .iter()
            .enumerate()
            .map(|(topic, beats)| (topic, beats.as_slice()))
    }

    fn assign(&mut self, topic: usize, beat: usize) {
        self.slots[topic].push(beat);
    }

    fn is_unassigned(&self, topic: usize) -> bool {
        self.slots[topic].is_empty()
    }
}

pub fn match_beats_to_topics(topics: &[TopicCard], beats: &[Beat]) -> TopicBeatAssignment {
    match_beats_to_topics_with(topics, beats, &MatcherSettings::default())
}

/// Assigns beats to topics in three passes: label affinity, then index
/// aligned fallback for topics still empty, then round-robin of whatever
/// image-bearing beats remain.
pub fn match_beats_to_topics_with(
    topics: &[TopicCard],
    beats: &[Beat],
    settings: &MatcherSettings,
) -> TopicBeatAssignment {
    let mut assignment = TopicBeatAssignment::with_topics(topics.len());
    let mut consumed = vec![false; beats.len()];
    let min_chars = settings.min_label_chars.max(1);

    let beat_labels: Vec<Option<String>> = beats
        .iter()
        .map(|beat| normalize(&beat.label, min_chars))
        .collect();

    for (topic_index, topic) in topics.iter().enumerate() {
        let labels = topic_labels(topic, min_chars);
        if labels.is_empty() {
            continue;
        }
        for (beat_index, label) in beat_labels.iter().enumerate() {
            if consumed[beat_index] {
                continue;
            }
            let Some(label) = label else {
                continue;
            };
            if labels
                .iter()
                .any(|topic_label| topic_label.contains(label.as_str()) || label.contains(topic_label.as_str()))
            {
                assignment.assign(topic_index, beat_index);
                consumed[beat_index] = true;
            }
        }
    }
    tracing::trace!(
        matched = consumed.iter().filter(|c| **c).count(),
        "beat label pass done"
    );

    for topic_index in 0..topics.len() {
        if !assignment.is_unassigned(topic_index) {
            continue;
        }
        if let Some(beat) = beats.get(topic_index) {
            if !consumed[topic_index] && beat.has_image() {
                assignment.assign(topic_index, topic_index);
                consumed[topic_index] = true;
            }
        }
    }

    let leftovers: Vec<usize> = beats
        .iter()
        .enumerate()
        .filter(|(index, beat)| !consumed[*index] && beat.has_image())
        .map(|(index, _)| index)
        .collect();
    if !leftovers.is_empty() {
        if topics.is_empty() {
            tracing::debug!(
                leftovers = leftovers.len(),
                "no topics to distribute leftover beats to"
            );
        } else {
            let empty: Vec<usize> = (0..topics.len())
                .filter(|&topic| assignment.is_unassigned(topic))
                .collect();
            let targets: Vec<usize> = if empty.is_empty() {
                (0..topics.len()).collect()
            } else {
                empty
            };
            for (k, &beat_index) in leftovers.iter().enumerate() {
                assignment.assign(targets[k % targets.len()], beat_index);
            }
        }
    }

    tracing::debug!(
        topics = topics.len(),
        beats = beats.len(),
        "matched story beats to topics"
    );
    assignment
}

fn normalize(label: &str, min_chars: usize) -> Option<String> {
    let label = label.trim().to_lowercase();
    (label.chars().count() >= min_chars).then_some(label)
}

fn topic_labels(topic: &TopicCard, min_chars: usize) -> Vec<String> {
    topic
        .topics
        .iter()
        .chain(topic.subtopics.iter())
        .chain(std::iter::once(&topic.title))
        .filter_map(|label| normalize(label, min_chars))
        .collect()
}
