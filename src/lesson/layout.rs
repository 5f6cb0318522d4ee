use crate::lesson::{Beat, ImageStep, MatcherSettings};
use once_cell::sync::Lazy;
use regex::Regex;

// Blank lines separate paragraphs; whitespace-only lines count as blank.
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*(?:\r?\n[ \t]*)+").unwrap());

/// Images shown on a topic page: the first `max_images_per_topic` found by
/// scanning the beats' steps in order.
pub fn topic_images<'a, I>(beats: I, settings: &MatcherSettings) -> Vec<&'a ImageStep>
where
    I: IntoIterator<Item = &'a Beat>,
{
    beats
        .into_iter()
        .flat_map(|beat| beat.images())
        .take(settings.max_images_per_topic)
        .collect()
}

pub fn split_paragraphs(story: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(story.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryBlock<'a> {
    Paragraph(&'a str),
    Image(&'a ImageStep),
}

/// Paragraph after which the image at `slot` is placed.
pub fn image_anchor(slot: usize, paragraph_count: usize) -> usize {
    match slot {
        0 => 0,
        1 if paragraph_count > 3 => 2,
        1 => 1,
        _ => paragraph_count.saturating_sub(1),
    }
}

/// Interleaves images into the story: the first after paragraph one, the
/// second after paragraph two (three when the story has more than three
/// paragraphs). Images whose anchor paragraph does not exist follow the last
/// paragraph.
pub fn interleave_story<'a>(story: &'a str, images: &[&'a ImageStep]) -> Vec<StoryBlock<'a>> {
    let paragraphs = split_paragraphs(story);
    let last = paragraphs.len().saturating_sub(1);

    let mut anchored: Vec<Vec<&'a ImageStep>> = vec![Vec::new(); paragraphs.len().max(1)];
    for (slot, &image) in images.iter().enumerate() {
        let anchor = image_anchor(slot, paragraphs.len()).min(last);
        anchored[anchor].push(image);
    }

    let mut blocks = Vec::with_capacity(paragraphs.len() + images.len());
    if paragraphs.is_empty() {
        blocks.extend(anchored[0].iter().map(|&image| StoryBlock::Image(image)));
        return blocks;
    }
    for (index, paragraph) in paragraphs.into_iter().enumerate() {
        blocks.push(StoryBlock::Paragraph(paragraph));
        blocks.extend(anchored[index].iter().map(|&image| StoryBlock::Image(image)));
    }
    blocks
}
