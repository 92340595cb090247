use std::collections::HashSet;
use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SequencerError};

/// One carousel entry: an ordered list of clips plus the text shown over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: u32,
    pub clips: Vec<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cta_label: String,
    #[serde(default)]
    pub cta_target: String,
}

impl Slide {
    pub fn new(id: u32, clips: Vec<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            clips,
            title: title.into(),
            description: String::new(),
            cta_label: String::new(),
            cta_target: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_cta(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.cta_label = label.into();
        self.cta_target = target.into();
        self
    }

    pub fn last_clip(&self) -> usize {
        self.clips.len().saturating_sub(1)
    }
}

/// Static, validated registry of slides. Lookups only, never mutated.
#[derive(Debug, Clone)]
pub struct SlideTrack {
    slides: Vec<Slide>,
}

impl SlideTrack {
    /// Builds a track, rejecting empty tracks, slides without clips and duplicate ids.
    pub fn new(slides: Vec<Slide>) -> Result<Self> {
        if slides.is_empty() {
            return Err(SequencerError::EmptyTrack);
        }

        let mut seen = HashSet::new();
        for slide in &slides {
            if slide.clips.is_empty() {
                return Err(SequencerError::EmptySlide { id: slide.id });
            }
            if !seen.insert(slide.id) {
                return Err(SequencerError::DuplicateSlideId { id: slide.id });
            }
        }

        Ok(Self { slides })
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Always false for a constructed track; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn clips(&self, index: usize) -> Option<&[String]> {
        self.slides.get(index).map(|slide| slide.clips.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slide> {
        self.slides.iter()
    }

    /// Index of the slide after `index`, wrapping to 0 after the last one.
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.slides.len()
    }

    pub(crate) fn check_index(&self, index: usize) -> Result<()> {
        if index < self.slides.len() {
            Ok(())
        } else {
            Err(SequencerError::SlideOutOfRange { index, count: self.slides.len() })
        }
    }
}

impl Index<usize> for SlideTrack {
    type Output = Slide;

    fn index(&self, index: usize) -> &Slide {
        &self.slides[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(id: u32, clips: &[&str]) -> Slide {
        Slide::new(id, clips.iter().map(|c| c.to_string()).collect(), format!("Slide {id}"))
    }

    #[test]
    fn rejects_empty_track() {
        assert_eq!(SlideTrack::new(vec![]).unwrap_err(), SequencerError::EmptyTrack);
    }

    #[test]
    fn rejects_slide_without_clips() {
        let err = SlideTrack::new(vec![slide(1, &["a.mp4"]), slide(2, &[])]).unwrap_err();
        assert_eq!(err, SequencerError::EmptySlide { id: 2 });
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = SlideTrack::new(vec![slide(7, &["a.mp4"]), slide(7, &["b.mp4"])]).unwrap_err();
        assert_eq!(err, SequencerError::DuplicateSlideId { id: 7 });
    }

    #[test]
    fn lookups() {
        let track = SlideTrack::new(vec![
            slide(1, &["a.mp4", "b.mp4"]),
            slide(2, &["c.mp4"]).with_cta("More", "#more"),
        ])
        .unwrap();

        assert_eq!(track.len(), 2);
        assert_eq!(track.clips(0).unwrap(), &["a.mp4".to_string(), "b.mp4".to_string()]);
        assert_eq!(track.get(1).unwrap().cta_target, "#more");
        assert!(track.get(2).is_none());
        assert_eq!(track.get(0).unwrap().last_clip(), 1);
    }

    #[test]
    fn next_index_wraps() {
        let track = SlideTrack::new(vec![slide(1, &["a"]), slide(2, &["b"]), slide(3, &["c"])]).unwrap();
        assert_eq!(track.next_index(0), 1);
        assert_eq!(track.next_index(2), 0);

        let single = SlideTrack::new(vec![slide(1, &["a"])]).unwrap();
        assert_eq!(single.next_index(0), 0);
    }

    #[test]
    fn check_index_reports_count() {
        let track = SlideTrack::new(vec![slide(1, &["a"])]).unwrap();
        assert!(track.check_index(0).is_ok());
        assert_eq!(
            track.check_index(3).unwrap_err(),
            SequencerError::SlideOutOfRange { index: 3, count: 1 }
        );
    }
}
