//! Stakeholder brief records.

use serde::{Deserialize, Serialize};

use crate::tags::SlideType;

/// A nine-slide stakeholder summary of a planned study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brief {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_for: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Exactly nine slides in [`SlideType::CANONICAL_ORDER`].
    pub slides: Vec<BriefSlide>,
}

impl Brief {
    pub fn slide(&self, slide_type: SlideType) -> Option<&BriefSlide> {
        self.slides
            .iter()
            .find(|slide| slide.slide_type == slide_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefSlide {
    pub slide_type: SlideType,
    pub title: String,
    /// Self-contained markup fragment produced upstream.
    pub content_html: String,
    #[serde(default)]
    pub presenter_notes: String,
}
