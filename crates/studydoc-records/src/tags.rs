//! Descriptive tags carried by records.
//!
//! Open tags accept values this version does not know about and keep them
//! verbatim in an `Unknown` variant, so older or newer producers never make a
//! record unreadable. Discriminants that select a record shape live next to
//! the shapes they select and are closed.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! open_tag {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $variant, )+
            /// A value outside the known vocabulary, kept as produced.
            Unknown(String),
        }

        impl $name {
            /// Every value this version recognises, in declaration order.
            pub const KNOWN: &'static [&'static str] = &[$($value),+];

            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, $name::Unknown(_))
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $value => $name::$variant, )+
                    _ => $name::Unknown(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::from(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Unknown(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_tag! {
    /// Role a section plays in a moderated session.
    pub enum SectionType {
        Introduction => "introduction",
        WarmUp => "warm_up",
        Context => "context",
        Core => "core",
        Tasks => "tasks",
        Reflection => "reflection",
        Debrief => "debrief",
        WrapUp => "wrap_up",
    }
}

impl SectionType {
    /// Debrief sections are numbered after every task-bound question.
    pub fn is_debrief(&self) -> bool {
        matches!(self, SectionType::Debrief)
    }
}

open_tag! {
    /// Survey question kinds. The kind decides which of `options`,
    /// `scale_min`/`scale_max`, `scale_labels` and `matrix_rows` apply.
    pub enum QuestionType {
        Likert => "likert",
        Nps => "nps",
        Csat => "csat",
        SingleChoice => "single_choice",
        MultipleChoice => "multiple_choice",
        Ranking => "ranking",
        OpenShort => "open_short",
        OpenLong => "open_long",
        Matrix => "matrix",
        Slider => "slider",
        Demographic => "demographic",
    }
}

open_tag! {
    /// Purpose of a survey block.
    pub enum BlockType {
        Screener => "screener",
        Demographics => "demographics",
        Behavior => "behavior",
        Attitudes => "attitudes",
        Satisfaction => "satisfaction",
        FeatureFeedback => "feature_feedback",
        OpenFeedback => "open_feedback",
        Closing => "closing",
    }
}

open_tag! {
    /// Tool or setting a study runs on.
    pub enum Platform {
        Zoom => "zoom",
        Teams => "teams",
        GoogleMeet => "google_meet",
        InPerson => "in_person",
        Phone => "phone",
        Lookback => "lookback",
        UserTesting => "usertesting",
        Maze => "maze",
        UserZoom => "userzoom",
        Lyssna => "lyssna",
        Qualtrics => "qualtrics",
        Typeform => "typeform",
        GoogleForms => "google_forms",
        SurveyMonkey => "surveymonkey",
        Dscout => "dscout",
    }
}

open_tag! {
    /// Fidelity of the artifact under test.
    pub enum Fidelity {
        Wireframe => "wireframe",
        Low => "low",
        Mid => "mid",
        High => "high",
        LiveProduct => "live_product",
    }
}

open_tag! {
    /// Research team roles listed in a moderated session plan.
    pub enum Role {
        Moderator => "moderator",
        NoteTaker => "note_taker",
        Observer => "observer",
        Stakeholder => "stakeholder",
        TechnicalSupport => "technical_support",
    }
}

/// Slide kinds of a stakeholder brief, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlideType {
    Cover,
    Context,
    Objectives,
    Methodology,
    Participants,
    Timeline,
    Deliverables,
    Insights,
    NextSteps,
}

impl SlideType {
    /// The only order a brief's slides may appear in.
    pub const CANONICAL_ORDER: [SlideType; 9] = [
        SlideType::Cover,
        SlideType::Context,
        SlideType::Objectives,
        SlideType::Methodology,
        SlideType::Participants,
        SlideType::Timeline,
        SlideType::Deliverables,
        SlideType::Insights,
        SlideType::NextSteps,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SlideType::Cover => "cover",
            SlideType::Context => "context",
            SlideType::Objectives => "objectives",
            SlideType::Methodology => "methodology",
            SlideType::Participants => "participants",
            SlideType::Timeline => "timeline",
            SlideType::Deliverables => "deliverables",
            SlideType::Insights => "insights",
            SlideType::NextSteps => "next_steps",
        }
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_tags_keep_unknown_values_verbatim() {
        let tag: SectionType = serde_json::from_str("\"icebreaker\"").unwrap();
        assert_eq!(tag, SectionType::Unknown("icebreaker".into()));
        assert_eq!(serde_json::to_string(&tag).unwrap(), "\"icebreaker\"");
    }

    #[test]
    fn known_tags_parse_into_variants() {
        let tag: QuestionType = serde_json::from_str("\"open_short\"").unwrap();
        assert_eq!(tag, QuestionType::OpenShort);
        assert!(tag.is_known());
        assert_eq!(QuestionType::KNOWN.len(), 11);
    }

    #[test]
    fn slide_types_reject_unknown_values() {
        assert!(serde_json::from_str::<SlideType>("\"appendix\"").is_err());
        assert_eq!(SlideType::CANONICAL_ORDER[8].as_str(), "next_steps");
    }
}
