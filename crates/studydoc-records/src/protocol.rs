//! Research protocol records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tags::{BlockType, Fidelity, Platform, QuestionType, Role, SectionType};

/// Study methodology. Selects the protocol shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyType {
    ExploratoryInterview,
    ModeratedUsability,
    UnmoderatedUsability,
    Survey,
    DiaryStudy,
}

impl StudyType {
    pub const ALL: [StudyType; 5] = [
        StudyType::ExploratoryInterview,
        StudyType::ModeratedUsability,
        StudyType::UnmoderatedUsability,
        StudyType::Survey,
        StudyType::DiaryStudy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StudyType::ExploratoryInterview => "exploratory_interview",
            StudyType::ModeratedUsability => "moderated_usability",
            StudyType::UnmoderatedUsability => "unmoderated_usability",
            StudyType::Survey => "survey",
            StudyType::DiaryStudy => "diary_study",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test design of an unmoderated usability study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestDesign {
    Monadic,
    Ab,
    Benchmark,
}

impl TestDesign {
    pub const ALL: [TestDesign; 3] = [TestDesign::Monadic, TestDesign::Ab, TestDesign::Benchmark];

    pub fn as_str(self) -> &'static str {
        match self {
            TestDesign::Monadic => "monadic",
            TestDesign::Ab => "ab",
            TestDesign::Benchmark => "benchmark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// How participants are assigned to the two variants of an A/B test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbAssignment {
    /// Every participant sees both variants.
    Within,
    /// Each participant sees one variant.
    Between,
}

impl AbAssignment {
    pub fn as_str(self) -> &'static str {
        match self {
            AbAssignment::Within => "within",
            AbAssignment::Between => "between",
        }
    }
}

/// A research protocol, tagged on `study_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "study_type", rename_all = "snake_case")]
pub enum Protocol {
    ExploratoryInterview(ExploratoryProtocol),
    ModeratedUsability(ModeratedProtocol),
    UnmoderatedUsability(UnmoderatedProtocol),
    Survey(SurveyProtocol),
    /// Diary studies have no dedicated shape and use the base shape.
    DiaryStudy(BaseProtocol),
}

impl Protocol {
    pub fn study_type(&self) -> StudyType {
        match self {
            Protocol::ExploratoryInterview(_) => StudyType::ExploratoryInterview,
            Protocol::ModeratedUsability(_) => StudyType::ModeratedUsability,
            Protocol::UnmoderatedUsability(_) => StudyType::UnmoderatedUsability,
            Protocol::Survey(_) => StudyType::Survey,
            Protocol::DiaryStudy(_) => StudyType::DiaryStudy,
        }
    }

    pub fn overview(&self) -> &ProtocolOverview {
        match self {
            Protocol::ExploratoryInterview(p) => &p.overview,
            Protocol::ModeratedUsability(p) => &p.overview,
            Protocol::UnmoderatedUsability(p) => &p.overview,
            Protocol::Survey(p) => &p.overview,
            Protocol::DiaryStudy(p) => &p.overview,
        }
    }

    pub fn title(&self) -> &str {
        &self.overview().title
    }
}

/// Fields every protocol shape carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolOverview {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub objective: String,
    #[serde(default)]
    pub research_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub materials_needed: Vec<String>,
    #[serde(default)]
    pub observer_guide: Vec<String>,
    #[serde(default)]
    pub consent_note: String,
}

/// A timed block of a moderated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub section_type: SectionType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    /// Verbatim text the moderator reads aloud.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub title: String,
    pub opening_question: String,
    #[serde(default)]
    pub probes: Vec<String>,
    #[serde(default)]
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploratorySection {
    #[serde(flatten)]
    pub section: Section,
    #[serde(default)]
    pub themes: Vec<Theme>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploratoryProtocol {
    #[serde(flatten)]
    pub overview: ProtocolOverview,
    pub sections: Vec<ExploratorySection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub role: Role,
    pub responsibility: String,
}

/// Follow-up asked only when the trigger is observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeQuestion {
    pub trigger: String,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratedTask {
    pub title: String,
    pub scenario: String,
    pub success_criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub observer_cues: Vec<String>,
    #[serde(default)]
    pub post_task_questions: Vec<String>,
    #[serde(default)]
    pub probes: Vec<ProbeQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeratedProtocol {
    #[serde(flatten)]
    pub overview: ProtocolOverview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity: Option<Fidelity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_url: Option<String>,
    #[serde(default)]
    pub team: Vec<TeamMember>,
    pub sections: Vec<Section>,
    pub tasks: Vec<ModeratedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmoderatedTask {
    pub title: String,
    pub instructions: String,
    pub success_criteria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_minutes: Option<u32>,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonadicDesign {
    pub tasks: Vec<UnmoderatedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbVariant {
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_url: Option<String>,
    pub tasks: Vec<UnmoderatedTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbDesign {
    pub assignment: AbAssignment,
    /// Exactly two variants.
    pub variants: Vec<AbVariant>,
    /// Only asked when `assignment` is `within`.
    #[serde(default)]
    pub comparison_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleLabels {
    pub min: String,
    pub max: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mid: Option<String>,
}

/// Standardized-scale item asked after each benchmarked product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostProductQuestion {
    pub text: String,
    /// Instrument name such as `SUS` or `SEQ`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub scale_min: i32,
    pub scale_max: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_labels: Option<ScaleLabels>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkProduct {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub tasks: Vec<UnmoderatedTask>,
    #[serde(default)]
    pub post_product_questions: Vec<PostProductQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkDesign {
    /// Between two and five products.
    pub products: Vec<BenchmarkProduct>,
}

/// Unmoderated test designs, tagged on `test_design`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "test_design", rename_all = "snake_case")]
pub enum UnmoderatedDesign {
    Monadic(MonadicDesign),
    Ab(AbDesign),
    Benchmark(BenchmarkDesign),
}

impl UnmoderatedDesign {
    pub fn test_design(&self) -> TestDesign {
        match self {
            UnmoderatedDesign::Monadic(_) => TestDesign::Monadic,
            UnmoderatedDesign::Ab(_) => TestDesign::Ab,
            UnmoderatedDesign::Benchmark(_) => TestDesign::Benchmark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmoderatedProtocol {
    #[serde(flatten)]
    pub overview: ProtocolOverview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fidelity: Option<Fidelity>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(flatten)]
    pub design: UnmoderatedDesign,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub question_type: QuestionType,
    pub text: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_max: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_labels: Option<ScaleLabels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_rows: Option<Vec<String>>,
    #[serde(default)]
    pub allow_other: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyBlock {
    pub block_type: BlockType,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub questions: Vec<SurveyQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyProtocol {
    #[serde(flatten)]
    pub overview: ProtocolOverview,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_text: Option<String>,
    pub blocks: Vec<SurveyBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTask {
    pub title: String,
    pub instructions: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

/// Structural shape every protocol can be reduced to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseProtocol {
    #[serde(flatten)]
    pub overview: ProtocolOverview,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub tasks: Vec<BaseTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_schedule: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn overview() -> serde_json::Value {
        json!({
            "title": "Checkout study",
            "objective": "Find friction in checkout",
        })
    }

    #[test]
    fn unmoderated_protocol_reads_nested_design_tag() {
        let mut value = overview();
        value["study_type"] = json!("unmoderated_usability");
        value["test_design"] = json!("ab");
        value["assignment"] = json!("within");
        value["variants"] = json!([
            {"label": "A", "description": "Current", "tasks": []},
            {"label": "B", "description": "Redesign", "tasks": []},
        ]);
        value["comparison_questions"] = json!(["Which did you prefer?"]);

        let protocol: Protocol = serde_json::from_value(value).unwrap();
        let Protocol::UnmoderatedUsability(unmoderated) = protocol else {
            panic!("expected unmoderated protocol");
        };
        assert_eq!(unmoderated.design.test_design(), TestDesign::Ab);
        assert_eq!(unmoderated.overview.title, "Checkout study");
        assert!(unmoderated.sections.is_empty());
    }

    #[test]
    fn diary_study_uses_base_shape() {
        let mut value = overview();
        value["study_type"] = json!("diary_study");
        value["entry_schedule"] = json!("Daily for two weeks");
        value["tasks"] = json!([{"title": "Log", "instructions": "Write an entry"}]);

        let protocol: Protocol = serde_json::from_value(value).unwrap();
        assert_eq!(protocol.study_type(), StudyType::DiaryStudy);
        let Protocol::DiaryStudy(base) = protocol else {
            panic!("expected diary study");
        };
        assert_eq!(base.tasks[0].questions.len(), 0);
    }

    #[test]
    fn survey_questions_default_to_required() {
        let question: SurveyQuestion =
            serde_json::from_value(json!({"question_type": "open_long", "text": "Anything else?"}))
                .unwrap();
        assert!(question.required);
        assert!(question.options.is_none());
    }

    #[test]
    fn study_type_round_trips_through_parse() {
        for kind in StudyType::ALL {
            assert_eq!(StudyType::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(StudyType::parse("card_sort"), None);
    }
}
