//! Record types exchanged between research-plan producers and the studydoc
//! renderer.
//!
//! Records are plain serde types. They carry no rendering logic; the renderer
//! crate owns labels, colors, numbering and validation.

pub mod brief;
pub mod protocol;
pub mod tags;

pub use brief::{Brief, BriefSlide};
pub use protocol::{
    AbAssignment, AbDesign, AbVariant, BaseProtocol, BaseTask, BenchmarkDesign, BenchmarkProduct,
    ExploratoryProtocol, ExploratorySection, ModeratedProtocol, ModeratedTask, MonadicDesign,
    PostProductQuestion, ProbeQuestion, Protocol, ProtocolOverview, ScaleLabels, Section,
    StudyType, SurveyBlock, SurveyProtocol, SurveyQuestion, TeamMember, TestDesign, Theme,
    UnmoderatedDesign, UnmoderatedProtocol, UnmoderatedTask,
};
pub use tags::{BlockType, Fidelity, Platform, QuestionType, Role, SectionType, SlideType};
