//! Domain layer: the record types every renderer reads.

pub use studydoc_records::{
    AbAssignment, AbDesign, AbVariant, BaseProtocol, BaseTask, BenchmarkDesign, BenchmarkProduct,
    BlockType, Brief, BriefSlide, ExploratoryProtocol, ExploratorySection, Fidelity,
    ModeratedProtocol, ModeratedTask, MonadicDesign, Platform, PostProductQuestion, ProbeQuestion,
    Protocol, ProtocolOverview, QuestionType, Role, ScaleLabels, Section, SectionType, SlideType,
    StudyType, SurveyBlock, SurveyProtocol, SurveyQuestion, TeamMember, TestDesign, Theme,
    UnmoderatedDesign, UnmoderatedProtocol, UnmoderatedTask,
};
