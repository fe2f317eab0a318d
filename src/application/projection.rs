//! Reduction of every protocol shape to [`BaseProtocol`].
//!
//! Renderers without a dedicated layout for a shape render its projection.
//! The projection keeps question order group-for-group, so numbering computed
//! on the projection matches numbering computed on the original shape.

use crate::domain::{
    AbAssignment, BaseProtocol, BaseTask, Protocol, Section, SectionType, SurveyQuestion,
    UnmoderatedDesign, UnmoderatedTask,
};

use super::registry::RegistryTag;

impl ProjectToBase for Protocol {
    fn to_base(&self) -> BaseProtocol {
        match self {
            Protocol::ExploratoryInterview(protocol) => BaseProtocol {
                overview: protocol.overview.clone(),
                sections: protocol
                    .sections
                    .iter()
                    .map(|exploratory| {
                        let mut section = exploratory.section.clone();
                        section.questions.extend(
                            exploratory
                                .themes
                                .iter()
                                .map(|theme| theme.opening_question.clone()),
                        );
                        section.tips.extend(
                            exploratory
                                .themes
                                .iter()
                                .filter(|theme| theme.sensitive)
                                .map(|theme| format!("Sensitive topic: {}", theme.title)),
                        );
                        section
                    })
                    .collect(),
                tasks: Vec::new(),
                entry_schedule: None,
            },
            Protocol::ModeratedUsability(protocol) => BaseProtocol {
                overview: protocol.overview.clone(),
                sections: protocol.sections.clone(),
                tasks: protocol
                    .tasks
                    .iter()
                    .map(|task| BaseTask {
                        title: task.title.clone(),
                        instructions: format!(
                            "{}\nSuccess: {}",
                            task.scenario, task.success_criteria
                        ),
                        questions: task.post_task_questions.clone(),
                    })
                    .collect(),
                entry_schedule: None,
            },
            Protocol::UnmoderatedUsability(protocol) => BaseProtocol {
                overview: protocol.overview.clone(),
                sections: protocol.sections.clone(),
                tasks: unmoderated_tasks(&protocol.design),
                entry_schedule: None,
            },
            Protocol::Survey(survey) => BaseProtocol {
                overview: survey.overview.clone(),
                sections: survey
                    .blocks
                    .iter()
                    .map(|block| Section {
                        section_type: SectionType::Core,
                        title: format!("{}: {}", block.block_type.label(), block.title),
                        duration_minutes: None,
                        script: block.description.clone(),
                        questions: block.questions.iter().map(flatten_question).collect(),
                        tips: Vec::new(),
                    })
                    .collect(),
                tasks: Vec::new(),
                entry_schedule: None,
            },
            Protocol::DiaryStudy(base) => base.clone(),
        }
    }
}

/// Shapes that can be rendered by a base-shape renderer.
pub trait ProjectToBase {
    fn to_base(&self) -> BaseProtocol;
}

fn unmoderated_tasks(design: &UnmoderatedDesign) -> Vec<BaseTask> {
    match design {
        UnmoderatedDesign::Monadic(monadic) => monadic.tasks.iter().map(base_task).collect(),
        UnmoderatedDesign::Ab(ab) => {
            let mut tasks: Vec<BaseTask> = ab
                .variants
                .iter()
                .flat_map(|variant| {
                    variant.tasks.iter().map(move |task| {
                        let mut base = base_task(task);
                        base.title = format!("Variant {}: {}", variant.label, task.title);
                        base
                    })
                })
                .collect();
            if ab.assignment == AbAssignment::Within && !ab.comparison_questions.is_empty() {
                tasks.push(BaseTask {
                    title: "Compare variants".to_string(),
                    instructions: "Ask after the participant has seen both variants.".to_string(),
                    questions: ab.comparison_questions.clone(),
                });
            }
            tasks
        }
        UnmoderatedDesign::Benchmark(benchmark) => benchmark
            .products
            .iter()
            .flat_map(|product| {
                let mut tasks: Vec<BaseTask> = product
                    .tasks
                    .iter()
                    .map(|task| {
                        let mut base = base_task(task);
                        base.title = format!("{}: {}", product.name, task.title);
                        base
                    })
                    .collect();
                if !product.post_product_questions.is_empty() {
                    tasks.push(BaseTask {
                        title: format!("{}: after using the product", product.name),
                        instructions: product.description.clone(),
                        questions: product
                            .post_product_questions
                            .iter()
                            .map(|question| {
                                format!(
                                    "{} ({} to {})",
                                    question.text, question.scale_min, question.scale_max
                                )
                            })
                            .collect(),
                    });
                }
                tasks
            })
            .collect(),
    }
}

fn base_task(task: &UnmoderatedTask) -> BaseTask {
    BaseTask {
        title: task.title.clone(),
        instructions: format!("{}\nSuccess: {}", task.instructions, task.success_criteria),
        questions: task.follow_up_questions.clone(),
    }
}

fn flatten_question(question: &SurveyQuestion) -> String {
    let mut text = format!("[{}] {}", question.question_type.label(), question.text);
    if let Some(options) = question.options.as_ref().filter(|options| !options.is_empty()) {
        text.push_str(" (");
        text.push_str(&options.join(" / "));
        text.push(')');
    }
    if let (Some(min), Some(max)) = (question.scale_min, question.scale_max) {
        text.push_str(&format!(" ({min} to {max})"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ab_projection_gates_comparison_questions_on_assignment() {
        let mut value = json!({
            "study_type": "unmoderated_usability",
            "title": "Pricing page",
            "objective": "Compare layouts",
            "test_design": "ab",
            "assignment": "between",
            "variants": [
                {"label": "A", "description": "Current", "tasks": [
                    {"title": "Find plan", "instructions": "Find the team plan", "success_criteria": "Opens plan"}
                ]},
                {"label": "B", "description": "New", "tasks": [
                    {"title": "Find plan", "instructions": "Find the team plan", "success_criteria": "Opens plan"}
                ]}
            ],
            "comparison_questions": ["Which was clearer?"]
        });

        let between: Protocol = serde_json::from_value(value.clone()).unwrap();
        let base = between.to_base();
        assert_eq!(base.tasks.len(), 2);
        assert_eq!(base.tasks[0].title, "Variant A: Find plan");

        value["assignment"] = json!("within");
        let within: Protocol = serde_json::from_value(value).unwrap();
        let base = within.to_base();
        assert_eq!(base.tasks.len(), 3);
        assert_eq!(base.tasks[2].questions, vec!["Which was clearer?".to_string()]);
    }

    #[test]
    fn survey_projection_keeps_question_order() {
        let survey: Protocol = serde_json::from_value(json!({
            "study_type": "survey",
            "title": "NPS pulse",
            "objective": "Track loyalty",
            "blocks": [{
                "block_type": "satisfaction",
                "title": "Loyalty",
                "questions": [
                    {"question_type": "nps", "text": "How likely are you to recommend us?", "scale_min": 0, "scale_max": 10},
                    {"question_type": "open_short", "text": "Why?"}
                ]
            }]
        }))
        .unwrap();

        let base = survey.to_base();
        assert_eq!(base.sections.len(), 1);
        assert_eq!(base.sections[0].title, "Satisfaction: Loyalty");
        assert_eq!(
            base.sections[0].questions,
            vec![
                "[Net Promoter Score] How likely are you to recommend us? (0 to 10)".to_string(),
                "[Short Answer] Why?".to_string(),
            ]
        );
    }
}
