use crate::{
    application::{
        numbering::{NumberingPlan, question_label},
        registry::RegistryTag,
        render::types::RenderOptions,
    },
    domain::{QuestionType, StudyType, SurveyBlock, SurveyProtocol, SurveyQuestion},
};

use super::{
    OptionStyle, PageComposer, PartHeader, ScaleVisual, TextStyle, non_blank, overview,
    protocol_cover,
};

const ANSWER_LINE: &str = "________________________________________________";

pub fn compose<C: PageComposer>(
    composer: &mut C,
    survey: &SurveyProtocol,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    let question_count: usize = survey.blocks.iter().map(|block| block.questions.len()).sum();
    let rows = vec![("Questions".to_string(), question_count.to_string())];
    composer.cover(&protocol_cover(&survey.overview, StudyType::Survey, rows, options));
    composer.page_break();
    overview(composer, &survey.overview);

    if let Some(intro) = survey.intro_text.as_deref().and_then(non_blank) {
        composer.heading("Introduction");
        composer.dialogue(&intro);
    }

    for (index, block) in survey.blocks.iter().enumerate() {
        survey_block(composer, block, plan.section(index));
    }

    if let Some(closing) = survey.closing_text.as_deref().and_then(non_blank) {
        composer.heading("Closing message");
        composer.dialogue(&closing);
    }
}

fn survey_block<C: PageComposer>(composer: &mut C, block: &SurveyBlock, offset: usize) {
    composer.part_header(&PartHeader::new(
        block.block_type.label(),
        block.title.as_str(),
        block.block_type.color(),
    ));
    if let Some(description) = block.description.as_deref().and_then(non_blank) {
        composer.paragraph(&description, TextStyle::Muted);
    }
    for (index, question) in block.questions.iter().enumerate() {
        survey_question(composer, question, &question_label(offset, index));
    }
}

fn survey_question<C: PageComposer>(composer: &mut C, question: &SurveyQuestion, label: &str) {
    let text = if question.required {
        format!("{} *", question.text)
    } else {
        question.text.clone()
    };
    composer.numbered(label, &text);

    let mut meta = question.question_type.label().into_owned();
    if !question.required {
        meta.push_str(" \u{00B7} Optional");
    }
    composer.paragraph(&meta, TextStyle::Muted);
    if let Some(help) = question.help_text.as_deref().and_then(non_blank) {
        composer.paragraph(&help, TextStyle::Muted);
    }

    match &question.question_type {
        QuestionType::SingleChoice | QuestionType::Demographic => {
            answer_options(composer, question, OptionStyle::Single)
        }
        QuestionType::MultipleChoice => answer_options(composer, question, OptionStyle::Multiple),
        QuestionType::Ranking => answer_options(composer, question, OptionStyle::Ranking),
        QuestionType::OpenShort => composer.paragraph(ANSWER_LINE, TextStyle::Muted),
        QuestionType::OpenLong => {
            for _ in 0..4 {
                composer.paragraph(ANSWER_LINE, TextStyle::Muted);
            }
        }
        QuestionType::Likert
        | QuestionType::Nps
        | QuestionType::Csat
        | QuestionType::Slider
        | QuestionType::Matrix => {
            if let Some(scale) = ScaleVisual::for_question(question) {
                composer.scale(&scale);
            }
        }
        QuestionType::Unknown(_) => {}
    }
}

fn answer_options<C: PageComposer>(
    composer: &mut C,
    question: &SurveyQuestion,
    style: OptionStyle,
) {
    let mut options = question.options.clone().unwrap_or_default();
    if question.allow_other {
        options.push("Other: ____________".to_string());
    }
    composer.options(&options, style);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::render::layout::recording::Recorder, domain::Protocol};
    use serde_json::json;

    #[test]
    fn nps_then_open_question_renders_scale_and_answer_line() {
        let protocol: Protocol = serde_json::from_value(json!({
            "study_type": "survey",
            "title": "Loyalty pulse",
            "objective": "Track NPS",
            "blocks": [{
                "block_type": "satisfaction",
                "title": "Recommendation",
                "questions": [
                    {"question_type": "nps", "text": "How likely are you to recommend us?",
                     "scale_min": 0, "scale_max": 10,
                     "scale_labels": {"min": "Not at all likely", "max": "Extremely likely"}},
                    {"question_type": "open_short", "text": "What is the main reason?", "required": false}
                ]
            }]
        }))
        .unwrap();
        let Protocol::Survey(survey) = &protocol else {
            unreachable!()
        };

        let mut recorder = Recorder::default();
        compose(
            &mut recorder,
            survey,
            &NumberingPlan::for_protocol(&protocol),
            &RenderOptions::default(),
        );

        assert_eq!(recorder.numbered_labels(), vec!["Q1", "Q2"]);
        assert!(recorder.contains("scale:Nps"));
        assert!(recorder.contains("Net Promoter Score"));
        assert!(recorder.contains("Short Answer \u{00B7} Optional"));
        assert!(recorder.contains("part:SATISFACTION|Recommendation"));
    }

    #[test]
    fn allow_other_appends_free_text_option() {
        let question: SurveyQuestion = serde_json::from_value(json!({
            "question_type": "multiple_choice", "text": "Which tools?",
            "options": ["Figma", "Sketch"], "allow_other": true
        }))
        .unwrap();
        let mut recorder = Recorder::default();
        survey_question(&mut recorder, &question, "Q1");
        assert!(recorder.contains("options:Multiple:Figma|Sketch|Other: ____________"));
    }
}
