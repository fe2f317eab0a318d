//! Slide layouts per record shape.
//!
//! Sections and tasks each open a banner slide. Scripts, tips and probes go
//! to the presenter notes so the slide face stays readable.

use crate::{
    application::{
        numbering::{NumberingPlan, question_label},
        registry::RegistryTag,
        render::{
            fragment::{BlockKind, FragmentBlock},
            layout::{
                brief::brief_cover,
                moderated::{self, probe_lines, team_rows},
                non_blank, protocol_cover, split_sections,
            },
            types::RenderOptions,
        },
    },
    domain::{
        BaseProtocol, Brief, ExploratoryProtocol, ModeratedProtocol, ProtocolOverview, Section,
        SectionType, SlideType, StudyType,
    },
};

use super::deck::{Banner, Deck, DeckBuilder};

pub fn exploratory(protocol: &ExploratoryProtocol, plan: &NumberingPlan, options: &RenderOptions) -> Deck {
    let mut deck = DeckBuilder::new(protocol.overview.title.as_str());
    deck.cover(&protocol_cover(
        &protocol.overview,
        StudyType::ExploratoryInterview,
        Vec::new(),
        options,
    ));
    overview(&mut deck, &protocol.overview);

    let (leading, debrief): (Vec<_>, Vec<_>) = protocol
        .sections
        .iter()
        .enumerate()
        .partition(|(_, entry)| !entry.section.section_type.is_debrief());
    for (index, entry) in leading.into_iter().chain(debrief) {
        let offset = plan.section(index);
        section(&mut deck, &entry.section, offset);

        let theme_offset = offset + entry.section.questions.len();
        for (position, theme) in entry.themes.iter().enumerate() {
            deck.content(Banner {
                caption: format!("Theme {}", position + 1),
                title: theme.title.clone(),
                accent: entry.section.section_type.color(),
            });
            if theme.sensitive {
                deck.callout(
                    "Sensitive topic",
                    &["Approach gently; the participant can skip this theme.".to_string()],
                );
            }
            deck.numbered(&question_label(theme_offset, position), &theme.opening_question);
            deck.notes(theme.probes.iter().map(|probe| format!("Probe: {probe}")));
        }
    }
    deck.finish()
}

pub fn moderated(protocol: &ModeratedProtocol, plan: &NumberingPlan, options: &RenderOptions) -> Deck {
    let mut deck = DeckBuilder::new(protocol.overview.title.as_str());
    deck.cover(&moderated::cover(protocol, options));
    overview(&mut deck, &protocol.overview);

    if !protocol.team.is_empty() {
        deck.content(Banner {
            caption: "Session".to_string(),
            title: "Research team".to_string(),
            accent: SectionType::Introduction.color(),
        });
        let members: Vec<String> = team_rows(protocol)
            .into_iter()
            .map(|(role, responsibility)| format!("{role}: {responsibility}"))
            .collect();
        deck.bullets(&members);
    }

    let (leading, debrief) = split_sections(&protocol.sections);
    for (index, entry) in leading {
        section(&mut deck, entry, plan.section(index));
    }
    for (index, task) in protocol.tasks.iter().enumerate() {
        deck.content(Banner {
            caption: task_caption(index, task.time_limit_minutes),
            title: task.title.clone(),
            accent: SectionType::Tasks.color(),
        });
        deck.dialogue(&task.scenario);
        deck.muted(&format!("Success: {}", task.success_criteria));
        for (position, question) in task.post_task_questions.iter().enumerate() {
            deck.numbered(&question_label(plan.task(index), position), question);
        }
        deck.notes(
            task.observer_cues
                .iter()
                .map(|cue| format!("Observe: {cue}"))
                .chain(probe_lines(task)),
        );
    }
    for (index, entry) in debrief {
        section(&mut deck, entry, plan.section(index));
    }
    deck.finish()
}

/// Deck for any record reduced to the base shape.
pub fn generic(
    base: &BaseProtocol,
    study_type: StudyType,
    plan: &NumberingPlan,
    options: &RenderOptions,
) -> Deck {
    let mut deck = DeckBuilder::new(base.overview.title.as_str());
    deck.cover(&protocol_cover(&base.overview, study_type, Vec::new(), options));
    overview(&mut deck, &base.overview);
    if let Some(schedule) = base.entry_schedule.as_deref().and_then(non_blank) {
        deck.muted(&format!("Entry schedule: {schedule}"));
    }

    let (leading, debrief) = split_sections(&base.sections);
    for (index, entry) in leading {
        section(&mut deck, entry, plan.section(index));
    }
    for (index, task) in base.tasks.iter().enumerate() {
        deck.content(Banner {
            caption: task_caption(index, None),
            title: task.title.clone(),
            accent: SectionType::Tasks.color(),
        });
        deck.paragraph(&task.instructions);
        for (position, question) in task.questions.iter().enumerate() {
            deck.numbered(&question_label(plan.task(index), position), question);
        }
    }
    for (index, entry) in debrief {
        section(&mut deck, entry, plan.section(index));
    }
    deck.finish()
}

/// One slide per brief slide; `fragments[i]` belongs to `brief.slides[i]`.
pub fn brief(brief: &Brief, fragments: &[Vec<FragmentBlock>], options: &RenderOptions) -> Deck {
    let mut deck = DeckBuilder::new(brief.title.as_str());
    for (slide, blocks) in brief.slides.iter().zip(fragments) {
        match slide.slide_type {
            SlideType::Cover => deck.cover(&brief_cover(brief, options)),
            _ => deck.content(Banner {
                caption: slide.slide_type.label().into_owned(),
                title: slide.title.clone(),
                accent: slide.slide_type.color(),
            }),
        }
        fragment_blocks(&mut deck, blocks);
        deck.notes(non_blank(&slide.presenter_notes));
    }
    deck.finish()
}

fn fragment_blocks(deck: &mut DeckBuilder, blocks: &[FragmentBlock]) {
    let mut ordinal = 0;
    for block in blocks {
        if block.kind != BlockKind::Numbered {
            ordinal = 0;
        }
        match block.kind {
            BlockKind::Heading => deck.heading(&block.text),
            BlockKind::Paragraph => deck.paragraph(&block.text),
            BlockKind::Bullet => deck.bullets(std::slice::from_ref(&block.text)),
            BlockKind::Numbered => {
                ordinal += 1;
                deck.numbered(&format!("{ordinal}."), &block.text);
            }
        }
    }
}

fn task_caption(index: usize, minutes: Option<u32>) -> String {
    match minutes {
        Some(minutes) => format!("Task {} · {minutes} min", index + 1),
        None => format!("Task {}", index + 1),
    }
}

fn overview(deck: &mut DeckBuilder, overview: &ProtocolOverview) {
    deck.content(Banner {
        caption: "Overview".to_string(),
        title: "Objective".to_string(),
        accent: SectionType::Introduction.color(),
    });
    deck.paragraph(&overview.objective);
    if !overview.research_questions.is_empty() {
        deck.heading("Research questions");
        deck.bullets(&overview.research_questions);
    }
    if let Some(profile) = overview.participant_profile.as_deref().and_then(non_blank) {
        deck.heading("Participants");
        deck.paragraph(&profile);
    }
    if !overview.materials_needed.is_empty() {
        deck.heading("Materials needed");
        deck.bullets(&overview.materials_needed);
    }
    if let Some(consent) = non_blank(&overview.consent_note) {
        deck.heading("Consent");
        deck.dialogue(&consent);
    }
    deck.notes(overview.observer_guide.iter().map(|line| format!("Observers: {line}")));
}

fn section(deck: &mut DeckBuilder, section: &Section, offset: usize) {
    let caption = match section.duration_minutes {
        Some(minutes) => format!("{} · {minutes} min", section.section_type.label()),
        None => section.section_type.label().into_owned(),
    };
    deck.content(Banner {
        caption,
        title: section.title.clone(),
        accent: section.section_type.color(),
    });
    for (index, question) in section.questions.iter().enumerate() {
        deck.numbered(&question_label(offset, index), question);
    }
    deck.notes(
        section
            .script
            .iter()
            .flat_map(|script| script.lines())
            .map(str::to_string)
            .chain(section.tips.iter().map(|tip| format!("Tip: {tip}"))),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::projection::ProjectToBase, domain::Protocol};
    use serde_json::json;

    fn protocol(value: serde_json::Value) -> Protocol {
        serde_json::from_value(value).unwrap()
    }

    fn all_texts(deck: &Deck) -> Vec<String> {
        deck.slides
            .iter()
            .flat_map(|slide| slide.texts())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn moderated_deck_numbers_tasks_after_sections_and_keeps_probes_in_notes() {
        let protocol = protocol(json!({
            "study_type": "moderated_usability",
            "title": "Checkout",
            "objective": "Observe checkout",
            "sections": [
                {"section_type": "debrief", "title": "Wrap", "questions": ["Anything else?"]},
                {"section_type": "introduction", "title": "Welcome", "questions": ["Shop online often?"],
                 "script": "Thanks for joining.", "tips": ["Smile"]}
            ],
            "tasks": [{"title": "Pay", "scenario": "Pay for it", "success_criteria": "Order placed",
                       "post_task_questions": ["Confident?"],
                       "probes": [{"trigger": "stalls", "question": "What now?"}]}]
        }));
        let Protocol::ModeratedUsability(moderated_protocol) = &protocol else {
            unreachable!()
        };
        let deck = moderated(
            moderated_protocol,
            &NumberingPlan::for_protocol(&protocol),
            &RenderOptions::default(),
        );

        let texts = all_texts(&deck);
        let labels: Vec<&String> = texts.iter().filter(|text| text.starts_with('Q')).collect();
        assert_eq!(labels, vec!["Q1  ", "Q2  ", "Q3  "]);
        let last = deck.slides.last().unwrap();
        assert!(last.texts().contains(&"Anything else?"));

        let notes: Vec<&String> = deck.slides.iter().flat_map(|slide| &slide.notes).collect();
        assert!(notes.contains(&&"Thanks for joining.".to_string()));
        assert!(notes.contains(&&"Tip: Smile".to_string()));
        assert!(notes.contains(&&"If stalls: What now?".to_string()));
        assert!(!texts.iter().any(|text| text == "Research team"));
    }

    #[test]
    fn generic_deck_renders_projected_survey() {
        let protocol = protocol(json!({
            "study_type": "survey",
            "title": "Pulse",
            "objective": "Measure sentiment",
            "blocks": [{"block_type": "screener", "title": "Screen", "questions": [
                {"question_type": "open_short", "text": "Do you cook?"}
            ]}]
        }));
        let base = protocol.to_base();
        let deck = generic(
            &base,
            StudyType::Survey,
            &NumberingPlan::for_base(&base),
            &RenderOptions::default(),
        );
        assert!(all_texts(&deck).iter().any(|text| text.ends_with("Do you cook?")));
        assert_eq!(deck.title, "Pulse");
    }

    #[test]
    fn brief_fragments_restart_ordinals_and_carry_presenter_notes() {
        let slides: Vec<serde_json::Value> = [
            "cover", "context", "objectives", "methodology", "participants", "timeline",
            "deliverables", "insights", "next_steps",
        ]
        .iter()
        .map(|slide_type| {
            json!({"slide_type": slide_type, "title": format!("{slide_type} title"),
                   "content_html": "", "presenter_notes": format!("notes for {slide_type}")})
        })
        .collect();
        let brief: Brief = serde_json::from_value(json!({"title": "Q3 brief", "slides": slides})).unwrap();
        let block = |kind, text: &str| FragmentBlock {
            kind,
            text: text.to_string(),
        };
        let mut fragments = vec![Vec::new(); 9];
        fragments[1] = vec![
            block(BlockKind::Numbered, "First"),
            block(BlockKind::Paragraph, "Gap"),
            block(BlockKind::Numbered, "Again"),
        ];

        let deck = super::brief(&brief, &fragments, &RenderOptions::default());
        assert_eq!(deck.slides.len(), 9);
        let context = deck.slides[1].texts();
        assert_eq!(context.iter().filter(|text| **text == "1.  ").count(), 2);
        assert_eq!(deck.slides[8].notes, vec!["notes for next_steps".to_string()]);
    }
}
