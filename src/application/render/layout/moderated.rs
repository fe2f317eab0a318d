use crate::{
    application::{
        numbering::NumberingPlan,
        registry::RegistryTag,
        render::types::RenderOptions,
    },
    domain::{ModeratedProtocol, ModeratedTask, SectionType, StudyType},
};

use super::{
    CoverPage, PageComposer, PartHeader, TextStyle, fidelity_row, non_blank, overview, protocol_cover,
    questions, section, split_sections,
};

pub fn compose<C: PageComposer>(
    composer: &mut C,
    protocol: &ModeratedProtocol,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    composer.cover(&cover(protocol, options));
    composer.page_break();
    overview(composer, &protocol.overview);

    if !protocol.team.is_empty() {
        composer.heading("Research team");
        composer.key_values(&team_rows(protocol));
    }

    let (leading, debrief) = split_sections(&protocol.sections);
    for (index, entry) in leading {
        section(composer, entry, plan.section(index));
    }
    for (index, task) in protocol.tasks.iter().enumerate() {
        moderated_task(composer, index, task, plan.task(index));
    }
    for (index, entry) in debrief {
        section(composer, entry, plan.section(index));
    }
}

/// Cover with fidelity and prototype rows; shared with the slide deck.
pub fn cover(protocol: &ModeratedProtocol, options: &RenderOptions) -> CoverPage {
    let mut rows = Vec::new();
    rows.extend(fidelity_row(protocol.fidelity.as_ref()));
    if let Some(url) = protocol.prototype_url.as_deref().and_then(non_blank) {
        rows.push(("Prototype".to_string(), url));
    }
    protocol_cover(
        &protocol.overview,
        StudyType::ModeratedUsability,
        rows,
        options,
    )
}

/// Team members as `(role label, responsibility)` rows.
pub fn team_rows(protocol: &ModeratedProtocol) -> Vec<(String, String)> {
    protocol
        .team
        .iter()
        .map(|member| (member.role.label().into_owned(), member.responsibility.clone()))
        .collect()
}

fn moderated_task<C: PageComposer>(
    composer: &mut C,
    index: usize,
    task: &ModeratedTask,
    offset: usize,
) {
    composer.part_header(
        &PartHeader::new(
            format!("Task {}", index + 1),
            task.title.as_str(),
            SectionType::Tasks.color(),
        )
        .with_duration(task.time_limit_minutes),
    );
    composer.paragraph("Scenario", TextStyle::Muted);
    composer.dialogue(&task.scenario);
    composer.key_values(&[("Success criteria".to_string(), task.success_criteria.clone())]);

    if !task.observer_cues.is_empty() {
        composer.paragraph("Observe for", TextStyle::Muted);
        composer.bullets(&task.observer_cues);
    }

    questions(composer, &task.post_task_questions, offset);

    if !task.probes.is_empty() {
        composer.callout("Probe if", &probe_lines(task));
    }
}

pub fn probe_lines(task: &ModeratedTask) -> Vec<String> {
    task.probes
        .iter()
        .map(|probe| format!("If {}: {}", probe.trigger, probe.question))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{application::render::layout::recording::Recorder, domain::Protocol};
    use serde_json::json;

    fn render(value: serde_json::Value) -> Recorder {
        let protocol: Protocol = serde_json::from_value(value).unwrap();
        let Protocol::ModeratedUsability(moderated) = &protocol else {
            unreachable!()
        };
        let mut recorder = Recorder::default();
        compose(
            &mut recorder,
            moderated,
            &NumberingPlan::for_protocol(&protocol),
            &RenderOptions::default(),
        );
        recorder
    }

    #[test]
    fn task_questions_number_from_one_after_empty_section() {
        let recorder = render(json!({
            "study_type": "moderated_usability",
            "title": "Checkout",
            "objective": "Observe checkout",
            "sections": [{"section_type": "introduction", "title": "Welcome"}],
            "tasks": [
                {"title": "Add to cart", "scenario": "You want shoes", "success_criteria": "Item in cart",
                 "post_task_questions": ["How easy?", "What surprised you?"]},
                {"title": "Pay", "scenario": "Pay for it", "success_criteria": "Order placed",
                 "post_task_questions": ["Confident?"],
                 "probes": [{"trigger": "hesitates at shipping", "question": "What are you looking for?"}]}
            ]
        }));

        assert_eq!(recorder.numbered_labels(), vec!["Q1", "Q2", "Q3"]);
        assert!(recorder.contains("callout:Probe if|If hesitates at shipping: What are you looking for?"));
        assert!(!recorder.contains("Research team"));
        assert!(!recorder.contains("Observe for"));
    }

    #[test]
    fn team_is_listed_with_role_labels() {
        let recorder = render(json!({
            "study_type": "moderated_usability",
            "title": "Checkout",
            "objective": "Observe checkout",
            "team": [{"role": "note_taker", "responsibility": "Captures quotes"}],
            "sections": [],
            "tasks": []
        }));
        assert!(recorder.contains("kv:Note-taker=Captures quotes"));
    }
}
