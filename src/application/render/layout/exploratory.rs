use crate::{
    application::{
        numbering::{NumberingPlan, question_label},
        render::types::RenderOptions,
    },
    domain::{ExploratoryProtocol, ExploratorySection, StudyType},
};

use super::{PageComposer, TextStyle, overview, protocol_cover, section};

pub fn compose<C: PageComposer>(
    composer: &mut C,
    protocol: &ExploratoryProtocol,
    plan: &NumberingPlan,
    options: &RenderOptions,
) {
    composer.cover(&protocol_cover(
        &protocol.overview,
        StudyType::ExploratoryInterview,
        Vec::new(),
        options,
    ));
    composer.page_break();
    overview(composer, &protocol.overview);

    let (leading, debrief): (Vec<_>, Vec<_>) = protocol
        .sections
        .iter()
        .enumerate()
        .partition(|(_, entry)| !entry.section.section_type.is_debrief());
    for (index, entry) in leading.into_iter().chain(debrief) {
        exploratory_section(composer, entry, plan.section(index));
    }
}

/// Section questions come first, then one opening question per theme.
fn exploratory_section<C: PageComposer>(
    composer: &mut C,
    entry: &ExploratorySection,
    offset: usize,
) {
    section(composer, &entry.section, offset);

    let theme_offset = offset + entry.section.questions.len();
    for (index, theme) in entry.themes.iter().enumerate() {
        composer.heading(&format!("Theme: {}", theme.title));
        if theme.sensitive {
            composer.callout(
                "Sensitive topic",
                &["Approach gently and remind the participant they can skip this theme.".to_string()],
            );
        }
        composer.numbered(&question_label(theme_offset, index), &theme.opening_question);
        if !theme.probes.is_empty() {
            composer.paragraph("Probes", TextStyle::Muted);
            composer.bullets(&theme.probes);
        }
    }
}
