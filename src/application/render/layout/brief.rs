use crate::{
    application::{
        registry::RegistryTag,
        render::{
            fragment::{BlockKind, FragmentBlock},
            types::RenderOptions,
        },
    },
    domain::{Brief, BriefSlide, SlideType},
};

use super::{CoverPage, PageComposer, PartHeader, TextStyle, non_blank};

/// Label shown above the title of every brief cover.
pub const BRIEF_EYEBROW: &str = "Stakeholder Brief";

/// One page per slide. `fragments[i]` holds the flattened content of
/// `brief.slides[i]`; the cover slide's content goes under the cover.
pub fn compose<C: PageComposer>(
    composer: &mut C,
    brief: &Brief,
    fragments: &[Vec<FragmentBlock>],
    options: &RenderOptions,
) {
    for (index, (slide, blocks)) in brief.slides.iter().zip(fragments).enumerate() {
        if index > 0 {
            composer.page_break();
        }
        match slide.slide_type {
            SlideType::Cover => {
                composer.cover(&brief_cover(brief, options));
                fragment_blocks(composer, blocks);
            }
            _ => content_slide(composer, slide, blocks),
        }
        if let Some(notes) = non_blank(&slide.presenter_notes) {
            composer.callout("Presenter notes", &[notes]);
        }
    }
}

pub fn brief_cover(brief: &Brief, options: &RenderOptions) -> CoverPage {
    let mut metadata = Vec::new();
    if let Some(audience) = brief.prepared_for.as_deref().and_then(non_blank) {
        metadata.push(("Prepared for".to_string(), audience));
    }
    if let Some(date) = brief.date.as_deref().and_then(non_blank) {
        metadata.push(("Date".to_string(), date));
    }
    if let Some(organization) = options.organization.as_ref() {
        metadata.push(("Prepared by".to_string(), organization.clone()));
    }

    CoverPage {
        eyebrow: BRIEF_EYEBROW.to_string(),
        accent: SlideType::Cover.color(),
        title: brief.title.clone(),
        subtitle: brief.subtitle.as_deref().and_then(non_blank),
        metadata,
        generated_on: options.generated_on_label(),
    }
}

fn content_slide<C: PageComposer>(composer: &mut C, slide: &BriefSlide, blocks: &[FragmentBlock]) {
    composer.part_header(&PartHeader::new(
        slide.slide_type.label(),
        slide.title.as_str(),
        slide.slide_type.color(),
    ));
    fragment_blocks(composer, blocks);
}

/// Consecutive list items are grouped; ordered items restart at 1 after
/// any other block.
fn fragment_blocks<C: PageComposer>(composer: &mut C, blocks: &[FragmentBlock]) {
    let mut bullets: Vec<String> = Vec::new();
    let mut ordinal = 0;

    for block in blocks {
        if block.kind != BlockKind::Bullet && !bullets.is_empty() {
            composer.bullets(&std::mem::take(&mut bullets));
        }
        if block.kind != BlockKind::Numbered {
            ordinal = 0;
        }
        match block.kind {
            BlockKind::Heading => composer.heading(&block.text),
            BlockKind::Paragraph => composer.paragraph(&block.text, TextStyle::Body),
            BlockKind::Bullet => bullets.push(block.text.clone()),
            BlockKind::Numbered => {
                ordinal += 1;
                composer.numbered(&format!("{ordinal}."), &block.text);
            }
        }
    }
    if !bullets.is_empty() {
        composer.bullets(&bullets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::layout::recording::Recorder;

    fn block(kind: BlockKind, text: &str) -> FragmentBlock {
        FragmentBlock {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn groups_bullets_and_restarts_ordinals() {
        let mut recorder = Recorder::default();
        fragment_blocks(
            &mut recorder,
            &[
                block(BlockKind::Numbered, "One"),
                block(BlockKind::Numbered, "Two"),
                block(BlockKind::Bullet, "a"),
                block(BlockKind::Bullet, "b"),
                block(BlockKind::Paragraph, "Break"),
                block(BlockKind::Numbered, "Again"),
            ],
        );
        assert_eq!(
            recorder.events,
            vec![
                "numbered:1. One",
                "numbered:2. Two",
                "bullets:a|b",
                "paragraph:Break",
                "numbered:1. Again",
            ]
        );
    }
}
