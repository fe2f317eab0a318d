//! Flattening of brief markup fragments into plain text blocks.
//!
//! The paged and slide formats cannot embed markup, so a fragment is first
//! run through the markup sanitizer and then reduced to headings, paragraphs
//! and list items. Inline formatting is dropped.

use std::{cell::RefCell, rc::Rc};

use html_escape::decode_html_entities;
use lol_html::{RewriteStrSettings, element, rewrite_str, text};

use crate::application::sanitize::sanitize_fragment;

use super::types::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Paragraph,
    Bullet,
    Numbered,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentBlock {
    pub kind: BlockKind,
    pub text: String,
}

impl FragmentBlock {
    fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }
}

/// Reduce `html` to text blocks. `path` names the field in errors.
pub fn extract_blocks(html: &str, path: &str) -> Result<Vec<FragmentBlock>, RenderError> {
    let sanitized = sanitize_fragment(html);
    let blocks: Rc<RefCell<Vec<FragmentBlock>>> = Rc::new(RefCell::new(Vec::new()));

    rewrite_str(
        &sanitized,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("h1, h2, h3, h4, h5, h6", {
                    let blocks = Rc::clone(&blocks);
                    move |_el| {
                        start_block(&blocks, BlockKind::Heading);
                        Ok(())
                    }
                }),
                element!("p, div, blockquote, pre, tr, dt, dd", {
                    let blocks = Rc::clone(&blocks);
                    move |_el| {
                        start_block(&blocks, BlockKind::Paragraph);
                        Ok(())
                    }
                }),
                element!("ul > li", {
                    let blocks = Rc::clone(&blocks);
                    move |_el| {
                        start_block(&blocks, BlockKind::Bullet);
                        Ok(())
                    }
                }),
                element!("ol > li", {
                    let blocks = Rc::clone(&blocks);
                    move |_el| {
                        start_block(&blocks, BlockKind::Numbered);
                        Ok(())
                    }
                }),
                element!("br, td, th", {
                    let blocks = Rc::clone(&blocks);
                    move |_el| {
                        if let Some(last) = blocks.borrow_mut().last_mut() {
                            last.text.push(' ');
                        }
                        Ok(())
                    }
                }),
                text!("*", {
                    let blocks = Rc::clone(&blocks);
                    move |chunk| {
                        let mut blocks = blocks.borrow_mut();
                        if blocks.is_empty() {
                            blocks.push(FragmentBlock::new(BlockKind::Paragraph));
                        }
                        if let Some(last) = blocks.last_mut() {
                            last.text.push_str(chunk.as_str());
                        }
                        Ok(())
                    }
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| RenderError::malformed(path, format!("unreadable markup: {err}")))?;

    let collected = blocks.borrow().clone();
    Ok(collected
        .into_iter()
        .filter_map(|block| {
            let text = collapse_whitespace(&decode_html_entities(&block.text));
            (!text.is_empty()).then_some(FragmentBlock {
                kind: block.kind,
                text,
            })
        })
        .collect())
}

fn start_block(blocks: &RefCell<Vec<FragmentBlock>>, kind: BlockKind) {
    let mut blocks = blocks.borrow_mut();
    // A paragraph wrapping list-item content stays in the item.
    let inside_item = matches!(
        blocks.last(),
        Some(last) if matches!(last.kind, BlockKind::Bullet | BlockKind::Numbered)
            && last.text.trim().is_empty()
    );
    if !(kind == BlockKind::Paragraph && inside_item) {
        blocks.push(FragmentBlock::new(kind));
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocks(html: &str) -> Vec<(BlockKind, String)> {
        extract_blocks(html, "content_html")
            .unwrap()
            .into_iter()
            .map(|block| (block.kind, block.text))
            .collect()
    }

    #[test]
    fn flattens_headings_paragraphs_and_lists() {
        let html = "<h3>Goals</h3><p>Reduce <strong>drop-off</strong> &amp; churn.</p>\
                    <ul><li>First</li><li><p>Second</p></li></ul><ol><li>Step</li></ol>";
        assert_eq!(
            blocks(html),
            vec![
                (BlockKind::Heading, "Goals".to_string()),
                (BlockKind::Paragraph, "Reduce drop-off & churn.".to_string()),
                (BlockKind::Bullet, "First".to_string()),
                (BlockKind::Bullet, "Second".to_string()),
                (BlockKind::Numbered, "Step".to_string()),
            ]
        );
    }

    #[test]
    fn bare_text_becomes_a_paragraph() {
        assert_eq!(
            blocks("Just   text"),
            vec![(BlockKind::Paragraph, "Just text".to_string())]
        );
    }

    #[test]
    fn drops_script_content() {
        assert_eq!(
            blocks("<p>Safe</p><script>alert('x')</script>"),
            vec![(BlockKind::Paragraph, "Safe".to_string())]
        );
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(
            blocks("<p>Caf&eacute; &mdash; &#x41;&#66; &amp; more</p>"),
            vec![(BlockKind::Paragraph, "Caf\u{e9} \u{2014} AB & more".to_string())]
        );
    }
}
