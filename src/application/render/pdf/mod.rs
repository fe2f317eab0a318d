//! PDF output on top of `lopdf`.
//!
//! [`PdfComposer`] lays content out into per-page operation lists;
//! [`PdfDocument::into_bytes`] adds footers and writes the file. The page
//! tree shares one resource dictionary with the three standard Helvetica
//! faces, so no font program is embedded.

pub mod composer;
pub mod text;

use lopdf::{
    Dictionary, Document, Object, Stream, StringFormat,
    content::{Content, Operation},
    dictionary,
};

use crate::application::registry::palette;

use super::types::{PageSize, RenderError};

pub use composer::PdfComposer;
use text::{Font, encode, width};

const FOOTER_SIZE: f32 = 8.0;
const FOOTER_BASELINE: f32 = 30.0;

/// Laid-out pages, ready to be written.
#[derive(Debug, Clone)]
pub struct PdfDocument {
    pub title: String,
    pub page_size: PageSize,
    pub pages: Vec<Vec<Operation>>,
}

impl PdfDocument {
    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        let (page_width, page_height) = self.page_size.points();
        let total = self.pages.len();

        let mut document = Document::with_version("1.7");
        let pages_id = document.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::ALL {
            let font_id = document.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource(), font_id);
        }
        let resources_id = document.add_object(dictionary! { "Font" => fonts });

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (index, mut operations) in self.pages.into_iter().enumerate() {
            operations.extend(footer(&self.title, index + 1, total, page_width));
            let content = Content { operations }.encode()?;
            let content_id = document.add_object(Stream::new(dictionary! {}, content));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            page_width.into(),
            page_height.into(),
        ];
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        };
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = document.add_object(dictionary! {
            "Title" => Object::String(encode(&self.title), StringFormat::Literal),
            "Producer" => Object::string_literal("studydoc"),
        });
        document.trailer.set("Root", catalog_id);
        document.trailer.set("Info", info_id);
        document.compress();

        let mut bytes = Vec::new();
        document.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

/// Centered `title · Page n of N`.
fn footer(title: &str, page: usize, total: usize, page_width: f32) -> Vec<Operation> {
    let mut line = encode(title);
    line.extend_from_slice(&[b' ', 0xB7, b' ']);
    line.extend_from_slice(format!("Page {page} of {total}").as_bytes());

    let x = (page_width - width(&line, Font::Regular, FOOTER_SIZE)) / 2.0;
    let (r, g, b) = palette::MUTED.rgb();
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Font::Regular.resource().into(), FOOTER_SIZE.into()]),
        Operation::new("rg", vec![r.into(), g.into(), b.into()]),
        Operation::new("Td", vec![x.into(), FOOTER_BASELINE.into()]),
        Operation::new("Tj", vec![Object::String(line, StringFormat::Literal)]),
        Operation::new("ET", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::{
        layout::{PageComposer, TextStyle},
        types::RenderOptions,
    };

    fn page_strings(bytes: &[u8]) -> Vec<Vec<u8>> {
        let document = Document::load_mem(bytes).unwrap();
        let mut strings = Vec::new();
        for (_, page_id) in document.get_pages() {
            let content = Content::decode(&document.get_page_content(page_id).unwrap()).unwrap();
            for operation in content.operations {
                if operation.operator == "Tj" {
                    strings.push(operation.operands[0].as_str().unwrap().to_vec());
                }
            }
        }
        strings
    }

    #[test]
    fn writes_a_loadable_file_with_footers() {
        let mut composer = PdfComposer::new("Checkout study", &RenderOptions::default());
        composer.paragraph("Hello", TextStyle::Body);
        composer.page_break();
        composer.paragraph("World", TextStyle::Body);
        let bytes = composer.finish().into_bytes().unwrap();

        assert!(bytes.starts_with(b"%PDF-1.7"));
        let strings = page_strings(&bytes);
        assert!(strings.contains(&b"Hello".to_vec()));
        assert!(strings.contains(&b"Checkout study \xB7 Page 2 of 2".to_vec()));
    }

    #[test]
    fn output_is_deterministic() {
        let build = || {
            let mut composer = PdfComposer::new("Plan", &RenderOptions::default());
            composer.heading("Objective");
            composer.finish().into_bytes().unwrap()
        };
        assert_eq!(build(), build());
    }
}
