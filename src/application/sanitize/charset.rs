//! Charset-narrowing sanitizer.
//!
//! Output contains only code points up to U+00FF. Smart punctuation is
//! transliterated to ASCII; anything else above the single-byte range becomes
//! a `[U+XXXX]` token. Every replacement is itself ASCII, so the transform is
//! idempotent.

use std::borrow::Cow;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Highest code point passed through unchanged.
const SINGLE_BYTE_MAX: char = '\u{00FF}';

fn transliterate(ch: char) -> Option<&'static str> {
    let replacement = match ch {
        '\u{2014}' | '\u{2015}' => "--",
        '\u{2013}' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2212}' => "-",
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => "'",
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => "\"",
        '\u{2026}' => "...",
        '\u{00AB}' => "<<",
        '\u{00BB}' => ">>",
        '\u{2039}' => "<",
        '\u{203A}' => ">",
        '\u{2022}' | '\u{2023}' | '\u{2043}' => "*",
        '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{200A}' | '\u{202F}' => " ",
        '\u{200B}' | '\u{FEFF}' => "",
        _ => return None,
    };
    Some(replacement)
}

/// Narrow one string. Borrows when nothing needs replacing.
pub fn sanitize_text(input: &str) -> Cow<'_, str> {
    let needs_work = input
        .chars()
        .any(|ch| ch > SINGLE_BYTE_MAX || transliterate(ch).is_some());
    if !needs_work {
        return Cow::Borrowed(input);
    }

    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        if let Some(replacement) = transliterate(ch) {
            output.push_str(replacement);
        } else if ch > SINGLE_BYTE_MAX {
            output.push_str(&format!("[U+{:04X}]", u32::from(ch)));
        } else {
            output.push(ch);
        }
    }
    Cow::Owned(output)
}

/// Rebuild `record` with every string field narrowed. The input is left
/// untouched.
pub fn sanitize_record<T>(record: &T) -> Result<T, serde_json::Error>
where
    T: Serialize + DeserializeOwned,
{
    let mut value = serde_json::to_value(record)?;
    sanitize_value(&mut value);
    serde_json::from_value(value)
}

fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(text) => {
            if let Cow::Owned(narrowed) = sanitize_text(text) {
                *text = narrowed;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(fields) => fields.values_mut().for_each(sanitize_value),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Brief, BriefSlide, SlideType};

    #[test]
    fn transliterates_smart_punctuation() {
        insta::assert_snapshot!(
            sanitize_text("\u{201C}Smart\u{201D} \u{2014} it\u{2019}s \u{00AB}fine\u{00BB}\u{2026} \u{2022} 1\u{2013}2"),
            @r#""Smart" -- it's <<fine>>... * 1-2"#
        );
    }

    #[test]
    fn escapes_code_points_outside_single_byte_range() {
        insta::assert_snapshot!(
            sanitize_text("Caf\u{00E9} \u{1F600} \u{4E2D} \u{2039}a\u{203A}"),
            @"Caf\u{00E9} [U+1F600] [U+4E2D] <a>"
        );
    }

    #[test]
    fn is_idempotent() {
        let samples = [
            "plain ascii",
            "\u{2014}\u{2013}\u{201C}\u{201D}\u{2026}",
            "emoji \u{1F680} and \u{00FC}mlaut",
            "[U+1F600] already escaped",
            "",
        ];
        for sample in samples {
            let once = sanitize_text(sample).into_owned();
            let twice = sanitize_text(&once).into_owned();
            assert_eq!(once, twice, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn borrows_clean_input() {
        assert!(matches!(sanitize_text("Nothing to do \u{00E9}"), Cow::Borrowed(_)));
    }

    #[test]
    fn sanitizes_every_string_in_a_record() {
        let brief = Brief {
            title: "Checkout \u{2014} 2025".to_string(),
            subtitle: None,
            prepared_for: Some("Design \u{1F3A8}".to_string()),
            date: None,
            slides: vec![BriefSlide {
                slide_type: SlideType::Cover,
                title: "\u{201C}Hi\u{201D}".to_string(),
                content_html: "<p>\u{2026}</p>".to_string(),
                presenter_notes: String::new(),
            }],
        };

        let narrowed = sanitize_record(&brief).unwrap();
        assert_eq!(narrowed.title, "Checkout -- 2025");
        assert_eq!(narrowed.prepared_for.as_deref(), Some("Design [U+1F3A8]"));
        assert_eq!(narrowed.slides[0].title, "\"Hi\"");
        assert_eq!(narrowed.slides[0].content_html, "<p>...</p>");
        assert_eq!(brief.title, "Checkout \u{2014} 2025");
    }
}
