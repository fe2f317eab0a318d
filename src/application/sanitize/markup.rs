//! Markup sanitizer for fragments shown in the live preview.
//!
//! The allow-list is deliberately small. Anything executable is removed:
//! `<script>` and `<style>` elements together with their content, every
//! attribute that is not allow-listed (which covers all `on*` handlers), and
//! links whose scheme is not allow-listed. A final pass neutralizes any
//! `javascript:` text that survived as plain text.

use std::{borrow::Cow, collections::HashSet};

use ammonia::Builder as AmmoniaBuilder;
use once_cell::sync::Lazy;

static FRAGMENT_SANITIZER: Lazy<AmmoniaBuilder<'static>> = Lazy::new(build_fragment_sanitizer);

const NEUTRALIZED_SCHEME: &str = "blocked:";

/// Sanitize one markup fragment.
pub fn sanitize_fragment(html: &str) -> String {
    let cleaned = FRAGMENT_SANITIZER.clean(html).to_string();
    neutralize_javascript_scheme(&cleaned).into_owned()
}

fn build_fragment_sanitizer() -> AmmoniaBuilder<'static> {
    let mut builder = AmmoniaBuilder::default();

    let tags: HashSet<&'static str> = HashSet::from([
        "a",
        "abbr",
        "b",
        "blockquote",
        "br",
        "code",
        "dd",
        "del",
        "div",
        "dl",
        "dt",
        "em",
        "h1",
        "h2",
        "h3",
        "h4",
        "h5",
        "h6",
        "hr",
        "i",
        "li",
        "mark",
        "ol",
        "p",
        "pre",
        "s",
        "small",
        "span",
        "strong",
        "sub",
        "sup",
        "table",
        "tbody",
        "td",
        "th",
        "thead",
        "tr",
        "u",
        "ul",
    ]);
    builder.tags(tags);

    let generic: HashSet<&'static str> =
        HashSet::from(["class", "title", "lang", "dir", "aria-label", "role", "style"]);
    builder.generic_attributes(generic);
    builder.add_tag_attributes("th", &["colspan", "rowspan", "scope"]);
    builder.add_tag_attributes("td", &["colspan", "rowspan"]);
    builder.add_tag_attributes("ol", &["start"]);

    builder.url_schemes(HashSet::from(["http", "https", "mailto"]));

    builder.attribute_filter(|_element, attribute, value| {
        if attribute.eq_ignore_ascii_case("style") {
            sanitize_style_attribute(value).map(Cow::Owned)
        } else {
            Some(Cow::Borrowed(value))
        }
    });

    builder
}

/// Replace every case-insensitive `javascript:` with an inert scheme.
fn neutralize_javascript_scheme(html: &str) -> Cow<'_, str> {
    const NEEDLE: &str = "javascript:";

    let lower = html.to_ascii_lowercase();
    if !lower.contains(NEEDLE) {
        return Cow::Borrowed(html);
    }

    // ASCII lowercasing keeps byte offsets aligned with the original.
    let mut output = String::with_capacity(html.len());
    let mut cursor = 0;
    while let Some(found) = lower[cursor..].find(NEEDLE) {
        let start = cursor + found;
        output.push_str(&html[cursor..start]);
        output.push_str(NEUTRALIZED_SCHEME);
        cursor = start + NEEDLE.len();
    }
    output.push_str(&html[cursor..]);
    Cow::Owned(output)
}

fn sanitize_style_attribute(value: &str) -> Option<String> {
    let sanitized: Vec<&str> = value
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty() && is_safe_style_declaration(decl))
        .collect();

    if sanitized.is_empty() {
        None
    } else {
        Some(sanitized.join("; "))
    }
}

fn is_safe_style_declaration(decl: &str) -> bool {
    let lower = decl.to_ascii_lowercase();

    const FORBIDDEN_SUBSTRINGS: [&str; 7] = [
        "expression(",
        "javascript:",
        "vbscript:",
        "-moz-binding",
        "behavior:",
        "behaviour:",
        "@import",
    ];

    if FORBIDDEN_SUBSTRINGS
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return false;
    }

    !contains_unsafe_url(&lower)
}

fn contains_unsafe_url(lower_decl: &str) -> bool {
    let mut offset = 0;

    while let Some(start) = lower_decl[offset..].find("url(") {
        let open = offset + start + 4;
        let rest = &lower_decl[open..];
        let Some(close_rel) = rest.find(')') else {
            // unterminated
            return true;
        };
        let close = open + close_rel;
        let target = lower_decl[open..close]
            .trim_matches(|c: char| c.is_whitespace() || c == '\'' || c == '"');

        if is_unsafe_url(target) {
            return true;
        }
        offset = close + 1;
    }

    false
}

fn is_unsafe_url(url: &str) -> bool {
    if url.starts_with("data:image/") {
        return false;
    }

    url.starts_with("data:")
        || url.starts_with("file:")
        || url.contains("javascript:")
        || url.contains("vbscript:")
}
