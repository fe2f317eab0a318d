//! Text transforms applied before content reaches a rendering surface.
//!
//! [`charset`] narrows text to the single-byte range the slide-deck encoder
//! accepts. [`markup`] strips executable constructs from markup fragments
//! before they are injected into a live preview.

pub mod charset;
pub mod markup;

pub use charset::{sanitize_record, sanitize_text};
pub use markup::sanitize_fragment;
