//! Slide-deck (`.pptx`) output.
//!
//! [`slides`] turns a record into a [`Deck`] through the [`DeckBuilder`];
//! [`Deck::into_bytes`] packages it.

pub mod deck;
mod package;
pub mod slides;

pub use deck::{Deck, DeckBuilder};

use super::types::RenderError;

impl Deck {
    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        package::into_bytes(&self)
    }
}
