//! Word-processing (`.docx`) output.
//!
//! Dedicated shapes go through [`DocxComposer`] and the shared paged
//! layouts; the diary-study shape goes through the compiled template in
//! [`generic`]. Both produce a [`DocxDocument`] that is zipped later, off the
//! async runtime.

pub mod composer;
pub mod generic;
mod package;

pub use composer::DocxComposer;
pub use package::DocxDocument;
