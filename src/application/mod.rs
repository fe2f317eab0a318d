//! Application layer: registries, numbering, sanitizers and the renderers.

pub mod error;
pub mod numbering;
pub mod preview;
pub mod projection;
pub mod registry;
pub mod render;
pub mod sanitize;
