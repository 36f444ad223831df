//! Turning snapshots of result pages into [`crate::results::ExtractedItem`]s.

pub mod html;
pub mod text;

#[cfg(test)]
pub(crate) mod tests;

pub use html::{ItemLimits, extract_items};
