//! Catalog domain module - profiles and their content items.

mod content;
mod profile;

pub use content::{ContentItem, ContentKind, MediaRefs};
pub use profile::{Catalog, Profile};
