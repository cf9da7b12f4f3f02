//! Core engine for narrative markup: parses marker-based constructs into an
//! annotated document model, serializes the model back to identical markup,
//! and applies cursor-level edits that keep decorative glyphs intact.

pub mod commentary;
pub mod editing;
pub mod io;
pub mod markup;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use editing::{commands::*, document::*, patch::*, stack::*};
pub use io::*;
pub use markup::{construct::*, registry::*, scanner::*};
pub use models::{scene::*, scene_file::*};
