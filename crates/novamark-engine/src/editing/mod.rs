pub mod commands;
pub mod document;
pub(crate) mod guard;
pub mod patch;
pub mod stack;

pub use commands::{Cmd, EditError};
pub use document::{Block, Document, Run};
pub use patch::Patch;
pub use stack::{ConstructStack, MAX_DEPTH, StackOverflow};
