use std::ops::Range;

/// Result of a successfully applied command, for renderers that track
/// dirty regions instead of redrawing everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges of the display text the edit touched, in pre-edit
    /// coordinates.
    pub changed: Vec<Range<usize>>,
    /// Selection after the edit.
    pub new_selection: Range<usize>,
    /// Document version after the edit.
    pub version: u64,
}
