use std::ops::Range;

use crate::markup::construct::Construct;
use crate::markup::registry::Registry;

/// What the scanner stopped at.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryKind<'r> {
    /// A construct's begin marker.
    Begin(&'r Construct),
    /// A construct's end marker.
    End(&'r Construct),
    /// A `\n` line terminator.
    LineEnd,
    /// End of input (no terminator character consumed).
    TextEnd,
}

/// Result of one scanning step.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary<'r> {
    /// Literal text between the scan start and the boundary (marker excluded).
    pub literal: Range<usize>,
    /// Position just past the matched marker or terminator.
    pub next_pos: usize,
    pub kind: BoundaryKind<'r>,
}

/// Find the next construct marker or line terminator at or after `pos`.
///
/// Constructs are tested in registry order, begin marker before end marker;
/// all index comparisons are strict `<`, so the earliest match wins and ties
/// go to the construct tested first. A line terminator is only chosen when
/// its index is strictly smaller than the best construct boundary.
pub fn find_next_boundary<'r>(text: &str, pos: usize, registry: &'r Registry) -> Boundary<'r> {
    let mut best = text.len();
    let mut kind = BoundaryKind::TextEnd;
    let mut marker_len = 0;

    for construct in registry.all() {
        if let Some(idx) = find_from(text, pos, construct.begin())
            && idx < best
        {
            best = idx;
            kind = BoundaryKind::Begin(construct);
            marker_len = construct.begin().len();
        }
        if let Some(idx) = find_from(text, pos, construct.end())
            && idx < best
        {
            best = idx;
            kind = BoundaryKind::End(construct);
            marker_len = construct.end().len();
        }
    }

    if let Some(idx) = find_from(text, pos, "\n")
        && idx < best
    {
        best = idx;
        kind = BoundaryKind::LineEnd;
        marker_len = 1;
    }

    Boundary {
        literal: pos..best,
        next_pos: best + marker_len,
        kind,
    }
}

fn find_from(text: &str, pos: usize, needle: &str) -> Option<usize> {
    text.get(pos..)?.find(needle).map(|i| pos + i)
}
