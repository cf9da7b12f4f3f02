//! Glyph-safety helpers for cursor-level edits.
//!
//! Decorative glyph runs are atomic: keystrokes never land inside them and
//! never delete them. Glyphs disappear only when their owning construct is
//! removed via unwrap.

use std::ops::Range;

use crate::editing::document::{Document, Run};
use crate::editing::stack::ConstructStack;
use crate::markup::registry::Registry;

/// Where an inserted character will go.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum InsertPlace {
    /// Splice into an existing non-glyph run at a byte offset.
    ExtendRun {
        block: usize,
        run: usize,
        offset: usize,
    },
    /// Create a fresh non-glyph run at this run index.
    NewRun {
        block: usize,
        run: usize,
        stack: ConstructStack,
    },
}

impl InsertPlace {
    pub(crate) fn stack<'d>(&'d self, doc: &'d Document) -> &'d ConstructStack {
        match self {
            InsertPlace::ExtendRun { block, run, .. } => &doc.blocks[*block].runs[*run].stack,
            InsertPlace::NewRun { stack, .. } => stack,
        }
    }
}

/// Move an insertion offset out of any glyph run it falls strictly inside:
/// relocated to immediately after that run.
pub(crate) fn relocate(doc: &Document, at: usize) -> usize {
    let mut at = at.min(doc.len());
    while let Some((run, span)) = doc.run_at(at) {
        if run.is_glyph() && span.start < at && at < span.end {
            at = span.end;
        } else {
            break;
        }
    }
    at
}

/// Resolve the insertion point for one character: the relocated offset plus
/// the run placement and construct stack the character takes on.
///
/// Placement follows the caret's visual intent: a boundary between runs
/// joins the preceding text run; positions adjacent to a glyph take the
/// stack that applies on the logical side of the glyph (inside after a
/// begin glyph, outside after an end glyph).
pub(crate) fn insertion_context(
    doc: &Document,
    registry: &Registry,
    at: usize,
) -> (usize, InsertPlace) {
    let at = relocate(doc, at);
    let addr = match doc.locate(at) {
        Some(addr) => addr,
        None => {
            // Past the end; append to the last block
            let block = doc.blocks.len() - 1;
            let run = doc.blocks[block].runs.len();
            return (
                doc.len(),
                InsertPlace::NewRun {
                    block,
                    run,
                    stack: ConstructStack::new(),
                },
            );
        }
    };

    let runs = &doc.blocks[addr.block].runs;
    if runs.is_empty() {
        return (
            at,
            InsertPlace::NewRun {
                block: addr.block,
                run: 0,
                stack: ConstructStack::new(),
            },
        );
    }

    let run = &runs[addr.run];
    if addr.offset > 0 && addr.offset < run.len() {
        // Strictly inside; relocation guarantees this is not a glyph
        return (
            at,
            InsertPlace::ExtendRun {
                block: addr.block,
                run: addr.run,
                offset: addr.offset,
            },
        );
    }

    if addr.offset >= run.len() {
        // End of block (locate only yields offset == len on the last run)
        if !run.is_glyph() {
            return (
                at,
                InsertPlace::ExtendRun {
                    block: addr.block,
                    run: addr.run,
                    offset: run.len(),
                },
            );
        }
        return (
            at,
            InsertPlace::NewRun {
                block: addr.block,
                run: addr.run + 1,
                stack: stack_beside_glyph(registry, run, true),
            },
        );
    }

    // addr.offset == 0: boundary between runs (or block start)
    let prev = addr.run.checked_sub(1).map(|i| &runs[i]);
    if let Some(prev_run) = prev {
        if !prev_run.is_glyph() {
            return (
                at,
                InsertPlace::ExtendRun {
                    block: addr.block,
                    run: addr.run - 1,
                    offset: prev_run.len(),
                },
            );
        }
        if is_begin_glyph(registry, prev_run) {
            return (
                at,
                InsertPlace::NewRun {
                    block: addr.block,
                    run: addr.run,
                    stack: prev_run.stack().clone(),
                },
            );
        }
    }
    if !run.is_glyph() {
        return (
            at,
            InsertPlace::ExtendRun {
                block: addr.block,
                run: addr.run,
                offset: 0,
            },
        );
    }
    // Before a glyph, with no text run to join
    let stack = match prev {
        Some(prev_run) => stack_beside_glyph(registry, prev_run, true),
        None => stack_beside_glyph(registry, run, false),
    };
    (
        at,
        InsertPlace::NewRun {
            block: addr.block,
            run: addr.run,
            stack,
        },
    )
}

/// The logical stack on one side of a glyph run: after a begin glyph (or
/// before an end glyph) the construct is active; on the opposite side it is
/// not, so its innermost entry is dropped.
fn stack_beside_glyph(registry: &Registry, glyph: &Run, after: bool) -> ConstructStack {
    let inside = is_begin_glyph(registry, glyph) == after;
    let mut stack = glyph.stack().clone();
    if !inside {
        stack.pop();
    }
    stack
}

/// True when this glyph run holds its innermost construct's begin glyph.
pub(crate) fn is_begin_glyph(registry: &Registry, run: &Run) -> bool {
    run.stack()
        .peek()
        .and_then(|name| registry.by_name(name))
        .and_then(|c| c.begin_glyph())
        .is_some_and(|g| g == run.text())
}

/// True when this glyph run holds its innermost construct's end glyph.
pub(crate) fn is_end_glyph(registry: &Registry, run: &Run) -> bool {
    run.stack()
        .peek()
        .and_then(|name| registry.by_name(name))
        .and_then(|c| c.end_glyph())
        .is_some_and(|g| g == run.text())
}

/// Clip a deletion range so glyph runs are excluded, returning the kept
/// subranges in ascending order.
pub(crate) fn clip_range(doc: &Document, range: Range<usize>) -> Vec<Range<usize>> {
    let mut kept = Vec::new();
    let mut cursor = range.start;

    let mut global = 0;
    for block in &doc.blocks {
        for run in &block.runs {
            let span = global..global + run.len();
            global = span.end;
            if span.end <= range.start {
                continue;
            }
            if span.start >= range.end {
                break;
            }
            if run.is_glyph() {
                let clip_start = span.start.max(range.start);
                let clip_end = span.end.min(range.end);
                if clip_start > cursor {
                    kept.push(cursor..clip_start);
                }
                cursor = clip_end.max(cursor);
            }
        }
        global += 1; // block separator
    }

    if cursor < range.end {
        kept.push(cursor..range.end);
    }
    kept
}
