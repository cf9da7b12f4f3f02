use std::ops::Range;

use crate::editing::document::{Block, Document, Run};
use crate::editing::guard::{self, InsertPlace};
use crate::editing::patch::Patch;
use crate::editing::stack::{ConstructStack, MAX_DEPTH};
use crate::markup::parser::fold_style;
use crate::markup::registry::Registry;

/// An edit command against the document's display text.
///
/// All offsets are byte offsets into [`Document::text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    InsertText { at: usize, text: String },
    DeleteRange { range: Range<usize> },
    Backspace { at: usize },
    DeleteForward { at: usize },
    /// Open `name` around the selected text.
    Wrap { name: String, range: Range<usize> },
    /// Remove the `name` construct instance at the cursor, glyphs included.
    Unwrap { name: String, at: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no construct named {0:?} is registered")]
    UnknownConstruct(String),
    #[error("wrap requires a non-empty selection")]
    EmptySelection,
    #[error("selection crosses a construct boundary")]
    SelectionCrossesBoundary,
    #[error("{0:?} is not the innermost construct at the cursor")]
    NotInnermost(String),
    #[error("byte {0} is not on a character boundary")]
    InvalidPosition(usize),
    #[error("construct nesting depth limit exceeded")]
    NestingTooDeep,
}

type EditOutcome = Result<(Vec<Range<usize>>, Range<usize>), EditError>;

impl Document {
    /// Apply one edit command.
    ///
    /// Atomic: a successful command bumps the version exactly once; a failed
    /// one leaves the document untouched.
    pub fn apply(&mut self, registry: &Registry, cmd: Cmd) -> Result<Patch, EditError> {
        let (changed, new_selection) = match cmd {
            Cmd::InsertText { at, text } => self.insert_text(registry, at, &text)?,
            Cmd::DeleteRange { range } => self.delete_range(range)?,
            Cmd::Backspace { at } => self.backspace(at)?,
            Cmd::DeleteForward { at } => self.delete_forward(at)?,
            Cmd::Wrap { name, range } => self.wrap(registry, &name, range)?,
            Cmd::Unwrap { name, at } => self.unwrap_construct(registry, &name, at)?,
        };
        self.version += 1;
        self.selection = new_selection.clone();
        Ok(Patch {
            changed,
            new_selection,
            version: self.version,
        })
    }

    fn ensure_char_boundary(&self, at: usize) -> Result<(), EditError> {
        if at > self.len() || !self.text().is_char_boundary(at) {
            return Err(EditError::InvalidPosition(at));
        }
        Ok(())
    }

    fn insert_text(&mut self, registry: &Registry, at: usize, text: &str) -> EditOutcome {
        // Relocate before validating: a position inside a glyph run is legal
        // input and resolves to just past the glyph.
        let landing = guard::relocate(self, at.min(self.len()));
        self.ensure_char_boundary(landing)?;
        if text.is_empty() {
            return Ok((Vec::new(), landing..landing));
        }
        let at = landing;
        // Insert back to front: every character resolves to the same
        // glyph-safe landing point, so they end up in source order.
        for ch in text.chars().rev() {
            self.insert_char(registry, at, ch);
        }
        let caret = landing + text.len();

        let Some(first) = self.locate(landing) else {
            return Err(EditError::InvalidPosition(landing));
        };
        let Some(last) = self.locate(caret) else {
            return Err(EditError::InvalidPosition(caret));
        };
        for block in first.block..=last.block {
            self.coalesce(block);
        }

        Ok((vec![landing..caret], caret..caret))
    }

    fn insert_char(&mut self, registry: &Registry, at: usize, ch: char) {
        let (_, place) = guard::insertion_context(self, registry, at);
        if ch == '\n' {
            let (block, boundary) = match place {
                InsertPlace::ExtendRun { block, run, offset } => {
                    (block, self.split_run(block, run, offset))
                }
                InsertPlace::NewRun { block, run, .. } => (block, run),
            };
            let tail = self.blocks[block].runs.split_off(boundary);
            self.blocks.insert(block + 1, Block::new(tail));
            return;
        }
        match place {
            InsertPlace::ExtendRun { block, run, offset } => {
                self.blocks[block].runs[run].text.insert(offset, ch);
            }
            InsertPlace::NewRun { block, run, stack } => {
                let style = fold_style(registry, &stack);
                self.blocks[block]
                    .runs
                    .insert(run, Run::literal(ch.to_string(), stack, style));
            }
        }
    }

    fn delete_range(&mut self, range: Range<usize>) -> EditOutcome {
        let range = range.start.min(self.len())..range.end.min(self.len());
        if range.start > range.end {
            return Err(EditError::InvalidPosition(range.start));
        }
        self.ensure_char_boundary(range.start)?;
        self.ensure_char_boundary(range.end)?;

        // Glyph runs inside the selection survive; only literal text goes.
        let kept = guard::clip_range(self, range.clone());
        for sub in kept.iter().rev() {
            self.delete_span(sub.clone());
        }
        Ok((kept, range.start..range.start))
    }

    fn backspace(&mut self, at: usize) -> EditOutcome {
        let at = at.min(self.len());
        self.ensure_char_boundary(at)?;
        if at == 0 {
            return Ok((Vec::new(), 0..0));
        }
        let text = self.text();
        let Some(prev) = text[..at].chars().next_back() else {
            return Ok((Vec::new(), at..at));
        };
        let prev_start = at - prev.len_utf8();
        if prev != '\n'
            && let Some((run, span)) = self.run_at(prev_start)
            && run.is_glyph()
        {
            // Glyphs are atomic: hop to the far edge instead of deleting in
            let caret = span.start;
            return Ok((Vec::new(), caret..caret));
        }
        self.delete_span(prev_start..at);
        Ok((vec![prev_start..at], prev_start..prev_start))
    }

    fn delete_forward(&mut self, at: usize) -> EditOutcome {
        let at = at.min(self.len());
        self.ensure_char_boundary(at)?;
        if at == self.len() {
            return Ok((Vec::new(), at..at));
        }
        let text = self.text();
        let Some(next) = text[at..].chars().next() else {
            return Ok((Vec::new(), at..at));
        };
        if next != '\n'
            && let Some((run, span)) = self.run_at(at)
            && run.is_glyph()
        {
            let caret = span.end;
            return Ok((Vec::new(), caret..caret));
        }
        let end = at + next.len_utf8();
        self.delete_span(at..end);
        Ok((vec![at..end], at..at))
    }

    fn wrap(&mut self, registry: &Registry, name: &str, range: Range<usize>) -> EditOutcome {
        let construct = registry
            .by_name(name)
            .ok_or_else(|| EditError::UnknownConstruct(name.to_string()))?;
        if range.end > self.len() {
            return Err(EditError::InvalidPosition(range.end));
        }
        if range.start >= range.end {
            return Err(EditError::EmptySelection);
        }
        self.ensure_char_boundary(range.start)?;
        self.ensure_char_boundary(range.end)?;
        if self.text()[range.clone()].contains('\n') {
            // Constructs never span a line
            return Err(EditError::SelectionCrossesBoundary);
        }

        let prefix = self.wrap_prefix(registry, &range)?;

        // Every run the selection touches must sit at or below the prefix,
        // and any glyph it touches must belong to a fully-covered construct.
        let mut max_depth = prefix.depth();
        let mut global = 0;
        for block in &self.blocks {
            for run in &block.runs {
                let span = global..global + run.len();
                global = span.end;
                if span.end <= range.start || span.start >= range.end {
                    continue;
                }
                if !run.stack.starts_with(&prefix) {
                    return Err(EditError::SelectionCrossesBoundary);
                }
                if run.is_glyph && run.stack.depth() <= prefix.depth() {
                    return Err(EditError::SelectionCrossesBoundary);
                }
                max_depth = max_depth.max(run.stack.depth());
            }
            global += 1;
        }
        if max_depth >= MAX_DEPTH {
            return Err(EditError::NestingTooDeep);
        }

        // Validation done; split the boundaries and open the construct.
        let Some(start) = self.locate(range.start) else {
            return Err(EditError::InvalidPosition(range.start));
        };
        let block = start.block;
        let s_idx = self.split_run(block, start.run, start.offset);
        let Some(end) = self.locate(range.end) else {
            return Err(EditError::InvalidPosition(range.end));
        };
        let e_idx = self.split_run(block, end.run, end.offset);

        let depth = prefix.depth();
        for run in &mut self.blocks[block].runs[s_idx..e_idx] {
            if run.stack.insert(depth, name).is_err() {
                return Err(EditError::NestingTooDeep);
            }
            run.style = fold_style(registry, &run.stack);
        }

        let mut inner = prefix;
        if inner.push(name).is_err() {
            return Err(EditError::NestingTooDeep);
        }
        let glyph_style = fold_style(registry, &inner);
        if let Some(glyph) = construct.end_glyph() {
            self.blocks[block]
                .runs
                .insert(e_idx, Run::glyph(glyph, inner.clone(), glyph_style));
        }
        if let Some(glyph) = construct.begin_glyph() {
            self.blocks[block]
                .runs
                .insert(s_idx, Run::glyph(glyph, inner.clone(), glyph_style));
        }
        self.coalesce(block);

        let lead = construct.begin_glyph().map_or(0, str::len);
        let trail = construct.end_glyph().map_or(0, str::len);
        let selection = range.start + lead..range.end + lead;
        Ok((vec![range.start..range.end + lead + trail], selection))
    }

    /// The construct stack shared by both selection endpoints, or an error
    /// when they disagree.
    ///
    /// The stack at the start comes from the first selected character, at the
    /// end from the last. A selected begin glyph at the start (or end glyph
    /// at the end) means its whole construct is inside the selection, so the
    /// stack outside that glyph applies.
    fn wrap_prefix(
        &self,
        registry: &Registry,
        range: &Range<usize>,
    ) -> Result<ConstructStack, EditError> {
        let Some((first, _)) = self.run_at(range.start) else {
            return Err(EditError::SelectionCrossesBoundary);
        };
        let mut start_stack = first.stack().clone();
        if first.is_glyph() && guard::is_begin_glyph(registry, first) {
            start_stack.pop();
        }

        let Some(end_addr) = self.locate(range.end) else {
            return Err(EditError::SelectionCrossesBoundary);
        };
        let runs = &self.blocks[end_addr.block].runs;
        let last = if end_addr.offset == 0 {
            let Some(i) = end_addr.run.checked_sub(1) else {
                return Err(EditError::SelectionCrossesBoundary);
            };
            &runs[i]
        } else {
            &runs[end_addr.run]
        };
        let mut end_stack = last.stack().clone();
        if last.is_glyph() && guard::is_end_glyph(registry, last) {
            end_stack.pop();
        }

        if start_stack != end_stack {
            return Err(EditError::SelectionCrossesBoundary);
        }
        Ok(start_stack)
    }

    fn unwrap_construct(&mut self, registry: &Registry, name: &str, at: usize) -> EditOutcome {
        let construct = registry
            .by_name(name)
            .ok_or_else(|| EditError::UnknownConstruct(name.to_string()))?;
        let at = at.min(self.len());
        self.ensure_char_boundary(at)?;
        let Some(addr) = self.locate(at) else {
            return Err(EditError::InvalidPosition(at));
        };

        let block = addr.block;
        let runs = &self.blocks[block].runs;
        let peek_at = |i: usize| runs.get(i).and_then(|r| r.stack.peek());
        let mut anchor = addr.run;
        if peek_at(anchor) != Some(name) {
            // Boundary positions keep left affinity: a caret sitting just
            // past the construct (e.g. after its end glyph) still targets it
            if addr.offset == 0
                && let Some(prev) = anchor.checked_sub(1)
                && peek_at(prev) == Some(name)
            {
                anchor = prev;
            } else {
                return Err(EditError::NotInnermost(name.to_string()));
            }
        }
        let Some(anchor_run) = runs.get(anchor) else {
            return Err(EditError::NotInnermost(name.to_string()));
        };
        let depth = anchor_run.stack.depth() - 1;

        let in_region =
            |run: &Run| run.stack.depth() > depth && run.stack.get(depth) == Some(name);
        let own_glyph = |run: &Run| {
            run.is_glyph && run.stack.depth() == depth + 1 && run.stack.peek() == Some(name)
        };

        // Extent of this construct instance within the block, stopping at its
        // own glyphs so adjacent same-name instances stay untouched.
        let mut lo = anchor;
        while lo > 0 {
            let prev = &runs[lo - 1];
            if own_glyph(prev) && guard::is_begin_glyph(registry, prev) {
                lo -= 1;
                break;
            }
            if in_region(prev) {
                lo -= 1;
            } else {
                break;
            }
        }
        let mut hi = anchor;
        while hi + 1 < runs.len() {
            let next = &runs[hi + 1];
            if own_glyph(next) && guard::is_end_glyph(registry, next) {
                hi += 1;
                break;
            }
            if in_region(next) {
                hi += 1;
            } else {
                break;
            }
        }

        // Caret compensation for glyphs that are about to vanish.
        let mut run_off = self.block_start(block)
            + runs[..lo].iter().map(Run::len).sum::<usize>();
        let region_start = run_off;
        let mut removed_before_caret = 0;
        for run in &runs[lo..=hi] {
            if own_glyph(run) && run_off + run.len() <= at {
                removed_before_caret += run.len();
            }
            run_off += run.len();
        }
        let region_end = run_off;

        let tail = self.blocks[block].runs.split_off(hi + 1);
        let region = self.blocks[block].runs.split_off(lo);
        for mut run in region {
            if run.is_glyph
                && run.stack.depth() == depth + 1
                && run.stack.peek() == Some(name)
                && (Some(run.text.as_str()) == construct.begin_glyph()
                    || Some(run.text.as_str()) == construct.end_glyph())
            {
                continue;
            }
            run.stack.remove(depth);
            run.style = fold_style(registry, &run.stack);
            self.blocks[block].runs.push(run);
        }
        self.blocks[block].runs.extend(tail);
        self.coalesce(block);

        let caret = at - removed_before_caret;
        Ok((vec![region_start..region_end], caret..caret))
    }

    /// Remove `range` outright. Internal: callers have validated boundaries
    /// and clipped glyphs.
    fn delete_span(&mut self, range: Range<usize>) {
        if range.start >= range.end {
            return;
        }
        let Some(start) = self.locate(range.start) else {
            return;
        };
        let s_idx = self.split_run(start.block, start.run, start.offset);
        let Some(end) = self.locate(range.end) else {
            return;
        };
        let e_idx = self.split_run(end.block, end.run, end.offset);

        if start.block == end.block {
            self.blocks[start.block].runs.drain(s_idx..e_idx);
        } else {
            self.blocks[start.block].runs.truncate(s_idx);
            let tail = self.blocks[end.block].runs.split_off(e_idx);
            self.blocks[start.block].runs.extend(tail);
            self.blocks.drain(start.block + 1..=end.block);
        }
        self.coalesce(start.block);
    }
}
