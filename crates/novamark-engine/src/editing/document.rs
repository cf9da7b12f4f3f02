use std::ops::Range;

use crate::editing::stack::ConstructStack;
use crate::markup::construct::Style;
use crate::markup::registry::Registry;

/// The atomic editable unit: a contiguous text span sharing one
/// construct-stack state.
///
/// Invariant: a glyph run's text is exactly one construct's begin or end
/// glyph. Glyph runs are display-only decorations; the serializer skips them
/// and the edit-safety layer keeps keystrokes out of them.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub(crate) text: String,
    pub(crate) stack: ConstructStack,
    pub(crate) style: Style,
    pub(crate) is_glyph: bool,
}

impl Run {
    pub fn literal(text: impl Into<String>, stack: ConstructStack, style: Style) -> Self {
        Self {
            text: text.into(),
            stack,
            style,
            is_glyph: false,
        }
    }

    pub fn glyph(text: impl Into<String>, stack: ConstructStack, style: Style) -> Self {
        Self {
            text: text.into(),
            stack,
            style,
            is_glyph: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn stack(&self) -> &ConstructStack {
        &self.stack
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn is_glyph(&self) -> bool {
        self.is_glyph
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// One line of the document, composed of ordered runs.
///
/// Invariant: the open-construct stack is empty at the start and end of every
/// block; constructs never span a line boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub(crate) runs: Vec<Run>,
}

impl Block {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Byte length of the block's display text.
    pub fn len(&self) -> usize {
        self.runs.iter().map(Run::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(Run::is_empty)
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// Resolved location of a document offset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Address {
    pub block: usize,
    /// Run index; equals `runs.len()` only for an empty block.
    pub run: usize,
    /// Byte offset within the run.
    pub offset: usize,
    /// Global offset of the run's first byte.
    pub run_start: usize,
}

/// The annotated document: an ordered sequence of blocks owning their runs.
///
/// Mutated only through [`Document::set_markup`] (full rebuild) or
/// [`Document::apply`](crate::editing::commands) (incremental, glyph-safe).
/// All offsets are byte offsets into [`Document::text`], where blocks are
/// joined by single `\n` separators.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub(crate) blocks: Vec<Block>,
    pub(crate) selection: Range<usize>,
    pub(crate) version: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::default()],
            selection: 0..0,
            version: 0,
        }
    }

    /// Parse markup text into a fresh document.
    pub fn from_markup(registry: &Registry, text: &str) -> Self {
        let mut doc = Self::new();
        doc.set_markup(registry, text);
        doc
    }

    /// Replace the whole content with a new parse of `text`.
    ///
    /// One atomic step: a single version bump, no observable intermediate
    /// state. Never fails; malformed markup is recovered per the parser's
    /// rules.
    pub fn set_markup(&mut self, registry: &Registry, text: &str) {
        self.blocks = crate::markup::parser::parse_blocks(registry, text);
        self.version += 1;
        let len = self.len();
        self.selection = len..len;
    }

    /// Serialize the current content back to markup text.
    pub fn to_markup(&self, registry: &Registry) -> String {
        crate::markup::serializer::to_markup(registry, self)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Display text including decorative glyphs, blocks joined with `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for run in &block.runs {
                out.push_str(&run.text);
            }
        }
        out
    }

    /// Byte length of the display text.
    pub fn len(&self) -> usize {
        let block_bytes: usize = self.blocks.iter().map(Block::len).sum();
        block_bytes + self.blocks.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_empty()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        let len = self.len();
        self.selection = selection.start.min(len)..selection.end.min(len);
    }

    /// Position query for outward collaborators: the ordered list of active
    /// construct names at `offset`, outermost first.
    ///
    /// Block boundaries report an empty stack, matching the invariant that
    /// constructs never span a line.
    pub fn constructs_at(&self, offset: usize) -> Vec<String> {
        match self.run_at(offset) {
            Some((run, span)) if offset < span.end => {
                run.stack.iter().map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }

    /// The run whose half-open span contains `offset`, with its global span.
    /// Offset at end of text resolves to the final run. Returns `None` for a
    /// `\n` separator position or an empty block.
    pub fn run_at(&self, offset: usize) -> Option<(&Run, Range<usize>)> {
        let addr = self.locate(offset)?;
        let block = &self.blocks[addr.block];
        let run = block.runs.get(addr.run)?;
        Some((run, addr.run_start..addr.run_start + run.len()))
    }

    /// Resolve `offset` to a block/run address. Boundary offsets resolve to
    /// the start of the following run; end of block resolves to the end of
    /// its last run. Returns `None` when `offset` is past the end or sits on
    /// a block separator.
    pub(crate) fn locate(&self, offset: usize) -> Option<Address> {
        let mut global = 0;
        for (bi, block) in self.blocks.iter().enumerate() {
            let block_len = block.len();
            if offset <= global + block_len {
                let mut local = offset - global;
                let mut run_start = global;
                let last = block.runs.len().saturating_sub(1);
                for (ri, run) in block.runs.iter().enumerate() {
                    if local < run.len() || (ri == last && local == run.len()) {
                        return Some(Address {
                            block: bi,
                            run: ri,
                            offset: local,
                            run_start,
                        });
                    }
                    local -= run.len();
                    run_start += run.len();
                }
                // Empty block: insertion point before any run
                return Some(Address {
                    block: bi,
                    run: 0,
                    offset: 0,
                    run_start: global,
                });
            }
            global += block_len + 1; // separator
        }
        None
    }

    /// Global offset of the first byte of block `bi`.
    pub(crate) fn block_start(&self, bi: usize) -> usize {
        self.blocks[..bi].iter().map(|b| b.len() + 1).sum()
    }

    /// Split the run at `addr` so that `addr.offset` becomes a run boundary.
    /// Returns the index of the run beginning at that boundary. `addr.offset`
    /// must lie on a char boundary.
    pub(crate) fn split_run(&mut self, block: usize, run: usize, offset: usize) -> usize {
        let runs = &mut self.blocks[block].runs;
        if run >= runs.len() || offset == 0 {
            return run;
        }
        if offset >= runs[run].len() {
            return run + 1;
        }
        let tail_text = runs[run].text.split_off(offset);
        let tail = Run {
            text: tail_text,
            stack: runs[run].stack.clone(),
            style: runs[run].style,
            is_glyph: runs[run].is_glyph,
        };
        runs.insert(run + 1, tail);
        run + 1
    }

    /// Merge adjacent non-glyph runs with identical stacks and drop empty
    /// runs left behind by edits.
    pub(crate) fn coalesce(&mut self, block: usize) {
        let runs = &mut self.blocks[block].runs;
        runs.retain(|r| !r.text.is_empty());
        let mut i = 1;
        while i < runs.len() {
            let mergeable = !runs[i].is_glyph
                && !runs[i - 1].is_glyph
                && runs[i].stack == runs[i - 1].stack;
            if mergeable {
                let text = runs.remove(i).text;
                runs[i - 1].text.push_str(&text);
            } else {
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn registry() -> Registry {
        Registry::standard()
    }

    #[test]
    fn empty_document_has_one_block() {
        let doc = Document::new();
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.len(), 0);
        assert!(doc.is_empty());
        assert_eq!(doc.text(), "");
    }

    #[test]
    fn display_text_substitutes_glyphs() {
        let registry = registry();
        let doc = Document::from_markup(&registry, "He said @q{hi}q@.");
        assert_eq!(doc.text(), "He said \u{201F}hi\u{201D}.");
    }

    #[test]
    fn len_counts_block_separators() {
        let registry = registry();
        let doc = Document::from_markup(&registry, "ab\ncd");
        assert_eq!(doc.len(), 5);
        assert_eq!(doc.text(), "ab\ncd");
    }

    #[test]
    fn set_markup_bumps_version_once() {
        let registry = registry();
        let mut doc = Document::new();
        let before = doc.version();
        doc.set_markup(&registry, "line one\nline @b{two}b@");
        assert_eq!(doc.version(), before + 1);
    }

    #[test]
    fn constructs_at_tracks_nesting() {
        let registry = registry();
        let doc = Document::from_markup(&registry, "a@e{b@b{c}b@}e@");
        // text: "abc"
        assert_eq!(doc.constructs_at(0), Vec::<String>::new());
        assert_eq!(doc.constructs_at(1), vec!["Italic".to_string()]);
        assert_eq!(
            doc.constructs_at(2),
            vec!["Italic".to_string(), "Bold".to_string()]
        );
    }

    #[test]
    fn constructs_at_line_separator_is_empty() {
        let registry = registry();
        let doc = Document::from_markup(&registry, "@b{ab}b@\ncd");
        // Offset 2 is the separator between blocks
        assert_eq!(doc.constructs_at(2), Vec::<String>::new());
    }

    #[test]
    fn locate_resolves_run_boundaries_rightward() {
        let registry = registry();
        let doc = Document::from_markup(&registry, "ab@b{cd}b@");
        // runs: "ab" then "cd"
        let addr = doc.locate(2).unwrap();
        assert_eq!((addr.run, addr.offset), (1, 0));
        let addr = doc.locate(4).unwrap();
        assert_eq!((addr.run, addr.offset), (1, 2)); // end of text
    }

    #[test]
    fn split_and_coalesce_round_trip() {
        let registry = registry();
        let mut doc = Document::from_markup(&registry, "hello");
        let boundary = doc.split_run(0, 0, 2);
        assert_eq!(boundary, 1);
        assert_eq!(doc.blocks[0].runs.len(), 2);
        assert_eq!(doc.blocks[0].runs[0].text(), "he");
        assert_eq!(doc.blocks[0].runs[1].text(), "llo");

        doc.coalesce(0);
        assert_eq!(doc.blocks[0].runs.len(), 1);
        assert_eq!(doc.blocks[0].runs[0].text(), "hello");
    }

    #[test]
    fn coalesce_keeps_glyph_runs_separate() {
        let registry = registry();
        let mut doc = Document::from_markup(&registry, "@q{a}q@@q{b}q@");
        let before = doc.blocks[0].runs.len();
        doc.coalesce(0);
        // Glyph runs must stay atomic even with equal stacks
        assert_eq!(doc.blocks[0].runs.len(), before);
    }
}
