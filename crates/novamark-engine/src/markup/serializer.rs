use crate::editing::document::Document;
use crate::editing::stack::ConstructStack;
use crate::markup::registry::Registry;

/// Serialize a document back to markup text.
///
/// Walks blocks and runs in order, skipping glyph runs (decorations never
/// reappear in markup). For each literal run, the active stack is diffed
/// against the previous run's: constructs no longer active are closed
/// innermost-first, newly active ones opened outermost-first, preserving
/// nesting order. Constructs still open at block end are closed, mirroring
/// the parser's unterminated-construct recovery.
///
/// For input with balanced, non-crossing markers,
/// `to_markup(parse(text)) == text`.
pub(crate) fn to_markup(registry: &Registry, doc: &Document) -> String {
    let mut lines = Vec::with_capacity(doc.blocks().len());

    for block in doc.blocks() {
        let mut line = String::new();
        let mut prev = ConstructStack::new();

        for run in block.runs() {
            if run.is_glyph() {
                continue;
            }
            emit_transition(registry, &mut line, &prev, run.stack());
            line.push_str(run.text());
            prev = run.stack().clone();
        }

        // Close anything still recorded open at the end of the line
        emit_transition(registry, &mut line, &prev, &ConstructStack::new());
        lines.push(line);
    }

    lines.join("\n")
}

/// Append the end/begin markers taking `prev` to `curr`.
///
/// Scans from the deepest position outward for the first divergence, then
/// closes the obsolete suffix of `prev` (innermost first) and opens the new
/// suffix of `curr` (outermost first).
fn emit_transition(registry: &Registry, out: &mut String, prev: &ConstructStack, curr: &ConstructStack) {
    let mut divergence = 0;
    while divergence < prev.depth()
        && divergence < curr.depth()
        && prev.get(divergence) == curr.get(divergence)
    {
        divergence += 1;
    }

    for depth in (divergence..prev.depth()).rev() {
        if let Some(name) = prev.get(depth)
            && let Some(construct) = registry.by_name(name)
        {
            out.push_str(construct.end());
        }
    }
    for depth in divergence..curr.depth() {
        if let Some(name) = curr.get(depth)
            && let Some(construct) = registry.by_name(name)
        {
            out.push_str(construct.begin());
        }
    }
}
