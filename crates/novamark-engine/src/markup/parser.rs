use crate::editing::document::{Block, Run};
use crate::editing::stack::ConstructStack;
use crate::markup::construct::Style;
use crate::markup::registry::Registry;
use crate::markup::scanner::{BoundaryKind, find_next_boundary};

/// Fold the styles of every construct on `stack`, outermost first.
pub(crate) fn fold_style(registry: &Registry, stack: &ConstructStack) -> Style {
    let mut style = Style::default();
    for name in stack.iter() {
        if let Some(construct) = registry.by_name(name) {
            style.merge(construct.style());
        }
    }
    style
}

/// Parse markup text into blocks of runs.
///
/// A state machine over an explicit open-construct stack, driven by the
/// boundary scanner from position 0 to end of text. Literal spans become
/// runs tagged with the stack as it was before the boundary takes effect;
/// begin/end glyphs become dedicated glyph runs. Malformed input never
/// aborts the parse: mismatched end markers and unterminated constructs are
/// logged and recovered.
pub(crate) fn parse_blocks(registry: &Registry, text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut runs: Vec<Run> = Vec::new();
    let mut stack = ConstructStack::new();
    let mut pos = 0;

    loop {
        let boundary = find_next_boundary(text, pos, registry);
        let literal = &text[boundary.literal.clone()];
        if !literal.is_empty() {
            runs.push(Run::literal(
                literal,
                stack.clone(),
                fold_style(registry, &stack),
            ));
        }

        match boundary.kind {
            BoundaryKind::Begin(construct) => {
                if stack.push(construct.name()).is_err() {
                    log::error!(
                        "nesting too deep at byte {}, dropping open of {:?}",
                        boundary.literal.end,
                        construct.name()
                    );
                } else if let Some(glyph) = construct.begin_glyph() {
                    // The glyph visually belongs to the construct it opens,
                    // so it carries the post-push stack.
                    runs.push(Run::glyph(
                        glyph,
                        stack.clone(),
                        fold_style(registry, &stack),
                    ));
                }
            }
            BoundaryKind::End(construct) => {
                if let Some(glyph) = construct.end_glyph() {
                    runs.push(Run::glyph(
                        glyph,
                        stack.clone(),
                        fold_style(registry, &stack),
                    ));
                }
                match stack.pop() {
                    Some(top) if top == construct.name() => {}
                    Some(top) => {
                        // Constructs may share an end marker (all special
                        // quotations close with the same one); only a truly
                        // different marker is a mismatch.
                        let shared = registry
                            .by_name(&top)
                            .is_some_and(|c| c.end() == construct.end());
                        if shared {
                            log::debug!(
                                "closed {:?} via shared end marker {:?}",
                                top,
                                construct.end()
                            );
                        } else {
                            log::error!("expecting {:?}, got {:?}", top, construct.end());
                        }
                    }
                    None => {
                        log::error!("end marker {:?} with empty stack", construct.end());
                    }
                }
            }
            BoundaryKind::LineEnd | BoundaryKind::TextEnd => {
                if !stack.is_empty() {
                    log::error!("EOL with non-empty stack: {}", stack.join());
                    close_unterminated(registry, &mut stack, &mut runs);
                }
                blocks.push(Block::new(std::mem::take(&mut runs)));
                if boundary.kind == BoundaryKind::TextEnd {
                    break;
                }
            }
        }

        pos = boundary.next_pos;
    }

    blocks
}

/// Forced-close recovery for constructs still open at a line boundary:
/// pop everything, synthesizing each end glyph with the stack as it stands
/// at that pop.
fn close_unterminated(registry: &Registry, stack: &mut ConstructStack, runs: &mut Vec<Run>) {
    while let Some(name) = stack.peek().map(str::to_string) {
        if let Some(glyph) = registry.by_name(&name).and_then(|c| c.end_glyph()) {
            runs.push(Run::glyph(
                glyph,
                stack.clone(),
                fold_style(registry, stack),
            ));
        }
        stack.pop();
    }
}
