//! End-to-end behavior of the markup engine through its public API.

use novamark_engine::editing::{Cmd, Document, EditError};
use novamark_engine::markup::{Registry, SPECIAL_NAMES};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case::plain("A plain paragraph with no markup at all.")]
#[case::speech("He said @q{leave the light on}q@ and left.")]
#[case::emphasis("Read it @e{slowly}e@, then @b{again}b@.")]
#[case::nested("@q{She whispered @e{do not look back}e@ to him}q@")]
#[case::special("@Q[Thano]{The harvest waits for no one}Q@")]
#[case::deep("@e{a @b{b @q{c}q@ d}b@ e}e@")]
#[case::multiline("First line\n@q{Second line speech}q@\nThird line")]
#[case::adjacent("@q{A}q@B@q{C}q@")]
#[case::blank_lines("before\n\nafter\n")]
fn parse_serialize_round_trip(#[case] markup: &str) {
    let registry = Registry::standard();
    let doc = Document::from_markup(&registry, markup);
    assert_eq!(doc.to_markup(&registry), markup);
}

#[test]
fn every_special_name_round_trips() {
    let registry = Registry::standard();
    for name in SPECIAL_NAMES {
        let markup = format!("@Q[{name}]{{a line of {name}}}Q@");
        let doc = Document::from_markup(&registry, &markup);
        assert_eq!(doc.to_markup(&registry), markup);
        assert_eq!(doc.constructs_at(2), vec![name.to_string()]);
    }
}

#[test]
fn nested_constructs_compose() {
    let registry = Registry::standard();
    let doc = Document::from_markup(&registry, "@q{outer @Q[Dana]{inner}Q@ rest}q@");
    // Display text: ‟outer «inner» rest”
    let inner_offset = 3 + "outer ".len() + 2; // begin glyphs are 3 and 2 bytes
    assert_eq!(
        doc.constructs_at(inner_offset),
        vec!["Speech".to_string(), "Dana".to_string()]
    );
}

#[test]
fn glyphs_stay_out_of_markup() {
    let registry = Registry::standard();
    let markup = "@q{a}q@ @Q[Ipno]{b}Q@";
    let doc = Document::from_markup(&registry, markup);
    let out = doc.to_markup(&registry);
    for glyph in ["\u{201F}", "\u{201D}", "\u{AB}", "\u{BB}"] {
        assert!(!out.contains(glyph));
    }
    assert_eq!(out, markup);
}

#[test]
fn unterminated_construct_recovers_per_line() {
    let registry = Registry::standard();
    let doc = Document::from_markup(&registry, "broken @q{speech\nclean line");
    // The next line is unaffected by the recovery on the first
    assert_eq!(doc.blocks().len(), 2);
    assert_eq!(doc.blocks()[1].text(), "clean line");
    // Recovery is lossy on purpose: the forced close becomes real markup
    assert_eq!(doc.to_markup(&registry), "broken @q{speech}q@\nclean line");
}

#[test]
fn wrap_rejects_crossing_selection() {
    let registry = Registry::standard();
    let mut doc = Document::from_markup(&registry, "@q{A}q@B@q{C}q@");
    let before = doc.clone();
    // Display bytes: glyph(3) A glyph(3) B glyph(3) C glyph(3)
    let err = doc
        .apply(
            &registry,
            Cmd::Wrap {
                name: "Bold".to_string(),
                range: 3..12,
            },
        )
        .unwrap_err();
    assert_eq!(err, EditError::SelectionCrossesBoundary);
    assert_eq!(doc, before);
}

#[rstest]
#[case::at_start(0)]
#[case::mid_selection(2)]
#[case::at_end(5)]
#[case::past_end_glyph(8)] // end glyph is 3 bytes
fn wrap_then_unwrap_is_identity(#[case] anchor_offset: usize) {
    let registry = Registry::standard();
    let original = "He never said that aloud.";
    let mut doc = Document::from_markup(&registry, original);

    let patch = doc
        .apply(
            &registry,
            Cmd::Wrap {
                name: "Speech".to_string(),
                range: 3..8, // "never"
            },
        )
        .unwrap();
    assert_eq!(doc.to_markup(&registry), "He @q{never}q@ said that aloud.");

    // Unwrapping works from any position within the construct's extent
    doc.apply(
        &registry,
        Cmd::Unwrap {
            name: "Speech".to_string(),
            at: patch.new_selection.start + anchor_offset,
        },
    )
    .unwrap();
    assert_eq!(doc.to_markup(&registry), original);
}

#[test]
fn typing_around_glyphs_preserves_them() {
    let registry = Registry::standard();
    let mut doc = Document::from_markup(&registry, "@q{hi}q@");

    // Backspace right after the end glyph leaves it alone
    let len = doc.len();
    doc.apply(&registry, Cmd::Backspace { at: len }).unwrap();
    // Deleting the whole selection keeps the construct shell
    doc.apply(&registry, Cmd::DeleteRange { range: 0..len })
        .unwrap();
    assert_eq!(doc.to_markup(&registry), "@q{}q@");
}

#[test]
fn edits_round_trip_through_markup() {
    let registry = Registry::standard();
    let mut doc = Document::from_markup(&registry, "She waited.");
    doc.apply(
        &registry,
        Cmd::Wrap {
            name: "Italic".to_string(),
            range: 4..10, // "waited"
        },
    )
    .unwrap();
    let markup = doc.to_markup(&registry);
    assert_eq!(markup, "She @e{waited}e@.");

    // Reparsing the serialized form reproduces the same document content
    let reparsed = Document::from_markup(&registry, &markup);
    assert_eq!(reparsed.text(), doc.text());
    assert_eq!(reparsed.to_markup(&registry), markup);
}
