//! Scene commentary from an outside reviewer (typically a language model
//! behind an HTTP endpoint).
//!
//! Reviewers never see raw markers: scenes are reduced to display text
//! first, so constructs with glyphs keep their decorations and glyphless
//! ones read as plain prose.

use crate::editing::Document;
use crate::markup::Registry;

/// Source of commentary on a scene's text. The engine stays transport
/// agnostic; callers plug in whatever backend they talk to.
pub trait CommentaryProvider {
    fn commentary(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Reduce markup to the display text sent out for analysis.
pub fn plain_text_for_analysis(registry: &Registry, markup: &str) -> String {
    Document::from_markup(registry, markup).text()
}

/// Build the prompt for one scene.
pub fn analysis_prompt(scene_title: &str, text: &str) -> String {
    format!(
        "You are reviewing a scene from a novel draft.\n\
         Scene: {scene_title}\n\n\
         {text}\n\n\
         Give concise editorial commentary on pacing, dialogue and clarity."
    )
}

/// Ask `provider` for commentary on a scene's markup.
pub fn request_commentary(
    provider: &dyn CommentaryProvider,
    registry: &Registry,
    scene_title: &str,
    markup: &str,
) -> anyhow::Result<String> {
    let text = plain_text_for_analysis(registry, markup);
    provider.commentary(&analysis_prompt(scene_title, &text))
}
