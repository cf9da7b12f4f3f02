use crate::markup::construct::{Construct, Style, Tint};

/// The fixed list of per-character special quotation names.
///
/// Case-sensitive; each gets its own `@Q[<Name>]{ ... }Q@` construct in the
/// standard registry.
pub const SPECIAL_NAMES: [&str; 12] = [
    "Afro", "Isto", "Thano", "Posse", "Zeo", "Palla", "Dionne", "Dana", "Fest", "Ipno", "Asclep",
    "Opia",
];

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate construct name {0:?}")]
    DuplicateName(String),
}

/// Ordered, immutable table of construct definitions.
///
/// Registration order matters: the boundary scanner tests constructs in this
/// order and resolves ties in favour of the earliest entry. The registry is
/// populated once at startup and passed explicitly to the parser, serializer
/// and editing layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Registry {
    constructs: Vec<Construct>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a construct. Fails if the name is already taken.
    pub fn register(&mut self, construct: Construct) -> Result<(), RegistryError> {
        if self.by_name(construct.name()).is_some() {
            return Err(RegistryError::DuplicateName(construct.name().to_string()));
        }
        self.constructs.push(construct);
        Ok(())
    }

    /// All constructs in registration order.
    pub fn all(&self) -> &[Construct] {
        &self.constructs
    }

    pub fn by_name(&self, name: &str) -> Option<&Construct> {
        self.constructs.iter().find(|c| c.name() == name)
    }

    /// Build the fixed construct set used by the novel editor:
    /// generic speech, one special quotation per name in [`SPECIAL_NAMES`],
    /// italic and bold.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                Construct::new("Speech", "@q{", "}q@", Style::tinted(Tint::Speech))
                    .with_glyphs("\u{201F}", "\u{201D}")
                    .with_description("Direct speech (quotes)"),
            )
            .expect("standard construct names are unique");
        for name in SPECIAL_NAMES {
            registry
                .register(
                    Construct::new(
                        name,
                        format!("@Q[{name}]{{"),
                        "}Q@",
                        Style::tinted(Tint::SpecialQuote),
                    )
                    .with_glyphs("\u{AB}", "\u{BB}")
                    .with_description(format!("Special quote ({name})")),
                )
                .expect("standard construct names are unique");
        }
        registry
            .register(
                Construct::new("Italic", "@e{", "}e@", Style::italic())
                    .with_description("Enhanced text (italics)"),
            )
            .expect("standard construct names are unique");
        registry
            .register(
                Construct::new("Bold", "@b{", "}b@", Style::bold())
                    .with_description("Bold text"),
            )
            .expect("standard construct names are unique");
        registry
    }
}
