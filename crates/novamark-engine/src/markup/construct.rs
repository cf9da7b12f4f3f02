/// Toolkit-independent display attributes attached to a construct.
///
/// Styles are folded left-to-right over the active construct stack:
/// a later tint replaces an earlier one, italic and bold accumulate.
/// Frontends map this to their own colour/weight types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub tint: Option<Tint>,
    pub italic: bool,
    pub bold: bool,
}

/// Foreground tint classes used by the standard constructs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    /// Direct speech (rendered dark green in the reference frontend).
    Speech,
    /// Per-character special quotation (rendered dark magenta).
    SpecialQuote,
}

impl Style {
    pub const fn tinted(tint: Tint) -> Self {
        Self {
            tint: Some(tint),
            italic: false,
            bold: false,
        }
    }

    pub const fn italic() -> Self {
        Self {
            tint: None,
            italic: true,
            bold: false,
        }
    }

    pub const fn bold() -> Self {
        Self {
            tint: None,
            italic: false,
            bold: true,
        }
    }

    /// Fold another style on top of this one.
    pub fn merge(&mut self, other: &Style) {
        if other.tint.is_some() {
            self.tint = other.tint;
        }
        self.italic |= other.italic;
        self.bold |= other.bold;
    }
}

/// A named, pairable markup annotation.
///
/// Constructs are immutable once built: begin/end markers delimit the
/// annotated span in markup text, and the optional glyphs are the decorative
/// characters shown in place of the markers while editing.
#[derive(Debug, Clone, PartialEq)]
pub struct Construct {
    name: String,
    begin: String,
    end: String,
    begin_glyph: Option<String>,
    end_glyph: Option<String>,
    style: Style,
    description: String,
    icon: Option<String>,
}

impl Construct {
    pub fn new(
        name: impl Into<String>,
        begin: impl Into<String>,
        end: impl Into<String>,
        style: Style,
    ) -> Self {
        let name = name.into();
        let description = name.clone();
        Self {
            name,
            begin: begin.into(),
            end: end.into(),
            begin_glyph: None,
            end_glyph: None,
            style,
            description,
            icon: None,
        }
    }

    pub fn with_glyphs(mut self, begin: impl Into<String>, end: impl Into<String>) -> Self {
        self.begin_glyph = Some(begin.into());
        self.end_glyph = Some(end.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn begin(&self) -> &str {
        &self.begin
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn begin_glyph(&self) -> Option<&str> {
        self.begin_glyph.as_deref()
    }

    pub fn end_glyph(&self) -> Option<&str> {
        self.end_glyph.as_deref()
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }
}
