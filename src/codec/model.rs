/*!
 * Rich-text run types shared by the encoder and decoder.
 */

use serde::{Deserialize, Serialize};

/// A contiguous stretch of cell text with uniform emphasis.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormattedRun {
    /// Run text, verbatim
    pub text: String,

    /// Bold font
    #[serde(default)]
    pub bold: bool,

    /// Red font colour
    #[serde(default)]
    pub red: bool,
}

impl FormattedRun {
    /// Create a run with explicit flags.
    pub fn new(text: impl Into<String>, bold: bool, red: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            red,
        }
    }

    /// Create an unformatted run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, false, false)
    }

    /// Create a bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(text, true, false)
    }

    /// Create a red run.
    pub fn red(text: impl Into<String>) -> Self {
        Self::new(text, false, true)
    }

    /// Create a bold and red run.
    pub fn bold_red(text: impl Into<String>) -> Self {
        Self::new(text, true, true)
    }

    /// Emphasis style of this run, `None` when unformatted.
    pub fn style(&self) -> Option<Style> {
        Style::from_flags(self.bold, self.red)
    }
}

/// Concatenate the text of all runs.
pub fn plain_text(runs: &[FormattedRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect()
}

/// The three inline emphasis styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// `<cf>` bold
    Bold,
    /// `<cr>` red
    Red,
    /// `<cfr>` bold and red
    BoldRed,
}

impl Style {
    /// All styles, longest tag name first.
    pub const ALL: [Style; 3] = [Style::BoldRed, Style::Bold, Style::Red];

    /// Map run flags to a style.
    pub fn from_flags(bold: bool, red: bool) -> Option<Self> {
        match (bold, red) {
            (true, true) => Some(Self::BoldRed),
            (true, false) => Some(Self::Bold),
            (false, true) => Some(Self::Red),
            (false, false) => None,
        }
    }

    /// Parse a bare tag name (`cf`, `cr`, `cfr`).
    pub fn from_tag_name(name: &str) -> Option<Self> {
        match name {
            "cf" => Some(Self::Bold),
            "cr" => Some(Self::Red),
            "cfr" => Some(Self::BoldRed),
            _ => None,
        }
    }

    /// Bare tag name.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Bold => "cf",
            Self::Red => "cr",
            Self::BoldRed => "cfr",
        }
    }

    /// Opening marker, e.g. `<cf>`.
    pub fn open_marker(self) -> &'static str {
        match self {
            Self::Bold => "<cf>",
            Self::Red => "<cr>",
            Self::BoldRed => "<cfr>",
        }
    }

    /// Closing marker, e.g. `</cf>`.
    pub fn close_marker(self) -> &'static str {
        match self {
            Self::Bold => "</cf>",
            Self::Red => "</cr>",
            Self::BoldRed => "</cfr>",
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, Self::Bold | Self::BoldRed)
    }

    pub fn is_red(self) -> bool {
        matches!(self, Self::Red | Self::BoldRed)
    }
}
