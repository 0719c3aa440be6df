/*!
 * Core interchange document types.
 *
 * A document holds the translation units of exactly one target language.
 * Unit identity is a structured `SegmentId`; its textual `_msg{row}_{index}`
 * form exists only at the XML boundary.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::ReassemblyError;

static SEGMENT_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_msg(\d+)_(\d+)$").expect("Invalid segment id regex"));

/// Stable identity of a segment: spreadsheet row and position in that row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId {
    /// Row number in the source sheet
    pub row: u32,

    /// Zero-based position of the segment within the row
    pub index: u32,
}

impl SegmentId {
    pub fn new(row: u32, index: u32) -> Self {
        Self { row, index }
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_msg{}_{}", self.row, self.index)
    }
}

impl FromStr for SegmentId {
    type Err = ReassemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ReassemblyError::MalformedId(s.to_string());
        let caps = SEGMENT_ID_REGEX.captures(s.trim()).ok_or_else(malformed)?;
        let row = caps[1].parse().map_err(|_| malformed())?;
        let index = caps[2].parse().map_err(|_| malformed())?;
        Ok(Self { row, index })
    }
}

/// Review state carried on every `<target>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetState {
    /// Initial state for exported units
    #[default]
    NeedsReviewTranslation,
    /// Marked as translated by the tool
    Translated,
    /// Signed off by a reviewer
    Final,
    /// Any other XLIFF state value
    Other(String),
}

impl TargetState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NeedsReviewTranslation => "needs-review-translation",
            Self::Translated => "translated",
            Self::Final => "final",
            Self::Other(value) => value,
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "needs-review-translation" => Self::NeedsReviewTranslation,
            "translated" => Self::Translated,
            "final" => Self::Final,
            other => Self::Other(other.to_string()),
        }
    }
}

/// One translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: SegmentId,

    /// Tagged source text
    pub source_text: String,

    /// Target text, possibly blank
    pub target_text: String,

    /// Review state of the target
    #[serde(default)]
    pub state: TargetState,

    /// Reviewer note, only on the first segment of a commented row
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl Segment {
    pub fn new(id: SegmentId, source_text: impl Into<String>, target_text: impl Into<String>) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            target_text: target_text.into(),
            state: TargetState::default(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn row_number(&self) -> u32 {
        self.id.row
    }

    pub fn segment_index(&self) -> u32 {
        self.id.index
    }
}

/// Document-level attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Source language tag (e.g. "en-US")
    pub source_language: String,

    /// Target language tag (e.g. "nb-NO")
    pub target_language: String,

    /// Identity of the originating workbook
    pub original: String,
}

/// Ordered translation units for one target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeDocument {
    pub metadata: DocumentMetadata,
    pub segments: Vec<Segment>,
}

impl InterchangeDocument {
    pub fn new(metadata: DocumentMetadata) -> Self {
        Self {
            metadata,
            segments: Vec::new(),
        }
    }

    /// Number of units in the document.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Look a unit up by id.
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }
}
