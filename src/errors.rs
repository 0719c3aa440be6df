/*!
 * Error types for the xliffbridge library.
 *
 * This module contains custom error types for the different stages of the
 * spreadsheet <-> XLIFF pipeline, using the thiserror crate for ergonomic
 * error definitions.
 */

use thiserror::Error;

/// Errors raised by the tag codec.
///
/// Decoding never aborts on these: the offending remainder is kept as plain
/// text and the error is reported next to the recovered runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// A closing marker without a matching opening marker
    #[error("Closing tag </{tag}> at byte {offset} has no matching opening tag")]
    StrayClosingTag {
        /// Tag name (cf, cr or cfr)
        tag: String,
        /// Byte offset of the marker in the tagged text
        offset: usize,
    },

    /// An opening marker while another span is still open
    #[error("Tag <{inner}> at byte {offset} opened inside <{open}>; tags cannot nest")]
    NestedTag {
        /// Tag that is currently open
        open: String,
        /// Tag that tried to open inside it
        inner: String,
        /// Byte offset of the inner marker
        offset: usize,
    },

    /// An opening marker that is never closed
    #[error("Tag <{tag}> opened at byte {offset} is never closed")]
    UnclosedTag {
        /// Tag name
        tag: String,
        /// Byte offset of the opening marker
        offset: usize,
    },

    /// A run whose text already contains a tag marker
    #[error("Run {run_index} contains a reserved tag marker: {marker}")]
    ReservedMarker {
        /// Index of the offending run
        run_index: usize,
        /// The marker found in the run text
        marker: String,
    },
}

/// Structural contract violations while building an interchange document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// Two input rows share the same row number
    #[error("Duplicate row number {0}: each row must be unique within a document")]
    DuplicateRow(u32),

    /// Segmentation thresholds are inconsistent
    #[error("Invalid segmentation policy: min_segment_length={min} max_unsplit_length={max}")]
    InvalidPolicy {
        /// Minimum segment length
        min: usize,
        /// Maximum unsplit length
        max: usize,
    },

    /// Source text could not be tagged
    #[error("Row {row}: invalid source formatting")]
    Format {
        /// Row number of the failing cell
        row: u32,
        /// Codec error
        #[source]
        source: FormatError,
    },
}

/// Per-unit problems found while merging a returned document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The unit id does not follow the `_msg{row}_{index}` pattern
    #[error("Invalid segment ID format: {0}")]
    MalformedId(String),

    /// The unit has no id attribute at all
    #[error("Translation unit #{0} has no id attribute")]
    MissingId(usize),

    /// Two units carry the same (row, index) pair
    #[error("Segment _msg{row}_{index} appears more than once; keeping the first occurrence")]
    DuplicateSegment {
        /// Row number
        row: u32,
        /// Segment index
        index: u32,
    },
}

/// Errors reading or writing the XLIFF wire format.
#[derive(Error, Debug)]
pub enum InterchangeError {
    /// Low-level XML failure
    #[error("XML error: {0}")]
    Xml(String),

    /// The document root is not `<xliff>`
    #[error("Unexpected root element <{0}>, expected <xliff>")]
    UnexpectedRoot(String),

    /// The document has no `<file>` element
    #[error("Document has no <file> element")]
    MissingFile,

    /// The serialized document is not valid UTF-8
    #[error("Document is not valid UTF-8: {0}")]
    Encoding(String),
}

impl From<quick_xml::Error> for InterchangeError {
    fn from(error: quick_xml::Error) -> Self {
        Self::Xml(error.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for InterchangeError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(error.to_string())
    }
}

impl From<std::io::Error> for InterchangeError {
    fn from(error: std::io::Error) -> Self {
        Self::Xml(error.to_string())
    }
}

impl From<std::string::FromUtf8Error> for InterchangeError {
    fn from(error: std::string::FromUtf8Error) -> Self {
        Self::Encoding(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the tag codec
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// Error building a document
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// Error merging a document
    #[error("Reassembly error: {0}")]
    Reassembly(#[from] ReassemblyError),

    /// Error in the XLIFF layer
    #[error("Interchange error: {0}")]
    Interchange(#[from] InterchangeError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
