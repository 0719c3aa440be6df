/*!
 * Rebuilds cell values from a returned interchange document.
 *
 * Units are grouped by row and ordered by segment index; arrival order in
 * the document never matters. Targets that still carry inline emphasis
 * markup are decoded back into formatted runs.
 */

use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::codec::{self, FormattedRun};
use crate::codec::tokens::find_marker;
use crate::errors::{FormatError, ReassemblyError};
use crate::interchange::{InterchangeDocument, ParsedDocument};

/// Characters that glue to the previous segment without a space.
pub const CLOSING_PUNCTUATION: &[char] = &['.', '!', '?', '。', '！', '？'];

/// Reconstructed value of one target cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Text without emphasis markup
    Plain(String),

    /// Text that carried markup, with the decoded runs
    Rich {
        /// Joined target text, markup included
        tagged: String,
        runs: Vec<FormattedRun>,
        /// Set when the markup was malformed and partly kept as literal text
        error: Option<FormatError>,
    },
}

impl CellValue {
    fn from_joined(text: String) -> Self {
        if find_marker(&text).is_none() {
            return Self::Plain(text);
        }
        let decoded = codec::decode(&text);
        Self::Rich {
            tagged: text,
            runs: decoded.runs,
            error: decoded.error,
        }
    }

    /// Text of the cell without markup.
    pub fn text(&self) -> String {
        match self {
            Self::Plain(text) => text.clone(),
            Self::Rich { runs, .. } => codec::plain_text(runs),
        }
    }

    pub fn runs(&self) -> Option<&[FormattedRun]> {
        match self {
            Self::Plain(_) => None,
            Self::Rich { runs, .. } => Some(runs),
        }
    }

    pub fn is_rich(&self) -> bool {
        matches!(self, Self::Rich { .. })
    }
}

/// Outcome of merging one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Reconstructed value per row number
    pub rows: BTreeMap<u32, CellValue>,

    /// Units that were left out, with the reason
    pub skipped: Vec<ReassemblyError>,

    /// Units that contributed to a row
    pub units_merged: usize,
}

impl MergeReport {
    pub fn row(&self, row_number: u32) -> Option<&CellValue> {
        self.rows.get(&row_number)
    }

    /// Plain text per row, markup removed.
    pub fn texts(&self) -> BTreeMap<u32, String> {
        self.rows.iter().map(|(row, value)| (*row, value.text())).collect()
    }
}

/// Join segment texts in order, gluing closing punctuation to the text
/// before it. A segment that already ends in whitespace carries its own
/// separator.
pub fn join_segments<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut joined = String::new();
    for part in parts {
        let glue = joined.is_empty()
            || joined.ends_with(char::is_whitespace)
            || part.is_empty()
            || part.starts_with(CLOSING_PUNCTUATION);
        if !glue {
            joined.push(' ');
        }
        joined.push_str(part);
    }
    joined
}

/// Merge the units of a document into one value per row.
///
/// Duplicate `(row, index)` pairs keep their first occurrence and are
/// reported in [`MergeReport::skipped`].
pub fn merge(document: &InterchangeDocument) -> MergeReport {
    let mut report = MergeReport::default();
    let mut by_row: BTreeMap<u32, BTreeMap<u32, &str>> = BTreeMap::new();

    for segment in &document.segments {
        let slots = by_row.entry(segment.id.row).or_default();
        match slots.entry(segment.id.index) {
            Entry::Vacant(slot) => {
                slot.insert(segment.target_text.as_str());
                report.units_merged += 1;
            }
            Entry::Occupied(_) => {
                let error = ReassemblyError::DuplicateSegment {
                    row: segment.id.row,
                    index: segment.id.index,
                };
                warn!("{}", error);
                report.skipped.push(error);
            }
        }
    }

    for (row, slots) in by_row {
        let joined = join_segments(slots.into_values());
        let value = CellValue::from_joined(joined);
        if let CellValue::Rich { error: Some(error), .. } = &value {
            warn!("Row {}: {}", row, error);
        }
        debug!("Row {}: merged {} chars", row, value.text().chars().count());
        report.rows.insert(row, value);
    }

    info!(
        "Merged {} unit(s) into {} row(s) for {}, {} skipped",
        report.units_merged,
        report.rows.len(),
        document.metadata.target_language,
        report.skipped.len()
    );

    report
}

/// Merge a parsed document, carrying over the units the reader rejected.
pub fn merge_parsed(parsed: &ParsedDocument) -> MergeReport {
    let mut report = merge(&parsed.document);
    let mut skipped = parsed.rejected.clone();
    skipped.append(&mut report.skipped);
    report.skipped = skipped;
    report
}
