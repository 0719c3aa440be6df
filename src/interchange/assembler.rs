/*!
 * Builds one interchange document from spreadsheet rows.
 */

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::errors::AssemblyError;
use crate::segmenter::{SegmentationPolicy, Segmenter};

use super::model::{DocumentMetadata, InterchangeDocument, Segment, SegmentId};

/// Longest preview kept in comment details.
const PREVIEW_CHARS: usize = 50;

/// One spreadsheet row as handed over by the workbook reader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    /// Row number, unique within a document
    pub row_number: u32,

    /// Tagged source text; rows without one are skipped
    #[serde(default)]
    pub source_text: Option<String>,

    /// Existing translation for the document's target language
    #[serde(default)]
    pub target_text: Option<String>,

    /// Reviewer comment for the row
    #[serde(default)]
    pub comment: Option<String>,
}

impl SourceRow {
    pub fn new(row_number: u32, source_text: impl Into<String>) -> Self {
        Self {
            row_number,
            source_text: Some(source_text.into()),
            target_text: None,
            comment: None,
        }
    }

    pub fn with_target(mut self, target_text: impl Into<String>) -> Self {
        self.target_text = Some(target_text.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Short description of a commented row for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentDetail {
    pub row_number: u32,
    pub source_preview: String,
    pub comment_preview: String,
}

/// Running counters for one document. Observational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Units emitted
    pub total_segments: usize,
    /// Rows whose source exceeded the unsplit threshold
    pub split_candidates: usize,
    /// Rows that produced more than one segment
    pub successful_splits: usize,
    /// Units carrying a reviewer note
    pub segments_with_comments: usize,
    /// Rows skipped for a blank source
    pub skipped_rows: usize,
    /// Rows whose target could not be aligned sentence by sentence
    pub degraded_rows: Vec<u32>,
    /// Preview of every commented row
    pub comment_details: Vec<CommentDetail>,
}

/// Document plus the statistics gathered while building it.
#[derive(Debug, Clone)]
pub struct AssembledDocument {
    pub document: InterchangeDocument,
    pub stats: AssemblyStats,
}

/// Turns rows into translation units, splitting long cells when enabled.
#[derive(Debug, Clone)]
pub struct Assembler {
    segmenter: Segmenter,
}

impl Assembler {
    /// Create an assembler for a policy and splitting switch.
    pub fn new(policy: SegmentationPolicy, splitting_enabled: bool) -> Self {
        Self {
            segmenter: Segmenter::new(policy).with_enabled(splitting_enabled),
        }
    }

    /// Create an assembler around a configured segmenter.
    pub fn with_segmenter(segmenter: Segmenter) -> Self {
        Self { segmenter }
    }

    /// Build the document for one target language.
    ///
    /// Fails only when two rows share a row number.
    pub fn build(
        &self,
        rows: &[SourceRow],
        metadata: DocumentMetadata,
    ) -> Result<AssembledDocument, AssemblyError> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in rows {
            if !seen.insert(row.row_number) {
                return Err(AssemblyError::DuplicateRow(row.row_number));
            }
        }

        let mut document = InterchangeDocument::new(metadata);
        let mut stats = AssemblyStats::default();
        let policy = self.segmenter.policy();

        for row in rows {
            let source = row.source_text.as_deref().unwrap_or_default();
            if source.trim().is_empty() {
                debug!("Row {}: blank source, skipped", row.row_number);
                stats.skipped_rows += 1;
                continue;
            }

            let target = row.target_text.as_deref().unwrap_or_default();
            let comment = row
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty());

            if let Some(comment) = comment {
                stats.comment_details.push(CommentDetail {
                    row_number: row.row_number,
                    source_preview: preview(source),
                    comment_preview: preview(comment),
                });
            }

            if self.segmenter.is_enabled() && policy.is_split_candidate(source) {
                stats.split_candidates += 1;
            }

            let outcome = self.segmenter.split(source, target);
            if outcome.len() > 1 {
                stats.successful_splits += 1;
                debug!("Row {}: split into {} segments", row.row_number, outcome.len());
            }
            if outcome.alignment.is_degraded() {
                stats.degraded_rows.push(row.row_number);
            }

            let pairs = outcome.source_segments.into_iter().zip(outcome.target_segments);
            for (index, (source_segment, target_segment)) in pairs.enumerate() {
                let id = SegmentId::new(row.row_number, index as u32);
                let mut segment = Segment::new(id, source_segment, target_segment);

                // Notes go on the first segment only
                if index == 0 {
                    if let Some(comment) = comment {
                        segment = segment.with_comment(comment);
                        stats.segments_with_comments += 1;
                    }
                }

                document.segments.push(segment);
                stats.total_segments += 1;
            }
        }

        info!(
            "Assembled {} segment(s) for {}: {} split candidate(s), {} split, {} with comments, {} skipped",
            stats.total_segments,
            document.metadata.target_language,
            stats.split_candidates,
            stats.successful_splits,
            stats.segments_with_comments,
            stats.skipped_rows
        );

        Ok(AssembledDocument { document, stats })
    }
}

/// Build a document in one call.
pub fn build(
    rows: &[SourceRow],
    policy: SegmentationPolicy,
    splitting_enabled: bool,
    metadata: DocumentMetadata,
) -> Result<AssembledDocument, AssemblyError> {
    Assembler::new(policy, splitting_enabled).build(rows, metadata)
}

fn preview(text: &str) -> String {
    if text.chars().count() > PREVIEW_CHARS {
        let head: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
