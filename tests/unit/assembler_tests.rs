/*!
 * Tests for interchange document assembly
 */

use anyhow::Result;
use xliffbridge::errors::AssemblyError;
use xliffbridge::interchange::{self, Assembler, SegmentId, SourceRow, TargetState};
use xliffbridge::segmenter::SegmentationPolicy;
use crate::common;

#[test]
fn test_build_withShortCommentedRow_shouldEmitSingleUnitWithNote() -> Result<()> {
    let rows = vec![SourceRow::new(1, "Hello world.").with_comment("check this")];
    let assembled = interchange::build(&rows, SegmentationPolicy::default(), true, common::metadata("fr-FR"))?;

    let document = &assembled.document;
    assert_eq!(document.len(), 1);
    let segment = &document.segments[0];
    assert_eq!(segment.id.to_string(), "_msg1_0");
    assert_eq!(segment.source_text, "Hello world.");
    assert_eq!(segment.target_text, "");
    assert_eq!(segment.state, TargetState::NeedsReviewTranslation);
    assert_eq!(segment.comment.as_deref(), Some("check this"));
    Ok(())
}

#[test]
fn test_build_withDuplicateRowNumbers_shouldFail() {
    let rows = vec![SourceRow::new(7, "One"), SourceRow::new(7, "Two")];
    let result = Assembler::new(SegmentationPolicy::default(), false).build(&rows, common::metadata("de-DE"));
    assert!(matches!(result, Err(AssemblyError::DuplicateRow(7))));
}

#[test]
fn test_build_withBlankSource_shouldSkipRowAndCountIt() -> Result<()> {
    let assembled = Assembler::new(SegmentationPolicy::default(), false)
        .build(&common::sample_rows(), common::metadata("nb-NO"))?;

    assert!(assembled.document.segments.iter().all(|s| s.row_number() != 4));
    assert_eq!(assembled.stats.skipped_rows, 1);
    Ok(())
}

#[test]
fn test_build_withSplittingEnabled_shouldNumberSegmentsFromZero() -> Result<()> {
    let assembled = Assembler::new(SegmentationPolicy::default(), true)
        .build(&common::sample_rows(), common::metadata("nb-NO"))?;

    let row3: Vec<_> = assembled.document.segments.iter().filter(|s| s.row_number() == 3).collect();
    assert_eq!(row3.len(), 3);
    for (i, segment) in row3.iter().enumerate() {
        assert_eq!(segment.id, SegmentId::new(3, i as u32));
    }
    assert_eq!(row3[1].target_text, "Den andre følger etter.");

    let stats = &assembled.stats;
    assert_eq!(stats.total_segments, 5);
    assert_eq!(stats.split_candidates, 1);
    assert_eq!(stats.successful_splits, 1);
    assert!(stats.degraded_rows.is_empty());
    Ok(())
}

#[test]
fn test_build_withSplittingDisabled_shouldKeepOneUnitPerRow() -> Result<()> {
    let assembled = Assembler::new(SegmentationPolicy::default(), false)
        .build(&common::sample_rows(), common::metadata("nb-NO"))?;

    assert_eq!(assembled.document.len(), 3);
    assert!(assembled.document.segments.iter().all(|s| s.segment_index() == 0));
    assert_eq!(assembled.stats.split_candidates, 0);
    Ok(())
}

#[test]
fn test_build_withCommentOnSplitRow_shouldAttachNoteToFirstSegmentOnly() -> Result<()> {
    let rows = vec![SourceRow::new(
        9,
        "This opening sentence is quite long. The closing sentence is also long enough to split.",
    )
    .with_comment("  keep the brand name  ")];
    let assembled = Assembler::new(SegmentationPolicy::default(), true).build(&rows, common::metadata("it-IT"))?;

    let segments = &assembled.document.segments;
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].comment.as_deref(), Some("keep the brand name"));
    assert_eq!(segments[1].comment, None);
    assert_eq!(assembled.stats.segments_with_comments, 1);
    Ok(())
}

#[test]
fn test_build_withMisalignedTarget_shouldRecordDegradedRow() -> Result<()> {
    let rows = vec![SourceRow::new(
        12,
        "This opening sentence is quite long. The closing sentence is also long enough to split.",
    )
    .with_target("Una sola frase senza alcuna interruzione possibile")];
    let assembled = Assembler::new(SegmentationPolicy::default(), true).build(&rows, common::metadata("it-IT"))?;

    assert_eq!(assembled.stats.degraded_rows, vec![12]);
    assert_eq!(
        assembled.document.segments[0].target_text,
        "Una sola frase senza alcuna interruzione possibile"
    );
    assert_eq!(assembled.document.segments[1].target_text, "");
    Ok(())
}

#[test]
fn test_build_withLongComment_shouldRecordTruncatedPreview() -> Result<()> {
    let comment = "c".repeat(80);
    let rows = vec![SourceRow::new(2, "Short source").with_comment(comment)];
    let assembled = Assembler::new(SegmentationPolicy::default(), false).build(&rows, common::metadata("es-ES"))?;

    let detail = &assembled.stats.comment_details[0];
    assert_eq!(detail.row_number, 2);
    assert_eq!(detail.source_preview, "Short source");
    assert_eq!(detail.comment_preview, format!("{}...", "c".repeat(50)));
    Ok(())
}

#[test]
fn test_build_sameRows_shouldProduceSameDocumentForEachCall() -> Result<()> {
    let assembler = Assembler::new(SegmentationPolicy::default(), true);
    let first = assembler.build(&common::sample_rows(), common::metadata("fr-FR"))?;
    let second = assembler.build(&common::sample_rows(), common::metadata("fr-FR"))?;
    assert_eq!(first.document, second.document);
    Ok(())
}
