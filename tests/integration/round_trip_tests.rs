/*!
 * Build -> XLIFF -> merge round trips
 */

use anyhow::Result;
use xliffbridge::codec::{FormattedRun, encode};
use xliffbridge::interchange::{Assembler, SourceRow, read_document, write_document};
use xliffbridge::reassembler::{CellValue, merge, merge_parsed};
use xliffbridge::segmenter::SegmentationPolicy;
use crate::common;

/// Existing targets survive the trip through XLIFF unchanged
#[test]
fn test_roundTrip_withExistingTargets_shouldRestoreEachRow() -> Result<()> {
    common::init_logging();
    let rows = common::sample_rows();
    let assembled = Assembler::new(SegmentationPolicy::default(), true).build(&rows, common::metadata("nb-NO"))?;

    let parsed = read_document(&write_document(&assembled.document)?)?;
    let report = merge_parsed(&parsed);

    for row in rows.iter().filter(|r| r.source_text.as_deref().is_some_and(|s| !s.trim().is_empty())) {
        let merged = report.row(row.row_number).expect("row should be merged");
        let expected = row.target_text.clone().unwrap_or_default();
        match merged {
            CellValue::Plain(text) => assert_eq!(text, &expected),
            CellValue::Rich { tagged, error, .. } => {
                assert_eq!(tagged, &expected);
                assert!(error.is_none());
            }
        }
    }
    assert!(report.row(4).is_none());
    Ok(())
}

/// A translator that copies sources and returns units in reverse order
#[test]
fn test_roundTrip_withReorderedTranslatedUnits_shouldRebuildCells() -> Result<()> {
    let rows = common::sample_rows();
    let assembled = Assembler::new(SegmentationPolicy::default(), true).build(&rows, common::metadata("fr-FR"))?;
    assert_eq!(assembled.document.len(), 5);

    let mut returned = assembled.document.clone();
    for segment in &mut returned.segments {
        segment.target_text = segment.source_text.clone();
    }
    returned.segments.reverse();

    let parsed = read_document(&write_document(&returned)?)?;
    let texts = merge(&parsed.document).texts();

    assert_eq!(texts[&1], "Hello world.");
    assert_eq!(texts[&2], "Stop. Go now.");
    assert_eq!(
        texts[&3],
        "The first sentence is long enough. The second one follows it. And a third closes the cell."
    );
    Ok(())
}

/// Formatting encoded from runs comes back as the same runs
#[test]
fn test_roundTrip_withFormattedRuns_shouldRestoreFormatting() -> Result<()> {
    let runs = vec![
        FormattedRun::plain("Press "),
        FormattedRun::bold("Start"),
        FormattedRun::plain(" and wait."),
    ];
    let tagged = encode(&runs)?;
    let rows = vec![SourceRow::new(8, tagged.clone()).with_target(tagged)];
    let assembled = Assembler::new(SegmentationPolicy::default(), false).build(&rows, common::metadata("de-DE"))?;

    let parsed = read_document(&write_document(&assembled.document)?)?;
    let report = merge(&parsed.document);

    assert_eq!(report.row(8).and_then(|v| v.runs()), Some(runs.as_slice()));
    Ok(())
}

/// Line breaks and double spaces between sentences survive splitting
#[test]
fn test_roundTrip_withSplitTargetOnLineBreaks_shouldKeepSeparators() -> Result<()> {
    let target = "Den første setningen er lang nok.\nDen andre følger etter.  Og en tredje avslutter cellen.";
    let rows = vec![SourceRow::new(
        3,
        "The first sentence is long enough.\nThe second one follows it.  And a third closes the cell.",
    )
    .with_target(target)];
    let assembled = Assembler::new(SegmentationPolicy::default(), true).build(&rows, common::metadata("nb-NO"))?;
    assert_eq!(assembled.document.len(), 3);

    let parsed = read_document(&write_document(&assembled.document)?)?;
    let report = merge_parsed(&parsed);

    assert_eq!(report.row(3), Some(&CellValue::Plain(target.to_string())));
    Ok(())
}
