/*!
 * Common test utilities for the xliffbridge test suite
 */

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::fs;
use anyhow::Result;
use tempfile::TempDir;
use xliffbridge::interchange::{DocumentMetadata, SourceRow};

/// Route library logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Document metadata for a target language
pub fn metadata(target_language: &str) -> DocumentMetadata {
    DocumentMetadata {
        source_language: "en-US".to_string(),
        target_language: target_language.to_string(),
        original: "catalog.xlsx".to_string(),
    }
}

/// A small workbook: short rows, a commented row, a long row and a blank row
pub fn sample_rows() -> Vec<SourceRow> {
    vec![
        SourceRow::new(1, "Hello world.").with_comment("check this"),
        SourceRow::new(2, "<cf>Stop</cf>. Go now.").with_target("<cf>Stopp</cf>. Gå nå."),
        SourceRow::new(
            3,
            "The first sentence is long enough. The second one follows it. And a third closes the cell.",
        )
        .with_target("Den første setningen er lang nok. Den andre følger etter. Og en tredje avslutter cellen."),
        SourceRow {
            row_number: 4,
            source_text: Some("   ".to_string()),
            target_text: None,
            comment: None,
        },
    ]
}

/// Rows file (JSON) as produced by the workbook reader
pub fn sample_rows_json() -> String {
    r#"{
  "original": "catalog.xlsx",
  "rows": [
    { "row_number": 1, "source": "Hello world.", "targets": { "fr_FR": "Bonjour le monde." }, "comment": "check this" },
    { "row_number": 2, "source": [ { "text": "Stop", "bold": true }, { "text": ". Go now." } ] },
    { "row_number": 3, "source": [ { "text": "Warning", "red": true } ] },
    { "row_number": 4, "source": "" }
  ]
}"#
    .to_string()
}
