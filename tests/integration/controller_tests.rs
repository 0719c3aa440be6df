/*!
 * Integration tests for the split and merge workflows
 */

use anyhow::Result;
use std::fs;
use xliffbridge::app_config::Config;
use xliffbridge::app_controller::{Controller, MergedLanguage, RowsFile};
use xliffbridge::interchange::read_document;
use crate::common;

fn config_for(languages: &[&str], output_dir: &str) -> Config {
    let mut config = Config::default();
    config.target_languages = languages.iter().map(|l| l.to_string()).collect();
    config.output_dir = output_dir.to_string();
    config
}

/// Test the controller initialization with default config
#[test]
fn test_controller_initialization_withDefaultConfig_shouldSucceed() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.config().source_language, "en-US");
    Ok(())
}

#[test]
fn test_controller_withInvalidSegmentation_shouldFail() {
    let mut config = Config::default();
    config.segmentation.min_segment_length = 0;
    assert!(Controller::with_config(config).is_err());
}

#[tokio::test]
async fn test_split_rows_shouldWriteOneDocumentPerLanguage() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let output = temp_dir.path().to_string_lossy().to_string();
    let controller = Controller::with_config(config_for(&["fr_FR", "no_NO", "en_GB"], &output))?;

    let rows: RowsFile = serde_json::from_str(&common::sample_rows_json())?;
    let summary = controller.split_rows(&rows, "catalog.xlsx", temp_dir.path()).await?;

    assert!(summary.failed.is_empty());
    let locales: Vec<&str> = summary.documents.iter().map(|d| d.locale.as_str()).collect();
    assert_eq!(locales, vec!["fr_FR", "no_NO"]);

    let norwegian = temp_dir.path().join("translation_nb_NO.xlf");
    assert!(norwegian.exists());
    let parsed = read_document(&fs::read_to_string(&norwegian)?)?;
    let document = parsed.document;
    assert_eq!(document.metadata.target_language, "nb-NO");
    assert_eq!(document.metadata.source_language, "en-US");
    assert_eq!(document.metadata.original, "catalog.xlsx");

    let sources: Vec<&str> = document.segments.iter().map(|s| s.source_text.as_str()).collect();
    assert_eq!(sources, vec!["Hello world.", "<cf>Stop</cf>. Go now.", "<cr>Warning</cr>"]);
    assert_eq!(document.segments[0].comment.as_deref(), Some("check this"));

    let french = read_document(&fs::read_to_string(temp_dir.path().join("translation_fr_FR.xlf"))?)?;
    assert_eq!(french.document.segments[0].target_text, "Bonjour le monde.");
    assert_eq!(document.segments[0].target_text, "");
    Ok(())
}

#[tokio::test]
async fn test_split_rows_withReservedMarkerInRun_shouldSkipOnlyThatRow() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(config_for(&["fr_FR"], "unused"))?;
    let rows: RowsFile = serde_json::from_str(
        r#"{ "rows": [
            { "row_number": 1, "source": "Good row." },
            { "row_number": 2, "source": [ { "text": "literal <cf> in text", "bold": true } ] }
        ] }"#,
    )?;

    let summary = controller.split_rows(&rows, "x.xlsx", temp_dir.path()).await?;

    assert!(summary.failed.is_empty());
    assert_eq!(summary.documents.len(), 1);
    assert_eq!(summary.documents[0].stats.skipped_rows, 1);
    assert_eq!(summary.rejected_rows.len(), 1);
    assert_eq!(summary.rejected_rows[0].0, 2);
    assert!(summary.rejected_rows[0].1.contains("reserved tag marker"));

    let parsed = read_document(&fs::read_to_string(temp_dir.path().join("translation_fr_FR.xlf"))?)?;
    let sources: Vec<&str> = parsed.document.segments.iter().map(|s| s.source_text.as_str()).collect();
    assert_eq!(sources, vec!["Good row."]);
    Ok(())
}

#[tokio::test]
async fn test_split_file_shouldCreateTimestampedRunFolder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "rows.json", &common::sample_rows_json())?;
    let output_root = temp_dir.path().join("out");
    let controller =
        Controller::with_config(config_for(&["de_DE"], &output_root.to_string_lossy()))?;

    let summary = controller.split_file(&input).await?;

    assert!(summary.output_folder.starts_with(&output_root));
    let folder_name = summary.output_folder.file_name().unwrap().to_string_lossy().to_string();
    assert!(folder_name.starts_with("rows_"));
    assert!(summary.output_folder.join("translation_de_DE.xlf").exists());
    Ok(())
}

#[tokio::test]
async fn test_split_thenMerge_shouldRestoreCells() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(config_for(&["fr_FR"], "unused"))?;
    let rows: RowsFile = serde_json::from_str(&common::sample_rows_json())?;
    controller.split_rows(&rows, "catalog.xlsx", temp_dir.path()).await?;

    let merged_dir = temp_dir.path().join("merged");
    let summary = controller.merge_folder(temp_dir.path(), &merged_dir)?;
    assert!(summary.failed.is_empty());

    let output = summary.outputs.get("fr-FR").and_then(|p| p.first()).expect("French output");
    let merged: MergedLanguage = serde_json::from_str(&fs::read_to_string(output)?)?;
    assert_eq!(merged.source_file, "catalog.xlsx");
    assert_eq!(merged.rows[&1].text, "Bonjour le monde.");
    assert_eq!(merged.rows[&2].text, "");
    Ok(())
}

#[test]
fn test_merge_folder_withBrokenDocument_shouldSkipItAndMergeOthers() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(
        dir,
        "translation_nb_NO.xlf",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xliff version="1.2" xmlns="urn:oasis:names:tc:xliff:document:1.2">
  <file original="catalog.xlsx" datatype="plaintext" source-language="en-US" target-language="nb-NO">
    <body>
      <trans-unit id="_msg5_1"><source>world.</source><target>verden.</target></trans-unit>
      <trans-unit id="_msg5_0"><source>Hello</source><target>Hei</target></trans-unit>
      <trans-unit id="_msg6_0"><source>Stop</source><target>&lt;cf&gt;Stopp&lt;/cf&gt;</target></trans-unit>
      <trans-unit id="bad"><source>x</source><target>y</target></trans-unit>
    </body>
  </file>
</xliff>"#,
    )?;
    common::create_test_file(dir, "translation_de_DE.xlf", "<xliff><file></xliff>")?;

    let controller = Controller::new_for_test()?;
    let summary = controller.merge_folder(dir, dir)?;

    assert_eq!(summary.failed.len(), 1);
    assert!(summary.failed[0].0.ends_with("translation_de_DE.xlf"));

    let output = summary.outputs.get("nb-NO").and_then(|p| p.first()).expect("Norwegian output");
    assert!(output.ends_with("translation_nb_NO.json"));

    let merged: MergedLanguage = serde_json::from_str(&fs::read_to_string(output)?)?;
    assert_eq!(merged.rows[&5].text, "Hei verden.");
    assert!(merged.rows[&5].runs.is_none());
    assert_eq!(merged.rows[&6].text, "Stopp");
    assert_eq!(merged.rows[&6].runs.as_ref().map(|r| r.len()), Some(1));
    assert_eq!(merged.skipped, vec!["Invalid segment ID format: bad".to_string()]);
    Ok(())
}

#[test]
fn test_merge_file_withoutHeaderLanguage_shouldUseFileName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "translation_no_NO.xlf",
        r#"<xliff version="1.2"><file original="c.xlsx"><body>
<trans-unit id="_msg1_0"><source>Yes</source><target>Ja</target></trans-unit>
</body></file></xliff>"#,
    )?;

    let merged = Controller::new_for_test()?.merge_file(&path)?;
    assert_eq!(merged.target_language, "nb-NO");
    assert_eq!(merged.rows[&1].text, "Ja");
    Ok(())
}

#[test]
fn test_merge_file_withHeaderDisagreeingWithFileName_shouldUseFileName() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "translation_de_DE.xlf",
        r#"<xliff version="1.2"><file original="c.xlsx" source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="_msg1_0"><source>Yes</source><target>Ja</target></trans-unit>
</body></file></xliff>"#,
    )?;

    let merged = Controller::new_for_test()?.merge_file(&path)?;
    assert_eq!(merged.target_language, "de-DE");
    Ok(())
}

#[test]
fn test_merge_folder_withSameLanguageTwice_shouldKeepBothOutputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let document = |target: &str| {
        format!(
            r#"<xliff version="1.2"><file original="c.xlsx" source-language="en-US" target-language="fr-FR"><body>
<trans-unit id="_msg1_0"><source>Yes</source><target>{}</target></trans-unit>
</body></file></xliff>"#,
            target
        )
    };
    common::create_test_file(temp_dir.path(), "a/translation_fr_FR.xlf", &document("Oui"))?;
    common::create_test_file(temp_dir.path(), "b/translation_fr_FR.xlf", &document("Ouais"))?;
    let merged_dir = temp_dir.path().join("merged");

    let summary = Controller::new_for_test()?.merge_folder(temp_dir.path(), &merged_dir)?;

    let outputs = &summary.outputs["fr-FR"];
    assert_eq!(outputs.len(), 2);
    assert!(outputs[0].ends_with("translation_fr_FR.json"));
    assert!(outputs[1].ends_with("translation_fr_FR_2.json"));

    let mut texts = Vec::new();
    for output in outputs {
        let merged: MergedLanguage = serde_json::from_str(&fs::read_to_string(output)?)?;
        texts.push(merged.rows[&1].text.clone());
    }
    texts.sort();
    assert_eq!(texts, vec!["Ouais", "Oui"]);
    Ok(())
}

#[test]
fn test_merge_folder_withNoDocuments_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;
    assert!(controller.merge_folder(temp_dir.path(), temp_dir.path()).is_err());
    Ok(())
}
