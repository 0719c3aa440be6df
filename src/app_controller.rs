use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::app_config::Config;
use crate::codec::{self, FormattedRun};
use crate::errors::AssemblyError;
use crate::file_utils::FileManager;
use crate::interchange::{self, Assembler, AssemblyStats, DocumentMetadata, SourceRow};
use crate::language_utils;
use crate::reassembler::{self, CellValue};
use crate::segmenter::Segmenter;

// @module: Application controller for splitting and merging workbooks

/// Source cell of a rows file: already tagged text or raw formatted runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceCell {
    Tagged(String),
    Runs(Vec<FormattedRun>),
}

impl SourceCell {
    /// Tagged text of the cell
    pub fn to_tagged(&self, row_number: u32) -> Result<String, AssemblyError> {
        match self {
            Self::Tagged(text) => Ok(text.clone()),
            Self::Runs(runs) => codec::encode(runs).map_err(|source| AssemblyError::Format {
                row: row_number,
                source,
            }),
        }
    }
}

/// One row of a rows file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowRecord {
    pub row_number: u32,

    #[serde(default)]
    pub source: Option<SourceCell>,

    /// Existing translations keyed by locale code
    #[serde(default)]
    pub targets: BTreeMap<String, String>,

    #[serde(default)]
    pub comment: Option<String>,
}

impl RowRecord {
    /// Existing translation for a locale, matched on its language tag
    pub fn target_for(&self, code: &str) -> Option<&str> {
        let tag = language_utils::language_tag(code);
        self.targets
            .iter()
            .find(|(key, _)| language_utils::language_tag(key) == tag)
            .map(|(_, value)| value.as_str())
    }
}

/// Workbook contents handed over by the spreadsheet reader
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsFile {
    /// Name of the originating workbook
    #[serde(default)]
    pub original: Option<String>,

    #[serde(default)]
    pub rows: Vec<RowRecord>,
}

/// A generated document
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    /// Locale code as configured (e.g. "no_NO")
    pub locale: String,
    /// Language tag written in the header (e.g. "nb-NO")
    pub language_tag: String,
    pub path: PathBuf,
    pub stats: AssemblyStats,
}

/// Result of splitting one rows file
#[derive(Debug, Clone, Default)]
pub struct SplitSummary {
    pub output_folder: PathBuf,
    pub documents: Vec<DocumentSummary>,
    /// Locales whose document could not be produced, with the reason
    pub failed: Vec<(String, String)>,
    /// Rows left out of every document because their source could not be tagged
    pub rejected_rows: Vec<(u32, String)>,
}

/// Reconstructed cell as written to merge output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedCell {
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runs: Option<Vec<FormattedRun>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_error: Option<String>,
}

impl From<&CellValue> for MergedCell {
    fn from(value: &CellValue) -> Self {
        match value {
            CellValue::Plain(text) => Self {
                text: text.clone(),
                runs: None,
                format_error: None,
            },
            CellValue::Rich { runs, error, .. } => Self {
                text: codec::plain_text(runs),
                runs: Some(runs.clone()),
                format_error: error.as_ref().map(|e| e.to_string()),
            },
        }
    }
}

/// Merge output for one returned document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLanguage {
    pub target_language: String,
    pub source_file: String,
    pub rows: BTreeMap<u32, MergedCell>,
    pub skipped: Vec<String>,
}

/// Result of merging a folder of returned documents
#[derive(Debug, Clone, Default)]
pub struct MergeSummary {
    /// Written merge files per language tag, in discovery order
    pub outputs: BTreeMap<String, Vec<PathBuf>>,
    /// Documents that could not be merged, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

/// A row with its source already tagged, shared by every language task
#[derive(Debug, Clone)]
struct PreparedRow {
    row_number: u32,
    source: Option<String>,
    record: RowRecord,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,

    segmenter: Segmenter,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let segmenter = config.segmenter()?;
        Ok(Self { config, segmenter })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Split a rows file into one document per target language under a new
    /// timestamped run folder
    pub async fn split_file(&self, input_file: &Path) -> Result<SplitSummary> {
        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let content = FileManager::read_to_string(input_file)?;
        let rows_file: RowsFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse rows file: {:?}", input_file))?;

        let original = rows_file.original.clone().unwrap_or_else(|| {
            input_file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default()
        });

        let output_folder = FileManager::create_run_folder(&self.config.output_dir, input_file)?;
        info!("Writing documents to {:?}", output_folder);

        self.split_rows(&rows_file, &original, &output_folder).await
    }

    /// Build and write the documents for already loaded rows
    pub async fn split_rows(
        &self,
        rows_file: &RowsFile,
        original: &str,
        output_folder: &Path,
    ) -> Result<SplitSummary> {
        let start_time = std::time::Instant::now();

        let mut summary = SplitSummary {
            output_folder: output_folder.to_path_buf(),
            ..SplitSummary::default()
        };

        let mut prepared = Vec::with_capacity(rows_file.rows.len());
        for record in &rows_file.rows {
            let tagged = record
                .source
                .as_ref()
                .map(|cell| cell.to_tagged(record.row_number))
                .transpose();
            let source = match tagged {
                Ok(source) => source,
                Err(e) => {
                    let reason = format!("{:#}", anyhow::Error::from(e));
                    warn!("Skipping row: {}", reason);
                    summary.rejected_rows.push((record.row_number, reason));
                    None
                }
            };
            prepared.push(PreparedRow {
                row_number: record.row_number,
                source,
                record: record.clone(),
            });
        }
        let prepared = Arc::new(prepared);

        for code in &self.config.target_languages {
            if self.config.is_source_variant(code) {
                debug!("Skipping {}: same language as the source", code);
            }
        }

        let languages = self.config.effective_target_languages();
        let progress = progress_bar(languages.len(), "languages");

        let mut tasks = JoinSet::new();
        for code in languages {
            let rows = Arc::clone(&prepared);
            let segmenter = self.segmenter.clone();
            let source_language = language_utils::language_tag(&self.config.source_language);
            let original = original.to_string();
            let folder = output_folder.to_path_buf();

            tasks.spawn_blocking(move || {
                let result =
                    build_language(&rows, &code, &source_language, &original, segmenter, &folder);
                (code, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            progress.inc(1);
            match joined {
                Ok((_, Ok(document))) => summary.documents.push(document),
                Ok((code, Err(e))) => {
                    error!("Failed to build document for {}: {:#}", code, e);
                    summary.failed.push((code, format!("{:#}", e)));
                }
                Err(e) => {
                    error!("Language task failed: {}", e);
                    summary.failed.push(("unknown".to_string(), e.to_string()));
                }
            }
        }

        progress.finish_and_clear();
        summary.documents.sort_by(|a, b| a.locale.cmp(&b.locale));

        if summary.documents.is_empty() && !summary.failed.is_empty() {
            return Err(anyhow!(
                "No document could be produced ({} language(s) failed)",
                summary.failed.len()
            ));
        }

        info!(
            "Created {} document(s) in {:.2}s, {} row(s) rejected",
            summary.documents.len(),
            start_time.elapsed().as_secs_f64(),
            summary.rejected_rows.len()
        );

        Ok(summary)
    }

    /// Merge every returned document found under `input_dir`, writing one
    /// JSON file per language into `output_dir`
    pub fn merge_folder(&self, input_dir: &Path, output_dir: &Path) -> Result<MergeSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents = FileManager::find_documents(input_dir)?;
        if documents.is_empty() {
            return Err(anyhow!("No translation documents found in directory: {:?}", input_dir));
        }

        let progress = progress_bar(documents.len(), "files");
        let mut summary = MergeSummary::default();
        for path in documents {
            progress.inc(1);
            match self.merge_file(&path) {
                Ok(merged) => {
                    let written = summary.outputs.entry(merged.target_language.clone()).or_default();
                    let stem = language_utils::document_file_stem(&merged.target_language);
                    let file_name = if written.is_empty() {
                        format!("{}.json", stem)
                    } else {
                        warn!(
                            "{:?} is another document for {}, writing it separately",
                            path, merged.target_language
                        );
                        format!("{}_{}.json", stem, written.len() + 1)
                    };
                    let output_path = output_dir.join(file_name);
                    let json = serde_json::to_string_pretty(&merged)
                        .context("Failed to serialize merge output")?;
                    FileManager::write_to_file(&output_path, &json)?;
                    written.push(output_path);
                }
                Err(e) => {
                    warn!("Skipping {:?}: {:#}", path, e);
                    summary.failed.push((path, format!("{:#}", e)));
                }
            }
        }

        progress.finish_and_clear();
        info!(
            "Merged {} document(s), {} failed",
            summary.outputs.values().map(Vec::len).sum::<usize>(),
            summary.failed.len()
        );

        Ok(summary)
    }

    /// Merge one returned document
    pub fn merge_file(&self, path: &Path) -> Result<MergedLanguage> {
        let content = FileManager::read_to_string(path)?;
        let parsed = interchange::read_document(&content)
            .with_context(|| format!("Failed to read document: {:?}", path))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let from_name = language_utils::language_from_file_name(&file_name);
        let header = &parsed.document.metadata.target_language;

        let target_language = match from_name {
            Some(tag) => {
                if !header.is_empty() && language_utils::language_tag(header) != tag {
                    warn!(
                        "{}: header says {} but file name says {}, using the file name",
                        file_name, header, tag
                    );
                }
                tag
            }
            None if !header.is_empty() => language_utils::language_tag(header),
            None => return Err(anyhow!("Cannot determine target language of {:?}", path)),
        };

        let language_name = language_utils::get_language_name(&target_language)
            .unwrap_or_else(|_| target_language.clone());
        info!("Merging {} ({})", language_name, target_language);

        let report = reassembler::merge_parsed(&parsed);

        Ok(MergedLanguage {
            target_language,
            source_file: parsed.document.metadata.original.clone(),
            rows: report
                .rows
                .iter()
                .map(|(row, value)| (*row, MergedCell::from(value)))
                .collect(),
            skipped: report.skipped.iter().map(|e| e.to_string()).collect(),
        })
    }
}

fn progress_bar(len: usize, unit: &str) -> ProgressBar {
    let progress = ProgressBar::new(len as u64);
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
        unit
    );
    let style = ProgressStyle::default_bar()
        .template(&template)
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style.progress_chars("█▓▒░"));
    progress
}

fn build_language(
    rows: &[PreparedRow],
    code: &str,
    source_language: &str,
    original: &str,
    segmenter: Segmenter,
    folder: &Path,
) -> Result<DocumentSummary> {
    let tag = language_utils::language_tag(code);
    let metadata = DocumentMetadata {
        source_language: source_language.to_string(),
        target_language: tag.clone(),
        original: original.to_string(),
    };

    let source_rows: Vec<SourceRow> = rows
        .iter()
        .map(|row| SourceRow {
            row_number: row.row_number,
            source_text: row.source.clone(),
            target_text: row.record.target_for(code).map(str::to_string),
            comment: row.record.comment.clone(),
        })
        .collect();

    let assembled = Assembler::with_segmenter(segmenter).build(&source_rows, metadata)?;
    let xml = interchange::write_document(&assembled.document)?;

    let path = folder.join(language_utils::document_file_name(code));
    FileManager::write_to_file(&path, &xml)?;

    let language_name = language_utils::get_language_name(code).unwrap_or_else(|_| tag.clone());
    info!(
        "Created {:?} for {} with {} segment(s)",
        path.file_name().unwrap_or_default(),
        language_name,
        assembled.stats.total_segments
    );
    for row in &assembled.stats.degraded_rows {
        warn!("Row {}: {} target could not be aligned sentence by sentence", row, tag);
    }

    Ok(DocumentSummary {
        locale: code.to_string(),
        language_tag: tag,
        path,
        stats: assembled.stats,
    })
}
