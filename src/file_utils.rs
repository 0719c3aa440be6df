use anyhow::{Result, Context};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::language_utils::{DOCUMENT_FILE_EXTENSION, DOCUMENT_FILE_PREFIX};

// @module: File and directory utilities

/// Number of input stem characters kept in output folder names
const OUTPUT_STEM_CHARS: usize = 10;

/// Extension of vendor-specific XLIFF variants that are never merged
const IGNORED_EXTENSION: &str = "sdlxliff";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Name of the run folder for an input file
    // @params: input_file, timestamp (YYYYmmdd_HHMMSS)
    pub fn run_folder_name<P: AsRef<Path>>(input_file: P, timestamp: &str) -> String {
        let stem = input_file
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let short: String = stem.chars().take(OUTPUT_STEM_CHARS).collect();
        format!("{}_{}", short, timestamp)
    }

    /// Create `<output_root>/<stem prefix>_<YYYYmmdd_HHMMSS>/` for an input file
    pub fn create_run_folder<P1: AsRef<Path>, P2: AsRef<Path>>(
        output_root: P1,
        input_file: P2,
    ) -> Result<PathBuf> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let folder = output_root
            .as_ref()
            .join(Self::run_folder_name(input_file, &timestamp));
        Self::ensure_dir(&folder)?;
        Ok(folder)
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.trim_start_matches('.');

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Find returned interchange documents (`translation_*.xlf`) in a folder tree
    pub fn find_documents<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let documents = Self::find_files(dir, DOCUMENT_FILE_EXTENSION)?
            .into_iter()
            .filter(|path| Self::is_document_file(path))
            .collect();
        Ok(documents)
    }

    /// Whether a path names an interchange document this tool produced
    pub fn is_document_file<P: AsRef<Path>>(path: P) -> bool {
        let path = path.as_ref();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };
        let ignored = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(IGNORED_EXTENSION));

        !ignored
            && name.starts_with(DOCUMENT_FILE_PREFIX)
            && name.ends_with(&format!(".{}", DOCUMENT_FILE_EXTENSION))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
