use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::language_utils;
use crate::segmenter::{DEFAULT_TERMINATORS, SegmentationPolicy, Segmenter};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and deriving the immutable values handed to the pipeline.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language tag written into every document header
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target locale codes, one document per entry (e.g. "fr_FR", "no_NO")
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Long-cell segmentation settings
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Root folder for generated documents
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Settings for splitting long cells into sentence segments
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Whether long cells are split at all
    #[serde(default)]
    pub enabled: bool,

    /// Shortest segment ever emitted on its own (chars)
    #[serde(default = "default_min_segment_length")]
    pub min_segment_length: usize,

    /// Cells up to this length (chars) are never split
    #[serde(default = "default_max_unsplit_length")]
    pub max_unsplit_length: usize,

    /// Sentence-ending punctuation
    #[serde(default = "default_terminators")]
    pub terminators: String,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_segment_length: default_min_segment_length(),
            max_unsplit_length: default_max_unsplit_length(),
            terminators: default_terminators(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en-US".to_string()
}

fn default_target_languages() -> Vec<String> {
    ["fr_FR", "de_DE", "es_ES", "it_IT", "no_NO"]
        .iter()
        .map(|code| code.to_string())
        .collect()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_min_segment_length() -> usize {
    5
}

fn default_max_unsplit_length() -> usize {
    70
}

fn default_terminators() -> String {
    DEFAULT_TERMINATORS.to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        language_utils::validate_language_code(&self.source_language)
            .context("Invalid source language")?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for code in &self.target_languages {
            language_utils::validate_language_code(code)
                .with_context(|| format!("Invalid target language: {}", code))?;
        }

        // Validate segmentation thresholds
        self.segmentation_policy()?;
        if self.segmentation.terminators.is_empty() {
            return Err(anyhow!("Segmentation terminators must not be empty"));
        }

        if self.output_dir.trim().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        Ok(())
    }

    /// Segmentation thresholds as a validated policy
    pub fn segmentation_policy(&self) -> Result<SegmentationPolicy> {
        Ok(SegmentationPolicy::new(
            self.segmentation.min_segment_length,
            self.segmentation.max_unsplit_length,
        )?)
    }

    /// Segmenter configured from this configuration
    pub fn segmenter(&self) -> Result<Segmenter> {
        Ok(Segmenter::new(self.segmentation_policy()?)
            .with_terminators(&self.segmentation.terminators)
            .with_enabled(self.segmentation.enabled))
    }

    /// Whether a target locale is the source language itself.
    ///
    /// English variant columns (`en_GB`, `en_US`) are treated as source
    /// columns whenever the source is English.
    pub fn is_source_variant(&self, code: &str) -> bool {
        let source = language_utils::language_tag(&self.source_language);
        let target = language_utils::language_tag(code);
        if source.eq_ignore_ascii_case(&target) {
            return true;
        }
        let source_is_english = source.split('-').next() == Some("en");
        source_is_english && (target == "en-GB" || target == "en-US")
    }

    /// Target locales that get a document, in configuration order,
    /// without source variants and duplicates
    pub fn effective_target_languages(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for code in &self.target_languages {
            if self.is_source_variant(code) {
                continue;
            }
            let tag = language_utils::language_tag(code);
            if !seen.iter().any(|c: &String| language_utils::language_tag(c) == tag) {
                seen.push(code.clone());
            }
        }
        seen
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            segmentation: SegmentationConfig::default(),
            output_dir: default_output_dir(),
            log_level: LogLevel::default(),
        }
    }
}
