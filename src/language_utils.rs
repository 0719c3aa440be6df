//! Language utilities for locale code handling
//!
//! Spreadsheet columns use underscore locale codes (`fr_FR`, `no_NO`), the
//! XLIFF header uses hyphenated IETF tags (`fr-FR`, `nb-NO`) and document
//! file names use the underscore form of the tag (`translation_nb_NO.xlf`).

use anyhow::{Result, anyhow};
use isolang::Language;

/// Prefix of every interchange document file name
pub const DOCUMENT_FILE_PREFIX: &str = "translation_";

/// Extension of interchange documents
pub const DOCUMENT_FILE_EXTENSION: &str = "xlf";

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Primary language subtag kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// Split a locale code into its primary subtag and optional region.
fn split_locale(code: &str) -> (String, Option<String>) {
    let code = code.trim();
    let mut parts = code.splitn(2, &['_', '-'][..]);
    let primary = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .filter(|r| !r.is_empty())
        .map(|r| r.to_uppercase());
    (primary, region)
}

/// Convert a locale code to an IETF-style language tag.
///
/// `fr_FR` becomes `fr-FR`. The legacy Norwegian code `no_NO` maps to the
/// Bokmål tag `nb-NO`.
pub fn language_tag(code: &str) -> String {
    let (primary, region) = split_locale(code);
    let tag = match region {
        Some(region) => format!("{}-{}", primary, region),
        None => primary,
    };
    if tag.eq_ignore_ascii_case("no-no") {
        return "nb-NO".to_string();
    }
    tag
}

/// Underscore form of a language tag, as used in file and folder names.
pub fn locale_code(tag: &str) -> String {
    language_tag(tag).replace('-', "_")
}

/// File stem of the interchange document for a target language.
pub fn document_file_stem(code: &str) -> String {
    format!("{}{}", DOCUMENT_FILE_PREFIX, locale_code(code))
}

/// Full file name of the interchange document for a target language.
pub fn document_file_name(code: &str) -> String {
    format!("{}.{}", document_file_stem(code), DOCUMENT_FILE_EXTENSION)
}

/// Recover the target language tag from a document file name.
///
/// Inverse of [`document_file_name`]. Returns `None` for names that do not
/// follow the `translation_<locale>.xlf` pattern.
pub fn language_from_file_name(file_name: &str) -> Option<String> {
    let stem = file_name.strip_suffix(&format!(".{}", DOCUMENT_FILE_EXTENSION))?;
    let locale = stem.strip_prefix(DOCUMENT_FILE_PREFIX)?;
    let (primary, _) = split_locale(locale);
    if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(language_tag(locale))
}

/// Validate the primary subtag of a locale code against ISO 639
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let (primary, _) = split_locale(code);

    match primary.len() {
        2 if Language::from_639_1(&primary).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&primary).is_some() => Ok(LanguageCodeType::Part2T),
        3 if BIBLIOGRAPHIC_CODES.iter().any(|(b, _)| *b == primary) => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize the primary subtag of a locale code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (primary, _) = split_locale(code);

    if primary.len() == 2 {
        if let Some(lang) = Language::from_639_1(&primary) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if primary.len() == 3 {
        if Language::from_639_3(&primary).is_some() {
            return Ok(primary);
        }
        if let Some((_, terminological)) = BIBLIOGRAPHIC_CODES.iter().find(|(b, _)| *b == primary) {
            return Ok(terminological.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Check if two locale codes name the same language, ignoring region
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name for a locale code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(&language_tag(code))?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}
