/*!
 * Rich-text runs -> tagged text.
 */

use log::debug;

use crate::errors::FormatError;

use super::model::{FormattedRun, Style};
use super::tokens::find_marker;

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    /// Insert a single space between a tag and an adjacent word so the two
    /// do not fuse visually in translation tools. Disabling this makes
    /// `decode(encode(runs))` reproduce the text byte for byte even when a
    /// formatting change falls inside a word.
    pub separate_adjacent_tags: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            separate_adjacent_tags: true,
        }
    }
}

/// Intermediate representation before spacing repair.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece<'a> {
    Text(&'a str),
    Open(Style),
    Close(Style),
}

/// Encode runs with the default options.
pub fn encode(runs: &[FormattedRun]) -> Result<String, FormatError> {
    encode_with(runs, EncodeOptions::default())
}

/// Encode runs into tagged text.
///
/// If every non-empty run is red the whole cell becomes one `<cr>` span.
/// Otherwise each non-whitespace word of a formatted run is wrapped on its
/// own and whitespace is copied through untagged.
pub fn encode_with(runs: &[FormattedRun], options: EncodeOptions) -> Result<String, FormatError> {
    for (run_index, run) in runs.iter().enumerate() {
        if let Some(marker) = find_marker(&run.text) {
            return Err(FormatError::ReservedMarker {
                run_index,
                marker: marker.to_string(),
            });
        }
    }

    // Empty runs may carry flags but have nothing to tag
    let runs: Vec<&FormattedRun> = runs.iter().filter(|run| !run.text.is_empty()).collect();
    if runs.is_empty() {
        return Ok(String::new());
    }

    if runs.iter().all(|run| run.red) {
        let full_text: String = runs.iter().map(|run| run.text.as_str()).collect();
        debug!("Entire cell is red, wrapping as a single span");
        return Ok(wrap_whole(&full_text, Style::Red));
    }

    let mut pieces = Vec::new();
    for run in runs {
        match run.style() {
            None => pieces.push(Piece::Text(&run.text)),
            Some(style) => {
                for (word, is_space) in split_keep_whitespace(&run.text) {
                    if is_space {
                        pieces.push(Piece::Text(word));
                    } else {
                        pieces.push(Piece::Open(style));
                        pieces.push(Piece::Text(word));
                        pieces.push(Piece::Close(style));
                    }
                }
            }
        }
    }

    Ok(render(&pieces, options))
}

/// Encode a cell whose formatting applies to the whole value rather than to
/// individual runs. Red wins over bold, as with run-level all-red cells.
pub fn encode_cell(text: &str, bold: bool, red: bool) -> Result<String, FormatError> {
    if let Some(marker) = find_marker(text) {
        return Err(FormatError::ReservedMarker {
            run_index: 0,
            marker: marker.to_string(),
        });
    }

    let encoded = if red {
        wrap_whole(text, Style::Red)
    } else if bold {
        wrap_whole(text, Style::Bold)
    } else {
        text.to_string()
    };
    Ok(encoded)
}

fn wrap_whole(text: &str, style: Style) -> String {
    if text.trim().is_empty() {
        return text.to_string();
    }
    format!("{}{}{}", style.open_marker(), text, style.close_marker())
}

/// Characters after which (or before which) a tag needs no separating space.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?' | ')')
}

fn render(pieces: &[Piece<'_>], options: EncodeOptions) -> String {
    let mut out = String::new();

    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Text(text) => out.push_str(text),
            Piece::Open(style) => {
                if options.separate_adjacent_tags {
                    if let Some(prev) = out.chars().next_back() {
                        if !is_separator(prev) {
                            out.push(' ');
                        }
                    }
                }
                out.push_str(style.open_marker());
            }
            Piece::Close(style) => {
                out.push_str(style.close_marker());
                if options.separate_adjacent_tags {
                    let next = pieces[i + 1..].iter().find_map(|p| match p {
                        Piece::Text(t) if t.is_empty() => None,
                        Piece::Text(t) => t.chars().next(),
                        Piece::Open(_) | Piece::Close(_) => Some('<'),
                    });
                    if next.is_some_and(|c| !is_separator(c)) {
                        out.push(' ');
                    }
                }
            }
        }
    }

    out
}

/// Split text into alternating word / whitespace chunks, keeping both.
fn split_keep_whitespace(text: &str) -> Vec<(&str, bool)> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (idx, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        match current {
            Some(kind) if kind == is_space => {}
            Some(kind) => {
                chunks.push((&text[start..idx], kind));
                start = idx;
                current = Some(is_space);
            }
            None => current = Some(is_space),
        }
    }

    if let Some(kind) = current {
        chunks.push((&text[start..], kind));
    }

    chunks
}
