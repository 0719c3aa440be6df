/*!
 * Tokenizer for tagged text.
 *
 * Splits a tagged string into literal text and tag markers. Both the decoder
 * and the segmenter work on this token stream, so the marker grammar lives
 * in one place.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

use super::model::Style;

/// Matches any of the six markers; `cfr` must come before `cf`.
static MARKER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)(cfr|cf|cr)>").expect("Invalid tag marker regex"));

/// One token of tagged text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Literal text between markers
    Text(&'a str),
    /// Opening marker
    Open(Style),
    /// Closing marker
    Close(Style),
}

/// A token together with its byte range in the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned<'a> {
    pub token: Token<'a>,
    pub range: Range<usize>,
}

/// Tokenize tagged text, keeping empty literal chunks out of the stream.
pub fn tokenize(text: &str) -> Vec<Spanned<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for cap in MARKER_REGEX.captures_iter(text) {
        let Some(whole) = cap.get(0) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(Spanned {
                token: Token::Text(&text[last..whole.start()]),
                range: last..whole.start(),
            });
        }

        let closing = !cap[1].is_empty();
        let Some(style) = Style::from_tag_name(&cap[2]) else {
            continue;
        };
        tokens.push(Spanned {
            token: if closing { Token::Close(style) } else { Token::Open(style) },
            range: whole.range(),
        });
        last = whole.end();
    }

    if last < text.len() {
        tokens.push(Spanned {
            token: Token::Text(&text[last..]),
            range: last..text.len(),
        });
    }

    tokens
}

/// Returns true if the text contains any opening marker.
pub fn has_tags(text: &str) -> bool {
    Style::ALL.iter().any(|style| text.contains(style.open_marker()))
}

/// Returns the first tag marker found in `text`, if any.
pub fn find_marker(text: &str) -> Option<&str> {
    MARKER_REGEX.find(text).map(|m| m.as_str())
}

/// Byte ranges of the literal text enclosed by well-formed tag spans.
///
/// A span runs from the end of its opening marker to the start of its
/// closing marker. An unclosed span extends to the end of the text.
pub fn tagged_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open_at: Option<usize> = None;

    for spanned in tokenize(text) {
        match spanned.token {
            Token::Open(_) => {
                if open_at.is_none() {
                    open_at = Some(spanned.range.end);
                }
            }
            Token::Close(_) => {
                if let Some(start) = open_at.take() {
                    ranges.push(start..spanned.range.start);
                }
            }
            Token::Text(_) => {}
        }
    }

    if let Some(start) = open_at {
        ranges.push(start..text.len());
    }

    ranges
}

/// Byte ranges occupied by the markers themselves.
pub fn marker_ranges(text: &str) -> Vec<Range<usize>> {
    MARKER_REGEX.find_iter(text).map(|m| m.range()).collect()
}
