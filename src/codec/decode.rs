/*!
 * Tagged text -> rich-text runs.
 *
 * Decoding is a small state machine over the token stream. The open state
 * is one of none, bold, red or bold+red. Malformed input (a stray or
 * mismatched closing tag, a nested opening tag, a tag left open) is a
 * defined transition into an error state: everything from the offending
 * marker onwards is kept verbatim as one unformatted run, and the error is
 * returned alongside the runs.
 */

use log::warn;

use crate::errors::FormatError;

use super::model::{FormattedRun, Style};
use super::tokens::{Token, tokenize};

/// Result of decoding: the recovered runs plus the first problem found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Runs in text order
    pub runs: Vec<FormattedRun>,

    /// Set when the input was malformed
    pub error: Option<FormatError>,
}

impl Decoded {
    /// True when the input was well formed.
    pub fn is_clean(&self) -> bool {
        self.error.is_none()
    }

    /// Strict view: fail on malformed input.
    pub fn into_result(self) -> Result<Vec<FormattedRun>, FormatError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.runs),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    Plain,
    Open {
        style: Style,
        /// Byte offset of the opening marker
        at: usize,
        /// Number of runs emitted before the span opened
        first_run: usize,
    },
}

/// Decode tagged text, recovering from malformed markup.
pub fn decode(text: &str) -> Decoded {
    let mut runs: Vec<FormattedRun> = Vec::new();
    let mut state = State::Plain;
    let mut error = None;

    for spanned in tokenize(text) {
        let offset = spanned.range.start;
        let transition = match (state, spanned.token) {
            (State::Plain, Token::Text(chunk)) => {
                runs.push(FormattedRun::plain(chunk));
                Ok(State::Plain)
            }
            (State::Open { style, .. }, Token::Text(chunk)) => {
                runs.push(FormattedRun::new(chunk, style.is_bold(), style.is_red()));
                Ok(state)
            }
            (State::Plain, Token::Open(style)) => Ok(State::Open {
                style,
                at: offset,
                first_run: runs.len(),
            }),
            (State::Open { style, .. }, Token::Close(closing)) if closing == style => {
                Ok(State::Plain)
            }
            (State::Open { style, .. }, Token::Open(inner)) => Err(FormatError::NestedTag {
                open: style.tag_name().to_string(),
                inner: inner.tag_name().to_string(),
                offset,
            }),
            (_, Token::Close(closing)) => Err(FormatError::StrayClosingTag {
                tag: closing.tag_name().to_string(),
                offset,
            }),
        };

        match transition {
            Ok(next) => state = next,
            Err(e) => {
                runs.push(FormattedRun::plain(&text[offset..]));
                error = Some(e);
                state = State::Plain;
                break;
            }
        }
    }

    if let State::Open { style, at, first_run } = state {
        runs.truncate(first_run);
        runs.push(FormattedRun::plain(&text[at..]));
        error = Some(FormatError::UnclosedTag {
            tag: style.tag_name().to_string(),
            offset: at,
        });
    }

    if let Some(e) = &error {
        warn!("Malformed tagged text, keeping remainder unformatted: {}", e);
    }

    Decoded { runs, error }
}
