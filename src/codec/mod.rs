/*!
 * Tag codec: spreadsheet rich-text runs <-> inline emphasis markup.
 *
 * Three non-nesting tag pairs carry the emphasis a translator must keep:
 * - `<cf>…</cf>` bold
 * - `<cr>…</cr>` red
 * - `<cfr>…</cfr>` bold and red
 */

pub mod decode;
pub mod encode;
pub mod model;
pub mod tokens;

pub use decode::{Decoded, decode};
pub use encode::{EncodeOptions, encode, encode_cell, encode_with};
pub use model::{FormattedRun, Style, plain_text};
pub use tokens::has_tags;
