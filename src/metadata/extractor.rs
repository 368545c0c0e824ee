//! Extract embedded metadata from the leading comments of Lua source.
//!
//! A Lua entry point can describe itself in a comment placed before any code:
//!
//! ```lua
//! --[[
//! #castle
//! name: My Game
//! main: game.lua
//! ]]
//! print("hello")
//! ```
//!
//! Rules:
//! - An interpreter directive (`#!...`) on the first line is ignored.
//! - Only comments before the first code token are considered.
//! - A comment whose first line is `#castle` or `#castle/<format>` wins; the
//!   rest of that comment is the metadata and `<format>` is the format hint.
//! - Otherwise the first leading comment is taken as metadata of unknown
//!   format.
//! - No leading comments means no metadata.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

use crate::constants::METADATA_MARKER;

static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{}(?:/([A-Za-z0-9_\-]+))?$", regex::escape(METADATA_MARKER)))
        .expect("marker pattern is a valid regex")
});

/// Metadata text found in a source file, not yet parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMetadataBlock {
    /// The metadata text.
    pub text: String,
    /// Tag after `#castle/`, if the comment carried one.
    pub format_hint: Option<String>,
}

/// Find the metadata block in `source`, if any.
///
/// Returns `None` when there are no leading comments. Source that cannot be
/// tokenized is logged and treated as ending at the malformed point.
#[must_use]
pub fn extract_comment_metadata(source: &str) -> Option<RawMetadataBlock> {
    let mut comments = LeadingComments::new(source);
    let mut first_comment: Option<&str> = None;

    loop {
        match comments.next_comment() {
            Ok(Some(value)) => {
                let first_line = value.split(['\n', '\r']).next().unwrap_or_default();
                if let Some(captures) = MARKER_LINE.captures(first_line.trim()) {
                    let format_hint = captures.get(1).map(|m| m.as_str().to_string());
                    debug!("Found {} block (format: {:?})", METADATA_MARKER, format_hint);
                    return Some(RawMetadataBlock {
                        text: value[first_line.len()..].to_string(),
                        format_hint,
                    });
                }
                if first_comment.is_none_or(str::is_empty) {
                    first_comment = Some(value);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Problem parsing Lua source code: {}", e);
                break;
            }
        }
    }

    first_comment.filter(|text| !text.is_empty()).map(|text| RawMetadataBlock {
        text: text.to_string(),
        format_hint: None,
    })
}

#[derive(Debug, Error, PartialEq, Eq)]
enum LexError {
    #[error("unfinished long comment starting at byte {0}")]
    UnfinishedLongComment(usize),
}

/// Lexer over the comments that precede the first code token.
struct LeadingComments<'a> {
    src: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> LeadingComments<'a> {
    fn new(source: &'a str) -> Self {
        let mut src = source.strip_prefix('\u{feff}').unwrap_or(source);
        if src.starts_with('#') {
            src = match src.find(['\n', '\r']) {
                Some(end) => &src[end..],
                None => "",
            };
        }
        Self {
            src,
            pos: 0,
            done: false,
        }
    }

    /// The next leading comment's value, or `None` at code or end of input.
    fn next_comment(&mut self) -> Result<Option<&'a str>, LexError> {
        if self.done {
            return Ok(None);
        }

        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start_matches(is_lua_whitespace);
        self.pos += rest.len() - trimmed.len();

        let Some(after_dashes) = trimmed.strip_prefix("--") else {
            self.done = true;
            return Ok(None);
        };
        let start = self.pos;
        self.pos += 2;

        if let Some(level) = long_bracket_level(after_dashes) {
            let open_len = level + 2;
            let body = &after_dashes[open_len..];
            let close = format!("]{}]", "=".repeat(level));
            let Some(end) = body.find(&close) else {
                self.done = true;
                return Err(LexError::UnfinishedLongComment(start));
            };
            self.pos += open_len + end + close.len();
            return Ok(Some(skip_first_newline(&body[..end])));
        }

        let end = after_dashes.find(['\n', '\r']).unwrap_or(after_dashes.len());
        self.pos += end;
        Ok(Some(&after_dashes[..end]))
    }
}

fn is_lua_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{0b}' | '\u{0c}')
}

/// Level of a long bracket (`[[` is 0, `[==[` is 2) opening `text`.
fn long_bracket_level(text: &str) -> Option<usize> {
    let inner = text.strip_prefix('[')?;
    let level = inner.len() - inner.trim_start_matches('=').len();
    inner[level..].starts_with('[').then_some(level)
}

/// A newline right after a long bracket is not part of its content.
fn skip_first_newline(text: &str) -> &str {
    for eol in ["\r\n", "\n\r", "\n", "\r"] {
        if let Some(rest) = text.strip_prefix(eol) {
            return rest;
        }
    }
    text
}
