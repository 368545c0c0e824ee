//! Map `x-castle-*` response headers to metadata keys.
//!
//! `x-castle-short-name` becomes `shortName`. The conversion is a small state
//! machine over the characters after the prefix:
//!
//! | char | effect |
//! |------|--------|
//! | `-`  | next character is upper-cased |
//! | `.`  | dropped |
//! | `/`  | dropped, clears the pending upper-case |
//! | other | appended (upper-cased if pending), clears the pending upper-case |

use crate::constants::METADATA_HEADER_PREFIX;

/// Metadata key for `header_name`, or `None` if it lacks the prefix or
/// converts to an empty key.
#[must_use]
pub fn metadata_key_for_header(header_name: &str) -> Option<String> {
    let prefix_len = METADATA_HEADER_PREFIX.len();
    if header_name.len() < prefix_len
        || !header_name.is_char_boundary(prefix_len)
        || !header_name[..prefix_len].eq_ignore_ascii_case(METADATA_HEADER_PREFIX)
    {
        return None;
    }
    let key = camel_case_key(&header_name[prefix_len..]);
    (!key.is_empty()).then_some(key)
}

/// Convert a dash-delimited header segment to a camel-case key.
#[must_use]
pub fn camel_case_key(segment: &str) -> String {
    let mut key = String::with_capacity(segment.len());
    let mut capitalize_next = false;

    for c in segment.chars() {
        match c {
            '-' => capitalize_next = true,
            '.' => {}
            '/' => capitalize_next = false,
            _ => {
                if capitalize_next {
                    key.extend(c.to_uppercase());
                } else {
                    key.push(c);
                }
                capitalize_next = false;
            }
        }
    }

    key
}
