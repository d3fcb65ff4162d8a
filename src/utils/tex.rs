//! Low-level TeX lexing helpers
//!
//! Just enough lexing to find commands, braced arguments and top-level
//! separators while honoring escapes (`\&`, `\%`, `\{`) and `%` comments.
//! All returned offsets are byte offsets relative to the input slice.

use crate::core::document::Span;
use crate::data::constants::{CELL_SEPARATOR, ROW_TERMINATOR};

/// Separator to split on at brace depth 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `\\`
    Row,
    /// `&`
    Cell,
}

impl Separator {
    /// Length of the separator token if it starts at byte `i`
    fn match_at(self, bytes: &[u8], i: usize) -> Option<usize> {
        let mut buf = [0u8; 4];
        let token = match self {
            Separator::Row => ROW_TERMINATOR.as_bytes(),
            Separator::Cell => CELL_SEPARATOR.encode_utf8(&mut buf).as_bytes(),
        };
        bytes[i..].starts_with(token).then_some(token.len())
    }
}

/// Byte length of the escaped character following a backslash at `i`
fn escaped_len(text: &str, i: usize) -> usize {
    text[i + 1..].chars().next().map(char::len_utf8).unwrap_or(0)
}

/// Offset of the end of the comment starting at `i` (the newline is kept)
fn comment_end(text: &str, i: usize) -> usize {
    text[i..].find('\n').map(|n| i + n).unwrap_or(text.len())
}

/// Text before the first unescaped `%`
pub fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 1 + escaped_len(line, i),
            b'%' => return &line[..i],
            _ => i += 1,
        }
    }
    line
}

/// Replace comments by nothing and trim, for content comparisons
pub fn normalized_content(text: &str) -> String {
    text.lines()
        .map(strip_comment)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// All control words outside comments, as `(offset of backslash, name)`
///
/// Control symbols (`\\`, `\&`, ...) are skipped. A trailing `*` is part of
/// the name so that starred environments and commands are distinguished.
pub fn control_words(text: &str) -> Vec<(usize, &str)> {
    let bytes = text.as_bytes();
    let mut words = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                let start = i;
                let mut end = i + 1;
                while end < bytes.len() && bytes[end].is_ascii_alphabetic() {
                    end += 1;
                }
                if end == i + 1 {
                    i += 1 + escaped_len(text, i);
                    continue;
                }
                if end < bytes.len() && bytes[end] == b'*' {
                    end += 1;
                }
                words.push((start, &text[start + 1..end]));
                i = end;
            }
            b'%' => i = comment_end(text, i),
            _ => i += 1,
        }
    }
    words
}

/// Find the brace closing the one at `open`
///
/// Returns the offset of the closing `}`. Escaped braces and comments are
/// ignored.
pub fn find_matching_brace(text: &str, open: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 1 + escaped_len(text, i);
                continue;
            }
            b'%' => {
                i = comment_end(text, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Braced argument starting at or after `pos` (leading whitespace skipped)
///
/// Returns the span of the argument content (without braces) and the offset
/// just past the closing brace.
pub fn braced_arg(text: &str, pos: usize) -> Option<(Span, usize)> {
    let skipped = text[pos..].len() - text[pos..].trim_start().len();
    let open = pos + skipped;
    let close = find_matching_brace(text, open)?;
    Some((Span::new(open + 1, close), close + 1))
}

/// Split `text` on a separator found at brace depth 0
///
/// The returned spans cover the text between separators; separators
/// themselves are excluded. Comments never contain separators.
pub fn split_top_level(text: &str, separator: Separator) -> Vec<Span> {
    let bytes = text.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        if depth == 0 {
            if let Some(len) = separator.match_at(bytes, i) {
                parts.push(Span::new(start, i));
                i += len;
                start = i;
                continue;
            }
        }
        match bytes[i] {
            b'\\' => {
                i += 1 + escaped_len(text, i);
                continue;
            }
            b'%' => {
                i = comment_end(text, i);
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        i += 1;
    }
    parts.push(Span::new(start, text.len()));
    parts
}
