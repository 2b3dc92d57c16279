//! Front matter extraction.
//!
//! A document opens with a `---` line, continues with `key: value` lines and
//! closes the header with another `---` line. Everything after the closing
//! line is the body.

use crate::error::ParseError;
use crate::normalise_newlines;
use crate::types::Metadata;

const DELIMITER: &str = "---";

/// Split a raw document into its metadata and its body.
///
/// The body is returned trimmed. A document without both delimiters is a
/// format error; a present but empty header yields empty metadata.
pub fn parse_front_matter(input: &str) -> Result<(Metadata, String), ParseError> {
    let normalised = normalise_newlines(input);
    let lines: Vec<&str> = normalised.split('\n').collect();

    if lines.first().is_none_or(|first| first.trim() != DELIMITER) {
        return Err(ParseError::format(
            "document does not open with a `---` line",
        ));
    }

    let end_idx = lines
        .iter()
        .skip(1)
        .position(|line| line.trim() == DELIMITER)
        .map(|pos| pos + 1)
        .ok_or_else(|| ParseError::format("front matter opened with `---` but never closed"))?;

    let metadata = lines[1..end_idx]
        .iter()
        .filter_map(|line| parse_header_line(line))
        .collect::<Metadata>();

    let body = lines[end_idx + 1..].join("\n");

    Ok((metadata, body.trim().to_string()))
}

/// Split one header line on its first `:`.
///
/// Lines without a colon or with an empty key are not fields and yield
/// `None`.
fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, strip_quotes(value.trim())))
}

/// Remove one layer of matching single or double quotes.
fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
