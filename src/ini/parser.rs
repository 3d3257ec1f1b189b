//! Line classification and name validation for the INI format
//!
//! - `[name]` opens a section
//! - `key = value` sets a key (split at the first `=`)
//! - lines starting with `;` or `#` are comments

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StoreError;

/// Characters that start a comment line
pub const COMMENT_MARKERS: &[char] = &[';', '#'];

/// Separator between key and value
pub const KEY_VALUE_SEPARATOR: char = '=';

/// `[name]` with no nested brackets
static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([^\[\]]*)\]$").expect("valid section header regex"));

/// One classified line of an INI file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty or whitespace only
    Blank,
    /// Starts with a comment marker
    Comment,
    /// `[name]`, name trimmed
    Header(&'a str),
    /// `key = value`, both trimmed
    Entry { key: &'a str, value: &'a str },
    /// Anything else
    Malformed,
}

/// Classify a single line
pub fn classify(line: &str) -> Line<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Line::Blank;
    }
    if line.starts_with(COMMENT_MARKERS) {
        return Line::Comment;
    }

    if let Some(caps) = SECTION_HEADER.captures(line) {
        let name = caps.get(1).map_or("", |m| m.as_str()).trim();
        return if name.is_empty() {
            Line::Malformed
        } else {
            Line::Header(name)
        };
    }

    match line.split_once(KEY_VALUE_SEPARATOR) {
        Some((key, value)) => {
            let key = key.trim();
            if key.is_empty() {
                Line::Malformed
            } else {
                Line::Entry {
                    key,
                    value: value.trim(),
                }
            }
        }
        None => Line::Malformed,
    }
}

fn invalid(name: &str, reason: &str) -> StoreError {
    StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn check_common(name: &str) -> Result<(), StoreError> {
    if name.is_empty() {
        return Err(invalid(name, "name is empty"));
    }
    if name.contains(['\n', '\r']) {
        return Err(invalid(name, "name contains a line break"));
    }
    if name.trim() != name {
        return Err(invalid(name, "name has leading or trailing whitespace"));
    }
    Ok(())
}

/// Validate a section name so that `[name]` reads back as the same section
pub fn validate_section_name(name: &str) -> Result<(), StoreError> {
    check_common(name)?;
    if name.contains(['[', ']']) {
        return Err(invalid(name, "section names cannot contain brackets"));
    }
    Ok(())
}

/// Validate a key name so that `key = value` reads back as the same key
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    check_common(key)?;
    if key.contains(KEY_VALUE_SEPARATOR) {
        return Err(invalid(key, "key names cannot contain '='"));
    }
    if key.contains(['[', ']']) {
        return Err(invalid(key, "key names cannot contain brackets"));
    }
    if key.starts_with(COMMENT_MARKERS) {
        return Err(invalid(key, "key names cannot start with a comment marker"));
    }
    Ok(())
}

/// Validate a value; values are single-line
pub fn validate_value(key: &str, value: &str) -> Result<(), StoreError> {
    if value.contains(['\n', '\r']) {
        return Err(invalid(key, "value contains a line break"));
    }
    Ok(())
}
