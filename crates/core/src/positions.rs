//! Positional patterns: compact multi-building assignments.
//!
//! A pattern is a string over `0-7` and `-`, at least three characters long.
//! A digit assigns that building directly; `-` reuses the building stored at
//! the same position of the player's previous pattern, or is dropped when
//! there is none.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;
use crate::types::Building;

/// Placeholder character meaning "same as last time at this position".
pub const PLACEHOLDER: char = '-';

static PATTERN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-7-]{3,}$").expect("valid regex"));

/// Whether `text` has the shape of a positional pattern.
pub fn is_pattern(text: &str) -> bool {
    PATTERN_RE.is_match(text)
}

/// A validated positional pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionPattern(String);

impl PositionPattern {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        if is_pattern(text) {
            Ok(Self(text.to_string()))
        } else {
            Err(CoreError::Validation(format!(
                "positional pattern must match [0-7-]{{3,}}, got '{text}'"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the player's previously stored sequence.
    ///
    /// The result may be shorter than the pattern when placeholders have no
    /// stored value to fall back on.
    pub fn resolve(&self, previous: &[Building]) -> Vec<Building> {
        self.0
            .chars()
            .enumerate()
            .filter_map(|(i, c)| {
                if c == PLACEHOLDER {
                    previous.get(i).copied()
                } else {
                    Building::from_digit(c)
                }
            })
            .collect()
    }
}
