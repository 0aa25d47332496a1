// src/diff.rs
//! Maps a literal source line to its position inside a unified-diff patch.
//!
//! The hosting api anchors inline comments by position-within-patch, not by
//! absolute line number. This module is the only bridge between the line
//! number a linter reports and the position the api accepts.

use serde::Deserialize;

/// How a matched patch index is turned into an api position.
///
/// GitHub-shaped patches start with an `@@` hunk header at index 0, so the
/// raw index of an anchorable line already equals its api position.
/// `IndexPlusOne` exists for endpoints that count the header line itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionStyle {
    #[default]
    Index,
    IndexPlusOne,
}

impl PositionStyle {
    #[must_use]
    fn apply(self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        match self {
            Self::Index => index,
            Self::IndexPlusOne => index.saturating_add(1),
        }
    }
}

/// Returns the position where a comment anchored to `needle` attaches.
///
/// Scans the patch lines in order. A line beginning with `+` (an addition)
/// has that single marker stripped before comparison; context and removed
/// lines keep their prefix and therefore will not equal a bare needle.
/// Comparison is exact whole-line equality. The first match wins; `None`
/// if no line matches.
#[must_use]
pub fn resolve_position(patch: &str, needle: &str, style: PositionStyle) -> Option<u32> {
    patch
        .lines()
        .position(|line| line.strip_prefix('+').unwrap_or(line) == needle)
        .map(|index| style.apply(index))
}
