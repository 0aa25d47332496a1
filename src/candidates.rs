// src/candidates.rs
//! Builds the set of line texts added by a pull request.
//!
//! Findings on lines outside this set belong to pre-existing code and are
//! suppressed. Membership is by literal line text across the whole change:
//! a finding survives if its line text was added anywhere in the pull
//! request, not just in the same file. That keeps the filter cheap at the
//! cost of some precision on duplicated lines.

use crate::types::ChangedFile;
use std::collections::HashSet;

/// Collects every added line across all patches into one set.
///
/// Only `+`-prefixed lines count; context and removed lines are skipped.
/// The single addition marker is stripped so entries compare equal to
/// on-disk line text. Files without a patch (binary, empty diff) are
/// ignored.
#[must_use]
pub fn build_candidates(files: &[ChangedFile]) -> HashSet<String> {
    let mut candidates = HashSet::new();
    for file in files {
        let Some(patch) = file.patch.as_deref() else {
            continue;
        };
        for line in patch.lines() {
            if let Some(added) = line.strip_prefix('+') {
                candidates.insert(added.to_string());
            }
        }
    }
    candidates
}
