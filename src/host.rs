// src/host.rs
//! Capability interface over the hosting api.
//!
//! The review logic only ever talks to this trait; the REST client in
//! [`crate::github`] is one implementation, test fakes are another.

use crate::error::Result;
use crate::types::{ChangedFile, ReviewComment};

pub trait PullRequestHost {
    /// The pull request's changed files, with patches and blob urls.
    fn files(&self) -> Result<Vec<ChangedFile>>;

    /// Existing review comments attached to `source` within `path`.
    fn review_comments(&self, source: &str, path: &str) -> Result<Vec<ReviewComment>>;

    /// Creates a review comment anchored below the line matching `source`
    /// in `path`, against the newest commit whose patch resolves a
    /// position. Returns `None` when no commit yields an anchor; the
    /// finding is then dropped rather than posted unanchored.
    fn create_review_comment(
        &self,
        source: &str,
        path: &str,
        body: &str,
    ) -> Result<Option<ReviewComment>>;

    /// Replaces the pull-request comment whose body starts with `header`,
    /// or creates it. Guarantees at most one such comment ever exists.
    fn create_or_update_comment(&self, header: &str, body: &str) -> Result<()>;

    /// Sha of the pull request's head commit.
    fn head_sha(&self) -> Result<String>;

    /// Login of the pull request's assignee, if any.
    fn assignee_name(&self) -> Result<Option<String>>;
}
