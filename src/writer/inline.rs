// src/writer/inline.rs
//! Posts one diff-anchored comment per finding, as findings stream in.

use crate::error::Result;
use crate::host::PullRequestHost;
use crate::types::Finding;
use crate::writer::ReviewWriter;

pub struct InlineWriter<'a, H: PullRequestHost> {
    host: &'a H,
}

impl<'a, H: PullRequestHost> InlineWriter<'a, H> {
    #[must_use]
    pub fn new(host: &'a H) -> Self {
        Self { host }
    }
}

impl<H: PullRequestHost> ReviewWriter for InlineWriter<'_, H> {
    /// Re-running over the same pull request must not duplicate comments:
    /// a finding whose message already exists at the same anchor is
    /// skipped. Findings whose line resolves in no commit's patch are
    /// dropped (`create_review_comment` returns `None`), never posted
    /// without an anchor.
    fn handle(&mut self, finding: Finding) -> Result<()> {
        let existing = self
            .host
            .review_comments(&finding.source, &finding.path)?;
        if existing.iter().any(|c| c.body == finding.message) {
            return Ok(());
        }
        self.host
            .create_review_comment(&finding.source, &finding.path, &finding.message)?;
        Ok(())
    }

    // Side effects happen per finding; there is nothing to flush.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
