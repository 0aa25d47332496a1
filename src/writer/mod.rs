// src/writer/mod.rs
//! Aggregation strategies for decoded findings.
//!
//! Two interchangeable writers sit behind [`ReviewWriter`]: `inline`
//! posts one anchored comment per finding as it streams in, `summary`
//! buffers everything and maintains a single aggregated comment.

mod inline;
mod summary;

pub use inline::InlineWriter;
pub use summary::SummaryWriter;

use crate::error::Result;
use crate::host::PullRequestHost;
use crate::types::{ChangedFile, Finding};

/// Strategy selected at construction; no dispatch beyond this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterKind {
    Inline,
    Summary,
}

pub trait ReviewWriter {
    /// Consumes one decoded finding. Side effects depend on the strategy.
    fn handle(&mut self, finding: Finding) -> Result<()>;

    /// Final side effect after the whole finding stream has been seen.
    fn finish(&mut self) -> Result<()>;
}

/// Builds the chosen writer over `host`.
pub fn make_writer<'a, H: PullRequestHost>(
    kind: WriterKind,
    host: &'a H,
    files: &[ChangedFile],
) -> Box<dyn ReviewWriter + 'a> {
    match kind {
        WriterKind::Inline => Box::new(InlineWriter::new(host)),
        WriterKind::Summary => Box::new(SummaryWriter::new(host, files)),
    }
}
