// src/findings.rs
//! Decodes the linter's stdout line protocol into findings.
//!
//! The linter is invoked with a message template that joins file path,
//! 1-based line number and message with a fixed separator. Each emitted
//! line is decoded here and pushed straight into the active writer; the
//! stream is never buffered.

use crate::config::LinterConfig;
use crate::error::{Error, Result};
use crate::types::Finding;
use crate::writer::ReviewWriter;
use std::fs;

pub struct FindingParser {
    separator: String,
    banner_prefix: String,
}

impl FindingParser {
    #[must_use]
    pub fn new(linter: &LinterConfig) -> Self {
        Self {
            separator: linter.separator.clone(),
            banner_prefix: linter.banner_prefix.clone(),
        }
    }

    /// Decodes one raw stdout line and forwards the finding to `sink`.
    ///
    /// Blank lines and reporter banner lines are ignored. Anything else
    /// must split on the separator into exactly three fields with a
    /// numeric middle; a line that does not means the separator scheme
    /// itself is broken, which aborts the run instead of skipping.
    ///
    /// # Errors
    /// Returns `Error::MalformedFinding` on a wrong field count or a
    /// non-numeric line number; propagates sink errors.
    pub fn feed(&self, raw: &str, sink: &mut dyn ReviewWriter) -> Result<()> {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(&self.banner_prefix) {
            return Ok(());
        }

        let fields: Vec<&str> = line.split(self.separator.as_str()).collect();
        let &[path, line_no, message] = fields.as_slice() else {
            return Err(self.malformed(line));
        };
        let line_no: u32 = line_no.parse().map_err(|_| self.malformed(line))?;

        sink.handle(Finding {
            path: path.to_string(),
            line: line_no,
            source: source_line(path, line_no),
            message: message.to_string(),
        })
    }

    fn malformed(&self, line: &str) -> Error {
        Error::MalformedFinding {
            line: line.to_string(),
            separator: self.separator.clone(),
        }
    }
}

/// Reads the 1-based `line` of `path` off disk, end-of-line stripped.
///
/// Reflects the file's state after the change, which is what the
/// candidate set was built from. An unreadable file or an out-of-range
/// line resolves to the empty string.
#[must_use]
pub fn source_line(path: &str, line: u32) -> String {
    let index = match (line as usize).checked_sub(1) {
        Some(i) => i,
        None => return String::new(),
    };
    fs::read_to_string(path)
        .ok()
        .and_then(|content| content.lines().nth(index).map(str::to_string))
        .unwrap_or_default()
}
