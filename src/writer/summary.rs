// src/writer/summary.rs
//! Collects findings for the whole run and maintains one aggregated
//! summary comment, edited in place on repeated runs.

use crate::candidates::build_candidates;
use crate::error::Result;
use crate::host::PullRequestHost;
use crate::types::{ChangedFile, Finding};
use crate::writer::ReviewWriter;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;

/// First line of the summary comment; also the key used to find and
/// replace the previous run's comment.
pub const COMMENT_HEADER: &str = "Linter Errors:";

const NO_ERRORS: &str = "No Errors! Congrats!";

const USAGE: &str = "To check before pushing, run on your build environment: \
```pylint -r -n --rcfile $RCFILE $FILE```";

/// A finding retained for aggregate rendering, enriched with a deep link.
#[derive(Debug, Clone)]
struct Violation {
    line: u32,
    url: String,
    source: String,
    message: String,
}

pub struct SummaryWriter<'a, H: PullRequestHost> {
    host: &'a H,
    /// Line texts added by the change; findings outside this set are on
    /// untouched code and stay silent.
    candidates: HashSet<String>,
    /// Path -> blob url at the pull request's version, for deep links.
    file_urls: HashMap<String, String>,
    /// Path -> violations in arrival order. Sorted path iteration keeps
    /// the rendered body stable across runs.
    violations: BTreeMap<String, Vec<Violation>>,
}

impl<'a, H: PullRequestHost> SummaryWriter<'a, H> {
    #[must_use]
    pub fn new(host: &'a H, files: &[ChangedFile]) -> Self {
        let candidates = build_candidates(files);
        let file_urls = files
            .iter()
            .map(|f| (f.filename.clone(), f.blob_url.clone()))
            .collect();
        Self {
            host,
            candidates,
            file_urls,
            violations: BTreeMap::new(),
        }
    }

    fn total_violations(&self) -> usize {
        self.violations.values().map(Vec::len).sum()
    }

    fn render(&self, head_sha: &str) -> String {
        let mut body = String::new();
        body.push_str(COMMENT_HEADER);
        body.push('\n');

        if self.violations.is_empty() {
            body.push_str(NO_ERRORS);
            body.push('\n');
        }

        for (path, violations) in &self.violations {
            let _ = writeln!(body, "In {path}:");

            // Group by line; the BTreeMap sorts lines numerically, so
            // line 2 renders before line 11. Messages keep arrival order.
            let mut by_line: BTreeMap<u32, Vec<&Violation>> = BTreeMap::new();
            for v in violations {
                by_line.entry(v.line).or_default().push(v);
            }

            for (line, group) in &by_line {
                let first = group[0];
                // Trailing space inside the fence so an empty source line
                // does not collapse the markdown to ``````.
                let _ = writeln!(body, "[{line}:]({}) ```{} ```", first.url, first.source);
                for v in group {
                    let _ = writeln!(body, " - [ ] {}", v.message);
                }
                body.push('\n');
            }
        }

        if !self.violations.is_empty() && !self.candidates.is_empty() {
            let count = self.total_violations();
            #[allow(clippy::cast_precision_loss)]
            let ratio = count as f64 / self.candidates.len() as f64;
            let _ = writeln!(
                body,
                "Having __{count}__ violations with __{ratio:.2}__ violations/line"
            );
        }

        body.push_str(USAGE);
        body.push('\n');
        let _ = writeln!(body, "Last commit is {head_sha}");
        body
    }
}

impl<H: PullRequestHost> ReviewWriter for SummaryWriter<'_, H> {
    /// Records the finding unless it falls outside the candidate set.
    fn handle(&mut self, finding: Finding) -> Result<()> {
        if !self.candidates.contains(&finding.source) {
            return Ok(());
        }
        // A path the pull request never touched has no url to link to;
        // such findings cannot come from this change.
        let Some(base) = self.file_urls.get(&finding.path) else {
            return Ok(());
        };
        let url = format!("{base}#L{}", finding.line);
        self.violations
            .entry(finding.path)
            .or_default()
            .push(Violation {
                line: finding.line,
                url,
                source: finding.source,
                message: finding.message,
            });
        Ok(())
    }

    /// Renders the Markdown body and replaces (or creates) the summary
    /// comment. Matching by header prefix keeps the comment unique per
    /// pull request.
    fn finish(&mut self) -> Result<()> {
        let head_sha = self.host.head_sha()?;
        let body = self.render(&head_sha);
        self.host.create_or_update_comment(COMMENT_HEADER, &body)
    }
}
