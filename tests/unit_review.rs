// tests/unit_review.rs
//! Writer and orchestration behavior against an in-memory host.

use std::cell::RefCell;

use pullnote_core::config::Config;
use pullnote_core::diff::{resolve_position, PositionStyle};
use pullnote_core::error::Result;
use pullnote_core::host::PullRequestHost;
use pullnote_core::runner::{run_review, ReviewOptions, ReviewOutcome};
use pullnote_core::types::{ChangedFile, FileStatus, Finding, IssueComment, ReviewComment};
use pullnote_core::writer::{InlineWriter, ReviewWriter, SummaryWriter, WriterKind};

/// In-memory stand-in for the hosting api. Mimics the anchor rule: a
/// review comment is only created when some patch resolves a position.
#[derive(Default)]
struct FakeHost {
    files: Vec<ChangedFile>,
    head: String,
    assignee: Option<String>,
    review_comments: RefCell<Vec<ReviewComment>>,
    issue_comments: RefCell<Vec<IssueComment>>,
    next_id: RefCell<u64>,
    created_issue_comments: RefCell<usize>,
    edited_issue_comments: RefCell<usize>,
}

impl FakeHost {
    fn with_files(files: Vec<ChangedFile>) -> Self {
        Self {
            files,
            head: "abc123".to_string(),
            ..Self::default()
        }
    }

    fn seed_review_comment(&self, path: &str, diff_hunk: &str, body: &str) {
        self.review_comments.borrow_mut().push(ReviewComment {
            path: path.to_string(),
            position: Some(0),
            body: body.to_string(),
            diff_hunk: diff_hunk.to_string(),
        });
    }
}

impl PullRequestHost for FakeHost {
    fn files(&self) -> Result<Vec<ChangedFile>> {
        Ok(self.files.clone())
    }

    fn review_comments(&self, source: &str, path: &str) -> Result<Vec<ReviewComment>> {
        Ok(self
            .review_comments
            .borrow()
            .iter()
            .filter(|c| {
                c.path == path
                    && resolve_position(&c.diff_hunk, source, PositionStyle::Index).is_some()
            })
            .cloned()
            .collect())
    }

    fn create_review_comment(
        &self,
        source: &str,
        path: &str,
        body: &str,
    ) -> Result<Option<ReviewComment>> {
        let Some(file) = self.files.iter().find(|f| f.filename == path) else {
            return Ok(None);
        };
        let Some(patch) = file.patch.as_deref() else {
            return Ok(None);
        };
        let Some(position) = resolve_position(patch, source, PositionStyle::Index) else {
            return Ok(None);
        };
        let comment = ReviewComment {
            path: path.to_string(),
            position: Some(position),
            body: body.to_string(),
            diff_hunk: patch.to_string(),
        };
        self.review_comments.borrow_mut().push(comment.clone());
        Ok(Some(comment))
    }

    fn create_or_update_comment(&self, header: &str, body: &str) -> Result<()> {
        let mut comments = self.issue_comments.borrow_mut();
        if let Some(previous) = comments.iter_mut().find(|c| c.body.starts_with(header)) {
            previous.body = body.to_string();
            *self.edited_issue_comments.borrow_mut() += 1;
        } else {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            comments.push(IssueComment {
                id: *next_id,
                body: body.to_string(),
            });
            *self.created_issue_comments.borrow_mut() += 1;
        }
        Ok(())
    }

    fn head_sha(&self) -> Result<String> {
        Ok(self.head.clone())
    }

    fn assignee_name(&self) -> Result<Option<String>> {
        Ok(self.assignee.clone())
    }
}

fn changed_file(name: &str, patch: &str) -> ChangedFile {
    ChangedFile {
        filename: name.to_string(),
        status: FileStatus::Modified,
        patch: Some(patch.to_string()),
        blob_url: format!("https://example.test/blob/{name}"),
    }
}

fn finding(path: &str, line: u32, source: &str, message: &str) -> Finding {
    Finding {
        path: path.to_string(),
        line,
        source: source.to_string(),
        message: message.to_string(),
    }
}

// --- Summary writer ---

#[test]
fn test_summary_posts_one_comment_and_edits_on_rerun() {
    let files = vec![changed_file("app.py", "@@ -0,0 +1,1 @@\n+alpha()")];
    let host = FakeHost::with_files(files.clone());

    for _ in 0..2 {
        let mut writer = SummaryWriter::new(&host, &files);
        writer
            .handle(finding("app.py", 2, "alpha()", "bad name"))
            .unwrap();
        writer.finish().unwrap();
    }

    assert_eq!(host.issue_comments.borrow().len(), 1);
    assert_eq!(*host.created_issue_comments.borrow(), 1);
    assert_eq!(*host.edited_issue_comments.borrow(), 1);
}

#[test]
fn test_summary_reports_no_errors_when_clean() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files.clone());

    let mut writer = SummaryWriter::new(&host, &files);
    writer.finish().unwrap();

    let comments = host.issue_comments.borrow();
    assert!(comments[0].body.starts_with("Linter Errors:"));
    assert!(comments[0].body.contains("No Errors! Congrats!"));
    assert!(comments[0].body.contains("Last commit is abc123"));
}

#[test]
fn test_summary_drops_findings_outside_the_change() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files.clone());

    let mut writer = SummaryWriter::new(&host, &files);
    writer
        .handle(finding("app.py", 7, "untouched()", "on old code"))
        .unwrap();
    writer.finish().unwrap();

    let body = &host.issue_comments.borrow()[0].body;
    assert!(body.contains("No Errors! Congrats!"));
    assert!(!body.contains("on old code"));
}

#[test]
fn test_summary_sorts_lines_numerically() {
    let files = vec![changed_file("app.py", "+alpha()\n+beta()")];
    let host = FakeHost::with_files(files.clone());

    let mut writer = SummaryWriter::new(&host, &files);
    writer
        .handle(finding("app.py", 11, "beta()", "late"))
        .unwrap();
    writer
        .handle(finding("app.py", 2, "alpha()", "early"))
        .unwrap();
    writer.finish().unwrap();

    let body = host.issue_comments.borrow()[0].body.clone();
    let early = body.find("[2:]").expect("line 2 rendered");
    let late = body.find("[11:]").expect("line 11 rendered");
    assert!(early < late, "2 must sort before 11:\n{body}");
}

#[test]
fn test_summary_groups_messages_per_line_in_arrival_order() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files.clone());

    let mut writer = SummaryWriter::new(&host, &files);
    writer
        .handle(finding("app.py", 7, "alpha()", "first message"))
        .unwrap();
    writer
        .handle(finding("app.py", 7, "alpha()", "second message"))
        .unwrap();
    writer.finish().unwrap();

    let body = host.issue_comments.borrow()[0].body.clone();
    assert_eq!(body.matches("[7:]").count(), 1, "one code block per line");
    let first = body.find(" - [ ] first message").unwrap();
    let second = body.find(" - [ ] second message").unwrap();
    assert!(first < second);
}

#[test]
fn test_summary_renders_link_code_and_ratio() {
    let files = vec![changed_file("app.py", "+alpha()\n+beta()")];
    let host = FakeHost::with_files(files.clone());

    let mut writer = SummaryWriter::new(&host, &files);
    writer
        .handle(finding("app.py", 2, "alpha()", "bad alpha"))
        .unwrap();
    writer
        .handle(finding("app.py", 3, "beta()", "bad beta"))
        .unwrap();
    writer.finish().unwrap();

    let body = host.issue_comments.borrow()[0].body.clone();
    assert!(body.contains("In app.py:"));
    assert!(body.contains("[2:](https://example.test/blob/app.py#L2) ```alpha() ```"));
    // 2 violations over 2 candidate lines.
    assert!(body.contains("Having __2__ violations with __1.00__ violations/line"));
}

// --- Inline writer ---

#[test]
fn test_inline_posts_an_anchored_comment() {
    let files = vec![changed_file("app.py", "@@ -0,0 +1,1 @@\n+alpha()")];
    let host = FakeHost::with_files(files);

    let mut writer = InlineWriter::new(&host);
    writer
        .handle(finding("app.py", 1, "alpha()", "bad name"))
        .unwrap();
    writer.finish().unwrap();

    let comments = host.review_comments.borrow();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].body, "bad name");
    assert_eq!(comments[0].position, Some(1));
}

#[test]
fn test_inline_skips_duplicate_message_at_same_anchor() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files);
    host.seed_review_comment("app.py", "+alpha()", "bad name");

    let mut writer = InlineWriter::new(&host);
    writer
        .handle(finding("app.py", 1, "alpha()", "bad name"))
        .unwrap();

    assert_eq!(host.review_comments.borrow().len(), 1, "no duplicate");
}

#[test]
fn test_inline_posts_different_message_at_same_anchor() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files);
    host.seed_review_comment("app.py", "+alpha()", "old message");

    let mut writer = InlineWriter::new(&host);
    writer
        .handle(finding("app.py", 1, "alpha()", "new message"))
        .unwrap();

    assert_eq!(host.review_comments.borrow().len(), 2);
}

#[test]
fn test_inline_drops_unresolvable_findings() {
    let files = vec![changed_file("app.py", "+alpha()")];
    let host = FakeHost::with_files(files);

    let mut writer = InlineWriter::new(&host);
    // Context line, not an addition: no patch resolves it.
    writer
        .handle(finding("app.py", 9, "untouched()", "dropped"))
        .unwrap();

    assert!(host.review_comments.borrow().is_empty());
}

// --- Orchestration ---

fn options() -> ReviewOptions {
    ReviewOptions {
        rcfile: None,
        assignees: Vec::new(),
        kind: WriterKind::Summary,
    }
}

#[test]
fn test_run_skips_when_no_files_match_the_extension() {
    let host = FakeHost::with_files(vec![changed_file("main.js", "+let x = 1;")]);
    let outcome = run_review(&Config::default(), &host, &options()).unwrap();

    assert_eq!(outcome, ReviewOutcome::NoMatchingFiles);
    // No linter ran and no comment of either kind was created.
    assert!(host.issue_comments.borrow().is_empty());
    assert!(host.review_comments.borrow().is_empty());
}

#[test]
fn test_run_skips_when_assignee_not_allowed() {
    let mut host = FakeHost::with_files(vec![changed_file("app.py", "+alpha()")]);
    host.assignee = Some("bob".to_string());

    let mut opts = options();
    opts.assignees = vec!["alice".to_string()];
    let outcome = run_review(&Config::default(), &host, &opts).unwrap();

    assert_eq!(outcome, ReviewOutcome::SkippedAssignee);
    assert!(host.issue_comments.borrow().is_empty());
}

#[test]
fn test_run_skips_when_unassigned_and_filter_is_set() {
    let host = FakeHost::with_files(vec![changed_file("app.py", "+alpha()")]);

    let mut opts = options();
    opts.assignees = vec!["alice".to_string()];
    let outcome = run_review(&Config::default(), &host, &opts).unwrap();

    assert_eq!(outcome, ReviewOutcome::SkippedAssignee);
}

#[test]
fn test_allowed_assignee_reaches_the_file_filter() {
    // Assignee passes the gate; with no matching files the run stops
    // before ever invoking a linter.
    let mut host = FakeHost::with_files(vec![changed_file("main.js", "+let x = 1;")]);
    host.assignee = Some("alice".to_string());

    let mut opts = options();
    opts.assignees = vec!["alice".to_string()];
    let outcome = run_review(&Config::default(), &host, &opts).unwrap();

    assert_eq!(outcome, ReviewOutcome::NoMatchingFiles);
}
