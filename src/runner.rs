// src/runner.rs
//! Wires the hosting client, the linter process and the chosen writer
//! into one review pass.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::findings::FindingParser;
use crate::github::{GithubClient, HostConfig};
use crate::host::PullRequestHost;
use crate::writer::{make_writer, ReviewWriter, WriterKind};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{ChildStdout, Command, Stdio};

/// Pylint encodes usage errors in this exit status bit; bits 1-16 only
/// say which message categories were emitted and are expected here.
const LINTER_USAGE_ERROR_BIT: i32 = 32;

#[derive(Debug, Clone)]
pub struct ReviewOptions {
    pub rcfile: Option<PathBuf>,
    /// When non-empty, the run is skipped unless the pull request's
    /// assignee is in this list.
    pub assignees: Vec<String>,
    pub kind: WriterKind,
}

/// How a review pass ended; the caller decides what to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewOutcome {
    Completed,
    SkippedAssignee,
    NoMatchingFiles,
}

/// Reviews one pull request end to end.
///
/// # Errors
/// Returns an error on invalid configuration, hosting api failures, a
/// broken finding stream or a linter usage error.
pub fn review_pull_request(
    config: &Config,
    token: String,
    repo: &str,
    pull_number: u64,
    options: &ReviewOptions,
) -> Result<ReviewOutcome> {
    config.validate()?;
    let host = GithubClient::new(HostConfig::from_config(config, token), repo, pull_number)?;
    run_review(config, &host, options)
}

/// The review sequence against any host implementation.
///
/// # Errors
/// See [`review_pull_request`].
pub fn run_review<H: PullRequestHost>(
    config: &Config,
    host: &H,
    options: &ReviewOptions,
) -> Result<ReviewOutcome> {
    if !options.assignees.is_empty() {
        let assignee = host.assignee_name()?;
        let allowed = assignee
            .as_deref()
            .is_some_and(|name| options.assignees.iter().any(|a| a == name));
        if !allowed {
            return Ok(ReviewOutcome::SkippedAssignee);
        }
    }

    let files = host.files()?;
    let targets: Vec<String> = files
        .iter()
        .filter(|f| f.is_present() && f.filename.ends_with(&config.linter.extension))
        .map(|f| f.filename.clone())
        .collect();
    if targets.is_empty() {
        return Ok(ReviewOutcome::NoMatchingFiles);
    }

    let mut writer = make_writer(options.kind, host, &files);
    let parser = FindingParser::new(&config.linter);
    run_linter(config, options.rcfile.as_deref(), &targets, &parser, writer.as_mut())?;
    writer.finish()?;
    Ok(ReviewOutcome::Completed)
}

/// Invokes the linter once over all target files and streams its stdout
/// line by line into the parser. Push-based, one line at a time; the
/// writer sees findings in emission order.
fn run_linter(
    config: &Config,
    rcfile: Option<&Path>,
    targets: &[String],
    parser: &FindingParser,
    sink: &mut dyn ReviewWriter,
) -> Result<()> {
    let mut command = Command::new(&config.linter.program);
    command
        .arg("-r")
        .arg("n")
        .arg(format!("--msg-template={}", config.linter.message_template()));
    if let Some(rc) = rcfile {
        command.arg("--rcfile").arg(rc);
    }
    command
        .args(targets)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());

    let mut child = command.spawn().map_err(|source| Error::Io {
        source,
        path: PathBuf::from(&config.linter.program),
    })?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Linter("no stdout handle on linter process".into()))?;

    if let Err(e) = stream_findings(stdout, parser, sink) {
        // Don't leave a zombie behind on a broken stream.
        let _ = child.kill();
        let _ = child.wait();
        return Err(e);
    }

    let status = child.wait()?;
    if let Some(code) = status.code() {
        if code & LINTER_USAGE_ERROR_BIT != 0 {
            return Err(Error::Linter(format!(
                "{} exited with a usage error (status {code})",
                config.linter.program
            )));
        }
    }
    Ok(())
}

fn stream_findings(
    stdout: ChildStdout,
    parser: &FindingParser,
    sink: &mut dyn ReviewWriter,
) -> Result<()> {
    for line in BufReader::new(stdout).lines() {
        parser.feed(&line?, sink)?;
    }
    Ok(())
}
