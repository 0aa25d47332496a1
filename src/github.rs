// src/github.rs
//! GitHub REST implementation of the [`PullRequestHost`] capability.
//!
//! All calls are blocking and single-threaded, matching the run model:
//! one pull request, one pass. Every request goes through a bounded
//! retry loop with exponential backoff; rate-limit and server errors are
//! retried, everything else surfaces as a distinct api error.

use crate::config::{Config, RetryConfig};
use crate::diff::{resolve_position, PositionStyle};
use crate::error::{Error, Result};
use crate::host::PullRequestHost;
use crate::types::{ChangedFile, IssueComment, ReviewComment};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, RETRY_AFTER, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;
use std::thread;
use std::time::Duration;

const PER_PAGE: usize = 100;
const MAX_BACKOFF: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings, passed by value into the client.
#[derive(Debug, Clone)]
pub struct HostConfig {
    pub token: String,
    pub endpoint: String,
    pub user_agent: String,
    pub position_style: PositionStyle,
    pub retry: RetryConfig,
}

impl HostConfig {
    #[must_use]
    pub fn from_config(config: &Config, token: String) -> Self {
        Self {
            token,
            endpoint: config.github.endpoint.clone(),
            user_agent: config.github.user_agent.clone(),
            position_style: config.github.position_style,
            retry: config.retry.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct Account {
    login: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PullInfo {
    head: CommitRef,
    #[serde(default)]
    assignee: Option<Account>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    files: Vec<ChangedFile>,
}

pub struct GithubClient {
    http: Client,
    config: HostConfig,
    /// `owner/name` slug.
    repo: String,
    pull_number: u64,
    // Fetched once per run; the run model is single-threaded.
    pull_cache: RefCell<Option<PullInfo>>,
    files_cache: RefCell<Option<Vec<ChangedFile>>>,
}

impl GithubClient {
    /// # Errors
    /// Returns an error if the token is not a valid header value or the
    /// underlying http client cannot be built.
    pub fn new(config: HostConfig, repo: &str, pull_number: u64) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| Error::Config(format!("invalid user agent: {e}")))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| Error::Config(format!("invalid api token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| Error::Transport {
                operation: "build http client",
                source,
            })?;

        Ok(Self {
            http,
            config,
            repo: repo.to_string(),
            pull_number,
            pull_cache: RefCell::new(None),
            files_cache: RefCell::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/repos/{}/{path}", self.config.endpoint, self.repo)
    }

    fn pull(&self) -> Result<PullInfo> {
        if let Some(pull) = self.pull_cache.borrow().as_ref() {
            return Ok(pull.clone());
        }
        let url = self.url(&format!("pulls/{}", self.pull_number));
        let pull: PullInfo = self.request_json("fetch pull request", |c| c.get(&url))?;
        *self.pull_cache.borrow_mut() = Some(pull.clone());
        Ok(pull)
    }

    /// Per-commit file lists, newest commit first. Used to anchor inline
    /// comments against the most recent commit that touched a file.
    fn commits_newest_first(&self) -> Result<Vec<CommitRef>> {
        let mut commits: Vec<CommitRef> =
            self.get_paged("list pull request commits", &format!("pulls/{}/commits", self.pull_number))?;
        commits.reverse();
        Ok(commits)
    }

    fn commit_files(&self, sha: &str) -> Result<Vec<ChangedFile>> {
        let detail: CommitDetail =
            self.request_json("fetch commit", |c| c.get(self.url(&format!("commits/{sha}"))))?;
        Ok(detail.files)
    }

    fn get_paged<T: DeserializeOwned>(&self, operation: &'static str, path: &str) -> Result<Vec<T>> {
        let mut all = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!("{}?per_page={PER_PAGE}&page={page}", self.url(path));
            let batch: Vec<T> = self.request_json(operation, |c| c.get(&url))?;
            let fetched = batch.len();
            all.extend(batch);
            if fetched < PER_PAGE {
                return Ok(all);
            }
            page += 1;
        }
    }

    fn request_json<T, F>(&self, operation: &'static str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder,
    {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match build(&self.http).send() {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().map_err(|source| Error::Transport {
                            operation,
                            source,
                        });
                    }
                    let retry_after = parse_retry_after(response.headers());
                    let detail = response.text().unwrap_or_default();
                    if attempt < self.config.retry.max_attempts
                        && is_retryable_status(status.as_u16())
                    {
                        thread::sleep(retry_delay(
                            self.config.retry.base_delay_ms,
                            attempt,
                            retry_after,
                        ));
                        continue;
                    }
                    return Err(Error::Api {
                        operation,
                        status: status.as_u16(),
                        detail: truncate_detail(&detail, 400),
                    });
                }
                Err(source) => {
                    if attempt < self.config.retry.max_attempts
                        && (source.is_connect() || source.is_timeout())
                    {
                        thread::sleep(retry_delay(self.config.retry.base_delay_ms, attempt, None));
                        continue;
                    }
                    return Err(Error::Transport { operation, source });
                }
            }
        }
    }
}

impl PullRequestHost for GithubClient {
    fn files(&self) -> Result<Vec<ChangedFile>> {
        if let Some(files) = self.files_cache.borrow().as_ref() {
            return Ok(files.clone());
        }
        let files: Vec<ChangedFile> =
            self.get_paged("list changed files", &format!("pulls/{}/files", self.pull_number))?;
        *self.files_cache.borrow_mut() = Some(files.clone());
        Ok(files)
    }

    /// Existing review comments whose hunk contains `source` in `path`.
    /// Position is re-resolved against each comment's own hunk, so stale
    /// anchors from earlier commits do not match.
    fn review_comments(&self, source: &str, path: &str) -> Result<Vec<ReviewComment>> {
        let all: Vec<ReviewComment> = self.get_paged(
            "list review comments",
            &format!("pulls/{}/comments", self.pull_number),
        )?;
        Ok(all
            .into_iter()
            .filter(|c| {
                c.path == path
                    && resolve_position(&c.diff_hunk, source, self.config.position_style).is_some()
            })
            .collect())
    }

    fn create_review_comment(
        &self,
        source: &str,
        path: &str,
        body: &str,
    ) -> Result<Option<ReviewComment>> {
        for commit in self.commits_newest_first()? {
            let files = self.commit_files(&commit.sha)?;
            let Some(file) = files.iter().find(|f| f.filename == path) else {
                continue;
            };
            let Some(patch) = file.patch.as_deref() else {
                continue;
            };
            let Some(position) = resolve_position(patch, source, self.config.position_style)
            else {
                continue;
            };

            let url = self.url(&format!("pulls/{}/comments", self.pull_number));
            let payload = json!({
                "body": body,
                "commit_id": commit.sha,
                "path": path,
                "position": position,
            });
            let comment: ReviewComment =
                self.request_json("create review comment", |c| c.post(&url).json(&payload))?;
            return Ok(Some(comment));
        }
        Ok(None)
    }

    fn create_or_update_comment(&self, header: &str, body: &str) -> Result<()> {
        let existing: Vec<IssueComment> = self.get_paged(
            "list pull request comments",
            &format!("issues/{}/comments", self.pull_number),
        )?;

        if let Some(previous) = existing.iter().find(|c| c.body.starts_with(header)) {
            let url = self.url(&format!("issues/comments/{}", previous.id));
            let payload = json!({ "body": body });
            let _: IssueComment =
                self.request_json("update summary comment", |c| c.patch(&url).json(&payload))?;
        } else {
            let url = self.url(&format!("issues/{}/comments", self.pull_number));
            let payload = json!({ "body": body });
            let _: IssueComment =
                self.request_json("create summary comment", |c| c.post(&url).json(&payload))?;
        }
        Ok(())
    }

    fn head_sha(&self) -> Result<String> {
        Ok(self.pull()?.head.sha)
    }

    fn assignee_name(&self) -> Result<Option<String>> {
        Ok(self.pull()?.assignee.map(|a| a.login))
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Exponential backoff with a hard cap; an explicit Retry-After from the
/// server wins over the computed delay.
fn retry_delay(base_ms: u64, attempt: usize, retry_after: Option<Duration>) -> Duration {
    if let Some(wait) = retry_after {
        return wait.min(MAX_BACKOFF);
    }
    let shift = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
    Duration::from_millis(base_ms.saturating_mul(1 << shift)).min(MAX_BACKOFF)
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate_detail(detail: &str, max: usize) -> String {
    if detail.len() <= max {
        return detail.to_string();
    }
    let mut end = max;
    while !detail.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &detail[..end])
}
