// src/config.rs
use crate::diff::PositionStyle;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default location of the config file, next to the working directory.
pub const CONFIG_FILE: &str = "pullnote.toml";

/// Environment variable holding the hosting api token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct GithubConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub position_style: PositionStyle,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            user_agent: default_user_agent(),
            position_style: PositionStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinterConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// Only changed files with this suffix are linted.
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Field separator for the linter's message template. Must never
    /// occur in the template's literal text or a message would split
    /// into the wrong number of fields.
    #[serde(default = "default_separator")]
    pub separator: String,
    /// Lines starting with this prefix are reporter noise, not findings.
    #[serde(default = "default_banner_prefix")]
    pub banner_prefix: String,
}

impl Default for LinterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            extension: default_extension(),
            separator: default_separator(),
            banner_prefix: default_banner_prefix(),
        }
    }
}

impl LinterConfig {
    /// The msg-template handed to the linter: three fields joined by the
    /// configured separator.
    #[must_use]
    pub fn message_template(&self) -> String {
        let sep = &self.separator;
        format!("{{path}}{sep}{{line}}{sep}{{msg}}")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub linter: LinterConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Loads the config from `path`, falling back to defaults when the
    /// file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(|source| Error::Io {
            source,
            path: path.to_path_buf(),
        })?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {e}", path.display())))
    }

    /// Validates the separator scheme and the lint file filter.
    ///
    /// The separator check is structural: the built message template must
    /// contain the separator exactly twice (the two field joins). A
    /// separator that collides with the template's literal text shows up
    /// as extra occurrences and is rejected before the linter ever runs.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first violated rule.
    pub fn validate(&self) -> Result<()> {
        let sep = &self.linter.separator;
        if sep.is_empty() {
            return Err(Error::Config("linter.separator must not be empty".into()));
        }
        if sep.contains('{') || sep.contains('}') {
            return Err(Error::Config(
                "linter.separator must not contain template braces".into(),
            ));
        }
        let template = self.linter.message_template();
        if template.matches(sep.as_str()).count() != 2 {
            return Err(Error::Config(format!(
                "linter.separator {sep:?} collides with the message template {template:?}"
            )));
        }
        if !self.linter.extension.starts_with('.') {
            return Err(Error::Config(format!(
                "linter.extension must start with '.', got {:?}",
                self.linter.extension
            )));
        }
        Ok(())
    }
}

fn default_endpoint() -> String {
    "https://api.github.com".to_string()
}
fn default_user_agent() -> String {
    "pullnote".to_string()
}
fn default_program() -> String {
    "pylint".to_string()
}
fn default_extension() -> String {
    ".py".to_string()
}
fn default_separator() -> String {
    "#&#&".to_string()
}
fn default_banner_prefix() -> String {
    "****".to_string()
}
const fn default_max_attempts() -> usize {
    3
}
const fn default_base_delay_ms() -> u64 {
    500
}
