// src/bin/pullnote.rs
use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use colored::Colorize;

use pullnote_core::config::{Config, CONFIG_FILE, TOKEN_ENV};
use pullnote_core::error::Error;
use pullnote_core::exit::PullnoteExit;
use pullnote_core::runner::{review_pull_request, ReviewOptions, ReviewOutcome};
use pullnote_core::writer::WriterKind;

#[derive(Parser)]
#[command(name = "pullnote", version, about = "Posts lint findings as pull request review comments")]
struct Cli {
    /// Repository of the pull request, as owner/name
    #[arg(long, short)]
    repo: String,

    /// Pull request number
    #[arg(long, short = 'n')]
    pull_number: u64,

    /// Linter rc file, passed through to the linter
    #[arg(long, value_name = "FILE")]
    rcfile: Option<PathBuf>,

    /// Assignees for which the review runs; unset runs for any assignee
    #[arg(long, short, num_args = 1..)]
    assignees: Vec<String>,

    /// Post one inline comment per finding instead of one summary comment
    #[arg(long)]
    inline: bool,

    /// Config file location
    #[arg(long, value_name = "FILE", default_value = CONFIG_FILE)]
    config: PathBuf,
}

fn main() -> PullnoteExit {
    match run() {
        Ok(()) => PullnoteExit::Success,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            exit_code(&e)
        }
    }
}

fn exit_code(e: &anyhow::Error) -> PullnoteExit {
    match e.downcast_ref::<Error>() {
        Some(Error::Config(_) | Error::MalformedFinding { .. }) => PullnoteExit::InvalidInput,
        _ => PullnoteExit::Error,
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    let token =
        env::var(TOKEN_ENV).map_err(|_| anyhow!("{TOKEN_ENV} environment variable is not set"))?;

    let kind = if cli.inline {
        WriterKind::Inline
    } else {
        WriterKind::Summary
    };
    let options = ReviewOptions {
        rcfile: cli.rcfile,
        assignees: cli.assignees,
        kind,
    };

    let outcome = review_pull_request(&config, token, &cli.repo, cli.pull_number, &options)?;
    match outcome {
        ReviewOutcome::Completed => {
            println!(
                "{}",
                format!("Review of {}#{} complete.", cli.repo, cli.pull_number)
                    .green()
                    .bold()
            );
        }
        ReviewOutcome::SkippedAssignee => {
            println!("{}", "Skipped: assignee is not in the allowed list.".dimmed());
        }
        ReviewOutcome::NoMatchingFiles => {
            println!("{}", "Nothing to lint: no matching files changed.".dimmed());
        }
    }
    Ok(())
}
