// src/exit.rs
//! Standardized process exit codes.
//!
//! Provides a stable contract for CI scripts and automation.

use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PullnoteExit {
    /// Review completed (including "nothing to review" early exits).
    Success = 0,
    /// Generic error (IO, network, hosting api).
    Error = 1,
    /// Input validation failed (bad config, broken separator scheme).
    InvalidInput = 2,
}

impl PullnoteExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn exit(self) -> ! {
        std::process::exit(self.code())
    }
}

impl Termination for PullnoteExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}
