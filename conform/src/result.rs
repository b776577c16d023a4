// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Result codes and the process-exit protocol.

use std::fmt;
use std::io::Write;
use std::process;

/// Outcome of a conformance test.
///
/// A test produces exactly one of these per process; the first call to
/// [`report_result`] wins and ends the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultCode {
    /// Every assertion held.
    Pass,
    /// At least one assertion did not hold.
    Fail,
    /// The environment can't host the test (missing extension or version).
    Skip,
    /// The test passed but observed something questionable.
    Warn,
}

impl ResultCode {
    /// The token an external runner matches on stdout.
    pub fn token(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::Warn => "WARN",
        }
    }

    /// The process exit status paired with the token.
    ///
    /// 77 is the established "skipped" status of autotools-style runners,
    /// so a runner that only inspects the status can still tell "not
    /// applicable" apart from "failed".
    pub fn exit_status(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => 1,
            Self::Warn => 2,
            Self::Skip => 77,
        }
    }

    /// Folds another judgment into this one, keeping the more severe.
    ///
    /// Useful for test bodies that keep probing after a mismatch and
    /// report the accumulated outcome at the end.
    pub fn merge(self, other: Self) -> Self {
        fn severity(code: ResultCode) -> u32 {
            match code {
                ResultCode::Pass => 0,
                ResultCode::Skip => 1,
                ResultCode::Warn => 2,
                ResultCode::Fail => 3,
            }
        }
        if severity(other) > severity(self) {
            other
        } else {
            self
        }
    }
}

impl From<bool> for ResultCode {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Early termination of a test with a definite result.
///
/// Deep call sites (the capability gates in particular) end a test by
/// propagating this with `?`. The driver is the only place that turns it
/// into an actual process exit, so control flow stays visible all the way
/// up the stack.
#[derive(Debug)]
pub struct Terminate {
    pub code: ResultCode,
    pub reason: Option<String>,
}

impl Terminate {
    pub fn new(code: ResultCode) -> Self {
        Self { code, reason: None }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Skip,
            reason: Some(reason.into()),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            code: ResultCode::Fail,
            reason: Some(reason.into()),
        }
    }
}

impl fmt::Display for Terminate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.code.token()),
            None => f.write_str(self.code.token()),
        }
    }
}

/// The return type of harness calls that may end the test early.
pub type HarnessResult<T> = Result<T, Terminate>;

/// Prints the result token and ends the process.
///
/// The token goes to stdout on its own line; everything diagnostic is
/// expected to have gone to stderr beforehand. This is the sole
/// termination point of a conforming test process, and calling it more
/// than once is a caller error (the second call can't execute in a
/// correct test, since the first never returns).
pub fn report_result(code: ResultCode) -> ! {
    let mut stdout = std::io::stdout().lock();
    let _ = writeln!(stdout, "{}", code.token());
    let _ = stdout.flush();
    process::exit(code.exit_status())
}
