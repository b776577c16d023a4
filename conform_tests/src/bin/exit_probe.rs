// Copyright 2026 the Conform Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helper binary for the exit-protocol tests: reports the result named
//! by its first argument and nothing else.

use conform::{report_result, ResultCode};

fn main() {
    let code = match std::env::args().nth(1).as_deref() {
        Some("pass") => ResultCode::Pass,
        Some("fail") => ResultCode::Fail,
        Some("skip") => ResultCode::Skip,
        Some("warn") => ResultCode::Warn,
        other => {
            eprintln!("usage: exit_probe pass|fail|skip|warn (got {other:?})");
            std::process::exit(125)
        }
    };
    report_result(code)
}
