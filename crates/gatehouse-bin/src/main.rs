// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Gatehouse - authentication and authorization gate
//!
//! Main binary entry point.

use gatehouse_bin::cli::{Cli, LogFormat};
use gatehouse_bin::error::report_error_and_exit;
use gatehouse_bin::{commands, init_logging};
use gatehouse_config::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Logging settings from the file are best effort here; load errors are
    // reported by the command itself.
    let logging = ConfigLoader::new()
        .load_unvalidated(&cli.config)
        .ok()
        .map(|config| config.logging);
    let level = cli.log.level(logging.as_ref().map(|l| l.level.as_str()));
    let format = cli.log.format(logging.as_ref().map(|l| LogFormat::from(l.format)));

    if let Err(e) = init_logging(level, format) {
        report_error_and_exit(e);
    }

    if let Err(e) = commands::execute(cli).await {
        report_error_and_exit(e);
    }
}
