// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::logging::init_logging;
use crate::runtime::{load_campus_config, RuntimeBuilder};

/// Loads configuration, initializes logging and runs the service.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    let config = load_campus_config(cli.config.as_deref())?;

    init_logging(
        cli.effective_log_level(config.logging.level.as_str()),
        cli.effective_log_format(config.logging.format),
    );

    let runtime = RuntimeBuilder::new()
        .config(config)
        .dev_mode(args.dev_mode)
        .build()?;

    runtime.run().await
}
