/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Write};

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};

use twinftp::{CURRENT_DIRECTORY, Connection};

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("List path").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("DIRECTORY PATH")
            .num_args(1),
    )
}

pub(super) async fn run(conn: &mut dyn Connection, args: &ArgMatches) -> anyhow::Result<()> {
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or(CURRENT_DIRECTORY);

    let files = conn.list_files_in(path).await?;
    let mut stdout = io::stdout().lock();
    for file in files {
        writeln!(stdout, "{file}").context("failed to write to stdout")?;
    }
    Ok(())
}
