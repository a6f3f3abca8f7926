/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, value_parser};

use twinftp::Connection;

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL_FILE: &str = "local-file";
const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload file")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_FILE)
                .value_name("LOCAL FILE")
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIRECTORY")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run(conn: &mut dyn Connection, args: &ArgMatches) -> anyhow::Result<()> {
    let local = args.get_one::<PathBuf>(COMMAND_ARG_LOCAL_FILE).unwrap();
    let remote_dir = args.get_one::<String>(COMMAND_ARG_REMOTE_DIR).unwrap();

    let remote = conn.upload(local, remote_dir).await?;
    println!("{remote}");
    Ok(())
}
