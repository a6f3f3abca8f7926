/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command, value_parser};

use twinftp::{CURRENT_DIRECTORY, Connection, FtpFile};

pub(super) const COMMAND: &str = "get";

const COMMAND_ARG_REMOTE_FILE: &str = "remote-file";
const COMMAND_ARG_LOCAL_DIR: &str = "local-dir";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Download file")
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_FILE)
                .value_name("REMOTE FILE")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_DIR)
                .value_name("LOCAL DIRECTORY")
                .num_args(1)
                .value_parser(value_parser!(PathBuf))
                .default_value(CURRENT_DIRECTORY),
        )
}

fn split_remote_path(path: &str) -> (&str, &str) {
    match path.rsplit_once('/') {
        Some(("", name)) => ("/", name),
        Some((dir, name)) => (dir, name),
        None => (CURRENT_DIRECTORY, path),
    }
}

async fn find_remote_file(conn: &mut dyn Connection, path: &str) -> anyhow::Result<FtpFile> {
    let (dir, name) = split_remote_path(path);
    let files = conn.list_files_in(dir).await?;
    let file = files
        .into_iter()
        .find(|f| f.name() == name)
        .ok_or_else(|| anyhow!("no such remote file {path}"))?;
    if file.is_directory() {
        return Err(anyhow!("remote path {path} is a directory"));
    }
    Ok(file)
}

pub(super) async fn run(conn: &mut dyn Connection, args: &ArgMatches) -> anyhow::Result<()> {
    let remote = args.get_one::<String>(COMMAND_ARG_REMOTE_FILE).unwrap();
    let local_dir = args.get_one::<PathBuf>(COMMAND_ARG_LOCAL_DIR).unwrap();

    let file = find_remote_file(conn, remote).await?;
    let local = conn.download(&file, local_dir).await?;
    println!("{}", local.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split() {
        assert_eq!(split_remote_path("file.txt"), (".", "file.txt"));
        assert_eq!(split_remote_path("pub/file.txt"), ("pub", "file.txt"));
        assert_eq!(split_remote_path("/file.txt"), ("/", "file.txt"));
        assert_eq!(
            split_remote_path("/srv/pub/file.txt"),
            ("/srv/pub", "file.txt")
        );
    }
}
