/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;
use log::warn;

use twinftp::{ClientConfig, ClientError, Protocol};

mod logger;
mod opts;

mod cmd_get;
mod cmd_list;
mod cmd_put;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_PROTOCOL: &str = "protocol";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_DIRECTORY: &str = "directory";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("twinftp")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("Server address, as HOST[:PORT]")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present_any([GLOBAL_ARG_COMPLETION, GLOBAL_ARG_CONFIG]),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PROTOCOL)
                .help("Transfer protocol")
                .num_args(1)
                .value_name("PROTOCOL")
                .value_parser(["ftp", "sftp"])
                .long("protocol")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("Login username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("Login password")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("Client config file in yaml format")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .short('c')
                .long("config")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_DIRECTORY)
                .help("Remote directory to change to after login")
                .num_args(1)
                .value_name("REMOTE DIRECTORY")
                .short('d')
                .long("directory")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_list::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_put::command())
}

fn build_client_config(args: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let mut config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => opts::load_config_file(path)?,
        None => ClientConfig::default(),
    };

    if let Some(protocol) = args.get_one::<String>(GLOBAL_ARG_PROTOCOL) {
        let protocol = Protocol::from_str(protocol)
            .map_err(|_| anyhow!("unsupported protocol {protocol}"))?;
        config.set_protocol(protocol);
    }
    if let Some(server) = args.get_one::<String>(GLOBAL_ARG_SERVER) {
        let (host, port) = opts::parse_server(server)?;
        config.set_host(host);
        if let Some(port) = port {
            config.set_port(port);
        }
    }
    if config.host().is_empty() {
        return Err(anyhow!("no server address found"));
    }

    if let Some(username) = args.get_one::<String>(GLOBAL_ARG_USERNAME) {
        let password = args
            .get_one::<String>(GLOBAL_ARG_PASSWORD)
            .map(|s| s.as_str())
            .unwrap_or_default();
        config.set_credentials(username.as_str(), password);
    } else if let Some(password) = args.get_one::<String>(GLOBAL_ARG_PASSWORD) {
        let username = config.credentials().username().to_string();
        config.set_credentials(username, password.as_str());
    }

    Ok(config)
}

/// Merge the disconnect result into the command result.
///
/// A failed command keeps its own error, and a disconnect failure is only
/// logged then.
fn finish(ret: anyhow::Result<()>, disconnect: Result<(), ClientError>) -> anyhow::Result<()> {
    match (ret, disconnect) {
        (Ok(()), Err(e)) => Err(e.into()),
        (Err(e), Err(de)) => {
            warn!("{de}");
            Err(e)
        }
        (ret, Ok(())) => ret,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger
        .into_global_logger()
        .context("failed to setup logger")?;

    let config = build_client_config(&args)?;

    let Some((subcommand, sub_args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };

    let mut client = twinftp::new_client(config);
    let mut conn = client.connect().await?;

    let ret = match args.get_one::<String>(GLOBAL_ARG_DIRECTORY) {
        Some(dir) => conn.set_remote_directory(dir).await.map_err(anyhow::Error::from),
        None => Ok(()),
    };
    let ret = match ret {
        Ok(_) => match subcommand {
            cmd_list::COMMAND => cmd_list::run(conn.as_mut(), sub_args).await,
            cmd_get::COMMAND => cmd_get::run(conn.as_mut(), sub_args).await,
            cmd_put::COMMAND => cmd_put::run(conn.as_mut(), sub_args).await,
            cmd => Err(anyhow!("invalid subcommand {cmd}")),
        },
        Err(e) => Err(e),
    };

    let disconnect = client.disconnect().await;
    finish(ret, disconnect)
}
