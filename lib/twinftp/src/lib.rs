/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod backend;
mod client;
mod config;
mod connection;
mod error;
mod file;

pub mod path;

pub use backend::{FtpListEntry, FtpSession, SftpChannel, SftpDirEntry};
pub use client::{Client, FtpClient, SftpClient, new_client};
pub use config::{ClientConfig, Credentials, FtpOptions, Protocol, SftpOptions};
pub use connection::{CURRENT_DIRECTORY, Connection, FtpConnection, SftpConnection};
pub use error::{BackendError, BoxError, ClientError, ConnectionError};
pub use file::FtpFile;
