/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::path;
use crate::{ConnectionError, FtpFile};

mod ftp;
pub use ftp::FtpConnection;
pub(crate) use ftp::SharedFtpSession;

mod sftp;
pub use sftp::SftpConnection;

pub const CURRENT_DIRECTORY: &str = ".";

/// An established session on a remote server.
#[async_trait]
pub trait Connection: Send {
    /// Change the remote working directory.
    async fn set_remote_directory(&mut self, directory: &str) -> Result<(), ConnectionError>;

    /// List the entries of the remote working directory.
    async fn list_files(&mut self) -> Result<Vec<FtpFile>, ConnectionError> {
        self.list_files_in(CURRENT_DIRECTORY).await
    }

    /// List the entries of a directory relative to the remote working directory.
    async fn list_files_in(&mut self, relative_path: &str)
    -> Result<Vec<FtpFile>, ConnectionError>;

    /// Copy a remote file into `local_directory`, keeping its name.
    ///
    /// Returns the path of the local file that was written.
    async fn download(
        &mut self,
        file: &FtpFile,
        local_directory: &Path,
    ) -> Result<PathBuf, ConnectionError>;

    /// Copy a local file into `remote_directory`, keeping its name.
    ///
    /// Returns the remote path that was written.
    async fn upload(
        &mut self,
        local_file: &Path,
        remote_directory: &str,
    ) -> Result<String, ConnectionError>;

    fn current_directory(&self) -> &str;
}

fn local_download_target(
    file: &FtpFile,
    local_directory: &Path,
) -> Result<PathBuf, ConnectionError> {
    if path::is_plain_name(file.name()) {
        Ok(local_directory.join(file.name()))
    } else {
        Err(ConnectionError::download_failed(
            format!("Unable to download file {}", file.name()),
            "remote file name is not usable as a local file name",
        ))
    }
}

fn remote_upload_target(
    local_file: &Path,
    remote_directory: &str,
) -> Result<String, ConnectionError> {
    path::upload_target(remote_directory, local_file).ok_or_else(|| {
        ConnectionError::upload_failed(
            format!("Could not find file: {}", local_file.display()),
            "local path has no usable file name",
        )
    })
}

fn listing_base(current_directory: &str, relative_path: &str) -> String {
    path::resolve(current_directory, relative_path)
}
