/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::OpenFlags;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::BackendError;

/// A directory entry as the SFTP library reports it.
///
/// `mtime` is in seconds since the unix epoch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SftpDirEntry {
    pub filename: String,
    pub size: u64,
    pub mtime: u32,
    pub directory: bool,
}

/// The SFTP session calls used by [`crate::SftpConnection`].
#[async_trait]
pub trait SftpChannel: Send + Sync + 'static {
    async fn real_path(&self, path: &str) -> Result<String, BackendError>;

    async fn is_dir(&self, path: &str) -> Result<bool, BackendError>;

    /// List `path`, without the `.` and `..` entries.
    async fn list_dir(&self, path: &str) -> Result<Vec<SftpDirEntry>, BackendError>;

    async fn read_file(
        &self,
        path: &str,
        output: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, BackendError>;

    async fn write_file(
        &self,
        path: &str,
        input: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<u64, BackendError>;
}

#[async_trait]
impl SftpChannel for SftpSession {
    async fn real_path(&self, path: &str) -> Result<String, BackendError> {
        let real = self.canonicalize(path).await?;
        Ok(real)
    }

    async fn is_dir(&self, path: &str) -> Result<bool, BackendError> {
        let metadata = self.metadata(path).await?;
        Ok(metadata.file_type().is_dir())
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<SftpDirEntry>, BackendError> {
        let entries = self.read_dir(path).await?;
        let mut files = Vec::new();
        for entry in entries {
            let filename = entry.file_name();
            if filename == "." || filename == ".." {
                continue;
            }
            let metadata = entry.metadata();
            files.push(SftpDirEntry {
                filename,
                size: metadata.size.unwrap_or_default(),
                mtime: metadata.mtime.unwrap_or_default(),
                directory: metadata.file_type().is_dir(),
            });
        }
        Ok(files)
    }

    async fn read_file(
        &self,
        path: &str,
        output: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, BackendError> {
        let mut file = self.open(path).await?;
        let copied = tokio::io::copy(&mut file, output).await?;
        output.flush().await?;
        Ok(copied)
    }

    async fn write_file(
        &self,
        path: &str,
        input: &mut (dyn AsyncRead + Unpin + Send),
    ) -> Result<u64, BackendError> {
        let mut file = self
            .open_with_flags(
                path,
                OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE,
            )
            .await?;
        let copied = tokio::io::copy(input, &mut file).await?;
        file.flush().await?;
        file.shutdown().await?;
        Ok(copied)
    }
}
