/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::{CURRENT_DIRECTORY, Connection, listing_base, local_download_target, remote_upload_target};
use crate::path;
use crate::{BackendError, ConnectionError, FtpFile, FtpListEntry, FtpSession};

pub(crate) type SharedFtpSession<S> = Arc<Mutex<Option<S>>>;

enum TransferError {
    Local(io::Error),
    Remote(BackendError),
}

/// [`Connection`] over a blocking FTP session.
///
/// Every session call runs on the tokio blocking pool while holding the
/// session lock, so the owning client may close the session concurrently.
pub struct FtpConnection<S: FtpSession> {
    session: SharedFtpSession<S>,
    current_directory: String,
}

impl<S: FtpSession> FtpConnection<S> {
    pub fn new(session: S) -> Self {
        FtpConnection::with_shared(Arc::new(Mutex::new(Some(session))))
    }

    pub(crate) fn with_shared(session: SharedFtpSession<S>) -> Self {
        FtpConnection {
            session,
            current_directory: CURRENT_DIRECTORY.to_string(),
        }
    }

    async fn run_blocking<T, F>(&self, f: F) -> Result<T, ConnectionError>
    where
        F: FnOnce(&mut S) -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut guard = Arc::clone(&self.session).lock_owned().await;
        tokio::task::spawn_blocking(move || guard.as_mut().map(f))
            .await?
            .ok_or(ConnectionError::Closed)
    }

    fn to_ftp_file(&self, base: &str, entry: FtpListEntry) -> FtpFile {
        let full_path = path::join(base, &entry.name);
        let last_modified = DateTime::<Utc>::from(entry.modified);
        FtpFile::new(
            entry.name,
            entry.size,
            full_path,
            last_modified,
            entry.directory,
        )
    }
}

#[async_trait]
impl<S: FtpSession> Connection for FtpConnection<S> {
    async fn set_remote_directory(&mut self, directory: &str) -> Result<(), ConnectionError> {
        let target = directory.to_string();
        let r = self
            .run_blocking(move |s| -> Result<Result<String, BackendError>, BackendError> {
                s.change_dir(&target)?;
                Ok(s.current_dir())
            })
            .await?;
        match r {
            Ok(Ok(pwd)) => {
                debug!("ftp remote directory changed to {pwd}");
                self.current_directory = pwd;
                Ok(())
            }
            Ok(Err(e)) => {
                // the server did change directory, so track it locally
                let resolved = path::resolve(&self.current_directory, directory);
                warn!("ftp remote directory changed to {resolved}, but PWD failed: {e}");
                self.current_directory = resolved;
                Ok(())
            }
            Err(e) if e.is_rejected() => Err(ConnectionError::no_such_directory(
                format!("The directory {directory} doesn't exist on the remote server."),
                e,
            )),
            Err(e) => Err(ConnectionError::remote_directory(
                "Remote server was unable to change directory.".to_string(),
                e,
            )),
        }
    }

    async fn list_files_in(
        &mut self,
        relative_path: &str,
    ) -> Result<Vec<FtpFile>, ConnectionError> {
        let target = relative_path.to_string();
        let entries = self
            .run_blocking(move |s| s.list_entries(&target))
            .await?
            .map_err(|e| {
                ConnectionError::file_listing(
                    format!("Unable to list files in directory {relative_path}"),
                    e,
                )
            })?;
        debug!(
            "ftp listed {} entries in directory {relative_path}",
            entries.len()
        );

        let base = listing_base(&self.current_directory, relative_path);
        Ok(entries
            .into_iter()
            .map(|entry| self.to_ftp_file(&base, entry))
            .collect())
    }

    async fn download(
        &mut self,
        file: &FtpFile,
        local_directory: &Path,
    ) -> Result<PathBuf, ConnectionError> {
        let local_target = local_download_target(file, local_directory)?;

        let remote_path = file.full_path().to_string();
        let local_dir = local_directory.to_path_buf();
        let local_path = local_target.clone();
        let r = self
            .run_blocking(move |s| -> Result<u64, TransferError> {
                // the target is only replaced once the whole file is received
                let mut staging = NamedTempFile::new_in(&local_dir).map_err(TransferError::Local)?;
                let size = s
                    .retrieve(&remote_path, staging.as_file_mut())
                    .map_err(TransferError::Remote)?;
                staging
                    .persist(&local_path)
                    .map_err(|e| TransferError::Local(e.error))?;
                Ok(size)
            })
            .await?;

        match r {
            Ok(size) => {
                debug!(
                    "ftp downloaded {} ({size} bytes) to {}",
                    file.full_path(),
                    local_target.display()
                );
                Ok(local_target)
            }
            Err(TransferError::Local(e)) => Err(ConnectionError::download_failed(
                format!(
                    "Unable to write to local directory {}",
                    local_target.display()
                ),
                e,
            )),
            Err(TransferError::Remote(e)) if e.is_rejected() => {
                Err(ConnectionError::download_failed(
                    "Server returned failure while downloading.".to_string(),
                    e,
                ))
            }
            Err(TransferError::Remote(e)) => Err(ConnectionError::download_failed(
                format!("Unable to download file {}", file.name()),
                e,
            )),
        }
    }

    async fn upload(
        &mut self,
        local_file: &Path,
        remote_directory: &str,
    ) -> Result<String, ConnectionError> {
        let remote_target = remote_upload_target(local_file, remote_directory)?;

        let local_path = local_file.to_path_buf();
        let remote_path = remote_target.clone();
        let r = self
            .run_blocking(move |s| -> Result<u64, TransferError> {
                let mut input = File::open(&local_path).map_err(TransferError::Local)?;
                let r = s.store(&remote_path, &mut input);
                drop(input);
                r.map_err(TransferError::Remote)
            })
            .await?;

        match r {
            Ok(size) => {
                debug!(
                    "ftp uploaded {} ({size} bytes) to {remote_target}",
                    local_file.display()
                );
                Ok(remote_target)
            }
            Err(TransferError::Local(e)) => Err(ConnectionError::upload_failed(
                format!("Could not find file: {}", local_file.display()),
                e,
            )),
            Err(TransferError::Remote(e)) if e.is_rejected() => Err(ConnectionError::upload_failed(
                "Upload failed.".to_string(),
                e,
            )),
            Err(TransferError::Remote(e)) => Err(ConnectionError::upload_failed(
                "Upload may not have completed.".to_string(),
                e,
            )),
        }
    }

    #[inline]
    fn current_directory(&self) -> &str {
        &self.current_directory
    }
}
