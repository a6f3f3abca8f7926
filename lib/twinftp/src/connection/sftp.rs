/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use super::{CURRENT_DIRECTORY, Connection, listing_base, local_download_target, remote_upload_target};
use crate::path;
use crate::{BackendError, ConnectionError, FtpFile, SftpChannel, SftpDirEntry};

/// [`Connection`] over an SFTP channel.
///
/// SFTP has no server side working directory, so the current directory is
/// tracked here and every request carries a resolved path.
pub struct SftpConnection<C: SftpChannel> {
    channel: Arc<C>,
    current_directory: String,
}

impl<C: SftpChannel> SftpConnection<C> {
    pub fn new(channel: Arc<C>) -> Self {
        SftpConnection {
            channel,
            current_directory: CURRENT_DIRECTORY.to_string(),
        }
    }

    async fn checked_directory(&self, target: &str) -> Result<String, BackendError> {
        let real = self.channel.real_path(target).await?;
        if self.channel.is_dir(&real).await? {
            Ok(real)
        } else {
            Err(BackendError::rejected(format!("{real} is not a directory")))
        }
    }
}

fn to_ftp_file(base: &str, entry: SftpDirEntry) -> FtpFile {
    let full_path = path::join(base, &entry.filename);
    let last_modified =
        DateTime::<Utc>::from_timestamp(i64::from(entry.mtime), 0).unwrap_or_default();
    FtpFile::new(
        entry.filename,
        entry.size,
        full_path,
        last_modified,
        entry.directory,
    )
}

#[async_trait]
impl<C: SftpChannel> Connection for SftpConnection<C> {
    async fn set_remote_directory(&mut self, directory: &str) -> Result<(), ConnectionError> {
        let target = path::resolve(&self.current_directory, directory);
        let real = self.checked_directory(&target).await.map_err(|e| {
            ConnectionError::no_such_directory(format!("Directory {directory} does not exist."), e)
        })?;
        debug!("sftp remote directory changed to {real}");
        self.current_directory = real;
        Ok(())
    }

    async fn list_files_in(
        &mut self,
        relative_path: &str,
    ) -> Result<Vec<FtpFile>, ConnectionError> {
        let base = listing_base(&self.current_directory, relative_path);
        let entries = self.channel.list_dir(&base).await.map_err(|e| {
            ConnectionError::file_listing(
                format!("Unable to list files in directory {relative_path}"),
                e,
            )
        })?;
        debug!("sftp listed {} entries in directory {base}", entries.len());

        Ok(entries
            .into_iter()
            .map(|entry| to_ftp_file(&base, entry))
            .collect())
    }

    async fn download(
        &mut self,
        file: &FtpFile,
        local_directory: &Path,
    ) -> Result<PathBuf, ConnectionError> {
        let local_target = local_download_target(file, local_directory)?;

        let local_write_failed = |e: io::Error| {
            ConnectionError::download_failed(
                format!(
                    "Unable to write to local directory {}",
                    local_target.display()
                ),
                e,
            )
        };

        // the target is only replaced once the whole file is received
        let staging = NamedTempFile::new_in(local_directory).map_err(local_write_failed)?;
        let mut output = staging
            .reopen()
            .map(tokio::fs::File::from_std)
            .map_err(local_write_failed)?;
        let size = self
            .channel
            .read_file(file.full_path(), &mut output)
            .await
            .map_err(|e| {
                ConnectionError::download_failed(format!("Unable to download file {}", file.name()), e)
            })?;
        output.flush().await.map_err(local_write_failed)?;
        drop(output);
        staging
            .persist(&local_target)
            .map_err(|e| local_write_failed(e.error))?;

        debug!(
            "sftp downloaded {} ({size} bytes) to {}",
            file.full_path(),
            local_target.display()
        );
        Ok(local_target)
    }

    async fn upload(
        &mut self,
        local_file: &Path,
        remote_directory: &str,
    ) -> Result<String, ConnectionError> {
        let remote_target = remote_upload_target(local_file, remote_directory)?;
        let remote_target = path::resolve(&self.current_directory, &remote_target);

        let mut input = tokio::fs::File::open(local_file).await.map_err(|e| {
            ConnectionError::upload_failed(
                format!("Could not find file: {}", local_file.display()),
                e,
            )
        })?;
        let size = self
            .channel
            .write_file(&remote_target, &mut input)
            .await
            .map_err(|e| {
                if e.is_rejected() {
                    ConnectionError::upload_failed("Upload failed.".to_string(), e)
                } else {
                    ConnectionError::upload_failed("Upload may not have completed.".to_string(), e)
                }
            })?;

        debug!(
            "sftp uploaded {} ({size} bytes) to {remote_target}",
            local_file.display()
        );
        Ok(remote_target)
    }

    #[inline]
    fn current_directory(&self) -> &str {
        &self.current_directory
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

    use super::*;

    const HOME: &str = "/home/jftp";

    #[derive(Default)]
    struct FakeSftpChannel {
        calls: Mutex<Vec<String>>,
        stored: Mutex<Vec<u8>>,
        missing_dir: bool,
        not_a_dir: bool,
        list_fails: bool,
        read_fails: bool,
        read_broken: bool,
        write_rejected: bool,
        write_broken: bool,
    }

    impl FakeSftpChannel {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SftpChannel for FakeSftpChannel {
        async fn real_path(&self, path: &str) -> Result<String, BackendError> {
            self.record(format!("realpath {path}"));
            if self.missing_dir {
                return Err(BackendError::rejected("NoSuchFile: No such file"));
            }
            Ok(if path.starts_with('/') {
                path.to_string()
            } else {
                format!("{HOME}/{path}")
            })
        }

        async fn is_dir(&self, path: &str) -> Result<bool, BackendError> {
            self.record(format!("stat {path}"));
            Ok(!self.not_a_dir)
        }

        async fn list_dir(&self, path: &str) -> Result<Vec<SftpDirEntry>, BackendError> {
            self.record(format!("ls {path}"));
            if self.list_fails {
                return Err(BackendError::Io(io::Error::from(
                    io::ErrorKind::ConnectionAborted,
                )));
            }
            Ok(vec![
                SftpDirEntry {
                    filename: "File 1".to_string(),
                    size: 1000,
                    mtime: 1394525265,
                    directory: false,
                },
                SftpDirEntry {
                    filename: "File 2".to_string(),
                    size: 2000,
                    mtime: 1394652161,
                    directory: true,
                },
                SftpDirEntry {
                    filename: "File 3".to_string(),
                    size: 3000,
                    mtime: 1391879364,
                    directory: false,
                },
            ])
        }

        async fn read_file(
            &self,
            path: &str,
            output: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<u64, BackendError> {
            self.record(format!("get {path}"));
            if self.read_fails {
                return Err(BackendError::rejected("NoSuchFile: No such file"));
            }
            if self.read_broken {
                output.write_all(b"sftp").await?;
                return Err(BackendError::Io(io::Error::from(
                    io::ErrorKind::ConnectionAborted,
                )));
            }
            output.write_all(b"sftp content").await?;
            Ok(12)
        }

        async fn write_file(
            &self,
            path: &str,
            input: &mut (dyn AsyncRead + Unpin + Send),
        ) -> Result<u64, BackendError> {
            self.record(format!("put {path}"));
            if self.write_rejected {
                return Err(BackendError::rejected("PermissionDenied: Permission denied"));
            }
            let mut data = Vec::new();
            input.read_to_end(&mut data).await?;
            if self.write_broken {
                return Err(BackendError::Io(io::Error::from(
                    io::ErrorKind::ConnectionAborted,
                )));
            }
            let len = data.len() as u64;
            *self.stored.lock().unwrap() = data;
            Ok(len)
        }
    }

    fn connection(channel: FakeSftpChannel) -> (SftpConnection<FakeSftpChannel>, Arc<FakeSftpChannel>) {
        let channel = Arc::new(channel);
        (SftpConnection::new(Arc::clone(&channel)), channel)
    }

    #[tokio::test]
    async fn set_directory_resolves_real_path() {
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        assert_eq!(conn.current_directory(), ".");
        conn.set_remote_directory("some/directory").await.unwrap();
        assert_eq!(conn.current_directory(), "/home/jftp/some/directory");
        assert_eq!(
            channel.calls(),
            vec![
                "realpath some/directory".to_string(),
                "stat /home/jftp/some/directory".to_string(),
            ]
        );

        conn.set_remote_directory("deeper").await.unwrap();
        assert_eq!(conn.current_directory(), "/home/jftp/some/directory/deeper");
    }

    #[tokio::test]
    async fn set_directory_missing() {
        let (mut conn, _) = connection(FakeSftpChannel {
            missing_dir: true,
            ..Default::default()
        });
        let e = conn.set_remote_directory("some/directory").await.unwrap_err();
        assert!(matches!(e, ConnectionError::NoSuchDirectory { .. }));
        assert_eq!(e.to_string(), "Directory some/directory does not exist.");
        assert_eq!(conn.current_directory(), ".");
    }

    #[tokio::test]
    async fn set_directory_not_a_directory() {
        let (mut conn, _) = connection(FakeSftpChannel {
            not_a_dir: true,
            ..Default::default()
        });
        let e = conn.set_remote_directory("file.txt").await.unwrap_err();
        assert_eq!(e.to_string(), "Directory file.txt does not exist.");
    }

    #[tokio::test]
    async fn list_maps_entries() {
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        conn.set_remote_directory("/srv/data").await.unwrap();
        let files = conn.list_files().await.unwrap();
        assert_eq!(channel.calls().last().unwrap(), "ls /srv/data");

        let expected = [
            ("File 1", 1000, false, "11/03/2014 08:07:45"),
            ("File 2", 2000, true, "12/03/2014 19:22:41"),
            ("File 3", 3000, false, "08/02/2014 17:09:24"),
        ];
        assert_eq!(files.len(), expected.len());
        for (file, (name, size, directory, modified)) in files.iter().zip(expected) {
            assert_eq!(file.name(), name);
            assert_eq!(file.size(), size);
            assert_eq!(file.is_directory(), directory);
            assert_eq!(file.full_path(), format!("/srv/data/{name}"));
            assert_eq!(
                file.last_modified().format("%d/%m/%Y %H:%M:%S").to_string(),
                modified
            );
        }
    }

    #[tokio::test]
    async fn list_relative_path() {
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        let files = conn.list_files_in("relativePath").await.unwrap();
        assert_eq!(channel.calls(), vec!["ls relativePath".to_string()]);
        assert_eq!(files[0].full_path(), "relativePath/File 1");
    }

    #[tokio::test]
    async fn list_failure() {
        let (mut conn, _) = connection(FakeSftpChannel {
            list_fails: true,
            ..Default::default()
        });
        let e = conn.list_files_in("relativePath").await.unwrap_err();
        assert!(matches!(e, ConnectionError::FileListing { .. }));
        assert_eq!(e.to_string(), "Unable to list files in directory relativePath");
    }

    #[tokio::test]
    async fn download_reads_full_path() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        let file = FtpFile::new("remote.txt", 12, "/srv/data/remote.txt", DateTime::<Utc>::default(), false);
        let local = conn.download(&file, dir.path()).await.unwrap();
        assert_eq!(local, dir.path().join("remote.txt"));
        assert_eq!(channel.calls(), vec!["get /srv/data/remote.txt".to_string()]);
        assert_eq!(std::fs::read(&local).unwrap(), b"sftp content");
    }

    #[tokio::test]
    async fn download_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, _) = connection(FakeSftpChannel {
            read_fails: true,
            ..Default::default()
        });
        let file = FtpFile::new("remote.txt", 12, "/srv/data/remote.txt", DateTime::<Utc>::default(), false);
        let e = conn.download(&file, dir.path()).await.unwrap_err();
        assert!(matches!(e, ConnectionError::DownloadFailed { .. }));
        assert_eq!(e.to_string(), "Unable to download file remote.txt");
    }

    #[tokio::test]
    async fn upload_writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("upload.txt");
        std::fs::write(&local, b"payload").unwrap();

        let (mut conn, channel) = connection(FakeSftpChannel::default());
        conn.set_remote_directory("/srv").await.unwrap();
        let remote = conn.upload(&local, "incoming/").await.unwrap();
        assert_eq!(remote, "/srv/incoming/upload.txt");
        assert_eq!(channel.calls().last().unwrap(), "put /srv/incoming/upload.txt");
        assert_eq!(*channel.stored.lock().unwrap(), b"payload");
    }

    #[tokio::test]
    async fn download_failure_keeps_existing_file() {
        let failing = [
            FakeSftpChannel {
                read_fails: true,
                ..Default::default()
            },
            FakeSftpChannel {
                read_broken: true,
                ..Default::default()
            },
        ];
        for channel in failing {
            let dir = tempfile::tempdir().unwrap();
            let existing = dir.path().join("report.txt");
            std::fs::write(&existing, b"local data").unwrap();

            let (mut conn, _) = connection(channel);
            let file = FtpFile::new(
                "report.txt",
                12,
                "/srv/data/report.txt",
                DateTime::<Utc>::default(),
                false,
            );
            let e = conn.download(&file, dir.path()).await.unwrap_err();
            assert_eq!(e.to_string(), "Unable to download file report.txt");

            assert_eq!(std::fs::read(&existing).unwrap(), b"local data");
            assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        }
    }

    #[tokio::test]
    async fn download_local_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        let file = FtpFile::new(
            "remote.txt",
            12,
            "/srv/data/remote.txt",
            DateTime::<Utc>::default(),
            false,
        );
        let e = conn.download(&file, &missing).await.unwrap_err();
        assert!(matches!(e, ConnectionError::DownloadFailed { .. }));
        assert_eq!(
            e.to_string(),
            format!(
                "Unable to write to local directory {}",
                missing.join("remote.txt").display()
            )
        );
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn download_refuses_unsafe_name() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        let file = FtpFile::new(
            "..",
            0,
            "/srv/data/..",
            DateTime::<Utc>::default(),
            true,
        );
        let e = conn.download(&file, dir.path()).await.unwrap_err();
        assert!(matches!(e, ConnectionError::DownloadFailed { .. }));
        assert_eq!(e.to_string(), "Unable to download file ..");
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn upload_interrupted() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("upload.txt");
        std::fs::write(&local, b"payload").unwrap();

        let (mut conn, _) = connection(FakeSftpChannel {
            write_broken: true,
            ..Default::default()
        });
        let e = conn.upload(&local, "/srv").await.unwrap_err();
        assert!(matches!(e, ConnectionError::UploadFailed { .. }));
        assert_eq!(e.to_string(), "Upload may not have completed.");
    }

    #[tokio::test]
    async fn upload_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("upload.txt");
        std::fs::write(&local, b"payload").unwrap();

        let (mut conn, _) = connection(FakeSftpChannel {
            write_rejected: true,
            ..Default::default()
        });
        let e = conn.upload(&local, "/srv").await.unwrap_err();
        assert!(matches!(e, ConnectionError::UploadFailed { .. }));
        assert_eq!(e.to_string(), "Upload failed.");
    }

    #[tokio::test]
    async fn upload_missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let (mut conn, channel) = connection(FakeSftpChannel::default());
        let missing = dir.path().join("nope.txt");
        let e = conn.upload(&missing, "/srv").await.unwrap_err();
        assert_eq!(
            e.to_string(),
            format!("Could not find file: {}", missing.display())
        );
        assert!(channel.calls().is_empty());
    }
}
