/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;
use tokio::task::JoinError;

use super::BoxError;

/// Error returned by the operations of a [`crate::Connection`].
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("{message}")]
    NoSuchDirectory {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{message}")]
    RemoteDirectory {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{message}")]
    FileListing {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{message}")]
    DownloadFailed {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{message}")]
    UploadFailed {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("connection is closed")]
    Closed,
    #[error("blocking task failed: {0}")]
    TaskFailed(#[from] JoinError),
}

impl ConnectionError {
    pub(crate) fn no_such_directory(message: String, source: impl Into<BoxError>) -> Self {
        ConnectionError::NoSuchDirectory {
            message,
            source: source.into(),
        }
    }

    pub(crate) fn remote_directory(message: String, source: impl Into<BoxError>) -> Self {
        ConnectionError::RemoteDirectory {
            message,
            source: source.into(),
        }
    }

    pub(crate) fn file_listing(message: String, source: impl Into<BoxError>) -> Self {
        ConnectionError::FileListing {
            message,
            source: source.into(),
        }
    }

    pub(crate) fn download_failed(message: String, source: impl Into<BoxError>) -> Self {
        ConnectionError::DownloadFailed {
            message,
            source: source.into(),
        }
    }

    pub(crate) fn upload_failed(message: String, source: impl Into<BoxError>) -> Self {
        ConnectionError::UploadFailed {
            message,
            source: source.into(),
        }
    }
}
