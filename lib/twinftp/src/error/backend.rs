/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use russh_sftp::protocol::StatusCode;
use thiserror::Error;

/// Failure reported by one of the wrapped protocol libraries.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Io(#[from] io::Error),
    #[error("rejected by server: {0}")]
    Rejected(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl BackendError {
    pub fn rejected(reason: impl Into<String>) -> Self {
        BackendError::Rejected(reason.into())
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, BackendError::Rejected(_))
    }
}

impl From<suppaftp::FtpError> for BackendError {
    fn from(e: suppaftp::FtpError) -> Self {
        match e {
            suppaftp::FtpError::ConnectionError(e) => BackendError::Io(e),
            suppaftp::FtpError::UnexpectedResponse(_) => BackendError::Rejected(e.to_string()),
            _ => BackendError::Protocol(e.to_string()),
        }
    }
}

impl From<russh_sftp::client::error::Error> for BackendError {
    fn from(e: russh_sftp::client::error::Error) -> Self {
        use russh_sftp::client::error::Error;

        match e {
            Error::Status(status) => match status.status_code {
                StatusCode::NoConnection | StatusCode::ConnectionLost => BackendError::Io(
                    io::Error::new(io::ErrorKind::ConnectionAborted, status.error_message),
                ),
                code => BackendError::Rejected(format!("{code:?}: {}", status.error_message)),
            },
            Error::IO(_) => BackendError::Io(io::Error::other(e.to_string())),
            Error::Timeout => BackendError::Io(io::Error::from(io::ErrorKind::TimedOut)),
            _ => BackendError::Protocol(e.to_string()),
        }
    }
}

impl From<russh::Error> for BackendError {
    fn from(e: russh::Error) -> Self {
        match e {
            russh::Error::IO(e) => BackendError::Io(e),
            _ => BackendError::Protocol(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ftp_connection_error_is_io() {
        let e = suppaftp::FtpError::ConnectionError(io::Error::from(io::ErrorKind::BrokenPipe));
        let e = BackendError::from(e);
        assert!(matches!(e, BackendError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(!e.is_rejected());
    }

    #[test]
    fn ftp_bad_response_is_protocol() {
        let e = BackendError::from(suppaftp::FtpError::BadResponse);
        assert!(matches!(e, BackendError::Protocol(_)));
    }

    #[test]
    fn sftp_timeout_is_io() {
        let e = BackendError::from(russh_sftp::client::error::Error::Timeout);
        assert!(matches!(e, BackendError::Io(ref e) if e.kind() == io::ErrorKind::TimedOut));
    }

    fn sftp_status(status_code: StatusCode, message: &str) -> BackendError {
        BackendError::from(russh_sftp::client::error::Error::Status(
            russh_sftp::protocol::Status {
                id: 3,
                status_code,
                error_message: message.to_string(),
                language_tag: "en-US".to_string(),
            },
        ))
    }

    #[test]
    fn sftp_refusal_is_rejected() {
        let e = sftp_status(StatusCode::NoSuchFile, "No such file");
        assert!(e.is_rejected());
        assert_eq!(e.to_string(), "rejected by server: NoSuchFile: No such file");

        let e = sftp_status(StatusCode::PermissionDenied, "Permission denied");
        assert!(e.is_rejected());

        let e = sftp_status(StatusCode::Failure, "Failure");
        assert!(e.is_rejected());
    }

    #[test]
    fn sftp_lost_connection_is_io() {
        let e = sftp_status(StatusCode::ConnectionLost, "Connection lost");
        assert!(
            matches!(e, BackendError::Io(ref e) if e.kind() == io::ErrorKind::ConnectionAborted)
        );
        assert!(!e.is_rejected());

        let e = sftp_status(StatusCode::NoConnection, "No connection");
        assert!(matches!(e, BackendError::Io(_)));
    }

    #[test]
    fn display() {
        let e = BackendError::rejected("550 No such file");
        assert!(e.is_rejected());
        assert_eq!(e.to_string(), "rejected by server: 550 No such file");
    }
}
