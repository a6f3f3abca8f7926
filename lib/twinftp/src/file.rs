/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use chrono::{DateTime, Utc};

/// A remote directory entry as returned by [`crate::Connection::list_files`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpFile {
    name: String,
    size: u64,
    full_path: String,
    last_modified: DateTime<Utc>,
    directory: bool,
}

impl FtpFile {
    pub fn new(
        name: impl Into<String>,
        size: u64,
        full_path: impl Into<String>,
        last_modified: DateTime<Utc>,
        directory: bool,
    ) -> Self {
        FtpFile {
            name: name.into(),
            size,
            full_path: full_path.into(),
            last_modified,
            directory,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The remote path, always `/` separated.
    #[inline]
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    #[inline]
    pub fn last_modified(&self) -> &DateTime<Utc> {
        &self.last_modified
    }

    #[inline]
    pub fn is_directory(&self) -> bool {
        self.directory
    }
}

impl fmt::Display for FtpFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.directory { 'd' } else { '-' };
        write!(
            f,
            "{kind} {:>12} {} {}",
            self.size,
            self.last_modified.format("%Y-%m-%d %H:%M:%S"),
            self.name
        )
    }
}
