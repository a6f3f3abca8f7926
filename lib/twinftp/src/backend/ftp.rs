/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};
use std::str::FromStr;
use std::time::SystemTime;

use log::warn;
use suppaftp::{FtpError, FtpStream};

use crate::BackendError;

/// A listing record as the FTP library reports it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FtpListEntry {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
    pub directory: bool,
}

/// The blocking FTP session calls used by [`crate::FtpConnection`].
pub trait FtpSession: Send + 'static {
    fn change_dir(&mut self, path: &str) -> Result<(), BackendError>;

    fn current_dir(&mut self) -> Result<String, BackendError>;

    fn list_entries(&mut self, path: &str) -> Result<Vec<FtpListEntry>, BackendError>;

    fn retrieve(&mut self, path: &str, output: &mut dyn Write) -> Result<u64, BackendError>;

    fn store(&mut self, path: &str, input: &mut dyn Read) -> Result<u64, BackendError>;

    fn close(&mut self) -> Result<(), BackendError>;
}

fn parse_list_line(line: &str) -> Option<FtpListEntry> {
    match suppaftp::list::File::from_str(line) {
        Ok(f) => Some(FtpListEntry {
            name: f.name().to_string(),
            size: f.size() as u64,
            modified: f.modified(),
            directory: f.is_directory(),
        }),
        Err(e) => {
            warn!("skipped unparsable LIST line '{line}': {e:?}");
            None
        }
    }
}

impl FtpSession for FtpStream {
    fn change_dir(&mut self, path: &str) -> Result<(), BackendError> {
        self.cwd(path)?;
        Ok(())
    }

    fn current_dir(&mut self) -> Result<String, BackendError> {
        let dir = self.pwd()?;
        Ok(dir)
    }

    fn list_entries(&mut self, path: &str) -> Result<Vec<FtpListEntry>, BackendError> {
        let lines = self.list(Some(path))?;
        Ok(lines.iter().filter_map(|l| parse_list_line(l)).collect())
    }

    fn retrieve(&mut self, path: &str, output: &mut dyn Write) -> Result<u64, BackendError> {
        let copied = self.retr(path, |reader| {
            io::copy(reader, output).map_err(FtpError::ConnectionError)
        })?;
        Ok(copied)
    }

    fn store(&mut self, path: &str, mut input: &mut dyn Read) -> Result<u64, BackendError> {
        let stored = self.put_file(path, &mut input)?;
        Ok(stored)
    }

    fn close(&mut self) -> Result<(), BackendError> {
        self.quit()?;
        Ok(())
    }
}
