/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod ftp;
pub use ftp::{FtpListEntry, FtpSession};

mod sftp;
pub use sftp::{SftpChannel, SftpDirEntry};
