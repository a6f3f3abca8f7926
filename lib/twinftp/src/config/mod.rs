/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "yaml")]
mod yaml;

const DEFAULT_USERNAME: &str = "anonymous";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Protocol {
    #[default]
    Ftp,
    Sftp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Ftp => "ftp",
            Protocol::Sftp => "sftp",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp => 22,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ftp" => Ok(Protocol::Ftp),
            "sftp" | "ssh" => Ok(Protocol::Sftp),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials {
            username: DEFAULT_USERNAME.to_string(),
            password: String::new(),
        }
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            username: username.into(),
            password: password.into(),
        }
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FtpOptions {
    pub passive: bool,
    pub binary: bool,
}

impl Default for FtpOptions {
    fn default() -> Self {
        FtpOptions {
            passive: true,
            binary: true,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SftpOptions {
    /// Server keys are accepted without verification when unset.
    pub known_hosts: Option<PathBuf>,
    /// Public key authentication is used instead of the password when set.
    pub private_key: Option<PathBuf>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    protocol: Protocol,
    host: String,
    port: u16,
    credentials: Credentials,
    connect_timeout: Duration,
    pub ftp: FtpOptions,
    pub sftp: SftpOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(Protocol::default())
    }
}

impl ClientConfig {
    pub fn new(protocol: Protocol) -> Self {
        ClientConfig {
            protocol,
            host: String::new(),
            port: 0,
            credentials: Credentials::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            ftp: FtpOptions::default(),
            sftp: SftpOptions::default(),
        }
    }

    #[inline]
    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn set_protocol(&mut self, protocol: Protocol) {
        self.protocol = protocol;
    }

    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    /// The configured port, or the protocol default if none was set.
    pub fn port(&self) -> u16 {
        if self.port == 0 {
            self.protocol.default_port()
        } else {
            self.port
        }
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    #[inline]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) {
        self.credentials = Credentials::new(username, password);
    }

    #[inline]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn set_connect_timeout(&mut self, timeout: Duration) {
        self.connect_timeout = timeout;
    }

    pub fn set_known_hosts(&mut self, path: impl AsRef<Path>) {
        self.sftp.known_hosts = Some(path.as_ref().to_path_buf());
    }

    pub fn set_private_key(&mut self, path: impl AsRef<Path>) {
        self.sftp.private_key = Some(path.as_ref().to_path_buf());
    }
}
