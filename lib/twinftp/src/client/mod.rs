/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use async_trait::async_trait;

use crate::{ClientConfig, ClientError, Connection, Protocol};

mod ftp;
pub use ftp::FtpClient;

mod sftp;
pub use sftp::SftpClient;

/// Owner of the session lifecycle for one remote server.
#[async_trait]
pub trait Client: Send {
    fn config(&self) -> &ClientConfig;

    fn config_mut(&mut self) -> &mut ClientConfig;

    fn set_credentials(&mut self, username: &str, password: &str) {
        self.config_mut().set_credentials(username, password);
    }

    fn set_host(&mut self, host: &str) {
        self.config_mut().set_host(host);
    }

    fn set_port(&mut self, port: u16) {
        self.config_mut().set_port(port);
    }

    /// Open and authenticate a session with the configured server.
    async fn connect(&mut self) -> Result<Box<dyn Connection>, ClientError>;

    /// Close the session opened by the last successful [`Client::connect`].
    async fn disconnect(&mut self) -> Result<(), ClientError>;
}

pub fn new_client(config: ClientConfig) -> Box<dyn Client> {
    match config.protocol() {
        Protocol::Ftp => Box::new(FtpClient::new(config)),
        Protocol::Sftp => Box::new(SftpClient::new(config)),
    }
}
