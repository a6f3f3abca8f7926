/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use suppaftp::types::{FileType, FormatControl};
use suppaftp::{FtpStream, Mode};
use tokio::sync::Mutex;

use super::Client;
use crate::connection::SharedFtpSession;
use crate::{
    BackendError, ClientConfig, ClientError, Connection, Credentials, FtpConnection, FtpOptions,
    FtpSession,
};

pub struct FtpClient {
    config: ClientConfig,
    session: Option<SharedFtpSession<FtpStream>>,
}

impl FtpClient {
    pub fn new(config: ClientConfig) -> Self {
        FtpClient {
            config,
            session: None,
        }
    }
}

/// Connect the control channel with every socket operation bounded by `timeout`.
fn connect_control(host: &str, port: u16, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no address found for host {host}"),
        )
    }))
}

fn open_stream(
    host: &str,
    port: u16,
    timeout: Duration,
    credentials: &Credentials,
    options: &FtpOptions,
) -> Result<FtpStream, BackendError> {
    let control = connect_control(host, port, timeout)?;
    let mut stream = FtpStream::connect_with_stream(control)?;
    stream.login(credentials.username(), credentials.password())?;
    let file_type = if options.binary {
        FileType::Binary
    } else {
        FileType::Ascii(FormatControl::Default)
    };
    stream.transfer_type(file_type)?;
    stream.set_mode(if options.passive {
        Mode::Passive
    } else {
        Mode::Active
    });
    Ok(stream)
}

#[async_trait]
impl Client for FtpClient {
    #[inline]
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    async fn connect(&mut self) -> Result<Box<dyn Connection>, ClientError> {
        let host = self.config.host().to_string();
        let port = self.config.port();

        let task = {
            let host = host.clone();
            let credentials = self.config.credentials().clone();
            let options = self.config.ftp.clone();
            let timeout = self.config.connect_timeout();
            tokio::task::spawn_blocking(move || {
                open_stream(&host, port, timeout, &credentials, &options)
            })
        };
        let stream = match tokio::time::timeout(self.config.connect_timeout(), task).await {
            Ok(Ok(Ok(stream))) => stream,
            Ok(Ok(Err(e))) => return Err(ClientError::connection_initialisation(&host, port, e)),
            Ok(Err(e)) => return Err(ClientError::connection_initialisation(&host, port, e)),
            Err(e) => return Err(ClientError::connection_initialisation(&host, port, e)),
        };
        info!(
            "logged in to ftp server {host}:{port} as {}",
            self.config.credentials().username()
        );

        let session = Arc::new(Mutex::new(Some(stream)));
        self.session = Some(Arc::clone(&session));
        Ok(Box::new(FtpConnection::with_shared(session)))
    }

    async fn disconnect(&mut self) -> Result<(), ClientError> {
        let Some(session) = self.session.take() else {
            return Err(ClientError::NotConnected);
        };
        let host = self.config.host();

        let mut guard = session.lock_owned().await;
        let r = tokio::task::spawn_blocking(move || match guard.take() {
            Some(mut stream) => stream.close(),
            None => Ok(()),
        })
        .await;
        match r {
            Ok(Ok(())) => {
                info!("disconnected from ftp server {host}");
                Ok(())
            }
            Ok(Err(e)) => Err(ClientError::disconnection(host, e)),
            Err(e) => Err(ClientError::disconnection(host, e)),
        }
    }
}
