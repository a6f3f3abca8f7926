/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use russh::keys::known_hosts::known_host_keys_path;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{Disconnect, client};
use russh_sftp::client::SftpSession;

use super::Client;
use crate::{BackendError, ClientConfig, ClientError, Connection, SftpConnection};

struct ServerKeyCheck {
    host: String,
    port: u16,
    known_hosts: Option<PathBuf>,
}

impl client::Handler for ServerKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        let Some(known_hosts) = &self.known_hosts else {
            warn!(
                "accepting unverified host key of {}:{}",
                self.host, self.port
            );
            return Ok(true);
        };

        let known = known_host_keys_path(&self.host, self.port, known_hosts)?;
        if known.iter().any(|(_, key)| key == server_public_key) {
            debug!("host key of {}:{} verified", self.host, self.port);
            Ok(true)
        } else {
            warn!(
                "host key of {}:{} not found in {}",
                self.host,
                self.port,
                known_hosts.display()
            );
            Ok(false)
        }
    }
}

type SshHandle = client::Handle<ServerKeyCheck>;

async fn open_session(
    config: &ClientConfig,
    host: &str,
    port: u16,
) -> Result<(SshHandle, SftpSession), BackendError> {
    let handler = ServerKeyCheck {
        host: host.to_string(),
        port,
        known_hosts: config.sftp.known_hosts.clone(),
    };
    let ssh_config = Arc::new(client::Config::default());
    let mut handle = client::connect(ssh_config, (host, port), handler).await?;

    let username = config.credentials().username();
    let auth = match &config.sftp.private_key {
        Some(key_path) => {
            let key = load_secret_key(key_path, None).map_err(|e| {
                BackendError::Protocol(format!(
                    "failed to load private key {}: {e}",
                    key_path.display()
                ))
            })?;
            let hash_alg = handle.best_supported_rsa_hash().await?.flatten();
            handle
                .authenticate_publickey(username, PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg))
                .await?
        }
        None => {
            handle
                .authenticate_password(username, config.credentials().password())
                .await?
        }
    };
    if !auth.success() {
        return Err(BackendError::rejected(format!(
            "authentication failed for user {username}"
        )));
    }

    let channel = handle.channel_open_session().await?;
    channel.request_subsystem(true, "sftp").await?;
    let sftp = SftpSession::new(channel.into_stream()).await?;
    Ok((handle, sftp))
}

pub struct SftpClient {
    config: ClientConfig,
    handle: Option<SshHandle>,
}

impl SftpClient {
    pub fn new(config: ClientConfig) -> Self {
        SftpClient {
            config,
            handle: None,
        }
    }
}

#[async_trait]
impl Client for SftpClient {
    #[inline]
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[inline]
    fn config_mut(&mut self) -> &mut ClientConfig {
        &mut self.config
    }

    async fn connect(&mut self) -> Result<Box<dyn Connection>, ClientError> {
        let host = self.config.host();
        let port = self.config.port();

        let (handle, sftp) = match tokio::time::timeout(
            self.config.connect_timeout(),
            open_session(&self.config, host, port),
        )
        .await
        {
            Ok(Ok(opened)) => opened,
            Ok(Err(e)) => return Err(ClientError::connection_initialisation(host, port, e)),
            Err(e) => return Err(ClientError::connection_initialisation(host, port, e)),
        };
        info!(
            "logged in to sftp server {host}:{port} as {}",
            self.config.credentials().username()
        );

        self.handle = Some(handle);
        Ok(Box::new(SftpConnection::new(Arc::new(sftp))))
    }

    async fn disconnect(&mut self) -> Result<(), ClientError> {
        let Some(handle) = self.handle.take() else {
            return Err(ClientError::NotConnected);
        };
        let host = self.config.host();

        handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| ClientError::disconnection(host, BackendError::from(e)))?;
        info!("disconnected from sftp server {host}");
        Ok(())
    }
}
