/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use thiserror::Error;

use super::BoxError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    ConnectionInitialisation {
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("The underlying connection was never initially made.")]
    NotConnected,
    #[error("{message}")]
    Disconnection {
        message: String,
        #[source]
        source: BoxError,
    },
}

impl ClientError {
    pub(crate) fn connection_initialisation(
        host: &str,
        port: u16,
        source: impl Into<BoxError>,
    ) -> Self {
        ClientError::ConnectionInitialisation {
            message: format!("Unable to connect to host {host} on port {port}"),
            source: source.into(),
        }
    }

    pub(crate) fn disconnection(host: &str, source: impl Into<BoxError>) -> Self {
        ClientError::Disconnection {
            message: format!("Unable to disconnect from host {host}"),
            source: source.into(),
        }
    }
}
