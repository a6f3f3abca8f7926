/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

mod backend;
mod client;
mod connection;

pub use backend::BackendError;
pub use client::ClientError;
pub use connection::ConnectionError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
