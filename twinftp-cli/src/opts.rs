/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fs;
use std::path::Path;

use anyhow::{Context, anyhow};
use yaml_rust::YamlLoader;

use twinftp::ClientConfig;

/// Split a `HOST[:PORT]` server argument.
///
/// IPv6 addresses with a port must be enclosed in brackets.
pub(crate) fn parse_server(s: &str) -> anyhow::Result<(String, Option<u16>)> {
    if let Some(rest) = s.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| anyhow!("unclosed bracket in server address {s}"))?;
        let port = match tail {
            "" => None,
            _ => {
                let port = tail
                    .strip_prefix(':')
                    .ok_or_else(|| anyhow!("invalid server address {s}"))?;
                Some(parse_port(port)?)
            }
        };
        return Ok((host.to_string(), port));
    }

    match s.rsplit_once(':') {
        Some((host, _)) if host.contains(':') => Ok((s.to_string(), None)),
        Some((host, port)) => Ok((host.to_string(), Some(parse_port(port)?))),
        None => Ok((s.to_string(), None)),
    }
}

fn parse_port(s: &str) -> anyhow::Result<u16> {
    s.parse::<u16>()
        .map_err(|e| anyhow!("invalid port {s}: {e}"))
}

pub(crate) fn load_config_file(path: &Path) -> anyhow::Result<ClientConfig> {
    let content = fs::read_to_string(path)
        .context(format!("failed to read config file {}", path.display()))?;
    let docs = YamlLoader::load_from_str(&content)
        .context(format!("invalid yaml file {}", path.display()))?;
    match docs.first() {
        Some(doc) => ClientConfig::parse_yaml(doc)
            .context(format!("invalid client config in file {}", path.display())),
        None => Ok(ClientConfig::default()),
    }
}
