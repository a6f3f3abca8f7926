/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use super::{ClientConfig, FtpOptions, Protocol, SftpOptions};

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        Yaml::Real(s) => Ok(s.to_string()),
        _ => Err(anyhow!(
            "yaml value type for string should be 'string' / 'integer' / 'real'"
        )),
    }
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

fn as_u16(v: &Yaml) -> anyhow::Result<u16> {
    match v {
        Yaml::String(s) => Ok(u16::from_str(s)?),
        Yaml::Integer(i) => Ok(u16::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'u16' should be 'string' or 'integer'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

fn as_path(v: &Yaml) -> anyhow::Result<PathBuf> {
    if let Yaml::String(s) = v {
        if s.is_empty() {
            return Err(anyhow!("empty path"));
        }
        Ok(PathBuf::from(s))
    } else {
        Err(anyhow!("yaml value type for path should be 'string'"))
    }
}

impl FtpOptions {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut options = FtpOptions::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "passive" | "passive_mode" => {
                    options.passive =
                        as_bool(v).context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                "binary" | "binary_transfer" => {
                    options.binary =
                        as_bool(v).context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(options)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl SftpOptions {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut options = SftpOptions::default();
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "known_hosts" => {
                    let path = as_path(v).context(format!("invalid path value for key {k}"))?;
                    options.known_hosts = Some(path);
                    Ok(())
                }
                "private_key" | "identity_file" => {
                    let path = as_path(v).context(format!("invalid path value for key {k}"))?;
                    options.private_key = Some(path);
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(options)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}

impl ClientConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = ClientConfig::default();
            let mut username: Option<String> = None;
            let mut password: Option<String> = None;
            foreach_kv(map, |k, v| match normalize_key(k).as_str() {
                "protocol" => {
                    let s = as_string(v)?;
                    config.protocol = Protocol::from_str(&s)
                        .map_err(|_| anyhow!("unsupported protocol {s}"))?;
                    Ok(())
                }
                "host" => {
                    config.host = as_string(v).context(format!("invalid string value for key {k}"))?;
                    Ok(())
                }
                "port" => {
                    config.port = as_u16(v).context(format!("invalid u16 value for key {k}"))?;
                    Ok(())
                }
                "username" | "user" => {
                    username =
                        Some(as_string(v).context(format!("invalid string value for key {k}"))?);
                    Ok(())
                }
                "password" => {
                    password =
                        Some(as_string(v).context(format!("invalid string value for key {k}"))?);
                    Ok(())
                }
                "connect_timeout" => {
                    config.connect_timeout = as_duration(v)
                        .context(format!("invalid humanize duration value for key {k}"))?;
                    Ok(())
                }
                "ftp" => {
                    config.ftp = FtpOptions::parse_yaml(v)
                        .context(format!("invalid ftp options value for key {k}"))?;
                    Ok(())
                }
                "sftp" => {
                    config.sftp = SftpOptions::parse_yaml(v)
                        .context(format!("invalid sftp options value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            match (username, password) {
                (Some(username), password) => {
                    config.set_credentials(username, password.unwrap_or_default())
                }
                (None, Some(_)) => return Err(anyhow!("password is set without username")),
                (None, None) => {}
            }
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}
