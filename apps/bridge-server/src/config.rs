// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup. Any
//! malformed value aborts startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `ledger.redb` | `./data` |
//! | `RPC_URL` | RPC endpoint used for every chain | registry defaults |
//! | `<SYMBOL>_ADDRESS` | Contract override per crypto token, e.g. `USDC_ADDRESS` | registry defaults |
//! | `SUPPORTED_CHAIN_IDS` | Comma-separated chain ids served by default | `8453` |
//! | `RPC_TIMEOUT_MS` | Bound on each RPC call | `5000` |
//! | `LEDGER_TIMEOUT_MS` | Bound on the fiat ledger read | `800` |
//! | `APP_ENV` | Environment name reported by `/health` | `development` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::balances::Overrides;
use crate::registry::chains::DEFAULT_SUPPORTED_CHAIN_IDS;
use crate::registry::TokenRegistry;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

/// RPC endpoint override applied to every chain.
pub const RPC_URL_ENV: &str = "RPC_URL";

/// Suffix of per-token contract override variables (`USDC_ADDRESS`).
pub const CONTRACT_OVERRIDE_SUFFIX: &str = "_ADDRESS";

pub const SUPPORTED_CHAIN_IDS_ENV: &str = "SUPPORTED_CHAIN_IDS";
pub const RPC_TIMEOUT_MS_ENV: &str = "RPC_TIMEOUT_MS";
pub const LEDGER_TIMEOUT_MS_ENV: &str = "LEDGER_TIMEOUT_MS";
pub const APP_ENV_ENV: &str = "APP_ENV";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_APP_ENV: &str = "development";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LEDGER_TIMEOUT_MS: u64 = 800;

/// File name of the ledger database inside `DATA_DIR`.
pub const LEDGER_FILE: &str = "ledger.redb";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: &str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(format!("expected json or pretty, got {other}")),
        }
    }
}

/// Validated process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub rpc_url: Option<String>,
    /// Token symbol → contract address override.
    pub contract_overrides: BTreeMap<String, Address>,
    pub supported_chain_ids: Vec<u64>,
    pub rpc_timeout: Duration,
    pub ledger_timeout: Duration,
    pub app_env: String,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env(tokens: &TokenRegistry) -> Result<Self, ConfigError> {
        Self::from_lookup(tokens, |name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(
        tokens: &TokenRegistry,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| ConfigError::invalid(PORT_ENV, &raw, e))?,
            None => DEFAULT_PORT,
        };

        let rpc_url = match get(RPC_URL_ENV) {
            Some(raw) => {
                url::Url::parse(&raw).map_err(|e| ConfigError::invalid(RPC_URL_ENV, &raw, e))?;
                Some(raw)
            }
            None => None,
        };

        let mut contract_overrides = BTreeMap::new();
        for symbol in tokens.crypto_symbols() {
            let var = format!("{symbol}{CONTRACT_OVERRIDE_SUFFIX}");
            if let Some(raw) = get(&var) {
                let address =
                    Address::from_str(&raw).map_err(|e| ConfigError::invalid(&var, &raw, e))?;
                contract_overrides.insert(symbol.to_string(), address);
            }
        }

        let supported_chain_ids = match get(SUPPORTED_CHAIN_IDS_ENV) {
            Some(raw) => parse_chain_ids(&raw)
                .map_err(|e| ConfigError::invalid(SUPPORTED_CHAIN_IDS_ENV, &raw, e))?,
            None => DEFAULT_SUPPORTED_CHAIN_IDS.to_vec(),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid(LOG_FORMAT_ENV, &raw, e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            data_dir: PathBuf::from(get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())),
            rpc_url,
            contract_overrides,
            supported_chain_ids,
            rpc_timeout: millis(get(RPC_TIMEOUT_MS_ENV), RPC_TIMEOUT_MS_ENV, DEFAULT_RPC_TIMEOUT_MS)?,
            ledger_timeout: millis(
                get(LEDGER_TIMEOUT_MS_ENV),
                LEDGER_TIMEOUT_MS_ENV,
                DEFAULT_LEDGER_TIMEOUT_MS,
            )?,
            app_env: get(APP_ENV_ENV).unwrap_or_else(|| DEFAULT_APP_ENV.to_string()),
            log_format,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|e| ConfigError::invalid(HOST_ENV, &self.host, e))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join(LEDGER_FILE)
    }

    /// Overrides handed to the balance aggregator.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            rpc_url: self.rpc_url.clone(),
            contracts: self.contract_overrides.clone(),
        }
    }
}

fn parse_chain_ids(raw: &str) -> Result<Vec<u64>, String> {
    let ids = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u64>().map_err(|e| format!("{part}: {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err("no chain ids given".to_string());
    }
    Ok(ids)
}

fn millis(raw: Option<String>, var: &str, default: u64) -> Result<Duration, ConfigError> {
    let ms = match raw {
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => return Err(ConfigError::invalid(var, &raw, "must be positive")),
            Ok(ms) => ms,
            Err(e) => return Err(ConfigError::invalid(var, &raw, e)),
        },
        None => default,
    };
    Ok(Duration::from_millis(ms))
}
