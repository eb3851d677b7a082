//! Externally supplied configuration, read and validated once at process start.
//!
//! The pipeline never touches the process environment after [`Config::from_env`] returns;
//! everything downstream receives the validated struct by reference.

use std::{fmt, path::PathBuf};

use alloy_primitives::{address, Address};
use zeroize::Zeroizing;

use crate::{
    builder::parse_address,
    error::{Error, Result},
};

pub const CHAIN_ID: &str = "CHAIN_ID";
pub const SAFE_ADDRESS: &str = "SAFE_ADDRESS";
pub const RPC_URL: &str = "RPC_URL";
pub const ETH_KEYSTORE_PATH: &str = "ETH_KEYSTORE_PATH";
pub const ETH_PASSWORD: &str = "ETH_PASSWORD";
pub const SAFE_TX_SERVICE_API_KEY: &str = "SAFE_TX_SERVICE_API_KEY";
pub const SAFE_TX_SERVICE_URL: &str = "SAFE_TX_SERVICE_URL";
pub const MULTISEND_ADDRESS: &str = "MULTISEND_ADDRESS";

/// Canonical `MultiSendCallOnly` v1.3.0 deployment.
pub const DEFAULT_MULTISEND: Address = address!("40A2aCCbd92BCA938b02010E17A5b8929b49130D");

const TX_SERVICE_BASE: &str = "https://api.safe.global/tx-service";

pub struct Config {
    pub chain_id: u64,
    pub safe_address: Address,
    pub rpc_url: String,
    pub keystore_path: PathBuf,
    pub tx_service_url: String,
    pub tx_service_api_key: Zeroizing<String>,
    pub multisend: Address,
    /// Pre-supplied keystore password. When set, no prompt is shown.
    pub env_password: Option<Zeroizing<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary lookup. Empty values count as missing, except for the
    /// password where an empty string is a legitimate (if unwise) choice.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or(Error::Configuration(name))
        };
        let optional = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let chain_id_raw = require(CHAIN_ID)?;
        let chain_id = chain_id_raw
            .trim()
            .parse::<u64>()
            .map_err(|e| Error::InvalidConfig {
                name: CHAIN_ID,
                reason: format!("{chain_id_raw:?}: {e}"),
            })?;

        let safe_address = parse_address(&require(SAFE_ADDRESS)?).map_err(|e| Error::InvalidConfig {
            name: SAFE_ADDRESS,
            reason: e.to_string(),
        })?;

        let rpc_url = require(RPC_URL)?;
        let keystore_path = PathBuf::from(require(ETH_KEYSTORE_PATH)?);
        let tx_service_api_key = Zeroizing::new(require(SAFE_TX_SERVICE_API_KEY)?);

        let tx_service_url = match optional(SAFE_TX_SERVICE_URL) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => default_tx_service_url(chain_id).ok_or_else(|| Error::InvalidConfig {
                name: SAFE_TX_SERVICE_URL,
                reason: format!("no default transaction service for chain {chain_id}; set it explicitly"),
            })?,
        };

        let multisend = match optional(MULTISEND_ADDRESS) {
            Some(raw) => parse_address(&raw).map_err(|e| Error::InvalidConfig {
                name: MULTISEND_ADDRESS,
                reason: e.to_string(),
            })?,
            None => DEFAULT_MULTISEND,
        };

        Ok(Self {
            chain_id,
            safe_address,
            rpc_url,
            keystore_path,
            tx_service_url,
            tx_service_api_key,
            multisend,
            env_password: lookup(ETH_PASSWORD).map(Zeroizing::new),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("chain_id", &self.chain_id)
            .field("safe_address", &self.safe_address)
            .field("rpc_url", &self.rpc_url)
            .field("keystore_path", &self.keystore_path)
            .field("tx_service_url", &self.tx_service_url)
            .field("tx_service_api_key", &"<redacted>")
            .field("multisend", &self.multisend)
            .field("env_password", &self.env_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Hosted transaction service for the chains the Safe team operates.
pub fn default_tx_service_url(chain_id: u64) -> Option<String> {
    let short_name = match chain_id {
        1 => "eth",
        10 => "oeth",
        56 => "bnb",
        100 => "gno",
        137 => "pol",
        8453 => "base",
        42161 => "arb1",
        84532 => "basesep",
        11155111 => "sep",
        _ => return None,
    };
    Some(format!("{TX_SERVICE_BASE}/{short_name}"))
}
