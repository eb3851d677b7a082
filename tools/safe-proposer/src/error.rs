use std::path::PathBuf;

/// Every failure the proposal pipeline can surface.
///
/// All variants are fatal for a run. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required environment value is absent or empty.
    #[error("missing required env var: {0}")]
    Configuration(&'static str),

    /// A configuration value is present but unusable.
    #[error("invalid {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },

    /// The keystore file could not be read.
    #[error("cannot read keystore {}: {source}", path.display())]
    CredentialRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The keystore was read but could not be decrypted (wrong password or corrupt file).
    #[error("cannot decrypt keystore {}: {reason}", path.display())]
    Decryption { path: PathBuf, reason: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("proposal contains no calls")]
    EmptyProposal,

    /// RPC endpoint or relay unreachable, or the transport failed mid-request.
    #[error("network error: {0}")]
    Network(String),

    /// The relay answered with a non-success status. `body` is its response, untouched.
    #[error("relay rejected proposal (HTTP {status}): {body}")]
    RelayRejection { status: u16, body: String },

    #[error("chain id mismatch: configured {configured}, RPC reports {rpc}")]
    ChainIdMismatch { configured: u64, rpc: u64 },

    /// A contract read returned data that does not decode as the expected type.
    #[error("unexpected return data from {function}: {reason}")]
    Contract { function: &'static str, reason: String },

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
