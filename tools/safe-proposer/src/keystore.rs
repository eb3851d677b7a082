//! Keystore-backed signer: decrypts a Web3 Secret Storage file and binds the key to an RPC endpoint.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use alloy_primitives::{Address, B256};
use eth_keystore::KeystoreError;
use k256::ecdsa::{SigningKey, VerifyingKey};
use zeroize::Zeroizing;

use crate::{
    chain::ChainClient,
    error::{Error, Result},
    hash::keccak256_bytes,
    submit::ProposalSigner,
};

/// Ethereum address of a public key: last 20 bytes of keccak256 over the uncompressed point.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256_bytes(&point.as_bytes()[1..]);
    Address::from_slice(&hash.as_slice()[12..])
}

/// A decrypted signing key bound to a chain endpoint. Lives for one run only.
pub struct KeystoreSigner {
    key: SigningKey,
    address: Address,
    chain: ChainClient,
}

impl KeystoreSigner {
    pub fn from_private_key(private_key: &[u8], chain: ChainClient) -> Result<Self> {
        let key = SigningKey::from_slice(private_key)
            .map_err(|_| Error::Signing("not a valid secp256k1 private key".to_string()))?;
        let address = address_of(key.verifying_key());
        Ok(Self { key, address, chain })
    }

    pub fn chain(&self) -> &ChainClient {
        &self.chain
    }
}

impl ProposalSigner for KeystoreSigner {
    fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest as-is. Returns `r || s || v` with `v` in {27, 28}.
    fn sign_hash(&self, hash: B256) -> Result<[u8; 65]> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| Error::Signing(e.to_string()))?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

impl fmt::Debug for KeystoreSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeystoreSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Decrypt `keystore_path` with `passphrase` and bind the key to `rpc_url`.
///
/// The passphrase is consumed and zeroed before this returns, whatever the outcome.
/// A missing or unreadable file is [`Error::CredentialRead`]; anything that goes wrong
/// once the file could be read (bad JSON, non-UTF-8 bytes, wrong password) is
/// [`Error::Decryption`].
pub fn load_signer(
    keystore_path: &Path,
    passphrase: Zeroizing<String>,
    rpc_url: &str,
) -> Result<KeystoreSigner> {
    let chain = ChainClient::connect(rpc_url)?;

    fs::read(keystore_path).map_err(|source| Error::CredentialRead {
        path: keystore_path.to_path_buf(),
        source,
    })?;

    let decrypted = eth_keystore::decrypt_key(keystore_path, passphrase.as_bytes());
    drop(passphrase);
    let private_key = Zeroizing::new(decrypted.map_err(|e| keystore_error(keystore_path, e))?);

    let signer = KeystoreSigner::from_private_key(&private_key, chain).map_err(|e| Error::Decryption {
        path: keystore_path.to_path_buf(),
        reason: e.to_string(),
    })?;
    tracing::info!(address = %signer.address, "unlocked keystore");
    Ok(signer)
}

/// The file was readable, so every failure past that point is a decryption failure.
fn keystore_error(path: &Path, err: KeystoreError) -> Error {
    let path = path.to_path_buf();
    match err {
        KeystoreError::MacMismatch => Error::Decryption {
            path,
            reason: "wrong password (MAC mismatch)".to_string(),
        },
        other => Error::Decryption {
            path,
            reason: other.to_string(),
        },
    }
}

/// Write `private_key` into a new keystore file in `dir`, returning its path.
pub fn encrypt_keystore(
    dir: &Path,
    private_key: &[u8],
    passphrase: &str,
    name: Option<&str>,
) -> Result<PathBuf> {
    let mut rng = rand::thread_rng();
    let id = eth_keystore::encrypt_key(dir, &mut rng, private_key, passphrase, name)
        .map_err(|e| Error::Io(io::Error::other(e.to_string())))?;
    // The file is named after `name` when given, otherwise after the generated uuid.
    Ok(dir.join(name.map_or(id, str::to_string)))
}
