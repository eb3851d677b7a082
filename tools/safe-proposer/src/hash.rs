//! Safe transaction hashing (EIP-712, Safe >= 1.3.0 domain).

use alloy_primitives::{Address, B256, U256};
use safe_proposal_types::SafeTransactionData;
use sha3::{Digest, Keccak256};

const DOMAIN_TYPE: &[u8] = b"EIP712Domain(uint256 chainId,address verifyingContract)";
const SAFE_TX_TYPE: &[u8] = b"SafeTx(address to,uint256 value,bytes data,uint8 operation,uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,address refundReceiver,uint256 nonce)";

pub(crate) fn keccak256_bytes(bytes: &[u8]) -> B256 {
    let mut h = Keccak256::new();
    h.update(bytes);
    B256::from_slice(h.finalize().as_slice())
}

fn address_word(address: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..32].copy_from_slice(address.as_slice());
    padded
}

/// Domain separator binding a hash to one Safe on one chain.
pub fn domain_separator(chain_id: u64, safe: Address) -> B256 {
    let mut buf = Vec::with_capacity(32 * 3);
    buf.extend_from_slice(keccak256_bytes(DOMAIN_TYPE).as_slice());
    buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    buf.extend_from_slice(&address_word(safe));
    keccak256_bytes(&buf)
}

/// `hashStruct(SafeTx)`.
pub fn safe_tx_struct_hash(tx: &SafeTransactionData) -> B256 {
    let mut buf = Vec::with_capacity(32 * 11);
    buf.extend_from_slice(keccak256_bytes(SAFE_TX_TYPE).as_slice());
    buf.extend_from_slice(&address_word(tx.to));
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    // dynamic `bytes` are hashed in place
    buf.extend_from_slice(keccak256_bytes(&tx.data).as_slice());
    buf.extend_from_slice(&U256::from(tx.operation.as_u8()).to_be_bytes::<32>());
    buf.extend_from_slice(&tx.safe_tx_gas.to_be_bytes::<32>());
    buf.extend_from_slice(&tx.base_gas.to_be_bytes::<32>());
    buf.extend_from_slice(&tx.gas_price.to_be_bytes::<32>());
    buf.extend_from_slice(&address_word(tx.gas_token));
    buf.extend_from_slice(&address_word(tx.refund_receiver));
    buf.extend_from_slice(&tx.nonce.to_be_bytes::<32>());
    keccak256_bytes(&buf)
}

/// Compute the `safeTxHash` (must match `Safe.getTransactionHash` on-chain).
pub fn safe_tx_hash(chain_id: u64, safe: Address, tx: &SafeTransactionData) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(domain_separator(chain_id, safe).as_slice());
    buf.extend_from_slice(safe_tx_struct_hash(tx).as_slice());
    keccak256_bytes(&buf)
}
