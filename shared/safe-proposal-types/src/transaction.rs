use alloy_primitives::{Address, Bytes, U256};

use crate::Operation;

/// The transaction a Safe executes, in the field order of the `SafeTx` EIP-712 type.
///
/// Proposals leave the gas and refund fields at zero so the executor pays gas
/// directly and no refund is taken from the Safe.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SafeTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

impl SafeTransactionData {
    /// Transaction with no gas refund configured.
    pub fn new(to: Address, value: U256, data: Bytes, operation: Operation, nonce: U256) -> Self {
        Self {
            to,
            value,
            data,
            operation,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce,
        }
    }
}
