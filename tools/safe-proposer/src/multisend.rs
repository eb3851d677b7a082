//! Packing of call batches for Safe's `MultiSendCallOnly` contract.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::SolCall;
use safe_proposal_types::{Call, Operation};

use crate::abi::IMultiSend;

/// Pack calls as `MultiSend` expects them, concatenated in order:
///
/// - `uint8 operation` (always `CALL`; the call-only variant rejects anything else)
/// - `address to` (20 bytes)
/// - `uint256 value`
/// - `uint256 data length`
/// - `bytes data`
pub fn encode_packed(calls: &[Call]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(calls.iter().map(|c| 1 + 20 + 32 + 32 + c.data.len()).sum());
    for call in calls {
        buf.push(Operation::Call.as_u8());
        buf.extend_from_slice(call.to.as_slice());
        buf.extend_from_slice(&call.value.to_be_bytes::<32>());
        buf.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        buf.extend_from_slice(&call.data);
    }
    buf
}

/// Calldata for `multiSend(bytes)` over the packed batch.
pub fn encode_multisend(calls: &[Call]) -> Bytes {
    IMultiSend::multiSendCall {
        transactions: encode_packed(calls).into(),
    }
    .abi_encode()
    .into()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, Address};

    use super::*;

    const A: Address = address!("1111111111111111111111111111111111111111");
    const B: Address = address!("3333333333333333333333333333333333333333");

    #[test]
    fn test_encode_packed_layout() {
        let calls = vec![
            Call::new(A, vec![0xaa, 0xbb]).with_value(U256::from(3)),
            Call::new(B, Vec::new()),
        ];
        let packed = encode_packed(&calls);
        assert_eq!(packed.len(), (85 + 2) + 85);

        assert_eq!(packed[0], 0);
        assert_eq!(&packed[1..21], A.as_slice());
        assert_eq!(packed[52], 3);
        assert_eq!(packed[84], 2);
        assert_eq!(&packed[85..87], &[0xaa, 0xbb]);

        assert_eq!(packed[87], 0);
        assert_eq!(&packed[88..108], B.as_slice());
    }

    #[test]
    fn test_encode_packed_follows_call_order() {
        let ab = encode_packed(&[Call::new(A, vec![1]), Call::new(B, vec![2])]);
        let ba = encode_packed(&[Call::new(B, vec![2]), Call::new(A, vec![1])]);
        assert_ne!(ab, ba);
        assert_eq!(&ab[1..21], A.as_slice());
        assert_eq!(&ba[1..21], B.as_slice());
    }

    #[test]
    fn test_encode_multisend_selector() {
        let data = encode_multisend(&[Call::new(A, vec![1])]);
        // multiSend(bytes)
        assert_eq!(&data[..4], &[0x8d, 0x80, 0xff, 0x0a]);
    }
}
