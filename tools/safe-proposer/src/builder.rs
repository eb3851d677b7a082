//! Validation and assembly of proposals from caller-supplied calls.

use std::str::FromStr;

use alloy_primitives::{Address, Bytes, B256, U256};
use safe_proposal_types::{Call, Operation, SafeTransactionData};

use crate::{
    config::DEFAULT_MULTISEND,
    error::{Error, Result},
    hash::safe_tx_hash,
    multisend::encode_multisend,
};

/// Parse a `0x`-prefixed 20-byte address. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address> {
    let invalid = || Error::InvalidAddress(input.to_string());
    let digits = input.strip_prefix("0x").ok_or_else(invalid)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        Address::parse_checksummed(input, None).map_err(|_| invalid())
    } else {
        Address::from_str(input).map_err(|_| invalid())
    }
}

/// A call as supplied by a command, before address validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallRequest {
    pub target: String,
    pub data: Bytes,
    /// Native value to attach; zero when `None`.
    pub value: Option<U256>,
}

impl CallRequest {
    pub fn new(target: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            target: target.into(),
            data: data.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    fn validate(&self) -> Result<Call> {
        let to = parse_address(&self.target)?;
        Ok(Call {
            to,
            data: self.data.clone(),
            value: self.value.unwrap_or(U256::ZERO),
        })
    }
}

/// An ordered, validated batch of calls addressed to one Safe on one chain.
///
/// Only obtainable through [`ProposalBuilder`], so `calls` is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proposal {
    chain_id: u64,
    safe: Address,
    calls: Vec<Call>,
    nonce: U256,
    multisend: Address,
}

impl Proposal {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn safe(&self) -> Address {
        self.safe
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn nonce(&self) -> U256 {
        self.nonce
    }

    /// Same calls, sequenced at `nonce`. Lets callers validate before reading the nonce from chain.
    pub fn with_nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    /// The Safe transaction this proposal executes as.
    ///
    /// A single call goes straight to its target. A batch is delegate-called through
    /// `MultiSendCallOnly`, which executes the packed calls in order.
    pub fn transaction(&self) -> SafeTransactionData {
        match self.calls.as_slice() {
            [call] => SafeTransactionData::new(
                call.to,
                call.value,
                call.data.clone(),
                Operation::Call,
                self.nonce,
            ),
            calls => SafeTransactionData::new(
                self.multisend,
                U256::ZERO,
                encode_multisend(calls),
                Operation::DelegateCall,
                self.nonce,
            ),
        }
    }

    /// The `safeTxHash`: what gets signed, and the relay's deduplication key.
    pub fn hash(&self) -> B256 {
        safe_tx_hash(self.chain_id, self.safe, &self.transaction())
    }
}

#[derive(Clone, Debug)]
pub struct ProposalBuilder {
    safe: Address,
    chain_id: u64,
    nonce: U256,
    multisend: Address,
    calls: Vec<CallRequest>,
}

impl ProposalBuilder {
    pub fn new(safe: Address, chain_id: u64) -> Self {
        Self {
            safe,
            chain_id,
            nonce: U256::ZERO,
            multisend: DEFAULT_MULTISEND,
            calls: Vec::new(),
        }
    }

    pub fn nonce(mut self, nonce: U256) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn multisend(mut self, multisend: Address) -> Self {
        self.multisend = multisend;
        self
    }

    pub fn call(mut self, call: CallRequest) -> Self {
        self.calls.push(call);
        self
    }

    pub fn calls(mut self, calls: impl IntoIterator<Item = CallRequest>) -> Self {
        self.calls.extend(calls);
        self
    }

    /// Validate every call, in order, and freeze the batch.
    pub fn build(self) -> Result<Proposal> {
        if self.calls.is_empty() {
            return Err(Error::EmptyProposal);
        }
        let calls = self
            .calls
            .iter()
            .map(CallRequest::validate)
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(safe = %self.safe, chain_id = self.chain_id, calls = calls.len(), "built proposal");
        Ok(Proposal {
            chain_id: self.chain_id,
            safe: self.safe,
            calls,
            nonce: self.nonce,
            multisend: self.multisend,
        })
    }
}

/// Build a nonce-zero proposal; see [`ProposalBuilder`] to set the nonce or multisend target.
pub fn build_proposal(calls: &[CallRequest], safe: Address, chain_id: u64) -> Result<Proposal> {
    ProposalBuilder::new(safe, chain_id)
        .calls(calls.iter().cloned())
        .build()
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;

    const SAFE: Address = address!("2222222222222222222222222222222222222222");
    const VAULT: &str = "0x1111111111111111111111111111111111111111";
    const ROUTER: &str = "0x3333333333333333333333333333333333333333";

    #[test]
    fn test_parse_address_accepts_lower_and_upper() {
        assert!(parse_address("0xabcdefabcdefabcdefabcdefabcdefabcdefabcd").is_ok());
        assert!(parse_address("0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD").is_ok());
    }

    #[test]
    fn test_parse_address_checks_mixed_case_checksum() {
        assert!(parse_address("0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf").is_ok());
        let err = parse_address("0x7e5F4552091A69125d5DfCb7b8C2659029395Bdf").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_parse_address_rejects_malformed() {
        for bad in [
            "not-an-address",
            "0xVault",
            "1111111111111111111111111111111111111111",
            "0x111111111111111111111111111111111111111",
            "0x11111111111111111111111111111111111111111",
            "0x111111111111111111111111111111111111111g",
        ] {
            assert!(matches!(parse_address(bad), Err(Error::InvalidAddress(s)) if s == bad));
        }
    }

    #[test]
    fn test_empty_proposal_rejected() {
        assert!(matches!(build_proposal(&[], SAFE, 1), Err(Error::EmptyProposal)));
    }

    #[test]
    fn test_invalid_target_rejected() {
        let calls = [CallRequest::new("not-an-address", vec![0x01])];
        assert!(matches!(
            build_proposal(&calls, SAFE, 1),
            Err(Error::InvalidAddress(s)) if s == "not-an-address"
        ));
    }

    #[test]
    fn test_one_bad_call_fails_whole_batch() {
        let calls = [
            CallRequest::new(VAULT, vec![0x01]),
            CallRequest::new("0xRouter", vec![0x02]),
        ];
        assert!(build_proposal(&calls, SAFE, 1).is_err());
    }

    #[test]
    fn test_value_defaults_to_zero() {
        let proposal = build_proposal(&[CallRequest::new(VAULT, vec![0x01])], SAFE, 1).unwrap();
        assert_eq!(proposal.calls()[0].value, U256::ZERO);

        let proposal = build_proposal(
            &[CallRequest::new(VAULT, vec![0x01]).with_value(U256::from(5))],
            SAFE,
            1,
        )
        .unwrap();
        assert_eq!(proposal.calls()[0].value, U256::from(5));
    }

    #[test]
    fn test_order_and_duplicates_preserved() {
        let calls = [
            CallRequest::new(ROUTER, vec![0x02]),
            CallRequest::new(VAULT, vec![0x01]),
            CallRequest::new(ROUTER, vec![0x02]),
        ];
        let proposal = build_proposal(&calls, SAFE, 1).unwrap();
        let targets: Vec<_> = proposal.calls().iter().map(|c| c.to.to_string().to_lowercase()).collect();
        assert_eq!(targets, vec![ROUTER, VAULT, ROUTER]);
    }

    #[test]
    fn test_single_call_is_direct() {
        let proposal = build_proposal(&[CallRequest::new(VAULT, vec![0xaa, 0xbb])], SAFE, 1).unwrap();
        let tx = proposal.transaction();
        assert_eq!(tx.to, parse_address(VAULT).unwrap());
        assert_eq!(tx.operation, Operation::Call);
        assert_eq!(&tx.data[..], &[0xaa, 0xbb]);
    }

    #[test]
    fn test_batch_goes_through_multisend() {
        let multisend = address!("9999999999999999999999999999999999999999");
        let proposal = ProposalBuilder::new(SAFE, 1)
            .multisend(multisend)
            .nonce(U256::from(7))
            .call(CallRequest::new(VAULT, vec![0x01]))
            .call(CallRequest::new(ROUTER, vec![0x02]))
            .build()
            .unwrap();
        let tx = proposal.transaction();
        assert_eq!(tx.to, multisend);
        assert_eq!(tx.operation, Operation::DelegateCall);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(tx.nonce, U256::from(7));
    }

    #[test]
    fn test_with_nonce_changes_only_nonce() {
        let proposal = build_proposal(&[CallRequest::new(VAULT, vec![0x01])], SAFE, 1).unwrap();
        let renonced = proposal.clone().with_nonce(U256::from(3));
        assert_eq!(renonced.calls(), proposal.calls());
        assert_eq!(renonced.nonce(), U256::from(3));
        assert_ne!(renonced.hash(), proposal.hash());
    }
}
