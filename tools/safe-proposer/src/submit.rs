//! Hash, sign and hand a proposal to the relay. One attempt, no retries.

use alloy_primitives::{Address, B256};

use crate::{
    builder::Proposal,
    error::Result,
    relay::{SignedProposal, TransactionService},
};

/// Anything that can sign a proposal hash on behalf of a Safe owner.
pub trait ProposalSigner {
    fn address(&self) -> Address;

    /// Sign the 32-byte digest directly (no EIP-191 prefix). Returns `r || s || v`.
    fn sign_hash(&self, hash: B256) -> Result<[u8; 65]>;
}

/// Outcome of a successful submission, for display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Submission {
    pub proposal_hash: B256,
    pub sender: Address,
}

/// Sign `proposal` with `signer` and submit it to `relay`.
///
/// Identical proposals yield identical hashes, which is what the relay deduplicates on.
/// Relay errors are returned as-is.
pub async fn submit<S, T>(proposal: &Proposal, signer: &S, relay: &T) -> Result<Submission>
where
    S: ProposalSigner + ?Sized,
    T: TransactionService + ?Sized,
{
    let transaction = proposal.transaction();
    let proposal_hash = proposal.hash();
    let sender = signer.address();
    let signature = signer.sign_hash(proposal_hash)?;

    tracing::info!(safe = %proposal.safe(), %sender, %proposal_hash, nonce = %transaction.nonce, "submitting proposal");
    relay
        .propose(&SignedProposal {
            safe: proposal.safe(),
            transaction,
            safe_tx_hash: proposal_hash,
            sender,
            signature,
        })
        .await?;

    Ok(Submission {
        proposal_hash,
        sender,
    })
}
