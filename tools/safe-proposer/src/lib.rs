//! Keystore-backed signing and submission of Safe multisig proposals.
//!
//! Pipeline, one pass per process:
//! - [`config::Config`] is read from the environment and validated up front.
//! - [`secret::resolve_secret`] gets the keystore password (environment or masked prompt).
//! - [`keystore::load_signer`] decrypts the key and binds it to the RPC endpoint.
//! - [`builder::ProposalBuilder`] validates and orders the calls.
//! - [`submit::submit`] hashes, signs and posts the proposal to the transaction service.

pub mod abi;
pub mod builder;
pub mod chain;
pub mod config;
pub mod error;
pub mod hash;
pub mod keystore;
pub mod masked;
pub mod multisend;
pub mod relay;
pub mod secret;
pub mod submit;


pub use builder::{build_proposal, parse_address, CallRequest, Proposal, ProposalBuilder};
pub use error::{Error, Result};
pub use safe_proposal_types::{Call, Operation, SafeTransactionData};
pub use submit::{submit, ProposalSigner, Submission};
