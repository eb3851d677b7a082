//! Value types shared between the proposal pipeline and the governance CLI.
//!
//! Everything here is plain data: no I/O, no hashing. Hashing and signing live in
//! `safe-proposer`.

mod call;
mod transaction;

pub use call::{Call, Operation};
pub use transaction::SafeTransactionData;
