//! Error type for bank operations.

use thiserror::Error;

use crate::Amount;
use crate::model::AccountId;

/// Failure of a bank operation. Every variant is reported without side
/// effects: the store is left exactly as it was before the call.
#[derive(Debug, Error)]
pub enum BankError {
    #[error("account {0} already exists")]
    AccountExists(AccountId),

    #[error("no such account {0}")]
    UnknownAccount(AccountId),

    #[error("insufficient funds in {0}: balance {1}, requested {2}")]
    InsufficientFunds(AccountId, Amount, Amount),

    #[error("cannot transfer from {0} to itself")]
    SelfTransfer(AccountId),
}
