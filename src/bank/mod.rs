//! In-memory banking core.
//!
//! The bank maintains accounts keyed by id, applies deposits, payments and
//! transfers one at a time, and answers activity-ranking queries. Every
//! operation is atomic: a failing operation leaves the store untouched.
//! Also supports an async stream of commands.

use std::collections::HashMap;

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::Amount;
use crate::model::{AccountId, Command, Tick};

mod state;
pub use state::Account;

mod error;
pub use error::BankError;

/// The banking core.
///
/// Accounts are created explicitly and never destroyed.
pub struct Bank {
    accounts: HashMap<AccountId, Account>,
}

/// Public API
impl Bank {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    /// Run the bank over the given command stream.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            // a failed command should not stop the bank, so the result is
            // only logged
            let _ = self.apply(command);
        }
    }

    /// Apply a single command on top of the current state.
    pub fn apply(&mut self, command: Command) -> Result<(), BankError> {
        match command {
            Command::Create { ts, account } => self.create_account(ts, &account),
            Command::Deposit {
                ts,
                account,
                amount,
            } => self.deposit(ts, &account, amount).map(|_| ()),
            Command::Pay {
                ts,
                account,
                amount,
            } => self.pay(ts, &account, amount).map(|_| ()),
            Command::Transfer {
                ts,
                account,
                to,
                amount,
            } => self.transfer(ts, &account, &to, amount).map(|_| ()),
        }
    }

    /// Open `id` with a zero balance. Fails if the id is taken; the existing
    /// account is not modified.
    pub fn create_account(&mut self, ts: Tick, id: &str) -> Result<(), BankError> {
        let result = self.apply_create(id);
        match &result {
            Ok(()) => info!(ts, id, "account created"),
            Err(e) => info!(ts, id, reason = %e, "create skipped"),
        }
        result
    }

    /// Add `amount` to `id`'s balance and return the new balance. Outgoing
    /// activity is untouched.
    pub fn deposit(&mut self, ts: Tick, id: &str, amount: Amount) -> Result<Amount, BankError> {
        let result = self.apply_deposit(id, amount);
        match &result {
            Ok(balance) => info!(ts, id, amount = %amount, balance = %balance, "deposit applied"),
            Err(e) => info!(ts, id, amount = %amount, reason = %e, "deposit skipped"),
        }
        result
    }

    /// Withdraw `amount` from `id` with no counterparty and return the new
    /// balance. The amount counts toward `id`'s outgoing activity.
    pub fn pay(&mut self, ts: Tick, id: &str, amount: Amount) -> Result<Amount, BankError> {
        let result = self.apply_pay(id, amount);
        match &result {
            Ok(balance) => info!(ts, id, amount = %amount, balance = %balance, "payment applied"),
            Err(e) => info!(ts, id, amount = %amount, reason = %e, "payment skipped"),
        }
        result
    }

    /// Atomically move `amount` from `src` to `dst` and return the new
    /// source balance. Only `src`'s outgoing activity grows.
    pub fn transfer(
        &mut self,
        ts: Tick,
        src: &str,
        dst: &str,
        amount: Amount,
    ) -> Result<Amount, BankError> {
        let result = self.apply_transfer(src, dst, amount);
        match &result {
            Ok(balance) => {
                info!(ts, src, dst, amount = %amount, balance = %balance, "transfer applied")
            }
            Err(e) => info!(ts, src, dst, amount = %amount, reason = %e, "transfer skipped"),
        }
        result
    }

    /// Up to `n` accounts by outgoing activity, highest first, ties broken by
    /// id ascending. Each entry is rendered `"<id>(<outgoing>)"`.
    pub fn top_activity(&self, ts: Tick, n: usize) -> Vec<String> {
        debug!(ts, n, "activity ranking queried");
        self.ranked()
            .into_iter()
            .take(n)
            .map(|(id, account)| format!("{id}({})", account.outgoing()))
            .collect()
    }

    /// All accounts ordered by outgoing activity descending, id ascending.
    pub fn ranked(&self) -> Vec<(&str, &Account)> {
        let mut entries: Vec<_> = self
            .accounts
            .iter()
            .map(|(id, account)| (id.as_str(), account))
            .collect();
        entries.sort_by(|(id_a, a), (id_b, b)| {
            b.outgoing().cmp(&a.outgoing()).then_with(|| id_a.cmp(id_b))
        });
        entries
    }

    /// The state of one account.
    pub fn get_account(&self, id: &str) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// The state of all accounts, in no particular order.
    pub fn accounts(&self) -> impl Iterator<Item = (&str, &Account)> + '_ {
        self.accounts.iter().map(|(id, account)| (id.as_str(), account))
    }
}

/// Private API
impl Bank {
    fn apply_create(&mut self, id: &str) -> Result<(), BankError> {
        if self.accounts.contains_key(id) {
            return Err(BankError::AccountExists(id.to_owned()));
        }
        self.accounts.insert(id.to_owned(), Account::default());
        Ok(())
    }

    fn apply_deposit(&mut self, id: &str, amount: Amount) -> Result<Amount, BankError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| BankError::UnknownAccount(id.to_owned()))?;
        account.credit(amount);
        Ok(account.balance())
    }

    fn apply_pay(&mut self, id: &str, amount: Amount) -> Result<Amount, BankError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| BankError::UnknownAccount(id.to_owned()))?;
        if account.balance() < amount {
            return Err(BankError::InsufficientFunds(
                id.to_owned(),
                account.balance(),
                amount,
            ));
        }
        account.debit(amount);
        Ok(account.balance())
    }

    fn apply_transfer(&mut self, src: &str, dst: &str, amount: Amount) -> Result<Amount, BankError> {
        if src == dst {
            return Err(BankError::SelfTransfer(src.to_owned()));
        }
        if !self.accounts.contains_key(dst) {
            return Err(BankError::UnknownAccount(dst.to_owned()));
        }

        let source = self
            .accounts
            .get_mut(src)
            .ok_or_else(|| BankError::UnknownAccount(src.to_owned()))?;
        if source.balance() < amount {
            return Err(BankError::InsufficientFunds(
                src.to_owned(),
                source.balance(),
                amount,
            ));
        }

        // all checks done, both mutations below succeed
        source.debit(amount);
        let remaining = source.balance();
        if let Some(dest) = self.accounts.get_mut(dst) {
            dest.credit(amount);
        }
        Ok(remaining)
    }
}

impl Default for Bank {
    fn default() -> Self {
        Self::new()
    }
}
