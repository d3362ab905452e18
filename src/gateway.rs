use tokio_stream::{Stream, StreamExt};
use tracing::warn;

use crate::bank::Bank;
use crate::limiter::{RateLimiter, RateLimits};
use crate::model::{Command, Verdict};

/// Rate-limited command intake: each command is checked against the limiter,
/// keyed by its acting account, before it reaches the bank.
pub struct Gateway {
    limiter: RateLimiter,
    bank: Bank,
}

impl Gateway {
    pub fn new(limits: RateLimits) -> Self {
        Self {
            limiter: RateLimiter::new(limits),
            bank: Bank::new(),
        }
    }

    /// Submit one command. Rejected commands never reach the bank.
    pub fn submit(&mut self, command: Command) -> Verdict {
        let verdict = self.limiter.check(command.ts(), command.account());
        match verdict {
            Verdict::Admitted => {
                // the bank logs failed commands itself
                let _ = self.bank.apply(command);
            }
            Verdict::Rejected => {
                warn!(
                    ts = command.ts(),
                    account = command.account(),
                    "command rejected by rate limit"
                );
            }
        }
        verdict
    }

    /// Drain the given command stream through the limiter into the bank.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) {
        while let Some(command) = stream.next().await {
            self.submit(command);
        }
    }

    pub fn bank(&self) -> &Bank {
        &self.bank
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new(RateLimits::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;

    fn deposit(ts: u64, account: &str, amount: u64) -> Command {
        Command::Deposit {
            ts,
            account: account.to_owned(),
            amount: Amount::new(amount),
        }
    }

    #[test]
    fn admitted_commands_reach_the_bank() {
        let mut gateway = Gateway::default();
        let verdict = gateway.submit(Command::Create {
            ts: 0,
            account: "alice".to_owned(),
        });

        assert!(verdict.is_admitted());
        assert!(gateway.bank().get_account("alice").is_some());
    }

    #[test]
    fn rejected_commands_never_reach_the_bank() {
        let mut gateway = Gateway::default();
        gateway.submit(Command::Create {
            ts: 0,
            account: "alice".to_owned(),
        });
        gateway.submit(deposit(1, "alice", 100));

        // third command within the short window: throttled, balance unchanged
        let verdict = gateway.submit(deposit(2, "alice", 100));
        assert!(!verdict.is_admitted());
        assert_eq!(
            gateway.bank().get_account("alice").unwrap().balance(),
            Amount::new(100)
        );
    }

    #[test]
    fn admission_counts_commands_the_bank_fails() {
        let mut gateway = Gateway::default();
        // no account exists: the bank skips this, but it still spends the
        // key's short-window capacity
        gateway.submit(deposit(0, "alice", 100));
        gateway.submit(deposit(1, "alice", 100));
        assert!(!gateway.submit(deposit(2, "alice", 100)).is_admitted());
    }

    #[tokio::test]
    async fn run_throttles_a_burst_per_account() {
        let mut gateway = Gateway::default();
        let commands = vec![
            Command::Create {
                ts: 0,
                account: "alice".to_owned(),
            },
            deposit(1, "alice", 100),
            deposit(2, "alice", 100), // throttled
            deposit(3, "alice", 100), // throttled
            deposit(7, "alice", 100), // tick 1 aged out of the short window
        ];

        gateway.run(tokio_stream::iter(commands)).await;

        assert_eq!(
            gateway.bank().get_account("alice").unwrap().balance(),
            Amount::new(200)
        );
    }

    #[tokio::test]
    async fn run_limits_accounts_independently() {
        let mut gateway = Gateway::default();
        let commands = vec![
            Command::Create {
                ts: 0,
                account: "a".to_owned(),
            },
            Command::Create {
                ts: 0,
                account: "b".to_owned(),
            },
            deposit(1, "a", 10),
            deposit(1, "b", 20),
        ];

        gateway.run(tokio_stream::iter(commands)).await;

        assert_eq!(
            gateway.bank().get_account("a").unwrap().balance(),
            Amount::new(10)
        );
        assert_eq!(
            gateway.bank().get_account("b").unwrap().balance(),
            Amount::new(20)
        );
    }
}
