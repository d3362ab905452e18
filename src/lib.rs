pub mod amount;
pub mod bank;
pub mod csv;
pub mod gateway;
pub mod limiter;
pub mod model;

pub use amount::Amount;
pub use bank::{Bank, BankError};
pub use gateway::Gateway;
pub use limiter::{RateLimiter, RateLimits, WindowCap};
pub use model::{AccountId, Command, Tick, Verdict};
