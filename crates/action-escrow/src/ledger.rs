use crate::error::Result;
use action_types::{Amount, Coin};

/// Escrow operations the action module performs against the bank
pub trait EscrowLedger: Send + Sync {
    /// Move `amount` from `account` into the module escrow account
    fn debit(&self, account: &str, amount: &Coin) -> Result<()>;

    /// Move `amount` from the module escrow account to `account`
    fn credit_account(&self, account: &str, amount: &Coin) -> Result<()>;

    /// Move `amount` from the module escrow account to the foundation pool
    fn credit_pool(&self, amount: &Coin) -> Result<()>;

    /// Spendable balance of `account` in `denom`
    fn balance_of(&self, account: &str, denom: &str) -> Result<Amount>;
}
