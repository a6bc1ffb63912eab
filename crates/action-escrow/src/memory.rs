use crate::error::{LedgerError, Result};
use crate::ledger::EscrowLedger;
use action_types::{Amount, Coin};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

#[derive(Default)]
struct LedgerState {
    balances: HashMap<(String, String), Amount>,
    module: HashMap<String, Amount>,
    pool: HashMap<String, Amount>,
    blocked: HashSet<String>,
}

/// In-memory bank with a module escrow account and a foundation pool
pub struct MemoryLedger {
    module_address: String,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new(module_address: impl Into<String>) -> Self {
        Self {
            module_address: module_address.into(),
            state: Mutex::new(LedgerState::default()),
        }
    }

    pub fn module_address(&self) -> &str {
        &self.module_address
    }

    /// Mint `amount` into `account`
    pub fn fund(&self, account: &str, amount: &Coin) -> Result<()> {
        let mut state = self.state.lock();
        let entry = state
            .balances
            .entry((account.to_string(), amount.denom.clone()))
            .or_insert(0);
        *entry = entry
            .checked_add(amount.amount)
            .ok_or_else(|| LedgerError::Overflow(account.to_string()))?;
        debug!(account = %account, amount = %amount, "🏦 Account funded");
        Ok(())
    }

    /// Reject every future credit to `account`
    pub fn block_account(&self, account: &str) {
        self.state.lock().blocked.insert(account.to_string());
    }

    pub fn unblock_account(&self, account: &str) {
        self.state.lock().blocked.remove(account);
    }

    pub fn module_balance(&self, denom: &str) -> Amount {
        self.state.lock().module.get(denom).copied().unwrap_or(0)
    }

    pub fn pool_balance(&self, denom: &str) -> Amount {
        self.state.lock().pool.get(denom).copied().unwrap_or(0)
    }

    fn take_from_module(state: &mut LedgerState, amount: &Coin) -> Result<()> {
        let available = state.module.get(&amount.denom).copied().unwrap_or(0);
        if available < amount.amount {
            return Err(LedgerError::InsufficientFunds {
                account: "module".to_string(),
                required: amount.to_string(),
                available: Coin::new(available, amount.denom.clone()).to_string(),
            });
        }
        state
            .module
            .insert(amount.denom.clone(), available - amount.amount);
        Ok(())
    }
}

fn check_amount(amount: &Coin) -> Result<()> {
    if amount.is_zero() {
        return Err(LedgerError::InvalidAmount(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    Ok(())
}

impl EscrowLedger for MemoryLedger {
    fn debit(&self, account: &str, amount: &Coin) -> Result<()> {
        check_amount(amount)?;
        let mut state = self.state.lock();

        let key = (account.to_string(), amount.denom.clone());
        let balance_before = state.balances.get(&key).copied().unwrap_or(0);
        if balance_before < amount.amount {
            return Err(LedgerError::InsufficientFunds {
                account: account.to_string(),
                required: amount.to_string(),
                available: Coin::new(balance_before, amount.denom.clone()).to_string(),
            });
        }

        let module_before = state.module.get(&amount.denom).copied().unwrap_or(0);
        let module_after = module_before
            .checked_add(amount.amount)
            .ok_or_else(|| LedgerError::Overflow(self.module_address.clone()))?;

        state.balances.insert(key, balance_before - amount.amount);
        state.module.insert(amount.denom.clone(), module_after);

        info!(
            account = %account,
            amount = %amount,
            balance_before = %balance_before,
            escrow_after = %module_after,
            "💰 Escrow debited"
        );
        Ok(())
    }

    fn credit_account(&self, account: &str, amount: &Coin) -> Result<()> {
        check_amount(amount)?;
        let mut state = self.state.lock();

        if state.blocked.contains(account) {
            warn!(account = %account, amount = %amount, "🚫 Credit to blocked account refused");
            return Err(LedgerError::BlockedAccount(account.to_string()));
        }

        let key = (account.to_string(), amount.denom.clone());
        let balance_after = state
            .balances
            .get(&key)
            .copied()
            .unwrap_or(0)
            .checked_add(amount.amount)
            .ok_or_else(|| LedgerError::Overflow(account.to_string()))?;

        Self::take_from_module(&mut state, amount)?;
        state.balances.insert(key, balance_after);

        info!(account = %account, amount = %amount, "💸 Escrow released to account");
        Ok(())
    }

    fn credit_pool(&self, amount: &Coin) -> Result<()> {
        check_amount(amount)?;
        let mut state = self.state.lock();

        let pool_after = state
            .pool
            .get(&amount.denom)
            .copied()
            .unwrap_or(0)
            .checked_add(amount.amount)
            .ok_or_else(|| LedgerError::Overflow("pool".to_string()))?;

        Self::take_from_module(&mut state, amount)?;
        state.pool.insert(amount.denom.clone(), pool_after);

        info!(amount = %amount, "🏛️ Escrow released to foundation pool");
        Ok(())
    }

    fn balance_of(&self, account: &str, denom: &str) -> Result<Amount> {
        let state = self.state.lock();
        Ok(state
            .balances
            .get(&(account.to_string(), denom.to_string()))
            .copied()
            .unwrap_or(0))
    }
}
