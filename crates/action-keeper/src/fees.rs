//! Fee distribution once an action reaches Done.
//!
//! Contributors are deduplicated and sorted. Each receives
//! `floor(distributable / n)` and the last one in sorted order also receives
//! `distributable % n`, so the amounts paid sum to the escrowed price.

use crate::keeper::ActionKeeper;
use action_types::{Action, Amount, Coin, FeeRatio, Params, Result};
use std::collections::BTreeSet;
use tracing::{error, info, warn};

/// Amounts owed out of one action's escrowed price
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeSplit {
    pub foundation: Amount,
    /// `(supernode, amount)` in sorted supernode order
    pub shares: Vec<(String, Amount)>,
}

impl FeeSplit {
    pub fn total(&self) -> Amount {
        self.foundation + self.shares.iter().map(|(_, amount)| amount).sum::<Amount>()
    }
}

pub fn split_fee(price: Amount, super_nodes: &[String], foundation_share: FeeRatio) -> FeeSplit {
    let contributors: BTreeSet<&String> = super_nodes.iter().collect();
    if contributors.is_empty() || price == 0 {
        return FeeSplit::default();
    }

    let foundation = foundation_share.mul_floor(price).min(price);
    let distributable = price - foundation;
    let n = contributors.len() as Amount;
    let share = distributable / n;
    let remainder = distributable % n;

    let last = contributors.len() - 1;
    let shares = contributors
        .into_iter()
        .enumerate()
        .map(|(i, sn)| {
            let amount = if i == last { share + remainder } else { share };
            (sn.clone(), amount)
        })
        .collect();

    FeeSplit { foundation, shares }
}

/// What actually moved during a distribution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeeDistribution {
    pub foundation_paid: Amount,
    pub paid: Vec<(String, Amount)>,
    /// `(supernode, amount, error)` for transfers the ledger refused
    pub failed: Vec<(String, Amount, String)>,
}

impl FeeDistribution {
    pub fn total_paid(&self) -> Amount {
        self.foundation_paid + self.paid.iter().map(|(_, amount)| amount).sum::<Amount>()
    }
}

impl ActionKeeper {
    /// Pay out the escrowed price of a Done action.
    ///
    /// Individual transfer failures are logged and reported, never returned.
    pub(crate) fn distribute_fees(
        &self,
        action: &Action,
        params: &Params,
    ) -> Result<FeeDistribution> {
        let price: Coin = action.price.parse()?;
        let split = split_fee(price.amount, &action.super_nodes, params.foundation_fee_share);
        let mut report = FeeDistribution::default();

        if split.shares.is_empty() {
            return Ok(report);
        }

        if split.foundation > 0 {
            let cut = Coin::new(split.foundation, price.denom.clone());
            match self.ledger.credit_pool(&cut) {
                Ok(()) => report.foundation_paid = split.foundation,
                Err(e) => error!(
                    action_id = %action.id,
                    amount = %cut,
                    error = %e,
                    "❌ Foundation fee transfer failed"
                ),
            }
        }

        for (supernode, amount) in split.shares {
            if amount == 0 {
                continue;
            }
            let coin = Coin::new(amount, price.denom.clone());
            match self.ledger.credit_account(&supernode, &coin) {
                Ok(()) => {
                    info!(
                        action_id = %action.id,
                        supernode = %supernode,
                        amount = %coin,
                        "💰 Supernode fee distributed"
                    );
                    report.paid.push((supernode, amount));
                }
                Err(e) => {
                    warn!(
                        action_id = %action.id,
                        supernode = %supernode,
                        amount = %coin,
                        error = %e,
                        "⚠️ Supernode fee transfer failed, skipping"
                    );
                    report.failed.push((supernode, amount, e.to_string()));
                }
            }
        }

        Ok(report)
    }
}
