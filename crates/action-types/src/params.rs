use crate::coin::{Amount, Coin};
use crate::ratio::FeeRatio;
use crate::{ActionError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FEE_DENOM: &str = "ulume";

/// Module parameters
/// These can be updated via governance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Flat fee component of every request
    pub base_action_fee: Coin,

    /// Fee per kilobyte of declared payload
    pub fee_per_kbyte: Coin,

    /// Advisory throughput cap for the host; not enforced here
    pub max_actions_per_block: u64,

    /// Minimum committee size the host must rank before actions can finalize
    pub min_super_nodes: u64,

    /// Identifier count Sense attestations must carry
    pub max_dd_and_fingerprints: u64,

    /// Identifier count Cascade attestations must carry
    pub max_raptor_q_symbols: u64,

    /// Default lifetime of a request, in seconds
    pub expiration_duration: u64,

    /// Size of the ranked committee authorized to attest
    pub top_supernodes_k: usize,

    /// Share of every distributed fee sent to the foundation pool
    pub foundation_fee_share: FeeRatio,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            base_action_fee: Coin::new(10_000, DEFAULT_FEE_DENOM),
            fee_per_kbyte: Coin::new(100, DEFAULT_FEE_DENOM),
            max_actions_per_block: 10,
            min_super_nodes: 1,
            max_dd_and_fingerprints: 50,
            max_raptor_q_symbols: 50,
            expiration_duration: 24 * 60 * 60,
            top_supernodes_k: 10,
            foundation_fee_share: FeeRatio::ZERO,
        }
    }
}

impl Params {
    pub fn fee_denom(&self) -> &str {
        &self.base_action_fee.denom
    }

    /// Fee floor every request must cover: one fee unit on top of the base fee
    pub fn minimum_fee(&self) -> Amount {
        self.action_fee(1)
    }

    /// Fee for a payload of `data_size_kbs` kilobytes (at least one unit is charged)
    pub fn action_fee(&self, data_size_kbs: u64) -> Amount {
        let units = data_size_kbs.max(1) as Amount;
        self.base_action_fee
            .amount
            .saturating_add(self.fee_per_kbyte.amount.saturating_mul(units))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let params: Params = serde_json::from_slice(bytes)
            .map_err(|e| ActionError::InvalidParams(format!("Failed to parse params: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.base_action_fee.denom != self.fee_per_kbyte.denom {
            return Err(ActionError::InvalidParams(format!(
                "fee denominations differ: {} vs {}",
                self.base_action_fee.denom, self.fee_per_kbyte.denom
            )));
        }

        if self.max_dd_and_fingerprints == 0 || self.max_raptor_q_symbols == 0 {
            return Err(ActionError::InvalidParams(
                "identifier ceilings must be > 0".to_string(),
            ));
        }

        if self.expiration_duration == 0 {
            return Err(ActionError::InvalidParams(
                "expiration_duration must be > 0".to_string(),
            ));
        }

        if self.top_supernodes_k == 0 {
            return Err(ActionError::InvalidParams(
                "top_supernodes_k must be > 0".to_string(),
            ));
        }

        if self.min_super_nodes as usize > self.top_supernodes_k {
            return Err(ActionError::InvalidParams(format!(
                "min_super_nodes ({}) exceeds top_supernodes_k ({})",
                self.min_super_nodes, self.top_supernodes_k
            )));
        }

        if self.foundation_fee_share > FeeRatio::ONE {
            return Err(ActionError::InvalidParams(
                "foundation_fee_share must be between 0 and 1".to_string(),
            ));
        }

        Ok(())
    }
}
