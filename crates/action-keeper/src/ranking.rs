use action_types::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A committee member as ranked at some height
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedSupernode {
    /// Account the supernode attests with
    pub account: String,
    /// 1-based position in the ranking
    pub rank: u32,
}

/// Supernode committee ranking provided by the host
pub trait SupernodeRanking: Send + Sync {
    /// Best `k` supernodes for actions created at `height`, best first
    fn top_k_for_height(&self, height: u64, k: usize) -> Result<Vec<RankedSupernode>>;
}

/// Ranking snapshots keyed by the height they take effect at.
///
/// A lookup at `h` uses the latest snapshot at or below `h`.
#[derive(Default)]
pub struct MemoryRanking {
    snapshots: RwLock<BTreeMap<u64, Vec<String>>>,
}

impl MemoryRanking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the ranked account list effective from `height`
    pub fn set_snapshot(&self, height: u64, ranked_accounts: Vec<String>) {
        self.snapshots.write().insert(height, ranked_accounts);
    }
}

impl SupernodeRanking for MemoryRanking {
    fn top_k_for_height(&self, height: u64, k: usize) -> Result<Vec<RankedSupernode>> {
        let snapshots = self.snapshots.read();
        let ranked = snapshots
            .range(..=height)
            .next_back()
            .map(|(_, accounts)| accounts.as_slice())
            .unwrap_or_default();

        Ok(ranked
            .iter()
            .take(k)
            .enumerate()
            .map(|(i, account)| RankedSupernode {
                account: account.clone(),
                rank: i as u32 + 1,
            })
            .collect())
    }
}
