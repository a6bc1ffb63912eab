pub mod action;
pub mod address;
pub mod canonical_json;
pub mod coin;
pub mod error;
pub mod metadata;
pub mod params;
pub mod ratio;

pub use action::{Action, ActionId, ActionState, ActionType, LifecycleState};
pub use address::{decode_address, encode_address, validate_address, DEFAULT_ADDRESS_PREFIX};
pub use coin::{Amount, Coin};
pub use error::{ActionError, ErrorKind, Result};
pub use metadata::{CascadeMetadata, MessageKind, SenseMetadata};
pub use params::{Params, DEFAULT_FEE_DENOM};
pub use ratio::FeeRatio;

/// Block height and time the host executes a call against
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlockContext {
    pub height: u64,
    /// Unix seconds
    pub time: i64,
}

impl BlockContext {
    pub fn new(height: u64, time: i64) -> Self {
        Self { height, time }
    }
}
