//! Transaction message handling in front of the keeper.

use crate::keeper::ActionKeeper;
use action_types::{
    validate_address, Action, ActionError, ActionId, ActionState, ActionType, BlockContext, Coin,
    MessageKind, Params, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRequestAction {
    pub creator: String,
    pub action_type: String,
    /// Type-specific metadata document, JSON
    pub metadata: String,
    /// `<amount><denom>`
    pub price: String,
    /// Unix seconds; empty uses the default lifetime, `0` never expires
    #[serde(default)]
    pub expiration_time: String,
    #[serde(default)]
    pub file_size_kbs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgRequestActionResponse {
    pub action_id: ActionId,
    pub status: ActionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgFinalizeAction {
    /// Attesting supernode account
    pub creator: String,
    pub action_id: ActionId,
    pub action_type: String,
    pub metadata: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgFinalizeActionResponse {
    pub status: ActionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgApproveAction {
    pub creator: String,
    pub action_id: ActionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgApproveActionResponse {
    pub action_id: ActionId,
    pub status: ActionState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MsgUpdateParams {
    pub authority: String,
    pub params: Params,
}

pub struct MsgServer {
    keeper: Arc<ActionKeeper>,
}

impl MsgServer {
    pub fn new(keeper: Arc<ActionKeeper>) -> Self {
        Self { keeper }
    }

    pub fn keeper(&self) -> &Arc<ActionKeeper> {
        &self.keeper
    }

    pub fn request_action(
        &self,
        ctx: BlockContext,
        msg: MsgRequestAction,
    ) -> Result<MsgRequestActionResponse> {
        self.check_address(&msg.creator)?;
        let action_type: ActionType = msg.action_type.parse()?;
        let params = self.keeper.params()?;

        let price: Coin = msg.price.parse()?;
        let required = params.action_fee(msg.file_size_kbs);
        if price.amount < required {
            return Err(ActionError::InvalidPrice(format!(
                "price {} is below the fee {}{} for {} KB",
                price,
                required,
                params.fee_denom(),
                msg.file_size_kbs
            )));
        }

        let expiration_time = resolve_expiration(&msg.expiration_time, ctx.time, &params)?;

        let handler = self.keeper.registry().handler(action_type)?;
        let metadata = handler.process(msg.metadata.as_bytes(), MessageKind::Request, &params)?;

        let action = Action::new(msg.creator, action_type, metadata, msg.price, expiration_time);
        let action_id = self.keeper.register_action(ctx, action)?;

        Ok(MsgRequestActionResponse {
            action_id,
            status: ActionState::Pending,
        })
    }

    pub fn finalize_action(
        &self,
        ctx: BlockContext,
        msg: MsgFinalizeAction,
    ) -> Result<MsgFinalizeActionResponse> {
        self.check_address(&msg.creator)?;
        let action_type: ActionType = msg.action_type.parse()?;
        let action = self.keeper.get_action(&msg.action_id)?;

        if action.action_type != action_type {
            return Err(ActionError::InvalidMetadata(format!(
                "action {} is {}, message says {}",
                action.id, action.action_type, action_type
            )));
        }

        let params = self.keeper.params()?;
        let handler = self.keeper.registry().handler(action_type)?;
        let metadata = handler.process(msg.metadata.as_bytes(), MessageKind::Finalize, &params)?;

        debug!(
            action_id = %msg.action_id,
            supernode = %msg.creator,
            "📦 Finalize message accepted"
        );
        let status = self
            .keeper
            .finalize_action(ctx, &msg.action_id, &msg.creator, &metadata)?;
        Ok(MsgFinalizeActionResponse { status })
    }

    pub fn approve_action(
        &self,
        ctx: BlockContext,
        msg: MsgApproveAction,
    ) -> Result<MsgApproveActionResponse> {
        self.check_address(&msg.creator)?;
        self.keeper.approve_action(ctx, &msg.action_id, &msg.creator)?;
        Ok(MsgApproveActionResponse {
            action_id: msg.action_id,
            status: ActionState::Approved,
        })
    }

    pub fn update_params(&self, msg: MsgUpdateParams) -> Result<()> {
        self.check_address(&msg.authority)?;
        self.keeper.update_params(&msg.authority, &msg.params)
    }

    fn check_address(&self, address: &str) -> Result<()> {
        validate_address(&self.keeper.config().address_prefix, address)
    }
}

/// Empty means `now + expiration_duration`, `0` never expires, anything else must lie in the future
fn resolve_expiration(raw: &str, now: i64, params: &Params) -> Result<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        let duration = i64::try_from(params.expiration_duration).map_err(|_| {
            ActionError::InvalidParams("expiration_duration out of range".to_string())
        })?;
        return Ok(now.saturating_add(duration));
    }

    let value: i64 = raw
        .parse()
        .map_err(|e| ActionError::InvalidExpiration(format!("'{}': {}", raw, e)))?;
    if value == 0 {
        return Ok(0);
    }
    if value <= now {
        return Err(ActionError::InvalidExpiration(format!(
            "expiration time {} is not after block time {}",
            value, now
        )));
    }
    Ok(value)
}
