use crate::config::KeeperConfig;
use crate::events::{ActionEvent, ActionEventKind, EventSink};
use crate::evidence::{EvidenceKind, EvidenceSink};
use crate::handlers::Verdict;
use crate::lifecycle;
use crate::ranking::{RankedSupernode, SupernodeRanking};
use crate::registry::ActionRegistry;
use action_escrow::EscrowLedger;
use action_storage::ActionStore;
use action_types::{
    validate_address, Action, ActionError, ActionId, ActionState, BlockContext, Coin,
    LifecycleState, Params, Result,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Host-provided services the keeper runs against
#[derive(Clone)]
pub struct KeeperServices {
    pub store: ActionStore,
    pub registry: ActionRegistry,
    pub ledger: Arc<dyn EscrowLedger>,
    pub ranking: Arc<dyn SupernodeRanking>,
    pub evidence: Arc<dyn EvidenceSink>,
    pub events: Arc<dyn EventSink>,
}

/// Lifecycle engine for supernode actions.
///
/// Every operation is a synchronous read-modify-write against the store; the
/// host serializes calls and supplies the block context.
pub struct ActionKeeper {
    pub(crate) config: KeeperConfig,
    pub(crate) store: ActionStore,
    pub(crate) registry: ActionRegistry,
    pub(crate) ledger: Arc<dyn EscrowLedger>,
    pub(crate) ranking: Arc<dyn SupernodeRanking>,
    pub(crate) evidence: Arc<dyn EvidenceSink>,
    pub(crate) events: Arc<dyn EventSink>,
}

impl ActionKeeper {
    pub fn new(config: KeeperConfig, services: KeeperServices) -> Self {
        Self {
            config,
            store: services.store,
            registry: services.registry,
            ledger: services.ledger,
            ranking: services.ranking,
            evidence: services.evidence,
            events: services.events,
        }
    }

    pub fn config(&self) -> &KeeperConfig {
        &self.config
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Stored parameters, or the defaults in the configured denomination
    pub fn params(&self) -> Result<Params> {
        match self.store.get_params()? {
            Some(params) => Ok(params),
            None => Ok(self.default_params()),
        }
    }

    fn default_params(&self) -> Params {
        let mut params = Params::default();
        params.base_action_fee.denom = self.config.denom.clone();
        params.fee_per_kbyte.denom = self.config.denom.clone();
        params
    }

    /// Store initial parameters without an authority check
    pub fn init_genesis(&self, params: &Params) -> Result<()> {
        self.check_params(params)?;
        self.store.set_params(params)?;
        info!(denom = %params.fee_denom(), "🧬 Action module parameters initialized");
        Ok(())
    }

    /// Replace module parameters; only the configured authority may do so
    pub fn update_params(&self, authority: &str, params: &Params) -> Result<()> {
        if authority != self.config.authority {
            warn!(authority = %authority, "🚫 Parameter update from non-authority rejected");
            return Err(ActionError::Unauthorized(format!(
                "invalid authority: expected {}, got {}",
                self.config.authority, authority
            )));
        }
        self.check_params(params)?;
        self.store.set_params(params)?;
        info!(authority = %authority, "⚙️ Action module parameters updated");
        Ok(())
    }

    fn check_params(&self, params: &Params) -> Result<()> {
        params.validate()?;
        if params.fee_denom() != self.config.denom {
            return Err(ActionError::InvalidParams(format!(
                "fee denom {} does not match module denom {}",
                params.fee_denom(),
                self.config.denom
            )));
        }
        Ok(())
    }

    pub fn get_action(&self, action_id: &str) -> Result<Action> {
        self.store
            .get_action(action_id)?
            .ok_or_else(|| ActionError::ActionNotFound(action_id.to_string()))
    }

    /// Validate a fresh request, escrow its price and store it as Pending
    pub fn register_action(&self, ctx: BlockContext, mut action: Action) -> Result<ActionId> {
        if action.is_registered() {
            return Err(ActionError::InvalidState(format!(
                "action already carries id {}",
                action.id
            )));
        }
        if !matches!(action.state, ActionState::Unspecified | ActionState::Pending) {
            return Err(ActionError::InvalidState(format!(
                "new action cannot start in state {}",
                action.state
            )));
        }
        validate_address(&self.config.address_prefix, &action.creator)?;
        if action.expiration_time < 0 {
            return Err(ActionError::InvalidExpiration(format!(
                "expiration time {} is negative",
                action.expiration_time
            )));
        }

        let params = self.params()?;
        let price: Coin = action.price.parse()?;
        if price.denom != params.fee_denom() {
            return Err(ActionError::InvalidPrice(format!(
                "price denom {} does not match {}",
                price.denom,
                params.fee_denom()
            )));
        }
        let minimum = params.minimum_fee();
        if price.amount < minimum {
            return Err(ActionError::InvalidPrice(format!(
                "price {} is below the minimum fee {}{}",
                price, minimum, price.denom
            )));
        }

        let handler = self.registry.handler(action.action_type)?;
        handler.register(&action)?;

        let available = self.ledger.balance_of(&action.creator, &price.denom)?;
        if available < price.amount {
            return Err(ActionError::InsufficientFunds {
                required: price.to_string(),
                available: Coin::new(available, price.denom.clone()).to_string(),
            });
        }

        action.id = self.store.next_action_id()?.to_string();
        action.block_height = ctx.height;
        action.state = ActionState::Pending;
        action.super_nodes.clear();

        self.ledger.debit(&action.creator, &price)?;
        if let Err(e) = self.store.insert_action(&action) {
            error!(action_id = %action.id, error = %e, "❌ Failed to store action, refunding");
            if let Err(refund_err) = self.ledger.credit_account(&action.creator, &price) {
                error!(
                    action_id = %action.id,
                    creator = %action.creator,
                    error = %refund_err,
                    "❌ Refund after failed store did not go through"
                );
            }
            return Err(e.into());
        }

        info!(
            action_id = %action.id,
            creator = %action.creator,
            action_type = %action.action_type,
            price = %price,
            height = ctx.height,
            "📝 Action registered"
        );
        self.events.emit(
            ActionEvent::new(ActionEventKind::Registered, &action)
                .with_attribute("price", price.to_string())
                .with_attribute("block_height", ctx.height.to_string()),
        );

        Ok(action.id)
    }

    /// Apply an attestation from `supernode`; returns the resulting state
    pub fn finalize_action(
        &self,
        ctx: BlockContext,
        action_id: &str,
        supernode: &str,
        new_metadata: &[u8],
    ) -> Result<ActionState> {
        let params = self.params()?;
        let mut action = self.get_action(action_id)?;

        if !action.state.accepts_attestation() {
            return Err(ActionError::InvalidState(format!(
                "action {} is {}, attestations are closed",
                action.id, action.state
            )));
        }

        let committee = self
            .ranking
            .top_k_for_height(action.block_height, params.top_supernodes_k)?;
        if let Err(e) = authorize_attester(&action, supernode, &committee, &params) {
            self.reject_attestation(ctx, &action, supernode, EvidenceKind::FinalizeNotInTopK, &e);
            return Err(e);
        }

        let handler = self.registry.handler(action.action_type)?;
        let verdict = match handler.finalize(&action, supernode, new_metadata) {
            Ok(verdict) => verdict,
            Err(e) => {
                self.reject_attestation(
                    ctx,
                    &action,
                    supernode,
                    EvidenceKind::FinalizeSignatureFailure,
                    &e,
                );
                return Err(e);
            }
        };

        let previous = action.state;
        let next = match lifecycle::next_state(action.action_type, previous, &verdict)? {
            Some(next) => next,
            None => {
                debug!(
                    action_id = %action.id,
                    supernode = %supernode,
                    "Attestation recorded no change"
                );
                return Ok(previous);
            }
        };

        if verdict.is_accepted() {
            action.metadata = handler.merge_metadata(&action.metadata, new_metadata)?;
        }
        action.super_nodes.push(supernode.to_string());
        action.state = next;
        self.store.update_action(&action)?;

        info!(
            action_id = %action.id,
            supernode = %supernode,
            old_state = %previous,
            new_state = %next,
            "🔄 Action state changed"
        );

        if let Verdict::Failed(reason) = verdict {
            self.record_evidence(
                EvidenceKind::FinalizeSignatureFailure,
                supernode,
                &action.id,
                json!({
                    "reason": reason.to_string(),
                    "block_height": ctx.height,
                    "previous_state": previous.as_str(),
                }),
            );
            self.events.emit(
                ActionEvent::new(ActionEventKind::Failed, &action)
                    .with_attribute("supernode", supernode)
                    .with_attribute("reason", reason.to_string()),
            );
            return Err(ActionError::finalization_failed(action.id, reason));
        }

        self.events.emit(
            ActionEvent::new(ActionEventKind::Finalized, &action)
                .with_attribute("supernode", supernode)
                .with_attribute("state", next.as_str()),
        );

        if next == ActionState::Done {
            match self.distribute_fees(&action, &params) {
                Ok(report) => info!(
                    action_id = %action.id,
                    paid = %report.total_paid(),
                    recipients = report.paid.len(),
                    failed = report.failed.len(),
                    "✅ Action fees distributed"
                ),
                Err(e) => error!(action_id = %action.id, error = %e, "❌ Fee distribution failed"),
            }
        }

        Ok(next)
    }

    /// Creator accepts the attested result of a Done action
    pub fn approve_action(&self, _ctx: BlockContext, action_id: &str, creator: &str) -> Result<()> {
        let mut action = self.get_action(action_id)?;

        if action.state != ActionState::Done {
            return Err(ActionError::InvalidState(format!(
                "action {} is {}, only Done actions can be approved",
                action.id, action.state
            )));
        }
        if action.creator != creator {
            return Err(ActionError::Unauthorized(format!(
                "only the creator of action {} can approve it",
                action.id
            )));
        }

        self.registry.handler(action.action_type)?.approve(&action)?;

        if !action.state.can_transition_to(&ActionState::Approved) {
            return Err(ActionError::InvalidState(format!(
                "invalid transition from {} to {}",
                action.state,
                ActionState::Approved
            )));
        }
        action.state = ActionState::Approved;
        self.store.update_action(&action)?;

        info!(action_id = %action.id, creator = %creator, "✅ Action approved");
        self.events
            .emit(ActionEvent::new(ActionEventKind::Approved, &action));
        Ok(())
    }

    fn reject_attestation(
        &self,
        ctx: BlockContext,
        action: &Action,
        supernode: &str,
        kind: EvidenceKind,
        reason: &ActionError,
    ) {
        warn!(
            action_id = %action.id,
            supernode = %supernode,
            error = %reason,
            "🚫 Attestation rejected"
        );
        self.record_evidence(
            kind,
            supernode,
            &action.id,
            json!({
                "reason": reason.to_string(),
                "block_height": ctx.height,
                "action_block_height": action.block_height,
                "state": action.state.as_str(),
            }),
        );
        self.events.emit(
            ActionEvent::new(ActionEventKind::FinalizationRejected, action)
                .with_attribute("supernode", supernode)
                .with_attribute("reason", reason.to_string()),
        );
    }

    /// Evidence failures are logged and never replace the caller's outcome
    pub(crate) fn record_evidence(
        &self,
        kind: EvidenceKind,
        subject: &str,
        action_id: &str,
        metadata: serde_json::Value,
    ) -> Option<u64> {
        match self.evidence.record_evidence(
            kind,
            &self.config.module_address,
            subject,
            action_id,
            &metadata.to_string(),
        ) {
            Ok(id) => Some(id),
            Err(e) => {
                error!(
                    kind = ?kind,
                    subject = %subject,
                    action_id = %action_id,
                    error = %e,
                    "❌ Failed to record evidence"
                );
                None
            }
        }
    }
}

/// Attesters must be new to the action and ranked in the committee for its height
fn authorize_attester(
    action: &Action,
    supernode: &str,
    committee: &[RankedSupernode],
    params: &Params,
) -> Result<()> {
    if action.has_attested(supernode) {
        return Err(ActionError::Unauthorized(format!(
            "supernode {} already attested action {}",
            supernode, action.id
        )));
    }
    if (committee.len() as u64) < params.min_super_nodes {
        return Err(ActionError::Unauthorized(format!(
            "committee at height {} has {} supernodes, {} required",
            action.block_height,
            committee.len(),
            params.min_super_nodes
        )));
    }
    if !committee.iter().any(|sn| sn.account == supernode) {
        return Err(ActionError::Unauthorized(format!(
            "supernode {} is not in the top {} at height {}",
            supernode, params.top_supernodes_k, action.block_height
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_types::ActionType;

    fn ranked(accounts: &[&str]) -> Vec<RankedSupernode> {
        accounts
            .iter()
            .enumerate()
            .map(|(i, a)| RankedSupernode {
                account: a.to_string(),
                rank: i as u32 + 1,
            })
            .collect()
    }

    #[test]
    fn test_authorization_rules() {
        let params = Params::default();
        let mut action = Action::new("creator", ActionType::Sense, vec![], "1ulume", 0);
        action.id = "1".into();

        authorize_attester(&action, "sn1", &ranked(&["sn1", "sn2"]), &params).unwrap();
        assert!(authorize_attester(&action, "sn3", &ranked(&["sn1", "sn2"]), &params).is_err());
        assert!(authorize_attester(&action, "sn1", &[], &params).is_err());

        action.super_nodes.push("sn1".into());
        let err = authorize_attester(&action, "sn1", &ranked(&["sn1"]), &params).unwrap_err();
        assert!(matches!(err, ActionError::Unauthorized(_)));
    }
}
