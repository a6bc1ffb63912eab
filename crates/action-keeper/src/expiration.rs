use crate::events::{ActionEvent, ActionEventKind};
use crate::evidence::EvidenceKind;
use crate::keeper::ActionKeeper;
use action_types::{ActionId, ActionState, BlockContext};
use serde_json::json;
use tracing::{debug, error, info, warn};

/// Outcome of one expiration sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpirationReport {
    pub expired: Vec<ActionId>,
    /// Due actions that could not be persisted; retried next sweep
    pub failed: Vec<ActionId>,
    pub evidence_recorded: usize,
}

/// Only non-terminal, not-yet-done states are ever swept
const SWEPT_STATES: [ActionState; 2] = [ActionState::Pending, ActionState::Processing];

impl ActionKeeper {
    /// Move every due Pending or Processing action to Expired.
    ///
    /// A failure on one action is logged and the sweep moves on.
    pub fn check_expiration(&self, ctx: BlockContext) -> ExpirationReport {
        let mut report = ExpirationReport::default();
        let k = match self.params() {
            Ok(params) => params.top_supernodes_k,
            Err(e) => {
                error!(error = %e, "❌ Cannot load params for expiration sweep");
                return report;
            }
        };

        for state in SWEPT_STATES {
            let candidates = match self.store.actions_by_state(state) {
                Ok(actions) => actions,
                Err(e) => {
                    error!(state = %state, error = %e, "❌ Failed to scan actions for expiration");
                    continue;
                }
            };

            for mut action in candidates {
                if !action.is_expired_at(ctx.time) {
                    continue;
                }

                let previous = action.state;
                action.state = ActionState::Expired;
                if let Err(e) = self.store.update_action(&action) {
                    error!(
                        action_id = %action.id,
                        error = %e,
                        "❌ Failed to persist expired action, continuing"
                    );
                    report.failed.push(action.id.clone());
                    continue;
                }

                info!(
                    action_id = %action.id,
                    previous_state = %previous,
                    expiration_time = action.expiration_time,
                    block_time = ctx.time,
                    "⏰ Action expired"
                );
                self.events.emit(
                    ActionEvent::new(ActionEventKind::Expired, &action)
                        .with_attribute("previous_state", previous.as_str()),
                );

                match self.ranking.top_k_for_height(action.block_height, k) {
                    Ok(committee) => {
                        for member in committee {
                            let recorded = self.record_evidence(
                                EvidenceKind::ActionExpired,
                                &member.account,
                                &action.id,
                                json!({
                                    "expiration_time": action.expiration_time,
                                    "block_time": ctx.time,
                                    "block_height": ctx.height,
                                    "previous_state": previous.as_str(),
                                    "rank": member.rank,
                                }),
                            );
                            if recorded.is_some() {
                                report.evidence_recorded += 1;
                            }
                        }
                    }
                    Err(e) => warn!(
                        action_id = %action.id,
                        error = %e,
                        "⚠️ Could not rank committee for expiration evidence"
                    ),
                }

                report.expired.push(action.id);
            }
        }

        if !report.expired.is_empty() || !report.failed.is_empty() {
            info!(
                expired = report.expired.len(),
                failed = report.failed.len(),
                height = ctx.height,
                "🧹 Expiration sweep finished"
            );
        } else {
            debug!(height = ctx.height, "Expiration sweep found nothing due");
        }
        report
    }
}
