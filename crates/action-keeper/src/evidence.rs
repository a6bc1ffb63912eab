//! Audit records for protocol violations and exceptional events.

use action_types::{ActionError, ActionId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceKind {
    FinalizeSignatureFailure,
    FinalizeNotInTopK,
    ActionExpired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub id: u64,
    pub kind: EvidenceKind,
    pub reporter: String,
    pub subject: String,
    pub action_id: ActionId,
    /// JSON document describing the incident
    pub metadata: String,
}

#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("Evidence rejected: {0}")]
    Rejected(String),

    #[error("Invalid evidence metadata: {0}")]
    InvalidMetadata(String),
}

impl From<EvidenceError> for ActionError {
    fn from(e: EvidenceError) -> Self {
        ActionError::Internal(e.to_string())
    }
}

pub trait EvidenceSink: Send + Sync {
    /// Store one record and return its id
    fn record_evidence(
        &self,
        kind: EvidenceKind,
        reporter: &str,
        subject: &str,
        action_id: &str,
        metadata_json: &str,
    ) -> Result<u64, EvidenceError>;
}

/// Evidence store assigning sequential ids from 1
#[derive(Default)]
pub struct MemoryEvidenceStore {
    records: Mutex<Vec<EvidenceRecord>>,
    rejecting: Mutex<bool>,
}

impl MemoryEvidenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<EvidenceRecord> {
        self.records.lock().clone()
    }

    pub fn records_for_action(&self, action_id: &str) -> Vec<EvidenceRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.action_id == action_id)
            .cloned()
            .collect()
    }

    pub fn records_of_kind(&self, kind: EvidenceKind) -> Vec<EvidenceRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }

    /// Make every later submission fail, as an unavailable store would
    pub fn set_rejecting(&self, rejecting: bool) {
        *self.rejecting.lock() = rejecting;
    }
}

impl EvidenceSink for MemoryEvidenceStore {
    fn record_evidence(
        &self,
        kind: EvidenceKind,
        reporter: &str,
        subject: &str,
        action_id: &str,
        metadata_json: &str,
    ) -> Result<u64, EvidenceError> {
        if *self.rejecting.lock() {
            warn!(kind = ?kind, subject = %subject, "Evidence store is rejecting submissions");
            return Err(EvidenceError::Rejected("store unavailable".to_string()));
        }
        serde_json::from_str::<serde_json::Value>(metadata_json)
            .map_err(|e| EvidenceError::InvalidMetadata(e.to_string()))?;

        let mut records = self.records.lock();
        let id = records.len() as u64 + 1;
        records.push(EvidenceRecord {
            id,
            kind,
            reporter: reporter.to_string(),
            subject: subject.to_string(),
            action_id: action_id.to_string(),
            metadata: metadata_json.to_string(),
        });

        info!(
            evidence_id = id,
            kind = ?kind,
            subject = %subject,
            action_id = %action_id,
            "🧾 Evidence recorded"
        );
        Ok(id)
    }
}
