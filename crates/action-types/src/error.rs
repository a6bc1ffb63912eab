use std::fmt;
use thiserror::Error;

/// Coarse error classification surfaced to the message-handling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    InvalidMetadata,
    InvalidSignature,
    InvalidId,
    Unauthorized,
    InvalidPrice,
    InsufficientFunds,
    InvalidAddress,
    InvalidExpiration,
    InvalidParams,
    InternalError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::InvalidMetadata => "invalid_metadata",
            ErrorKind::InvalidSignature => "invalid_signature",
            ErrorKind::InvalidId => "invalid_id",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::InvalidPrice => "invalid_price",
            ErrorKind::InsufficientFunds => "insufficient_funds",
            ErrorKind::InvalidAddress => "invalid_address",
            ErrorKind::InvalidExpiration => "invalid_expiration",
            ErrorKind::InvalidParams => "invalid_params",
            ErrorKind::InternalError => "internal_error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Invalid action state: {0}")]
    InvalidState(String),

    #[error("Invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("Unsupported action type: {0}")]
    UnsupportedActionType(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid Kademlia ID: {0}")]
    InvalidId(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: String, available: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid expiration: {0}")]
    InvalidExpiration(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("Finalization of action {action_id} failed: {reason}")]
    FinalizationFailed {
        action_id: String,
        #[source]
        reason: Box<ActionError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ActionError::ActionNotFound(_) => ErrorKind::NotFound,
            ActionError::InvalidState(_) => ErrorKind::InvalidState,
            ActionError::InvalidMetadata(_) | ActionError::UnsupportedActionType(_) => {
                ErrorKind::InvalidMetadata
            }
            ActionError::InvalidSignature(_) => ErrorKind::InvalidSignature,
            ActionError::InvalidId(_) => ErrorKind::InvalidId,
            ActionError::Unauthorized(_) => ErrorKind::Unauthorized,
            ActionError::InvalidPrice(_) => ErrorKind::InvalidPrice,
            ActionError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            ActionError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            ActionError::InvalidExpiration(_) => ErrorKind::InvalidExpiration,
            ActionError::InvalidParams(_) => ErrorKind::InvalidParams,
            ActionError::FinalizationFailed { reason, .. } => reason.kind(),
            ActionError::Serialization(_) | ActionError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Wrap an attestation failure that moved the action into a terminal state.
    pub fn finalization_failed(action_id: impl Into<String>, reason: ActionError) -> Self {
        ActionError::FinalizationFailed {
            action_id: action_id.into(),
            reason: Box::new(reason),
        }
    }
}

impl From<serde_json::Error> for ActionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalization_failure_keeps_inner_kind() {
        let err = ActionError::finalization_failed("7", ActionError::InvalidId("mismatch".into()));
        assert_eq!(err.kind(), ErrorKind::InvalidId);
        assert!(err.to_string().contains("action 7"));
    }

    #[test]
    fn test_unsupported_type_is_metadata_kind() {
        let err = ActionError::UnsupportedActionType("UNKNOWN".into());
        assert_eq!(err.kind(), ErrorKind::InvalidMetadata);
    }
}
