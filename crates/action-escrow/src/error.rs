use action_types::ActionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Insufficient balance for {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: String,
        required: String,
        available: String,
    },

    #[error("Account {0} is not allowed to receive funds")]
    BlockedAccount(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Balance overflow for {0}")]
    Overflow(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<LedgerError> for ActionError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds {
                required,
                available,
                ..
            } => ActionError::InsufficientFunds {
                required,
                available,
            },
            other => ActionError::Internal(other.to_string()),
        }
    }
}
