//! Escrow ledger collaborator for action fees.

pub mod error;
pub mod ledger;
pub mod memory;

pub use error::{LedgerError, Result};
pub use ledger::EscrowLedger;
pub use memory::MemoryLedger;
