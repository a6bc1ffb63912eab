pub mod backend;
pub mod key_prefix;
pub mod memory;
pub mod store;

pub use backend::{BatchOp, KvBackend, Result, StorageError, WriteBatch};
pub use memory::MemoryBackend;
pub use store::{ActionStore, FIRST_ACTION_ID};
