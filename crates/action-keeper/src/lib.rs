//! Lifecycle engine for multi-party supernode actions.
//!
//! A client requests work and escrows a fee, ranked supernodes attest to it,
//! and the creator approves the result. The keeper owns every state change;
//! per-type rules live in [`handlers`].

pub mod config;
pub mod events;
pub mod evidence;
pub mod expiration;
pub mod fees;
pub mod handlers;
pub mod keeper;
pub mod lifecycle;
pub mod logging;
pub mod msg_server;
pub mod queries;
pub mod ranking;
pub mod registry;
pub mod sweeper;

pub use config::{KeeperConfig, LoggingConfig, SweeperConfig};
pub use events::{ActionEvent, ActionEventKind, ChannelEventSink, EventSink, MemoryEventSink};
pub use evidence::{EvidenceError, EvidenceKind, EvidenceRecord, EvidenceSink, MemoryEvidenceStore};
pub use expiration::ExpirationReport;
pub use fees::{split_fee, FeeDistribution, FeeSplit};
pub use handlers::{ActionHandler, CascadeHandler, SenseHandler, Verdict};
pub use keeper::{ActionKeeper, KeeperServices};
pub use logging::init_logging;
pub use msg_server::{
    MsgApproveAction, MsgApproveActionResponse, MsgFinalizeAction, MsgFinalizeActionResponse,
    MsgRequestAction, MsgRequestActionResponse, MsgServer, MsgUpdateParams,
};
pub use queries::{Page, PageRequest};
pub use ranking::{MemoryRanking, RankedSupernode, SupernodeRanking};
pub use registry::ActionRegistry;
pub use sweeper::{BlockClock, ExpirationSweeper, ManualClock, SweeperHandle};
