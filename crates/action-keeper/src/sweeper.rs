//! Background driver for the expiration sweep.

use crate::config::SweeperConfig;
use crate::expiration::ExpirationReport;
use crate::keeper::ActionKeeper;
use action_types::BlockContext;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Source of the block height and time a sweep runs against
pub trait BlockClock: Send + Sync {
    fn current_block(&self) -> BlockContext;
}

/// Clock advanced explicitly by the host or a test
pub struct ManualClock {
    block: Mutex<BlockContext>,
}

impl ManualClock {
    pub fn new(block: BlockContext) -> Self {
        Self {
            block: Mutex::new(block),
        }
    }

    pub fn set(&self, block: BlockContext) {
        *self.block.lock() = block;
    }

    pub fn advance(&self, blocks: u64, seconds: i64) {
        let mut block = self.block.lock();
        block.height += blocks;
        block.time += seconds;
    }
}

impl BlockClock for ManualClock {
    fn current_block(&self) -> BlockContext {
        *self.block.lock()
    }
}

pub struct ExpirationSweeper {
    keeper: Arc<ActionKeeper>,
    clock: Arc<dyn BlockClock>,
    interval: Duration,
    enabled: bool,
}

impl ExpirationSweeper {
    pub fn new(keeper: Arc<ActionKeeper>, clock: Arc<dyn BlockClock>, interval: Duration) -> Self {
        Self {
            keeper,
            clock,
            interval: interval.max(Duration::from_millis(1)),
            enabled: true,
        }
    }

    pub fn from_config(
        keeper: Arc<ActionKeeper>,
        clock: Arc<dyn BlockClock>,
        config: &SweeperConfig,
    ) -> Self {
        let mut sweeper = Self::new(keeper, clock, Duration::from_secs(config.interval_secs));
        sweeper.enabled = config.enabled;
        sweeper
    }

    pub fn sweep_once(&self) -> ExpirationReport {
        let block = self.clock.current_block();
        debug!(height = block.height, time = block.time, "⏳ Running expiration sweep");
        self.keeper.check_expiration(block)
    }

    /// Sweep on every tick until `shutdown` flips to true; returns the sweep count.
    /// A disabled sweeper returns 0 without ticking.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        if !self.enabled {
            info!("⏸️ Expiration sweeper disabled");
            return 0;
        }

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut sweeps = 0u64;

        info!(interval_ms = self.interval.as_millis() as u64, "✨ Expiration sweeper started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.sweep_once();
                    sweeps += 1;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(sweeps, "🛑 Expiration sweeper stopped");
        sweeps
    }

    pub fn spawn(self) -> SweeperHandle {
        let (tx, rx) = watch::channel(false);
        let task = tokio::spawn(self.run(rx));
        SweeperHandle { shutdown: tx, task }
    }
}

pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl SweeperHandle {
    /// Stop the sweeper and wait for it; returns how many sweeps ran
    pub async fn shutdown(self) -> Result<u64, tokio::task::JoinError> {
        // The task may already have exited, in which case there is no receiver
        let _ = self.shutdown.send(true);
        self.task.await
    }
}
