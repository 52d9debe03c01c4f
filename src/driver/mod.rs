pub mod controller;
pub mod loop_worker;
pub mod watcher;

use std::future::Future;
use std::time::Duration;

use anyhow::Result;

use crate::webdriver::{Command, SnapshotPage};

pub use controller::DriverController;

/// Async boundary to a live page. Implementations must be cheap to clone so
/// the watcher and the loop can share one session.
pub trait PageHost: Clone + Send + Sync + 'static {
    /// Capture the player state for one tick.
    fn probe(&self) -> impl Future<Output = Result<SnapshotPage>> + Send;
    /// Replay the writes and interactions a tick queued.
    fn flush(&self, commands: Vec<Command>) -> impl Future<Output = Result<()>> + Send;
    fn fingerprint(&self) -> impl Future<Output = Result<Fingerprint>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fingerprint {
    pub url: String,
    pub player_class: Option<String>,
}

/// Why a tick is being requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Mutation,
    Navigation { url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverConfig {
    pub tick_interval: Duration,
    pub navigation_settle: Duration,
    pub probe_timeout: Duration,
    pub watch_interval: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(150),
            navigation_settle: Duration::from_millis(350),
            probe_timeout: Duration::from_secs(2),
            watch_interval: Duration::from_millis(50),
        }
    }
}
