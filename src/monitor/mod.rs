pub mod controller;
pub mod dismissal;
pub mod override_ctl;
pub mod state;


use std::time::Duration;

use crate::settings::AdSettings;

pub use controller::{Monitor, MonitorStatus, TickOutcome};
pub use state::{Mode, ModeKind, OverrideRecord, Step};

/// Consecutive clean ticks needed before restoring; about one second at the
/// default 150ms interval.
pub const DEFAULT_RESTORE_AFTER: u32 = 7;

/// Session-constant knobs the monitor runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct OverridePolicy {
    pub target_rate: f64,
    pub auto_skip: bool,
    pub restore_after: u32,
    pub click_gap: Duration,
}

impl OverridePolicy {
    pub fn from_settings(settings: &AdSettings) -> Self {
        let target_rate = if settings.use_max_ad_speed {
            override_ctl::MAX_RATE
        } else {
            settings.ad_speed
        };
        Self {
            target_rate,
            auto_skip: settings.auto_skip,
            restore_after: DEFAULT_RESTORE_AFTER,
            click_gap: dismissal::DEFAULT_CLICK_GAP,
        }
    }
}

impl Default for OverridePolicy {
    fn default() -> Self {
        Self::from_settings(&AdSettings::default())
    }
}
