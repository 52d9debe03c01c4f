use serde::Serialize;
use tokio::time::Instant;

use crate::detection::{classify, read_evidence, Verdict};
use crate::page::{Container, Media, Page, PlayerContext};
use crate::{log_debug, log_info, log_warn};

use super::dismissal::{self, ClickGate, Dismissal};
use super::override_ctl;
use super::state::{decide, Mode, ModeKind, OverrideRecord, Step};
use super::OverridePolicy;

const ENABLE_LOGS: bool = true;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub mode: ModeKind,
    pub clean_streak: u32,
    pub record: Option<OverrideRecord>,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No media element or player container this tick.
    NoPlayer,
    Stepped {
        step: Step,
        dismissal: Option<Dismissal>,
    },
}

/// Owns every piece of cross-tick memory: the mode (with its override
/// record and clean streak) and the click gate.
#[derive(Debug)]
pub struct Monitor {
    policy: OverridePolicy,
    mode: Mode,
    gate: ClickGate,
    /// Record released by the latest tick, until the host confirms the revert.
    restored: Option<OverrideRecord>,
}

impl Monitor {
    pub fn new(policy: OverridePolicy) -> Self {
        Self {
            gate: ClickGate::new(policy.click_gap),
            policy,
            mode: Mode::Normal,
            restored: None,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> MonitorStatus {
        MonitorStatus {
            mode: self.mode.kind(),
            clean_streak: self.mode.clean_streak(),
            record: self.mode.record().copied(),
        }
    }

    pub fn tick<P: Page + ?Sized>(&mut self, page: &mut P, now: Instant) -> TickOutcome {
        self.restored = None;
        let Some(PlayerContext { media, container }) = page.resolve() else {
            return TickOutcome::NoPlayer;
        };

        let evidence = read_evidence(&*container);
        let verdict: Verdict = classify(&evidence);
        let step = decide(&self.mode, verdict, self.policy.restore_after);
        let mut dismissal = None;

        match step {
            Step::Idle => {}
            Step::Enter => {
                let mut record = OverrideRecord::capture(media.playback_rate(), media.muted());
                override_ctl::apply(&mut *media, self.policy.target_rate, &mut record);
                log_info!(
                    "ad detected ({:?}); saved rate {} muted {}",
                    evidence,
                    record.saved_rate,
                    record.saved_muted
                );
                self.mode = Mode::AdOverride {
                    record,
                    clean_streak: 0,
                };
                dismissal = Some(self.dismiss(&mut *container, now));
            }
            Step::Enforce => {
                if let Mode::AdOverride {
                    record,
                    clean_streak,
                } = &mut self.mode
                {
                    *clean_streak = 0;
                    override_ctl::apply(&mut *media, self.policy.target_rate, record);
                }
                dismissal = Some(self.dismiss(&mut *container, now));
            }
            Step::Count(next) => {
                if let Mode::AdOverride { clean_streak, .. } = &mut self.mode {
                    *clean_streak = next;
                }
            }
            Step::ResetStreak => {
                log_debug!("inconclusive ad evidence; clean streak reset");
                if let Mode::AdOverride { clean_streak, .. } = &mut self.mode {
                    *clean_streak = 0;
                }
            }
            Step::Restore => {
                if let Mode::AdOverride { record, .. } = std::mem::take(&mut self.mode) {
                    override_ctl::revert(&mut *media, &record);
                    self.restored = Some(record);
                    log_info!("ad finished; override released");
                }
            }
        }

        TickOutcome::Stepped { step, dismissal }
    }

    /// Undo an active override immediately, without waiting for a clean
    /// streak. Used when monitoring stops mid-ad.
    pub fn release<P: Page + ?Sized>(&mut self, page: &mut P) -> bool {
        if !matches!(self.mode, Mode::AdOverride { .. }) {
            return false;
        }
        let Some(PlayerContext { media, .. }) = page.resolve() else {
            return false;
        };
        if let Mode::AdOverride { record, .. } = std::mem::take(&mut self.mode) {
            override_ctl::revert(&mut *media, &record);
            self.restored = Some(record);
            log_info!("monitor stopping; override released early");
        }
        true
    }

    /// The host did not land the writes of the last restore. Goes back to
    /// overriding one clean tick short of the threshold, so the next clean
    /// tick reverts again. Returns false when the last tick restored nothing.
    pub fn restore_not_applied(&mut self) -> bool {
        if !matches!(self.mode, Mode::Normal) {
            return false;
        }
        let Some(record) = self.restored.take() else {
            return false;
        };
        log_warn!("restore was not applied by the page; holding the override");
        self.mode = Mode::AdOverride {
            record,
            clean_streak: self.policy.restore_after.saturating_sub(1),
        };
        true
    }

    fn dismiss<C: Container + ?Sized>(&mut self, container: &mut C, now: Instant) -> Dismissal {
        dismissal::attempt(container, self.policy.auto_skip, &mut self.gate, now)
    }
}
