use serde::Serialize;

use crate::detection::Verdict;

/// What the viewer had before the override, and which of those properties
/// the override itself changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub saved_rate: f64,
    pub saved_muted: bool,
    pub rate_was_forced: bool,
    pub mute_was_forced: bool,
}

impl OverrideRecord {
    pub fn capture(rate: f64, muted: bool) -> Self {
        Self {
            saved_rate: rate,
            saved_muted: muted,
            rate_was_forced: false,
            mute_was_forced: false,
        }
    }
}

/// The record lives inside the override variant, so it exists exactly while
/// an override is active.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Mode {
    #[default]
    Normal,
    AdOverride {
        record: OverrideRecord,
        clean_streak: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeKind {
    Normal,
    AdOverride,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Normal => ModeKind::Normal,
            Mode::AdOverride { .. } => ModeKind::AdOverride,
        }
    }

    pub fn record(&self) -> Option<&OverrideRecord> {
        match self {
            Mode::Normal => None,
            Mode::AdOverride { record, .. } => Some(record),
        }
    }

    pub fn clean_streak(&self) -> u32 {
        match self {
            Mode::Normal => 0,
            Mode::AdOverride { clean_streak, .. } => *clean_streak,
        }
    }
}

/// Outcome of one tick's decision, before any side effect runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Normal and nothing showing: touch nothing.
    Idle,
    /// Normal -> AdOverride.
    Enter,
    /// Still overriding with an ad on screen: reapply and try to dismiss.
    Enforce,
    /// Clean tick counted; override held with the new streak.
    Count(u32),
    /// Neither showing nor clean: streak back to zero, override held.
    ResetStreak,
    /// Streak reached the threshold: AdOverride -> Normal.
    Restore,
}

pub fn decide(mode: &Mode, verdict: Verdict, restore_after: u32) -> Step {
    match mode {
        Mode::Normal if verdict.ad_showing => Step::Enter,
        Mode::Normal => Step::Idle,
        Mode::AdOverride { .. } if verdict.ad_showing => Step::Enforce,
        Mode::AdOverride { clean_streak, .. } if verdict.clean_enough => {
            let next = clean_streak.saturating_add(1);
            if next >= restore_after {
                Step::Restore
            } else {
                Step::Count(next)
            }
        }
        Mode::AdOverride { .. } => Step::ResetStreak,
    }
}
