use std::time::Duration;

use tokio::time::Instant;

use crate::page::{selectors, Container, ElementRef, Interaction, INTERACTION_SEQUENCE};
use crate::{log_debug, log_info};

const ENABLE_LOGS: bool = true;

pub const DEFAULT_CLICK_GAP: Duration = Duration::from_millis(120);

/// Process-wide spacing between simulated click sequences.
#[derive(Debug, Clone)]
pub struct ClickGate {
    min_gap: Duration,
    last_click: Option<Instant>,
}

impl ClickGate {
    pub fn new(min_gap: Duration) -> Self {
        Self {
            min_gap,
            last_click: None,
        }
    }

    /// Claims the slot at `now` if the previous claim is old enough.
    pub fn try_claim(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_click {
            if now.saturating_duration_since(last) < self.min_gap {
                return false;
            }
        }
        self.last_click = Some(now);
        true
    }
}

impl Default for ClickGate {
    fn default() -> Self {
        Self::new(DEFAULT_CLICK_GAP)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Disabled,
    NothingToClick,
    RateLimited,
    Skipped,
    Advanced,
}

pub fn find_skip<C: Container + ?Sized>(container: &C) -> Option<ElementRef> {
    for sel in selectors::SKIP_BUTTONS {
        if let Some(el) = container.query(sel) {
            if el.state.is_clickable() {
                return Some(el);
            }
        }
    }

    container
        .query_all(selectors::LABELLED_BUTTONS)
        .into_iter()
        .filter(|el| el.state.is_clickable())
        .find(|el| is_skip_label(&el.state.normalized_label()))
}

fn is_skip_label(label: &str) -> bool {
    label == "skip"
        || label.starts_with("skip ad")
        || label.starts_with("skip ads")
        || label.starts_with("skip trial")
}

pub fn find_next<C: Container + ?Sized>(container: &C) -> Option<ElementRef> {
    container
        .query(selectors::NEXT_BUTTON)
        .filter(|el| el.state.is_clickable())
}

/// Best-effort dismissal: skip if possible, otherwise next. Never reports an
/// error; the outcome is informational.
pub fn attempt<C: Container + ?Sized>(
    container: &mut C,
    enabled: bool,
    gate: &mut ClickGate,
    now: Instant,
) -> Dismissal {
    if !enabled {
        return Dismissal::Disabled;
    }

    let (target, outcome) = if let Some(skip) = find_skip(container) {
        (skip, Dismissal::Skipped)
    } else if let Some(next) = find_next(container) {
        (next, Dismissal::Advanced)
    } else {
        return Dismissal::NothingToClick;
    };

    if !gate.try_claim(now) {
        return Dismissal::RateLimited;
    }

    simulate_click(container, &target);
    log_info!("dismissal: {:?} via {}", outcome, target.selector);
    outcome
}

/// Runs the full pointer sequence; a failing step does not stop later ones.
fn simulate_click<C: Container + ?Sized>(container: &mut C, target: &ElementRef) {
    let (client_x, client_y) = target
        .state
        .bounds
        .map(|b| b.center())
        .unwrap_or_default();

    for kind in INTERACTION_SEQUENCE {
        let interaction = Interaction {
            kind,
            client_x,
            client_y,
        };
        if let Err(err) = container.dispatch(target, interaction) {
            log_debug!("{} on {} failed: {err}", kind.event_name(), target.selector);
        }
    }
}
