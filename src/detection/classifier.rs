use super::signals::AdEvidence;

/// Per-tick judgment. `ad_showing` is liberal and drives entering or holding
/// the override; `clean_enough` is strict and is the only thing that counts
/// toward restoring. Both can be false at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub ad_showing: bool,
    pub clean_enough: bool,
}

impl Verdict {
    pub fn is_middle_zone(&self) -> bool {
        !self.ad_showing && !self.clean_enough
    }
}

pub fn classify(evidence: &AdEvidence) -> Verdict {
    Verdict {
        ad_showing: evidence.class_flag || evidence.ui_visible,
        clean_enough: !evidence.class_flag && !evidence.ui_visible && !evidence.inconclusive,
    }
}
