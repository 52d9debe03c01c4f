use crate::page::{selectors, Container};

/// Ad evidence read from one player container during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdEvidence {
    /// The container carries an ad-showing or ad-interrupting marker.
    pub class_flag: bool,
    /// An ad-only control inside the container is visible.
    pub ui_visible: bool,
    /// An ad-only control is present but its layout could not be measured.
    pub inconclusive: bool,
}

pub fn read_evidence<C: Container + ?Sized>(container: &C) -> AdEvidence {
    let class_flag = container.has_class(selectors::AD_SHOWING_CLASS)
        || container.has_class(selectors::AD_INTERRUPTING_CLASS);

    let mut ui_visible = false;
    let mut inconclusive = false;
    for sel in selectors::AD_ONLY_UI {
        // First match per selector.
        let Some(el) = container.query(sel) else {
            continue;
        };
        match el.state.visibility() {
            Some(true) => {
                ui_visible = true;
                break;
            }
            Some(false) => {}
            None => inconclusive = true,
        }
    }

    AdEvidence {
        class_flag,
        ui_visible,
        inconclusive,
    }
}
