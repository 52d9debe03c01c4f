//! Selectors and class markers for the watched player.

pub const MAIN_VIDEO: &str = "video.html5-main-video";
pub const ANY_VIDEO: &str = "video";
pub const PLAYER: &str = ".html5-video-player";

pub const AD_SHOWING_CLASS: &str = "ad-showing";
pub const AD_INTERRUPTING_CLASS: &str = "ad-interrupting";

/// Controls that only exist while an ad plays.
pub const AD_ONLY_UI: &[&str] = &[
    ".ytp-ad-skip-button",
    ".ytp-ad-skip-button-modern",
    ".ytp-ad-timed-pie-countdown-container",
];

/// Skip control variants, most specific first.
pub const SKIP_BUTTONS: &[&str] = &[
    "button.ytp-ad-skip-button",
    "button.ytp-ad-skip-button-modern",
    ".ytp-ad-skip-button",
    ".ytp-ad-skip-button-modern",
    ".ytp-ad-skip-button-container button",
    ".ytp-skip-ad-button",
];

/// Anything button-like, searched by label when no skip variant matches.
pub const LABELLED_BUTTONS: &str = "[role=\"button\"], button, .ytp-button";

pub const NEXT_BUTTON: &str = ".ytp-next-button";

/// Every selector a host must be able to answer for within the container.
pub fn probed() -> Vec<&'static str> {
    let mut all: Vec<&'static str> = Vec::new();
    for sel in AD_ONLY_UI
        .iter()
        .chain(SKIP_BUTTONS)
        .chain([LABELLED_BUTTONS, NEXT_BUTTON].iter())
    {
        if !all.contains(sel) {
            all.push(sel);
        }
    }
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probed_covers_every_lookup_once() {
        let all = probed();
        for sel in AD_ONLY_UI.iter().chain(SKIP_BUTTONS) {
            assert!(all.contains(sel), "{sel} missing");
        }
        assert!(all.contains(&LABELLED_BUTTONS));
        assert!(all.contains(&NEXT_BUTTON));

        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
        assert_eq!(all.len(), 9);
    }
}
