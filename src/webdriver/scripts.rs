//! Scripts executed in the page through WebDriver `execute`.
//!
//! Every script resolves the player the same way: main video first, then its
//! nearest `.html5-video-player` ancestor. There is no document-wide lookup
//! for the container.

macro_rules! resolve_player_js {
    () => {
        r#"
        const video = document.querySelector('video.html5-main-video') || document.querySelector('video');
        const player = video ? video.closest('.html5-video-player') : null;
        "#
    };
}

/// `arguments[0]`: selectors to report on. Returns a `PageSnapshot`.
pub const PROBE: &str = concat!(
    resolve_player_js!(),
    r#"
    const describe = (el) => {
        const out = {};
        try {
            const r = el.getBoundingClientRect();
            out.bounds = { left: r.left, top: r.top, width: r.width, height: r.height };
        } catch (_) {}
        try {
            const cs = getComputedStyle(el);
            out.hidden = cs.visibility === 'hidden' || cs.display === 'none';
            out.transparent = cs.opacity === '0';
            out.pointerEventsNone = cs.pointerEvents === 'none';
        } catch (_) {}
        try {
            out.disabled = el.getAttribute('disabled') !== null ||
                el.getAttribute('aria-disabled') === 'true';
            out.label = el.getAttribute('aria-label') || el.textContent || '';
        } catch (_) {}
        return out;
    };
    const result = { url: location.href, media: null, player: null };
    if (video) {
        result.media = { playbackRate: video.playbackRate || 1.0, muted: !!video.muted };
    }
    if (player) {
        const elements = {};
        for (const sel of arguments[0]) {
            try {
                elements[sel] = Array.from(player.querySelectorAll(sel)).map(describe);
            } catch (_) {
                elements[sel] = [];
            }
        }
        result.player = { classes: Array.from(player.classList), elements };
    }
    return result;
    "#
);

/// `arguments[0]`: queued commands. Each runs in its own try/catch; returns
/// one boolean per command.
pub const FLUSH: &str = concat!(
    resolve_player_js!(),
    r#"
    const opts = (c) => ({
        bubbles: true, cancelable: true, view: window,
        clientX: c.clientX, clientY: c.clientY
    });
    return arguments[0].map((c) => {
        try {
            if (c.kind === 'playbackRate') {
                if (!video) return false;
                video.playbackRate = c.value;
                return true;
            }
            if (c.kind === 'muted') {
                if (!video) return false;
                video.muted = c.value;
                return true;
            }
            if (c.kind === 'interact') {
                if (!player) return false;
                const el = player.querySelectorAll(c.selector)[c.index];
                if (!el) return false;
                if (c.event === 'activate') {
                    el.click();
                } else {
                    el.dispatchEvent(new MouseEvent(c.event, opts(c)));
                }
                return true;
            }
        } catch (_) {}
        return false;
    });
    "#
);

/// Cheap change detector: URL plus the player's class attribute.
pub const FINGERPRINT: &str = concat!(
    resolve_player_js!(),
    r#"
    return { url: location.href, playerClass: player ? player.className : null };
    "#
);
