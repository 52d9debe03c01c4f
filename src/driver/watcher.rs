use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{Fingerprint, PageHost, Trigger};

const ENABLE_LOGS: bool = false;

use crate::log_debug;

/// Triggers implied by moving from `prev` to `next`.
pub fn changes(prev: &Fingerprint, next: &Fingerprint) -> Vec<Trigger> {
    let mut out = Vec::new();
    if prev.url != next.url {
        out.push(Trigger::Navigation {
            url: next.url.clone(),
        });
    }
    if prev.player_class != next.player_class {
        out.push(Trigger::Mutation);
    }
    out
}

/// Polls the page fingerprint and turns differences into tick requests.
/// Exits when cancelled or when the monitor loop stops listening.
pub async fn change_watcher<H: PageHost>(
    host: H,
    every: Duration,
    tx: mpsc::UnboundedSender<Trigger>,
    cancel_token: CancellationToken,
) {
    let mut ticker = time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last: Option<Fingerprint> = None;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let next = match host.fingerprint().await {
                    Ok(fp) => fp,
                    Err(err) => {
                        log_debug!("fingerprint failed: {err:?}");
                        continue;
                    }
                };
                if let Some(prev) = &last {
                    for trigger in changes(prev, &next) {
                        if tx.send(trigger).is_err() {
                            return;
                        }
                    }
                }
                last = Some(next);
            }
        }
    }
}
