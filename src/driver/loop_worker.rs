use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::monitor::{ModeKind, Monitor, TickOutcome};
use crate::webdriver::SnapshotPage;

use super::{DriverConfig, PageHost, Trigger};

// Set to false to silence per-tick diagnostics from this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Single consumer of every tick request. Ticks never overlap: the timer,
/// settle deadline and trigger queue all feed this one loop.
pub async fn monitor_loop<H: PageHost>(
    host: H,
    mut monitor: Monitor,
    config: DriverConfig,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
    cancel_token: CancellationToken,
) -> Monitor {
    let mut ticker = time::interval(config.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let settle = time::sleep(config.navigation_settle);
    tokio::pin!(settle);
    let mut settling = false;
    let mut triggers_open = true;

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("monitor loop shutting down");
                break;
            }
            () = &mut settle, if settling => {
                settling = false;
                run_tick(&host, &mut monitor, &config).await;
            }
            received = triggers.recv(), if triggers_open => {
                let Some(first) = received else {
                    triggers_open = false;
                    continue;
                };
                let mut pending = vec![first];
                while let Ok(more) = triggers.try_recv() {
                    pending.push(more);
                }

                if let Some(url) = pending.iter().rev().find_map(|t| match t {
                    Trigger::Navigation { url } => Some(url),
                    Trigger::Mutation => None,
                }) {
                    log_info!("navigation to {url}; settling");
                    settle.as_mut().reset(Instant::now() + config.navigation_settle);
                    settling = true;
                }
                if pending.contains(&Trigger::Mutation) {
                    run_tick(&host, &mut monitor, &config).await;
                }
            }
            _ = ticker.tick() => {
                run_tick(&host, &mut monitor, &config).await;
            }
        }
    }

    release_on_exit(&host, &mut monitor, &config).await;
    monitor
}

async fn probe<H: PageHost>(host: &H, config: &DriverConfig) -> Option<SnapshotPage> {
    match time::timeout(config.probe_timeout, host.probe()).await {
        Ok(Ok(page)) => Some(page),
        Ok(Err(err)) => {
            log_debug!("probe failed: {err:?}");
            None
        }
        Err(_) => {
            log_warn!("probe timed out (> {:?})", config.probe_timeout);
            None
        }
    }
}

pub(crate) async fn run_tick<H: PageHost>(host: &H, monitor: &mut Monitor, config: &DriverConfig) {
    let Some(mut page) = probe(host, config).await else {
        return;
    };

    if let TickOutcome::NoPlayer = monitor.tick(&mut page, Instant::now()) {
        return;
    }

    if let Err(err) = host.flush(page.into_commands()).await {
        log_warn!("flushing tick writes failed: {err:?}");
        monitor.restore_not_applied();
    }
}

async fn release_on_exit<H: PageHost>(host: &H, monitor: &mut Monitor, config: &DriverConfig) {
    if monitor.status().mode != ModeKind::AdOverride {
        return;
    }
    let Some(mut page) = probe(host, config).await else {
        return;
    };
    if monitor.release(&mut page) {
        if let Err(err) = host.flush(page.into_commands()).await {
            log_warn!("restoring on exit failed: {err:?}");
            monitor.restore_not_applied();
        }
    }
}
