use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::monitor::{Monitor, MonitorStatus};

use super::loop_worker::monitor_loop;
use super::watcher::change_watcher;
use super::{DriverConfig, PageHost};

/// Owns the monitor loop and the change watcher for one page.
pub struct DriverController {
    monitor_handle: Option<JoinHandle<Monitor>>,
    watcher_handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl DriverController {
    pub fn new() -> Self {
        Self {
            monitor_handle: None,
            watcher_handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.monitor_handle.is_some()
    }

    pub fn start<H: PageHost>(&mut self, host: H, monitor: Monitor, config: DriverConfig) -> Result<()> {
        if self.monitor_handle.is_some() {
            bail!("monitor already running");
        }

        let cancel_token = CancellationToken::new();
        let (tx, rx) = mpsc::unbounded_channel();

        let watcher_handle = tokio::spawn(change_watcher(
            host.clone(),
            config.watch_interval,
            tx,
            cancel_token.clone(),
        ));
        let monitor_handle = tokio::spawn(monitor_loop(
            host,
            monitor,
            config,
            rx,
            cancel_token.clone(),
        ));

        self.monitor_handle = Some(monitor_handle);
        self.watcher_handle = Some(watcher_handle);
        self.cancel_token = Some(cancel_token);
        info!("monitor started");
        Ok(())
    }

    /// Cancels both tasks and waits for them. Returns the monitor's final
    /// status when it was running.
    pub async fn stop(&mut self) -> Result<Option<MonitorStatus>> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.watcher_handle.take() {
            handle.await.context("change watcher task failed to join")?;
        }

        match self.monitor_handle.take() {
            Some(handle) => {
                let monitor = handle.await.context("monitor loop task failed to join")?;
                Ok(Some(monitor.status()))
            }
            None => Ok(None),
        }
    }
}

impl Default for DriverController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Fingerprint;
    use crate::monitor::{ModeKind, OverridePolicy};
    use crate::webdriver::{Command, SnapshotPage};
    use std::time::Duration;

    #[derive(Clone)]
    struct EmptyHost;

    impl PageHost for EmptyHost {
        async fn probe(&self) -> Result<SnapshotPage> {
            bail!("no page")
        }

        async fn flush(&self, _commands: Vec<Command>) -> Result<()> {
            Ok(())
        }

        async fn fingerprint(&self) -> Result<Fingerprint> {
            Ok(Fingerprint::default())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn start_stop_lifecycle() {
        let mut controller = DriverController::new();
        assert!(controller.stop().await.unwrap().is_none());

        controller
            .start(EmptyHost, Monitor::new(OverridePolicy::default()), DriverConfig::default())
            .unwrap();
        assert!(controller.is_running());
        assert!(controller
            .start(EmptyHost, Monitor::new(OverridePolicy::default()), DriverConfig::default())
            .is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let status = controller.stop().await.unwrap().unwrap();
        assert_eq!(status.mode, ModeKind::Normal);
        assert!(!controller.is_running());
    }
}
