use anyhow::{anyhow, bail, Context, Result};
use fantoccini::{Client, ClientBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::driver::{Fingerprint, PageHost};
use crate::page::selectors;
use crate::{log_debug, log_info};

use super::scripts;
use super::snapshot::{Command, PageSnapshot, SnapshotPage};

const ENABLE_LOGS: bool = true;

fn chrome_caps(headless: bool) -> serde_json::Map<String, Value> {
    let mut args = vec![
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
        "--autoplay-policy=no-user-gesture-required".to_string(),
        "--disable-notifications".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".into(), json!("chrome"));
    caps.insert("goog:chromeOptions".into(), json!({ "args": args }));
    caps
}

/// A browser tab driven over WebDriver.
#[derive(Clone)]
pub struct WebDriverHost {
    client: Client,
}

impl WebDriverHost {
    pub async fn connect(webdriver_url: &str, headless: bool) -> Result<Self> {
        let client = ClientBuilder::native()
            .capabilities(chrome_caps(headless))
            .connect(webdriver_url)
            .await
            .with_context(|| format!("failed to open a WebDriver session at {webdriver_url}"))?;
        log_info!("WebDriver session created at {webdriver_url}");
        Ok(Self { client })
    }

    pub async fn open(&self, url: &Url) -> Result<()> {
        self.client
            .goto(url.as_str())
            .await
            .with_context(|| format!("failed to navigate to {url}"))?;
        log_info!("opened {url}");
        Ok(())
    }

    pub async fn close(self) {
        if let Err(err) = self.client.close().await {
            log_debug!("WebDriver session close failed: {err}");
        }
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.client
            .execute(script, args)
            .await
            .map_err(|err| anyhow!("script failed: {err}"))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FingerprintReply {
    url: String,
    player_class: Option<String>,
}

/// Media writes the flush script did not confirm. A missing or malformed
/// reply confirms nothing. Interactions stay best-effort.
fn unapplied_media_writes<'a>(commands: &'a [Command], applied: &[bool]) -> Vec<&'a Command> {
    commands
        .iter()
        .enumerate()
        .filter(|(i, _)| !applied.get(*i).copied().unwrap_or(false))
        .filter_map(|(_, command)| match command {
            Command::Interact { .. } => {
                log_debug!("host did not apply {command:?}");
                None
            }
            _ => Some(command),
        })
        .collect()
}

impl PageHost for WebDriverHost {
    async fn probe(&self) -> Result<SnapshotPage> {
        let value = self
            .execute(scripts::PROBE, vec![json!(selectors::probed())])
            .await?;
        let snapshot: PageSnapshot =
            serde_json::from_value(value).context("probe returned an unexpected shape")?;
        Ok(SnapshotPage::from(snapshot))
    }

    async fn flush(&self, commands: Vec<Command>) -> Result<()> {
        if commands.is_empty() {
            return Ok(());
        }
        let value = self
            .execute(scripts::FLUSH, vec![serde_json::to_value(&commands)?])
            .await?;
        let applied: Vec<bool> = serde_json::from_value(value).unwrap_or_default();
        let missed = unapplied_media_writes(&commands, &applied);
        if !missed.is_empty() {
            bail!("page did not apply {missed:?}");
        }
        Ok(())
    }

    async fn fingerprint(&self) -> Result<Fingerprint> {
        let value = self.execute(scripts::FINGERPRINT, Vec::new()).await?;
        let reply: FingerprintReply =
            serde_json::from_value(value).context("fingerprint returned an unexpected shape")?;
        Ok(Fingerprint {
            url: reply.url,
            player_class: reply.player_class,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restore() -> Vec<Command> {
        vec![
            Command::PlaybackRate { value: 1.0 },
            Command::Muted { value: false },
            Command::Interact {
                selector: ".ytp-ad-skip-button".into(),
                index: 0,
                event: "click",
                client_x: 10.0,
                client_y: 10.0,
            },
        ]
    }

    #[test]
    fn confirmed_flush_has_no_misses() {
        assert!(unapplied_media_writes(&restore(), &[true, true, true]).is_empty());
    }

    #[test]
    fn rejected_unmute_is_reported() {
        let commands = restore();
        let missed = unapplied_media_writes(&commands, &[true, false, true]);
        assert_eq!(missed, vec![&Command::Muted { value: false }]);
    }

    #[test]
    fn missed_interactions_are_tolerated() {
        assert!(unapplied_media_writes(&restore(), &[true, true, false]).is_empty());
    }

    #[test]
    fn empty_reply_confirms_nothing() {
        let commands = restore();
        assert_eq!(unapplied_media_writes(&commands, &[]).len(), 2);
    }
}
