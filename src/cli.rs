use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use url::Url;

use crate::driver::DriverConfig;
use crate::settings::AdSettings;

#[derive(Parser, Debug)]
#[command(name = "adquick", version)]
#[command(about = "Mutes and speeds through video ads, then restores the viewer's settings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Settings file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Verbose per-tick logging
    #[arg(long, global = true, env = "ADQUICK_DEBUG", default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a watch page in a WebDriver session and monitor it until Ctrl-C
    Watch(WatchArgs),
    /// Show or change the stored ad settings
    Settings(SettingsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    pub url: Url,

    #[arg(long, env = "ADQUICK_WEBDRIVER", default_value = "http://localhost:9515")]
    pub webdriver: String,

    #[arg(long, default_value_t = false)]
    pub headless: bool,

    #[arg(long = "interval-ms", default_value_t = 150)]
    pub interval_ms: u64,

    /// Delay after a navigation before the next check
    #[arg(long = "settle-ms", default_value_t = 350)]
    pub settle_ms: u64,

    #[arg(long = "probe-timeout-ms", default_value_t = 2000)]
    pub probe_timeout_ms: u64,
}

impl WatchArgs {
    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            tick_interval: Duration::from_millis(self.interval_ms.max(1)),
            navigation_settle: Duration::from_millis(self.settle_ms),
            probe_timeout: Duration::from_millis(self.probe_timeout_ms.max(1)),
            ..DriverConfig::default()
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    #[arg(long = "ad-speed")]
    pub ad_speed: Option<f64>,

    #[arg(long = "auto-skip")]
    pub auto_skip: Option<bool>,

    #[arg(long = "use-max-ad-speed")]
    pub use_max_ad_speed: Option<bool>,
}

impl SettingsArgs {
    pub fn is_empty(&self) -> bool {
        self.ad_speed.is_none() && self.auto_skip.is_none() && self.use_max_ad_speed.is_none()
    }

    /// Overlay the given flags on `current`.
    pub fn apply(&self, current: AdSettings) -> AdSettings {
        AdSettings {
            ad_speed: self.ad_speed.unwrap_or(current.ad_speed),
            auto_skip: self.auto_skip.unwrap_or(current.auto_skip),
            use_max_ad_speed: self.use_max_ad_speed.unwrap_or(current.use_max_ad_speed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_defaults() {
        let cli = Cli::try_parse_from(["adquick", "watch", "https://www.youtube.com/watch?v=x"])
            .unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.driver_config(), DriverConfig::default());
        assert_eq!(args.url.host_str(), Some("www.youtube.com"));
        assert!(!args.headless);
    }

    #[test]
    fn watch_rejects_a_bad_url() {
        assert!(Cli::try_parse_from(["adquick", "watch", "not a url"]).is_err());
    }

    #[test]
    fn settings_flags_overlay_current_values() {
        let cli = Cli::try_parse_from([
            "adquick",
            "settings",
            "--ad-speed",
            "2.5",
            "--use-max-ad-speed",
            "false",
        ])
        .unwrap();
        let Command::Settings(args) = cli.command else {
            panic!("expected settings");
        };
        assert!(!args.is_empty());
        let next = args.apply(AdSettings::default());
        assert_eq!(next.ad_speed, 2.5);
        assert!(next.auto_skip);
        assert!(!next.use_max_ad_speed);
    }

    #[test]
    fn bare_settings_changes_nothing() {
        let cli = Cli::try_parse_from(["adquick", "settings"]).unwrap();
        let Command::Settings(args) = cli.command else {
            panic!("expected settings");
        };
        assert!(args.is_empty());
        assert_eq!(args.apply(AdSettings::default()), AdSettings::default());
    }
}
