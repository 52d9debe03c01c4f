pub mod cli;
pub mod detection;
pub mod driver;
pub mod monitor;
pub mod page;
pub mod settings;
mod utils;
pub mod webdriver;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command, SettingsArgs, WatchArgs};
use driver::DriverController;
use monitor::{Monitor, OverridePolicy};
use settings::SettingsStore;
use webdriver::WebDriverHost;

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (reads RUST_LOG env var)
    let mut logger = env_logger::Builder::new();
    logger.filter_level(log::LevelFilter::Info);
    if cli.debug {
        logger.filter_module("adquick_lib", log::LevelFilter::Debug);
    }
    logger.parse_default_env().init();

    let store = open_store(&cli)?;

    match cli.command {
        Command::Settings(args) => settings_command(&store, &args),
        Command::Watch(args) => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start the runtime")?;
            runtime.block_on(watch(&store, &args))
        }
    }
}

fn open_store(cli: &Cli) -> Result<SettingsStore> {
    let path = match &cli.settings {
        Some(path) => path.clone(),
        None => settings::default_path().context("No config directory for this user")?,
    };
    Ok(SettingsStore::new(path))
}

fn settings_command(store: &SettingsStore, args: &SettingsArgs) -> Result<()> {
    let current = store.ad_settings();
    let shown = if args.is_empty() {
        current
    } else {
        let saved = store.update(args.apply(current))?;
        log::info!("Saved settings to {}", store.path().display());
        saved
    };
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}

async fn watch(store: &SettingsStore, args: &WatchArgs) -> Result<()> {
    let settings = store.ad_settings();
    log::info!(
        "adquick starting: speed {}{}, auto-skip {}",
        settings.ad_speed,
        if settings.use_max_ad_speed { " (max)" } else { "" },
        settings.auto_skip
    );

    let host = WebDriverHost::connect(&args.webdriver, args.headless).await?;
    if let Err(err) = host.open(&args.url).await {
        host.close().await;
        return Err(err);
    }

    let mut controller = DriverController::new();
    let monitor = Monitor::new(OverridePolicy::from_settings(&settings));
    controller.start(host.clone(), monitor, args.driver_config())?;

    let waited = tokio::signal::ctrl_c().await;
    if let Err(err) = &waited {
        log::warn!("Failed to listen for Ctrl-C: {err}");
    }

    let stopped = controller.stop().await;
    host.close().await;

    match stopped? {
        Some(status) => log::info!("Stopped in {:?} mode", status.mode),
        None => log::info!("Stopped"),
    }
    waited.context("Ctrl-C handler failed")
}
