//! Portal Watchdog: log in to the campus captive portal whenever the network is down.

mod config;
mod network;
mod portal;
mod response;
mod watchdog;

#[cfg(test)]
mod testutil;

use clap::Parser;

use config::{Config, Settings};
use watchdog::Watchdog;

#[derive(Parser, Debug)]
#[command(
    name = "portal-watchdog",
    about = "Auto-login to the campus captive portal when the network is down",
    long_about = "Periodically probes a public URL. If it does not answer 2xx, submits the configured credentials to the ePortal login endpoint and reports the outcome."
)]
struct Cli {
    /// Run once: check network once, log in once if down, then exit (no loop)
    #[arg(long, short = '1', alias = "single")]
    pub once: bool,

    #[command(flatten)]
    pub settings: Settings,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::resolve(cli.settings)?;

    tracing::info!(
        "Portal Watchdog started, mode: {}",
        if cli.once { "single run" } else { "loop" }
    );
    tracing::info!("Username: {}", config.username);
    tracing::info!("Portal mode: {}", config.auth_mode);
    tracing::info!("Login URL: {}", config.auth_url);
    tracing::info!("Check target: {}", config.check_target);
    if !cli.once {
        tracing::info!("Checking network every {} s", config.check_interval.as_secs());
    }

    Watchdog::new(config)?.run(cli.once).await;
    Ok(())
}
