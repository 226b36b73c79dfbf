//! Check-and-login cycle, run once at startup and then on a fixed interval

use tokio::time::{interval, MissedTickBehavior};

use crate::config::Config;
use crate::network::{self, DEFAULT_PROBE_TIMEOUT_SECS};
use crate::portal::{self, DEFAULT_AUTH_TIMEOUT_SECS};
use crate::response::LoginOutcome;

/// What one cycle did
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Connected,
    /// `None`: the attempt was aborted before a response was classified
    LoginAttempted(Option<LoginOutcome>),
}

pub struct Watchdog {
    config: Config,
    probe: reqwest::Client,
    portal: reqwest::Client,
}

impl Watchdog {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let probe = network::probe_client(DEFAULT_PROBE_TIMEOUT_SECS)
            .map_err(|e| anyhow::anyhow!("Failed to build probe client: {}", e))?;
        let portal = portal::portal_client(DEFAULT_AUTH_TIMEOUT_SECS)
            .map_err(|e| anyhow::anyhow!("Failed to build portal client: {}", e))?;
        Ok(Self {
            config,
            probe,
            portal,
        })
    }

    /// Probe, and log in only when the probe fails
    pub async fn check_and_login(&self) -> CycleOutcome {
        if network::test_network(&self.probe, &self.config.check_target).await {
            return CycleOutcome::Connected;
        }
        CycleOutcome::LoginAttempted(portal::login(&self.portal, &self.config).await)
    }

    /// Run cycles forever (or a single one with `once`). Cycles never overlap.
    pub async fn run(&self, once: bool) {
        if once {
            let outcome = self.check_and_login().await;
            tracing::info!("--once mode, exiting after one run ({:?})", outcome);
            return;
        }

        let mut ticker = interval(self.config.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            // first tick completes immediately
            ticker.tick().await;
            let outcome = self.check_and_login().await;
            tracing::debug!("Cycle finished: {:?}", outcome);
            tracing::info!("Next check in {} s", self.config.check_interval.as_secs());
        }
    }
}
