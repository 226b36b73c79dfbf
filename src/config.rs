//! Startup configuration: environment (or CLI flag) values resolved once into an immutable [`Config`].

use std::fmt;
use std::time::Duration;

use clap::Args;
use thiserror::Error;

/// Default check interval in seconds
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 600;

/// Default probe target
pub const DEFAULT_CHECK_TARGET_HOST: &str = "https://www.baidu.com/";

/// Default portal mode
pub const DEFAULT_AUTH_MODE: &str = "XHA";

/// Portal mode -> login endpoint. Add a campus by adding a row.
pub const AUTH_MODES: &[(&str, &str)] = &[(
    "XHA",
    "https://192.168.101.201:802/eportal/portal/login",
)];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingCredential(&'static str),
}

/// Raw settings as given on the command line or in the environment
#[derive(Args, Debug, Clone, Default)]
pub struct Settings {
    /// Portal account
    #[arg(long, env = "WLJF_USERNAME")]
    pub username: Option<String>,

    /// Portal password
    #[arg(long, env = "WLJF_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Portal mode (selects the login endpoint)
    #[arg(long, env = "WLJF_MODE")]
    pub mode: Option<String>,

    /// Check interval in seconds
    #[arg(long, env = "CHECK_INTERVAL_SECONDS")]
    pub interval: Option<String>,

    /// Probe URL or host; `http://` is assumed when no scheme is given
    #[arg(long, env = "CHECK_TARGET_HOST")]
    pub target: Option<String>,
}

/// Resolved configuration, passed by reference to the probe and the portal login
#[derive(Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub auth_mode: String,
    pub auth_url: String,
    pub check_interval: Duration,
    pub check_target: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("auth_mode", &self.auth_mode)
            .field("auth_url", &self.auth_url)
            .field("check_interval", &self.check_interval)
            .field("check_target", &self.check_target)
            .finish()
    }
}

/// Look up the login endpoint for a mode (ASCII case-insensitive)
pub fn auth_url_for(mode: &str) -> Option<(&'static str, &'static str)> {
    let mode = mode.trim();
    AUTH_MODES
        .iter()
        .copied()
        .find(|(name, _)| name.eq_ignore_ascii_case(mode))
}

impl Config {
    /// Resolve settings. Only missing credentials are an error; every other
    /// bad value falls back to its default with a warning.
    pub fn resolve(settings: Settings) -> Result<Self, ConfigError> {
        let username = required(settings.username, "WLJF_USERNAME")?;
        let password = required(settings.password, "WLJF_PASSWORD")?;

        let (auth_mode, auth_url) = resolve_mode(settings.mode.as_deref());
        let check_interval = Duration::from_secs(resolve_interval(settings.interval.as_deref()));
        let check_target = resolve_target(settings.target);

        Ok(Self {
            username,
            password,
            auth_mode: auth_mode.to_string(),
            auth_url: auth_url.to_string(),
            check_interval,
            check_target,
        })
    }
}

fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingCredential(var)),
    }
}

fn default_mode() -> (&'static str, &'static str) {
    auth_url_for(DEFAULT_AUTH_MODE).unwrap_or(AUTH_MODES[0])
}

fn resolve_mode(raw: Option<&str>) -> (&'static str, &'static str) {
    let Some(raw) = raw else {
        tracing::info!("WLJF_MODE not set, using default {}", DEFAULT_AUTH_MODE);
        return default_mode();
    };
    match auth_url_for(raw) {
        Some(entry) => entry,
        None => {
            let (mode, url) = default_mode();
            tracing::warn!(
                "WLJF_MODE ({:?}) is not a known portal mode, using default {} ({})",
                raw,
                mode,
                url
            );
            (mode, url)
        }
    }
}

fn resolve_interval(raw: Option<&str>) -> u64 {
    let Some(raw) = raw else {
        tracing::info!(
            "CHECK_INTERVAL_SECONDS not set, using default {} s",
            DEFAULT_CHECK_INTERVAL_SECS
        );
        return DEFAULT_CHECK_INTERVAL_SECS;
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => {
            tracing::warn!(
                "CHECK_INTERVAL_SECONDS must be greater than 0, using default {} s",
                DEFAULT_CHECK_INTERVAL_SECS
            );
            DEFAULT_CHECK_INTERVAL_SECS
        }
        Ok(secs) => secs,
        Err(e) => {
            tracing::warn!(
                "CHECK_INTERVAL_SECONDS is invalid ({:?}: {}), using default {} s",
                raw,
                e,
                DEFAULT_CHECK_INTERVAL_SECS
            );
            DEFAULT_CHECK_INTERVAL_SECS
        }
    }
}

fn resolve_target(raw: Option<String>) -> String {
    match raw {
        Some(t) if !t.trim().is_empty() => t.trim().to_string(),
        Some(_) => {
            tracing::warn!(
                "CHECK_TARGET_HOST is empty, using default {}",
                DEFAULT_CHECK_TARGET_HOST
            );
            DEFAULT_CHECK_TARGET_HOST.to_string()
        }
        None => {
            tracing::info!(
                "CHECK_TARGET_HOST not set, using default {}",
                DEFAULT_CHECK_TARGET_HOST
            );
            DEFAULT_CHECK_TARGET_HOST.to_string()
        }
    }
}
