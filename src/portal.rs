//! Portal login request (ePortal `login` endpoint, JSONP over GET)

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::response::{self, LoginOutcome, CALLBACK};

/// Default login request timeout in seconds
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("invalid login URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Build the portal client
pub fn portal_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Login query fields. Device fields are placeholders; the portal fills them in.
pub fn login_query<'a>(username: &'a str, password: &'a str) -> [(&'static str, &'a str); 12] {
    [
        ("callback", CALLBACK),
        ("login_method", "1"),
        ("user_account", username),
        ("user_password", password),
        ("wlan_user_ip", "0.0.0.0"),
        ("wlan_user_ipv6", ""),
        ("wlan_user_mac", "000000000000"),
        ("wlan_ac_ip", ""),
        ("wlan_ac_name", ""),
        ("jsVersion", "4.1"),
        ("terminal_type", "1"),
        ("lang", "zh-cn"),
    ]
}

/// `auth_url?<encoded query>`
pub fn login_url(auth_url: &str, username: &str, password: &str) -> Result<Url, PortalError> {
    Ok(Url::parse_with_params(auth_url, login_query(username, password))?)
}

async fn submit(client: &reqwest::Client, config: &Config) -> Result<String, PortalError> {
    let url = login_url(&config.auth_url, &config.username, &config.password)?;
    // the full URL carries the password
    tracing::info!("Sending login request to {}", config.auth_url);

    let resp = client.get(url).send().await?;
    tracing::info!("Login response status: {}", resp.status().as_u16());
    Ok(resp.text().await?)
}

/// Attempt one portal login and report the outcome.
///
/// Returns `None` when the request could not be built or completed.
pub async fn login(client: &reqwest::Client, config: &Config) -> Option<LoginOutcome> {
    tracing::info!("Attempting portal login as {}...", config.username);

    let body = match submit(client, config).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Login attempt aborted: {}", e);
            return None;
        }
    };

    let outcome = response::classify(&body);
    outcome.report();
    Some(outcome)
}
