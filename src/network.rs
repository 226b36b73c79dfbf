//! Connectivity probe

use std::borrow::Cow;
use std::time::Duration;

/// Default probe request timeout in seconds
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// Build the probe client. Redirects are not followed: a portal that
/// intercepts with a 3xx must read as "not connected".
pub fn probe_client(timeout_secs: u64) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

/// Target as a URL, `http://` prepended when no scheme is given
pub fn probe_url(target: &str) -> Cow<'_, str> {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Cow::Borrowed(target)
    } else {
        Cow::Owned(format!("http://{}", target))
    }
}

/// Probe connectivity: true only on a 2xx response
pub async fn test_network(client: &reqwest::Client, target: &str) -> bool {
    let url = probe_url(target);
    tracing::info!("Checking network (target: {})...", url);

    let resp = match client.get(url.as_ref()).send().await {
        Ok(resp) => resp,
        Err(e) => {
            tracing::warn!("Network check failed (cannot reach {}): {}", url, e);
            return false;
        }
    };

    let status = resp.status();
    // drain so the connection is released on every path
    if let Err(e) = resp.bytes().await {
        tracing::debug!("Failed to drain probe body from {}: {}", url, e);
    }

    if status.is_success() {
        tracing::info!("Network OK ({} answered {})", url, status.as_u16());
        true
    } else {
        tracing::warn!(
            "{} answered unexpected status {}, portal login probably required",
            url,
            status.as_u16()
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{serve, UNREACHABLE};

    #[test]
    fn test_probe_url_adds_scheme_once() {
        assert_eq!(probe_url("www.baidu.com"), "http://www.baidu.com");
        assert_eq!(probe_url("10.0.0.1:8080/ok"), "http://10.0.0.1:8080/ok");
        assert_eq!(probe_url("http://example.com/"), "http://example.com/");
        assert_eq!(probe_url("https://example.com/"), "https://example.com/");
        assert_eq!(probe_url("HTTPS://example.com/"), "HTTPS://example.com/");
        assert_eq!(probe_url("ftp.example.com"), "http://ftp.example.com");
    }

    #[tokio::test]
    async fn test_success_statuses_are_connected() {
        let client = probe_client(DEFAULT_PROBE_TIMEOUT_SECS).unwrap();
        for status in [200, 204, 299] {
            let server = serve(status, "ok").await;
            assert!(
                test_network(&client, &server.base_url()).await,
                "status {}",
                status
            );
        }
    }

    #[tokio::test]
    async fn test_other_statuses_are_not_connected() {
        let client = probe_client(DEFAULT_PROBE_TIMEOUT_SECS).unwrap();
        for status in [301, 302, 404, 500, 503] {
            let server = serve(status, "<html>portal</html>").await;
            assert!(
                !test_network(&client, &server.base_url()).await,
                "status {}",
                status
            );
            assert_eq!(server.hits(), 1);
        }
    }

    #[tokio::test]
    async fn test_schemeless_target_is_probed_over_http() {
        let client = probe_client(DEFAULT_PROBE_TIMEOUT_SECS).unwrap();
        let server = serve(204, "").await;

        assert!(test_network(&client, &server.addr().to_string()).await);
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_connected() {
        let client = probe_client(1).unwrap();
        assert!(!test_network(&client, UNREACHABLE).await);
    }
}
