//! Reachability gate.
//!
//! # Responsibilities
//! - Decide once per run whether a target is worth spending request budget on
//! - Reject malformed or implausible hosts without touching the network
//! - Confirm DNS resolution and a single HEAD round trip for the rest
//!
//! # Design Decisions
//! - Never errors: every internal failure maps to "unreachable"
//! - `localhost` skips all further checks so local targets work offline
//! - The TLD check is a length heuristic (2..=6), not a registry lookup
//! - Redirects are not followed; a 3xx answer counts as reachable

use std::time::Duration;

use reqwest::redirect::Policy;
use url::Url;

use crate::loadtest::error::LoadTestResult;
use crate::observability::metrics;

const MIN_TLD_LEN: usize = 2;
const MAX_TLD_LEN: usize = 6;

/// Pre-flight probe run before a load test starts.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    client: reqwest::Client,
}

impl ReachabilityProbe {
    /// Create a probe whose HEAD request gives up after `timeout`.
    pub fn new(timeout: Duration) -> LoadTestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(Policy::none())
            .user_agent("url-tester-probe")
            .build()?;

        Ok(Self { client })
    }

    /// Return true if `raw` looks like a live HTTP(S) endpoint.
    pub async fn is_reachable(&self, raw: &str) -> bool {
        let reachable = self.check(raw).await;
        metrics::record_probe(reachable);
        reachable
    }

    async fn check(&self, raw: &str) -> bool {
        let url = match Url::parse(raw) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!(url = %raw, error = %e, "Probe rejected: unparsable URL");
                return false;
            }
        };

        let host = match authority_host(&url) {
            Some(host) => host,
            None => {
                tracing::debug!(url = %raw, "Probe rejected: missing scheme or host");
                return false;
            }
        };

        if is_localhost(&host) {
            return true;
        }

        if !has_plausible_tld(&host) {
            tracing::debug!(url = %raw, host = %host, "Probe rejected: implausible host");
            return false;
        }

        let hostname = url.host_str().unwrap_or_default();
        let port = url.port_or_known_default().unwrap_or(80);
        match tokio::net::lookup_host((hostname, port)).await {
            Ok(mut addrs) => {
                if addrs.next().is_none() {
                    tracing::debug!(host = %hostname, "Probe rejected: no DNS records");
                    return false;
                }
            }
            Err(e) => {
                tracing::debug!(host = %hostname, error = %e, "Probe rejected: DNS lookup failed");
                return false;
            }
        }

        self.head_accepts(url).await
    }

    /// Send a single HEAD to `url` and accept any answer below 400.
    ///
    /// Redirects are not followed, so a 3xx is accepted as is. Timeouts and
    /// transport errors reject.
    pub async fn head_accepts(&self, url: Url) -> bool {
        match self.client.head(url.clone()).send().await {
            Ok(response) => {
                let status = response.status();
                if status.as_u16() >= 400 {
                    tracing::debug!(url = %url, status = %status, "Probe rejected: error status");
                    return false;
                }
                true
            }
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "Probe rejected: HEAD request failed");
                false
            }
        }
    }
}

/// The host as written in the URL authority, port included when explicit.
fn authority_host(url: &Url) -> Option<String> {
    if url.scheme().is_empty() {
        return None;
    }
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn is_localhost(host: &str) -> bool {
    host == "localhost" || host.starts_with("localhost:")
}

fn has_plausible_tld(host: &str) -> bool {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let tld = labels[labels.len() - 1];
    (MIN_TLD_LEN..=MAX_TLD_LEN).contains(&tld.len())
}
