//! Batch executor.
//!
//! # Responsibilities
//! - Gate each run through the reachability probe
//! - Dispatch attempts in fixed batches of `concurrency`
//! - Classify every attempt as success or failure with one log line
//! - Time the whole run
//!
//! # Data Flow
//! ```text
//! RequestSpec
//!     → validate (concurrency >= 1, configured limits)
//!     → probe.rs (reject → all failures, one log line)
//!     → batch k: spawn `concurrency` attempts, await all
//!     → batch k+1 ...
//!     → slots joined in attempt order → ResultRecord
//! ```
//!
//! # Design Decisions
//! - Strict batch boundary: batch k+1 never starts before batch k drains,
//!   so peak in-flight attempts is exactly `concurrency`
//! - Each attempt owns its result slot; no shared log buffer
//! - The HTTP client is shared; its configuration is immutable

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::redirect::Policy;
use reqwest::{Method, Response, StatusCode};
use serde::Deserialize;

use crate::config::ExecutorConfig;
use crate::loadtest::error::{LoadTestError, LoadTestResult};
use crate::loadtest::probe::ReachabilityProbe;
use crate::loadtest::types::{RequestSpec, ResultRecord};
use crate::observability::metrics;

/// Redirect hops an attempt follows before the last 3xx is kept as its answer.
const MAX_REDIRECTS: usize = 10;

/// Error payload the targets are expected to answer with on failure.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: String,
    details: String,
}

/// Outcome of a single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptOutcome {
    pub success: bool,
    pub line: String,
}

impl AttemptOutcome {
    fn success(line: String) -> Self {
        Self { success: true, line }
    }

    fn failure(line: String) -> Self {
        Self { success: false, line }
    }
}

/// Runs one [`RequestSpec`] to completion.
#[derive(Debug, Clone)]
pub struct BatchExecutor {
    client: reqwest::Client,
    probe: ReachabilityProbe,
    max_request_count: usize,
    max_concurrency: usize,
}

impl BatchExecutor {
    /// Build an executor with its shared attempt client and probe.
    pub fn new(config: &ExecutorConfig) -> LoadTestResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.attempt_timeout_secs))
            .redirect(redirect_policy())
            .build()?;
        let probe = ReachabilityProbe::new(Duration::from_secs(config.probe_timeout_secs))?;

        Ok(Self {
            client,
            probe,
            max_request_count: config.max_request_count,
            max_concurrency: config.max_concurrency,
        })
    }

    /// Check a spec against the intrinsic preconditions and configured limits.
    pub fn check(&self, spec: &RequestSpec, index: usize) -> LoadTestResult<()> {
        spec.validate(index)?;

        if spec.request_count > self.max_request_count {
            return Err(LoadTestError::InvalidSpec {
                index,
                reason: format!(
                    "req_count {} exceeds the configured maximum of {}",
                    spec.request_count, self.max_request_count
                ),
            });
        }
        if spec.concurrency > self.max_concurrency {
            return Err(LoadTestError::InvalidSpec {
                index,
                reason: format!(
                    "c_req_count {} exceeds the configured maximum of {}",
                    spec.concurrency, self.max_concurrency
                ),
            });
        }
        Ok(())
    }

    /// Run every attempt of `spec` and summarize the outcome.
    pub async fn run_batch(&self, spec: &RequestSpec) -> LoadTestResult<ResultRecord> {
        self.check(spec, 0)?;
        Ok(self.execute(spec).await)
    }

    /// Run a spec that already passed [`BatchExecutor::check`].
    pub(crate) async fn execute(&self, spec: &RequestSpec) -> ResultRecord {
        let start = Instant::now();

        if spec.request_count == 0 {
            return summarize(spec, Vec::new(), start);
        }

        tracing::info!(
            method = %spec.method,
            url = %spec.url,
            requests = spec.request_count,
            concurrency = spec.concurrency,
            "Starting run"
        );

        if !self.probe.is_reachable(&spec.url).await {
            tracing::warn!(url = %spec.url, "Target failed reachability gate, skipping run");
            let record = ResultRecord {
                method: spec.method.clone(),
                url: spec.url.clone(),
                success_count: 0,
                failure_count: spec.request_count,
                elapsed_seconds: start.elapsed().as_secs_f64(),
                log: format!("Invalid URL: {}\n", spec.url),
            };
            metrics::record_run("rejected", start);
            return record;
        }

        let shared = Arc::new(spec.clone());
        let mut outcomes = Vec::with_capacity(spec.request_count);
        let mut next = 0;

        while next < spec.request_count {
            let end = (next + spec.concurrency).min(spec.request_count);

            let handles = (next..end).map(|_| {
                let client = self.client.clone();
                let spec = Arc::clone(&shared);
                tokio::spawn(async move { attempt(&client, &spec).await })
            });

            for (offset, joined) in join_all(handles).await.into_iter().enumerate() {
                let outcome = joined.unwrap_or_else(|e| {
                    AttemptOutcome::failure(format!(
                        "[{}] 0 {} - attempt {} aborted: {}",
                        spec.method,
                        spec.url,
                        next + offset,
                        e
                    ))
                });
                metrics::record_attempt(outcome.success);
                outcomes.push(outcome);
            }

            tracing::debug!(url = %spec.url, completed = end, total = spec.request_count, "Batch drained");
            next = end;
        }

        metrics::record_run("accepted", start);
        let record = summarize(spec, outcomes, start);

        tracing::info!(
            url = %record.url,
            successful = record.success_count,
            failed = record.failure_count,
            elapsed_secs = record.elapsed_seconds,
            "Run complete"
        );
        record
    }
}

fn summarize(spec: &RequestSpec, outcomes: Vec<AttemptOutcome>, start: Instant) -> ResultRecord {
    let success_count = outcomes.iter().filter(|o| o.success).count();
    let failure_count = outcomes.len() - success_count;

    let mut log = String::new();
    for outcome in &outcomes {
        log.push_str(&outcome.line);
        log.push('\n');
    }

    ResultRecord {
        method: spec.method.clone(),
        url: spec.url.clone(),
        success_count,
        failure_count,
        elapsed_seconds: start.elapsed().as_secs_f64(),
        log,
    }
}

/// Follow redirects until `MAX_REDIRECTS` requests have been sent, then stop
/// and hand back the last redirect response.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

/// True when `response` is a redirect the client would have followed, which
/// only happens once the hop limit stopped the chain.
fn stopped_redirect(response: &Response) -> bool {
    matches!(
        response.status(),
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    ) && response.headers().contains_key(LOCATION)
}

fn build_request(client: &reqwest::Client, spec: &RequestSpec) -> Option<reqwest::Request> {
    let method = Method::from_bytes(spec.method.as_bytes()).ok()?;

    let mut headers = HeaderMap::with_capacity(spec.headers.len());
    for (name, value) in &spec.headers {
        let name = HeaderName::from_bytes(name.as_bytes()).ok()?;
        let value = HeaderValue::from_str(value).ok()?;
        headers.insert(name, value);
    }

    client
        .request(method, spec.url.as_str())
        .headers(headers)
        .body(spec.body.clone())
        .build()
        .ok()
}

async fn attempt(client: &reqwest::Client, spec: &RequestSpec) -> AttemptOutcome {
    let request = match build_request(client, spec) {
        Some(request) => request,
        None => {
            return AttemptOutcome::failure(format!(
                "[{}] 0 {} - error creating request",
                spec.method, spec.url
            ));
        }
    };

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!(url = %spec.url, error = %e, "Attempt failed");
            return AttemptOutcome::failure(format!(
                "[{}] {} - request failed before a response was received: {}",
                spec.method, spec.url, e
            ));
        }
    };

    let status = response.status();
    if stopped_redirect(&response) {
        tracing::debug!(url = %spec.url, status = %status, "Attempt stopped on redirect limit");
        return AttemptOutcome::failure(failure_line(
            spec,
            status,
            &format!("stopped after {} redirects", MAX_REDIRECTS),
        ));
    }

    if status.is_success() {
        return AttemptOutcome::success(format!(
            "[{}] {} {} - no error",
            spec.method,
            status.as_u16(),
            spec.url
        ));
    }

    let detail = match response.bytes().await {
        Ok(body) => describe_error_body(&body),
        Err(e) => format!("failed to read response body: {}", e),
    };
    AttemptOutcome::failure(failure_line(spec, status, &detail))
}

fn failure_line(spec: &RequestSpec, status: StatusCode, detail: &str) -> String {
    format!("[{}] {} {} - {}", spec.method, status.as_u16(), spec.url, detail)
}

/// Render a non-2xx body as `error details`, or the decode error.
fn describe_error_body(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => format!("{} {}", parsed.error, parsed.details),
        Err(e) => format!("failed to decode error body: {}", e),
    }
}
