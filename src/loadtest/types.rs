//! Load test input and output types.
//!
//! Both types carry their JSON wire names so the HTTP boundary and the CLI
//! can (de)serialize them directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::loadtest::error::LoadTestError;

/// One load test to run: a target plus how hard to hit it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestSpec {
    /// Absolute target URL.
    pub url: String,

    /// HTTP method, sent exactly as supplied.
    pub method: String,

    /// Raw request body, attached regardless of method.
    #[serde(default)]
    pub body: String,

    /// Headers applied verbatim to every attempt.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Total number of attempts to issue.
    #[serde(rename = "req_count")]
    pub request_count: usize,

    /// Maximum attempts in flight at once.
    #[serde(rename = "c_req_count")]
    pub concurrency: usize,
}

impl RequestSpec {
    /// Create a spec with an empty body and no headers.
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        request_count: usize,
        concurrency: usize,
    ) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            body: String::new(),
            headers: HashMap::new(),
            request_count,
            concurrency,
        }
    }

    /// Attach a request body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Check preconditions that must hold before any attempt is dispatched.
    ///
    /// `index` is the spec's position in the submitted batch, used only for
    /// error reporting.
    pub fn validate(&self, index: usize) -> Result<(), LoadTestError> {
        if self.concurrency == 0 {
            return Err(LoadTestError::InvalidSpec {
                index,
                reason: "c_req_count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Aggregate outcome of one [`RequestSpec`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ResultRecord {
    pub method: String,
    pub url: String,

    #[serde(rename = "successful_requests")]
    pub success_count: usize,

    #[serde(rename = "failed_requests")]
    pub failure_count: usize,

    /// Wall-clock duration of the whole run, in seconds.
    #[serde(rename = "time")]
    pub elapsed_seconds: f64,

    /// One line per attempt, for display.
    #[serde(rename = "logs")]
    pub log: String,
}

impl ResultRecord {
    /// Total attempts accounted for by this record.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}
