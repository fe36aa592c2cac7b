//! URL load tester library.
//!
//! Fires `req_count` HTTP requests at a target in batches of `c_req_count`,
//! after a cheap reachability gate, and reports success/failure counts,
//! elapsed time and a per-attempt log.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod loadtest;
pub mod observability;

pub use config::TesterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use loadtest::{run_all, BatchExecutor, RequestSpec, ResultRecord};
