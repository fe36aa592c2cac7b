//! Load test engine.
//!
//! # Data Flow
//! ```text
//! [RequestSpec]
//!     → aggregator.rs (check all, then run one spec at a time)
//!     → executor.rs (per spec)
//!         → probe.rs (reachability gate, once per run)
//!         → batches of `concurrency` attempts
//!     → [ResultRecord] (same order as input)
//! ```
//!
//! # Design Decisions
//! - Invalid specs are rejected before any attempt is issued
//! - Per-attempt failures are counted and logged, never propagated
//! - A rejected target is an all-failures result, not an error

pub mod aggregator;
pub mod error;
pub mod executor;
pub mod probe;
pub mod types;

pub use aggregator::run_all;
pub use error::{LoadTestError, LoadTestResult};
pub use executor::BatchExecutor;
pub use probe::ReachabilityProbe;
pub use types::{RequestSpec, ResultRecord};
