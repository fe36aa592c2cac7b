//! Sequential run aggregation.

use crate::loadtest::error::LoadTestResult;
use crate::loadtest::executor::BatchExecutor;
use crate::loadtest::types::{RequestSpec, ResultRecord};

/// Run every spec in order and return one record per spec.
///
/// All specs are checked up front, so an invalid spec anywhere in the list
/// rejects the call before any attempt is dispatched. Specs never overlap in
/// time: the next run starts only after the previous record is produced.
pub async fn run_all(
    executor: &BatchExecutor,
    specs: &[RequestSpec],
) -> LoadTestResult<Vec<ResultRecord>> {
    for (index, spec) in specs.iter().enumerate() {
        executor.check(spec, index)?;
    }

    tracing::info!(specs = specs.len(), "Starting load test");

    let mut records = Vec::with_capacity(specs.len());
    for spec in specs {
        records.push(executor.execute(spec).await);
    }
    Ok(records)
}
