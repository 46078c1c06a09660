//! One ingestion run: resolve the range, fetch both event kinds, join each
//! event to its receipt and upsert the costs.

use ethers::types::H256;
use log::{info, warn};
use tabcost_chain::{
    contract::Deployment,
    enrich::enrich_all,
    fetch::fetch_events,
    provider::{ChainError, ChainTransport},
};
use tabcost_store::CostStore;
use tabcost_types::BlockRange;
use thiserror::Error;

use crate::resolver::{resolve, RangeEnd, RangeSpec, ResolveError};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("event fetch failed: {0}")]
    Fetch(#[from] ChainError),
    #[error("range resolution failed: {0}")]
    Resolve(#[from] ResolveError),
}

/// Outcome of one run.
///
/// Per-event enrichment and store failures land in `failed` with the
/// offending transaction hash instead of aborting the batch. Rows upserted
/// before a failure stay valid; the next `Latest` run resumes from the
/// highest block actually persisted and re-processing is idempotent.
#[derive(Debug)]
pub struct IngestReport {
    pub range: BlockRange,
    pub fetched: usize,
    pub upserted: usize,
    pub failed: Vec<(H256, String)>,
}

/// Runs the pipeline once: resolve, fetch, enrich, upsert.
///
/// Range-resolution and event-fetch errors abort the run; without a valid
/// range there is nothing partial worth keeping.
pub async fn run<T: ChainTransport + Sync>(
    transport: &T,
    store: &CostStore,
    deployment: &Deployment,
    spec: &RangeSpec,
    end: RangeEnd,
    concurrency: usize,
) -> Result<IngestReport, PipelineError> {
    let range = resolve(spec, end, transport, store, deployment.chain_name).await?;
    let events = fetch_events(transport, deployment, &range).await?;
    let fetched = events.len();
    info!(
        "fetched {fetched} events in blocks {}..={} on {}",
        range.start, range.end, deployment.chain_name
    );

    let mut upserted = 0;
    let mut failed = Vec::new();
    for (transaction, outcome) in
        enrich_all(transport, deployment.chain_name, events, concurrency).await
    {
        let record = match outcome {
            Ok(record) => record,
            Err(error) => {
                warn!("skipping transaction {transaction:#x}: {error}");
                failed.push((transaction, error.to_string()));
                continue;
            }
        };
        match store.upsert(&record) {
            Ok(()) => upserted += 1,
            Err(error) => {
                warn!("failed to store transaction {transaction:#x}: {error}");
                failed.push((transaction, error.to_string()));
            }
        }
    }
    Ok(IngestReport {
        range,
        fetched,
        upserted,
        failed,
    })
}
