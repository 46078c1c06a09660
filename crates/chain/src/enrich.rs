//! Joins each fetched event to its transaction receipt to price the write.

use ethers::types::{H256, U256};
use futures::{stream, StreamExt};
use tabcost_types::{hex_encode, ChainEvent, CostRecord};
use thiserror::Error;

use crate::provider::{ChainError, ChainTransport};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("chain error {0}")]
    Chain(#[from] ChainError),
    #[error("gas value in receipt for transaction {0:#x} does not fit in 64 bits")]
    GasValueOverflow(H256),
    #[error("receipt for transaction {0:#x} is missing its gas fields")]
    ReceiptIncomplete(H256),
    #[error("no receipt found for transaction {0:#x}")]
    ReceiptNotFound(H256),
}

/// Fetches the receipt for one event and builds the row to persist.
pub async fn enrich<T: ChainTransport + Sync>(
    transport: &T,
    network: &str,
    event: ChainEvent,
) -> Result<CostRecord, EnrichError> {
    let hash = event.transaction_hash;
    let receipt = transport
        .transaction_receipt(hash)
        .await?
        .ok_or(EnrichError::ReceiptNotFound(hash))?;
    let gas_price = receipt
        .effective_gas_price
        .ok_or(EnrichError::ReceiptIncomplete(hash))?;
    let gas_used = receipt
        .gas_used
        .ok_or(EnrichError::ReceiptIncomplete(hash))?;
    Ok(CostRecord {
        transaction_id: hex_encode(hash.as_bytes()),
        network: network.to_owned(),
        statement_type: event.kind,
        block: event.block_number,
        gas_price: gas_to_u64(gas_price, hash)?,
        gas_used: gas_to_u64(gas_used, hash)?,
    })
}

/// Enriches a batch with at most `concurrency` receipt lookups in flight.
///
/// Output order matches input order, so the deterministic merge order from
/// the fetcher survives the parallelism. Failures are reported per
/// transaction instead of aborting the batch.
pub async fn enrich_all<T: ChainTransport + Sync>(
    transport: &T,
    network: &str,
    events: Vec<ChainEvent>,
    concurrency: usize,
) -> Vec<(H256, Result<CostRecord, EnrichError>)> {
    stream::iter(events)
        .map(|event| async move {
            (
                event.transaction_hash,
                enrich(transport, network, event).await,
            )
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// The schema stores gas values as 64-bit integers; receipts carry U256.
fn gas_to_u64(value: U256, transaction: H256) -> Result<u64, EnrichError> {
    if value > U256::from(u64::MAX) {
        return Err(EnrichError::GasValueOverflow(transaction));
    }
    Ok(value.as_u64())
}
