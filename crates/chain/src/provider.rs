//! JSON-RPC transport behind a trait, so the pipeline can run against a
//! stub chain in tests. No retry layer: retry policy belongs to whatever
//! wraps the tool, not to the transport.

use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider, ProviderError},
    types::{Filter, Log, TransactionReceipt, H256},
};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("block {0} not found")]
    BlockNotFound(u64),
    #[error("fetched log is missing its block number or transaction hash (pending block?)")]
    PendingLog,
    #[error("provider error {0}")]
    Provider(#[from] ProviderError),
    #[error("timestamp {timestamp} is past the chain head (block {head})")]
    TimestampBeyondHead { timestamp: u64, head: u64 },
}

/// The chain operations the pipeline needs.
#[async_trait]
pub trait ChainTransport {
    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Current head block number.
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Unix timestamp of the given block.
    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError>;

    async fn logs(&self, filter: Filter) -> Result<Vec<Log>, ChainError>;

    /// Receipt for a mined transaction, `None` if the node has none.
    async fn transaction_receipt(
        &self,
        transaction: H256,
    ) -> Result<Option<TransactionReceipt>, ChainError>;
}

/// [`ChainTransport`] over an HTTP JSON-RPC endpoint.
#[derive(Clone, Debug)]
pub struct HttpProvider(Provider<Http>);

impl HttpProvider {
    pub fn new(url: Url) -> Self {
        Self(Provider::new(Http::new(url)))
    }
}

#[async_trait]
impl ChainTransport for HttpProvider {
    async fn chain_id(&self) -> Result<u64, ChainError> {
        Ok(self.0.get_chainid().await?.as_u64())
    }

    async fn block_number(&self) -> Result<u64, ChainError> {
        Ok(self.0.get_block_number().await?.as_u64())
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, ChainError> {
        let header = self
            .0
            .get_block(block)
            .await?
            .ok_or(ChainError::BlockNotFound(block))?;
        Ok(header.timestamp.low_u64())
    }

    async fn logs(&self, filter: Filter) -> Result<Vec<Log>, ChainError> {
        Ok(self.0.get_logs(&filter).await?)
    }

    async fn transaction_receipt(
        &self,
        transaction: H256,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        Ok(self.0.get_transaction_receipt(transaction).await?)
    }
}
