//! Retrieves `CreateTable` and `RunSQL` logs for a block range.

use ethers::types::Filter;
use log::debug;
use tabcost_types::{BlockRange, ChainEvent, EventKind};

use crate::{
    contract::Deployment,
    provider::{ChainError, ChainTransport},
};

/// Fixed processing order: table creations first, then SQL statements.
/// A transaction emitting both kinds therefore always ends up stored as
/// the statement-executed row.
const KIND_ORDER: [EventKind; 2] = [EventKind::TableCreated, EventKind::StatementExecuted];

/// All tracked events in `[range.start, range.end]`, in kind-then-chain
/// order. An empty range yields an empty vec without touching the chain.
pub async fn fetch_events<T: ChainTransport + Sync>(
    transport: &T,
    deployment: &Deployment,
    range: &BlockRange,
) -> Result<Vec<ChainEvent>, ChainError> {
    if range.is_empty() {
        debug!(
            "range {}..={} covers no blocks, skipping fetch",
            range.start, range.end
        );
        return Ok(Vec::new());
    }

    let mut events = Vec::new();
    for kind in KIND_ORDER {
        let filter = Filter::new()
            .address(deployment.address)
            .topic0(kind.topic())
            .from_block(range.start)
            .to_block(range.end);
        for log in transport.logs(filter).await? {
            let transaction_hash = log.transaction_hash.ok_or(ChainError::PendingLog)?;
            let block_number = log.block_number.ok_or(ChainError::PendingLog)?.as_u64();
            events.push(ChainEvent {
                transaction_hash,
                kind,
                block_number,
            });
        }
    }
    debug!(
        "fetched {} events in blocks {}..={}",
        events.len(),
        range.start,
        range.end
    );
    Ok(events)
}

#[cfg(test)]
mod test {
    use async_trait::async_trait;
    use ethers::types::{Log, TransactionReceipt, ValueOrArray, H160, H256, U64};

    use super::*;

    /// Transport that panics on use; empty ranges must never reach it.
    struct NoChain;

    #[async_trait]
    impl ChainTransport for NoChain {
        async fn chain_id(&self) -> Result<u64, ChainError> {
            unreachable!("chain must not be queried")
        }
        async fn block_number(&self) -> Result<u64, ChainError> {
            unreachable!("chain must not be queried")
        }
        async fn block_timestamp(&self, _block: u64) -> Result<u64, ChainError> {
            unreachable!("chain must not be queried")
        }
        async fn logs(&self, _filter: Filter) -> Result<Vec<Log>, ChainError> {
            unreachable!("chain must not be queried")
        }
        async fn transaction_receipt(
            &self,
            _transaction: H256,
        ) -> Result<Option<TransactionReceipt>, ChainError> {
            unreachable!("chain must not be queried")
        }
    }

    /// Transport serving canned logs, keyed by topic0.
    struct LogChain {
        logs: Vec<Log>,
    }

    #[async_trait]
    impl ChainTransport for LogChain {
        async fn chain_id(&self) -> Result<u64, ChainError> {
            Ok(31337)
        }
        async fn block_number(&self) -> Result<u64, ChainError> {
            Ok(u64::MAX)
        }
        async fn block_timestamp(&self, _block: u64) -> Result<u64, ChainError> {
            unreachable!("timestamps not used by the fetcher")
        }
        async fn logs(&self, filter: Filter) -> Result<Vec<Log>, ChainError> {
            let topic = match &filter.topics[0] {
                Some(ValueOrArray::Value(Some(topic))) => *topic,
                other => panic!("expected a topic0 filter, got {other:?}"),
            };
            Ok(self
                .logs
                .iter()
                .filter(|log| log.topics[0] == topic)
                .cloned()
                .collect())
        }
        async fn transaction_receipt(
            &self,
            _transaction: H256,
        ) -> Result<Option<TransactionReceipt>, ChainError> {
            Ok(None)
        }
    }

    fn log(kind: EventKind, block: u64, hash_byte: u8) -> Log {
        Log {
            address: H160::repeat_byte(0xaa),
            topics: vec![kind.topic()],
            block_number: Some(U64::from(block)),
            transaction_hash: Some(H256::repeat_byte(hash_byte)),
            ..Default::default()
        }
    }

    fn deployment() -> Deployment {
        Deployment {
            chain_id: 31337,
            chain_name: "local-tableland",
            address: H160::repeat_byte(0xaa),
        }
    }

    #[tokio::test]
    async fn test_empty_range_returns_no_events() {
        let range = BlockRange { start: 10, end: 9 };
        let events = fetch_events(&NoChain, &deployment(), &range).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_kind_then_chain_order() {
        let chain = LogChain {
            logs: vec![
                log(EventKind::StatementExecuted, 7, 0x01),
                log(EventKind::TableCreated, 5, 0x02),
                log(EventKind::StatementExecuted, 9, 0x03),
            ],
        };
        let range = BlockRange { start: 0, end: 100 };
        let events = fetch_events(&chain, &deployment(), &range).await.unwrap();
        let kinds: Vec<_> = events.iter().map(|event| event.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TableCreated,
                EventKind::StatementExecuted,
                EventKind::StatementExecuted,
            ]
        );
        assert_eq!(events[0].block_number, 5);
        assert_eq!(events[0].transaction_hash, H256::repeat_byte(0x02));
    }

    #[tokio::test]
    async fn test_pending_log_is_an_error() {
        let mut pending = log(EventKind::TableCreated, 5, 0x02);
        pending.block_number = None;
        let chain = LogChain {
            logs: vec![pending],
        };
        let range = BlockRange { start: 0, end: 100 };
        let result = fetch_events(&chain, &deployment(), &range).await;
        assert!(matches!(result, Err(ChainError::PendingLog)));
    }
}
