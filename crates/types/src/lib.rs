//! Types shared across the write-cost tracker: the two contract event
//! kinds, the transient event/range forms and the persisted cost record.

use std::str::FromStr;

use ethers::{types::H256, utils::keccak256};
use thiserror::Error;

/// The two TablelandTables events this tool tracks.
///
/// Rendered in storage and on the CLI using the contract's event names
/// (`CreateTable` / `RunSQL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    TableCreated,
    StatementExecuted,
}

impl EventKind {
    /// Name used in the `statementType` column and the `read` command.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TableCreated => "CreateTable",
            EventKind::StatementExecuted => "RunSQL",
        }
    }

    /// Canonical Solidity event signature.
    pub fn signature(&self) -> &'static str {
        match self {
            EventKind::TableCreated => "CreateTable(address,uint256,string)",
            EventKind::StatementExecuted => {
                "RunSQL(address,bool,uint256,string,(bool,bool,bool,string,string,string[]))"
            }
        }
    }

    /// topic0 for log filtering: keccak of the canonical signature.
    pub fn topic(&self) -> H256 {
        H256::from(keccak256(self.signature().as_bytes()))
    }
}

#[derive(Debug, Error)]
#[error("unknown statement type '{0}', expected CreateTable or RunSQL")]
pub struct UnknownEventKind(String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreateTable" => Ok(EventKind::TableCreated),
            "RunSQL" => Ok(EventKind::StatementExecuted),
            other => Err(UnknownEventKind(other.to_owned())),
        }
    }
}

/// One emitted contract log, as fetched from the chain. Transient; events
/// become [`CostRecord`]s once joined to their receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainEvent {
    pub transaction_hash: H256,
    pub kind: EventKind,
    pub block_number: u64,
}

/// The persisted unit: one row per transaction in the `CostOfWrites` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostRecord {
    /// 0x-prefixed hex of the transaction hash. Primary key.
    pub transaction_id: String,
    pub network: String,
    pub statement_type: EventKind,
    pub block: u64,
    /// Effective gas price in wei.
    pub gas_price: u64,
    pub gas_used: u64,
}

/// Inclusive block range, produced by range resolution and consumed by one
/// event fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub start: u64,
    pub end: u64,
}

impl BlockRange {
    /// A range with start past end covers no blocks.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}

/// Converts bytes to 0x-prefixed hex string.
pub fn hex_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    format!("0x{}", hex::encode(bytes))
}
