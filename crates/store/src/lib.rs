//! Durable store for per-transaction write costs.
//!
//! One SQLite table, `CostOfWrites`, keyed by transaction hash. The write
//! path is a single named upsert whose merge policy is whole-row
//! overwrite, so re-ingesting a transaction always converges on the
//! latest observation and the key invariant (one row per transaction)
//! holds across re-runs.

use std::path::Path;

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use tabcost_types::{BlockRange, CostRecord, EventKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row {0} holds an unknown statement type")]
    CorruptRow(String),
    #[error("sqlite error {0}")]
    Sqlite(#[from] rusqlite::Error),
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS CostOfWrites (
    transactionId text primary key not null,
    network text,
    statementType text,
    block int,
    gasPrice int,
    gasUsed int
)";

/// Handle to the cost table. Opened once per process and passed explicitly
/// to whichever component needs it.
pub struct CostStore {
    conn: Connection,
}

impl CostStore {
    /// Opens (creating if needed) the database file and its schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Private throwaway database, for tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(SCHEMA, [])?;
        Ok(Self { conn })
    }

    /// High-water mark for incremental ingestion: the largest block among
    /// rows stored for `network`, or `None` when the network has no rows.
    pub fn highest_block(&self, network: &str) -> Result<Option<u64>, StoreError> {
        let highest = self.conn.query_row(
            "SELECT MAX(block) FROM CostOfWrites WHERE network = ?1",
            params![network],
            |row| row.get(0),
        )?;
        Ok(highest)
    }

    /// Insert-or-update keyed by `transactionId`.
    ///
    /// On conflict every non-key column is overwritten with the new
    /// values. One SQL statement, so the merge is atomic per record;
    /// concurrent upserts of different keys are safe and a repeat of the
    /// same key converges to the last call's values.
    pub fn upsert(&self, record: &CostRecord) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO CostOfWrites
                (transactionId, network, statementType, block, gasPrice, gasUsed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (transactionId) DO UPDATE SET
                network = excluded.network,
                statementType = excluded.statementType,
                block = excluded.block,
                gasPrice = excluded.gasPrice,
                gasUsed = excluded.gasUsed",
            params![
                record.transaction_id,
                record.network,
                record.statement_type.as_str(),
                record.block,
                record.gas_price,
                record.gas_used,
            ],
        )?;
        debug!("upserted {}", record.transaction_id);
        Ok(())
    }

    /// Average of `gasUsed * gasPrice` for one statement type over a block
    /// range, or `None` when no rows match.
    pub fn average_cost(
        &self,
        kind: EventKind,
        range: &BlockRange,
    ) -> Result<Option<f64>, StoreError> {
        let average = self.conn.query_row(
            "SELECT AVG(gasUsed * gasPrice) FROM CostOfWrites
             WHERE block BETWEEN ?1 AND ?2 AND statementType = ?3",
            params![range.start, range.end, kind.as_str()],
            |row| row.get(0),
        )?;
        Ok(average)
    }

    /// The stored row for a transaction, if any.
    pub fn get(&self, transaction_id: &str) -> Result<Option<CostRecord>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT transactionId, network, statementType, block, gasPrice, gasUsed
                 FROM CostOfWrites WHERE transactionId = ?1",
                params![transaction_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, u64>(3)?,
                        row.get::<_, u64>(4)?,
                        row.get::<_, u64>(5)?,
                    ))
                },
            )
            .optional()?;
        let Some((transaction_id, network, statement_type, block, gas_price, gas_used)) = row
        else {
            return Ok(None);
        };
        let statement_type = statement_type
            .parse()
            .map_err(|_| StoreError::CorruptRow(transaction_id.clone()))?;
        Ok(Some(CostRecord {
            transaction_id,
            network,
            statement_type,
            block,
            gas_price,
            gas_used,
        }))
    }

    /// Total number of stored rows.
    pub fn count(&self) -> Result<u64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM CostOfWrites", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Distinct networks that have stored rows.
    pub fn networks(&self) -> Result<Vec<String>, StoreError> {
        let mut statement = self
            .conn
            .prepare("SELECT DISTINCT network FROM CostOfWrites ORDER BY network")?;
        let rows = statement.query_map([], |row| row.get(0))?;
        let mut networks = Vec::new();
        for network in rows {
            networks.push(network?);
        }
        Ok(networks)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(id: &str, network: &str, kind: EventKind, block: u64) -> CostRecord {
        CostRecord {
            transaction_id: id.to_owned(),
            network: network.to_owned(),
            statement_type: kind,
            block,
            gas_price: 100,
            gas_used: 50,
        }
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let store = CostStore::open_in_memory().unwrap();
        let mut row = record("0x01", "mainnet", EventKind::TableCreated, 10);
        store.upsert(&row).unwrap();
        row.gas_price = 777;
        store.upsert(&row).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let stored = store.get("0x01").unwrap().unwrap();
        assert_eq!(stored, row);
    }

    #[test]
    fn test_highest_block_empty_store() {
        let store = CostStore::open_in_memory().unwrap();
        assert_eq!(store.highest_block("mainnet").unwrap(), None);
    }

    #[test]
    fn test_highest_block_is_per_network() {
        let store = CostStore::open_in_memory().unwrap();
        store
            .upsert(&record("0x01", "mainnet", EventKind::TableCreated, 10))
            .unwrap();
        store
            .upsert(&record("0x02", "mainnet", EventKind::StatementExecuted, 25))
            .unwrap();
        store
            .upsert(&record("0x03", "matic", EventKind::TableCreated, 90))
            .unwrap();

        assert_eq!(store.highest_block("mainnet").unwrap(), Some(25));
        assert_eq!(store.highest_block("matic").unwrap(), Some(90));
        assert_eq!(store.highest_block("optimism").unwrap(), None);
    }

    #[test]
    fn test_cross_kind_collision_keeps_one_row() {
        let store = CostStore::open_in_memory().unwrap();
        store
            .upsert(&record("0x01", "mainnet", EventKind::TableCreated, 10))
            .unwrap();
        store
            .upsert(&record("0x01", "mainnet", EventKind::StatementExecuted, 10))
            .unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let stored = store.get("0x01").unwrap().unwrap();
        assert_eq!(stored.statement_type, EventKind::StatementExecuted);
    }

    #[test]
    fn test_average_cost() {
        let store = CostStore::open_in_memory().unwrap();
        // (100 * 50 + 200 * 50) / 2 = 7500
        let mut first = record("0x01", "mainnet", EventKind::TableCreated, 10);
        first.gas_price = 100;
        let mut second = record("0x02", "mainnet", EventKind::TableCreated, 20);
        second.gas_price = 200;
        store.upsert(&first).unwrap();
        store.upsert(&second).unwrap();

        let range = BlockRange {
            start: 0,
            end: 1000,
        };
        let average = store
            .average_cost(EventKind::TableCreated, &range)
            .unwrap()
            .unwrap();
        assert_eq!(average, 7500.0);
        // No RunSQL rows in range.
        assert_eq!(
            store
                .average_cost(EventKind::StatementExecuted, &range)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_average_cost_respects_block_range() {
        let store = CostStore::open_in_memory().unwrap();
        store
            .upsert(&record("0x01", "mainnet", EventKind::TableCreated, 10))
            .unwrap();
        store
            .upsert(&record("0x02", "mainnet", EventKind::TableCreated, 500))
            .unwrap();

        let range = BlockRange { start: 0, end: 100 };
        let average = store
            .average_cost(EventKind::TableCreated, &range)
            .unwrap()
            .unwrap();
        assert_eq!(average, (100 * 50) as f64);
    }

    #[test]
    fn test_networks() {
        let store = CostStore::open_in_memory().unwrap();
        assert!(store.networks().unwrap().is_empty());
        store
            .upsert(&record("0x01", "matic", EventKind::TableCreated, 10))
            .unwrap();
        store
            .upsert(&record("0x02", "mainnet", EventKind::TableCreated, 10))
            .unwrap();
        assert_eq!(store.networks().unwrap(), vec!["mainnet", "matic"]);
    }
}
