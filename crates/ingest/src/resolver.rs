//! Resolves a requested range specifier into a concrete block range.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::debug;
use tabcost_chain::{
    dater::block_at_or_after,
    provider::{ChainError, ChainTransport},
};
use tabcost_store::{CostStore, StoreError};
use tabcost_types::BlockRange;
use thiserror::Error;

const DATE_FORMAT: &str = "%m-%d-%Y";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("chain lookup failed while resolving range: {0}")]
    Chain(#[from] ChainError),
    #[error("date {0} predates the unix epoch")]
    DateBeforeEpoch(NaiveDate),
    #[error("invalid range specifier '{0}', expected 'latest' or MM-DD-YYYY")]
    InvalidDate(String),
    #[error("store lookup failed while resolving range: {0}")]
    Store(#[from] StoreError),
}

/// Where ingestion starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSpec {
    /// Resume one past the highest block already stored for the network,
    /// or from genesis when the network has no rows yet.
    Latest,
    /// First block at or after midnight UTC of the date.
    Date(NaiveDate),
}

impl FromStr for RangeSpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "latest" {
            return Ok(RangeSpec::Latest);
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(RangeSpec::Date)
            .map_err(|_| ResolveError::InvalidDate(s.to_owned()))
    }
}

/// Where ingestion ends. The CLI always passes `Head`; an explicit block
/// exists for callers needing a bounded range (a `--to` flag is a known
/// gap, not resolved here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEnd {
    Head,
    Block(u64),
}

/// Turns a specifier into the inclusive block range for one run.
///
/// The `Latest` path is what makes ingestion incremental: a re-run can
/// never start earlier than one past the last stored block, and never
/// skips blocks.
pub async fn resolve<T: ChainTransport + Sync>(
    spec: &RangeSpec,
    end: RangeEnd,
    transport: &T,
    store: &CostStore,
    network: &str,
) -> Result<BlockRange, ResolveError> {
    let start = match spec {
        RangeSpec::Latest => match store.highest_block(network)? {
            Some(block) => block + 1,
            None => 0,
        },
        RangeSpec::Date(date) => {
            let midnight = NaiveDateTime::new(*date, NaiveTime::MIN)
                .and_utc()
                .timestamp();
            let timestamp =
                u64::try_from(midnight).map_err(|_| ResolveError::DateBeforeEpoch(*date))?;
            block_at_or_after(transport, timestamp).await?
        }
    };
    let end = match end {
        RangeEnd::Head => transport.block_number().await?,
        RangeEnd::Block(block) => block,
    };
    debug!("resolved range {start}..={end} for {network}");
    Ok(BlockRange { start, end })
}
