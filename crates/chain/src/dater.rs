//! Maps a real-world timestamp to a block number by binary search over
//! block timestamps.

use crate::provider::{ChainError, ChainTransport};

/// Lowest block whose timestamp is at or after `timestamp`.
///
/// Deterministic for a fixed chain state. A timestamp past the head block
/// is an error rather than a guess about future blocks.
pub async fn block_at_or_after<T: ChainTransport + Sync>(
    transport: &T,
    timestamp: u64,
) -> Result<u64, ChainError> {
    let head = transport.block_number().await?;
    if transport.block_timestamp(head).await? < timestamp {
        return Err(ChainError::TimestampBeyondHead { timestamp, head });
    }

    let mut low = 0u64;
    let mut high = head;
    while low < high {
        let mid = low + (high - low) / 2;
        if transport.block_timestamp(mid).await? >= timestamp {
            high = mid;
        } else {
            low = mid + 1;
        }
    }
    Ok(low)
}
