//! Incremental ingestion: resolve a requested range into blocks, fetch the
//! tracked events, join each to its gas cost and upsert into the store.

pub mod pipeline;
pub mod resolver;
