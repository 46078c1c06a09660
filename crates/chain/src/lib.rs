//! Chain access for the write-cost tracker: the HTTP transport, the
//! Tableland deployment registry, event fetching, receipt enrichment and
//! block-by-timestamp lookups.

pub mod contract;
pub mod dater;
pub mod enrich;
pub mod fetch;
pub mod provider;
