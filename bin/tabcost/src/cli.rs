//! Command Line Interface for tabcost

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tabcost_types::EventKind;
use url::Url;

pub const DEFAULT_DB_PATH: &str = "cost_of_writes.db";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct AppArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Retrieve write events from the chain and store their gas costs
    Fetch {
        /// JSON RPC API provider URL (e.g., https://eth-mainnet.alchemyapi.io/v2/123abc...).
        /// Falls back to the TABCOST_PROVIDER_URL environment variable.
        #[clap(short, long)]
        provider_url: Option<Url>,
        /// Earliest point to fetch from: "latest" resumes after the highest
        /// stored block, MM-DD-YYYY starts at that date
        #[clap(short, long, default_value = "latest")]
        from: String,
        /// Path of the sqlite database
        #[clap(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
        /// Maximum receipt lookups in flight
        #[clap(long, default_value_t = 8)]
        concurrency: usize,
    },
    /// Log the average cost of the specified statement type
    Read {
        /// Which statement type to average
        #[clap(value_enum, short, long, default_value_t = Method::CreateTable)]
        method: Method,
        /// Path of the sqlite database
        #[clap(long, default_value = DEFAULT_DB_PATH)]
        db: PathBuf,
    },
}

/// Statement type as named by the contract events.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Method {
    #[value(name = "CreateTable")]
    CreateTable,
    #[value(name = "RunSQL")]
    RunSql,
}

impl From<Method> for EventKind {
    fn from(method: Method) -> Self {
        match method {
            Method::CreateTable => EventKind::TableCreated,
            Method::RunSql => EventKind::StatementExecuted,
        }
    }
}
