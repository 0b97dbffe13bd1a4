//! Storage Network Protocol
//!
//! Messages exchanged with a shard actor. In-process they travel over a
//! channel as-is; between processes they are `bincode`-encoded bodies on
//! [`ENDPOINT_TABLE`].

use serde::{Deserialize, Serialize};

use super::shard::ShardStats;
use crate::genome::codec::Key;
use crate::genome::types::Record;

// --- API Endpoints ---

/// Internal endpoint carrying a single `TableRequest` to the owning shard.
pub const ENDPOINT_TABLE: &str = "/internal/table";

/// Content type of `ENDPOINT_TABLE` bodies.
pub const BINCODE_CONTENT_TYPE: &str = "application/octet-stream";

/// Result of inserting one record into its owning shard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A free slot was reserved and written.
    Inserted,
    /// The key is already stored; nothing changed.
    Duplicate,
    /// Every slot in the probe sequence is taken by other keys.
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableRequest {
    Insert(Record),
    Find(Key),
    Stats,
}

impl TableRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            TableRequest::Insert(_) => "insert",
            TableRequest::Find(_) => "find",
            TableRequest::Stats => "stats",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableResponse {
    Insert(InsertOutcome),
    Find(Option<Record>),
    Stats(ShardStats),
}
