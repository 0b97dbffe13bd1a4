//! Distributed Table
//!
//! Cluster-wide `insert`/`find` over per-worker shards. The router picks the
//! owning worker; the request then goes to that worker's shard actor, either
//! through the local handle or through the transport. All probing happens
//! inside the owner's actor, so the only write exclusivity needed is the
//! actor's one-message-at-a-time loop.
//!
//! A single lock hosted on worker 0, taken around every probe, would also
//! give exclusivity but serializes the whole cluster on one worker; routing
//! to per-shard owners replaces it.

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};

use super::error::{Result, TableError};
use super::partitioner::{OwnershipRouter, WorkerId};
use super::protocol::{InsertOutcome, TableRequest, TableResponse};
use super::shard::ShardStats;
use super::transport::Transport;
use super::worker::ShardHandle;
use crate::genome::codec::Key;
use crate::genome::types::Record;

/// Default bound on inserts outstanding at once during `insert_all`.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub duplicates: usize,
}

pub struct DistributedTable<T> {
    router: OwnershipRouter,
    self_id: WorkerId,
    local: ShardHandle,
    transport: T,
}

impl<T: Transport> DistributedTable<T> {
    pub fn new(router: OwnershipRouter, local: ShardHandle, transport: T) -> Self {
        Self {
            router,
            self_id: local.worker(),
            local,
            transport,
        }
    }

    pub fn self_id(&self) -> WorkerId {
        self.self_id
    }

    /// Capacity of this worker's shard, not of the whole cluster.
    pub fn size(&self) -> usize {
        self.local.capacity()
    }

    async fn dispatch(&self, owner: WorkerId, request: TableRequest) -> Result<TableResponse> {
        if owner == self.self_id {
            self.local.call(request).await
        } else {
            self.transport.call(owner, request).await
        }
    }

    pub async fn insert(&self, record: Record) -> Result<InsertOutcome> {
        let owner = self.router.owner(&record.key);
        match self.dispatch(owner, TableRequest::Insert(record)).await? {
            TableResponse::Insert(outcome) => Ok(outcome),
            _ => Err(TableError::UnexpectedResponse {
                worker: owner,
                request: "insert",
            }),
        }
    }

    /// Looks `key` up on its owner. `Ok(None)` means the key was never
    /// inserted.
    pub async fn find(&self, key: &Key) -> Result<Option<Record>> {
        let owner = self.router.owner(key);
        match self.dispatch(owner, TableRequest::Find(*key)).await? {
            TableResponse::Find(record) => Ok(record),
            _ => Err(TableError::UnexpectedResponse {
                worker: owner,
                request: "find",
            }),
        }
    }

    /// Inserts every record with up to `max_in_flight` requests outstanding
    /// and waits for all of them. A full shard aborts with
    /// [`TableError::ShardFull`]; duplicates are only counted.
    pub async fn insert_all(&self, records: &[Record], max_in_flight: usize) -> Result<InsertSummary> {
        let window = max_in_flight.max(1);
        let mut queued = records.iter().copied();
        let mut pending = FuturesUnordered::new();
        let mut summary = InsertSummary::default();

        loop {
            while pending.len() < window {
                let Some(record) = queued.next() else { break };
                pending.push(async move { (record, self.insert(record).await) });
            }
            let Some((record, outcome)) = pending.next().await else {
                break;
            };

            match outcome? {
                InsertOutcome::Inserted => summary.inserted += 1,
                InsertOutcome::Duplicate => {
                    tracing::debug!("Duplicate k-mer {} ignored", record.key);
                    summary.duplicates += 1;
                }
                InsertOutcome::Full => {
                    return Err(TableError::ShardFull {
                        worker: self.router.owner(&record.key),
                        key: record.key,
                    });
                }
            }
        }

        Ok(summary)
    }

    pub async fn local_stats(&self) -> Result<ShardStats> {
        match self.local.call(TableRequest::Stats).await? {
            TableResponse::Stats(stats) => Ok(stats),
            _ => Err(TableError::UnexpectedResponse {
                worker: self.self_id,
                request: "stats",
            }),
        }
    }
}
