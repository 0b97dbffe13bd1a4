//! Shard Actor
//!
//! Each worker runs one `ShardWorker` task that owns its `LocalShard` and
//! drains an inbound queue strictly one message at a time. Local and remote
//! callers alike reach the shard only through a `ShardHandle`.

use tokio::sync::{mpsc, oneshot};

use super::error::{Result, TableError};
use super::partitioner::{OwnershipRouter, WorkerId};
use super::protocol::{TableRequest, TableResponse};
use super::shard::LocalShard;

const MAILBOX_CAPACITY: usize = 1024;

struct Envelope {
    request: TableRequest,
    respond_to: oneshot::Sender<TableResponse>,
}

/// Cloneable address of a shard actor.
#[derive(Clone)]
pub struct ShardHandle {
    worker: WorkerId,
    capacity: usize,
    tx: mpsc::Sender<Envelope>,
}

impl ShardHandle {
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Enqueues `request` and waits for the actor's reply.
    pub async fn call(&self, request: TableRequest) -> Result<TableResponse> {
        let (respond_to, reply) = oneshot::channel();
        self.tx
            .send(Envelope {
                request,
                respond_to,
            })
            .await
            .map_err(|_| TableError::WorkerUnavailable(self.worker))?;

        reply
            .await
            .map_err(|_| TableError::WorkerUnavailable(self.worker))
    }
}

struct ShardWorker {
    worker: WorkerId,
    router: OwnershipRouter,
    shard: LocalShard,
}

impl ShardWorker {
    async fn run(mut self, mut inbox: mpsc::Receiver<Envelope>) {
        tracing::debug!(
            "Shard actor for {} started (capacity {})",
            self.worker,
            self.shard.capacity()
        );

        while let Some(envelope) = inbox.recv().await {
            let response = self.handle(envelope.request);
            if envelope.respond_to.send(response).is_err() {
                tracing::trace!("Caller of {} went away before the reply", self.worker);
            }
        }

        let stats = self.shard.stats();
        tracing::debug!(
            "Shard actor for {} stopped ({}/{} slots used, longest probe {})",
            self.worker,
            stats.occupied,
            stats.capacity,
            stats.max_probe
        );
    }

    fn handle(&mut self, request: TableRequest) -> TableResponse {
        match request {
            TableRequest::Insert(record) => {
                let hash = self.router.slot_hash(&record.key);
                let outcome = self.shard.insert(hash, record);
                tracing::trace!("{} insert {} -> {:?}", self.worker, record.key, outcome);
                TableResponse::Insert(outcome)
            }
            TableRequest::Find(key) => {
                let hash = self.router.slot_hash(&key);
                TableResponse::Find(self.shard.find(hash, &key))
            }
            TableRequest::Stats => TableResponse::Stats(self.shard.stats()),
        }
    }
}

/// Starts the actor owning `worker`'s shard and returns its address.
///
/// The actor stops once every handle has been dropped.
pub fn spawn_shard(worker: WorkerId, capacity: usize, router: OwnershipRouter) -> ShardHandle {
    let (tx, inbox) = mpsc::channel(MAILBOX_CAPACITY);
    let actor = ShardWorker {
        worker,
        router,
        shard: LocalShard::new(capacity),
    };
    tokio::spawn(actor.run(inbox));

    ShardHandle {
        worker,
        capacity,
        tx,
    }
}
