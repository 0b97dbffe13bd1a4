use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::genome::codec::Key;

/// Rank of a worker within the cluster, `0..worker_count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Maps keys to the worker whose shard owns them.
///
/// Every worker must build its router with the same `worker_count`; the hash
/// is `DefaultHasher::new()`, whose keys are fixed, so all processes of the
/// same binary agree on placement.
#[derive(Debug, Clone, Copy)]
pub struct OwnershipRouter {
    worker_count: usize,
}

impl OwnershipRouter {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn hash_key(key: &Key) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    pub fn owner(&self, key: &Key) -> WorkerId {
        WorkerId((Self::hash_key(key) % self.worker_count as u64) as usize)
    }

    /// Hash the owning shard probes from. The low-order part of the hash has
    /// already been spent on choosing the owner, so the shard uses the
    /// quotient instead.
    pub fn slot_hash(&self, key: &Key) -> u64 {
        Self::hash_key(key) / self.worker_count as u64
    }

    pub fn workers(&self) -> impl Iterator<Item = WorkerId> {
        (0..self.worker_count).map(WorkerId)
    }
}
