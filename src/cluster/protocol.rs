//! Cluster Network Protocol
//!
//! Barrier arrivals in node mode. Worker 0 hosts the coordinator; every
//! worker, worker 0 included, posts a `BarrierRequest` and gets its response
//! only once all workers have arrived at the same phase.

use serde::{Deserialize, Serialize};

use super::barrier::Phase;
use crate::storage::partitioner::WorkerId;

/// Endpoint on worker 0 where workers announce arrival at a phase barrier.
pub const ENDPOINT_BARRIER: &str = "/internal/barrier";

#[derive(Debug, Serialize, Deserialize)]
pub struct BarrierRequest {
    pub phase: Phase,
    pub worker: WorkerId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BarrierResponse {
    pub phase: Phase,
    pub released: bool,
}
