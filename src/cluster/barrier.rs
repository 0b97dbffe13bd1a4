//! Phase Barriers
//!
//! Every worker must arrive at a phase barrier before any worker leaves it.
//! In-process workers share a `tokio::sync::Barrier`; worker processes post
//! their arrival to the `BarrierCoordinator` hosted by worker 0.

use anyhow::Result;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Barrier;

use super::protocol::{BarrierRequest, BarrierResponse, ENDPOINT_BARRIER};
use crate::storage::partitioner::WorkerId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Every worker holds its slice of the input.
    Loaded,
    /// Every insert on every worker has completed.
    Inserted,
    /// Every worker finished its traversals; shards may be torn down.
    Assembled,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Loaded => write!(f, "loaded"),
            Phase::Inserted => write!(f, "inserted"),
            Phase::Assembled => write!(f, "assembled"),
        }
    }
}

pub trait ClusterBarrier: Send + Sync {
    fn wait(&self, phase: Phase) -> impl Future<Output = Result<()>> + Send;
}

/// Barrier shared by workers running as tasks of one process.
#[derive(Clone)]
pub struct LocalBarrier {
    inner: Arc<Barrier>,
}

impl LocalBarrier {
    pub fn new(worker_count: usize) -> Self {
        Self {
            inner: Arc::new(Barrier::new(worker_count)),
        }
    }
}

impl ClusterBarrier for LocalBarrier {
    async fn wait(&self, phase: Phase) -> Result<()> {
        let result = self.inner.wait().await;
        if result.is_leader() {
            tracing::debug!("All workers reached the {} barrier", phase);
        }
        Ok(())
    }
}

/// Counts arrivals per phase on worker 0.
pub struct BarrierCoordinator {
    worker_count: usize,
    phases: DashMap<Phase, Arc<Barrier>>,
}

impl BarrierCoordinator {
    pub fn new(worker_count: usize) -> Arc<Self> {
        Arc::new(Self {
            worker_count,
            phases: DashMap::new(),
        })
    }

    /// Resolves once `worker_count` arrivals for `phase` have been seen.
    pub async fn arrive(&self, phase: Phase, worker: WorkerId) {
        let barrier = self
            .phases
            .entry(phase)
            .or_insert_with(|| Arc::new(Barrier::new(self.worker_count)))
            .clone();

        tracing::debug!("{} arrived at the {} barrier", worker, phase);
        if barrier.wait().await.is_leader() {
            tracing::info!("All {} workers reached the {} barrier", self.worker_count, phase);
        }
    }
}

/// Barrier client used by worker processes.
pub struct HttpBarrier {
    coordinator: SocketAddr,
    worker: WorkerId,
    http_client: reqwest::Client,
}

impl HttpBarrier {
    pub fn new(coordinator: SocketAddr, worker: WorkerId) -> Result<Self> {
        Ok(Self {
            coordinator,
            worker,
            http_client: reqwest::Client::builder().no_proxy().build()?,
        })
    }

    /// Peers may still be binding their listeners when the first barrier is
    /// reached, so connection failures are retried. Any other failure may
    /// mean the arrival was already counted and is returned as is.
    async fn post_with_retry(&self, payload: &BarrierRequest, attempts: usize) -> Result<reqwest::Response> {
        let url = format!("http://{}{}", self.coordinator, ENDPOINT_BARRIER);
        let mut delay_ms = 100u64;

        for attempt in 0..attempts {
            match self.http_client.post(url.clone()).json(payload).send().await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_connect() && attempt + 1 < attempts => {
                    tracing::debug!("Barrier coordinator not reachable yet: {}", e);
                    let jitter = rand::random::<u64>() % 50;
                    tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                    delay_ms = (delay_ms * 2).min(2000);
                }
                Err(e) => return Err(anyhow::anyhow!(e)),
            }
        }

        Err(anyhow::anyhow!("Retry attempts exhausted"))
    }
}

impl ClusterBarrier for HttpBarrier {
    async fn wait(&self, phase: Phase) -> Result<()> {
        let payload = BarrierRequest {
            phase,
            worker: self.worker,
        };
        let response = self.post_with_retry(&payload, 20).await?;

        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Barrier {} failed: {}",
                phase,
                response.status()
            ));
        }

        let body: BarrierResponse = response.json().await?;
        if body.phase != phase || !body.released {
            return Err(anyhow::anyhow!(
                "Coordinator answered {} barrier with {:?}",
                phase,
                body
            ));
        }
        Ok(())
    }
}
