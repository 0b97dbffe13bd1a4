//! Node mode: one worker per process.
//!
//! The node serves its shard on [`ENDPOINT_TABLE`] (and, on worker 0, the
//! barrier coordinator on [`ENDPOINT_BARRIER`]) and reaches every other shard
//! through an `HttpTransport`.

use anyhow::Result;
use axum::{Extension, Router, routing::post};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::barrier::{BarrierCoordinator, HttpBarrier};
use super::config::{ClusterConfig, ConfigError};
use super::handlers::handle_barrier;
use super::protocol::ENDPOINT_BARRIER;
use super::runner::{WorkerReport, run_worker};
use crate::genome::types::Record;
use crate::storage::handlers::handle_table_request;
use crate::storage::partitioner::{OwnershipRouter, WorkerId};
use crate::storage::protocol::ENDPOINT_TABLE;
use crate::storage::table::DistributedTable;
use crate::storage::transport::HttpTransport;
use crate::storage::worker::{ShardHandle, spawn_shard};

/// Worker that hosts the barrier coordinator.
pub const COORDINATOR: WorkerId = WorkerId(0);

pub fn build_router(shard: ShardHandle, worker_count: usize) -> Router {
    let mut app = Router::new().route(ENDPOINT_TABLE, post(handle_table_request));

    if shard.worker() == COORDINATOR {
        app = app
            .route(ENDPOINT_BARRIER, post(handle_barrier))
            .layer(Extension(BarrierCoordinator::new(worker_count)));
    }

    app.layer(Extension(shard))
}

/// Runs this process's worker to completion.
///
/// `peers[rank]` must be the address worker `rank` listens on, and
/// `listener` must already be bound to `peers[config.self_id]`.
/// `total_records` is the size of the whole input, used to size the shard.
pub async fn run_node(
    config: &ClusterConfig,
    peers: Vec<SocketAddr>,
    listener: TcpListener,
    records: Vec<Record>,
    total_records: usize,
) -> Result<WorkerReport> {
    config.validate()?;
    config.check_records(&records)?;
    if peers.len() != config.worker_count {
        return Err(ConfigError::PeerCountMismatch {
            expected: config.worker_count,
            found: peers.len(),
        }
        .into());
    }

    let transport = HttpTransport::new(peers.clone())?;
    let barrier = HttpBarrier::new(peers[COORDINATOR.0], config.self_id)?;

    let router = OwnershipRouter::new(config.worker_count);
    let capacity = config.shard_capacity(total_records);
    let shard = spawn_shard(config.self_id, capacity, router);

    let app = build_router(shard.clone(), config.worker_count);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tracing::info!(
        "{} serving its shard on {}",
        config.self_id,
        listener.local_addr()?
    );
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let table = DistributedTable::new(router, shard, transport);

    let report = run_worker(config, &table, &barrier, records).await;

    // Past the last barrier nobody queries this shard any more; graceful
    // shutdown still lets in-flight barrier replies finish.
    let _ = shutdown_tx.send(());
    server.await??;

    report
}
