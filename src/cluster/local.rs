//! In-process cluster: every worker is a tokio task, shards are actors
//! reached through a shared `LocalTransport` directory.

use anyhow::Result;
use std::collections::HashMap;
use tokio::task::JoinSet;

use super::barrier::LocalBarrier;
use super::config::ClusterConfig;
use super::runner::{WorkerReport, run_worker};
use crate::genome::reader::partition_range;
use crate::genome::types::Record;
use crate::storage::partitioner::OwnershipRouter;
use crate::storage::table::DistributedTable;
use crate::storage::transport::LocalTransport;
use crate::storage::worker::spawn_shard;

/// Splits `records` across `config.worker_count` workers the same way the
/// file reader would and runs every worker to completion.
///
/// `config.self_id` is ignored; each worker gets its own copy. Reports come
/// back ordered by worker.
pub async fn run_local_cluster(config: &ClusterConfig, records: Vec<Record>) -> Result<Vec<WorkerReport>> {
    config.validate()?;
    config.check_records(&records)?;

    let router = OwnershipRouter::new(config.worker_count);
    let capacity = config.shard_capacity(records.len());
    tracing::info!(
        "Starting {} in-process workers, {} slots per shard for {} k-mers",
        config.worker_count,
        capacity,
        records.len()
    );

    let directory: HashMap<_, _> = router
        .workers()
        .map(|worker| (worker, spawn_shard(worker, capacity, router)))
        .collect();
    let transport = LocalTransport::new(directory.clone());
    let barrier = LocalBarrier::new(config.worker_count);

    let mut workers = JoinSet::new();
    for worker in router.workers() {
        let range = partition_range(records.len(), config.worker_count, worker.0);
        let slice = records[range].to_vec();
        let worker_config = config.for_worker(worker);
        let table = DistributedTable::new(router, directory[&worker].clone(), transport.clone());
        let barrier = barrier.clone();

        workers.spawn(async move { run_worker(&worker_config, &table, &barrier, slice).await });
    }

    let mut reports = Vec::with_capacity(config.worker_count);
    while let Some(joined) = workers.join_next().await {
        match joined? {
            Ok(report) => reports.push(report),
            Err(e) => {
                // The others would wait at the next barrier forever.
                workers.abort_all();
                return Err(e);
            }
        }
    }

    reports.sort_by_key(|report| report.worker);
    Ok(reports)
}
