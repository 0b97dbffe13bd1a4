//! Worker Phase Runner
//!
//! The sequence every worker executes, independent of how workers talk to
//! each other: barrier, insert everything, barrier, assemble from local start
//! nodes, barrier.

use anyhow::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::barrier::{ClusterBarrier, Phase};
use super::config::ClusterConfig;
use crate::assembly::assembler::{ContigAssembler, start_nodes};
use crate::assembly::types::AssemblyReport;
use crate::genome::types::Record;
use crate::storage::partitioner::WorkerId;
use crate::storage::shard::ShardStats;
use crate::storage::table::{DistributedTable, InsertSummary};
use crate::storage::transport::Transport;

#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseTimings {
    pub insert: Duration,
    pub assemble: Duration,
}

#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub loaded: usize,
    pub start_nodes: usize,
    pub inserts: InsertSummary,
    pub shard: ShardStats,
    pub assembly: AssemblyReport,
    pub timings: PhaseTimings,
}

pub async fn run_worker<T, B>(
    config: &ClusterConfig,
    table: &DistributedTable<T>,
    barrier: &B,
    records: Vec<Record>,
) -> Result<WorkerReport>
where
    T: Transport,
    B: ClusterBarrier,
{
    let worker = table.self_id();
    let starts = start_nodes(&records);
    tracing::info!(
        "{} loaded {} k-mers ({} start nodes), shard capacity {}",
        worker,
        records.len(),
        starts.len(),
        table.size()
    );

    barrier.wait(Phase::Loaded).await?;

    let insert_started = Instant::now();
    let inserts = table.insert_all(&records, config.max_in_flight).await?;
    let insert = insert_started.elapsed();
    tracing::info!(
        "{} inserted {} k-mers ({} duplicates) in {:?}",
        worker,
        inserts.inserted,
        inserts.duplicates,
        insert
    );

    barrier.wait(Phase::Inserted).await?;

    let assemble_started = Instant::now();
    let assembly = ContigAssembler::new(table)
        .assemble(&starts, config.max_in_flight)
        .await?;
    let assemble = assemble_started.elapsed();
    tracing::info!(
        "{} assembled {} contigs ({} bases) in {:?}",
        worker,
        assembly.contigs.len(),
        assembly.total_bases(),
        assemble
    );
    if !assembly.broken.is_empty() {
        tracing::warn!(
            "{} could not complete {} contigs",
            worker,
            assembly.broken.len()
        );
    }

    let shard = table.local_stats().await?;
    tracing::debug!(
        "{} shard holds {}/{} slots, longest probe {}",
        worker,
        shard.occupied,
        shard.capacity,
        shard.max_probe
    );

    barrier.wait(Phase::Assembled).await?;

    Ok(WorkerReport {
        worker,
        loaded: records.len(),
        start_nodes: starts.len(),
        inserts,
        shard,
        assembly,
        timings: PhaseTimings { insert, assemble },
    })
}

/// Writes one contig sequence per line to `<prefix>_<rank>.dat`.
pub fn write_contigs(prefix: &str, report: &WorkerReport) -> Result<PathBuf> {
    let path = PathBuf::from(format!("{}_{}.dat", prefix, report.worker.0));
    let mut out = BufWriter::new(File::create(&path)?);
    for contig in &report.assembly.contigs {
        writeln!(out, "{}", contig.sequence())?;
    }
    out.flush()?;
    Ok(path)
}
