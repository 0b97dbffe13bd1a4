use thiserror::Error;

use crate::genome::codec::MAX_KMER_LEN;
use crate::genome::types::Record;
use crate::storage::partitioner::WorkerId;
use crate::storage::table::DEFAULT_MAX_IN_FLIGHT;

/// K-mer length the binary expects unless told otherwise.
pub const DEFAULT_KMER_LEN: usize = 51;
/// Occupied fraction the table is sized for.
pub const DEFAULT_LOAD_FACTOR: f64 = 0.5;
/// Smallest shard ever allocated, so tiny inputs survive uneven routing.
pub const MIN_SHARD_CAPACITY: usize = 64;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("worker count must be greater than 0")]
    NoWorkers,
    #[error("{self_id} is out of range for a cluster of {worker_count} workers")]
    SelfIdOutOfRange {
        self_id: WorkerId,
        worker_count: usize,
    },
    #[error("k-mer length must be between 1 and {max}, got {0}", max = MAX_KMER_LEN)]
    InvalidKmerLen(usize),
    #[error("load factor must be in (0, 1], got {0}")]
    InvalidLoadFactor(f64),
    #[error("input contains {found}-mers, while this run is configured for {expected}-mers")]
    KmerLengthMismatch { expected: usize, found: usize },
    #[error("expected {expected} peer addresses, got {found}")]
    PeerCountMismatch { expected: usize, found: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterConfig {
    pub worker_count: usize,
    pub self_id: WorkerId,
    pub kmer_len: usize,
    pub load_factor: f64,
    /// Bound on outstanding table requests per worker during a phase.
    pub max_in_flight: usize,
}

impl ClusterConfig {
    pub fn new(worker_count: usize, self_id: WorkerId) -> Self {
        Self {
            worker_count,
            self_id,
            kmer_len: DEFAULT_KMER_LEN,
            load_factor: DEFAULT_LOAD_FACTOR,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    pub fn with_kmer_len(mut self, kmer_len: usize) -> Self {
        self.kmer_len = kmer_len;
        self
    }

    pub fn with_load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight;
        self
    }

    /// Same cluster, seen from another worker.
    pub fn for_worker(&self, self_id: WorkerId) -> Self {
        Self {
            self_id,
            ..self.clone()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.self_id.0 >= self.worker_count {
            return Err(ConfigError::SelfIdOutOfRange {
                self_id: self.self_id,
                worker_count: self.worker_count,
            });
        }
        if self.kmer_len == 0 || self.kmer_len > MAX_KMER_LEN {
            return Err(ConfigError::InvalidKmerLen(self.kmer_len));
        }
        if !(self.load_factor > 0.0 && self.load_factor <= 1.0) {
            return Err(ConfigError::InvalidLoadFactor(self.load_factor));
        }
        Ok(())
    }

    pub fn check_kmer_len(&self, found: usize) -> Result<(), ConfigError> {
        if found != self.kmer_len {
            return Err(ConfigError::KmerLengthMismatch {
                expected: self.kmer_len,
                found,
            });
        }
        Ok(())
    }

    /// Rejects any record whose key length differs from `kmer_len`.
    pub fn check_records(&self, records: &[Record]) -> Result<(), ConfigError> {
        match records.iter().find(|record| record.key.len() != self.kmer_len) {
            Some(record) => self.check_kmer_len(record.key.len()),
            None => Ok(()),
        }
    }

    /// Per-worker shard capacity for `total_records` k-mers across the
    /// cluster at the configured load factor.
    pub fn shard_capacity(&self, total_records: usize) -> usize {
        let table_size = (total_records as f64 / self.load_factor).ceil() as usize;
        table_size
            .div_ceil(self.worker_count.max(1))
            .max(MIN_SHARD_CAPACITY)
    }
}
