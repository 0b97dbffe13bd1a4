//! Distributed k-mer Assembly Library
//!
//! Builds a de Bruijn graph over fixed-length DNA substrings in a table
//! partitioned across cooperating workers, then walks that table to
//! reconstruct contigs. The binary (`main.rs`) wires these modules into an
//! in-process cluster or a multi-process node.
//!
//! ## Architecture Modules
//! - **`genome`**: bases, 2-bit packed k-mer keys, graph records and the k-mer
//!   file reader.
//! - **`storage`**: the distributed table. Fixed-capacity shards with linear
//!   probing, one actor per shard, ownership routing and the transports that
//!   carry insert/find requests to the owning worker.
//! - **`assembly`**: the contig traversal from each start node to its end node.
//! - **`cluster`**: configuration, phase barriers and the per-worker run
//!   sequence, for in-process and HTTP-connected workers.

pub mod assembly;
pub mod cluster;
pub mod genome;
pub mod storage;
