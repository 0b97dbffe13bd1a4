//! Distributed Storage Module
//!
//! Implements the partitioned k-mer table the assembler walks.
//!
//! ## Core Concepts
//! - **Ownership**: `OwnershipRouter` maps each key to exactly one worker
//!   (`hash(key) mod worker_count`).
//! - **Shards**: every worker owns one fixed-capacity `LocalShard` using linear
//!   probing. Only that worker's shard actor ever reads or writes it.
//! - **Messaging**: `ShardHandle` and `Transport` carry `TableRequest`s to the
//!   owning actor, in-process over channels or between processes over HTTP.
//! - **Access**: `DistributedTable` routes `insert`/`find` to the owner,
//!   local or remote, transparently.

pub mod error;
pub mod handlers;
pub mod partitioner;
pub mod protocol;
pub mod shard;
pub mod table;
pub mod transport;
pub mod worker;

#[cfg(test)]
mod tests;
