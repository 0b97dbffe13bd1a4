//! Cluster Orchestration Module
//!
//! Drives one worker through the phases of a run and wires workers together.
//!
//! ## Phases
//! 1. **Load**: the worker holds its slice of the input.
//! 2. **Insert**: every record is routed to its owner; all inserts are joined.
//! 3. **Assemble**: contigs are walked from the worker's own start nodes.
//!
//! A cluster-wide barrier closes each phase, so no `insert` starts before
//! every worker has loaded and no `find` can overtake an `insert` still in
//! flight on another worker.
//!
//! ## Submodules
//! - **`config`**: `ClusterConfig` and its validation.
//! - **`barrier`**: in-process and HTTP-coordinated barriers.
//! - **`runner`**: the per-worker phase sequence.
//! - **`local`**: N workers as tasks of one process.
//! - **`node`**: one worker per process, peers reached over HTTP.

pub mod barrier;
pub mod config;
pub mod handlers;
pub mod local;
pub mod node;
pub mod protocol;
pub mod runner;
