//! Genome Data Module
//!
//! The vocabulary shared by every other subsystem: nucleotides, k-mer keys and
//! the graph records that the distributed table stores.
//!
//! ## Submodules
//! - **`types`**: `Base`, `Extension` and `Record`, the de Bruijn graph node.
//! - **`codec`**: packs a DNA string of fixed length into a 2-bit `Key` and back.
//! - **`reader`**: parses the k-mer text format and slices it per worker.

pub mod codec;
pub mod reader;
pub mod types;
