//! Contig Assembly Module
//!
//! Walks the de Bruijn graph stored in the `DistributedTable`.
//!
//! Every worker seeds traversals from the start nodes (backward extension is
//! the terminator) found in its own slice of the input, then follows forward
//! extensions with `find` until it reaches a node whose forward extension is
//! the terminator. A missing successor marks that one contig as broken and the
//! worker moves on to its next start node.

pub mod assembler;
pub mod types;

#[cfg(test)]
mod tests;
