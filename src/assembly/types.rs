use serde::{Deserialize, Serialize};

use crate::genome::codec::Key;
use crate::genome::types::Record;

/// Lifecycle of a single contig traversal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContigState {
    /// Seeded from a start node, nothing looked up yet.
    Started,
    /// Following forward extensions.
    Extending,
    /// Reached a node with a terminator forward extension.
    Terminated,
    /// A successor key was not in the table.
    Broken,
}

/// Ordered path of records from a start node towards an end node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contig {
    pub records: Vec<Record>,
}

impl Contig {
    pub fn new(start: Record) -> Self {
        Self {
            records: vec![start],
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The first k-mer followed by the last base of every later k-mer.
    pub fn sequence(&self) -> String {
        let Some((first, rest)) = self.records.split_first() else {
            return String::new();
        };
        let mut sequence = first.key.decode();
        sequence.extend(rest.iter().map(|record| record.key.last_base().to_char()));
        sequence
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Traversal {
    Complete(Contig),
    Broken { partial: Contig, missing: Key },
}

impl Traversal {
    pub fn state(&self) -> ContigState {
        match self {
            Traversal::Complete(_) => ContigState::Terminated,
            Traversal::Broken { .. } => ContigState::Broken,
        }
    }

    pub fn contig(&self) -> &Contig {
        match self {
            Traversal::Complete(contig) => contig,
            Traversal::Broken { partial, .. } => partial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenContig {
    pub partial: Contig,
    pub missing: Key,
}

/// Everything one worker assembled, in start-node order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub contigs: Vec<Contig>,
    pub broken: Vec<BrokenContig>,
}

impl AssemblyReport {
    pub fn total_bases(&self) -> usize {
        self.contigs
            .iter()
            .map(|contig| contig.sequence().len())
            .sum()
    }
}
