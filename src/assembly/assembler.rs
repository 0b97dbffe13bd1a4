use futures::StreamExt;
use futures::stream::FuturesOrdered;

use super::types::{AssemblyReport, BrokenContig, Contig, ContigState, Traversal};
use crate::genome::types::Record;
use crate::storage::error::Result;
use crate::storage::table::DistributedTable;
use crate::storage::transport::Transport;

/// Start nodes among a worker's locally loaded records.
pub fn start_nodes(records: &[Record]) -> Vec<Record> {
    records
        .iter()
        .filter(|record| record.is_start())
        .copied()
        .collect()
}

pub struct ContigAssembler<'a, T> {
    table: &'a DistributedTable<T>,
}

impl<'a, T: Transport> ContigAssembler<'a, T> {
    pub fn new(table: &'a DistributedTable<T>) -> Self {
        Self { table }
    }

    /// Follows forward extensions from `start` until a terminator or a
    /// missing successor. Only transport failures are returned as errors.
    pub async fn traverse(&self, start: Record) -> Result<Traversal> {
        let mut contig = Contig::new(start);
        let mut current = start;
        let mut state = ContigState::Started;

        loop {
            let Some(next_key) = current.next_key() else {
                debug_assert!(current.is_end());
                tracing::trace!(
                    "Contig from {} {:?} -> {:?} after {} nodes",
                    start.key,
                    state,
                    ContigState::Terminated,
                    contig.len()
                );
                return Ok(Traversal::Complete(contig));
            };
            state = ContigState::Extending;

            match self.table.find(&next_key).await? {
                Some(found) => {
                    contig.push(found);
                    current = found;
                }
                None => {
                    tracing::warn!(
                        "Contig from {} is broken: successor {} of {} not in table",
                        start.key,
                        next_key,
                        current.key
                    );
                    return Ok(Traversal::Broken {
                        partial: contig,
                        missing: next_key,
                    });
                }
            }
        }
    }

    /// Traverses every start node, keeping up to `max_in_flight` traversals
    /// running at once. Results keep the order of `starts`.
    pub async fn assemble(&self, starts: &[Record], max_in_flight: usize) -> Result<AssemblyReport> {
        let window = max_in_flight.max(1);
        let mut queued = starts.iter().copied();
        let mut traversals = FuturesOrdered::new();
        let mut report = AssemblyReport::default();

        loop {
            while traversals.len() < window {
                let Some(start) = queued.next() else { break };
                traversals.push_back(self.traverse(start));
            }
            let Some(traversal) = traversals.next().await else {
                break;
            };

            let traversal = traversal?;
            tracing::trace!(
                "Traversal finished {:?} with {} nodes",
                traversal.state(),
                traversal.contig().len()
            );
            match traversal {
                Traversal::Complete(contig) => report.contigs.push(contig),
                Traversal::Broken { partial, missing } => {
                    report.broken.push(BrokenContig { partial, missing })
                }
            }
        }

        Ok(report)
    }
}
