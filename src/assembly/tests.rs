//! Assembly Module Tests
//!
//! ## Test Scopes
//! - **Contig**: sequence reconstruction from a path of k-mers.
//! - **Traversal**: the terminated and broken outcomes of a single walk.
//! - **Assembler**: several contigs whose nodes are spread over several shards.

#[cfg(test)]
mod tests {
    use crate::assembly::assembler::{ContigAssembler, start_nodes};
    use crate::assembly::types::{Contig, ContigState, Traversal};
    use crate::genome::codec::Key;
    use crate::genome::types::Record;
    use crate::storage::partitioner::OwnershipRouter;
    use crate::storage::table::DistributedTable;
    use crate::storage::transport::LocalTransport;
    use crate::storage::worker::spawn_shard;
    use std::collections::HashMap;

    fn record(kmer: &str, forward: char, backward: char) -> Record {
        Record::parse(kmer, forward, backward).unwrap()
    }

    fn local_tables(workers: usize, shard_capacity: usize) -> Vec<DistributedTable<LocalTransport>> {
        let router = OwnershipRouter::new(workers);
        let directory: HashMap<_, _> = router
            .workers()
            .map(|worker| (worker, spawn_shard(worker, shard_capacity, router)))
            .collect();
        let transport = LocalTransport::new(directory.clone());

        router
            .workers()
            .map(|worker| DistributedTable::new(router, directory[&worker].clone(), transport.clone()))
            .collect()
    }

    /// Records for one contig spelling `sequence` with k-mers of length `k`.
    fn path_records(sequence: &str, k: usize) -> Vec<Record> {
        let count = sequence.len() + 1 - k;
        (0..count)
            .map(|i| {
                let kmer = &sequence[i..i + k];
                let backward = if i == 0 {
                    'F'
                } else {
                    sequence.as_bytes()[i - 1] as char
                };
                let forward = if i + 1 == count {
                    'F'
                } else {
                    sequence.as_bytes()[i + k] as char
                };
                record(kmer, forward, backward)
            })
            .collect()
    }

    fn example_graph() -> Vec<Record> {
        vec![
            record("AAAA", 'C', 'F'),
            record("AAAC", 'G', 'A'),
            record("AACG", 'F', 'C'),
        ]
    }

    // ============================================================
    // CONTIG TESTS
    // ============================================================

    #[test]
    fn test_contig_sequence() {
        let mut contig = Contig::new(record("AAAA", 'C', 'F'));
        assert_eq!(contig.sequence(), "AAAA");

        contig.push(record("AAAC", 'G', 'A'));
        contig.push(record("AACG", 'F', 'C'));
        assert_eq!(contig.sequence(), "AAAACG");
        assert_eq!(contig.len(), 3);
    }

    #[test]
    fn test_path_records_helper() {
        let records = path_records("AAAACG", 4);
        assert_eq!(records, example_graph());
    }

    #[test]
    fn test_start_nodes_filters_backward_terminators() {
        let starts = start_nodes(&example_graph());
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].key.decode(), "AAAA");
    }

    // ============================================================
    // TRAVERSAL TESTS
    // ============================================================

    #[tokio::test]
    async fn test_end_to_end_example() {
        let tables = local_tables(2, 8);
        tables[0].insert_all(&example_graph(), 4).await.unwrap();

        let assembler = ContigAssembler::new(&tables[1]);
        let traversal = assembler.traverse(example_graph()[0]).await.unwrap();

        assert_eq!(traversal.state(), ContigState::Terminated);
        let keys: Vec<String> = traversal
            .contig()
            .records
            .iter()
            .map(|record| record.key.decode())
            .collect();
        assert_eq!(keys, vec!["AAAA", "AAAC", "AACG"]);
        assert_eq!(traversal.contig().sequence(), "AAAACG");
        assert!(traversal.contig().records.last().unwrap().is_end());
    }

    #[tokio::test]
    async fn test_broken_graph_stops_at_missing_successor() {
        let tables = local_tables(2, 8);
        let graph = example_graph();
        tables[0].insert(graph[0]).await.unwrap();
        tables[0].insert(graph[2]).await.unwrap();

        let assembler = ContigAssembler::new(&tables[0]);
        let traversal = assembler.traverse(graph[0]).await.unwrap();

        assert_eq!(traversal.state(), ContigState::Broken);
        match traversal {
            Traversal::Broken { partial, missing } => {
                assert_eq!(partial.records, vec![graph[0]]);
                assert_eq!(missing, Key::encode("AAAC").unwrap());
            }
            Traversal::Complete(_) => panic!("traversal should be broken"),
        }
    }

    #[tokio::test]
    async fn test_single_node_contig() {
        let tables = local_tables(1, 4);
        let lone = record("GATTACA", 'F', 'F');
        tables[0].insert(lone).await.unwrap();

        let traversal = ContigAssembler::new(&tables[0]).traverse(lone).await.unwrap();
        assert_eq!(traversal, Traversal::Complete(Contig::new(lone)));
    }

    // ============================================================
    // ASSEMBLER TESTS
    // ============================================================

    #[tokio::test]
    async fn test_assemble_many_contigs_across_shards() {
        let sequences = [
            "ACGTTGCAAGTCCGATAGGCTTACAGT",
            "TTTTGGGGCCCCAAAATGCATGCATCC",
            "GACTGACTAAGGCTCGATCGTAGCTAA",
        ];
        let k = 7;
        let workers = 3;
        let tables = local_tables(workers, 64);

        let mut all = Vec::new();
        for sequence in &sequences {
            all.extend(path_records(sequence, k));
        }

        // Each worker loads and inserts its own slice, like the runner does.
        let slices: Vec<Vec<Record>> = (0..workers)
            .map(|rank| all.iter().skip(rank).step_by(workers).copied().collect())
            .collect();
        for (table, slice) in tables.iter().zip(&slices) {
            table.insert_all(slice, 16).await.unwrap();
        }

        let mut assembled = Vec::new();
        for (table, slice) in tables.iter().zip(&slices) {
            let report = ContigAssembler::new(table)
                .assemble(&start_nodes(slice), 4)
                .await
                .unwrap();
            assert!(report.broken.is_empty());
            assembled.extend(report.contigs.iter().map(|contig| contig.sequence()));
        }

        assembled.sort();
        let mut expected: Vec<String> = sequences.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(assembled, expected);
    }

    #[tokio::test]
    async fn test_assemble_continues_after_broken_contig() {
        let tables = local_tables(2, 32);
        let mut broken = path_records("CCCCAGT", 4);
        let intact = path_records("GGGTTAC", 4);
        broken.remove(2);

        tables[0].insert_all(&broken, 4).await.unwrap();
        tables[1].insert_all(&intact, 4).await.unwrap();

        let starts = vec![broken[0], intact[0]];
        let report = ContigAssembler::new(&tables[0])
            .assemble(&starts, 2)
            .await
            .unwrap();

        assert_eq!(report.broken.len(), 1);
        assert_eq!(report.broken[0].partial.sequence(), "CCCCA");
        assert_eq!(report.contigs.len(), 1);
        assert_eq!(report.contigs[0].sequence(), "GGGTTAC");
        assert_eq!(report.total_bases(), 7);
    }
}
