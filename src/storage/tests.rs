//! Storage Module Tests
//!
//! ## Test Scopes
//! - **LocalShard**: reservation, linear probing with wraparound, duplicate and full handling.
//! - **Router**: deterministic ownership and a reasonable spread of keys.
//! - **DistributedTable**: insert/find across several in-process workers.

#[cfg(test)]
mod tests {
    use crate::genome::codec::Key;
    use crate::genome::types::Record;
    use crate::storage::error::TableError;
    use crate::storage::partitioner::{OwnershipRouter, WorkerId};
    use crate::storage::protocol::{InsertOutcome, TableRequest};
    use crate::storage::shard::LocalShard;
    use crate::storage::table::DistributedTable;
    use crate::storage::transport::{LocalTransport, Transport};
    use crate::storage::worker::spawn_shard;
    use rand::Rng;
    use std::collections::{HashMap, HashSet};

    fn record(kmer: &str, forward: char, backward: char) -> Record {
        Record::parse(kmer, forward, backward).unwrap()
    }

    fn random_records(count: usize, k: usize) -> Vec<Record> {
        let mut rng = rand::thread_rng();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(count);

        while records.len() < count {
            let kmer: String = (0..k)
                .map(|_| ['A', 'C', 'G', 'T'][rng.gen_range(0..4)])
                .collect();
            if seen.insert(kmer.clone()) {
                records.push(record(&kmer, 'A', 'T'));
            }
        }
        records
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

    // ============================================================
    // LOCAL SHARD TESTS
    // ============================================================

    #[test]
    fn test_try_reserve_first_writer_wins() {
        let mut shard = LocalShard::new(4);

        assert!(!shard.is_used(2));
        assert!(shard.try_reserve(2));
        assert!(shard.is_used(2));
        assert!(!shard.try_reserve(2), "Second reservation must fail");

        assert_eq!(shard.read(2), None, "Reserved but not yet written");
        let rec = record("ACGT", 'F', 'F');
        shard.write(2, rec);
        assert_eq!(shard.read(2), Some(rec));
    }

    #[test]
    #[should_panic]
    fn test_slot_access_past_capacity_panics() {
        let shard = LocalShard::new(4);
        shard.is_used(4);
    }

    #[test]
    fn test_shard_probe_wraps_around() {
        let mut shard = LocalShard::new(4);
        let first = record("AAAA", 'F', 'F');
        let second = record("CCCC", 'F', 'F');

        assert_eq!(shard.insert(3, first), InsertOutcome::Inserted);
        assert_eq!(shard.insert(3, second), InsertOutcome::Inserted);

        assert_eq!(shard.read(3), Some(first));
        assert_eq!(shard.read(0), Some(second), "Collision should wrap to slot 0");
        assert_eq!(shard.find(3, &second.key), Some(second));
        assert_eq!(shard.stats().max_probe, 2);
    }

    #[test]
    fn test_shard_duplicate_leaves_state_unchanged() {
        let mut shard = LocalShard::new(8);
        let original = record("ACGT", 'A', 'F');
        let conflicting = record("ACGT", 'C', 'G');

        assert_eq!(shard.insert(5, original), InsertOutcome::Inserted);
        assert_eq!(shard.insert(5, conflicting), InsertOutcome::Duplicate);

        assert_eq!(shard.stats().occupied, 1);
        assert_eq!(shard.find(5, &original.key), Some(original));
    }

    #[test]
    fn test_shard_reports_full() {
        let mut shard = LocalShard::new(2);
        assert_eq!(shard.insert(0, record("AAAA", 'F', 'F')), InsertOutcome::Inserted);
        assert_eq!(shard.insert(0, record("CCCC", 'F', 'F')), InsertOutcome::Inserted);
        assert_eq!(shard.insert(1, record("GGGG", 'F', 'F')), InsertOutcome::Full);
        assert_eq!(shard.stats().occupied, 2);

        // A full shard still answers lookups, including misses.
        let missing = Key::encode("TTTT").unwrap();
        assert_eq!(shard.find(1, &missing), None);
    }

    #[test]
    fn test_zero_capacity_shard() {
        let mut shard = LocalShard::new(0);
        let rec = record("ACGT", 'F', 'F');
        assert_eq!(shard.insert(7, rec), InsertOutcome::Full);
        assert_eq!(shard.find(7, &rec.key), None);
    }

    // ============================================================
    // ROUTER TESTS
    // ============================================================

    #[test]
    fn test_routing_is_stable_across_workers() {
        let records = random_records(500, 19);
        let routers: Vec<_> = (0..3).map(|_| OwnershipRouter::new(5)).collect();

        for rec in &records {
            let owner = routers[0].owner(&rec.key);
            assert!(owner.0 < 5);
            for router in &routers[1..] {
                assert_eq!(router.owner(&rec.key), owner);
            }
            assert_eq!(routers[0].owner(&rec.key), owner, "Repeated calls agree");
        }
    }

    #[test]
    fn test_routing_spreads_keys() {
        let router = OwnershipRouter::new(4);
        let mut counts = HashMap::new();
        for rec in random_records(4000, 21) {
            *counts.entry(router.owner(&rec.key)).or_insert(0usize) += 1;
        }

        assert_eq!(counts.len(), 4, "Every worker should own some keys");
        for (worker, count) in counts {
            assert!(count > 600, "{} owns only {} of 4000 keys", worker, count);
        }
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let router = OwnershipRouter::new(1);
        for rec in random_records(50, 11) {
            assert_eq!(router.owner(&rec.key), WorkerId(0));
        }
    }

    // ============================================================
    // DISTRIBUTED TABLE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_round_trip_across_workers() {
        let tables = local_tables(3, 200);
        let records = random_records(150, 19);

        // Every worker inserts a third of the records.
        for (i, rec) in records.iter().enumerate() {
            let outcome = tables[i % 3].insert(*rec).await.unwrap();
            assert_eq!(outcome, InsertOutcome::Inserted);
        }

        // Any worker can find any record.
        for (i, rec) in records.iter().enumerate() {
            let found = tables[(i + 1) % 3].find(&rec.key).await.unwrap();
            assert_eq!(found, Some(*rec));
        }
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_reported() {
        let tables = local_tables(2, 16);
        let original = record("GATTACA", 'C', 'F');
        let again = record("GATTACA", 'T', 'A');

        assert_eq!(tables[0].insert(original).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(tables[1].insert(again).await.unwrap(), InsertOutcome::Duplicate);

        assert_eq!(tables[1].find(&original.key).await.unwrap(), Some(original));

        let mut occupied = 0;
        for table in &tables {
            occupied += table.local_stats().await.unwrap().occupied;
        }
        assert_eq!(occupied, 1);
    }

    #[tokio::test]
    async fn test_negative_lookup() {
        let tables = local_tables(2, 64);
        let records = random_records(40, 15);
        let (stored, never) = records.split_at(20);

        tables[0].insert_all(stored, 8).await.unwrap();

        for rec in never {
            assert_eq!(tables[1].find(&rec.key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_load_factor_bound_single_shard() {
        let capacity = 2000;
        let tables = local_tables(1, capacity);
        let records = random_records(capacity / 2, 25);

        for rec in &records {
            let outcome = tables[0].insert(*rec).await.unwrap();
            assert_ne!(outcome, InsertOutcome::Full);
        }
        assert_eq!(tables[0].local_stats().await.unwrap().occupied, capacity / 2);
    }

    #[tokio::test]
    async fn test_insert_all_counts_and_joins() {
        let tables = local_tables(4, 500);
        let mut records = random_records(1000, 31);
        let repeated = records[..10].to_vec();
        records.extend(repeated);

        let summary = tables[2].insert_all(&records, 64).await.unwrap();
        assert_eq!(summary.inserted, 1000);
        assert_eq!(summary.duplicates, 10);

        // Everything is visible as soon as insert_all returns.
        for rec in &records {
            assert!(tables[0].find(&rec.key).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_insert_all_fails_loudly_when_full() {
        let tables = local_tables(1, 3);
        let records = random_records(4, 9);

        let err = tables[0].insert_all(&records, 1).await.unwrap_err();
        assert!(
            matches!(err, TableError::ShardFull { worker: WorkerId(0), .. }),
            "unexpected error: {}",
            err
        );
    }

    #[tokio::test]
    async fn test_size_is_local_capacity() {
        let tables = local_tables(3, 128);
        for table in &tables {
            assert_eq!(table.size(), 128);
        }
        assert_eq!(tables[1].self_id(), WorkerId(1));
    }

    #[tokio::test]
    async fn test_local_transport_unknown_worker() {
        let router = OwnershipRouter::new(1);
        let handle = spawn_shard(WorkerId(0), 4, router);
        let transport = LocalTransport::new(HashMap::from([(WorkerId(0), handle)]));

        let key = Key::encode("ACGT").unwrap();
        let err = transport
            .call(WorkerId(7), TableRequest::Find(key))
            .await
            .unwrap_err();
        assert!(matches!(err, TableError::UnknownWorker(WorkerId(7))));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_of_same_key_store_once() {
        let tables = local_tables(2, 32);
        let rec = record("TTTTGGGG", 'F', 'F');

        let (a, b) = tokio::join!(tables[0].insert(rec), tables[1].insert(rec));
        let mut outcomes = vec![a.unwrap(), b.unwrap()];
        outcomes.sort_by_key(|o| *o == InsertOutcome::Duplicate);
        assert_eq!(outcomes, vec![InsertOutcome::Inserted, InsertOutcome::Duplicate]);
    }
}
