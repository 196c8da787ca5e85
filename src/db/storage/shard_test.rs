//! Tests for shard operations, including the insert-if-absent race.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;

    use super::super::shard::Shard;

    #[test]
    fn test_insert_if_absent_stores_once() {
        let shard: Shard<i64> = Shard::new(0);

        assert!(shard.insert_if_absent("a", 1).is_ok());
        assert_eq!(shard.insert_if_absent("a", 2), Err(1), "existing value must be returned");
        assert_eq!(shard.get("a"), Some(1), "value must stay untouched on conflict");
        assert_eq!(shard.len(), 1);
    }

    #[test]
    fn test_contains_and_get_on_missing_key() {
        let shard: Shard<i64> = Shard::new(3);

        assert_eq!(shard.id(), 3);
        assert!(!shard.contains("missing"));
        assert_eq!(shard.get("missing"), None);
        assert!(shard.is_empty());
    }

    #[test]
    fn test_remove_returns_key_to_absent() {
        let shard: Shard<i64> = Shard::new(0);
        shard.insert_if_absent("a", 1).unwrap();

        assert!(shard.remove("a"));
        assert!(!shard.contains("a"));
        assert!(!shard.remove("a"), "second remove must report a miss");
        assert!(shard.insert_if_absent("a", 2).is_ok(), "key must be reusable");
        assert_eq!(shard.get("a"), Some(2));
    }

    #[test]
    fn test_optional_payload_is_not_absence() {
        let shard: Shard<Option<i64>> = Shard::new(0);
        shard.insert_if_absent("null", None).unwrap();

        assert!(shard.contains("null"));
        assert_eq!(shard.get("null"), Some(None));
        assert!(shard.insert_if_absent("null", Some(1)).is_err());
    }

    #[test]
    fn test_concurrent_insert_has_single_winner() {
        const WRITERS: usize = 32;

        for _ in 0..50 {
            let shard: Shard<usize> = Shard::new(0);
            let barrier = Barrier::new(WRITERS);
            let wins = AtomicUsize::new(0);
            let winner = AtomicUsize::new(usize::MAX);

            std::thread::scope(|s| {
                for i in 0..WRITERS {
                    let shard = &shard;
                    let barrier = &barrier;
                    let wins = &wins;
                    let winner = &winner;
                    s.spawn(move || {
                        barrier.wait();
                        if shard.insert_if_absent("k", i).is_ok() {
                            wins.fetch_add(1, Ordering::SeqCst);
                            winner.store(i, Ordering::SeqCst);
                        }
                    });
                }
            });

            assert_eq!(wins.load(Ordering::SeqCst), 1, "exactly one insert must win");
            assert_eq!(shard.get("k"), Some(winner.load(Ordering::SeqCst)));
        }
    }

    #[test]
    fn test_concurrent_insert_and_remove_stay_consistent() {
        const OPS: usize = 2_000;

        for _ in 0..50 {
            let shard: Shard<u32> = Shard::new(0);
            let barrier = Barrier::new(2);
            let inserts = AtomicUsize::new(0);
            let removes = AtomicUsize::new(0);

            std::thread::scope(|s| {
                s.spawn(|| {
                    barrier.wait();
                    for _ in 0..OPS {
                        if shard.insert_if_absent("k", 1).is_ok() {
                            inserts.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
                s.spawn(|| {
                    barrier.wait();
                    for _ in 0..OPS {
                        if shard.remove("k") {
                            removes.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            });

            let inserts = inserts.load(Ordering::SeqCst);
            let removes = removes.load(Ordering::SeqCst);
            assert!(inserts >= removes, "{} removes outran {} inserts", removes, inserts);
            assert_eq!(inserts - removes, shard.len(), "every success must be accounted for");
            assert!(shard.len() <= 1);
        }
    }

    #[test]
    fn test_insert_new_reports_conflict_without_overwrite() {
        let shard: Shard<String> = Shard::new(0);

        assert!(shard.insert_new("a", "first".to_string()));
        assert!(!shard.insert_new("a", "second".to_string()));
        assert_eq!(shard.get("a").as_deref(), Some("first"));
        assert_eq!(shard.len(), 1);
    }
}
