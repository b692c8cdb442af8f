#[cfg(test)]
mod tests {
    use attend::libs::snowflake::{Clock, IdParts, Snowflake, SnowflakeError, EPOCH, SEQUENCE_MASK};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    const T: u64 = EPOCH + 1_000_000;

    /// Returns `T` for the first `ticks_after` reads, then `T + 1`.
    struct TickingClock {
        reads: AtomicU64,
        ticks_after: u64,
    }

    impl Clock for TickingClock {
        fn now_millis(&self) -> u64 {
            if self.reads.fetch_add(1, Ordering::SeqCst) < self.ticks_after {
                T
            } else {
                T + 1
            }
        }
    }

    /// Replays a fixed list of readings, repeating the last one.
    struct ScriptedClock {
        readings: Vec<u64>,
        index: AtomicU64,
    }

    impl Clock for ScriptedClock {
        fn now_millis(&self) -> u64 {
            let i = self.index.fetch_add(1, Ordering::SeqCst) as usize;
            self.readings[i.min(self.readings.len() - 1)]
        }
    }

    #[test]
    fn test_ids_strictly_increase() {
        let ids = Snowflake::new(1, 1).unwrap();
        let mut last = 0;
        for _ in 0..10_000 {
            let id = ids.next_id().unwrap();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn test_sequence_wrap_waits_for_next_millisecond() {
        let ids = Snowflake::with_clock(
            3,
            2,
            TickingClock {
                reads: AtomicU64::new(0),
                ticks_after: 4097,
            },
        )
        .unwrap();

        let generated: Vec<u64> = (0..4097).map(|_| ids.next_id().unwrap()).collect();

        let first = IdParts::from_id(generated[0]);
        let last_in_ms = IdParts::from_id(generated[4095]);
        let wrapped = IdParts::from_id(generated[4096]);
        assert_eq!(first.timestamp, T);
        assert_eq!(first.sequence, 0);
        assert_eq!(last_in_ms.timestamp, T);
        assert_eq!(last_in_ms.sequence, SEQUENCE_MASK);
        assert_eq!(wrapped.timestamp, T + 1);
        assert_eq!(wrapped.sequence, 0);
        assert_eq!(wrapped.worker_id, 3);
        assert_eq!(wrapped.datacenter_id, 2);
        assert!(generated.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_clock_regression_leaves_state_untouched() {
        let ids = Snowflake::with_clock(
            0,
            0,
            ScriptedClock {
                readings: vec![T, T - 5, T],
                index: AtomicU64::new(0),
            },
        )
        .unwrap();

        let first = ids.next_id().unwrap();
        match ids.next_id() {
            Err(SnowflakeError::ClockRegression { last, now }) => {
                assert_eq!(last, T);
                assert_eq!(now, T - 5);
            }
            other => panic!("expected clock regression, got {:?}", other),
        }

        // Same millisecond as `first`: the sequence continues from it.
        let next = IdParts::from_id(ids.next_id().unwrap());
        assert_eq!(next.timestamp, T);
        assert_eq!(next.sequence, IdParts::from_id(first).sequence + 1);
    }

    #[test]
    fn test_distinct_workers_never_collide() {
        let a = Snowflake::new(1, 1).unwrap();
        let b = Snowflake::new(2, 1).unwrap();
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            assert!(seen.insert(a.next_id().unwrap()));
            assert!(seen.insert(b.next_id().unwrap()));
        }
    }

    #[test]
    fn test_concurrent_callers_get_unique_ids() {
        let ids = Arc::new(Snowflake::new(5, 7).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..2_000).map(|_| ids.next_id().unwrap()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
                let parts = IdParts::from_id(id);
                assert_eq!((parts.worker_id, parts.datacenter_id), (5, 7));
            }
        }
        assert_eq!(seen.len(), 16_000);
    }

    #[test]
    fn test_rejects_out_of_range_identity() {
        assert!(matches!(
            Snowflake::new(32, 0),
            Err(SnowflakeError::Configuration { field: "worker_id", .. })
        ));
        assert!(matches!(
            Snowflake::new(0, 32),
            Err(SnowflakeError::Configuration { field: "datacenter_id", .. })
        ));
    }
}
