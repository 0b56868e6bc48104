//! Property-based tests for the MPSC ring
//!
//! These tests use the `proptest` framework to drive the ring through
//! randomized producer/consumer schedules and check the structural
//! invariants that unit tests cannot sweep:
//!
//! - **Multiset exactness:** the consumed set equals the accepted set -
//!   no losses, no duplicates, no fabrications.
//! - **Per-producer FIFO:** each producer's accepted records arrive in
//!   submission order.
//! - **Bounded occupancy:** the observed length never exceeds capacity.
//! - **Destructor exactness:** every element constructed is destroyed
//!   exactly once, whether consumed, rejected, or still queued at teardown.

use hotlog::Ring;
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// **Property:** under any concurrent schedule, the consumer receives
    /// exactly the accepted records, in per-producer submission order.
    ///
    /// **Strategy:** spawn up to four producers pushing tagged sequence
    /// numbers into a small ring while a consumer drains it, then compare
    /// each producer's accepted list with the consumer's view of it.
    #[test]
    fn test_consumed_equals_accepted(
        producers in 1usize..=4,
        per_producer in 1usize..=64,
        capacity_pow in 0u32..=5,
    ) {
        let capacity = 1usize << capacity_pow;
        let ring: Arc<Ring<(usize, usize)>> = Arc::new(Ring::new(capacity));
        let stop = Arc::new(AtomicBool::new(false));

        let consumer = {
            let ring = Arc::clone(&ring);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut seen = Vec::new();
                let mut max_len = 0usize;
                loop {
                    max_len = max_len.max(ring.len());
                    match ring.try_pop() {
                        Some(item) => seen.push(item),
                        None => {
                            if stop.load(Ordering::Acquire) {
                                while let Some(item) = ring.try_pop() {
                                    seen.push(item);
                                }
                                break;
                            }
                            thread::yield_now();
                        }
                    }
                }
                (seen, max_len)
            })
        };

        let mut handles = vec![];
        for producer in 0..producers {
            let ring = Arc::clone(&ring);
            handles.push(thread::spawn(move || {
                let mut accepted = Vec::new();
                for seq in 0..per_producer {
                    if ring.try_push((producer, seq)).is_ok() {
                        accepted.push(seq);
                    }
                }
                accepted
            }));
        }

        let mut accepted_per_producer = Vec::new();
        for handle in handles {
            accepted_per_producer.push(handle.join().unwrap());
        }
        stop.store(true, Ordering::Release);
        let (seen, max_len) = consumer.join().unwrap();

        prop_assert!(max_len <= capacity, "occupancy {} exceeded capacity {}", max_len, capacity);

        let total_accepted: usize = accepted_per_producer.iter().map(Vec::len).sum();
        prop_assert_eq!(seen.len(), total_accepted);

        for (producer, accepted) in accepted_per_producer.iter().enumerate() {
            let consumed: Vec<usize> = seen
                .iter()
                .filter(|(tag, _)| *tag == producer)
                .map(|(_, seq)| *seq)
                .collect();
            prop_assert_eq!(&consumed, accepted, "producer {} stream differs", producer);
        }
    }

    /// **Property:** every element constructed is destroyed exactly once.
    ///
    /// **Strategy:** replay a random push/pop schedule with a drop-counting
    /// element type, then drop the ring with elements still queued. Rejected
    /// pushes, consumed elements, and the teardown drain must each account
    /// for their element once.
    #[test]
    fn test_destructors_run_exactly_once(
        schedule in proptest::collection::vec(any::<bool>(), 1..200),
        capacity_pow in 0u32..=4,
    ) {
        struct Tracked {
            destroyed: Arc<AtomicUsize>,
        }

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.destroyed.fetch_add(1, Ordering::SeqCst);
            }
        }

        let constructed = Arc::new(AtomicUsize::new(0));
        let destroyed = Arc::new(AtomicUsize::new(0));
        let ring = Ring::new(1usize << capacity_pow);

        for push in schedule {
            if push {
                constructed.fetch_add(1, Ordering::SeqCst);
                // A rejected element is handed back and dropped right here
                let _ = ring.try_push(Tracked {
                    destroyed: Arc::clone(&destroyed),
                });
            } else {
                let _ = ring.try_pop();
            }
        }

        drop(ring);
        prop_assert_eq!(
            constructed.load(Ordering::SeqCst),
            destroyed.load(Ordering::SeqCst)
        );
    }

    /// **Property:** a sequential fill/drain round of any size leaves the
    /// ring consistent: `len` tracks pushes minus pops and ends at zero.
    #[test]
    fn test_sequential_occupancy_tracking(
        capacity_pow in 0u32..=5,
        rounds in 1usize..=4,
    ) {
        let capacity = 1usize << capacity_pow;
        let ring = Ring::new(capacity);

        for round in 0..rounds {
            for i in 0..capacity {
                ring.try_push(round * capacity + i).unwrap();
                prop_assert!(ring.len() <= capacity);
            }
            prop_assert_eq!(ring.try_push(usize::MAX), Err(usize::MAX));
            for i in 0..capacity {
                prop_assert_eq!(ring.try_pop(), Some(round * capacity + i));
            }
            prop_assert!(ring.is_empty());
        }
    }
}
