//! Concurrency test: shared handles copied, sent, and dropped across threads.
//!
//! **Workload:** one `Shared` object fanned out to worker threads over
//! crossbeam channels; every worker clones and drops its handle repeatedly,
//! then sends its copies back.
//!
//! **Pass criterion:** the count returns to exactly one owner, the object is
//! destroyed exactly once, and only after the last handle goes away.

use std::thread;

use crossbeam_channel::{bounded, unbounded};
use keel::prelude::*;
use keel_test_utils::{DropCounter, Tracked};

/// Worker threads per test.
const WORKERS: usize = 8;

/// Clone/drop cycles per worker.
const CYCLES: usize = 10_000;

#[test]
fn concurrent_clone_and_drop_balances() {
    let drops = DropCounter::new();
    let origin = Shared::new(drops.track(0u64));

    thread::scope(|scope| {
        for _ in 0..WORKERS {
            let local = origin.clone();
            scope.spawn(move || {
                for _ in 0..CYCLES {
                    let copy = local.clone();
                    assert!(copy.ptr_eq(&local));
                    drop(copy);
                }
            });
        }
    });

    assert_eq!(origin.use_count(), 1);
    assert_eq!(origin.weak_count(), 1);
    assert_eq!(drops.count(), 0);
    drop(origin);
    assert_eq!(drops.count(), 1);
}

#[test]
fn handles_round_trip_through_channels() {
    let drops = DropCounter::new();
    let origin = Shared::new(drops.track(String::from("payload")));
    let (to_workers, work) = unbounded::<Shared<Tracked<String>>>();
    let (to_main, returned) = unbounded();

    let workers: Vec<_> = (0..WORKERS)
        .map(|_| {
            let work = work.clone();
            let to_main = to_main.clone();
            thread::spawn(move || {
                for handle in work.iter() {
                    assert_eq!(handle.value(), "payload");
                    to_main.send(handle.clone()).unwrap();
                }
            })
        })
        .collect();
    drop(to_main);

    for _ in 0..1_000 {
        to_workers.send(origin.clone()).unwrap();
    }
    drop(to_workers);
    for worker in workers {
        worker.join().unwrap();
    }

    let collected: Vec<Shared<Tracked<String>>> = returned.iter().collect();
    assert_eq!(collected.len(), 1_000);
    assert_eq!(origin.use_count(), 1_001);

    drop(origin);
    assert_eq!(drops.count(), 0);
    drop(collected);
    assert_eq!(drops.count(), 1);
}

#[test]
fn last_owner_on_another_thread_destroys() {
    let drops = DropCounter::new();
    let origin = Shared::new(drops.track(vec![1u32, 2, 3]));
    let weak = origin.downgrade();
    let (tx, rx) = bounded::<Shared<Tracked<Vec<u32>>>>(1);
    let (done_tx, done_rx) = bounded(1);

    let worker = thread::spawn(move || {
        let handle = rx.recv().unwrap();
        assert_eq!(handle.use_count(), 1);
        drop(handle);
        done_tx.send(()).unwrap();
    });

    tx.send(origin).unwrap();
    done_rx.recv().unwrap();
    worker.join().unwrap();

    assert_eq!(drops.count(), 1);
    assert!(weak.upgrade().is_none());
    assert_eq!(weak.weak_count(), 1);
}

#[test]
fn weak_upgrades_race_with_last_drop() {
    for _ in 0..100 {
        let drops = DropCounter::new();
        let origin = Shared::new(drops.track(5u8));
        let weak = origin.downgrade();

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..100 {
                    if let Some(strong) = weak.upgrade() {
                        assert_eq!(*strong.value(), 5);
                    }
                }
            });
            scope.spawn(move || drop(origin));
        });

        assert!(weak.upgrade().is_none());
        assert_eq!(drops.count(), 1);
    }
}
