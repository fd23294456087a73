//! Benchmark workloads for the keel memory primitives.
//!
//! - [`filled_seq`]: a sequence of `n` sequential integers
//! - [`index_stream`]: deterministic random positions into a sequence
//! - [`shared_fanout`]: `k` handles sharing one object

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use keel_ptr::Shared;
use keel_seq::Seq;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Build a sequence holding `0..n`, grown one push at a time.
pub fn filled_seq(n: u64) -> Seq<u64> {
    let mut seq = Seq::new();
    for value in 0..n {
        seq.push(value);
    }
    seq
}

/// Generate `count` positions in `0..len` from a seeded ChaCha8 stream.
///
/// The same `(len, count, seed)` always yields the same positions.
pub fn index_stream(len: usize, count: usize, seed: u64) -> Vec<usize> {
    assert!(len > 0, "cannot index an empty sequence");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| (rng.next_u64() % len as u64) as usize)
        .collect()
}

/// Create one shared object and `k` additional handles to it.
pub fn shared_fanout<T>(value: T, k: usize) -> (Shared<T>, Vec<Shared<T>>) {
    let origin = Shared::new(value);
    let copies = (0..k).map(|_| origin.clone()).collect();
    (origin, copies)
}
