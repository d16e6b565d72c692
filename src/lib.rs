//! # vpknn — kNN search over dense, fixed-dimension `i8` vectors
//!
//! Three interchangeable ways to answer the same query — a naive linear
//! scan, a stride-partitioned parallel scan, and an indexed Vantage-Point
//! Tree search — that are required to agree on every top-k result. The
//! naive scan is the reference; the other two trade setup cost or memory
//! for speed without changing the answer.
//!
//! ## Memory layout
//!
//! [`VectorStore`] holds every vector as one flat, row-major buffer of `i8`
//! (vector `i` at `data[i*d..(i+1)*d]`) rather than a `Vec<Vec<i8>>` of N
//! separate heap allocations — sequential scans stay in cache instead of
//! chasing N pointers.
//!
//! ## Choosing a searcher
//!
//! - [`naive_search`] — O(N) per query, zero setup. Use it for small N or
//!   as a correctness oracle.
//! - [`parallel_search`] — same O(N) work spread over `config.workers`
//!   threads via stride partitioning and a k-way merge; falls back to
//!   [`naive_search`] when N is too small to give every worker enough to do.
//! - [`build_vpt`] + [`vpt::Vpt::search`] — O(log N) expected per query once
//!   the O(N log N) index is built. Worth it when the same corpus answers
//!   many queries.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

pub mod config;
pub mod distance;
pub mod error;
pub mod heap;
pub mod naive;
pub mod parallel;
pub mod sort;
pub mod store;
pub mod vpt;

pub use config::KnnConfig;
pub use error::{KnnError, Result};
pub use naive::naive_search;
pub use parallel::parallel_search;
pub use store::VectorStore;
pub use vpt::{build_vpt, Vpt};

/// Panic with a diagnostic dump of all three result vectors if they
/// disagree. Intended for tests and the demo harness, not library callers —
/// the three searchers are required to agree by construction, so a mismatch
/// here means a bug, not a recoverable runtime condition.
pub fn validate_consistency(naive: &[f64], parallel: &[f64], vpt: &[f64]) {
    if naive != parallel || naive != vpt {
        panic!(
            "kNN searchers disagree on the top-k result\n  naive:    {naive:?}\n  parallel: {parallel:?}\n  vpt:      {vpt:?}"
        );
    }
}
