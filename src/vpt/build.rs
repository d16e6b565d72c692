//! Recursive VP-tree construction.
//!
//! Grounded on the original source's `VPTreeKnnLocator.BuildIndex`: pick the
//! last remaining vector as the vantage point, compute distances from it to
//! everything else (in phased parallel once the subtree is large enough to
//! be worth the thread-pool overhead), partition around the median distance,
//! track and swap the furthest point of each side to its partition's last
//! slot (so the next recursion can reuse the same "vantage point = last
//! vector" rule), then recurse.

use crate::config::KnnConfig;
use crate::distance::squared_l2;
use crate::store::VectorStore;

use super::{Vpt, VptNode};

/// Build an index over every vector in `store`.
pub fn build_vpt(store: &VectorStore, config: KnnConfig) -> Vpt {
    let dim = store.dim();
    let n = store.len();
    let points = store.to_owned_buffer();
    let root = build_recursive(points, dim, n, &config);
    Vpt {
        root,
        dim,
        n,
        config,
    }
}

/// `points` is a row-major, owned buffer of `m·d` bytes that this call
/// consumes. `total_n` is the size of the whole corpus being indexed (used
/// only to decide when a subtree is large enough to parallelize).
fn build_recursive(
    mut points: Vec<i8>,
    d: usize,
    total_n: usize,
    config: &KnnConfig,
) -> Option<VptNode> {
    let mut m = points.len() / d;
    if m == 0 {
        return None;
    }

    let vp_start = (m - 1) * d;
    let vantage_point = points[vp_start..].to_vec();
    points.truncate(vp_start);
    m -= 1;

    if m == 0 {
        return Some(VptNode {
            vantage_point,
            radius: 0.0,
            inside: None,
            outside: None,
        });
    }

    let distances = compute_distances(&points, &vantage_point, d, m, total_n, config);

    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| distances[a].partial_cmp(&distances[b]).unwrap());
    let median = distances[order[m / 2]];

    let mut inside_points = Vec::with_capacity(points.len());
    let mut outside_points = Vec::with_capacity(points.len());
    let mut furthest_inside: Option<(usize, f64)> = None;
    let mut furthest_outside: Option<(usize, f64)> = None;

    for i in 0..m {
        let row = &points[i * d..(i + 1) * d];
        let dist = distances[i];
        if dist < median {
            let pos = inside_points.len() / d;
            let is_new_furthest = furthest_inside.map(|(_, fd)| dist > fd).unwrap_or(true);
            if is_new_furthest {
                furthest_inside = Some((pos, dist));
            }
            inside_points.extend_from_slice(row);
        } else {
            let pos = outside_points.len() / d;
            let is_new_furthest = furthest_outside.map(|(_, fd)| dist > fd).unwrap_or(true);
            if is_new_furthest {
                furthest_outside = Some((pos, dist));
            }
            outside_points.extend_from_slice(row);
        }
    }

    if let Some((pos, _)) = furthest_inside {
        let last = inside_points.len() / d - 1;
        swap_rows(&mut inside_points, pos, last, d);
    }
    if let Some((pos, _)) = furthest_outside {
        let last = outside_points.len() / d - 1;
        swap_rows(&mut outside_points, pos, last, d);
    }

    let inside = build_recursive(inside_points, d, total_n, config).map(Box::new);
    let outside = build_recursive(outside_points, d, total_n, config).map(Box::new);

    Some(VptNode {
        vantage_point,
        radius: median,
        inside,
        outside,
    })
}

/// Swap the `a`-th and `b`-th `d`-wide rows of `buf` in place.
fn swap_rows(buf: &mut [i8], a: usize, b: usize, d: usize) {
    if a == b {
        return;
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let (left, right) = buf.split_at_mut(hi * d);
    left[lo * d..(lo + 1) * d].swap_with_slice(&mut right[0..d]);
}

/// Compute the distance from `vp` to each of the `m` remaining points.
///
/// Below `total_n / 8` the subtree is small enough that thread-pool setup
/// would cost more than it saves, so this stays sequential. Above that, the
/// work is striped across `config.workers` threads (halved, floor 1, once
/// `m` itself drops under a quarter of the full corpus — the subtree is
/// still "large" by the first threshold but shrinking, so fewer workers
/// avoid oversubscribing small partitions near the leaves).
fn compute_distances(
    points: &[i8],
    vp: &[i8],
    d: usize,
    m: usize,
    total_n: usize,
    config: &KnnConfig,
) -> Vec<f64> {
    if m < total_n / 8 {
        return (0..m)
            .map(|i| squared_l2(vp, &points[i * d..(i + 1) * d]))
            .collect();
    }

    let mut workers = config.workers.max(1);
    if m < total_n / 4 {
        workers = (workers / 2).max(1);
    }
    workers = workers.min(m);

    let mut distances = vec![0.0f64; m];
    let buf = DistanceBuf(distances.as_mut_ptr());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .expect("vpt distance thread pool");

    pool.scope(|scope| {
        for worker in 0..workers {
            let buf = &buf;
            scope.spawn(move |_| {
                let mut j = worker;
                while j < m {
                    let dist = squared_l2(vp, &points[j * d..(j + 1) * d]);
                    // SAFETY: worker `w` only ever writes indices `j` with
                    // `j % workers == w`, so the `workers` stride partitions
                    // are pairwise disjoint — no two threads write the same
                    // slot, and every slot in `0..m` is written exactly once.
                    unsafe { *buf.0.add(j) = dist };
                    j += workers;
                }
            });
        }
    });

    distances
}

/// Raw pointer wrapper so distance slots can be handed to worker closures
/// without a lock; see the SAFETY comment at the write site.
struct DistanceBuf(*mut f64);

unsafe impl Send for DistanceBuf {}
unsafe impl Sync for DistanceBuf {}
