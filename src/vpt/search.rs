//! VP-tree search: frontier traversal pruned by the triangle inequality,
//! with an optional channel-coordinated parallel batch expansion once the
//! frontier grows wide enough to be worth splitting across workers.
//!
//! Grounded on the original source's `VPTreeKnnLocator.SearchKNearest` (a BFS
//! queue, a running `furthestKnnSoFar` radius, and the `distance < radius +
//! tau` / `distance >= radius - tau` descent rule) and on the teacher's
//! channel-free `rayon` fan-out recast through `crossbeam-channel`, since
//! here each worker can discover a variable number of new frontier nodes and
//! candidates rather than writing into a fixed-size slot.

use std::collections::VecDeque;

use crate::distance::squared_l2;
use crate::error::{KnnError, Result};
use crate::heap::{BoundedMaxHeap, TopKItem};

use super::{Vpt, VptNode};

impl Vpt {
    /// Find the `k` smallest squared distances from `query` to the indexed
    /// vectors.
    pub fn search(&self, query: &[i8], k: usize) -> Result<Vec<f64>> {
        if query.len() != self.dim {
            return Err(KnnError::shape(self.dim, query.len()));
        }
        if k == 0 {
            return Err(KnnError::param("k must be > 0"));
        }
        if k > self.n {
            return Err(KnnError::param(format!(
                "k ({k}) exceeds the number of indexed vectors ({})",
                self.n
            )));
        }

        let mut frontier: VecDeque<&VptNode> = VecDeque::new();
        if let Some(root) = &self.root {
            frontier.push_back(root);
        }

        let mut top = BoundedMaxHeap::with_capacity(k + 1);

        while !frontier.is_empty() {
            let threshold = self.config.threshold_parallel;
            if threshold > 0 && frontier.len() >= threshold {
                self.process_parallel_batch(&mut frontier, &mut top, k, query);
            } else {
                let node = frontier.pop_front().unwrap();
                visit(node, query, &mut top, k, &mut frontier);
            }
        }

        Ok(top
            .into_sorted_ascending()
            .into_iter()
            .map(|item| item.distance)
            .collect())
    }

    /// Pop up to `config.max_parallel_frontier` nodes off the head of the
    /// frontier and evaluate them concurrently against a single snapshot of
    /// `tau`, then serially re-apply each candidate against the (possibly
    /// now tighter) current `tau` and append discovered children back onto
    /// the frontier. The frontier and heap are only ever mutated here, at
    /// the join point — workers only send through channels.
    fn process_parallel_batch<'a>(
        &'a self,
        frontier: &mut VecDeque<&'a VptNode>,
        top: &mut BoundedMaxHeap,
        k: usize,
        query: &[i8],
    ) {
        let batch_size = self.config.max_parallel_frontier.min(frontier.len());
        let batch: Vec<&VptNode> = (0..batch_size).filter_map(|_| frontier.pop_front()).collect();
        let tau_snapshot = current_tau(top, k);

        let (candidates_tx, candidates_rx) = crossbeam_channel::unbounded::<f64>();
        let (children_tx, children_rx) = crossbeam_channel::unbounded::<&'a VptNode>();

        let workers = self.config.workers.max(1).min(batch.len().max(1));
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .expect("vpt search thread pool");

        pool.scope(|scope| {
            for node in &batch {
                let candidates_tx = candidates_tx.clone();
                let children_tx = children_tx.clone();
                scope.spawn(move |_| {
                    let d = squared_l2(query, &node.vantage_point);
                    if d < tau_snapshot {
                        let _ = candidates_tx.send(d);
                    }
                    if let Some(inside) = &node.inside {
                        if d < node.radius + tau_snapshot {
                            let _ = children_tx.send(inside.as_ref());
                        }
                    }
                    if let Some(outside) = &node.outside {
                        if d >= node.radius - tau_snapshot {
                            let _ = children_tx.send(outside.as_ref());
                        }
                    }
                });
            }
        });
        drop(candidates_tx);
        drop(children_tx);

        for d in candidates_rx.try_iter() {
            let tau_now = current_tau(top, k);
            if d < tau_now {
                top.insert(TopKItem { index: 0, distance: d });
            }
        }
        for node in children_rx.try_iter() {
            frontier.push_back(node);
        }
    }
}

/// Visit a single frontier node serially: score it against `query`, fold it
/// into `top` if it improves on the current `tau`, then push whichever
/// children the triangle inequality says might still hold a closer point.
fn visit<'a>(
    node: &'a VptNode,
    query: &[i8],
    top: &mut BoundedMaxHeap,
    k: usize,
    frontier: &mut VecDeque<&'a VptNode>,
) {
    let d = squared_l2(query, &node.vantage_point);

    if d < current_tau(top, k) {
        top.insert(TopKItem { index: 0, distance: d });
    }

    let tau = current_tau(top, k);
    if let Some(inside) = &node.inside {
        if d < node.radius + tau {
            frontier.push_back(inside);
        }
    }
    if let Some(outside) = &node.outside {
        if d >= node.radius - tau {
            frontier.push_back(outside);
        }
    }
}

/// The current pruning radius: infinite until `top` holds `k` candidates,
/// then the current max.
fn current_tau(top: &BoundedMaxHeap, k: usize) -> f64 {
    if top.len() >= k {
        top.peek().map(|item| item.distance).unwrap_or(f64::INFINITY)
    } else {
        f64::INFINITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KnnConfig;
    use crate::naive::naive_search;
    use crate::store::VectorStore;
    use crate::vpt::build_vpt;

    fn store_from(rows: &[&[i8]]) -> VectorStore<'static> {
        let d = rows[0].len();
        let mut buf = Vec::new();
        for r in rows {
            buf.extend_from_slice(r);
        }
        VectorStore::from_bytes(buf, rows.len(), d).unwrap()
    }

    #[test]
    fn matches_naive_on_trivial_case() {
        let store = store_from(&[&[0, 0], &[3, 4], &[1, 1]]);
        let vpt = build_vpt(&store, KnnConfig::with_workers(1));
        let result = vpt.search(&[0, 0], 2).unwrap();
        assert_eq!(result, vec![0.0, 2.0]);
    }

    #[test]
    fn self_nearest_at_distance_zero() {
        let rows: Vec<Vec<i8>> = (0..30i8).map(|i| vec![i, -i, i / 3]).collect();
        let row_refs: Vec<&[i8]> = rows.iter().map(|r| r.as_slice()).collect();
        let store = store_from(&row_refs);
        let vpt = build_vpt(&store, KnnConfig::with_workers(3));
        for row in &rows {
            let result = vpt.search(row, 1).unwrap();
            assert_eq!(result[0], 0.0, "row {row:?} should be its own nearest neighbor");
        }
    }

    #[test]
    fn matches_naive_across_many_queries() {
        let rows: Vec<Vec<i8>> = (0..80i8).map(|i| vec![i, i.wrapping_mul(3), -i]).collect();
        let row_refs: Vec<&[i8]> = rows.iter().map(|r| r.as_slice()).collect();
        let store = store_from(&row_refs);
        let vpt = build_vpt(&store, KnnConfig::with_workers(4));

        for q in [[-10, 5, 3], [0, 0, 0], [40, -20, 7], [-60, 90, -30]] {
            let expected = naive_search(&store, &q, 5).unwrap();
            let got = vpt.search(&q, 5).unwrap();
            assert_eq!(got, expected, "mismatch for query {q:?}");
        }
    }

    #[test]
    fn parallel_frontier_batch_matches_serial() {
        let rows: Vec<Vec<i8>> = (0..120i8).map(|i| vec![i, -i, i % 11]).collect();
        let row_refs: Vec<&[i8]> = rows.iter().map(|r| r.as_slice()).collect();
        let store = store_from(&row_refs);

        let mut low_threshold = KnnConfig::with_workers(4);
        low_threshold.threshold_parallel = 2;
        low_threshold.max_parallel_frontier = 8;
        let parallel_heavy = build_vpt(&store, low_threshold);

        let mut never_parallel = KnnConfig::with_workers(4);
        never_parallel.threshold_parallel = usize::MAX;
        let serial_only = build_vpt(&store, never_parallel);

        for q in [[3, -3, 1], [50, -50, 6], [-90, 90, 2]] {
            let expected = serial_only.search(&q, 7).unwrap();
            let got = parallel_heavy.search(&q, 7).unwrap();
            assert_eq!(got, expected, "mismatch for query {q:?}");
        }
    }

    #[test]
    fn rejects_wrong_query_shape() {
        let store = store_from(&[&[1, 2], &[3, 4]]);
        let vpt = build_vpt(&store, KnnConfig::with_workers(1));
        assert!(vpt.search(&[1, 2, 3], 1).is_err());
    }

    #[test]
    fn rejects_k_larger_than_corpus() {
        let store = store_from(&[&[1], &[2]]);
        let vpt = build_vpt(&store, KnnConfig::with_workers(1));
        assert!(vpt.search(&[0], 5).is_err());
    }
}
