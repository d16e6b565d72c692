//! The reference, no-tricks linear scan.

use crate::distance::squared_l2;
use crate::error::Result;
use crate::store::VectorStore;

/// Compute all N distances from `query` to `store`, sort ascending, return
/// the first `k`. The baseline every other searcher is validated against.
pub fn naive_search(store: &VectorStore, query: &[i8], k: usize) -> Result<Vec<f64>> {
    store.validate_query(query)?;
    store.validate_k(k)?;

    let mut distances: Vec<f64> = (0..store.len())
        .map(|i| squared_l2(query, store.row(i)))
        .collect();

    distances.sort_by(|a, b| a.partial_cmp(b).unwrap());
    distances.truncate(k);
    Ok(distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_from(rows: &[&[i8]]) -> VectorStore<'static> {
        let d = rows[0].len();
        let mut buf = Vec::new();
        for r in rows {
            buf.extend_from_slice(r);
        }
        VectorStore::from_bytes(buf, rows.len(), d).unwrap()
    }

    #[test]
    fn s1_trivial() {
        let store = store_from(&[&[0, 0], &[3, 4], &[1, 1]]);
        let result = naive_search(&store, &[0, 0], 2).unwrap();
        assert_eq!(result, vec![0.0, 2.0]);
    }

    #[test]
    fn s2_ties() {
        let store = store_from(&[&[1], &[-1], &[2], &[-2], &[3]]);
        let result = naive_search(&store, &[0], 3).unwrap();
        assert_eq!(result, vec![1.0, 1.0, 4.0]);
    }

    #[test]
    fn s3_duplicates() {
        let store = store_from(&[&[5], &[5], &[5], &[5]]);
        let result = naive_search(&store, &[0], 4).unwrap();
        assert_eq!(result, vec![25.0, 25.0, 25.0, 25.0]);
    }

    #[test]
    fn s4_k_equals_n() {
        let store = store_from(&[&[0, 0], &[1, 0], &[0, 1]]);
        let result = naive_search(&store, &[0, 0], 3).unwrap();
        assert_eq!(result, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn rejects_bad_query_shape() {
        let store = store_from(&[&[1, 2], &[3, 4]]);
        assert!(naive_search(&store, &[1, 2, 3], 1).is_err());
    }

    #[test]
    fn results_are_monotonic() {
        let store = store_from(&[&[10], &[1], &[7], &[3], &[9], &[0]]);
        let result = naive_search(&store, &[0], 6).unwrap();
        assert!(result.windows(2).all(|w| w[0] <= w[1]));
    }
}
