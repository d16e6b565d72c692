//! Key-indexed rearrangement of a row-major point buffer.

/// Rearrange `points` (row-major, `m·d` bytes) and the parallel `keys[m]`
/// array in place so that `keys` is non-decreasing and `points[i]` still
/// corresponds to `keys[i]` after the reorder.
///
/// Grounded on the original source's `SortBasedOn`: build an index
/// permutation ordered by key, then rebuild both arrays from it.
///
/// # Panics
/// Panics if `points.len() != keys.len() * d`.
pub fn sort_based_on(points: &mut Vec<i8>, keys: &mut Vec<f64>, d: usize) {
    let m = keys.len();
    assert_eq!(points.len(), m * d, "sort_based_on: shape mismatch");

    let mut indices: Vec<usize> = (0..m).collect();
    indices.sort_by(|&i, &j| keys[i].partial_cmp(&keys[j]).unwrap());

    let mut sorted_points = Vec::with_capacity(points.len());
    let mut sorted_keys = Vec::with_capacity(m);

    for &idx in &indices {
        sorted_keys.push(keys[idx]);
        sorted_points.extend_from_slice(&points[idx * d..(idx + 1) * d]);
    }

    *points = sorted_points;
    *keys = sorted_keys;
}
