//! Vantage-Point Tree index: build once, query many times.
//!
//! Grounded on the original source's `VPTreeKnnLocator` (recursive median
//! split around a vantage point, triangle-inequality pruning at search time)
//! and on `other_examples`' `vptree.rs` for the idiomatic-Rust shape of the
//! node type and recursive builder.

mod build;
mod search;

pub use build::build_vpt;

use crate::config::KnnConfig;

/// One node of the tree: a vantage point, the median distance (`radius`) that
/// split its children, and the two child subtrees (`None` for a leaf).
pub(crate) struct VptNode {
    pub(crate) vantage_point: Vec<i8>,
    pub(crate) radius: f64,
    pub(crate) inside: Option<Box<VptNode>>,
    pub(crate) outside: Option<Box<VptNode>>,
}

/// A built index over a fixed set of `n` vectors of dimension `dim`.
///
/// Immutable once built — there is no insertion or deletion operation, per
/// the fixed-corpus scope of this crate.
pub struct Vpt {
    pub(crate) root: Option<VptNode>,
    pub(crate) dim: usize,
    pub(crate) n: usize,
    pub(crate) config: KnnConfig,
}

impl Vpt {
    /// Dimensionality of the vectors this index was built over.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of vectors in the index.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}
