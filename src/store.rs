//! Row-major vector storage.

use std::borrow::Cow;

use crate::error::{KnnError, Result};

/// A contiguous, row-major buffer of `n · d` signed bytes: vector `i` occupies
/// `data[i*d .. (i+1)*d]`. Immutable once constructed — mirrors the teacher's
/// `AbkveInner` "single allocation for all vector data" discipline, but as a
/// borrow-or-own buffer rather than an always-owned one, since the VPT
/// builder wants to hand out transient owned sub-buffers during recursion
/// without forcing every caller to copy up front.
#[derive(Debug, Clone)]
pub struct VectorStore<'a> {
    data: Cow<'a, [i8]>,
    n: usize,
    d: usize,
}

impl<'a> VectorStore<'a> {
    /// Build a store from a row-major buffer of exactly `n * d` bytes.
    ///
    /// Accepts anything convertible to `Cow<[i8]>`: pass a `&[i8]` to borrow,
    /// or a `Vec<i8>` to hand over ownership.
    pub fn from_bytes(buf: impl Into<Cow<'a, [i8]>>, n: usize, d: usize) -> Result<Self> {
        let data = buf.into();
        if d == 0 {
            return Err(KnnError::param("dimension d must be > 0"));
        }
        if data.len() != n * d {
            return Err(KnnError::shape(n * d, data.len()));
        }
        Ok(Self { data, n, d })
    }

    /// Number of vectors in the store.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Dimensionality of every stored vector.
    pub fn dim(&self) -> usize {
        self.d
    }

    /// O(1) slice of the `i`-th vector.
    pub fn row(&self, i: usize) -> &[i8] {
        let base = i * self.d;
        &self.data[base..base + self.d]
    }

    /// The full row-major buffer.
    pub fn as_slice(&self) -> &[i8] {
        &self.data
    }

    /// Copy the store's contents out as an owned, row-major `Vec<i8>` — used
    /// by the VPT builder to seed its first recursion with an owned buffer it
    /// can freely partition.
    pub fn to_owned_buffer(&self) -> Vec<i8> {
        self.data.to_vec()
    }

    /// Validate that `query` has the store's dimensionality.
    pub fn validate_query(&self, query: &[i8]) -> Result<()> {
        if query.len() != self.d {
            return Err(KnnError::shape(self.d, query.len()));
        }
        Ok(())
    }

    /// Validate a requested `k` against this store's size and `workers`
    /// against the zero-workers parameter error.
    pub fn validate_k(&self, k: usize) -> Result<()> {
        if k == 0 {
            return Err(KnnError::param("k must be > 0"));
        }
        if k > self.n {
            return Err(KnnError::param(format!(
                "k ({k}) exceeds the number of stored vectors ({})",
                self.n
            )));
        }
        Ok(())
    }
}
