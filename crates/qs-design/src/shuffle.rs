//! Per-dimension random permutations backing the stratified design.
//!
//! Each dimension gets its own permutation of `0..n`. Dimension 0 shuffles
//! the identity; every later dimension copies its predecessor and performs a
//! fresh shuffle pass of its own. A dimension that merely copied would
//! inherit its predecessor's ordering and induce artificial correlation
//! between the two.

use rand::Rng;

/// A p-row matrix of permutations of `0..n`, one row per dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationPlan {
    rows: Vec<Vec<usize>>,
    samples: usize,
}

impl PermutationPlan {
    /// Build permutations for `dimensions` rows of `samples` entries using a
    /// Fisher-Yates shuffle over the caller's generator.
    pub fn build<R: Rng + ?Sized>(rng: &mut R, samples: usize, dimensions: usize) -> Self {
        let mut rows = vec![vec![0usize; samples]; dimensions];
        if dimensions > 0 {
            for (i, slot) in rows[0].iter_mut().enumerate() {
                *slot = i;
            }
        }
        for j in 0..dimensions {
            if j > 0 {
                let (done, rest) = rows.split_at_mut(j);
                rest[0].copy_from_slice(&done[j - 1]);
            }
            for i in (1..samples).rev() {
                let pivot = rng.gen_range(0..=i);
                rows[j].swap(pivot, i);
            }
        }
        Self { rows, samples }
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn dimension_count(&self) -> usize {
        self.rows.len()
    }

    /// The permutation for dimension `j`.
    pub fn row(&self, dimension: usize) -> &[usize] {
        &self.rows[dimension]
    }
}
