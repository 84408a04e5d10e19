//! Latin hypercube sampling plans.
//!
//! A stratified design partitions `[0,1)` into n equal-width strata per
//! dimension and places exactly one sample in each stratum, using one random
//! permutation per dimension. The result has good space-filling behavior and
//! is projection regular; discrepancy is higher than a digital sequence but
//! the stratification guarantee is exact.

use rand::Rng;

use qs_types::UnitDesign;

use crate::shuffle::PermutationPlan;

/// Builder for stratified (Latin hypercube) designs.
///
/// With `midpoint` set, every sample sits at the center of its stratum;
/// otherwise each sample jitters uniformly within its stratum.
#[derive(Debug, Clone, Copy, Default)]
pub struct LatinHypercube {
    midpoint: bool,
}

impl LatinHypercube {
    pub fn new() -> Self {
        Self { midpoint: false }
    }

    pub fn with_midpoint(mut self, midpoint: bool) -> Self {
        self.midpoint = midpoint;
        self
    }

    /// Build an n-sample, p-dimension stratified design.
    ///
    /// The generator is caller-owned: one seeded instance per generation
    /// call, never shared across concurrent calls.
    pub fn build<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        samples: usize,
        dimensions: usize,
    ) -> UnitDesign {
        let plan = PermutationPlan::build(rng, samples, dimensions);
        let n = samples as f64;

        let mut columns = Vec::with_capacity(dimensions);
        for j in 0..dimensions {
            let mut column = Vec::with_capacity(samples);
            for i in 0..samples {
                let w = if self.midpoint { 0.5 } else { rng.gen::<f64>() };
                column.push((plan.row(j)[i] as f64 + w) / n);
            }
            columns.push(column);
        }
        UnitDesign::from_columns(samples, columns)
    }
}
