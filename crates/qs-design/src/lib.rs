//! Space-filling sampling designs over the unit hypercube and the
//! inverse-CDF transforms that map them into parameter space.

pub mod halton;
pub mod invdist;
pub mod jointdist;
pub mod lhc;
pub mod shuffle;
pub mod special;

pub use halton::GeneralizedHalton;
pub use invdist::{Transform, TransformSet};
pub use jointdist::Copula;
pub use lhc::LatinHypercube;
pub use shuffle::PermutationPlan;
