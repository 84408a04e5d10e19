//! Joint sampling transforms: copulae and order-statistics maps.
//!
//! A copula imposes rank dependence between two unit coordinates while
//! leaving the first coordinate untouched, so a pair of independent design
//! columns becomes a dependent pair with the requested association. All
//! three forms are symmetric and invertible.

use std::f64::consts::PI;

use rand::Rng;

use qs_types::DistributionError;

/// A bivariate copula over the unit square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Copula {
    /// Elliptical copula parameterized by Spearman rank correlation.
    Elliptical { spearman_rho: f64 },
    /// Diagonal-band copula; negative correlation handled by reflection.
    DiagonalBand { correlation: f64 },
    /// Frank copula; theta around 10 gives strong positive dependence.
    ///
    /// The conditional draw consumes a fresh uniform, so the second
    /// coordinate is not informed by the sampling plan and a
    /// low-discrepancy design's structure is not preserved in it.
    Frank { theta: f64 },
}

impl Copula {
    pub fn elliptical(spearman_rho: f64) -> Result<Self, DistributionError> {
        if !(-1.0..=1.0).contains(&spearman_rho) {
            return Err(DistributionError::InvalidCorrelation {
                value: spearman_rho,
            });
        }
        Ok(Self::Elliptical { spearman_rho })
    }

    pub fn diagonal_band(correlation: f64) -> Result<Self, DistributionError> {
        if !(-1.0..=1.0).contains(&correlation) {
            return Err(DistributionError::InvalidCorrelation { value: correlation });
        }
        Ok(Self::DiagonalBand { correlation })
    }

    pub fn frank(theta: f64) -> Result<Self, DistributionError> {
        if theta == 0.0 {
            return Err(DistributionError::ZeroTheta);
        }
        Ok(Self::Frank { theta })
    }

    /// Transform an independent pair `(u1, u2)` into a dependent pair.
    /// `u1` passes through unchanged.
    pub fn join<R: Rng + ?Sized>(&self, u1: f64, u2: f64, rng: &mut R) -> (f64, f64) {
        match *self {
            Self::Elliptical { spearman_rho } => {
                let v1 = u1 - 0.5;
                let v2 = (1.0 - spearman_rho.powi(2)).sqrt()
                    * (0.25 - v1.powi(2)).sqrt()
                    * (PI * u2).sin()
                    + spearman_rho * v1
                    + 0.5;
                (u1, v2)
            }
            Self::DiagonalBand { correlation } => {
                let band = 1.0 - correlation.abs();
                let v1 = if correlation < 0.0 { 1.0 - u1 } else { u1 };
                let out = if v1 < band && u2 < 1.0 - v1 / band {
                    band * u2
                } else if v1 > 1.0 - band && u2 > (1.0 - v1) / band {
                    band * u2 + 1.0 - band
                } else {
                    2.0 * band * u2 + v1 - band
                };
                (u1, out)
            }
            Self::Frank { theta } => {
                let draw: f64 = rng.gen();
                let v2 = -(1.0
                    - (1.0 - (-theta).exp())
                        / ((1.0 / draw - 1.0) * (-theta * u1).exp() + 1.0))
                    .ln()
                    / theta;
                (u1, v2)
            }
        }
    }
}

/// Map independent uniforms to an ordered tuple `0 <= o_1 <= ... <= o_d <= 1`
/// distributed as the order statistics of `d` uniform draws.
///
/// Built top-down: the largest value is `u_d^(1/d)` and each earlier value
/// scales its successor by `u_k^(1/k)`.
pub fn nested(u: &[f64]) -> Vec<f64> {
    let d = u.len();
    let mut out = vec![0.0; d];
    let mut upper = 1.0;
    for k in (0..d).rev() {
        upper *= u[k].powf(1.0 / (k + 1) as f64);
        out[k] = upper;
    }
    out
}

/// Two-variable special case: `(u1*sqrt(u2), sqrt(u2))` with
/// `0 <= first <= second <= 1`.
pub fn nested_pair(u1: f64, u2: f64) -> (f64, f64) {
    let second = u2.sqrt();
    (u1 * second, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn constructors_validate_parameters() {
        assert!(Copula::elliptical(1.2).is_err());
        assert!(Copula::diagonal_band(-1.5).is_err());
        assert!(Copula::frank(0.0).is_err());
        assert!(Copula::elliptical(-0.8).is_ok());
        assert!(Copula::frank(10.0).is_ok());
    }

    #[test]
    fn copulae_preserve_first_coordinate_and_unit_square() {
        let mut rng = ChaCha8Rng::seed_from_u64(23);
        let copulae = [
            Copula::elliptical(0.6).unwrap(),
            Copula::diagonal_band(0.4).unwrap(),
            Copula::diagonal_band(-0.4).unwrap(),
            Copula::frank(10.0).unwrap(),
        ];
        for copula in copulae {
            for _ in 0..500 {
                let u1: f64 = rng.gen();
                let u2: f64 = rng.gen();
                let (o1, o2) = copula.join(u1, u2, &mut rng);
                assert_eq!(o1, u1);
                assert!((0.0..=1.0).contains(&o2), "{copula:?} produced {o2}");
            }
        }
    }

    #[test]
    fn elliptical_at_full_correlation_is_comonotone() {
        let mut rng = ChaCha8Rng::seed_from_u64(29);
        let copula = Copula::elliptical(1.0).unwrap();
        for k in 0..=10 {
            let u1 = k as f64 / 10.0;
            let (_, o2) = copula.join(u1, 0.77, &mut rng);
            assert!((o2 - u1).abs() < 1e-12);
        }
    }

    #[test]
    fn nested_output_is_sorted() {
        let out = nested(&[0.9, 0.3, 0.7, 0.2]);
        assert_eq!(out.len(), 4);
        for pair in out.windows(2) {
            assert!(pair[0] <= pair[1], "unsorted: {out:?}");
        }
        assert!(out.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn nested_pair_orders_two_uniforms() {
        let (a, b) = nested_pair(0.8, 0.25);
        assert!((b - 0.5).abs() < 1e-12);
        assert!((a - 0.4).abs() < 1e-12);
        assert!(a <= b);
    }
}
