//! Inverse-CDF distribution transforms.
//!
//! A [`Transform`] is a compiled, ready-to-sample form of a [`ParamSpec`]:
//! validation and shape solving happen once at construction, so sampling is
//! a pure closed-form evaluation and a bad configuration can never surface
//! mid-batch. Every transform is monotonic non-decreasing in `u`, which is
//! what lets a stratified or low-discrepancy design keep its structure after
//! mapping into parameter space.

use std::f64::consts::{PI, SQRT_2};

use tracing::debug;

use qs_types::{DistributionError, DistributionKind, ParamSpec, ParameterSet, QsResult};

use crate::special::erf_inv;

/// Shape parameters below this can produce a two-peaked Johnson curve.
const SHAPE_FLOOR: f64 = 0.70;
const SHAPE_STEP: f64 = 0.01;
const SHAPE_PEAK_THRESHOLD: f64 = 4.0;
/// Far beyond anything the mode clamp (0.01..0.99) can require.
const SHAPE_MAX_STEPS: usize = 1_000;

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Identity,
    Linear,
    LogLinear,
    Johnson {
        alpha1: f64,
        alpha2: f64,
    },
    Trapezoid {
        m: f64,
        n: f64,
        a: f64,
        b: f64,
        p1: f64,
        p2: f64,
        p3: f64,
    },
}

/// A compiled per-dimension transform from a unit coordinate to a parameter
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    kind: Kind,
    low: f64,
    high: f64,
    log_scale: bool,
}

impl Transform {
    /// Compile a validated spec into a sampler.
    ///
    /// The spec's own constructors have already checked bounds and modes;
    /// this step solves the Johnson shape search and precomputes trapezoid
    /// region probabilities, either of which can still reject the
    /// configuration.
    pub fn for_spec(spec: &ParamSpec) -> Result<Self, DistributionError> {
        let kind = match &spec.distribution {
            DistributionKind::Uniform => Kind::Identity,
            DistributionKind::Linear => Kind::Linear,
            DistributionKind::LogLinear => Kind::LogLinear,
            DistributionKind::JohnsonBounded { mode } => {
                let (alpha1, alpha2) = solve_johnson_shape(&spec.name, *mode)?;
                Kind::Johnson { alpha1, alpha2 }
            }
            DistributionKind::Trapezoid { m, n, a, b } => trapezoid_kind(*m, *n, *a, *b),
            DistributionKind::Triangle { mode } => trapezoid_kind(*mode, *mode, 2.0, 2.0),
        };
        Ok(Self {
            kind,
            low: spec.low,
            high: spec.high,
            log_scale: spec.log_scale,
        })
    }

    /// Map a unit coordinate `u` in `[0,1]` to a parameter value.
    ///
    /// Monotonic non-decreasing in `u`; for the bounded kinds `sample(0)`
    /// and `sample(1)` hit the configured bounds. Log-scaled dimensions
    /// exponentiate (`10^t`) after the transform, bounds being log-space
    /// values by the caller's convention.
    pub fn sample(&self, u: f64) -> f64 {
        let span = self.high - self.low;
        let t = match &self.kind {
            Kind::Identity => u,
            Kind::Linear => self.low + span * u,
            Kind::LogLinear => self.low * (self.high / self.low).powf(u),
            Kind::Johnson { alpha1, alpha2 } => {
                self.low + span * johnson_inverse(u, *alpha1, *alpha2)
            }
            Kind::Trapezoid {
                m,
                n,
                a,
                b,
                p1,
                p2,
                p3,
            } => self.low + span * trapezoid_inverse(u, *m, *n, *a, *b, *p1, *p2, *p3),
        };
        if self.log_scale {
            10f64.powf(t)
        } else {
            t
        }
    }
}

/// Solve the Johnson-bounded shape pair for a given mode.
///
/// Steps `alpha2` upward from the bimodality floor until the implied peak
/// density clears the threshold. Modes at exactly 0 or 1 are pulled in to
/// 0.01 / 0.99 to avoid the singular endpoints.
fn solve_johnson_shape(name: &str, mode: f64) -> Result<(f64, f64), DistributionError> {
    let m = if mode == 0.0 {
        0.01
    } else if mode == 1.0 {
        0.99
    } else {
        mode
    };
    let log_odds = (m / (1.0 - m)).log10();
    let norm = m * (1.0 - m) * (2.0 * PI).sqrt();

    let mut alpha2 = SHAPE_FLOOR - SHAPE_STEP;
    for step in 0..SHAPE_MAX_STEPS {
        alpha2 += SHAPE_STEP;
        let alpha1 = (2.0 * m - 1.0) / alpha2 - alpha2 * log_odds;
        let peak = alpha2 / norm * (-0.5 * (alpha1 + alpha2 * log_odds).powi(2)).exp();
        if peak > SHAPE_PEAK_THRESHOLD {
            debug!(
                "Johnson shape search for {} converged after {} steps: alpha1 = {:.4}, alpha2 = {:.2}",
                name,
                step + 1,
                alpha1,
                alpha2
            );
            return Ok((alpha1, alpha2));
        }
    }
    Err(DistributionError::ShapeSearchExhausted {
        name: name.to_string(),
        threshold: SHAPE_PEAK_THRESHOLD,
        steps: SHAPE_MAX_STEPS,
    })
}

fn johnson_inverse(u: f64, alpha1: f64, alpha2: f64) -> f64 {
    if u <= 0.0 {
        return 0.0;
    }
    if u >= 1.0 {
        return 1.0;
    }
    let z = SQRT_2 * erf_inv(2.0 * u - 1.0);
    let y = ((z - alpha1) / alpha2).exp();
    y / (y + 1.0)
}

/// Precompute the three region probabilities of the general trapezoid.
/// `p1 + p2 + p3 = 1`; `p2 = 0` degenerates to the triangular case.
fn trapezoid_kind(m: f64, n: f64, a: f64, b: f64) -> Kind {
    let pd = b * m + a * b * (n - m) + a * (1.0 - n);
    Kind::Trapezoid {
        m,
        n,
        a,
        b,
        p1: b * m / pd,
        p2: a * b * (n - m) / pd,
        p3: a * (1.0 - n) / pd,
    }
}

#[allow(clippy::too_many_arguments)]
fn trapezoid_inverse(u: f64, m: f64, n: f64, a: f64, b: f64, p1: f64, p2: f64, p3: f64) -> f64 {
    if u < p1 {
        m * (u / p1).powf(1.0 / a)
    } else if u > 1.0 - p3 {
        1.0 - (1.0 - n) * ((1.0 - u) / p3).powf(1.0 / b)
    } else if p2 > 0.0 {
        u * (n - m) / p2 + m * (1.0 - 1.0 / a)
    } else {
        m
    }
}

/// The compiled transforms for a whole parameter set, in dimension order.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformSet {
    transforms: Vec<Transform>,
}

impl TransformSet {
    /// Compile every dimension up front so configuration errors surface
    /// before any concurrent work starts.
    pub fn for_params(set: &ParameterSet) -> QsResult<Self> {
        let transforms = set
            .iter()
            .map(Transform::for_spec)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { transforms })
    }

    pub fn dimension_count(&self) -> usize {
        self.transforms.len()
    }

    pub fn get(&self, dimension: usize) -> &Transform {
        &self.transforms[dimension]
    }

    /// Map a unit vector into parameter space, dimension by dimension.
    pub fn map(&self, unit: &[f64]) -> Vec<f64> {
        assert_eq!(
            unit.len(),
            self.transforms.len(),
            "unit vector length {} does not match {} transforms",
            unit.len(),
            self.transforms.len()
        );
        unit.iter()
            .zip(&self.transforms)
            .map(|(&u, t)| t.sample(u))
            .collect()
    }
}
