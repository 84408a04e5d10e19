//! Parameter-space descriptions: per-dimension bounds and distribution kinds.

use serde::{Deserialize, Serialize};

use crate::errors::DistributionError;

/// How a unit coordinate maps into a parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DistributionKind {
    /// Identity: the unit coordinate passes through untouched.
    Uniform,
    /// Linear interpolation between the bounds.
    Linear,
    /// Geometric interpolation between the bounds (log-uniform).
    LogLinear,
    /// Unimodal Johnson-bounded distribution with the given mode in `[0,1]`.
    JohnsonBounded { mode: f64 },
    /// General trapezoid with modes `m <= n` and shape factors `a`, `b`.
    Trapezoid { m: f64, n: f64, a: f64, b: f64 },
    /// Triangular distribution with the given mode in `[0,1]`.
    Triangle { mode: f64 },
}

/// A single parameter dimension: bounds, optional log scaling, and the
/// distribution drawn over them.
///
/// Construction validates everything a transform will later rely on, so a
/// bad configuration fails here and never inside an evaluation batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub low: f64,
    pub high: f64,
    /// When set, the sampled value is exponentiated (`10^v`) after the
    /// transform; the bounds are interpreted as log-space values.
    pub log_scale: bool,
    pub distribution: DistributionKind,
}

impl ParamSpec {
    /// Validating constructor; the `uniform`/`linear`/... helpers below are
    /// the usual entry points.
    pub fn new(
        name: impl Into<String>,
        low: f64,
        high: f64,
        distribution: DistributionKind,
    ) -> Result<Self, DistributionError> {
        let name = name.into();
        if low > high {
            return Err(DistributionError::InvalidRange { name, low, high });
        }
        match &distribution {
            DistributionKind::LogLinear => {
                if low <= 0.0 || high <= 0.0 {
                    return Err(DistributionError::NonPositiveLogBounds { name, low, high });
                }
            }
            DistributionKind::JohnsonBounded { mode } | DistributionKind::Triangle { mode } => {
                if !(0.0..=1.0).contains(mode) {
                    return Err(DistributionError::ModeOutOfRange { name, mode: *mode });
                }
            }
            DistributionKind::Trapezoid { m, n, a, b } => {
                if !(0.0 <= *m && *m <= *n && *n <= 1.0) {
                    return Err(DistributionError::InvalidModes { name, m: *m, n: *n });
                }
                if *a <= 0.0 || *b <= 0.0 {
                    return Err(DistributionError::InvalidShapeFactors { name, a: *a, b: *b });
                }
            }
            DistributionKind::Uniform | DistributionKind::Linear => {}
        }
        Ok(Self {
            name,
            low,
            high,
            log_scale: false,
            distribution,
        })
    }

    pub fn uniform(name: impl Into<String>) -> Self {
        // Identity transform has nothing to validate.
        Self {
            name: name.into(),
            low: 0.0,
            high: 1.0,
            log_scale: false,
            distribution: DistributionKind::Uniform,
        }
    }

    pub fn linear(
        name: impl Into<String>,
        low: f64,
        high: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(name, low, high, DistributionKind::Linear)
    }

    pub fn log_linear(
        name: impl Into<String>,
        low: f64,
        high: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(name, low, high, DistributionKind::LogLinear)
    }

    pub fn johnson_bounded(
        name: impl Into<String>,
        low: f64,
        high: f64,
        mode: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(name, low, high, DistributionKind::JohnsonBounded { mode })
    }

    pub fn trapezoid(
        name: impl Into<String>,
        low: f64,
        high: f64,
        m: f64,
        n: f64,
        a: f64,
        b: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(name, low, high, DistributionKind::Trapezoid { m, n, a, b })
    }

    pub fn triangle(
        name: impl Into<String>,
        low: f64,
        high: f64,
        mode: f64,
    ) -> Result<Self, DistributionError> {
        Self::new(name, low, high, DistributionKind::Triangle { mode })
    }

    /// Flag this dimension as log-scaled (transform first, then `10^v`).
    pub fn with_log_scale(mut self) -> Self {
        self.log_scale = true;
        self
    }
}

/// An ordered set of parameter dimensions describing the whole space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    pub params: Vec<ParamSpec>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    pub fn with(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn push(&mut self, spec: ParamSpec) {
        self.params.push(spec);
    }

    pub fn dimension_count(&self) -> usize {
        self.params.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamSpec> {
        self.params.iter()
    }
}
