use thiserror::Error;

/// Main error type for the qs sampling engine
#[derive(Error, Debug)]
pub enum QsError {
    #[error("Design error: {0}")]
    Design(#[from] DesignError),

    #[error("Distribution error: {0}")]
    Distribution(#[from] DistributionError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while constructing a sampling design
#[derive(Error, Debug)]
pub enum DesignError {
    #[error("digital sequence supports at most {supported} dimensions, {requested} requested")]
    DimensionLimit { requested: usize, supported: usize },
}

/// Errors raised while validating or compiling distribution transforms
#[derive(Error, Debug)]
pub enum DistributionError {
    #[error("invalid range for parameter {name}: low {low} > high {high}")]
    InvalidRange { name: String, low: f64, high: f64 },

    #[error("log-linear parameter {name} requires strictly positive bounds (low = {low}, high = {high})")]
    NonPositiveLogBounds { name: String, low: f64, high: f64 },

    #[error("mode {mode} outside [0, 1] for parameter {name}")]
    ModeOutOfRange { name: String, mode: f64 },

    #[error("trapezoid modes for parameter {name} must satisfy 0 <= m <= n <= 1 (m = {m}, n = {n})")]
    InvalidModes { name: String, m: f64, n: f64 },

    #[error("trapezoid shape factors for parameter {name} must be positive (a = {a}, b = {b})")]
    InvalidShapeFactors { name: String, a: f64, b: f64 },

    #[error("shape search for parameter {name} did not reach peak density {threshold} within {steps} steps")]
    ShapeSearchExhausted {
        name: String,
        threshold: f64,
        steps: usize,
    },

    #[error("copula correlation must lie in [-1, 1], got {value}")]
    InvalidCorrelation { value: f64 },

    #[error("Frank copula requires a non-zero theta")]
    ZeroTheta,
}

/// Errors raised by the concurrent evaluation engine
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("result channel disconnected after {received} of {expected} results")]
    ResultsLost { expected: usize, received: usize },

    #[error("transform set has {transforms} dimensions but design has {design}")]
    DimensionMismatch { transforms: usize, design: usize },
}

/// Result type alias for qs operations
pub type QsResult<T> = Result<T, QsError>;
