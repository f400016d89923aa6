use thiserror::Error;

/// Failure raised by the CLI layer: a message plus the process exit code.
///
/// Exit codes:
/// - `2`: invalid configuration or arguments
/// - `4`: geometry or output failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<GeometryError> for AppError {
    fn from(err: GeometryError) -> Self {
        AppError::new(4, err.to_string())
    }
}

/// Local failures of the geometry engine.
///
/// None of these is fatal: each one is scoped to a single curve, a single
/// envelope sample, or a single data point, and callers skip the affected
/// item while continuing with the rest.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The visible window maps to no usable range of ages.
    #[error("invalid curve domain: {0}")]
    InvalidDomain(String),

    /// Endpoint tangents are parallel, so they have no unique intersection.
    #[error("singular tangent: slopes {m1} and {m2} do not intersect")]
    SingularTangent { m1: f64, m2: f64 },

    /// A data point's (σx, σy, ρ) does not describe a covariance matrix.
    #[error("invalid covariance: {0}")]
    InvalidCovariance(String),

    /// The propagated envelope offset is NaN or infinite at this age.
    #[error("no uncertainty envelope at t = {t}")]
    NonFiniteEnvelope { t: f64 },
}
