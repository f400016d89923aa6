//! Engine configuration.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration. CLI flags are applied on top of whatever was loaded.
//!
//! ```toml
//! curve = "tera-wasserburg"
//! refinement_depth = 6
//!
//! [sample]
//! count = 40
//! seed = 7
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{
    CurveKind, DecayConstants, DecayUncertainty, DEFAULT_LAMBDA_235, DEFAULT_LAMBDA_238, DEFAULT_R238_235S,
    DEFAULT_REFINEMENT_DEPTH,
};
use crate::error::AppError;
use crate::math::CurveVariant;

/// Curve, envelope and ellipse settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub curve: CurveKind,
    /// λ²³⁵U (yr⁻¹).
    pub lambda235: f64,
    /// λ²³⁸U (yr⁻¹).
    pub lambda238: f64,
    pub r238_235s: f64,
    /// One-sigma uncertainty of λ²³⁵U. Zero draws a zero-width envelope.
    pub sigma_lambda235: f64,
    /// One-sigma uncertainty of λ²³⁸U.
    pub sigma_lambda238: f64,
    pub refinement_depth: usize,
    /// Ellipse uncertainty multiplier (1 or 2 sigma).
    pub multiplier: f64,
    /// Approximate number of age ticks; 0 disables them.
    pub ticks: usize,
    pub sample: SampleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            curve: CurveKind::Wetherill,
            lambda235: DEFAULT_LAMBDA_235,
            lambda238: DEFAULT_LAMBDA_238,
            r238_235s: DEFAULT_R238_235S,
            sigma_lambda235: 0.0,
            sigma_lambda238: 0.0,
            refinement_depth: DEFAULT_REFINEMENT_DEPTH,
            multiplier: 1.0,
            ticks: 8,
            sample: SampleConfig::default(),
        }
    }
}

/// Synthetic analyses for `concordia sample`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SampleConfig {
    pub count: usize,
    pub seed: u64,
    pub age_min_ma: f64,
    pub age_max_ma: f64,
    /// One-sigma error as a fraction of x.
    pub rel_sigma_x: f64,
    /// One-sigma error as a fraction of y.
    pub rel_sigma_y: f64,
    /// Error correlation of every analysis.
    pub rho: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            count: 25,
            seed: 42,
            age_min_ma: 300.0,
            age_max_ma: 2500.0,
            rel_sigma_x: 0.01,
            rel_sigma_y: 0.008,
            rho: 0.8,
        }
    }
}

impl EngineConfig {
    /// Read and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read config {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
            .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        let config: Self = toml::from_str(text).map_err(|e| AppError::new(2, format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, AppError> {
        toml::to_string_pretty(self).map_err(|e| AppError::new(4, format!("Failed to serialize config: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let non_negative = |name: &str, v: f64| {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(AppError::new(2, format!("{name} must be finite and >= 0 (got {v}).")))
            }
        };
        non_negative("lambda235", self.lambda235)?;
        non_negative("lambda238", self.lambda238)?;
        non_negative("sigma_lambda235", self.sigma_lambda235)?;
        non_negative("sigma_lambda238", self.sigma_lambda238)?;
        non_negative("multiplier", self.multiplier)?;
        if !(self.r238_235s.is_finite() && self.r238_235s > 0.0) {
            return Err(AppError::new(2, format!("r238_235s must be > 0 (got {}).", self.r238_235s)));
        }
        self.sample.validate()
    }

    pub fn decay_constants(&self) -> DecayConstants {
        DecayConstants::new(self.lambda235, self.lambda238)
    }

    pub fn decay_uncertainty(&self) -> DecayUncertainty {
        DecayUncertainty {
            sigma_lambda1: self.sigma_lambda235,
            sigma_lambda2: self.sigma_lambda238,
        }
    }

    pub fn variant(&self) -> CurveVariant {
        CurveVariant::from_kind(self.curve, self.r238_235s)
    }
}

impl SampleConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.count == 0 {
            return Err(AppError::new(2, "Sample count must be > 0."));
        }
        if !(self.age_min_ma.is_finite()
            && self.age_max_ma.is_finite()
            && self.age_min_ma >= 0.0
            && self.age_max_ma > self.age_min_ma)
        {
            return Err(AppError::new(2, "Invalid sample age range."));
        }
        if !(self.rel_sigma_x.is_finite() && self.rel_sigma_y.is_finite())
            || self.rel_sigma_x < 0.0
            || self.rel_sigma_y < 0.0
        {
            return Err(AppError::new(2, "Relative sample errors must be finite and >= 0."));
        }
        if !(-1.0..=1.0).contains(&self.rho) {
            return Err(AppError::new(2, format!("Sample rho must be in [-1, 1] (got {}).", self.rho)));
        }
        Ok(())
    }
}
