//! Synthetic U-Pb analyses scattered around a concordia curve.
//!
//! Each analysis is a concordant point at a random age, perturbed by
//! correlated Gaussian noise with the configured relative errors and ρ:
//!
//! ```text
//! e_x = z₁
//! e_y = ρ z₁ + √(1 - ρ²) z₂
//! ```

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::debug;

use crate::config::SampleConfig;
use crate::domain::{DataPoint, DecayConstants, YEARS_PER_MA};
use crate::error::AppError;
use crate::math::CurveVariant;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub points: Vec<DataPoint>,
    /// True age (years) behind each point, same order as `points`.
    pub ages: Vec<f64>,
}

pub fn generate_sample(
    config: &SampleConfig,
    variant: &CurveVariant,
    decay: &DecayConstants,
) -> Result<SampleData, AppError> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0).map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;
    let rho = config.rho;
    let rho_c = (1.0 - rho * rho).max(0.0).sqrt();

    let mut points = Vec::with_capacity(config.count);
    let mut ages = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let t = rng.gen_range(config.age_min_ma..=config.age_max_ma) * YEARS_PER_MA;
        let (x, y) = variant.point(t, decay);
        if !(x.is_finite() && y.is_finite()) {
            return Err(AppError::new(
                4,
                format!("Concordia is not finite at {:.1} Ma.", t / YEARS_PER_MA),
            ));
        }
        let sigma_x = config.rel_sigma_x * x.abs();
        let sigma_y = config.rel_sigma_y * y.abs();

        let z1: f64 = normal.sample(&mut rng);
        let z2: f64 = normal.sample(&mut rng);
        let e_x = z1;
        let e_y = rho * z1 + rho_c * z2;

        points.push(DataPoint::new(x + sigma_x * e_x, y + sigma_y * e_y, sigma_x, sigma_y, rho));
        ages.push(t);
    }

    debug!(count = points.len(), seed = config.seed, "synthetic sample generated");
    Ok(SampleData { points, ages })
}
