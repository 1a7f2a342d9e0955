//! Deterministic synthetic source generation.
//!
//! Generates several sources measuring the same underlying quadratic response
//! `y = a0 + a1·x + a2·x²`, where every source after the first carries its own
//! gain skew (mimicking runs taken under different detector conditions) plus
//! Gaussian noise. Seeded, so the same configuration always produces the same
//! sources.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::CalibrationPoint;
use crate::error::CalError;

/// Configuration for the synthetic sample generator.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// Number of sources; the first is the unskewed reference.
    pub sources: usize,
    /// Points per source.
    pub points_per_source: usize,
    pub seed: u64,
    /// Underlying response `y = a0 + a1·x + a2·x²`.
    pub truth: [f64; 3],
    /// Half-width of the uniform per-source gain skew around 1.0.
    pub gain_spread: f64,
    /// Absolute y noise (std dev); also used as the reported y-error.
    pub noise: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            sources: 3,
            points_per_source: 12,
            seed: 42,
            truth: [2.5, 1.2, 1.5e-4],
            gain_spread: 0.05,
            noise: 0.5,
            x_min: 50.0,
            x_max: 4000.0,
        }
    }
}

/// One generated source: label, true gain skew, points.
#[derive(Debug, Clone)]
pub struct SampleSource {
    pub label: String,
    /// The gain factor baked into this source's y values (1.0 for the reference).
    pub gain: f64,
    pub points: Vec<CalibrationPoint>,
}

/// Generate sources per the configuration.
pub fn generate_sources(config: &SampleConfig) -> Result<Vec<SampleSource>, CalError> {
    if config.sources == 0 {
        return Err(CalError::InvalidInput("sample needs at least one source".to_string()));
    }
    if config.points_per_source < 2 {
        return Err(CalError::InvalidInput(
            "sample needs at least two points per source".to_string(),
        ));
    }
    if !(config.x_min.is_finite() && config.x_max.is_finite() && config.x_max > config.x_min) {
        return Err(CalError::InvalidInput("invalid x range for sample generation".to_string()));
    }
    if !(config.gain_spread.is_finite() && config.gain_spread >= 0.0 && config.gain_spread < 1.0) {
        return Err(CalError::InvalidInput("gain spread must be in [0, 1)".to_string()));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(CalError::InvalidInput("noise must be non-negative".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| CalError::InvalidInput(format!("noise distribution error: {e}")))?;
    let [a0, a1, a2] = config.truth;
    let truth = |x: f64| a0 + a1 * x + a2 * x * x;

    let mut out = Vec::with_capacity(config.sources);
    for s in 0..config.sources {
        let gain = if s == 0 {
            1.0
        } else {
            1.0 + rng.gen_range(-config.gain_spread..=config.gain_spread)
        };

        let n = config.points_per_source;
        let mut points = Vec::with_capacity(n);
        for i in 0..n {
            // Evenly spaced positions with a small jitter so sources do not
            // share identical x values.
            let u = i as f64 / (n as f64 - 1.0);
            let jitter = rng.gen_range(-0.01..=0.01) * (config.x_max - config.x_min);
            let x = (config.x_min + u * (config.x_max - config.x_min) + jitter)
                .clamp(config.x_min, config.x_max);
            let y = gain * truth(x) + config.noise * normal.sample(&mut rng);
            let y_err = config.noise.max(1e-3);
            points.push(CalibrationPoint::new(x, y, 0.1, y_err));
        }

        let label = if s == 0 {
            "reference".to_string()
        } else {
            format!("run-{s}")
        };
        out.push(SampleSource { label, gain, points });
    }

    Ok(out)
}
