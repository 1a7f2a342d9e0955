//! Shared calibration pipeline used by the `fit` and `demo` subcommands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! add sources -> joint fit -> scale/refit passes -> residuals
//!
//! The subcommand handlers then focus on presentation (printing vs exports).

use crate::domain::{CalibrationPoint, ModelKind};
use crate::error::CalError;
use crate::graph::CalibrationGraphSet;

/// One labeled source handed to the pipeline.
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub label: String,
    pub points: Vec<CalibrationPoint>,
}

/// All computed outputs of one calibration run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub set: CalibrationGraphSet,
    /// Scale factors per pass, in pass order (empty when scaling is disabled).
    pub scale_history: Vec<Vec<f64>>,
}

/// Execute the full aggregation pipeline.
///
/// The first source is the reference. Each scale pass aligns the other
/// sources onto the current joint fit and refits; passes stop early once all
/// factors are unity within 1e-9. Residuals are left valid against the final
/// fit.
pub fn run_calibration(
    sources: Vec<SourceInput>,
    model: ModelKind,
    scale_passes: usize,
) -> Result<RunOutput, CalError> {
    if sources.is_empty() {
        return Err(CalError::InvalidInput("no sources given".to_string()));
    }

    let mut set = CalibrationGraphSet::new();
    for source in &sources {
        set.add(&source.points, &source.label)?;
    }

    set.fit(model)?;

    let mut scale_history = Vec::new();
    for _ in 0..scale_passes {
        let factors = set.scale()?;
        set.fit(model)?;
        let converged = factors.iter().all(|s| (s - 1.0).abs() < 1e-9);
        scale_history.push(factors);
        if converged {
            break;
        }
    }

    set.set_residual(false)?;
    Ok(RunOutput { set, scale_history })
}
