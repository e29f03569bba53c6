// Configuration for changepoint detection and cross-curve correlation
//
// One parameter set drives every experiment. Thresholds that used to be
// tuned per experiment (window, jump scale, scan order, tolerances) are all
// fields here.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};

/// Order in which correlation rules visit candidate rows
///
/// Rows are always stored in ascending stride order. The first row that
/// satisfies a rule wins, so on ambiguous tables the direction decides
/// which fact is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanDirection {
    /// From the last row toward the first
    #[default]
    Descending,
    /// From the first row toward the last
    Ascending,
}

impl ScanDirection {
    /// Order the given row indices according to this direction
    pub fn order(self, indices: impl DoubleEndedIterator<Item = usize>) -> Vec<usize> {
        match self {
            ScanDirection::Ascending => indices.collect(),
            ScanDirection::Descending => indices.rev().collect(),
        }
    }
}

/// Configuration for jump detection and hardware-fact inference
///
/// # Example
/// ```
/// use cachescope::inference::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.window_size, 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Width of the before/after windows compared at each position
    pub window_size: usize,

    /// Minimum ratio between the after-mean and before-mean (either way) to
    /// count as a step
    ///
    /// Default: 1.3 (30% latency change)
    pub jump_scale: f64,

    /// Noise gate: the before-window standard deviation must stay below
    /// `data[0] * std_dev_scale`
    ///
    /// Assumes each curve starts on a stable plateau.
    pub std_dev_scale: f64,

    /// Candidates closer than this (in index units) collapse into one jump
    pub min_separation: usize,

    /// Row visiting order for the correlation rules
    pub scan_direction: ScanDirection,

    /// Tolerance for "twice the associativity" and "same associativity"
    /// checks across adjacent stride rows
    ///
    /// Default: 0.26
    pub doubling_tolerance: f64,

    /// Tolerance for comparing the first jumps of a stride pair (S, S + S/2)
    ///
    /// Default: 0.4
    pub line_size_tolerance: f64,

    /// Ratio between first jumps of the next stride pair that marks the
    /// line boundary
    ///
    /// Default: 1.7
    pub line_size_jump_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 2,
            jump_scale: 1.3,
            std_dev_scale: 0.2,
            min_separation: 2,
            scan_direction: ScanDirection::Descending,
            doubling_tolerance: 0.26,
            line_size_tolerance: 0.4,
            line_size_jump_ratio: 1.7,
        }
    }
}

impl AnalysisConfig {
    /// Stricter detection: wider windows, bigger steps, quieter plateaus
    ///
    /// Use on long sweeps where spurious single-sample spikes are common.
    pub fn strict() -> Self {
        Self {
            window_size: 4,
            jump_scale: 1.5,
            std_dev_scale: 0.1,
            min_separation: 4,
            ..Self::default()
        }
    }

    /// Looser detection: catches smaller steps on short or noisy sweeps
    pub fn permissive() -> Self {
        Self {
            window_size: 2,
            jump_scale: 1.15,
            std_dev_scale: 0.5,
            min_separation: 2,
            doubling_tolerance: 0.4,
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(AnalysisError::InvalidInput(
                "window_size must be >= 1".to_string(),
            ));
        }

        if self.jump_scale.is_nan() || self.jump_scale < 1.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "jump_scale must be >= 1.0, got {}",
                self.jump_scale
            )));
        }

        if self.std_dev_scale.is_nan() || self.std_dev_scale < 0.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "std_dev_scale must be non-negative, got {}",
                self.std_dev_scale
            )));
        }

        for (name, value) in [
            ("doubling_tolerance", self.doubling_tolerance),
            ("line_size_tolerance", self.line_size_tolerance),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(AnalysisError::InvalidInput(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        if self.line_size_jump_ratio.is_nan() || self.line_size_jump_ratio <= 1.0 {
            return Err(AnalysisError::InvalidInput(format!(
                "line_size_jump_ratio must be > 1.0, got {}",
                self.line_size_jump_ratio
            )));
        }

        Ok(())
    }
}
