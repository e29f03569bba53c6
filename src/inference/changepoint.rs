// Changepoint detection on a single latency curve
//
// A boundary in the swept hardware parameter shows up as a step from one
// roughly flat latency plateau to another. Detection slides two adjacent
// windows over the curve and flags positions where the window means differ
// by more than `jump_scale` while the window before the position is quiet.
// Nearby flags are then collapsed to the strongest one in each cluster.
//
// Window statistics use trueno::Vector (population standard deviation).

use crate::error::{AnalysisError, Result};
use crate::inference::config::AnalysisConfig;
use trueno::Vector;

/// A position where the before/after window means differ significantly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpCandidate {
    /// Position in the series (first sample of the after-window)
    pub index: usize,
    /// |mean_after - mean_before|
    pub magnitude: f32,
}

/// Sliding-window step detector
///
/// The noise gate compares the before-window standard deviation against
/// `data[0] * std_dev_scale`. This assumes the curve starts in a stable,
/// low-noise regime; a curve that starts mid-transition gets a distorted
/// gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangepointDetector {
    pub window_size: usize,
    pub jump_scale: f64,
    pub std_dev_scale: f64,
    pub min_separation: usize,
}

impl ChangepointDetector {
    pub fn new(
        window_size: usize,
        jump_scale: f64,
        std_dev_scale: f64,
        min_separation: usize,
    ) -> Self {
        Self {
            window_size,
            jump_scale,
            std_dev_scale,
            min_separation,
        }
    }

    /// Build a detector from the detection fields of an analysis config
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.window_size,
            config.jump_scale,
            config.std_dev_scale,
            config.min_separation,
        )
    }

    /// Indices of the representative jump of every cluster, strictly increasing
    ///
    /// # Errors
    /// `AnalysisError::InvalidInput` if `window_size` is zero or the series
    /// is shorter than two windows.
    ///
    /// # Example
    /// ```
    /// use cachescope::inference::ChangepointDetector;
    ///
    /// let mut data = vec![10.0_f32; 20];
    /// data.extend(vec![50.0_f32; 20]);
    ///
    /// let detector = ChangepointDetector::new(5, 1.3, 1.0, 5);
    /// assert_eq!(detector.jump_indices(&data).unwrap(), vec![20]);
    /// ```
    pub fn jump_indices(&self, data: &[f32]) -> Result<Vec<usize>> {
        let candidates = self.detect_candidates(data)?;
        let jumps = filter_and_select_best_jumps(&candidates, self.min_separation);

        tracing::debug!(
            len = data.len(),
            candidates = candidates.len(),
            jumps = jumps.len(),
            "jump detection finished"
        );

        Ok(jumps.into_iter().map(|jump| jump.index).collect())
    }

    /// Step A: every position whose window means differ by more than `jump_scale`
    ///
    /// Candidates come out in ascending index order.
    pub fn detect_candidates(&self, data: &[f32]) -> Result<Vec<JumpCandidate>> {
        let w = self.window_size;
        if w == 0 {
            return Err(AnalysisError::InvalidInput(
                "window_size must be >= 1".to_string(),
            ));
        }
        if w > data.len() / 2 {
            return Err(AnalysisError::InvalidInput(format!(
                "series of length {} is shorter than two windows of {}",
                data.len(),
                w
            )));
        }

        let noise_limit = data[0] as f64 * self.std_dev_scale;
        let mut candidates = Vec::new();

        for i in w..data.len() - w {
            let before = Vector::from_slice(&data[i - w..i]);
            let after = Vector::from_slice(&data[i..i + w]);

            let mean_before = before.mean().unwrap_or(0.0);
            let std_dev_before = before.stddev().unwrap_or(0.0);
            let mean_after = after.mean().unwrap_or(0.0);

            let ratio = mean_after.max(mean_before) as f64 / mean_after.min(mean_before) as f64;

            if (std_dev_before as f64) < noise_limit && ratio > self.jump_scale {
                candidates.push(JumpCandidate {
                    index: i,
                    magnitude: (mean_after - mean_before).abs(),
                });
            }
        }

        Ok(candidates)
    }
}

impl Default for ChangepointDetector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Step B: collapse candidates into one jump per cluster
///
/// `candidates` must be sorted by index. A candidate joins the current group
/// while its distance to the group's best is at most `min_separation`; the
/// group keeps whichever of the two has the larger magnitude (ties keep the
/// earlier one).
pub fn filter_and_select_best_jumps(
    candidates: &[JumpCandidate],
    min_separation: usize,
) -> Vec<JumpCandidate> {
    let Some((first, rest)) = candidates.split_first() else {
        return Vec::new();
    };

    let mut final_jumps = Vec::new();
    let mut best_in_group = *first;

    for candidate in rest {
        if candidate.index - best_in_group.index <= min_separation {
            if candidate.magnitude > best_in_group.magnitude {
                best_in_group = *candidate;
            }
        } else {
            final_jumps.push(best_in_group);
            best_in_group = *candidate;
        }
    }

    final_jumps.push(best_in_group);
    final_jumps
}

/// Convenience wrapper: detect and cluster in one call
pub fn jump_indices(
    data: &[f32],
    window_size: usize,
    jump_scale: f64,
    std_dev_scale: f64,
    min_separation: usize,
) -> Result<Vec<usize>> {
    ChangepointDetector::new(window_size, jump_scale, std_dev_scale, min_separation)
        .jump_indices(data)
}
