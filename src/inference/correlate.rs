// Cross-curve correlation: jump tables -> hardware facts
//
// Each rule looks for a fixed pattern of jump positions across adjacent
// stride rows. Only the first matching row per search is reported, so the
// visiting order is part of the rule (see ScanDirection).

use crate::error::{AnalysisError, Result};
use crate::inference::changepoint::ChangepointDetector;
use crate::inference::config::AnalysisConfig;
use crate::inference::fact::HardwareFact;
use crate::inference::similarity::similar;
use crate::result_table::ResultTable;

/// Run the detector on every row of a raw latency table
///
/// A row the detector rejects (too short for the window) is logged and left
/// out; the remaining rows keep their sweep order.
pub fn detect_jump_table(
    raw: &ResultTable<usize, f32>,
    detector: &ChangepointDetector,
) -> ResultTable<usize, usize> {
    raw.map_rows(|row| match detector.jump_indices(&row.values) {
        Ok(indices) => {
            tracing::debug!(key = row.key, jumps = ?indices, "row analyzed");
            Some(indices)
        }
        Err(e) => {
            tracing::warn!("Skipping row {}: {}", row.key, e);
            None
        }
    })
}

/// Infer associativity from a jump table keyed by ascending stride
///
/// Candidate way counts A are the jumps of the last row. For each A, rows
/// `i` are visited in `config.scan_direction` and the first one where
///
/// 1. no jump in row `i` equals A,
/// 2. some jump in row `i` is similar to 2·A, and
/// 3. some jump in row `i + 1` is similar to A
///
/// yields `Associativity { ways: A, entity_stride: key(i + 1) }`.
///
/// # Example
/// ```
/// use cachescope::inference::{analyze_jumps_for_assoc, AnalysisConfig};
/// use cachescope::result_table::ResultTable;
///
/// let mut jumps = ResultTable::new();
/// jumps.append(1024, vec![16]);
/// jumps.append(2048, vec![8, 16]);
///
/// let facts = analyze_jumps_for_assoc(&jumps, &AnalysisConfig::default());
/// assert_eq!(facts[0].to_string(), "Associativity=8, entityStride=2048, entitySize=16384");
/// ```
pub fn analyze_jumps_for_assoc(
    jumps: &ResultTable<usize, usize>,
    config: &AnalysisConfig,
) -> Vec<HardwareFact> {
    let rows = jumps.rows();
    let Some(last) = rows.last() else {
        return Vec::new();
    };
    if rows.len() < 2 {
        return Vec::new();
    }

    let tolerance = config.doubling_tolerance;
    let order = config.scan_direction.order(0..rows.len() - 1);
    let mut facts = Vec::new();

    for &ways in &last.values {
        let a = ways as f64;

        let matched = order.iter().copied().find(|&i| {
            let row = &rows[i].values;
            let adjacent = &rows[i + 1].values;

            !row.contains(&ways)
                && row.iter().any(|&j| similar(j as f64, 2.0 * a, tolerance))
                && adjacent.iter().any(|&j| similar(j as f64, a, tolerance))
        });

        if let Some(i) = matched {
            let entity_stride = rows[i + 1].key;
            let fact = HardwareFact::Associativity {
                ways,
                entity_stride,
                entity_size: ways * entity_stride,
                row: i,
            };
            tracing::info!(row = i, "{}", fact);
            facts.push(fact);
        } else {
            tracing::debug!(ways, "no row supports candidate associativity");
        }
    }

    facts
}

/// Infer the cache line size from an interleaved stride table
///
/// Rows alternate between a stride S and S + S/2 for successive doublings
/// of S. Pair starts `i = 0, 2, 4, ...` are visited in ascending order; the
/// first `i` where the first jumps of rows `i` and `i + 1` are similar and
/// the first jump of row `i + 3` exceeds that of row `i + 2` by more than
/// `config.line_size_jump_ratio` gives the line size `key(i)`.
pub fn analyze_jumps_for_line_size(
    jumps: &ResultTable<usize, usize>,
    config: &AnalysisConfig,
) -> Option<HardwareFact> {
    let rows = jumps.rows();
    if rows.len() < 4 {
        return None;
    }

    let first = |i: usize| rows[i].values.first().map(|&j| j as f64);

    for i in (0..rows.len() - 3).step_by(2) {
        let (Some(pure), Some(paired), Some(next_pure), Some(next_paired)) =
            (first(i), first(i + 1), first(i + 2), first(i + 3))
        else {
            tracing::debug!(row = i, "stride pair without jumps");
            continue;
        };

        let pair_agrees = similar(pure, paired, config.line_size_tolerance);
        let next_pair_diverges =
            next_pure > 0.0 && next_paired / next_pure > config.line_size_jump_ratio;

        if pair_agrees && next_pair_diverges {
            let fact = HardwareFact::CacheLineSize {
                bytes: rows[i].key,
                row: i,
            };
            tracing::info!(row = i, "{}", fact);
            return Some(fact);
        }
    }

    None
}

/// Infer cache level capacities from a working-set latency table
///
/// `levels` is keyed by working-set bytes (ascending) and carries the mean
/// access latency in its first column. Each latency step at row `j` reports
/// the size of row `j - 1`, the largest working set that still fit.
///
/// # Errors
/// `InvalidInput` if a row has no latency value or the table is shorter than
/// two detector windows.
pub fn analyze_cache_levels(
    levels: &ResultTable<usize, f32>,
    detector: &ChangepointDetector,
) -> Result<Vec<HardwareFact>> {
    let series = levels
        .rows()
        .iter()
        .map(|row| {
            row.values.first().copied().ok_or_else(|| {
                AnalysisError::InvalidInput(format!("working-set row {} has no latency", row.key))
            })
        })
        .collect::<Result<Vec<f32>>>()?;

    let facts = detector
        .jump_indices(&series)?
        .into_iter()
        .filter(|&j| j > 0)
        .map(|j| HardwareFact::CacheLevelSize {
            bytes: levels.rows()[j - 1].key,
            jump_index: j,
        })
        .collect::<Vec<_>>();

    for fact in &facts {
        tracing::info!("{}", fact);
    }

    Ok(facts)
}
