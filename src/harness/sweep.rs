//! Measurement sweeps that produce raw latency tables
//!
//! - `assoc_sweep`: one row per stride, one column per probe count
//!   (1..=max_ways). Used for associativity and, with the interleaved stride
//!   schedule, for line size.
//! - `level_sweep`: one row per working-set size with the trimmed mean
//!   access latency.

use crate::csv_output::raw_header;
use crate::harness::arena::ProbeArena;
use crate::harness::chase::{shuffled_order, time_chase, trimmed_mean, ChaseCycle};
use crate::result_table::ResultTable;
use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::mem::size_of;

/// Which strides an associativity sweep visits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrideSchedule {
    /// min, 2·min, 4·min, ...
    #[default]
    Doubling,
    /// S, S + S/2 for S = min, 2·min, ... (rows come in pairs)
    Interleaved,
}

impl StrideSchedule {
    /// Strides in ascending order, all `<= max_stride`
    pub fn strides(self, min_stride: usize, max_stride: usize) -> Vec<usize> {
        let mut strides = Vec::new();
        let mut stride = min_stride;

        while stride > 0 && stride <= max_stride {
            match self {
                StrideSchedule::Doubling => strides.push(stride),
                StrideSchedule::Interleaved => {
                    let paired = stride + stride / 2;
                    if paired > max_stride {
                        break;
                    }
                    strides.push(stride);
                    strides.push(paired);
                }
            }
            stride = match stride.checked_mul(2) {
                Some(next) => next,
                None => break,
            };
        }

        strides
    }
}

/// Parameters of an associativity / line-size sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Size of the probe arena in bytes
    pub max_memory: usize,
    /// Largest probe count per row (columns 1..=max_ways)
    pub max_ways: usize,
    pub min_stride: usize,
    pub max_stride: usize,
    /// Dependent loads per timed walk
    pub repeats: u64,
    pub schedule: StrideSchedule,
    /// CPU to pin the measuring thread to
    pub cpu: Option<usize>,
    /// RNG seed for chain permutations (entropy when absent)
    pub seed: Option<u64>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max_memory: 512 * 1024 * 1024,
            max_ways: 30,
            min_stride: 16,
            max_stride: 4 * 1024 * 1024,
            repeats: 10_000_000,
            schedule: StrideSchedule::Doubling,
            cpu: Some(1),
            seed: None,
        }
    }
}

impl SweepConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let word = size_of::<usize>();
        if self.max_ways == 0 {
            anyhow::bail!("max_ways must be >= 1");
        }
        if self.min_stride < word || self.min_stride % word != 0 {
            anyhow::bail!(
                "min_stride must be a positive multiple of {}, got {}",
                word,
                self.min_stride
            );
        }
        if self.schedule == StrideSchedule::Interleaved && self.min_stride % (2 * word) != 0 {
            anyhow::bail!(
                "interleaved schedule needs min_stride to be a multiple of {}, got {}",
                2 * word,
                self.min_stride
            );
        }
        if self.max_stride < self.min_stride {
            anyhow::bail!(
                "max_stride ({}) is smaller than min_stride ({})",
                self.max_stride,
                self.min_stride
            );
        }
        if self.min_stride.saturating_mul(self.max_ways) > self.max_memory {
            anyhow::bail!(
                "max_memory ({}) cannot hold {} probes at stride {}",
                self.max_memory,
                self.max_ways,
                self.min_stride
            );
        }
        Ok(())
    }
}

/// Parameters of a working-set (cache level) sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelSweepConfig {
    pub min_bytes: usize,
    pub max_bytes: usize,
    /// Timed walks per size; the trimmed mean is reported
    pub experiments: usize,
    /// Full laps over the working set before each timed lap
    pub warmup_passes: u64,
    pub cpu: Option<usize>,
    pub seed: Option<u64>,
}

impl Default for LevelSweepConfig {
    fn default() -> Self {
        Self {
            min_bytes: 4 * 1024,
            max_bytes: 8 * 1024 * 1024,
            experiments: 25,
            warmup_passes: 10,
            cpu: Some(1),
            seed: None,
        }
    }
}

impl LevelSweepConfig {
    /// Working-set sizes in bytes: min_bytes doubling up to max_bytes
    pub fn sizes(&self) -> Vec<usize> {
        StrideSchedule::Doubling.strides(self.min_bytes, self.max_bytes)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.min_bytes < size_of::<usize>() {
            anyhow::bail!("min_bytes must hold at least one pointer");
        }
        if self.max_bytes < self.min_bytes {
            anyhow::bail!(
                "max_bytes ({}) is smaller than min_bytes ({})",
                self.max_bytes,
                self.min_bytes
            );
        }
        if self.experiments == 0 {
            anyhow::bail!("experiments must be >= 1");
        }
        Ok(())
    }
}

/// Latency of `spots` probes at every stride of the schedule
///
/// Rows stop at the first stride whose `max_ways` probes no longer fit in
/// the arena. Values are nanoseconds per access.
pub fn assoc_sweep<R: Rng + ?Sized>(
    arena: &mut ProbeArena,
    config: &SweepConfig,
    rng: &mut R,
) -> Result<ResultTable<usize, f32>> {
    config.validate()?;
    let mut table = ResultTable::new().with_header(raw_header(config.max_ways));

    for stride in config.schedule.strides(config.min_stride, config.max_stride) {
        if stride.saturating_mul(config.max_ways) > arena.len() {
            tracing::debug!(stride, "arena exhausted, stopping sweep");
            break;
        }

        let mut row = Vec::with_capacity(config.max_ways);
        for spots in 1..=config.max_ways {
            let ns = time_chase(arena, stride, spots, config.repeats, rng)
                .with_context(|| format!("timing {} spots at stride {}", spots, stride))?;
            row.push(ns as f32);
        }

        tracing::info!(stride, "stride row measured");
        table.append(stride, row);
    }

    Ok(table)
}

/// Trimmed-mean latency of a random full-cycle walk over each working-set size
pub fn level_sweep<R: Rng + ?Sized>(
    arena: &mut ProbeArena,
    config: &LevelSweepConfig,
    rng: &mut R,
) -> Result<ResultTable<usize, f32>> {
    config.validate()?;
    let mut table = ResultTable::new().with_header(vec!["bytes".to_string(), "ns".to_string()]);
    let word = size_of::<usize>();

    for bytes in config.sizes() {
        if bytes > arena.len() {
            tracing::debug!(bytes, "arena exhausted, stopping sweep");
            break;
        }

        let slots = bytes / word;
        let order = shuffled_order(slots, rng);
        let cycle = ChaseCycle::build(arena, word, &order)
            .with_context(|| format!("building chain over {} bytes", bytes))?;

        let lap = slots as u64;
        let samples: Vec<f64> = (0..config.experiments)
            .map(|_| {
                cycle.walk(lap * config.warmup_passes);
                cycle.time(lap)
            })
            .collect();

        let latency = trimmed_mean(&samples).unwrap_or_default();
        tracing::info!(bytes, latency, "working set measured");
        table.append(bytes, vec![latency as f32]);
    }

    Ok(table)
}
