// Cache-geometry inference from latency curves
//
// Pipeline: raw latency table -> changepoint detection per row -> jump
// table -> cross-curve correlation -> hardware facts.
//
// Everything in this module is a pure, deterministic function of its
// inputs. Measurement (timing loops, memory mapping, CPU pinning) lives in
// crate::harness and file I/O in crate::csv_output.

mod changepoint;
mod config;
mod correlate;
mod fact;
mod similarity;

pub use changepoint::{filter_and_select_best_jumps, jump_indices, ChangepointDetector, JumpCandidate};
pub use config::{AnalysisConfig, ScanDirection};
pub use correlate::{
    analyze_cache_levels, analyze_jumps_for_assoc, analyze_jumps_for_line_size,
    detect_jump_table,
};
pub use fact::{FactKind, HardwareFact};
pub use similarity::{similar, DEFAULT_TOLERANCE};
