//! Cachescope - infer CPU cache geometry from pointer-chasing latency curves
//!
//! A measurement harness times dependent-load chains over varying strides
//! and working-set sizes. The inference core finds latency jumps in the
//! resulting curves and correlates them across curves into hardware facts:
//! cache level sizes, cache line size and set associativity.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod error;
pub mod harness;
pub mod inference;
pub mod json_output;
pub mod report;
pub mod result_table;
