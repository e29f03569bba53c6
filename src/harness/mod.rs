// Measurement harness: pointer-chasing sweeps that feed the inference core
//
// The harness owns every OS-facing concern (memory mapping, CPU pinning,
// wall-clock timing). Its only output is a raw latency ResultTable; the
// inference core never calls back into it.

mod affinity;
mod arena;
mod chase;
mod sweep;

pub use affinity::{pin_to_cpu, try_pin};
pub use arena::ProbeArena;
pub use chase::{shuffled_order, time_chase, trimmed_mean, ChaseCycle};
pub use sweep::{assoc_sweep, level_sweep, LevelSweepConfig, StrideSchedule, SweepConfig};
