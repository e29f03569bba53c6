//! CPU pinning for measurement runs
//!
//! Migrating between cores mid-sweep swaps the cache hierarchy under the
//! pointer chain, so sweeps pin the calling thread first.

use anyhow::Result;

/// Pin the calling thread to `cpu`
#[cfg(target_os = "linux")]
pub fn pin_to_cpu(cpu: usize) -> Result<()> {
    use anyhow::Context;
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let mut set = CpuSet::new();
    set.set(cpu)
        .with_context(|| format!("CPU {} is out of range", cpu))?;
    sched_setaffinity(Pid::from_raw(0), &set)
        .with_context(|| format!("Could not set CPU affinity to {}", cpu))?;

    tracing::debug!(cpu, "thread pinned");
    Ok(())
}

/// Pin the calling thread to `cpu` (unsupported here: logs and continues)
#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu(cpu: usize) -> Result<()> {
    tracing::warn!(cpu, "CPU pinning is only supported on Linux");
    Ok(())
}

/// Pin if requested; a failure is logged and the run continues unpinned
pub fn try_pin(cpu: Option<usize>) {
    if let Some(cpu) = cpu {
        if let Err(e) = pin_to_cpu(cpu) {
            tracing::warn!("{:#}", e);
        }
    }
}
