//! Pointer-chasing timing loops
//!
//! Each probe slot stores the address of the next slot, so every load
//! depends on the previous one and the hardware can neither prefetch nor
//! overlap the accesses. Slots are linked in a random order to defeat
//! stride prefetchers.

use crate::harness::arena::ProbeArena;
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::hint::black_box;
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::time::Instant;

/// A closed pointer chain laid out in a probe arena
///
/// Holds the arena mutably borrowed so the chain cannot be overwritten or
/// unmapped while it is being walked.
pub struct ChaseCycle<'a> {
    start: *const usize,
    slots: usize,
    _arena: PhantomData<&'a mut ProbeArena>,
}

impl<'a> ChaseCycle<'a> {
    /// Link slots `order[0] -> order[1] -> ... -> order[0]`, slot `k` living at
    /// byte offset `k * stride`
    ///
    /// # Errors
    /// Fails if `order` is empty, the stride cannot hold an aligned pointer,
    /// or a slot falls outside the arena.
    pub fn build(arena: &'a mut ProbeArena, stride: usize, order: &[usize]) -> Result<Self> {
        if order.is_empty() {
            anyhow::bail!("pointer chain needs at least one slot");
        }
        if stride < size_of::<usize>() || stride % align_of::<usize>() != 0 {
            anyhow::bail!(
                "stride {} cannot hold an aligned {}-byte pointer",
                stride,
                size_of::<usize>()
            );
        }
        let highest = order.iter().copied().max().unwrap_or_default();
        let needed = highest
            .checked_mul(stride)
            .and_then(|offset| offset.checked_add(size_of::<usize>()))
            .unwrap_or(usize::MAX);
        if needed > arena.len() {
            anyhow::bail!(
                "slot {} at stride {} needs {} bytes, arena has {}",
                highest,
                stride,
                needed,
                arena.len()
            );
        }

        let base = arena.as_ptr() as usize;
        let memory = arena.as_mut_slice();
        for (k, &slot) in order.iter().enumerate() {
            let next = order[(k + 1) % order.len()];
            let offset = slot * stride;
            let target = base + next * stride;
            memory[offset..offset + size_of::<usize>()].copy_from_slice(&target.to_ne_bytes());
        }

        Ok(Self {
            start: (base + order[0] * stride) as *const usize,
            slots: order.len(),
            _arena: PhantomData,
        })
    }

    /// Number of slots in the chain
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// Follow the chain for `steps` loads; returns the final slot address
    pub fn walk(&self, steps: u64) -> usize {
        let mut current = self.start;
        for _ in 0..steps {
            // SAFETY: `build` stored in every slot the address of another
            // aligned slot inside the arena, and the arena stays mutably
            // borrowed (so mapped and unmodified) for the lifetime of self.
            current = unsafe { std::ptr::read_volatile(current) } as *const usize;
        }
        black_box(current as usize)
    }

    /// Average nanoseconds per dependent load over `steps` loads
    pub fn time(&self, steps: u64) -> f64 {
        let steps = steps.max(1);
        let start = Instant::now();
        black_box(self.walk(steps));
        start.elapsed().as_nanos() as f64 / steps as f64
    }
}

/// Random visiting order over `slots` slots
pub fn shuffled_order<R: Rng + ?Sized>(slots: usize, rng: &mut R) -> Vec<usize> {
    let mut order: Vec<usize> = (0..slots).collect();
    order.shuffle(rng);
    order
}

/// Time `spots` addresses `stride` bytes apart: one warm-up walk, then one
/// timed walk of `repeats` loads
pub fn time_chase<R: Rng + ?Sized>(
    arena: &mut ProbeArena,
    stride: usize,
    spots: usize,
    repeats: u64,
    rng: &mut R,
) -> Result<f64> {
    let order = shuffled_order(spots, rng);
    let cycle = ChaseCycle::build(arena, stride, &order)?;
    cycle.walk(repeats);
    Ok(cycle.time(repeats))
}

/// Sort, drop the lowest and highest 20% of samples, average the rest
///
/// Returns `None` for an empty sample set.
pub fn trimmed_mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let drop = sorted.len() / 5;
    let kept: Vec<f32> = sorted[drop..sorted.len() - drop]
        .iter()
        .map(|&s| s as f32)
        .collect();

    trueno::Vector::from_slice(&kept).mean().ok().map(f64::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_cycle_visits_every_slot() {
        let mut arena = ProbeArena::new(4096).unwrap();
        let order = vec![3, 0, 2, 1];
        let cycle = ChaseCycle::build(&mut arena, 64, &order).unwrap();
        let start = cycle.walk(0);
        assert_eq!(cycle.slots(), 4);

        // a full lap returns to the start, a partial lap does not
        assert_eq!(cycle.walk(4), start);
        assert_ne!(cycle.walk(3), start);
        assert_eq!(cycle.walk(8), start);
    }

    #[test]
    fn test_single_slot_points_to_itself() {
        let mut arena = ProbeArena::new(4096).unwrap();
        let cycle = ChaseCycle::build(&mut arena, 16, &[0]).unwrap();
        assert_eq!(cycle.walk(1), cycle.walk(0));
    }

    #[test]
    fn test_build_rejects_bad_layouts() {
        let mut arena = ProbeArena::new(4096).unwrap();
        assert!(ChaseCycle::build(&mut arena, 64, &[]).is_err());
        assert!(ChaseCycle::build(&mut arena, 4, &[0, 1]).is_err());
        assert!(ChaseCycle::build(&mut arena, 12, &[0, 1]).is_err());
        assert!(ChaseCycle::build(&mut arena, 1024, &[0, 4]).is_err());
    }

    #[test]
    fn test_time_chase_positive() {
        let mut arena = ProbeArena::new(1 << 16).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let ns = time_chase(&mut arena, 64, 8, 10_000, &mut rng).unwrap();
        assert!(ns.is_finite());
        assert!(ns >= 0.0);
    }

    #[test]
    fn test_shuffled_order_is_permutation() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut order = shuffled_order(32, &mut rng);
        order.sort_unstable();
        assert_eq!(order, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn test_trimmed_mean_drops_outliers() {
        let samples = [1.0, 10.0, 10.0, 10.0, 500.0];
        assert!((trimmed_mean(&samples).unwrap() - 10.0).abs() < 1e-6);
        assert!(trimmed_mean(&[]).is_none());
        assert!((trimmed_mean(&[3.0]).unwrap() - 3.0).abs() < 1e-6);
    }
}
