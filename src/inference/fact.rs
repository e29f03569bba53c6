//! Hardware facts inferred from jump tables

use serde::Serialize;
use std::fmt;

/// Which cache parameter a fact describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FactKind {
    CacheLevelSize,
    CacheLineSize,
    Associativity,
}

/// A cache parameter inferred from latency curves, with the evidence used
///
/// Facts are advisory: they come from a heuristic detector and are never
/// checked against the real hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HardwareFact {
    /// Capacity of one cache level: the last working-set size before a latency step
    CacheLevelSize {
        bytes: usize,
        /// Row index of the latency step in the working-set table
        jump_index: usize,
    },

    /// Cache line size in bytes
    CacheLineSize {
        bytes: usize,
        /// First row of the four-row window that matched
        row: usize,
    },

    /// Set associativity of the entity probed at `entity_stride`
    Associativity {
        ways: usize,
        entity_stride: usize,
        entity_size: usize,
        /// Row whose jumps sit at twice the way count
        row: usize,
    },
}

impl HardwareFact {
    pub fn kind(&self) -> FactKind {
        match self {
            HardwareFact::CacheLevelSize { .. } => FactKind::CacheLevelSize,
            HardwareFact::CacheLineSize { .. } => FactKind::CacheLineSize,
            HardwareFact::Associativity { .. } => FactKind::Associativity,
        }
    }

    /// Headline number: bytes for sizes, way count for associativity
    pub fn value(&self) -> usize {
        match *self {
            HardwareFact::CacheLevelSize { bytes, .. } => bytes,
            HardwareFact::CacheLineSize { bytes, .. } => bytes,
            HardwareFact::Associativity { ways, .. } => ways,
        }
    }
}

impl fmt::Display for HardwareFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardwareFact::CacheLevelSize { bytes, .. } => write!(f, "CacheLevelSize={}", bytes),
            HardwareFact::CacheLineSize { bytes, .. } => write!(f, "CacheLineSize={}", bytes),
            HardwareFact::Associativity {
                ways,
                entity_stride,
                entity_size,
                ..
            } => write!(
                f,
                "Associativity={}, entityStride={}, entitySize={}",
                ways, entity_stride, entity_size
            ),
        }
    }
}
