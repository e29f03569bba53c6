//! Probe arena: the memory region pointer chains are laid out in
//!
//! One anonymous mapping is created by the caller and handed to every
//! timing run. It is unmapped when the arena is dropped.

use memmap2::MmapMut;

/// Owned anonymous memory mapping used as scratch space for timing runs
#[derive(Debug)]
pub struct ProbeArena {
    map: MmapMut,
}

impl ProbeArena {
    /// Map `len` bytes of zeroed anonymous memory
    ///
    /// Pages are committed lazily by the OS, so large arenas only cost what
    /// the sweep actually touches.
    pub fn new(len: usize) -> std::io::Result<Self> {
        let map = MmapMut::map_anon(len)?;
        tracing::debug!(len, "probe arena mapped");
        Ok(Self { map })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.map
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.map.as_ptr()
    }
}
