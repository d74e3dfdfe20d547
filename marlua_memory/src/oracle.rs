use std::fmt;

use crate::{Address, MemoryError, MemoryMap, MemoryRead};

/// A read-only view of emulated memory at a frame boundary.
///
/// The oracle holds a shared borrow of the memory, so the emulation cannot advance while it
/// exists. Every read goes straight to the memory; nothing is cached.
pub struct MemoryOracle<'a, M: ?Sized> {
    memory: &'a M,
    map: MemoryMap,
    frame: u32,
}

impl<'a, M: MemoryRead + ?Sized> MemoryOracle<'a, M> {
    /// Create a view of `memory` as of `frame`, restricted to `map`.
    pub fn new(memory: &'a M, map: MemoryMap, frame: u32) -> Self {
        Self { memory, map, frame }
    }

    /// Read the byte at `address`.
    pub fn read(&self, address: Address) -> Result<u8, MemoryError> {
        self.map.check(address)?;
        self.memory.read_u8(address).map_err(|error| {
            log::trace!("read {} failed on frame {}", address, self.frame);
            error
        })
    }

    /// The frame that the memory currently holds.
    pub fn frame(&self) -> u32 {
        self.frame
    }
}

impl<M: ?Sized> fmt::Debug for MemoryOracle<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryOracle")
            .field("map", &self.map)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}
