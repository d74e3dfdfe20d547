use std::fmt;

use crate::{Address, GameMemory, MemoryError, MemoryMap, MemoryRead};

/// Emulated RAM backed by a plain byte buffer.
///
/// Advancing a frame leaves the contents untouched, so this is mostly useful for dry runs
/// and for hosts that copy RAM in from elsewhere.
#[derive(Clone)]
pub struct FlatMemory {
    map: MemoryMap,
    bytes: Vec<u8>,
    num_advances: u32,
}

impl FlatMemory {
    /// Create zeroed memory covering `map`.
    pub fn new(map: MemoryMap) -> Self {
        Self {
            map,
            bytes: vec![0; map.size as usize],
            num_advances: 0,
        }
    }

    /// Create memory covering `map` from a RAM dump.
    ///
    /// The dump is truncated or zero padded to the size of the map.
    pub fn from_bytes(map: MemoryMap, mut bytes: Vec<u8>) -> Self {
        bytes.resize(map.size as usize, 0);
        Self {
            map,
            bytes,
            num_advances: 0,
        }
    }

    /// The address window covered by this memory.
    pub fn map(&self) -> MemoryMap {
        self.map
    }

    /// Overwrite a byte. This is a host-side operation and is never exposed to scripts.
    pub fn write_u8(&mut self, addr: Address, value: u8) -> Result<(), MemoryError> {
        let offset = self.map.offset(addr).ok_or(MemoryError::OutOfRange {
            address: addr,
            map: self.map,
        })?;
        self.bytes[offset] = value;
        Ok(())
    }

    /// The number of frames this memory has been advanced.
    pub fn num_advances(&self) -> u32 {
        self.num_advances
    }
}

impl MemoryRead for FlatMemory {
    fn read_u8s(&self, addr: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        let start = self.map.offset(addr).ok_or(MemoryError::OutOfRange {
            address: addr,
            map: self.map,
        })?;
        let end = start + buf.len();
        if end > self.bytes.len() {
            return Err(MemoryError::OutOfRange {
                address: addr + buf.len() as u16,
                map: self.map,
            });
        }
        buf.copy_from_slice(&self.bytes[start..end]);
        Ok(())
    }
}

impl GameMemory for FlatMemory {
    fn advance_frame(&mut self) {
        self.num_advances = self.num_advances.saturating_add(1);
    }
}

impl fmt::Debug for FlatMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlatMemory")
            .field("map", &self.map)
            .field("num_advances", &self.num_advances)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut memory = FlatMemory::new(MemoryMap::default());
        memory.write_u8(Address(0x1D), 3).unwrap();
        memory.write_u8(Address(0x1E), 1).unwrap();
        assert_eq!(memory.read_u8(Address(0x1D)).unwrap(), 3);
        assert_eq!(memory.read_u16(Address(0x1D)).unwrap(), 0x0103);
    }

    #[test]
    fn test_out_of_range() {
        let mut memory = FlatMemory::new(MemoryMap::default());
        assert_eq!(
            memory.read_u8(Address(0x0800)),
            Err(MemoryError::OutOfRange {
                address: Address(0x0800),
                map: MemoryMap::default(),
            })
        );
        assert!(memory.write_u8(Address(0x2000), 1).is_err());
        assert!(memory.read_u16(Address(0x07FF)).is_err());
    }

    #[test]
    fn test_from_bytes_pads() {
        let memory = FlatMemory::from_bytes(MemoryMap::new(Address(0x100), 4), vec![7, 8]);
        assert_eq!(memory.read_u8(Address(0x101)).unwrap(), 8);
        assert_eq!(memory.read_u8(Address(0x103)).unwrap(), 0);
    }

    #[test]
    fn test_advance_keeps_contents() {
        let mut memory = FlatMemory::from_bytes(MemoryMap::default(), vec![42]);
        memory.advance_frame();
        memory.advance_frame();
        assert_eq!(memory.num_advances(), 2);
        assert_eq!(memory.read_u8(Address(0)).unwrap(), 42);
    }
}
