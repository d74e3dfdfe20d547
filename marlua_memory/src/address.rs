use std::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

use crate::MemoryError;

/// An address in the emulated system's 16-bit address space.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Address(pub u16);

impl Add<u16> for Address {
    type Output = Self;

    fn add(self, rhs: u16) -> Self::Output {
        Self(self.0.wrapping_add(rhs))
    }
}

impl From<u16> for Address {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:04X}", self.0)
    }
}

/// The window of emulated memory that scripts are allowed to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryMap {
    /// The first readable address.
    pub start: Address,
    /// The number of readable bytes, starting at `start`.
    pub size: u32,
}

impl Default for MemoryMap {
    /// The 2 KiB of NES work RAM.
    fn default() -> Self {
        Self {
            start: Address(0x0000),
            size: 0x0800,
        }
    }
}

impl MemoryMap {
    /// Create a map covering `size` bytes starting at `start`.
    pub fn new(start: Address, size: u32) -> Self {
        Self { start, size }
    }

    /// Return true if `address` lies inside the map.
    pub fn contains(&self, address: Address) -> bool {
        let start = u32::from(self.start.0);
        let address = u32::from(address.0);
        address >= start && address - start < self.size
    }

    /// Return an error if `address` lies outside the map.
    pub fn check(&self, address: Address) -> Result<(), MemoryError> {
        if self.contains(address) {
            Ok(())
        } else {
            Err(MemoryError::OutOfRange { address, map: *self })
        }
    }

    /// The offset of `address` from the start of the map, if it is in range.
    pub fn offset(&self, address: Address) -> Option<usize> {
        if self.contains(address) {
            Some(usize::from(address.0 - self.start.0))
        } else {
            None
        }
    }

    /// The last readable address, or None for an empty map.
    pub fn end(&self) -> Option<Address> {
        let last = u32::from(self.start.0) + self.size.checked_sub(1)?;
        u16::try_from(last).ok().map(Address)
    }
}

impl fmt::Display for MemoryMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "{}..={}", self.start, end),
            None => write!(f, "{} (empty)", self.start),
        }
    }
}
