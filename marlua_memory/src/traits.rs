use crate::{Address, MemoryError};

/// Trait for a view of memory that allows reading bytes by address.
pub trait MemoryRead {
    /// Read an array of u8s from the given address.
    fn read_u8s(&self, addr: Address, buf: &mut [u8]) -> Result<(), MemoryError>;

    /// Read a u8 from the given address.
    fn read_u8(&self, addr: Address) -> Result<u8, MemoryError> {
        let mut buf = [0];
        self.read_u8s(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Read a little endian u16 from the given address.
    fn read_u16(&self, addr: Address) -> Result<u16, MemoryError> {
        let mut buf = [0; 2];
        self.read_u8s(addr, &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}

impl<M: MemoryRead + ?Sized> MemoryRead for &M {
    fn read_u8s(&self, addr: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        (**self).read_u8s(addr, buf)
    }
}

/// A running emulation whose memory can be read between frames.
pub trait GameMemory: MemoryRead {
    /// Run the emulation forward by exactly one frame.
    ///
    /// The controller input for the frame must already have been delivered.
    fn advance_frame(&mut self);
}
