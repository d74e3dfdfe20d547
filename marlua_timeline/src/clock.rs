/// Monotonic frame counter kept in lockstep with the emulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameClock {
    frame: u32,
}

impl FrameClock {
    /// Create a clock at frame 0.
    pub fn new() -> Self {
        Self { frame: 0 }
    }

    /// The current frame.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Step exactly one frame, returning the new frame.
    pub fn advance(&mut self) -> u32 {
        self.frame += 1;
        self.frame
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_advance() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.frame(), 2);
    }
}
