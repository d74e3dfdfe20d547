use std::fmt;

use crate::Buttons;

/// The buttons asserted on a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControllerState {
    /// The frame the state applies to.
    pub frame: u32,
    /// The asserted buttons.
    pub buttons: Buttons,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}: {}", self.frame, self.buttons)
    }
}

/// The emulated controller port, which consumes one [ControllerState] per frame.
pub trait ControllerPort {
    /// Deliver the state for `state.frame`.
    ///
    /// Called exactly once per frame, before the emulation advances past that frame.
    fn latch(&mut self, state: ControllerState);
}

impl<P: ControllerPort + ?Sized> ControllerPort for &mut P {
    fn latch(&mut self, state: ControllerState) {
        (**self).latch(state)
    }
}

/// A record of every state delivered to the controller port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLog {
    states: Vec<ControllerState>,
}

impl InputLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Append a state.
    ///
    /// States must be recorded in increasing frame order.
    pub fn record(&mut self, state: ControllerState) {
        if let Some(last) = self.states.last() {
            assert!(
                state.frame > last.frame,
                "frame {} recorded after frame {}",
                state.frame,
                last.frame
            );
        }
        self.states.push(state);
    }

    /// The buttons latched on `frame`, or None if the frame wasn't recorded.
    pub fn buttons_at(&self, frame: u32) -> Option<Buttons> {
        self.states
            .binary_search_by_key(&frame, |state| state.frame)
            .ok()
            .map(|index| self.states[index].buttons)
    }

    /// The frames on which `buttons` were all asserted.
    pub fn frames_with(&self, buttons: Buttons) -> Vec<u32> {
        self.states
            .iter()
            .filter(|state| state.buttons.contains(buttons))
            .map(|state| state.frame)
            .collect()
    }

    /// Iterate over the recorded states.
    pub fn iter(&self) -> impl Iterator<Item = &ControllerState> {
        self.states.iter()
    }

    /// The number of recorded frames.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Return true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// The raw port byte for each recorded frame.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.states.iter().map(|state| state.buttons.bits()).collect()
    }
}

impl ControllerPort for InputLog {
    fn latch(&mut self, state: ControllerState) {
        self.record(state);
    }
}
