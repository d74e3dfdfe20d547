use std::fmt;

use crate::{Button, Buttons, ControllerState};

/// How long a hold lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldDuration {
    /// Asserted for the given number of frames, starting on the frame it was issued.
    ///
    /// `Frames(0)` is a one-shot and behaves like `Frames(1)`.
    Frames(u32),
    /// Asserted until explicitly released.
    UntilReleased,
}

impl fmt::Display for HoldDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HoldDuration::Frames(frames) => write!(f, "{} frames", frames),
            HoldDuration::UntilReleased => write!(f, "until released"),
        }
    }
}

/// A request to assert one button over an interval of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldRequest {
    /// The held button.
    pub button: Button,
    /// The first frame on which the button is asserted.
    pub start_frame: u32,
    /// How long the button stays asserted.
    pub duration: HoldDuration,
}

impl HoldRequest {
    /// The first frame on which the button is no longer asserted, or None for an open hold.
    pub fn end_frame(&self) -> Option<u32> {
        match self.duration {
            HoldDuration::Frames(frames) => Some(self.start_frame.saturating_add(frames.max(1))),
            HoldDuration::UntilReleased => None,
        }
    }

    /// Return true if the button is asserted on `frame`.
    pub fn is_active(&self, frame: u32) -> bool {
        frame >= self.start_frame && self.end_frame().map_or(true, |end| frame < end)
    }

    /// Return true if the hold can no longer assert anything on or after `frame`.
    pub fn is_expired(&self, frame: u32) -> bool {
        self.end_frame().map_or(false, |end| frame >= end)
    }

    /// The smallest hold on the same button that covers both `self` and `other`.
    fn merge(&self, other: &HoldRequest) -> HoldRequest {
        let start_frame = self.start_frame.min(other.start_frame);
        let duration = match (self.end_frame(), other.end_frame()) {
            (Some(a), Some(b)) => HoldDuration::Frames(a.max(b) - start_frame),
            _ => HoldDuration::UntilReleased,
        };
        HoldRequest {
            button: self.button,
            start_frame,
            duration,
        }
    }
}

/// Tracks hold requests and derives the controller state for each frame.
///
/// Holds on the same button merge: the button stays asserted until the later of the two end
/// frames, and a hold until released outlasts any timed hold. Reissuing a hold counts its
/// duration from the current frame, but never shortens a hold that is already active. Only
/// a release ends a hold early.
#[derive(Debug, Clone, Default)]
pub struct InputScheduler {
    holds: Vec<HoldRequest>,
    allow_opposing_directions: bool,
    last_latched: Option<u32>,
}

impl InputScheduler {
    /// Create an empty scheduler.
    ///
    /// Unless `allow_opposing_directions` is set, a snapshot never reports both directions of
    /// a d-pad axis; if both are held, neither is reported.
    pub fn new(allow_opposing_directions: bool) -> Self {
        Self {
            holds: Vec::new(),
            allow_opposing_directions,
            last_latched: None,
        }
    }

    /// Assert `buttons` for `duration`, starting on `frame`.
    pub fn hold(&mut self, buttons: Buttons, duration: HoldDuration, frame: u32) {
        for button in buttons.iter() {
            let request = HoldRequest {
                button,
                start_frame: frame,
                duration,
            };
            match self
                .holds
                .iter()
                .position(|hold| hold.button == button && !hold.is_expired(frame))
            {
                Some(index) => self.holds[index] = self.holds[index].merge(&request),
                None => {
                    self.holds.retain(|hold| hold.button != button);
                    self.holds.push(request);
                }
            }
        }
    }

    /// Assert `buttons` on `frame`, without shortening any longer hold on them.
    pub fn press(&mut self, buttons: Buttons, frame: u32) {
        self.hold(buttons, HoldDuration::Frames(1), frame);
    }

    /// End every hold on `buttons`, taking effect on `frame`.
    pub fn release(&mut self, buttons: Buttons, frame: u32) {
        self.holds.retain(|hold| {
            let released = buttons.contains(hold.button.flag());
            if released && hold.is_active(frame) {
                log::trace!("releasing {} on frame {}", hold.button, frame);
            }
            !released
        });
    }

    /// Release each button that is held on `frame` and hold the others until released.
    pub fn toggle(&mut self, buttons: Buttons, frame: u32) {
        let held = self.held(frame);
        self.release(buttons & held, frame);
        self.hold(buttons - held, HoldDuration::UntilReleased, frame);
    }

    /// The union of all holds active on `frame`, before opposing directions are resolved.
    pub fn held(&self, frame: u32) -> Buttons {
        self.holds
            .iter()
            .filter(|hold| hold.is_active(frame))
            .fold(Buttons::empty(), |buttons, hold| buttons | hold.button.flag())
    }

    /// The buttons that the controller port would see on `frame`.
    pub fn asserted(&self, frame: u32) -> Buttons {
        let buttons = self.held(frame);
        if self.allow_opposing_directions {
            buttons
        } else {
            buttons.cancel_opposites()
        }
    }

    /// Produce the snapshot for `frame`, to be delivered to the controller port.
    ///
    /// Each frame may be latched once, in increasing order. Holds that end at or before
    /// `frame + 1` are discarded afterwards.
    pub fn latch(&mut self, frame: u32) -> ControllerState {
        if let Some(last) = self.last_latched {
            assert!(frame > last, "frame {} latched after frame {}", frame, last);
        }
        self.last_latched = Some(frame);

        let state = ControllerState {
            frame,
            buttons: self.asserted(frame),
        };
        let next_frame = frame.saturating_add(1);
        self.holds.retain(|hold| !hold.is_expired(next_frame));
        state
    }

    /// The holds that have not yet expired.
    pub fn holds(&self) -> &[HoldRequest] {
        &self.holds
    }

    /// Return true if no hold can assert anything on `frame` or later.
    pub fn is_idle(&self, frame: u32) -> bool {
        self.holds.iter().all(|hold| hold.is_expired(frame))
    }
}
