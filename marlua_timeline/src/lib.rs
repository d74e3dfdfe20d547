//! Frame-accurate controller input.
//!
//! There are three components:
//! - A [FrameClock] which counts emulated frames, the only unit of time
//! - An [InputScheduler] which tracks hold requests and produces one [ControllerState]
//!   per frame
//! - A [ControllerPort] which consumes that state (normally the emulator host, or an
//!   [InputLog] recording it)
//!
//! # Note on frame numbers
//!
//! The state latched on frame i is the input the game sees while advancing from frame i to
//! frame i + 1.
//!
//! For example, if A is pressed on frame 0, the snapshot for frame 0 contains A and the
//! game responds to it during the advance 0 -> 1. A press lasts exactly one frame, so the
//! snapshot for frame 1 no longer contains A.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub use buttons::*;
pub use clock::*;
pub use controller::*;
pub use scheduler::*;

mod buttons;
mod clock;
mod controller;
mod scheduler;
