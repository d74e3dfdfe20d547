//! Frame-synchronous input scripting for emulated games.
//!
//! A [Script] is a list of controller actions and waits. A [Runtime] plays it against an
//! emulator host one frame at a time: it runs every immediate action for the current frame,
//! delivers a single controller snapshot to the host, advances the emulation, and then lets
//! the script's current wait (if any) look at the new frame.
//!
//! # Script syntax
//!
//! Scripts have one command per line. `#` and `--` start a comment. Parentheses, commas and
//! quotes are ignored, so `hold("right", "b", 30)` and `hold right b 30` are the same.
//!
//! - `hold <button>... <frames>` asserts the buttons for `frames` frames starting now
//! - `press <button>...` asserts the buttons for exactly one frame
//! - `release <button>...` stops asserting the buttons immediately
//! - `toggle <button>...` releases held buttons and holds the others until released
//! - `wait <frames>` suspends the script for exactly `frames` frames
//! - `wait_until [<addr>] <op> <value>` suspends until the byte at `addr` satisfies the
//!   comparison. `read <addr>` may be used instead of `[<addr>]`, a mask can be applied with
//!   `[<addr>] & <mask>`, and `op` is one of `==`, `!=` (or `~=`), `<`, `<=`, `>`, `>=`
//! - `wait_grounded` waits until the player state byte equals the grounded value
//! - `jumps <count> <height>` jumps `count` times, each time waiting to be grounded and then
//!   holding A for `height` frames
//!
//! Integers may be written in decimal, with a `0x` prefix, or with a `$` prefix (hex).
//! Buttons are `A` (`JUMP`), `B` (`RUN`), `SELECT`, `START`, `UP` (`U`), `DOWN` (`D`),
//! `LEFT` (`L`) and `RIGHT` (`R`), in any case.
//!
//! Every error in a script (an unknown button, a malformed duration, an address outside
//! the configured memory map) is reported when the script is loaded, before anything is
//! played.
//!
//! # Example
//!
//! ```
//! use marlua_api::{Runtime, RuntimeConfig, Script};
//! use marlua_memory::{FlatMemory, GameMemory, MemoryError, MemoryRead, Address};
//! use marlua_timeline::{ControllerPort, ControllerState, InputLog};
//!
//! #[derive(Debug)]
//! struct Host {
//!     memory: FlatMemory,
//!     port: InputLog,
//! }
//!
//! impl MemoryRead for Host {
//!     fn read_u8s(&self, addr: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
//!         self.memory.read_u8s(addr, buf)
//!     }
//! }
//!
//! impl GameMemory for Host {
//!     fn advance_frame(&mut self) {
//!         self.memory.advance_frame();
//!     }
//! }
//!
//! impl ControllerPort for Host {
//!     fn latch(&mut self, state: ControllerState) {
//!         self.port.latch(state);
//!     }
//! }
//!
//! let config = RuntimeConfig::default();
//! let script = Script::parse("hold(\"right\", \"b\", 30)\njumps 2 20\n", &config).unwrap();
//! let host = Host {
//!     memory: FlatMemory::new(config.memory_map),
//!     port: InputLog::new(),
//! };
//!
//! let mut runtime = Runtime::new(host, script, config).unwrap();
//! let last_frame = runtime.run().unwrap();
//! assert_eq!(last_frame, 43);
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub use config::*;
pub use driver::*;
pub use error::*;
pub use runtime::*;
pub use script::*;

mod config;
mod driver;
mod error;
mod parse;
mod runtime;
mod script;
