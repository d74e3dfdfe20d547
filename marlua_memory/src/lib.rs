//! Read-only access to emulated memory.
//!
//! A script observes the game through [MemoryOracle], a view that borrows a [GameMemory]
//! immutably. Advancing the emulation requires a mutable borrow, so an oracle can only exist
//! while the emulation is paused between frames.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub use address::*;
pub use error::*;
pub use flat_memory::*;
pub use oracle::*;
pub use traits::*;

mod address;
mod error;
mod flat_memory;
mod oracle;
mod traits;
