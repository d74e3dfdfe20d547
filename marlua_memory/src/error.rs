#![allow(missing_docs)]

use std::{error::Error, fmt};

use crate::{Address, MemoryMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    Context {
        context: String,
        error: Box<MemoryError>,
    },
    OutOfRange {
        address: Address,
        map: MemoryMap,
    },
    ReadFailed {
        address: Address,
        reason: String,
    },
}

impl MemoryError {
    /// Wrap the error with a description of what was being read.
    pub fn context(self, context: impl Into<String>) -> Self {
        MemoryError::Context {
            context: context.into(),
            error: Box::new(self),
        }
    }
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::Context { context, error } => write!(f, "{}:\n  {}", context, error),
            MemoryError::OutOfRange { address, map } => {
                write!(f, "address {} is outside of {}", address, map)
            }
            MemoryError::ReadFailed { address, reason } => {
                write!(f, "failed to read {}: {}", address, reason)
            }
        }
    }
}

impl Error for MemoryError {}
