#![allow(missing_docs)]

use std::{error, fmt, sync::Arc};

use marlua_memory::{Address, MemoryError, MemoryMap};
use marlua_timeline::UnknownButton;

use crate::Condition;

#[derive(Debug, Clone)]
pub enum Error {
    ConfigError(ConfigError),
    StallError(StallError),
    MemoryError(MemoryError),
    Aborted { frame: u32 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigError(error) => write!(f, "{}", error),
            Error::StallError(error) => write!(f, "{}", error),
            Error::MemoryError(error) => write!(f, "{}", error),
            Error::Aborted { frame } => {
                write!(f, "script was aborted on frame {} after an earlier error", frame)
            }
        }
    }
}

impl error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(v: ConfigError) -> Self {
        Self::ConfigError(v)
    }
}

impl From<StallError> for Error {
    fn from(v: StallError) -> Self {
        Self::StallError(v)
    }
}

impl From<MemoryError> for Error {
    fn from(v: MemoryError) -> Self {
        Self::MemoryError(v)
    }
}

/// A problem with a script or configuration, detected before playback starts.
#[derive(Debug, Clone)]
pub enum ConfigError {
    Context {
        line: usize,
        error: Box<ConfigError>,
    },
    UnknownCommand(String),
    UnknownButton(UnknownButton),
    MissingArgument {
        command: String,
        argument: &'static str,
    },
    UnexpectedArgument {
        command: String,
        argument: String,
    },
    MalformedInteger {
        text: String,
        expected: &'static str,
    },
    MalformedCondition(String),
    AddressOutOfRange {
        address: Address,
        map: MemoryMap,
    },
    InvalidStallBudget,
    JsonError(Arc<serde_json::Error>),
}

impl ConfigError {
    /// Attach the 1-based line (or builder call) number where the error occurred.
    pub fn at_line(self, line: usize) -> Self {
        ConfigError::Context {
            line,
            error: Box::new(self),
        }
    }

    /// The error without any line context.
    pub fn root(&self) -> &ConfigError {
        match self {
            ConfigError::Context { error, .. } => error.root(),
            error => error,
        }
    }

    /// The line number attached to the error, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            ConfigError::Context { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Context { line, error } => write!(f, "line {}: {}", line, error),
            ConfigError::UnknownCommand(command) => write!(f, "unknown command: {:?}", command),
            ConfigError::UnknownButton(error) => write!(f, "{}", error),
            ConfigError::MissingArgument { command, argument } => {
                write!(f, "{}: missing {}", command, argument)
            }
            ConfigError::UnexpectedArgument { command, argument } => {
                write!(f, "{}: unexpected argument {:?}", command, argument)
            }
            ConfigError::MalformedInteger { text, expected } => {
                write!(f, "expected {}, found {:?}", expected, text)
            }
            ConfigError::MalformedCondition(text) => write!(f, "malformed condition: {:?}", text),
            ConfigError::AddressOutOfRange { address, map } => {
                write!(f, "address {} is outside of {}", address, map)
            }
            ConfigError::InvalidStallBudget => write!(f, "stall budget must be at least 1 frame"),
            ConfigError::JsonError(error) => write!(f, "invalid config: {}", error),
        }
    }
}

impl error::Error for ConfigError {}

impl From<UnknownButton> for ConfigError {
    fn from(v: UnknownButton) -> Self {
        Self::UnknownButton(v)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(v: serde_json::Error) -> Self {
        Self::JsonError(Arc::new(v))
    }
}

/// A polling wait whose condition stayed false for the whole stall budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StallError {
    /// The condition that never held.
    pub condition: Condition,
    /// The frame on which the wait started.
    pub since: u32,
    /// The frame on which the wait was given up.
    pub frame: u32,
    /// The position of the wait in the script.
    pub cursor: usize,
}

impl fmt::Display for StallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "wait_until {} (action {}) was not satisfied after {} frames (frames {}..={})",
            self.condition,
            self.cursor + 1,
            self.frame - self.since,
            self.since + 1,
            self.frame
        )
    }
}

impl error::Error for StallError {}
