use std::fmt;

use marlua_memory::{Address, MemoryError, MemoryOracle, MemoryRead};
use marlua_timeline::Buttons;

use crate::{parse::parse_script, ConfigError, RuntimeConfig};

/// How a polled byte is compared against a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Compare `lhs` against `rhs`.
    pub fn apply(self, lhs: u8, rhs: u8) -> bool {
        match self {
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
        }
    }

    /// The operator as written in scripts.
    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A predicate on one byte of emulated memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    /// The polled address.
    pub address: Address,
    /// A mask applied to the byte before comparing.
    pub mask: Option<u8>,
    /// The comparison operator.
    pub comparison: Comparison,
    /// The value compared against.
    pub value: u8,
}

impl Condition {
    /// Create an unmasked condition.
    pub fn new(address: Address, comparison: Comparison, value: u8) -> Self {
        Self {
            address,
            mask: None,
            comparison,
            value,
        }
    }

    /// Apply `mask` to the byte before comparing.
    pub fn with_mask(mut self, mask: u8) -> Self {
        self.mask = Some(mask);
        self
    }

    /// Read the address once and test the condition.
    pub fn evaluate<M: MemoryRead + ?Sized>(
        &self,
        oracle: &MemoryOracle<'_, M>,
    ) -> Result<bool, MemoryError> {
        let byte = oracle
            .read(self.address)
            .map_err(|error| error.context(format!("while evaluating {}", self)))?;
        let byte = byte & self.mask.unwrap_or(0xFF);
        Ok(self.comparison.apply(byte, self.value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.address)?;
        if let Some(mask) = self.mask {
            write!(f, " & {:#04X}", mask)?;
        }
        write!(f, " {} {}", self.comparison, self.value)
    }
}

/// One step of a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Assert the buttons for `frames` frames, starting on the current frame.
    Hold {
        /// The held buttons.
        buttons: Buttons,
        /// How many frames to hold for.
        frames: u32,
    },
    /// Assert the buttons on the current frame only.
    Press(Buttons),
    /// Stop asserting the buttons, starting with the current frame.
    Release(Buttons),
    /// Release the held buttons and hold the others until released.
    Toggle(Buttons),
    /// Suspend the script for the given number of frames.
    Wait(u32),
    /// Suspend the script until the condition holds on a later frame.
    WaitUntil(Condition),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Hold { buttons, frames } => write!(f, "hold {} {}", buttons, frames),
            Action::Press(buttons) => write!(f, "press {}", buttons),
            Action::Release(buttons) => write!(f, "release {}", buttons),
            Action::Toggle(buttons) => write!(f, "toggle {}", buttons),
            Action::Wait(frames) => write!(f, "wait {}", frames),
            Action::WaitUntil(condition) => write!(f, "wait_until {}", condition),
        }
    }
}

/// A validated sequence of actions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    actions: Vec<Action>,
}

impl Script {
    /// Validate a list of actions against `config`.
    ///
    /// Returns an error if an action has no buttons or polls an address outside the memory
    /// map.
    pub fn new(actions: Vec<Action>, config: &RuntimeConfig) -> Result<Self, ConfigError> {
        for (index, action) in actions.iter().enumerate() {
            validate_action(action, config).map_err(|error| error.at_line(index + 1))?;
        }
        Ok(Self { actions })
    }

    /// Parse a script in the text format described in the [crate documentation](crate).
    ///
    /// Returns the first error found, with its line number. Nothing is returned for a script
    /// with any error in it.
    pub fn parse(source: &str, config: &RuntimeConfig) -> Result<Self, ConfigError> {
        parse_script(source, config)
    }

    /// Start building a script in code.
    pub fn builder(config: &RuntimeConfig) -> ScriptBuilder<'_> {
        ScriptBuilder::new(config)
    }

    pub(crate) fn from_validated(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    /// The actions in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Return true if the script has no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.actions {
            writeln!(f, "{}", action)?;
        }
        Ok(())
    }
}

fn validate_action(action: &Action, config: &RuntimeConfig) -> Result<(), ConfigError> {
    match action {
        Action::Hold { buttons, .. }
        | Action::Press(buttons)
        | Action::Release(buttons)
        | Action::Toggle(buttons) => {
            if buttons.is_empty() {
                return Err(ConfigError::MissingArgument {
                    command: action.to_string(),
                    argument: "buttons",
                });
            }
        }
        Action::Wait(_) => {}
        Action::WaitUntil(condition) => check_address(condition.address, config)?,
    }
    Ok(())
}

pub(crate) fn check_address(address: Address, config: &RuntimeConfig) -> Result<(), ConfigError> {
    if config.memory_map.contains(address) {
        Ok(())
    } else {
        Err(ConfigError::AddressOutOfRange {
            address,
            map: config.memory_map,
        })
    }
}

/// Expand `jumps(count, height)`: each jump waits until grounded, then holds A for `height`
/// frames and waits for the hold to finish.
pub(crate) fn push_jumps(
    actions: &mut Vec<Action>,
    count: u32,
    height: u32,
    config: &RuntimeConfig,
) {
    for _ in 0..count {
        actions.push(Action::WaitUntil(config.grounded_condition()));
        actions.push(Action::Hold {
            buttons: Buttons::A,
            frames: height,
        });
        actions.push(Action::Wait(height));
    }
}

/// Builds a [Script] in code, with the same validation as [Script::parse].
///
/// Each method call counts as one line for error reporting. Only the first error is kept,
/// and it is returned by [ScriptBuilder::build].
///
/// # Example
///
/// ```
/// use marlua_api::{Comparison, RuntimeConfig, Script};
///
/// let config = RuntimeConfig::default();
/// let script = Script::builder(&config)
///     .hold(&["right", "b"], 30)
///     .wait_until(0x000E, Comparison::Eq, 8)
///     .jumps(2, 30)
///     .build()
///     .unwrap();
/// assert_eq!(script.len(), 8);
/// ```
#[derive(Debug)]
pub struct ScriptBuilder<'c> {
    config: &'c RuntimeConfig,
    actions: Vec<Action>,
    calls: usize,
    error: Option<ConfigError>,
}

impl<'c> ScriptBuilder<'c> {
    fn new(config: &'c RuntimeConfig) -> Self {
        Self {
            config,
            actions: Vec::new(),
            calls: 0,
            error: None,
        }
    }

    fn push(&mut self, build: impl FnOnce(&RuntimeConfig) -> Result<Vec<Action>, ConfigError>) {
        self.calls += 1;
        if self.error.is_some() {
            return;
        }
        match build(self.config) {
            Ok(actions) => self.actions.extend(actions),
            Err(error) => self.error = Some(error.at_line(self.calls)),
        }
    }

    fn buttons(names: &[&str]) -> Result<Buttons, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::MissingArgument {
                command: "builder".to_owned(),
                argument: "buttons",
            });
        }
        Ok(Buttons::from_names(names.iter().copied())?)
    }

    /// Hold the named buttons for `frames` frames.
    pub fn hold(&mut self, buttons: &[&str], frames: u32) -> &mut Self {
        self.push(|_| {
            let buttons = Self::buttons(buttons)?;
            Ok(vec![Action::Hold { buttons, frames }])
        });
        self
    }

    /// Press the named buttons for one frame.
    pub fn press(&mut self, buttons: &[&str]) -> &mut Self {
        self.push(|_| Ok(vec![Action::Press(Self::buttons(buttons)?)]));
        self
    }

    /// Release the named buttons.
    pub fn release(&mut self, buttons: &[&str]) -> &mut Self {
        self.push(|_| Ok(vec![Action::Release(Self::buttons(buttons)?)]));
        self
    }

    /// Toggle the named buttons.
    pub fn toggle(&mut self, buttons: &[&str]) -> &mut Self {
        self.push(|_| Ok(vec![Action::Toggle(Self::buttons(buttons)?)]));
        self
    }

    /// Wait `frames` frames.
    pub fn wait(&mut self, frames: u32) -> &mut Self {
        self.push(|_| Ok(vec![Action::Wait(frames)]));
        self
    }

    /// Wait until the byte at `address` compares true against `value`.
    pub fn wait_until(&mut self, address: u16, comparison: Comparison, value: u8) -> &mut Self {
        self.push(|config| {
            let condition = Condition::new(Address(address), comparison, value);
            check_address(condition.address, config)?;
            Ok(vec![Action::WaitUntil(condition)])
        });
        self
    }

    /// Wait until the byte at `address`, masked with `mask`, compares true against `value`.
    pub fn wait_until_masked(
        &mut self,
        address: u16,
        mask: u8,
        comparison: Comparison,
        value: u8,
    ) -> &mut Self {
        self.push(|config| {
            let condition = Condition::new(Address(address), comparison, value).with_mask(mask);
            check_address(condition.address, config)?;
            Ok(vec![Action::WaitUntil(condition)])
        });
        self
    }

    /// Wait until the player is grounded.
    pub fn wait_grounded(&mut self) -> &mut Self {
        self.push(|config| Ok(vec![Action::WaitUntil(config.grounded_condition())]));
        self
    }

    /// Jump `count` times, holding A for `height` frames each time the player is grounded.
    pub fn jumps(&mut self, count: u32, height: u32) -> &mut Self {
        self.push(|config| {
            let mut actions = Vec::new();
            push_jumps(&mut actions, count, height, config);
            Ok(actions)
        });
        self
    }

    /// Finish the script, or return the first error.
    pub fn build(&self) -> Result<Script, ConfigError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(Script::from_validated(self.actions.clone())),
        }
    }
}
