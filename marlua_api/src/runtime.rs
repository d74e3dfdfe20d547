use marlua_memory::{GameMemory, MemoryOracle};
use marlua_timeline::{
    Buttons, ControllerPort, ControllerState, FrameClock, InputLog, InputScheduler,
};

use crate::{Action, ConfigError, Driver, DriverState, Error, RuntimeConfig, Script};

/// Plays a [Script] against an emulator host, one frame at a time.
///
/// Each call to [Runtime::step] does the following, in order:
/// 1. Execute the script's immediate actions for the current frame
/// 2. Latch a single controller snapshot to the host (and the [InputLog])
/// 3. Advance the emulation and the frame clock by one frame
/// 4. Let the script's current wait look at the new frame
///
/// If the config has preroll inputs, they are latched on the first frames instead of running
/// the script.
#[derive(Debug)]
pub struct Runtime<H> {
    host: H,
    config: RuntimeConfig,
    clock: FrameClock,
    scheduler: InputScheduler,
    driver: Driver,
    input_log: InputLog,
    preroll_remaining: usize,
    aborted: bool,
}

impl<H: GameMemory + ControllerPort> Runtime<H> {
    /// Create a runtime at frame 0.
    ///
    /// Returns an error if the config is inconsistent.
    pub fn new(host: H, script: Script, config: RuntimeConfig) -> Result<Self, Error> {
        config.validate()?;
        for (index, action) in script.actions().iter().enumerate() {
            if let Action::WaitUntil(condition) = action {
                if !config.memory_map.contains(condition.address) {
                    return Err(ConfigError::AddressOutOfRange {
                        address: condition.address,
                        map: config.memory_map,
                    }
                    .at_line(index + 1)
                    .into());
                }
            }
        }

        log::info!(
            "loaded script with {} actions, {} preroll frames",
            script.len(),
            config.preroll.len()
        );
        Ok(Self {
            host,
            clock: FrameClock::new(),
            scheduler: InputScheduler::new(config.allow_opposing_directions),
            driver: Driver::new(script, config.stall_budget),
            input_log: InputLog::new(),
            preroll_remaining: config.preroll.len(),
            aborted: false,
            config,
        })
    }

    /// Play exactly one frame.
    ///
    /// After an error, the runtime refuses to continue and every later call returns
    /// [Error::Aborted].
    pub fn step(&mut self) -> Result<(), Error> {
        let frame = self.clock.frame();
        if self.aborted {
            return Err(Error::Aborted { frame });
        }

        let state = if self.preroll_remaining > 0 {
            let index = self.config.preroll.len() - self.preroll_remaining;
            self.preroll_remaining -= 1;
            if self.preroll_remaining == 0 {
                log::info!("preroll finished on frame {}", frame);
            }
            ControllerState {
                frame,
                buttons: Buttons::from_bits_truncate(self.config.preroll[index]),
            }
        } else {
            self.driver.run_immediate(&mut self.scheduler, frame);
            self.scheduler.latch(frame)
        };

        log::trace!("latch {}", state);
        self.host.latch(state);
        self.input_log.record(state);

        self.host.advance_frame();
        let frame = self.clock.advance();

        let oracle = MemoryOracle::new(&self.host, self.config.memory_map, frame);
        if let Err(error) = self.driver.on_frame(&oracle) {
            self.aborted = true;
            return Err(error);
        }
        Ok(())
    }

    /// Play frames until the script is done, returning the frame after the last latched
    /// one.
    ///
    /// Holds issued by the last actions may still be pending when this returns; keep calling
    /// [Runtime::step], or use [Runtime::run_until_idle], to play them out.
    pub fn run(&mut self) -> Result<u32, Error> {
        while !self.driver.is_done() {
            self.step()?;
        }
        Ok(self.clock.frame())
    }

    /// Like [Runtime::run], but also keep playing until no timed hold is pending.
    ///
    /// Holds until released never expire on their own and are left in place.
    pub fn run_until_idle(&mut self) -> Result<u32, Error> {
        self.run()?;
        while self
            .scheduler
            .holds()
            .iter()
            .any(|hold| hold.end_frame().is_some() && !hold.is_expired(self.clock.frame()))
        {
            self.step()?;
        }
        Ok(self.clock.frame())
    }

    /// Play `frames` frames, regardless of whether the script is done.
    pub fn run_for(&mut self, frames: u32) -> Result<(), Error> {
        for _ in 0..frames {
            self.step()?;
        }
        Ok(())
    }

    /// The frame that will be latched next.
    pub fn frame(&self) -> u32 {
        self.clock.frame()
    }

    /// The driver's state.
    pub fn state(&self) -> DriverState {
        self.driver.state()
    }

    /// Return true once the script has finished.
    pub fn is_done(&self) -> bool {
        self.driver.is_done()
    }

    /// Every snapshot delivered to the host so far.
    pub fn input_log(&self) -> &InputLog {
        &self.input_log
    }

    /// The input scheduler, for inspecting pending holds.
    pub fn scheduler(&self) -> &InputScheduler {
        &self.scheduler
    }

    /// The config the runtime was created with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// The emulator host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Destruct into the host and the input log.
    pub fn into_parts(self) -> (H, InputLog) {
        (self.host, self.input_log)
    }
}
