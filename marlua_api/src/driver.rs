use marlua_memory::{MemoryOracle, MemoryRead};
use marlua_timeline::{HoldDuration, InputScheduler};

use crate::{Action, Condition, Error, Script, StallError};

/// What a waiting driver is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resume {
    /// Resume on the given frame.
    Frame(u32),
    /// Resume on the first frame after `since` on which the condition holds.
    Condition {
        /// The polled condition.
        condition: Condition,
        /// The frame on which the wait started.
        since: u32,
    },
}

/// The state of a [Driver].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Immediate actions are being executed.
    Running,
    /// Suspended until the resumption condition is met.
    Waiting(Resume),
    /// Every action has been executed.
    Done,
}

/// Steps through a [Script], applying actions to an [InputScheduler].
///
/// The driver never advances time itself. The host loop calls [Driver::run_immediate] at
/// the start of each frame and [Driver::on_frame] once after each frame advance.
#[derive(Debug, Clone)]
pub struct Driver {
    script: Script,
    cursor: usize,
    state: DriverState,
    stall_budget: u32,
}

impl Driver {
    /// Create a driver positioned at the first action.
    ///
    /// A `wait_until` that stays false for `stall_budget` frames raises a [StallError].
    pub fn new(script: Script, stall_budget: u32) -> Self {
        Self {
            script,
            cursor: 0,
            state: DriverState::Running,
            stall_budget,
        }
    }

    /// The current state.
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Return true once every action has been executed.
    pub fn is_done(&self) -> bool {
        self.state == DriverState::Done
    }

    /// The index of the current action.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The script being played.
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// Execute actions on `frame` until the script waits or ends.
    ///
    /// Does nothing unless the driver is running.
    pub fn run_immediate(&mut self, scheduler: &mut InputScheduler, frame: u32) {
        while self.state == DriverState::Running {
            let action = match self.script.actions().get(self.cursor) {
                Some(action) => *action,
                None => {
                    log::info!("script finished on frame {}", frame);
                    self.state = DriverState::Done;
                    break;
                }
            };
            log::debug!("frame {}: {}", frame, action);

            match action {
                Action::Hold { buttons, frames } => {
                    scheduler.hold(buttons, HoldDuration::Frames(frames), frame)
                }
                Action::Press(buttons) => scheduler.press(buttons, frame),
                Action::Release(buttons) => scheduler.release(buttons, frame),
                Action::Toggle(buttons) => scheduler.toggle(buttons, frame),
                Action::Wait(0) => {}
                Action::Wait(frames) => {
                    self.state = DriverState::Waiting(Resume::Frame(frame.saturating_add(frames)));
                }
                Action::WaitUntil(condition) => {
                    self.state = DriverState::Waiting(Resume::Condition {
                        condition,
                        since: frame,
                    });
                }
            }

            if self.state == DriverState::Running {
                self.cursor += 1;
            }
        }
    }

    /// Check the resumption condition after the emulation has advanced to `oracle.frame()`.
    ///
    /// A polling wait reads memory exactly once per call. Returns a [StallError] if the
    /// condition has now been false for the whole stall budget.
    pub fn on_frame<M: MemoryRead + ?Sized>(
        &mut self,
        oracle: &MemoryOracle<'_, M>,
    ) -> Result<(), Error> {
        let frame = oracle.frame();
        match self.state {
            DriverState::Running | DriverState::Done => {}
            DriverState::Waiting(Resume::Frame(target)) => {
                if frame >= target {
                    self.resume(frame);
                }
            }
            DriverState::Waiting(Resume::Condition { condition, since }) => {
                if condition.evaluate(oracle)? {
                    self.resume(frame);
                } else if frame.saturating_sub(since) >= self.stall_budget {
                    let error = StallError {
                        condition,
                        since,
                        frame,
                        cursor: self.cursor,
                    };
                    log::warn!("{}", error);
                    return Err(error.into());
                }
            }
        }
        Ok(())
    }

    fn resume(&mut self, frame: u32) {
        log::debug!("frame {}: resuming after action {}", frame, self.cursor + 1);
        self.state = DriverState::Running;
        self.cursor += 1;
    }
}

#[cfg(test)]
mod test {
    use marlua_memory::{Address, FlatMemory, MemoryMap};
    use marlua_timeline::Buttons;

    use super::*;
    use crate::RuntimeConfig;

    fn driver(source: &str) -> Driver {
        let config = RuntimeConfig::default();
        Driver::new(Script::parse(source, &config).unwrap(), 5)
    }

    #[test]
    fn test_immediate_actions_share_a_frame() {
        let mut driver = driver("press a\nhold right 3\nrelease right\ntoggle b");
        let mut scheduler = InputScheduler::new(false);
        driver.run_immediate(&mut scheduler, 0);
        assert!(driver.is_done());
        assert_eq!(driver.cursor(), 4);
        assert_eq!(scheduler.asserted(0), Buttons::A | Buttons::B);
    }

    #[test]
    fn test_wait_frames() {
        let mut driver = driver("wait 3\npress a");
        let mut scheduler = InputScheduler::new(false);
        let memory = FlatMemory::new(MemoryMap::default());

        driver.run_immediate(&mut scheduler, 10);
        assert_eq!(driver.state(), DriverState::Waiting(Resume::Frame(13)));
        for frame in 11..13 {
            driver
                .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), frame))
                .unwrap();
            driver.run_immediate(&mut scheduler, frame);
            assert_eq!(scheduler.asserted(frame), Buttons::empty());
        }
        driver
            .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), 13))
            .unwrap();
        assert_eq!(driver.state(), DriverState::Running);
        driver.run_immediate(&mut scheduler, 13);
        assert_eq!(scheduler.asserted(13), Buttons::A);
    }

    #[test]
    fn test_wait_zero_does_not_suspend() {
        let mut driver = driver("wait 0\npress a");
        let mut scheduler = InputScheduler::new(false);
        driver.run_immediate(&mut scheduler, 0);
        assert!(driver.is_done());
        assert_eq!(scheduler.asserted(0), Buttons::A);
    }

    #[test]
    fn test_condition_is_not_checked_on_registration() {
        let mut driver = driver("wait_grounded\npress a");
        let mut scheduler = InputScheduler::new(false);
        let memory = FlatMemory::new(MemoryMap::default());

        driver.run_immediate(&mut scheduler, 0);
        assert!(matches!(
            driver.state(),
            DriverState::Waiting(Resume::Condition { since: 0, .. })
        ));
        assert_eq!(scheduler.asserted(0), Buttons::empty());

        driver
            .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), 1))
            .unwrap();
        driver.run_immediate(&mut scheduler, 1);
        assert_eq!(scheduler.asserted(1), Buttons::A);
    }

    #[test]
    fn test_stall() {
        let mut driver = driver("wait_until [0x10] == 1");
        let mut scheduler = InputScheduler::new(false);
        let memory = FlatMemory::new(MemoryMap::default());
        driver.run_immediate(&mut scheduler, 2);

        for frame in 3..7 {
            driver
                .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), frame))
                .unwrap();
        }
        let error = driver
            .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), 7))
            .unwrap_err();
        match error {
            Error::StallError(error) => {
                assert_eq!(error.since, 2);
                assert_eq!(error.frame, 7);
                assert_eq!(error.condition.address, Address(0x10));
            }
            error => panic!("unexpected error: {}", error),
        }
    }

    #[test]
    fn test_done_ignores_frames() {
        let mut driver = driver("");
        let mut scheduler = InputScheduler::new(false);
        let memory = FlatMemory::new(MemoryMap::default());
        assert_eq!(driver.state(), DriverState::Running);
        driver.run_immediate(&mut scheduler, 0);
        assert!(driver.is_done());
        driver
            .on_frame(&MemoryOracle::new(&memory, MemoryMap::default(), 1))
            .unwrap();
        assert!(driver.is_done());
    }
}
