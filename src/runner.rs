use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, InputState, Keyboard, KeyboardCommands},
    opcode::Operation,
    timer::{Clock, TimedWorker, Worker},
    ConfigError, ProcessError,
};

/// The run time settings of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// The amount of instructions executed per second.
    pub cpu_hertz: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
        }
    }
}

impl Config {
    pub fn new(cpu_hertz: u64) -> Result<Self, ConfigError> {
        if cpu_hertz == 0 {
            return Err(ConfigError::ZeroHertz);
        }
        Ok(Self { cpu_hertz })
    }

    /// The time a single instruction may take.
    pub fn interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.cpu_hertz.max(1))
    }
}

/// The state of the execution loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineState {
    Running,
    /// `FX0A` is waiting for a key, the pressed key will land in `VX`.
    WaitingForKey(usize),
    /// A fault stopped the machine for good.
    Halted(ProcessError),
}

/// Drives a [`ChipSet`] against a display and a keyboard backend, while
/// the timers run on their own clock.
pub struct Runner<D, K, W = Worker>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    W: TimedWorker,
{
    chip: ChipSet,
    display: D,
    keyboard: K,
    clock: Clock<W>,
    state: MachineState,
    config: Config,
    closed: bool,
}

impl<D, K> Runner<D, K>
where
    D: DisplayCommands,
    K: KeyboardCommands,
{
    /// Will set up the devices and start the 60Hz timer thread.
    pub fn new(
        chip: ChipSet,
        display: D,
        keyboard: K,
        config: Config,
    ) -> Result<Self, ProcessError> {
        Self::with_worker(chip, display, keyboard, config)
    }
}

impl<D, K, W> Runner<D, K, W>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    W: TimedWorker,
{
    /// Same as [`Runner::new`] but the timers run on the given worker type.
    pub fn with_worker(
        mut chip: ChipSet,
        mut display: D,
        mut keyboard: K,
        config: Config,
    ) -> Result<Self, ProcessError> {
        display.init()?;
        if let Err(err) = keyboard.init() {
            display.close();
            return Err(err.into());
        }
        chip.attach_keyboard();

        let clock = Clock::start(chip.timers());
        log::info!(
            "starting {} at {} hertz",
            chip.get_name(),
            config.cpu_hertz
        );

        Ok(Self {
            chip,
            display,
            keyboard,
            clock,
            state: MachineState::Running,
            config,
            closed: false,
        })
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn chip(&self) -> &ChipSet {
        &self.chip
    }

    pub fn chip_mut(&mut self) -> &mut ChipSet {
        &mut self.chip
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Will do a single transition of the execution loop.
    pub fn tick(&mut self) -> &MachineState {
        match self.state {
            MachineState::Running => self.execute(),
            MachineState::WaitingForKey(x) => self.resume(x),
            MachineState::Halted(_) => {}
        }
        &self.state
    }

    fn execute(&mut self) {
        match self.chip.next(&mut self.display) {
            Ok(Operation::None) => {}
            Ok(Operation::Draw) => {
                if let Err(err) = self.display.update() {
                    self.halt(err.into());
                }
            }
            Ok(Operation::Wait(x)) => self.state = MachineState::WaitingForKey(x),
            Err(err) => self.halt(err),
        }
    }

    fn resume(&mut self, x: usize) {
        let key = self
            .chip
            .keyboard_mut()
            .and_then(Keyboard::take_last_press);
        if let Some(key) = key {
            match self.chip.resume_with_key(x, key) {
                Ok(()) => self.state = MachineState::Running,
                Err(err) => self.halt(err),
            }
        }
    }

    fn halt(&mut self, err: ProcessError) {
        log::error!(
            "{} halted at {:#06X}: {}",
            self.chip.get_name(),
            self.chip.program_counter(),
            err
        );
        self.state = MachineState::Halted(err);
    }

    /// Will refresh the keypad from the keyboard backend.
    pub fn poll_input(&mut self) -> Result<InputState, ProcessError> {
        match self.chip.keyboard_mut() {
            Some(keyboard) => Ok(self.keyboard.poll(keyboard)?),
            None => Ok(InputState::Continue),
        }
    }

    /// Will run the machine at the configured speed, until the user quits
    /// or a fault halts it.
    pub fn run(&mut self) -> Result<(), ProcessError> {
        let interval = self.config.interval();
        let mut deadline = Instant::now();
        loop {
            match self.poll_input() {
                Ok(InputState::Quit) => {
                    log::info!("quit requested at {:#06X}", self.chip.program_counter());
                    return Ok(());
                }
                Ok(InputState::Continue) => {}
                Err(err) => self.halt(err),
            }

            if let MachineState::Halted(err) = self.tick() {
                return Err(err.clone());
            }

            deadline += interval;
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            } else {
                // running behind, do not try to catch up
                deadline = now;
            }
        }
    }

    /// Will tear the machine down, optionally waiting for one more
    /// input event so the last frame stays visible.
    pub fn shutdown(mut self, wait_for_event: bool) -> Result<(), ProcessError> {
        let res = if wait_for_event {
            self.keyboard.wait_for_event()
        } else {
            Ok(())
        };
        self.close();
        Ok(res?)
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.clock.stop();
        self.keyboard.close();
        self.display.close();
        log::debug!("{} closed", self.chip.get_name());
    }
}

impl<D, K, W> Drop for Runner<D, K, W>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    W: TimedWorker,
{
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        devices::{MockDisplayCommands, MockKeyboardCommands},
        resources::Rom,
        DeviceError, OpcodeError, StackError,
    };

    fn chip(program: &[u8]) -> ChipSet {
        ChipSet::new(Rom::new("TEST", program.to_vec())).unwrap()
    }

    fn display() -> MockDisplayCommands {
        let mut display = MockDisplayCommands::new();
        display.expect_init().times(1).returning(|| Ok(()));
        display.expect_close().times(1).return_const(());
        display
    }

    fn keyboard() -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard.expect_init().times(1).returning(|| Ok(()));
        keyboard.expect_close().times(1).return_const(());
        keyboard
    }

    type TestRunner = Runner<MockDisplayCommands, MockKeyboardCommands>;

    #[test]
    fn test_config() {
        assert_eq!(Config::default().cpu_hertz, cpu::HERTZ);
        assert_eq!(Config::default().interval(), Duration::from_millis(2));
        assert_eq!(Config::new(0), Err(ConfigError::ZeroHertz));
        assert_eq!(Config::new(60).map(|c| c.cpu_hertz), Ok(60));
    }

    #[test]
    fn test_devices_are_opened_and_closed() {
        let runner: TestRunner =
            Runner::new(chip(&[]), display(), keyboard(), Config::default()).unwrap();
        assert_eq!(runner.state(), &MachineState::Running);
        assert!(runner.chip().get_keyboard().is_some());
        // the mocks check the close calls when they are dropped
        drop(runner);
    }

    #[test]
    fn test_display_init_failure() {
        let mut display = MockDisplayCommands::new();
        display
            .expect_init()
            .times(1)
            .returning(|| Err(DeviceError::Init("no tty".to_string())));
        let keyboard = MockKeyboardCommands::new();

        let res: Result<TestRunner, _> =
            Runner::new(chip(&[]), display, keyboard, Config::default());
        assert_eq!(
            res.err(),
            Some(ProcessError::Device(DeviceError::Init("no tty".to_string())))
        );
    }

    #[test]
    fn test_keyboard_init_failure_closes_display() {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_init()
            .times(1)
            .returning(|| Err(DeviceError::Init("no tty".to_string())));

        let res: Result<TestRunner, _> =
            Runner::new(chip(&[]), display(), keyboard, Config::default());
        assert!(matches!(res, Err(ProcessError::Device(_))));
    }

    #[test]
    fn test_tick_updates_display_on_draw() {
        let mut display = display();
        display.expect_clear().times(1).return_const(());
        display.expect_update().times(1).returning(|| Ok(()));

        // LD V0, 0x05; CLS
        let mut runner: TestRunner = Runner::new(
            chip(&[0x60, 0x05, 0x00, 0xE0]),
            display,
            keyboard(),
            Config::default(),
        )
        .unwrap();

        assert_eq!(runner.tick(), &MachineState::Running);
        assert_eq!(runner.chip().get_registers().v[0], 0x05);
        assert_eq!(runner.tick(), &MachineState::Running);
        assert_eq!(runner.chip().program_counter(), 0x204);
    }

    #[test]
    fn test_update_failure_halts() {
        let mut display = display();
        display.expect_clear().return_const(());
        display
            .expect_update()
            .returning(|| Err(DeviceError::Io("gone".to_string())));

        let mut runner: TestRunner =
            Runner::new(chip(&[0x00, 0xE0]), display, keyboard(), Config::default()).unwrap();

        assert_eq!(
            runner.tick(),
            &MachineState::Halted(ProcessError::Device(DeviceError::Io("gone".to_string())))
        );
    }

    #[test]
    fn test_halted_machine_stays_halted() {
        let mut runner: TestRunner =
            Runner::new(chip(&[0xFF, 0xFF]), display(), keyboard(), Config::default()).unwrap();

        let halted =
            MachineState::Halted(ProcessError::Opcode(OpcodeError::UnknownOpcode(0xFFFF)));
        assert_eq!(runner.tick(), &halted);
        assert_eq!(runner.tick(), &halted);
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER);
    }

    #[test]
    fn test_wait_for_key() {
        // LD V3, K
        let mut runner: TestRunner =
            Runner::new(chip(&[0xF3, 0x0A]), display(), keyboard(), Config::default()).unwrap();

        assert_eq!(runner.tick(), &MachineState::WaitingForKey(3));
        assert_eq!(runner.tick(), &MachineState::WaitingForKey(3));
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER);

        if let Some(keyboard) = runner.chip_mut().keyboard_mut() {
            keyboard.set_key(0x7, true);
        }
        assert_eq!(runner.tick(), &MachineState::Running);
        assert_eq!(runner.chip().get_registers().v[3], 0x7);
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER + 2);
    }

    #[test]
    fn test_run_until_quit() {
        let mut keyboard = keyboard();
        keyboard
            .expect_poll()
            .times(1)
            .returning(|_| Ok(InputState::Quit));

        let mut runner: TestRunner =
            Runner::new(chip(&[]), display(), keyboard, Config::default()).unwrap();
        assert_eq!(runner.run(), Ok(()));
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER);
    }

    #[test]
    fn test_run_until_fault() {
        let mut keyboard = keyboard();
        keyboard
            .expect_poll()
            .returning(|_| Ok(InputState::Continue));
        keyboard
            .expect_wait_for_event()
            .times(1)
            .returning(|| Ok(()));

        // LD V0, 0x01; RET
        let mut runner: TestRunner = Runner::new(
            chip(&[0x60, 0x01, 0x00, 0xEE]),
            display(),
            keyboard,
            Config::new(1000).unwrap(),
        )
        .unwrap();

        assert_eq!(
            runner.run(),
            Err(ProcessError::Stack(StackError::Underflow))
        );
        assert_eq!(runner.chip().program_counter(), cpu::PROGRAM_COUNTER + 2);
        assert_eq!(runner.shutdown(true), Ok(()));
    }
}
