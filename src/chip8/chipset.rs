use {
    super::Registers,
    crate::{
        definitions::{cpu, memory},
        devices::{DisplayCommands, Keyboard},
        memory::Memory,
        opcode::{self, Instruction, Opcode, Operation, ProgramCounterStep},
        resources::Rom,
        timer::TimerRegister,
        MemoryError, ProcessError,
    },
    rand::RngCore,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// The last fetched instruction word, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// The 4KB of ram, font and program included.
    pub(super) memory: Memory,
    /// The cpu registers, stack and timers.
    pub(super) registers: Registers,
    /// The keypad state, without it the key instructions are not available.
    pub(super) keyboard: Option<Keyboard>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object with the rom loaded at the program start
    pub fn new(rom: Rom) -> Result<Self, MemoryError> {
        // initialize all the memory with 0 and the fonts
        let mut ram = Memory::new();

        // write the rom data into memory
        ram.load(cpu::PROGRAM_COUNTER, rom.get_data())?;

        Ok(Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: ram,
            registers: Registers::new(),
            keyboard: None,
            rng: Box::new(rand::rngs::OsRng),
        })
    }

    /// Will replace the random number generator used by `CXKK`.
    pub fn with_rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = rng;
        self
    }

    /// Will attach a keypad, enabling `EX9E`, `EXA1` and `FX0A`.
    pub fn with_keyboard(mut self) -> Self {
        self.attach_keyboard();
        self
    }

    pub fn attach_keyboard(&mut self) {
        if self.keyboard.is_none() {
            self.keyboard = Some(Keyboard::new());
        }
    }

    /// will advance the program by a single step
    pub fn next<D>(&mut self, display: &mut D) -> Result<Operation, ProcessError>
    where
        D: DisplayCommands + ?Sized,
    {
        // get next opcode
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter())?;
        // run the opcode
        self.calc(self.opcode, display)
    }

    /// Will decode and run the given instruction word as if it
    /// was found at the current program counter.
    pub fn calc<D>(&mut self, opcode: Opcode, display: &mut D) -> Result<Operation, ProcessError>
    where
        D: DisplayCommands + ?Sized,
    {
        let instruction = Instruction::decode(opcode)?;
        log::debug!(
            "{:#06X}: {:#06X} {}",
            self.registers.program_counter,
            opcode,
            instruction
        );
        let (step, operation) = self.execute(instruction, display)?;
        self.step(step)?;
        Ok(operation)
    }

    /// Will finish a `FX0A` by storing the pressed key and moving on.
    pub fn resume_with_key(&mut self, x: usize, key: usize) -> Result<(), ProcessError> {
        log::info!("key {:X} pressed, resuming", key);
        self.registers.v[x] = key as u8;
        self.step(ProgramCounterStep::Next)?;
        Ok(())
    }

    /// Will move the program counter, a counter outside of
    /// the memory is an error and leaves the counter untouched.
    pub(super) fn step(&mut self, step: ProgramCounterStep) -> Result<(), MemoryError> {
        let pc = step.apply(self.program_counter());
        if pc >= memory::SIZE {
            return Err(MemoryError::OutOfBounds(pc));
        }
        self.registers.program_counter = pc as u16;
        Ok(())
    }

    pub fn program_counter(&self) -> usize {
        self.registers.program_counter as usize
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// The last fetched instruction word
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn get_registers(&self) -> &Registers {
        &self.registers
    }

    pub fn get_memory(&self) -> &Memory {
        &self.memory
    }

    /// Will get the keypad if one is attached.
    pub fn get_keyboard(&self) -> Option<&Keyboard> {
        self.keyboard.as_ref()
    }

    pub fn keyboard_mut(&mut self) -> Option<&mut Keyboard> {
        self.keyboard.as_mut()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.registers.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.registers.delay_timer.get_value()
    }

    /// Handles on both timers, to be driven by a [`Clock`](crate::timer::Clock).
    pub fn timers(&self) -> Vec<TimerRegister> {
        vec![
            self.registers.delay_timer.clone(),
            self.registers.sound_timer.clone(),
        ]
    }
}
