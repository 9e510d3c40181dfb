//! Opcode abstractions, functionality and constants.
use std::fmt;

use crate::{definitions::memory, memory::Memory, MemoryError, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from memory at the given pointer
/// # Arguments
///
/// - `memory` - The ram the opcode is read from
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::{memory::Memory, opcode::*, MemoryError};
/// let mut memory = Memory::new();
/// memory.load(0x200, &[0x00, 0xEE, 0x1E, 0xDA]).unwrap();
/// assert_eq!(build_opcode(&memory, 0x200), Ok(0x00EE));
/// assert_eq!(build_opcode(&memory, 0x202), Ok(0x1EDA));
/// assert_eq!(build_opcode(&memory, 0xFFF), Err(MemoryError::OutOfBounds(0x1000)));
/// ```
pub fn build_opcode(memory: &Memory, pointer: usize) -> Result<Opcode, MemoryError> {
    let data = memory.slice(pointer, memory::opcodes::SIZE)?;
    Ok(Opcode::from_be_bytes([data[0], data[1]]))
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// instruction group (the highest nibble)
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> usize;

    /// this is an opcode extractor for the opcode type `TXKK`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `KK` is a constant
    fn xkk(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a count or opcode subtype
    fn xyn(&self) -> (usize, usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        ((self & OPCODE_MASK_F000) >> (3 * BYTE_SIZE / 2)) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> usize {
        (self & OPCODE_MASK_0FFF) as usize
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xkk(), (0xE, 0xDA));
    /// ```
    fn xkk(&self) -> (usize, u8) {
        let x = self.x();
        let kk = (self & OPCODE_MASK_00FF) as u8;
        (x, kk)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, usize) {
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let x = self.x();
        let y = ((self & MASK) >> NIBBLE) as usize;
        let n = (self & OPCODE_MASK_000F) as usize;
        (x, y, n)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip over the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Calculates the program counter that follows `pc`.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next.apply(0x200), 0x202);
    /// assert_eq!(ProgramCounterStep::Skip.apply(0x200), 0x204);
    /// assert_eq!(ProgramCounterStep::Jump(0x300).apply(0x200), 0x300);
    /// ```
    #[inline]
    pub fn apply(&self, pc: usize) -> usize {
        match *self {
            ProgramCounterStep::None => pc,
            ProgramCounterStep::Next => pc + memory::opcodes::SIZE,
            ProgramCounterStep::Skip => pc + 2 * memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
/// Represents a command from the interpreter up to the execution loop.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The execution has to wait for the next key press,
    /// which then is stored in the given register.
    Wait(usize),
    /// The display changed and has to be presented.
    Draw,
}

/// Creates a sub opcode table: the enum, the lookup from
/// the raw bits and the way back.
macro_rules! sub_opcode {
    (
        $(#[$meta:meta])*
        $name:ident : $from:ty {
            $( $(#[$vmeta:meta])* $key:literal => $variant:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            fn lookup(value: $from) -> Option<Self> {
                match value {
                    $( $key => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The raw sub opcode bits.
            pub fn code(&self) -> $from {
                match self {
                    $( $name::$variant => $key, )+
                }
            }
        }
    };
}

sub_opcode! {
    /// The arithmetic group `8XYT`.
    AluOp : usize {
        /// 8XY0 - Sets VX to the value of VY.
        0x0 => Load,
        /// 8XY1 - Sets VX to VX or VY.
        0x1 => Or,
        /// 8XY2 - Sets VX to VX and VY.
        0x2 => And,
        /// 8XY3 - Sets VX to VX xor VY.
        0x3 => Xor,
        /// 8XY4 - Adds VY to VX, VF is the carry.
        0x4 => Add,
        /// 8XY5 - VY is subtracted from VX, VF is set when there is no borrow.
        0x5 => Sub,
        /// 8XY6 - Stores the least significant bit of VX in VF and shifts VX right.
        0x6 => ShiftRight,
        /// 8XY7 - Sets VX to VY minus VX, VF is set when there is no borrow.
        0x7 => SubN,
        /// 8XYE - Stores the most significant bit of VX in VF and shifts VX left.
        0xE => ShiftLeft,
    }
}

sub_opcode! {
    /// The key group `EXTT`.
    KeyOp : u8 {
        /// EX9E - Skips the next instruction if the key stored in VX is pressed.
        0x9E => Pressed,
        /// EXA1 - Skips the next instruction if the key stored in VX isn't pressed.
        0xA1 => NotPressed,
    }
}

sub_opcode! {
    /// The misc group `FXTT`.
    MiscOp : u8 {
        /// FX07 - Sets VX to the value of the delay timer.
        0x07 => GetDelayTimer,
        /// FX0A - A key press is awaited, and then stored in VX.
        0x0A => AwaitKeyPress,
        /// FX15 - Sets the delay timer to VX.
        0x15 => SetDelayTimer,
        /// FX18 - Sets the sound timer to VX.
        0x18 => SetSoundTimer,
        /// FX1E - Adds VX to I.
        0x1E => AddVxToI,
        /// FX29 - Sets I to the location of the glyph for the digit in VX.
        0x29 => SetIToSprite,
        /// FX33 - Stores the binary-coded decimal representation of VX at I, I+1 and I+2.
        0x33 => StoreBCD,
        /// FX55 - Stores V0 to VX (including VX) in memory starting at address I.
        0x55 => StoreV0ToVx,
        /// FX65 - Fills V0 to VX (including VX) with values from memory starting at address I.
        0x65 => FillV0ToVx,
    }
}

/// The decoded instruction set, one variant per mnemonic or sub group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// `0NNN` - Calls a machine code routine, ignored.
    Sys { nnn: usize },
    /// `00E0` - Clears the screen.
    Clear,
    /// `00EE` - Returns from a subroutine.
    Return,
    /// `1NNN` - Jumps to address `NNN`.
    Jump { nnn: usize },
    /// `2NNN` - Calls subroutine at `NNN`.
    Call { nnn: usize },
    /// `3XKK` - Skips the next instruction if `VX` equals `KK`.
    SkipEqual { x: usize, kk: u8 },
    /// `4XKK` - Skips the next instruction if `VX` doesn't equal `KK`.
    SkipNotEqual { x: usize, kk: u8 },
    /// `5XY0` - Skips the next instruction if `VX` equals `VY`.
    SkipRegEqual { x: usize, y: usize },
    /// `6XKK` - Sets `VX` to `KK`.
    Load { x: usize, kk: u8 },
    /// `7XKK` - Adds `KK` to `VX`, the carry flag is not changed.
    Add { x: usize, kk: u8 },
    /// `8XYT` - Arithmetic between `VX` and `VY`.
    Alu { op: AluOp, x: usize, y: usize },
    /// `9XY0` - Skips the next instruction if `VX` doesn't equal `VY`.
    SkipRegNotEqual { x: usize, y: usize },
    /// `ANNN` - Sets `I` to the address `NNN`.
    LoadIndex { nnn: usize },
    /// `BNNN` - Jumps to the address `NNN` plus `V0`.
    JumpV0 { nnn: usize },
    /// `CXKK` - Sets `VX` to a random byte and `KK`.
    Random { x: usize, kk: u8 },
    /// `DXYN` - Draws the `N` byte sprite at `I` to `(VX, VY)`, `VF` is the collision.
    Draw { x: usize, y: usize, n: usize },
    /// `EXTT` - Key checks.
    Key { op: KeyOp, x: usize },
    /// `FXTT` - Timers, memory and the key wait.
    Misc { op: MiscOp, x: usize },
}

/// Makes sure the group handler was handed a word of its own group.
#[inline]
fn check_group(group: u8, opcode: Opcode) -> Result<(), OpcodeError> {
    if opcode.t() == group {
        Ok(())
    } else {
        Err(OpcodeError::GroupMismatch { group, opcode })
    }
}

#[inline]
fn unknown<T>(opcode: Opcode) -> Result<T, OpcodeError> {
    Err(OpcodeError::UnknownOpcode(opcode))
}

/// `0NNN`, `00E0`, `00EE`
pub fn decode_zero(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    check_group(0x0, opcode)?;
    // only the low byte picks the instruction
    Ok(match opcode & OPCODE_MASK_00FF {
        0xE0 => Instruction::Clear,
        0xEE => Instruction::Return,
        _ => Instruction::Sys { nnn: opcode.nnn() },
    })
}

/// `1NNN`, `2NNN`, `ANNN`, `BNNN`
pub fn decode_address(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    let nnn = opcode.nnn();
    match opcode.t() {
        0x1 => Ok(Instruction::Jump { nnn }),
        0x2 => Ok(Instruction::Call { nnn }),
        0xA => Ok(Instruction::LoadIndex { nnn }),
        0xB => Ok(Instruction::JumpV0 { nnn }),
        group => Err(OpcodeError::GroupMismatch { group, opcode }),
    }
}

/// `3XKK`, `4XKK`, `6XKK`, `7XKK`, `CXKK`
pub fn decode_immediate(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    let (x, kk) = opcode.xkk();
    match opcode.t() {
        0x3 => Ok(Instruction::SkipEqual { x, kk }),
        0x4 => Ok(Instruction::SkipNotEqual { x, kk }),
        0x6 => Ok(Instruction::Load { x, kk }),
        0x7 => Ok(Instruction::Add { x, kk }),
        0xC => Ok(Instruction::Random { x, kk }),
        group => Err(OpcodeError::GroupMismatch { group, opcode }),
    }
}

/// `5XY0`, `9XY0`
pub fn decode_register_skip(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    match (opcode.t(), opcode.xyn()) {
        (0x5, (x, y, 0)) => Ok(Instruction::SkipRegEqual { x, y }),
        (0x9, (x, y, 0)) => Ok(Instruction::SkipRegNotEqual { x, y }),
        (0x5, _) | (0x9, _) => unknown(opcode),
        (group, _) => Err(OpcodeError::GroupMismatch { group, opcode }),
    }
}

/// `8XYT`
pub fn decode_alu(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    check_group(0x8, opcode)?;
    let (x, y, n) = opcode.xyn();
    match AluOp::lookup(n) {
        Some(op) => Ok(Instruction::Alu { op, x, y }),
        None => unknown(opcode),
    }
}

/// `DXYN`
pub fn decode_draw(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    check_group(0xD, opcode)?;
    let (x, y, n) = opcode.xyn();
    Ok(Instruction::Draw { x, y, n })
}

/// `EX9E`, `EXA1`
pub fn decode_key(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    check_group(0xE, opcode)?;
    let (x, kk) = opcode.xkk();
    match KeyOp::lookup(kk) {
        Some(op) => Ok(Instruction::Key { op, x }),
        None => unknown(opcode),
    }
}

/// `FXTT`
pub fn decode_misc(opcode: Opcode) -> Result<Instruction, OpcodeError> {
    check_group(0xF, opcode)?;
    let (x, kk) = opcode.xkk();
    match MiscOp::lookup(kk) {
        Some(op) => Ok(Instruction::Misc { op, x }),
        None => unknown(opcode),
    }
}

impl Instruction {
    /// Decodes a single instruction word.
    ///
    /// # Example
    /// ```rust
    /// # use chip::{opcode::*, OpcodeError};
    /// assert_eq!(Instruction::decode(0x6A42), Ok(Instruction::Load { x: 0xA, kk: 0x42 }));
    /// assert_eq!(Instruction::decode(0x8AB9), Err(OpcodeError::UnknownOpcode(0x8AB9)));
    /// ```
    pub fn decode(opcode: Opcode) -> Result<Self, OpcodeError> {
        match opcode.t() {
            0x0 => decode_zero(opcode),
            0x1 | 0x2 | 0xA | 0xB => decode_address(opcode),
            0x3 | 0x4 | 0x6 | 0x7 | 0xC => decode_immediate(opcode),
            0x5 | 0x9 => decode_register_skip(opcode),
            0x8 => decode_alu(opcode),
            0xD => decode_draw(opcode),
            0xE => decode_key(opcode),
            0xF => decode_misc(opcode),
            _ => unknown(opcode),
        }
    }

    /// Builds the instruction word back.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// let draw = Instruction::Draw { x: 1, y: 2, n: 5 };
    /// assert_eq!(draw.encode(), 0xD125);
    /// ```
    pub fn encode(&self) -> Opcode {
        #[inline]
        fn addr(t: u16, nnn: usize) -> Opcode {
            (t << 12) | (nnn as u16 & OPCODE_MASK_0FFF)
        }
        #[inline]
        fn xkk(t: u16, x: usize, kk: u8) -> Opcode {
            (t << 12) | ((x as u16 & 0xF) << 8) | kk as u16
        }
        #[inline]
        fn xyn(t: u16, x: usize, y: usize, n: usize) -> Opcode {
            (t << 12) | ((x as u16 & 0xF) << 8) | ((y as u16 & 0xF) << 4) | (n as u16 & 0xF)
        }

        match *self {
            Instruction::Sys { nnn } => addr(0x0, nnn),
            Instruction::Clear => 0x00E0,
            Instruction::Return => 0x00EE,
            Instruction::Jump { nnn } => addr(0x1, nnn),
            Instruction::Call { nnn } => addr(0x2, nnn),
            Instruction::SkipEqual { x, kk } => xkk(0x3, x, kk),
            Instruction::SkipNotEqual { x, kk } => xkk(0x4, x, kk),
            Instruction::SkipRegEqual { x, y } => xyn(0x5, x, y, 0),
            Instruction::Load { x, kk } => xkk(0x6, x, kk),
            Instruction::Add { x, kk } => xkk(0x7, x, kk),
            Instruction::Alu { op, x, y } => xyn(0x8, x, y, op.code()),
            Instruction::SkipRegNotEqual { x, y } => xyn(0x9, x, y, 0),
            Instruction::LoadIndex { nnn } => addr(0xA, nnn),
            Instruction::JumpV0 { nnn } => addr(0xB, nnn),
            Instruction::Random { x, kk } => xkk(0xC, x, kk),
            Instruction::Draw { x, y, n } => xyn(0xD, x, y, n),
            Instruction::Key { op, x } => xkk(0xE, x, op.code()),
            Instruction::Misc { op, x } => xkk(0xF, x, op.code()),
        }
    }
}

impl fmt::Display for Instruction {
    /// Prints the instruction in the usual assembly notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Sys { nnn } => write!(f, "SYS {:#05X}", nnn),
            Instruction::Clear => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { nnn } => write!(f, "JP {:#05X}", nnn),
            Instruction::Call { nnn } => write!(f, "CALL {:#05X}", nnn),
            Instruction::SkipEqual { x, kk } => write!(f, "SE V{:X}, {:#04X}", x, kk),
            Instruction::SkipNotEqual { x, kk } => write!(f, "SNE V{:X}, {:#04X}", x, kk),
            Instruction::SkipRegEqual { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::Load { x, kk } => write!(f, "LD V{:X}, {:#04X}", x, kk),
            Instruction::Add { x, kk } => write!(f, "ADD V{:X}, {:#04X}", x, kk),
            Instruction::Alu { op, x, y } => {
                let name = match op {
                    AluOp::Load => "LD",
                    AluOp::Or => "OR",
                    AluOp::And => "AND",
                    AluOp::Xor => "XOR",
                    AluOp::Add => "ADD",
                    AluOp::Sub => "SUB",
                    AluOp::ShiftRight => "SHR",
                    AluOp::SubN => "SUBN",
                    AluOp::ShiftLeft => "SHL",
                };
                write!(f, "{} V{:X}, V{:X}", name, x, y)
            }
            Instruction::SkipRegNotEqual { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadIndex { nnn } => write!(f, "LD I, {:#05X}", nnn),
            Instruction::JumpV0 { nnn } => write!(f, "JP V0, {:#05X}", nnn),
            Instruction::Random { x, kk } => write!(f, "RND V{:X}, {:#04X}", x, kk),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::Key { op, x } => match op {
                KeyOp::Pressed => write!(f, "SKP V{:X}", x),
                KeyOp::NotPressed => write!(f, "SKNP V{:X}", x),
            },
            Instruction::Misc { op, x } => match op {
                MiscOp::GetDelayTimer => write!(f, "LD V{:X}, DT", x),
                MiscOp::AwaitKeyPress => write!(f, "LD V{:X}, K", x),
                MiscOp::SetDelayTimer => write!(f, "LD DT, V{:X}", x),
                MiscOp::SetSoundTimer => write!(f, "LD ST, V{:X}", x),
                MiscOp::AddVxToI => write!(f, "ADD I, V{:X}", x),
                MiscOp::SetIToSprite => write!(f, "LD F, V{:X}", x),
                MiscOp::StoreBCD => write!(f, "LD B, V{:X}", x),
                MiscOp::StoreV0ToVx => write!(f, "LD [I], V{:X}", x),
                MiscOp::FillV0ToVx => write!(f, "LD V{:X}, [I]", x),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields() {
        let opcode: Opcode = 0x7ABC;
        assert_eq!(opcode.t(), 0x7);
        assert_eq!(opcode.nnn(), 0xABC);
        assert_eq!(opcode.x(), 0xA);
        assert_eq!(opcode.xkk(), (0xA, 0xBC));
        assert_eq!(opcode.xyn(), (0xA, 0xB, 0xC));
    }

    #[test]
    fn test_decode_multiple() {
        let tests = [
            // Zero
            (0x00E0, Ok(Instruction::Clear)),
            (0x00EE, Ok(Instruction::Return)),
            (0x0123, Ok(Instruction::Sys { nnn: 0x123 })),
            (0x0000, Ok(Instruction::Sys { nnn: 0x000 })),
            (0x01E0, Ok(Instruction::Clear)),
            (0x0AEE, Ok(Instruction::Return)),
            (0x00E1, Ok(Instruction::Sys { nnn: 0x0E1 })),
            // Address
            (0x1919, Ok(Instruction::Jump { nnn: 0x919 })),
            (0x2222, Ok(Instruction::Call { nnn: 0x222 })),
            (0xA222, Ok(Instruction::LoadIndex { nnn: 0x222 })),
            (0xB222, Ok(Instruction::JumpV0 { nnn: 0x222 })),
            // Immediate
            (0x3123, Ok(Instruction::SkipEqual { x: 0x1, kk: 0x23 })),
            (0x4123, Ok(Instruction::SkipNotEqual { x: 0x1, kk: 0x23 })),
            (0x6123, Ok(Instruction::Load { x: 0x1, kk: 0x23 })),
            (0x7123, Ok(Instruction::Add { x: 0x1, kk: 0x23 })),
            (0xC123, Ok(Instruction::Random { x: 0x1, kk: 0x23 })),
            // Register skips
            (0x5120, Ok(Instruction::SkipRegEqual { x: 0x1, y: 0x2 })),
            (0x5121, Err(OpcodeError::UnknownOpcode(0x5121))),
            (0x9120, Ok(Instruction::SkipRegNotEqual { x: 0x1, y: 0x2 })),
            (0x9121, Err(OpcodeError::UnknownOpcode(0x9121))),
            // Alu
            (0x8120, Ok(Instruction::Alu { op: AluOp::Load, x: 1, y: 2 })),
            (0x8124, Ok(Instruction::Alu { op: AluOp::Add, x: 1, y: 2 })),
            (0x8127, Ok(Instruction::Alu { op: AluOp::SubN, x: 1, y: 2 })),
            (0x812E, Ok(Instruction::Alu { op: AluOp::ShiftLeft, x: 1, y: 2 })),
            (0x8128, Err(OpcodeError::UnknownOpcode(0x8128))),
            (0x812F, Err(OpcodeError::UnknownOpcode(0x812F))),
            // Draw
            (0xD123, Ok(Instruction::Draw { x: 1, y: 2, n: 3 })),
            // Key
            (0xE19E, Ok(Instruction::Key { op: KeyOp::Pressed, x: 1 })),
            (0xE1A1, Ok(Instruction::Key { op: KeyOp::NotPressed, x: 1 })),
            (0xE111, Err(OpcodeError::UnknownOpcode(0xE111))),
            // Misc
            (0xF007, Ok(Instruction::Misc { op: MiscOp::GetDelayTimer, x: 0 })),
            (0xF30A, Ok(Instruction::Misc { op: MiscOp::AwaitKeyPress, x: 3 })),
            (0xF015, Ok(Instruction::Misc { op: MiscOp::SetDelayTimer, x: 0 })),
            (0xF018, Ok(Instruction::Misc { op: MiscOp::SetSoundTimer, x: 0 })),
            (0xF01E, Ok(Instruction::Misc { op: MiscOp::AddVxToI, x: 0 })),
            (0xF029, Ok(Instruction::Misc { op: MiscOp::SetIToSprite, x: 0 })),
            (0xF033, Ok(Instruction::Misc { op: MiscOp::StoreBCD, x: 0 })),
            (0xFE55, Ok(Instruction::Misc { op: MiscOp::StoreV0ToVx, x: 0xE })),
            (0xF065, Ok(Instruction::Misc { op: MiscOp::FillV0ToVx, x: 0 })),
            (0xF0AA, Err(OpcodeError::UnknownOpcode(0xF0AA))),
        ];
        for (value, res) in tests {
            assert_eq!(Instruction::decode(value), res, "decoding {:#06X}", value);
        }
    }

    #[test]
    fn test_group_mismatch() {
        assert_eq!(
            decode_alu(0x7123),
            Err(OpcodeError::GroupMismatch { group: 0x8, opcode: 0x7123 })
        );
        assert_eq!(
            decode_zero(0x1000),
            Err(OpcodeError::GroupMismatch { group: 0x0, opcode: 0x1000 })
        );
        assert_eq!(
            decode_misc(0xE19E),
            Err(OpcodeError::GroupMismatch { group: 0xF, opcode: 0xE19E })
        );
        assert_eq!(
            decode_address(0x3123),
            Err(OpcodeError::GroupMismatch { group: 0x3, opcode: 0x3123 })
        );
        assert_eq!(
            decode_register_skip(0x8120),
            Err(OpcodeError::GroupMismatch { group: 0x8, opcode: 0x8120 })
        );
    }

    #[test]
    fn test_encode_matches_word() {
        for opcode in [0x00E0, 0x00EE, 0x1234, 0x5AB0, 0x8CDE, 0xD01F, 0xEBA1, 0xF965] {
            let instruction = Instruction::decode(opcode).unwrap();
            assert_eq!(instruction.encode(), opcode);
        }
    }

    #[test]
    fn test_disassembly() {
        let tests = [
            (0x00E0, "CLS"),
            (0x1ABC, "JP 0xABC"),
            (0x6A0F, "LD VA, 0x0F"),
            (0x8126, "SHR V1, V2"),
            (0xD125, "DRW V1, V2, 5"),
            (0xF233, "LD B, V2"),
            (0xE3A1, "SKNP V3"),
        ];
        for (opcode, text) in tests {
            let instruction = Instruction::decode(opcode).unwrap();
            assert_eq!(instruction.to_string(), text);
        }
    }
}
