use thiserror::Error;

use crate::opcode::Opcode;

#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("Device failure '{0}'.")]
    Device(#[from] DeviceError),
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unknown opcode was used {0:#06X?}.")]
    UnknownOpcode(Opcode),
    #[error("The opcode {0:#06X?} is known but not implemented on this machine.")]
    NotImplemented(Opcode),
    #[error("The opcode {opcode:#06X?} was handed to the handler of group {group:#X?}.")]
    GroupMismatch { group: u8, opcode: Opcode },
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum MemoryError {
    #[error("Address {0:#06X?} is out of bounds.")]
    OutOfBounds(usize),
}

#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Overflow,
    #[error("Stack is empty!")]
    Underflow,
}

/// Failures reported by the display and keyboard backends.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum DeviceError {
    #[error("The device could not be initialized: {0}")]
    Init(String),
    #[error("The device failed during io: {0}")]
    Io(String),
}

impl From<std::io::Error> for DeviceError {
    fn from(err: std::io::Error) -> Self {
        DeviceError::Io(err.to_string())
    }
}

/// Invalid run time settings.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigError {
    #[error("The cpu has to run at one hertz at least.")]
    ZeroHertz,
}
