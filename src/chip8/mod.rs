//! The full implementation of the chip8 virtual machine, from the register file
//! and the opcodes to an option to pretty print them.
mod chipset;
mod opcodes;
mod print;
mod registers;

/// reexport chipset structs and data for simpler usage
pub use chipset::*;
pub use registers::*;
