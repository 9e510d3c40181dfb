//! The pretty print implementation for the [`registers`](super::Registers) and the
//! whole [`chipset`](super::ChipSet).
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::{ChipSet, Registers};
use crate::{
    definitions::memory,
    opcode::{Instruction, Opcode},
};
use std::fmt::{self, Write};

/// The length of the pretty print data
/// as a single instruction is u16 the octa
/// size will show how often the block shall
/// be repeated has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

/// The amount of data registers printed in a single line
const REGISTERS_PER_LINE: usize = 4;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';

/// The internal length of the given data
/// as the data is stored as u8 and an opcode
/// is u16 long
const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;

/// The values that are used when there are at lease two rows of zeros.
const FILLER_BASE: &str = "...";

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PC={:#06X}({}); SP={:#04X}; I={:#06X}({});",
            self.program_counter, self.program_counter, self.stack_pointer, self.index, self.index
        )?;
        for (line, chunk) in self.v.chunks(REGISTERS_PER_LINE).enumerate() {
            for (offset, value) in chunk.iter().enumerate() {
                if offset > 0 {
                    f.write_char(' ')?;
                }
                write!(
                    f,
                    "V{:X}={:#04X}",
                    line * REGISTERS_PER_LINE + offset,
                    value
                )?;
            }
            f.write_char(END_OF_LINE)?;
        }
        write!(
            f,
            "DT={:#04X}; ST={:#04X}",
            self.delay_timer.get_value(),
            self.sound_timer.get_value()
        )
    }
}

/// this struct will simulate a single row of opcodes (only in this context)
struct Row {
    from: usize,
    to: usize,
    data: [Opcode; HEX_PRINT_STEP],
    only_null: bool,
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06X} - {:#06X} :", self.from, self.to)?;
        if self.only_null {
            return write!(f, " {}", FILLER_BASE);
        }
        for entry in self.data.iter() {
            write!(f, " {:#06X}", entry)?;
        }
        Ok(())
    }
}

/// will pretty print the content of the raw memory
/// this functions assumes the full data to be passed
/// as the offset is calculated from the beginning of the
/// memory block
fn memory_printer(data: &[u8], indent: usize) -> Result<String, fmt::Error> {
    let mut rows: Vec<Row> = Vec::with_capacity(data.len() / POINTER_INCREMENT);

    for (chunk_index, chunk) in data.chunks(POINTER_INCREMENT).enumerate() {
        let from = chunk_index * POINTER_INCREMENT;
        let to = from + chunk.len() - 1;

        let mut opcodes = [0; HEX_PRINT_STEP];
        for (opcode, pair) in opcodes
            .iter_mut()
            .zip(chunk.chunks(memory::opcodes::SIZE))
        {
            *opcode = pair
                .iter()
                .fold(0, |acc, &byte| (acc << 8) | byte as Opcode);
        }
        let only_null = opcodes.iter().all(|&opcode| opcode == 0);

        let mut row = Row {
            from,
            to,
            data: opcodes,
            only_null,
        };

        // merge the runs of zero rows into a single line
        if only_null {
            if let Some(last_row) = rows.last() {
                if last_row.only_null {
                    row.from = last_row.from;
                    rows.pop();
                }
            }
        }
        rows.push(row);
    }

    let mut string = String::new();
    for row in rows {
        indent_helper(&mut string, indent);
        if row.only_null && row.to - row.from < POINTER_INCREMENT {
            // a single empty row is printed as is
            let single = Row {
                only_null: false,
                ..row
            };
            write!(string, "{}", single)?;
        } else {
            write!(string, "{}", row)?;
        }
        string.push(END_OF_LINE);
    }
    // Remove unneeded new line
    if string.ends_with(END_OF_LINE) {
        string.pop();
    }
    Ok(string)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let instruction = match Instruction::decode(self.opcode) {
            Ok(instruction) => instruction.to_string(),
            Err(_) => String::from("???"),
        };

        let mut registers = String::new();
        for line in self.registers.to_string().lines() {
            indent_helper(&mut registers, 1);
            registers.push_str(line);
            registers.push(END_OF_LINE);
        }
        registers.pop();

        let mem = memory_printer(self.memory.as_slice(), 1)?;

        write!(
            f,
            "Chipset {{\n\
                Program Name : {}\n\
                Opcode : {:#06X} ({})\n\
                Registers :\n{}\n\
                Memory :\n{}\n\
                }}",
            self.name, self.opcode, instruction, registers, mem
        )
    }
}
