use crate::{
    definitions::cpu,
    timer::TimerRegister,
    StackError,
};

/// The register file of the chip.
///
/// Only the two timers are shared with the clock thread, all other
/// fields are owned by the executor alone.
#[derive(Debug, Clone)]
pub struct Registers {
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub v: [u8; cpu::register::SIZE],
    /// The index register `I`, it is only validated when it is dereferenced.
    pub index: u16,
    /// Points at the next instruction to fetch.
    pub program_counter: u16,
    /// `0` means the stack is empty, otherwise it points at the last pushed entry.
    pub stack_pointer: u8,
    /// The stack is only used to store return addresses when subroutines are called.
    pub stack: [u16; cpu::stack::SIZE],
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    /// Counts down at 60 hertz, until it reaches 0.
    pub delay_timer: TimerRegister,
    /// Sound timer: This timer is used for sound effects.
    /// Counts down at 60 hertz, until it reaches 0.
    pub sound_timer: TimerRegister,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            v: [0; cpu::register::SIZE],
            index: 0,
            program_counter: cpu::PROGRAM_COUNTER as u16,
            stack_pointer: 0,
            stack: [0; cpu::stack::SIZE],
            delay_timer: TimerRegister::new(0),
            sound_timer: TimerRegister::new(0),
        }
    }

    /// Will push the return address to the stack, the stack pointer
    /// is incremented before the write.
    pub fn push_stack(&mut self, pointer: u16) -> Result<(), StackError> {
        let next = self.stack_pointer as usize + 1;
        if next >= self.stack.len() {
            return Err(StackError::Overflow);
        }
        self.stack_pointer = next as u8;
        self.stack[next] = pointer;
        Ok(())
    }

    /// Will pop the last return address, the stack pointer
    /// is decremented after the read.
    pub fn pop_stack(&mut self) -> Result<u16, StackError> {
        if self.stack_pointer == 0 {
            return Err(StackError::Underflow);
        }
        let pointer = self.stack[self.stack_pointer as usize];
        self.stack_pointer -= 1;
        Ok(pointer)
    }

    /// The flag register `VF`
    pub fn flag(&self) -> u8 {
        self.v[cpu::register::LAST]
    }

    pub(crate) fn set_flag(&mut self, value: u8) {
        self.v[cpu::register::LAST] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let registers = Registers::new();
        assert_eq!(registers.program_counter, 0x200);
        assert_eq!(registers.stack_pointer, 0);
        assert_eq!(registers.index, 0);
        assert!(registers.v.iter().all(|&v| v == 0));
        assert_eq!(registers.delay_timer.get_value(), 0);
        assert_eq!(registers.sound_timer.get_value(), 0);
    }

    #[test]
    /// testing internal functionality of popping and pushing into the stack
    fn test_push_pop_stack() {
        let mut registers = Registers::new();
        let base = 0x0333;

        // slot zero stays unused, it marks the empty stack
        for i in 1..cpu::stack::SIZE {
            assert_eq!(Ok(()), registers.push_stack(base + i as u16 * 8));
            assert_eq!(registers.stack_pointer as usize, i);
        }
        assert_eq!(Err(StackError::Overflow), registers.push_stack(base));
        assert_eq!(registers.stack_pointer as usize, cpu::stack::SIZE - 1);

        for i in (1..cpu::stack::SIZE).rev() {
            assert_eq!(Ok(base + i as u16 * 8), registers.pop_stack());
        }
        assert_eq!(registers.stack_pointer, 0);
        assert_eq!(Err(StackError::Underflow), registers.pop_stack());
        assert_eq!(registers.stack_pointer, 0);
    }
}
