use crate::{
    definitions::display,
    devices::DisplayCommands,
    opcode::{AluOp, Instruction, KeyOp, MiscOp, Operation, ProgramCounterStep},
    OpcodeError, ProcessError,
};

use super::ChipSet;

type Step = Result<(ProgramCounterStep, Operation), ProcessError>;

#[inline]
fn next() -> Step {
    Ok((ProgramCounterStep::Next, Operation::None))
}

#[inline]
fn flow(step: ProgramCounterStep) -> Step {
    Ok((step, Operation::None))
}

impl ChipSet {
    /// Runs a single decoded instruction and reports how the program
    /// counter has to move on. Nothing is changed if an error is returned.
    pub(super) fn execute<D>(&mut self, instruction: Instruction, display: &mut D) -> Step
    where
        D: DisplayCommands + ?Sized,
    {
        match instruction {
            Instruction::Sys { nnn } => {
                // 0NNN
                // machine code routines do not exist here, modern interpreters ignore them
                log::debug!("ignoring machine code call to {:#05X}", nnn);
                next()
            }
            Instruction::Clear => {
                // 00E0
                display.clear();
                Ok((ProgramCounterStep::Next, Operation::Draw))
            }
            Instruction::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.registers.pop_stack()?;
                flow(ProgramCounterStep::Jump(pc as usize))
            }
            Instruction::Jump { nnn } => {
                // 1NNN
                flow(ProgramCounterStep::Jump(nnn))
            }
            Instruction::Call { nnn } => {
                // 2NNN
                // the return address is the instruction after the call
                let ret = ProgramCounterStep::Next.apply(self.program_counter());
                self.registers.push_stack(ret as u16)?;
                flow(ProgramCounterStep::Jump(nnn))
            }
            Instruction::SkipEqual { x, kk } => {
                flow(ProgramCounterStep::cond(self.registers.v[x] == kk))
            }
            Instruction::SkipNotEqual { x, kk } => {
                flow(ProgramCounterStep::cond(self.registers.v[x] != kk))
            }
            Instruction::SkipRegEqual { x, y } => flow(ProgramCounterStep::cond(
                self.registers.v[x] == self.registers.v[y],
            )),
            Instruction::SkipRegNotEqual { x, y } => flow(ProgramCounterStep::cond(
                self.registers.v[x] != self.registers.v[y],
            )),
            Instruction::Load { x, kk } => {
                self.registers.v[x] = kk;
                next()
            }
            Instruction::Add { x, kk } => {
                // let VX overflow, but ignore carry
                self.registers.v[x] = self.registers.v[x].wrapping_add(kk);
                next()
            }
            Instruction::Alu { op, x, y } => {
                self.alu(op, x, y);
                next()
            }
            Instruction::LoadIndex { nnn } => {
                self.registers.index = nnn as u16;
                next()
            }
            Instruction::JumpV0 { nnn } => {
                // BNNN
                let v0 = self.registers.v[0] as usize;
                flow(ProgramCounterStep::Jump(nnn + v0))
            }
            Instruction::Random { x, kk } => {
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand: [u8; 1] = [0];
                self.rng.fill_bytes(&mut rand);
                self.registers.v[x] = kk & rand[0];
                next()
            }
            Instruction::Draw { x, y, n } => self.draw(x, y, n, display),
            Instruction::Key { op, x } => self.key(instruction, op, x),
            Instruction::Misc { op, x } => self.misc(instruction, op, x),
        }
    }

    /// The `8XYT` group. The flag is calculated from the operands and
    /// written last, so it wins if `X` is `F`.
    fn alu(&mut self, op: AluOp, x: usize, y: usize) {
        let vx = self.registers.v[x];
        let vy = self.registers.v[y];

        let (res, flag) = match op {
            AluOp::Load => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            AluOp::Sub => (vx.wrapping_sub(vy), Some((vx > vy) as u8)),
            AluOp::ShiftRight => (vx >> 1, Some(vx & 1)),
            AluOp::SubN => (vy.wrapping_sub(vx), Some((vy > vx) as u8)),
            AluOp::ShiftLeft => (vx << 1, Some((vx >> 7) & 1)),
        };

        self.registers.v[x] = res;
        if let Some(flag) = flag {
            self.registers.set_flag(flag);
        }
    }

    /// `DXYN`
    /// Draws a sprite at coordinate `(VX, VY)` that has a width of 8 pixels and a height of `N`
    /// pixels. `VF` is set to 1 if any screen pixels are flipped from set to unset.
    fn draw<D>(&mut self, x: usize, y: usize, n: usize, display: &mut D) -> Step
    where
        D: DisplayCommands + ?Sized,
    {
        let sprite = self.memory.slice(self.registers.index as usize, n)?;
        let collision = display.draw(self.registers.v[x], self.registers.v[y], sprite);
        self.registers.set_flag(collision);
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    /// `EX9E` and `EXA1`, only available with an attached keypad.
    fn key(&mut self, instruction: Instruction, op: KeyOp, x: usize) -> Step {
        let keyboard = self
            .keyboard
            .as_ref()
            .ok_or_else(|| OpcodeError::NotImplemented(instruction.encode()))?;
        let pressed = keyboard.is_pressed(self.registers.v[x] as usize);
        let step = match op {
            KeyOp::Pressed => ProgramCounterStep::cond(pressed),
            KeyOp::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        flow(step)
    }

    /// The `FXTT` group.
    fn misc(&mut self, instruction: Instruction, op: MiscOp, x: usize) -> Step {
        match op {
            MiscOp::GetDelayTimer => {
                self.registers.v[x] = self.registers.delay_timer.get_value();
            }
            MiscOp::AwaitKeyPress => {
                // FX0A
                // A key press is awaited, and then stored in VX. All execution
                // halts until then, the program counter is moved on resume.
                let keyboard = self
                    .keyboard
                    .as_mut()
                    .ok_or_else(|| OpcodeError::NotImplemented(instruction.encode()))?;
                // only presses after this point count
                keyboard.take_last_press();
                log::info!("waiting for a key press into V{:X}", x);
                return Ok((ProgramCounterStep::None, Operation::Wait(x)));
            }
            MiscOp::SetDelayTimer => {
                self.registers.delay_timer.set_value(self.registers.v[x]);
            }
            MiscOp::SetSoundTimer => {
                self.registers.sound_timer.set_value(self.registers.v[x]);
            }
            MiscOp::AddVxToI => {
                // VF is not affected, the range is checked on use
                self.registers.index = self
                    .registers
                    .index
                    .wrapping_add(self.registers.v[x] as u16);
            }
            MiscOp::SetIToSprite => {
                let address = display::fontset::LOCATION as u16
                    + display::fontset::GLYPH_SIZE as u16 * self.registers.v[x] as u16;
                self.registers.index = address;
            }
            MiscOp::StoreBCD => {
                let r = self.registers.v[x];
                let bcd = self.memory.slice_mut(self.registers.index as usize, 3)?;
                bcd[0] = r / 100; // 246u8 / 100 => 2
                bcd[1] = r / 10 % 10; // 246u8 / 10 => 24 % 10 => 4
                bcd[2] = r % 10; // 246u8 % 10 => 6
            }
            MiscOp::StoreV0ToVx => {
                // I itself is left unmodified
                let index = self.registers.index as usize;
                self.memory
                    .slice_mut(index, x + 1)?
                    .copy_from_slice(&self.registers.v[..=x]);
            }
            MiscOp::FillV0ToVx => {
                let index = self.registers.index as usize;
                let data = self.memory.slice(index, x + 1)?;
                self.registers.v[..=x].copy_from_slice(data);
            }
        }
        next()
    }
}
