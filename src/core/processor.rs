use crate::config::Config;
use crate::consts;
use crate::core::instruction::Instruction;
use crate::core::ram::{DisplayBuffer, KeyboardBuffer, Ram};
use crate::core::rom::Rom;
use crate::error::{Chip8Error, Result};
use log::{debug, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    RedrawScreen,
    Continue,
    Waiting,
    Halted,
}

/// Fx0A state. While `blocked`, `step()` only samples the keyboard.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWait {
    pub blocked: bool,
    pub register: u8,
    pub last_key: Option<u8>,
}

/// Where the program counter goes after an instruction.
enum Flow {
    Next,
    Skip,
    Goto(u16),
}

#[derive(Debug)]
pub struct Processor {
    pub stack: [u16; consts::STACK_SIZE],
    pub registers: [u8; consts::REG_COUNT],
    pub idx_register: u16,
    pub pc: u16,
    pub stack_pointer: u8,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub key_wait: KeyWait,
    pub ram: Ram,
    pub display_buffer: Rc<RefCell<DisplayBuffer>>,
    pub keyboard_buffer: Rc<RefCell<KeyboardBuffer>>,
    config: Config,
    rng: StdRng,
}

impl Processor {
    pub fn new(
        config: Config,
        display_buffer_: Rc<RefCell<DisplayBuffer>>,
        keyboard_buffer_: Rc<RefCell<KeyboardBuffer>>,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Processor {
            stack: [0; consts::STACK_SIZE],
            registers: [0; consts::REG_COUNT],
            idx_register: 0,
            pc: config.load_address,
            stack_pointer: 0,
            delay_timer: 0,
            sound_timer: 0,
            key_wait: KeyWait::default(),
            ram: Ram::default(),
            display_buffer: display_buffer_,
            keyboard_buffer: keyboard_buffer_,
            config,
            rng,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn load_program(&mut self, rom: &Rom) -> Result<()> {
        self.load_bytes(&rom.buffer)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ram
            .load_bulk(bytes, self.config.load_address as usize)?;
        debug!(
            "loaded {} bytes at {:#05X}",
            bytes.len(),
            self.config.load_address
        );
        Ok(())
    }

    pub fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn waiting_for_key(&self) -> bool {
        self.key_wait.blocked
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    /// One timer period: both timers count down towards zero.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    /// Executes at most one instruction.
    ///
    /// A program counter past the last full instruction word halts the
    /// processor; every later call is a no-op returning `Halted`. While a
    /// key wait is pending the call only samples the keyboard. Errors leave
    /// the processor as it was before the call.
    pub fn step(&mut self) -> Result<CycleStatus> {
        let pc = self.pc as usize;
        if pc + consts::OP_CODE_BYTES > self.ram.capacity() {
            trace!("halted at {:#06X}", pc);
            return Ok(CycleStatus::Halted);
        }
        if self.key_wait.blocked {
            return Ok(self.poll_key_wait());
        }

        let word = self.ram.get_word(pc)?;
        let instruction = Instruction::decode(word);
        trace!("{:#05X}: {:04X}  {}", pc, word, instruction);

        let status = match instruction {
            Instruction::ClearDisplay | Instruction::Draw { .. } => CycleStatus::RedrawScreen,
            Instruction::WaitKey { .. } => CycleStatus::Waiting,
            _ => CycleStatus::Continue,
        };
        match self.execute(instruction)? {
            Flow::Next => self.pc += consts::OP_CODE_BYTES as u16,
            Flow::Skip => self.pc += (2 * consts::OP_CODE_BYTES) as u16,
            Flow::Goto(address) => self.pc = address,
        }
        if self.config.tick_timers_on_step {
            self.tick_timers();
        }
        Ok(status)
    }

    /// Steps until the processor halts, blocks on a key, or `max_steps`
    /// calls have been made. Returns the number of non-halted steps.
    pub fn run(&mut self, max_steps: usize) -> Result<usize> {
        let mut steps = 0;
        while steps < max_steps {
            match self.step()? {
                CycleStatus::Halted => break,
                CycleStatus::Waiting => {
                    steps += 1;
                    break;
                }
                CycleStatus::Continue | CycleStatus::RedrawScreen => steps += 1,
            }
        }
        Ok(steps)
    }

    fn poll_key_wait(&mut self) -> CycleStatus {
        let held = self.keyboard_buffer.borrow().held();
        self.key_wait.last_key = held;
        match held {
            Some(key) => {
                let register = self.key_wait.register as usize;
                self.registers[register] = key & 0xF;
                self.key_wait.blocked = false;
                debug!("key {:X} -> V{:X}", key, register);
                CycleStatus::Continue
            }
            None => CycleStatus::Waiting,
        }
    }

    /// Writes the flag register first and the result second, so an
    /// operation targeting VF keeps its result.
    fn set_with_flag(&mut self, x: u8, value: u8, flag: bool) {
        self.registers[consts::FLAG_REG] = flag as u8;
        self.registers[x as usize] = value;
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow> {
        match instruction {
            Instruction::Sys(address) => {
                warn!("ignoring machine routine call to {:#05X}", address);
            }
            Instruction::ClearDisplay => {
                self.display_buffer.borrow_mut().clear();
            }

            // Subroutines: enter and exit
            Instruction::Call(address) => {
                let depth = self.stack_pointer as usize;
                if depth >= consts::STACK_SIZE {
                    return Err(Chip8Error::StackOverflow { depth });
                }
                self.stack[depth] = self.pc + consts::OP_CODE_BYTES as u16;
                self.stack_pointer += 1;
                return Ok(Flow::Goto(address));
            }
            Instruction::Return => {
                if self.stack_pointer == 0 {
                    return Err(Chip8Error::StackUnderflow);
                }
                self.stack_pointer -= 1;
                return Ok(Flow::Goto(self.stack[self.stack_pointer as usize]));
            }

            // Jumps
            Instruction::Jump(address) => return Ok(Flow::Goto(address)),
            Instruction::JumpOffset(address) => {
                return Ok(Flow::Goto(address + self.registers[0] as u16));
            }

            // Conditional skips
            Instruction::SkipEqualByte { x, byte } => {
                return Ok(skip_if(self.registers[x as usize] == byte));
            }
            Instruction::SkipNotEqualByte { x, byte } => {
                return Ok(skip_if(self.registers[x as usize] != byte));
            }
            Instruction::SkipEqualReg { x, y } => {
                return Ok(skip_if(
                    self.registers[x as usize] == self.registers[y as usize],
                ));
            }
            Instruction::SkipNotEqualReg { x, y } => {
                return Ok(skip_if(
                    self.registers[x as usize] != self.registers[y as usize],
                ));
            }
            Instruction::SkipKeyPressed { x } => {
                let pressed = self
                    .keyboard_buffer
                    .borrow()
                    .is_pressed(self.registers[x as usize]);
                return Ok(skip_if(pressed));
            }
            Instruction::SkipKeyNotPressed { x } => {
                let pressed = self
                    .keyboard_buffer
                    .borrow()
                    .is_pressed(self.registers[x as usize]);
                return Ok(skip_if(!pressed));
            }

            // Set register
            Instruction::LoadByte { x, byte } => {
                self.registers[x as usize] = byte;
            }
            Instruction::Move { x, y } => {
                self.registers[x as usize] = self.registers[y as usize];
            }
            Instruction::LoadAddress(address) => {
                self.idx_register = address;
            }

            // Add/subtract instructions
            Instruction::AddByte { x, byte } => {
                self.registers[x as usize] = self.registers[x as usize].wrapping_add(byte);
            }
            Instruction::AddReg { x, y } => {
                let (sum, carry) =
                    self.registers[x as usize].overflowing_add(self.registers[y as usize]);
                self.set_with_flag(x, sum, carry);
            }
            Instruction::SubReg { x, y } => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.set_with_flag(x, vx.wrapping_sub(vy), vx > vy);
            }
            Instruction::SubReversed { x, y } => {
                let (vx, vy) = (self.registers[x as usize], self.registers[y as usize]);
                self.set_with_flag(x, vy.wrapping_sub(vx), vy > vx);
            }

            // Logical instructions
            Instruction::Or { x, y } => {
                self.registers[x as usize] |= self.registers[y as usize];
            }
            Instruction::And { x, y } => {
                self.registers[x as usize] &= self.registers[y as usize];
            }
            Instruction::Xor { x, y } => {
                self.registers[x as usize] ^= self.registers[y as usize];
            }

            // Shifting instructions
            Instruction::ShiftRight { x } => {
                let vx = self.registers[x as usize];
                self.set_with_flag(x, vx >> 1, vx & 0b0000_0001 != 0);
            }
            Instruction::ShiftLeft { x } => {
                let vx = self.registers[x as usize];
                self.set_with_flag(x, vx << 1, vx & 0b1000_0000 != 0);
            }

            // Generate randomness
            Instruction::Random { x, mask } => {
                let rand_val: u8 = self.rng.gen();
                self.registers[x as usize] = rand_val & mask;
            }

            Instruction::Draw { x, y, n } => self.draw_sprite(x, y, n)?,

            // Timers and keypad
            Instruction::LoadDelayTimer { x } => {
                self.registers[x as usize] = self.delay_timer;
            }
            Instruction::SetDelayTimer { x } => {
                self.delay_timer = self.registers[x as usize];
            }
            Instruction::SetSoundTimer { x } => {
                self.sound_timer = self.registers[x as usize];
            }
            Instruction::WaitKey { x } => {
                debug!("waiting for key into V{:X}", x);
                self.key_wait = KeyWait {
                    blocked: true,
                    register: x,
                    last_key: None,
                };
            }

            // Index register
            Instruction::AddAddress { x } => {
                self.idx_register = self
                    .idx_register
                    .wrapping_add(self.registers[x as usize] as u16);
            }
            Instruction::LoadFont { x } => {
                let digit = self.registers[x as usize] as usize;
                if digit < consts::KEYBOARD_SIZE {
                    self.idx_register = (consts::FONT_OFFSET + digit * consts::FONT_GLYPH_BYTES) as u16;
                }
            }

            // Binary to decimal, store and load memory
            Instruction::StoreBcd { x } => {
                let num = self.registers[x as usize];
                self.ram.write_slice(
                    self.idx_register as usize,
                    &[num / 100, (num / 10) % 10, num % 10],
                )?;
            }
            Instruction::StoreRegisters { x } => {
                self.ram.write_slice(
                    self.idx_register as usize,
                    &self.registers[..=x as usize],
                )?;
            }
            Instruction::LoadRegisters { x } => {
                let bytes = self
                    .ram
                    .read_slice(self.idx_register as usize, x as usize + 1)?;
                self.registers[..=x as usize].copy_from_slice(bytes);
            }

            Instruction::Unknown(word) => {
                warn!("unknown opcode {:04X} at {:#05X}, skipping", word, self.pc);
            }
        }
        Ok(Flow::Next)
    }

    /// XORs an `n`-row sprite from memory at I into the frame at
    /// (Vx mod 64, Vy mod 32). Rows wrap vertically and each row wraps
    /// horizontally within its own 8 bytes. VF reports whether any lit
    /// pixel was switched off.
    fn draw_sprite(&mut self, x: u8, y: u8, n: u8) -> Result<()> {
        let x_coord = self.registers[x as usize] as usize % consts::DISPL_WIDTH;
        let y_coord = self.registers[y as usize] as usize % consts::DISPL_HEIGHT;
        let sprite_vals = self
            .ram
            .read_slice(self.idx_register as usize, n as usize)?;
        let (col, shift) = (x_coord / 8, x_coord % 8);

        let mut collision = false;
        let mut vram = self.display_buffer.borrow_mut();
        for (i, &row_bits) in sprite_vals.iter().enumerate() {
            let row = ((y_coord + i) % consts::DISPL_HEIGHT) * consts::DISPL_ROW_BYTES;
            collision |= vram.xor_byte(row + col, row_bits >> shift);
            if shift != 0 {
                let next = (col + 1) % consts::DISPL_ROW_BYTES;
                collision |= vram.xor_byte(row + next, row_bits << (8 - shift));
            }
        }
        drop(vram);

        self.registers[consts::FLAG_REG] = collision as u8;
        Ok(())
    }

    pub fn dump_memory(&self) -> String {
        self.ram.to_string()
    }

    pub fn dump_display(&self) -> String {
        self.display_buffer.borrow().to_string()
    }
}

fn skip_if(condition: bool) -> Flow {
    if condition {
        Flow::Skip
    } else {
        Flow::Next
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Registers:")?;
        for (i, value) in self.registers.iter().enumerate() {
            write!(f, "V{:X}: {:02X} ", i, value)?;
        }
        writeln!(f)?;
        writeln!(f, "I: {:04X}", self.idx_register)?;
        writeln!(f, "PC: {:04X}", self.pc)?;
        writeln!(f, "SP: {:02X}", self.stack_pointer)?;
        write!(f, "Stack:")?;
        for entry in self.stack.iter() {
            write!(f, " {:04X}", entry)?;
        }
        writeln!(f)?;
        writeln!(f, "DT: {:02X}", self.delay_timer)?;
        writeln!(f, "ST: {:02X}", self.sound_timer)?;
        if self.key_wait.blocked {
            writeln!(f, "Waiting for key into V{:X}", self.key_wait.register)?;
        }
        Ok(())
    }
}
