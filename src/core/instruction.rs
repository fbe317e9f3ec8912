use crate::utils;
use std::fmt;

/// One decoded CHIP-8 instruction. Register operands are indices 0..=0xF,
/// addresses are 12-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Sys(u16),
    ClearDisplay,
    Return,
    Jump(u16),
    Call(u16),
    SkipEqualByte { x: u8, byte: u8 },
    SkipNotEqualByte { x: u8, byte: u8 },
    SkipEqualReg { x: u8, y: u8 },
    LoadByte { x: u8, byte: u8 },
    AddByte { x: u8, byte: u8 },
    Move { x: u8, y: u8 },
    Or { x: u8, y: u8 },
    And { x: u8, y: u8 },
    Xor { x: u8, y: u8 },
    AddReg { x: u8, y: u8 },
    SubReg { x: u8, y: u8 },
    ShiftRight { x: u8 },
    SubReversed { x: u8, y: u8 },
    ShiftLeft { x: u8 },
    SkipNotEqualReg { x: u8, y: u8 },
    LoadAddress(u16),
    JumpOffset(u16),
    Random { x: u8, mask: u8 },
    Draw { x: u8, y: u8, n: u8 },
    SkipKeyPressed { x: u8 },
    SkipKeyNotPressed { x: u8 },
    LoadDelayTimer { x: u8 },
    WaitKey { x: u8 },
    SetDelayTimer { x: u8 },
    SetSoundTimer { x: u8 },
    AddAddress { x: u8 },
    LoadFont { x: u8 },
    StoreBcd { x: u8 },
    StoreRegisters { x: u8 },
    LoadRegisters { x: u8 },
    /// Any word outside the instruction set.
    Unknown(u16),
}

impl Instruction {
    pub fn decode(word: u16) -> Self {
        let (opcode, x, y, n) = utils::nibble_split(word);
        let byte = utils::low_byte(word);
        let addr = utils::low_address(word);

        match (opcode, x, y, n) {
            (0, 0, 0xE, 0) => Instruction::ClearDisplay,
            (0, 0, 0xE, 0xE) => Instruction::Return,
            (0, _, _, _) => Instruction::Sys(addr),
            (1, _, _, _) => Instruction::Jump(addr),
            (2, _, _, _) => Instruction::Call(addr),
            (3, _, _, _) => Instruction::SkipEqualByte { x, byte },
            (4, _, _, _) => Instruction::SkipNotEqualByte { x, byte },
            (5, _, _, 0) => Instruction::SkipEqualReg { x, y },
            (6, _, _, _) => Instruction::LoadByte { x, byte },
            (7, _, _, _) => Instruction::AddByte { x, byte },
            (8, _, _, 0) => Instruction::Move { x, y },
            (8, _, _, 1) => Instruction::Or { x, y },
            (8, _, _, 2) => Instruction::And { x, y },
            (8, _, _, 3) => Instruction::Xor { x, y },
            (8, _, _, 4) => Instruction::AddReg { x, y },
            (8, _, _, 5) => Instruction::SubReg { x, y },
            (8, _, _, 6) => Instruction::ShiftRight { x },
            (8, _, _, 7) => Instruction::SubReversed { x, y },
            (8, _, _, 0xE) => Instruction::ShiftLeft { x },
            (9, _, _, 0) => Instruction::SkipNotEqualReg { x, y },
            (0xA, _, _, _) => Instruction::LoadAddress(addr),
            (0xB, _, _, _) => Instruction::JumpOffset(addr),
            (0xC, _, _, _) => Instruction::Random { x, mask: byte },
            (0xD, _, _, _) => Instruction::Draw { x, y, n },
            (0xE, _, 9, 0xE) => Instruction::SkipKeyPressed { x },
            (0xE, _, 0xA, 1) => Instruction::SkipKeyNotPressed { x },
            (0xF, _, 0, 7) => Instruction::LoadDelayTimer { x },
            (0xF, _, 0, 0xA) => Instruction::WaitKey { x },
            (0xF, _, 1, 5) => Instruction::SetDelayTimer { x },
            (0xF, _, 1, 8) => Instruction::SetSoundTimer { x },
            (0xF, _, 1, 0xE) => Instruction::AddAddress { x },
            (0xF, _, 2, 9) => Instruction::LoadFont { x },
            (0xF, _, 3, 3) => Instruction::StoreBcd { x },
            (0xF, _, 5, 5) => Instruction::StoreRegisters { x },
            (0xF, _, 6, 5) => Instruction::LoadRegisters { x },
            (_, _, _, _) => Instruction::Unknown(word),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Sys(addr) => write!(f, "SYS {:#05X}", addr),
            Instruction::ClearDisplay => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(addr) => write!(f, "JP {:#05X}", addr),
            Instruction::Call(addr) => write!(f, "CALL {:#05X}", addr),
            Instruction::SkipEqualByte { x, byte } => write!(f, "SE V{:X}, {:#04X}", x, byte),
            Instruction::SkipNotEqualByte { x, byte } => {
                write!(f, "SNE V{:X}, {:#04X}", x, byte)
            }
            Instruction::SkipEqualReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            Instruction::LoadByte { x, byte } => write!(f, "LD V{:X}, {:#04X}", x, byte),
            Instruction::AddByte { x, byte } => write!(f, "ADD V{:X}, {:#04X}", x, byte),
            Instruction::Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Instruction::Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            Instruction::And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Instruction::Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            Instruction::AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Instruction::SubReg { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            Instruction::ShiftRight { x } => write!(f, "SHR V{:X}", x),
            Instruction::SubReversed { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            Instruction::ShiftLeft { x } => write!(f, "SHL V{:X}", x),
            Instruction::SkipNotEqualReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            Instruction::LoadAddress(addr) => write!(f, "LD I, {:#05X}", addr),
            Instruction::JumpOffset(addr) => write!(f, "JP V0, {:#05X}", addr),
            Instruction::Random { x, mask } => write!(f, "RND V{:X}, {:#04X}", x, mask),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            Instruction::SkipKeyPressed { x } => write!(f, "SKP V{:X}", x),
            Instruction::SkipKeyNotPressed { x } => write!(f, "SKNP V{:X}", x),
            Instruction::LoadDelayTimer { x } => write!(f, "LD V{:X}, DT", x),
            Instruction::WaitKey { x } => write!(f, "LD V{:X}, K", x),
            Instruction::SetDelayTimer { x } => write!(f, "LD DT, V{:X}", x),
            Instruction::SetSoundTimer { x } => write!(f, "LD ST, V{:X}", x),
            Instruction::AddAddress { x } => write!(f, "ADD I, V{:X}", x),
            Instruction::LoadFont { x } => write!(f, "LD F, V{:X}", x),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            Instruction::StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            Instruction::LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
            Instruction::Unknown(word) => write!(f, "DATA {:#06X}", word),
        }
    }
}
