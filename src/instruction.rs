use crate::config::DispatchMode;
use crate::registers::Register;
use std::fmt;

/// Second argument of SE/SNE/LD: either a byte baked into the instruction or
/// another register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Immediate(u8),
    Register(Register),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Immediate(kk) => write!(f, "{:#04x}", kk),
            Operand::Register(r) => write!(f, "{}", r),
        }
    }
}

/// A decoded instruction. Addresses are the raw 12 bits from the word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump(u16),
    /// 2nnn
    Call(u16),
    /// 3xkk, 5xy_
    SkipIfEqual(Register, Operand),
    /// 4xkk, 9xy_
    SkipIfNotEqual(Register, Operand),
    /// 6xkk, 8xy0
    Load(Register, Operand),
    /// Annn
    LoadI(u16),
    /// Dxyn
    Draw(Register, Register, u8),
    /// anything this machine doesn't dispatch; the whole word is kept for the
    /// diagnostic
    Unimplemented(u16),
}

impl Instruction {
    /// decode a big-endian instruction word by its hex digits
    pub fn decode(word: u16, mode: DispatchMode) -> Instruction {
        let nibbles = (
            (word >> 12) as u8 & 0x0f,
            (word >> 8) as u8 & 0x0f,
            (word >> 4) as u8 & 0x0f,
            word as u8 & 0x0f,
        );
        let nnn = word & 0x0fff;
        let kk = word as u8;
        let x = Register::v(nibbles.1);
        let y = Register::v(nibbles.2);
        let extended = mode == DispatchMode::Extended;

        match nibbles {
            (0x0, 0x0, 0xe, 0x0) => Instruction::ClearScreen,
            (0x0, 0x0, 0xe, 0xe) => Instruction::Return,
            (0x1, _, _, _) => Instruction::Jump(nnn),
            (0x2, _, _, _) => Instruction::Call(nnn),
            (0x3, _, _, _) => Instruction::SkipIfEqual(x, Operand::Immediate(kk)),
            (0x4, _, _, _) => Instruction::SkipIfNotEqual(x, Operand::Immediate(kk)),
            // NB. the low digit of 5xy_ and 9xy_ is not checked
            (0x5, _, _, _) => Instruction::SkipIfEqual(x, Operand::Register(y)),
            (0x9, _, _, _) => Instruction::SkipIfNotEqual(x, Operand::Register(y)),
            (0x6, _, _, _) if extended => Instruction::Load(x, Operand::Immediate(kk)),
            (0x8, _, _, 0x0) if extended => Instruction::Load(x, Operand::Register(y)),
            (0xa, _, _, _) if extended => Instruction::LoadI(nnn),
            (0xd, _, _, n) if extended => Instruction::Draw(x, y, n),
            _ => Instruction::Unimplemented(word),
        }
    }

    pub fn from_bytes(hi: u8, lo: u8, mode: DispatchMode) -> Instruction {
        Instruction::decode(u16::from_be_bytes([hi, lo]), mode)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump(addr) => write!(f, "JP {:#05x}", addr),
            Instruction::Call(addr) => write!(f, "CALL {:#05x}", addr),
            Instruction::SkipIfEqual(r, op) => write!(f, "SE {}, {}", r, op),
            Instruction::SkipIfNotEqual(r, op) => write!(f, "SNE {}, {}", r, op),
            Instruction::Load(r, op) => write!(f, "LD {}, {}", r, op),
            Instruction::LoadI(addr) => write!(f, "LD I, {:#05x}", addr),
            Instruction::Draw(x, y, n) => write!(f, "DRW {}, {}, {}", x, y, n),
            Instruction::Unimplemented(word) => write!(f, "{:04X}", word),
        }
    }
}
