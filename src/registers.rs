use crate::error::RegisterError;
use std::fmt;
use std::str::FromStr;

/// Every register the machine has. VF doubles as the flag register and is
/// written by instructions (e.g. draw collision), not by well-behaved programs.
// NB. V0-VF must stay first and in order; their discriminants index the
// general register array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
    V7,
    V8,
    V9,
    VA,
    VB,
    VC,
    VD,
    VE,
    VF,
    /// 16bit index register
    I,
    PC,
    SP,
    /// delay timer; stored but never counted down
    DT,
    /// sound timer; ditto
    ST,
}

use Register::*;

impl Register {
    pub const GENERAL: [Register; 16] = [
        V0, V1, V2, V3, V4, V5, V6, V7, V8, V9, VA, VB, VC, VD, VE, VF,
    ];

    pub const ALL: [Register; 21] = [
        V0, V1, V2, V3, V4, V5, V6, V7, V8, V9, VA, VB, VC, VD, VE, VF, I, PC, SP, DT, ST,
    ];

    /// general register Vx from the low nibble of `x`
    pub fn v(x: u8) -> Register {
        Self::GENERAL[(x & 0x0f) as usize]
    }

    pub fn name(&self) -> &'static str {
        match self {
            V0 => "V0",
            V1 => "V1",
            V2 => "V2",
            V3 => "V3",
            V4 => "V4",
            V5 => "V5",
            V6 => "V6",
            V7 => "V7",
            V8 => "V8",
            V9 => "V9",
            VA => "VA",
            VB => "VB",
            VC => "VC",
            VD => "VD",
            VE => "VE",
            VF => "VF",
            I => "I",
            PC => "PC",
            SP => "SP",
            DT => "DT",
            ST => "ST",
        }
    }

    /// bits kept on write
    fn mask(&self) -> u32 {
        match self {
            I | PC => 0xffff,
            _ => 0xff,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = RegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| RegisterError::Unknown(s.to_string()))
    }
}

/// V0-VF, I, the two timers, and PC/SP which are only reachable through
/// their own accessors
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegisterFile {
    v: [u8; 16],
    i: u16,
    pc: u16,
    sp: u8,
    dt: u8,
    st: u8,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// store `value`, masked to the register's width (16 bits for I, 8 for
    /// the rest)
    pub fn write(&mut self, reg: Register, value: u32) -> Result<(), RegisterError> {
        let value = value & reg.mask();
        match reg {
            PC | SP => return Err(RegisterError::Restricted(reg)),
            I => self.i = value as u16,
            DT => self.dt = value as u8,
            ST => self.st = value as u8,
            _ => self.v[reg as usize] = value as u8,
        }
        Ok(())
    }

    pub fn read(&self, reg: Register) -> Result<u16, RegisterError> {
        match reg {
            PC | SP => Err(RegisterError::Restricted(reg)),
            I => Ok(self.i),
            DT => Ok(self.dt.into()),
            ST => Ok(self.st.into()),
            _ => Ok(self.v[reg as usize].into()),
        }
    }

    /// named access, e.g. `write_named("VA", 3)`
    pub fn write_named(&mut self, name: &str, value: u32) -> Result<(), RegisterError> {
        self.write(name.parse()?, value)
    }

    pub fn read_named(&self, name: &str) -> Result<u16, RegisterError> {
        self.read(name.parse()?)
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, value: u32) {
        self.pc = (value & 0xffff) as u16;
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn set_sp(&mut self, value: u32) {
        self.sp = (value & 0xff) as u8;
    }

    /// NB. wraps 255 -> 0
    pub fn increment_sp(&mut self) {
        self.sp = self.sp.wrapping_add(1);
    }

    /// NB. wraps 0 -> 255
    pub fn decrement_sp(&mut self) {
        self.sp = self.sp.wrapping_sub(1);
    }
}
