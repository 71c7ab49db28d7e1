use crate::registers::Register;
use std::io;
use thiserror::Error;

/// Raised by the memory map when a write lands somewhere it shouldn't
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryError {
    #[error("write to reserved interpreter memory at {address:#05X}")]
    Reserved { address: u16 },

    #[error("memory access out of bounds at {address:#06X}")]
    OutOfBounds { address: u16 },
}

/// Raised by named register access
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    #[error("register {0} does not exist")]
    Unknown(String),

    #[error("access to register {0} is not permitted; use its dedicated accessor")]
    Restricted(Register),
}

#[derive(Debug, Error)]
pub enum RomError {
    #[error("malformed instruction word {word:?} at position {index}")]
    MalformedWord { index: usize, word: String },

    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    TooLarge { size: usize, max_size: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Anything that can stop the interpreter
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error(transparent)]
    Memory(#[from] MemoryError),

    #[error(transparent)]
    Register(#[from] RegisterError),

    #[error(transparent)]
    Rom(#[from] RomError),

    #[error("no more instructions at {pc:#06X}")]
    ProgramExhausted { pc: u16 },

    #[error("display error: {0}")]
    Display(#[from] io::Error),
}

impl Chip8Error {
    /// true when the program simply ran off the end of populated memory
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Chip8Error::ProgramExhausted { .. })
    }
}
