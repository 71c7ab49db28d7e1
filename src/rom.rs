use crate::error::RomError;
use crate::memory::{CHIP8_PROGRAM_ADDR, CHIP8_RAM_SIZE_BYTES};
use log::debug;
use std::fs::File;
use std::io;
use std::path::Path;

/// the most a program can be and still fit above 0x200
pub const MAX_ROM_SIZE: usize = CHIP8_RAM_SIZE_BYTES - CHIP8_PROGRAM_ADDR as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomFormat {
    /// raw bytes, as in a .ch8 file
    Binary,
    /// whitespace-separated four digit hex instruction words, e.g. `00E0 1200`
    HexWords,
}

/// A program image, ready to be loaded at 0x200
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom {
    bytes: Vec<u8>,
}

impl Rom {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Rom, RomError> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(RomError::TooLarge {
                size: bytes.len(),
                max_size: MAX_ROM_SIZE,
            });
        }
        Ok(Rom { bytes })
    }

    pub fn from_reader(reader: &mut impl io::Read) -> Result<Rom, RomError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Rom::from_bytes(buf)
    }

    /// Each word becomes two bytes, high pair first. Words must be exactly
    /// four hex digits.
    pub fn from_hex_words(text: &str) -> Result<Rom, RomError> {
        let mut bytes = Vec::new();
        for (index, word) in text.split_whitespace().enumerate() {
            let malformed = || RomError::MalformedWord {
                index,
                word: word.to_string(),
            };
            if word.len() != 4 || !word.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            let hi = u8::from_str_radix(&word[0..2], 16).map_err(|_| malformed())?;
            let lo = u8::from_str_radix(&word[2..4], 16).map_err(|_| malformed())?;
            bytes.push(hi);
            bytes.push(lo);
        }
        Rom::from_bytes(bytes)
    }

    pub fn open(path: impl AsRef<Path>, format: RomFormat) -> Result<Rom, RomError> {
        let path = path.as_ref();
        let mut f = File::open(path)?;
        let rom = match format {
            RomFormat::Binary => Rom::from_reader(&mut f)?,
            RomFormat::HexWords => Rom::from_hex_words(&io::read_to_string(f)?)?,
        };
        debug!("read {} byte ROM from {}", rom.len(), path.display());
        Ok(rom)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
