use crate::config::MemoryPolicy;
use crate::error::MemoryError;
use log::warn;

// NB. addresses are u16 as per the chip-8; lengths are usize to stop endless casting

/// Represents memory map, ROM, RAM etc.
pub trait MemoryMap {
    /// store one byte, returning what was stored
    fn write(&mut self, addr: u16, value: u8) -> Result<u8, MemoryError>;

    /// up to `len` bytes from `addr`; anything past the end of memory is
    /// simply left off
    fn read(&self, addr: u16, len: usize) -> &[u8];

    /// true once a byte has been stored at `addr`; baked-in contents (the
    /// font) don't count
    fn is_written(&self, addr: u16) -> bool;

    /// write a chunk of bytes into "RAM", stopping at the first refused byte
    fn load(&mut self, data: &[u8], addr: u16) -> Result<(), MemoryError> {
        for (offset, byte) in data.iter().enumerate() {
            let a = usize::from(addr) + offset;
            let a = u16::try_from(a).map_err(|_| MemoryError::OutOfBounds { address: u16::MAX })?;
            self.write(a, *byte)?;
        }
        Ok(())
    }

    /// get a two-byte big-endian word; missing bytes read as zero
    fn get_word(&self, addr: u16) -> u16 {
        match self.read(addr, 2) {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [hi] => u16::from_be_bytes([*hi, 0]),
            _ => 0,
        }
    }
}

/// how much RAM we have
pub const CHIP8_RAM_SIZE_BYTES: usize = 4096;

/// where the program is loaded; everything below belongs to the interpreter
pub const CHIP8_PROGRAM_ADDR: u16 = 0x0200;

/// highest addressable cell
pub const CHIP8_MAX_ADDR: u16 = 0x0fff;

/// Defines the CHIP-8 standard memory map
/// 4K configuration:
///   0x0000-0x004f  interpreter
///   0x0050-0x009f  font
///   0x00a0-0x01ff  interpreter
///   0x0200-0x0fff  program
///
/// chip-8 programs *should* not write below 0x200
pub struct Chip8MemoryMap {
    bytes: Box<[u8]>,
    written: Box<[bool]>,
    policy: MemoryPolicy,
    pub program_addr: u16,
}

impl MemoryMap for Chip8MemoryMap {
    fn write(&mut self, addr: u16, value: u8) -> Result<u8, MemoryError> {
        if addr > CHIP8_MAX_ADDR {
            return Err(MemoryError::OutOfBounds { address: addr });
        }
        if self.is_reserved(addr) {
            match self.policy {
                MemoryPolicy::Strict => return Err(MemoryError::Reserved { address: addr }),
                MemoryPolicy::Permissive => {
                    warn!("{}", MemoryError::Reserved { address: addr });
                }
            }
        }
        self.bytes[addr as usize] = value;
        self.written[addr as usize] = true;
        Ok(value)
    }

    fn read(&self, addr: u16, len: usize) -> &[u8] {
        let a = (addr as usize).min(self.bytes.len());
        let end = a.saturating_add(len).min(self.bytes.len());
        &self.bytes[a..end]
    }

    fn is_written(&self, addr: u16) -> bool {
        self.written.get(addr as usize).copied().unwrap_or(false)
    }
}

impl Chip8MemoryMap {
    /// initialises CHIP-8 with contemporary memory contents
    pub fn new(policy: MemoryPolicy) -> Self {
        let mut bytes = Box::new([0u8; CHIP8_RAM_SIZE_BYTES]);
        let font = CHIP8_CONTEMPORARY_FONT_ADDR as usize;
        bytes[font..font + CHIP8_CONTEMPORARY_FONT.len()].copy_from_slice(&CHIP8_CONTEMPORARY_FONT);
        Chip8MemoryMap {
            bytes,
            written: Box::new([false; CHIP8_RAM_SIZE_BYTES]),
            policy,
            program_addr: CHIP8_PROGRAM_ADDR,
        }
    }

    /// below 0x200, where writes are logged or refused depending on policy
    pub fn is_reserved(&self, addr: u16) -> bool {
        addr < self.program_addr
    }

    /// load a CHIP-8 program at 0x200
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), MemoryError> {
        self.load(program, self.program_addr)
    }
}

impl Default for Chip8MemoryMap {
    fn default() -> Self {
        Chip8MemoryMap::new(MemoryPolicy::default())
    }
}

pub const CHIP8_CONTEMPORARY_FONT_ADDR: u16 = 0x050;
const CHIP8_CONTEMPORARY_FONT: [u8; 80] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
