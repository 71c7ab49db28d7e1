//! # interpreter
//!
//! Fetch/decode/execute over the machine state:
//!
//!  - memory: 4K, font at 0x050, programs from 0x200
//!  - V0-VF, I, DT, ST: reached by register name
//!  - PC, SP: only through their own accessors
//!  - stack: return addresses indexed by SP
//!  - display: borrowed from whoever owns the screen
//!
//! Every `step()` ends by moving PC on by two, control transfers included.
//! So `JP 0x300` continues at 0x302, and CALL saves the address of the CALL
//! itself; RET then lands on the instruction after it.
use crate::config::InterpreterConfig;
use crate::display::Display;
use crate::error::Chip8Error;
use crate::instruction::{Instruction, Operand};
use crate::memory::{Chip8MemoryMap, MemoryMap};
use crate::registers::{Register, RegisterFile};
use crate::rom::Rom;
use crate::stack::Stack;
use log::{debug, trace, warn};
use std::io;

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    display: &'a mut dyn Display,
    registers: RegisterFile,
    stack: Stack,
    config: InterpreterConfig,
}

impl<'a> Chip8Interpreter<'a> {
    pub fn new(display: &'a mut dyn Display) -> Chip8Interpreter<'a> {
        Chip8Interpreter::with_config(display, InterpreterConfig::default())
    }

    pub fn with_config(display: &'a mut dyn Display, config: InterpreterConfig) -> Chip8Interpreter<'a> {
        let memory = Chip8MemoryMap::new(config.memory_policy);
        let mut registers = RegisterFile::new();
        registers.set_pc(memory.program_addr.into());
        Chip8Interpreter {
            memory,
            display,
            registers,
            stack: Stack::new(),
            config,
        }
    }

    /// load a chip8 program
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<(), Chip8Error> {
        let rom = Rom::from_reader(reader)?;
        self.load_rom(&rom)
    }

    pub fn load_rom(&mut self, rom: &Rom) -> Result<(), Chip8Error> {
        self.memory.load_program(rom.bytes())?;
        debug!("loaded {} bytes at {:#05x}", rom.len(), self.memory.program_addr);
        Ok(())
    }

    /// Run one instruction: fetch the word at PC, decode it, execute it, then
    /// advance PC by two. Returns what was executed. Fails with
    /// `ProgramExhausted` when neither byte at PC was ever written.
    pub fn step(&mut self) -> Result<Instruction, Chip8Error> {
        let pc = self.registers.pc();
        if !self.memory.is_written(pc) && !self.memory.is_written(pc.wrapping_add(1)) {
            return Err(Chip8Error::ProgramExhausted { pc });
        }
        let word = if self.memory.is_written(pc.wrapping_add(1)) {
            self.memory.get_word(pc)
        } else {
            // only the high byte is there
            self.memory.get_word(pc) & 0xff00
        };
        let instruction = Instruction::decode(word, self.config.dispatch);
        trace!("{:#05x}: {}", pc, instruction);

        self.execute(&instruction)?;
        self.advance_pc();
        Ok(instruction)
    }

    /// Execute a decoded instruction against the machine state. Does not do
    /// the post-instruction advance of PC; only skips move it.
    pub fn execute(&mut self, instruction: &Instruction) -> Result<(), Chip8Error> {
        match *instruction {
            Instruction::ClearScreen => self.display.clear(),
            Instruction::Return => self.return_subroutine(),
            Instruction::Jump(addr) => self.jump(addr),
            Instruction::Call(addr) => self.call_subroutine(addr),
            Instruction::SkipIfEqual(reg, operand) => {
                if self.registers.read(reg)? == self.operand_value(operand)? {
                    self.advance_pc();
                }
            }
            Instruction::SkipIfNotEqual(reg, operand) => {
                if self.registers.read(reg)? != self.operand_value(operand)? {
                    self.advance_pc();
                }
            }
            Instruction::Load(reg, operand) => {
                let value = self.operand_value(operand)?;
                self.registers.write(reg, value.into())?;
            }
            Instruction::LoadI(addr) => self.registers.write(Register::I, addr.into())?,
            Instruction::Draw(vx, vy, n) => self.draw(vx, vy, n)?,
            Instruction::Unimplemented(word) => {
                warn!("instruction {:04X} hasn't been implemented", word);
            }
        }
        Ok(())
    }

    /// external interrupt: show the current frame
    pub fn refresh(&mut self) -> Result<(), Chip8Error> {
        self.display.refresh()?;
        Ok(())
    }

    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    pub fn memory(&self) -> &Chip8MemoryMap {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Chip8MemoryMap {
        &mut self.memory
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn display(&self) -> &dyn Display {
        &*self.display
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    fn advance_pc(&mut self) {
        let pc = self.registers.pc();
        self.registers.set_pc(u32::from(pc) + 2);
    }

    fn jump(&mut self, addr: u16) {
        self.registers.set_pc((addr & 0x0fff).into());
    }

    fn call_subroutine(&mut self, addr: u16) {
        self.registers.increment_sp();
        self.stack.store(self.registers.sp(), self.registers.pc());
        self.jump(addr);
    }

    fn return_subroutine(&mut self) {
        let addr = self.stack.load(self.registers.sp());
        self.registers.set_pc(addr.into());
        self.registers.decrement_sp();
    }

    fn operand_value(&self, operand: Operand) -> Result<u16, Chip8Error> {
        match operand {
            Operand::Immediate(kk) => Ok(kk.into()),
            Operand::Register(reg) => Ok(self.registers.read(reg)?),
        }
    }

    /// sprite of `n` rows from I, drawn at (Vx, Vy); VF is the collision flag
    fn draw(&mut self, vx: Register, vy: Register, n: u8) -> Result<(), Chip8Error> {
        let x = self.registers.read(vx)?;
        let y = self.registers.read(vy)?;
        let i = self.registers.read(Register::I)? & 0x0fff;
        let sprite = self.memory.read(i, (n & 0x0f).into());
        let collision = self.display.draw(sprite, x.into(), y.into());
        self.registers.write(Register::VF, collision.into())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DispatchMode;
    use crate::display::PixelGrid;
    use crate::error::RegisterError;
    use crate::registers::Register::*;

    fn load(i: &mut Chip8Interpreter, words: &str) -> Result<(), Chip8Error> {
        i.load_rom(&Rom::from_hex_words(words)?)
    }

    #[test]
    fn test_new() {
        let mut display = PixelGrid::new();
        let i = Chip8Interpreter::new(&mut display);
        assert_eq!(i.registers().pc(), 0x200);
        assert_eq!(i.registers().sp(), 0);
        assert!(!i.memory().is_written(0x200));
        assert_eq!(i.config().dispatch, DispatchMode::Extended);
    }

    #[test]
    fn test_program_load_ok() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        let mut prog: &[u8] = &[0x00, 0xe0]; // clear screen
        i.load_program(&mut prog)?;
        assert_eq!(i.memory().read(0x200, 2), &[0x00, 0xe0]);
        Ok(())
    }

    #[test]
    fn test_clear_screen_round_trip() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        display.draw(&[0xff, 0xff], 10, 10);
        let mut i = Chip8Interpreter::with_config(&mut display, InterpreterConfig::reference());
        load(&mut i, "00E0")?;
        assert_eq!(i.memory().read(0x200, 2), &[0x00, 0xe0]);
        i.registers_mut().set_pc(0x200);
        assert_eq!(i.step()?, Instruction::ClearScreen);
        assert!(i.display().is_region_clear(0, 0, 64, 32));
        assert_eq!(i.registers().pc(), 0x202);
        drop(i);
        assert_eq!(display.lit_count(), 0);
        Ok(())
    }

    #[test]
    fn test_exhausted() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        match i.step() {
            Err(e) => assert!(e.is_exhausted()),
            Ok(instruction) => panic!("executed {} from empty memory", instruction),
        }
        load(&mut i, "00E0")?;
        i.step()?;
        assert!(matches!(i.step(), Err(Chip8Error::ProgramExhausted { pc: 0x202 })));
        Ok(())
    }

    #[test]
    fn test_missing_low_byte_reads_zero() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        let mut prog: &[u8] = &[0x00, 0xe0, 0x13];
        i.load_program(&mut prog)?;
        i.step()?;
        assert_eq!(i.step()?, Instruction::Jump(0x300));
        Ok(())
    }

    #[test]
    fn test_jump_lands_past_target() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "1300")?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x302);
        Ok(())
    }

    #[test]
    fn test_jump_masks_to_12_bits() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        i.execute(&Instruction::Jump(0xf300))?;
        assert_eq!(i.registers().pc(), 0x300);
        Ok(())
    }

    #[test]
    fn test_call() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "0000 2300")?;
        i.registers_mut().set_pc(0x202);
        i.registers_mut().set_sp(0);
        assert_eq!(i.step()?, Instruction::Call(0x300));
        assert_eq!(i.stack().get(1), Some(0x202));
        assert_eq!(i.registers().pc(), 0x302);
        assert_eq!(i.registers().sp(), 1);
        Ok(())
    }

    #[test]
    fn test_subroutines() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        // 0x200 CALL 0x204, which carries on at 0x206
        load(&mut i, "2204 0000 0000 00EE")?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x206);
        assert_eq!(i.registers().sp(), 1);
        assert_eq!(i.step()?, Instruction::Return);
        assert_eq!(i.registers().pc(), 0x202);
        assert_eq!(i.registers().sp(), 0);
        assert_eq!(i.step()?, Instruction::Unimplemented(0x0000));
        assert_eq!(i.registers().pc(), 0x204);
        Ok(())
    }

    #[test]
    fn test_nested_calls() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        i.execute(&Instruction::Call(0x300))?;
        i.execute(&Instruction::Call(0x400))?;
        assert_eq!(i.registers().sp(), 2);
        assert_eq!(i.stack().get(1), Some(0x200));
        assert_eq!(i.stack().get(2), Some(0x300));
        i.execute(&Instruction::Return)?;
        assert_eq!(i.registers().pc(), 0x300);
        i.execute(&Instruction::Return)?;
        assert_eq!(i.registers().pc(), 0x200);
        assert_eq!(i.registers().sp(), 0);
        Ok(())
    }

    #[test]
    fn test_return_from_empty_stack() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "00EE")?;
        i.step()?;
        assert_eq!(i.registers().sp(), 255);
        assert_eq!(i.registers().pc(), 0x002);
        // nothing was ever written down there
        assert!(matches!(i.step(), Err(Chip8Error::ProgramExhausted { pc: 0x002 })));
        Ok(())
    }

    #[test]
    fn test_skip_if_equal_immediate() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "3342 3343")?;
        i.registers_mut().write(V3, 0x42)?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        i.registers_mut().set_pc(0x202);
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        Ok(())
    }

    #[test]
    fn test_skip_if_not_equal_immediate() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "4342 4300")?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        i.registers_mut().set_pc(0x202);
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        Ok(())
    }

    #[test]
    fn test_register_skips_are_complements() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        for (a, b) in [(0u32, 0u32), (1, 2), (0xff, 0xff), (0x80, 0x08)] {
            i.registers_mut().write(V1, a)?;
            i.registers_mut().write(V2, b)?;

            i.registers_mut().set_pc(0x200);
            i.execute(&Instruction::SkipIfEqual(V1, Operand::Register(V2)))?;
            let se = i.registers().pc() - 0x200;

            i.registers_mut().set_pc(0x200);
            i.execute(&Instruction::SkipIfNotEqual(V1, Operand::Register(V2)))?;
            let sne = i.registers().pc() - 0x200;

            assert_eq!(se, if a == b { 2 } else { 0 });
            assert_eq!(se + sne, 2);
        }
        Ok(())
    }

    #[test]
    fn test_register_skip_via_step() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "5120 9120")?;
        i.registers_mut().write(V1, 7)?;
        i.registers_mut().write(V2, 7)?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        i.registers_mut().set_pc(0x202);
        i.step()?;
        assert_eq!(i.registers().pc(), 0x204);
        Ok(())
    }

    #[test]
    fn test_load() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        i.execute(&Instruction::Load(V4, Operand::Immediate(0x99)))?;
        i.execute(&Instruction::Load(V5, Operand::Register(V4)))?;
        assert_eq!(i.registers().read(V4)?, 0x99);
        assert_eq!(i.registers().read(V5)?, 0x99);
        Ok(())
    }

    #[test]
    fn test_restricted_operand_fails() {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        let result = i.execute(&Instruction::Load(V0, Operand::Register(PC)));
        assert!(matches!(
            result,
            Err(Chip8Error::Register(RegisterError::Restricted(PC)))
        ));
    }

    #[test]
    fn test_unimplemented_is_skipped() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        load(&mut i, "7123 F129")?;
        let before = i.registers().clone();
        assert_eq!(i.step()?, Instruction::Unimplemented(0x7123));
        assert_eq!(i.step()?, Instruction::Unimplemented(0xf129));
        assert_eq!(i.registers().pc(), 0x204);
        assert_eq!(i.registers().read(V1)?, before.read(V1)?);
        Ok(())
    }

    #[test]
    fn test_reference_dispatch_gap() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::with_config(&mut display, InterpreterConfig::reference());
        load(&mut i, "6A12 A050 D015")?;
        assert_eq!(i.step()?, Instruction::Unimplemented(0x6a12));
        assert_eq!(i.step()?, Instruction::Unimplemented(0xa050));
        assert_eq!(i.step()?, Instruction::Unimplemented(0xd015));
        assert_eq!(i.registers().read(VA)?, 0);
        assert_eq!(i.registers().read(I)?, 0);
        assert!(i.display().is_region_clear(0, 0, 64, 32));
        Ok(())
    }

    #[test]
    fn test_draw_font_glyph() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        // I = font "0", V0 = V1 = 2, draw 5 rows, draw again
        load(&mut i, "A050 6002 6102 D015 D015")?;
        for _ in 0..4 {
            i.step()?;
        }
        assert_eq!(i.registers().read(I)?, 0x050);
        assert_eq!(i.registers().read(VF)?, 0);
        assert!(!i.display().is_pixel_clear(2, 2));
        assert!(i.display().is_pixel_clear(3, 3));
        i.step()?;
        assert_eq!(i.registers().read(VF)?, 1);
        assert!(!i.display().is_pixel_clear(2, 2));
        drop(i);
        assert_eq!(display.lit_count(), 14);
        Ok(())
    }

    #[test]
    fn test_jump_into_unwritten_gap_stops() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        // JP 0x204 lands on 0x206, between the code at 0x200 and 0x210
        load(&mut i, "1204")?;
        i.memory_mut().load(&[0x00, 0xe0], 0x210)?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x206);
        assert!(matches!(i.step(), Err(Chip8Error::ProgramExhausted { pc: 0x206 })));
        Ok(())
    }

    #[test]
    fn test_font_is_not_executed() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        // JP 0x04e carries on at the font
        load(&mut i, "104E")?;
        i.step()?;
        assert_eq!(i.registers().pc(), 0x050);
        assert!(matches!(i.step(), Err(Chip8Error::ProgramExhausted { pc: 0x050 })));
        Ok(())
    }

    #[test]
    fn test_refresh_is_forwarded() -> Result<(), Chip8Error> {
        let mut display = PixelGrid::new();
        let mut i = Chip8Interpreter::new(&mut display);
        i.refresh()
    }
}
