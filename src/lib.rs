//! # chip8
//!
//! A CHIP-8 virtual machine: memory, registers, stack and a pluggable
//! display, driven one instruction at a time.
//!
//! ## Design
//!
//! * the core is the machine state plus `step()`; nothing in it blocks,
//!   sleeps or spawns
//! * abstract display so can plug alternatives; starting with TUI in-console
//! * the host drives `step()` as often as it likes and stops when it reports
//!   the program has run out
//! * errors come back as values; diagnostics that don't stop the machine go
//!   through `log`
//!
//! Model
//!
//! Host (main.rs)
//!  |-- config, display, ROM
//!  |-- interpreter(display, config)
//!  |    |-- memory(config)
//!  |    |-- registers, stack
//!  |    `-- instruction set(config)
//!  `-- main loop
//!       |-- up to N x interpreter.step()
//!       |-- interpreter.refresh()
//!       `-- sleep to the next frame
//!
//! Control transfers are followed by the same +2 advance of PC as every other
//! instruction, and draws only ever add pixels. Both are the behaviour of the
//! machine this reproduces and are kept on purpose.
pub mod config;
pub mod display;
pub mod error;
pub mod instruction;
pub mod interpreter;
pub mod memory;
pub mod registers;
pub mod rom;
pub mod stack;

pub use config::{DispatchMode, InterpreterConfig, MemoryPolicy};
pub use display::{Display, PixelGrid, SCREEN_HEIGHT, SCREEN_WIDTH};
pub use error::{Chip8Error, MemoryError, RegisterError, RomError};
pub use instruction::{Instruction, Operand};
pub use interpreter::Chip8Interpreter;
pub use registers::{Register, RegisterFile};
pub use rom::{Rom, RomFormat};
