//! # Medusa Simulator
//!
//! A register-transfer emulator of the Medusa microprocessor from
//! Holzberlein's microprogramming course.
//!
//! The Medusa is an 8-bit data path driven by a 24-bit horizontal
//! microword. Each word names a destination register, a source register,
//! an ALU function and a jump condition; the microsequencer picks the next
//! micro-address from the status word. This crate decodes and executes
//! those words against a twelve-register data path, and ships a listing
//! assembler and a terminal debugger around the core.

pub mod cpu;
pub mod asm;
pub mod logging;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types
pub use cpu::{
    AluFunction, ControlTable, CpuError, DecodeError, JumpCondition, Medusa, MicroWord,
    Register, RegisterFile, Snapshot, StatusWord, StepResult, HOLZBERLEIN,
};
pub use asm::{assemble, disassemble, load_listing, save_listing, AssemblerError, ListingError};

#[cfg(feature = "tui")]
pub use tui::run_debugger;
