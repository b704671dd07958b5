//! CPU emulation for the Medusa microprocessor.
//!
//! This module models the Medusa at the register-transfer level:
//! - twelve 8-bit data-path registers with paired PC/MAR counters
//! - the Table 13.1b control-code decoder
//! - an ALU with a five-bit status word
//! - a microsequencer with a 256-word control store

pub mod registers;
pub mod decode;
pub mod alu;
pub mod microword;
pub mod microstore;
pub mod sequencer;
pub mod snapshot;
pub mod execute;

pub use registers::{Register, RegisterFile};
pub use decode::{
    AluFunction, ControlTable, DecodeError, JumpCondition, Slot, TableError,
    UnsupportedOperation, HOLZBERLEIN,
};
pub use alu::StatusWord;
pub use microword::{MicroWord, WordError};
pub use microstore::Microstore;
pub use sequencer::Microsequencer;
pub use snapshot::Snapshot;
pub use execute::{CpuError, Medusa, StepResult};
