//! Assembler and disassembler for Medusa microcode.
//!
//! This module provides:
//! - A listing assembler (hex EEPROM columns with labels → microwords)
//! - A disassembler (microwords → register-transfer text / listing)
//! - Listing file load and save

pub mod assembler;
pub mod disasm;
pub mod listing;

pub use assembler::{assemble, AssemblerError};
pub use disasm::{disassemble, disassemble_word};
pub use listing::{load_listing, save_listing, ListingError};
