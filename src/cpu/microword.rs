//! Medusa microinstruction words.
//!
//! A microinstruction is stored across three EEPROMs:
//!
//! ```text
//!   Hi EEPROM     Mid EEPROM    Low EEPROM
//!   Write Read    ALU  Jump     Jump address
//!   7..4  3..0    7..4 3..0     7..0
//! ```
//!
//! [`MicroWord::to_bits`] packs them into one 24-bit value, hi byte first.

use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// One microinstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroWord {
    write: u8,
    read: u8,
    alu: u8,
    jump: u8,
    jump_address: u8,
    /// Jump label, kept for listings.
    pub label: Option<String>,
    /// Micro-address assigned by the assembler.
    pub address: Option<u8>,
}

impl MicroWord {
    /// Build a word from its four select codes and jump address.
    pub fn new(write: u8, read: u8, alu: u8, jump: u8, jump_address: u8) -> Result<Self, WordError> {
        for (name, code) in [("write", write), ("read", read), ("alu", alu), ("jump", jump)] {
            if code > 0xF {
                return Err(WordError::FieldOverflow { field: name, code });
            }
        }
        Ok(Self {
            write,
            read,
            alu,
            jump,
            jump_address,
            label: None,
            address: None,
        })
    }

    /// Unpack a 24-bit EEPROM word.
    pub fn from_bits(bits: u32) -> Result<Self, WordError> {
        if bits > 0xFF_FFFF {
            return Err(WordError::TooWide(bits));
        }
        let nibble = |shift: u32| ((bits >> shift) & 0xF) as u8;
        Self::new(nibble(20), nibble(16), nibble(12), nibble(8), (bits & 0xFF) as u8)
    }

    /// Pack into a 24-bit EEPROM word.
    pub fn to_bits(&self) -> u32 {
        u32::from(self.write) << 20
            | u32::from(self.read) << 16
            | u32::from(self.alu) << 12
            | u32::from(self.jump) << 8
            | u32::from(self.jump_address)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn at(mut self, address: u8) -> Self {
        self.address = Some(address);
        self
    }

    /// Point the jump field somewhere else (label fix-ups).
    pub fn retarget(&mut self, jump_address: u8) {
        self.jump_address = jump_address;
    }

    #[inline]
    pub fn write(&self) -> u8 {
        self.write
    }

    #[inline]
    pub fn read(&self) -> u8 {
        self.read
    }

    #[inline]
    pub fn alu(&self) -> u8 {
        self.alu
    }

    #[inline]
    pub fn jump(&self) -> u8 {
        self.jump
    }

    #[inline]
    pub fn jump_address(&self) -> u8 {
        self.jump_address
    }
}

impl fmt::Display for MicroWord {
    /// Hi, mid and low EEPROM bytes as hex.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:X}{:X} {:X}{:X} {:02X}",
            self.write, self.read, self.alu, self.jump, self.jump_address
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("{field} code {code:#x} does not fit in 4 bits")]
    FieldOverflow { field: &'static str, code: u8 },

    #[error("microword {0:#x} is wider than 24 bits")]
    TooWide(u32),
}
