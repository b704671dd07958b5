//! Medusa data-path registers.
//!
//! The Medusa has twelve 8-bit registers on its data path:
//! - MAR: 16-bit memory address register, split into lo/hi halves
//! - UART: the serial data slot (no device behind it here)
//! - AC, BR, PC, SP: 16-bit accumulator, buffer, program counter and
//!   stack pointer, each split into lo/hi halves
//! - ALUin: the latch feeding the ALU's A operand
//!
//! PC and MAR are built from cascaded counter chips, so incrementing the
//! low half past 0xFF carries into the high half.

use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;

/// A storage register, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Register {
    MARlo,
    MARhi,
    UART,
    AClo,
    AChi,
    BRlo,
    BRhi,
    PClo,
    PChi,
    SPlo,
    SPhi,
    ALUin,
}

impl Register {
    /// Number of storage registers.
    pub const COUNT: usize = 12;

    /// Every register in file order.
    pub const ALL: [Register; Self::COUNT] = [
        Register::MARlo,
        Register::MARhi,
        Register::UART,
        Register::AClo,
        Register::AChi,
        Register::BRlo,
        Register::BRhi,
        Register::PClo,
        Register::PChi,
        Register::SPlo,
        Register::SPhi,
        Register::ALUin,
    ];

    /// Position in the register file.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short name as printed in listings and snapshots.
    pub const fn name(self) -> &'static str {
        match self {
            Register::MARlo => "MARlo",
            Register::MARhi => "MARhi",
            Register::UART => "UART",
            Register::AClo => "AClo",
            Register::AChi => "AChi",
            Register::BRlo => "BRlo",
            Register::BRhi => "BRhi",
            Register::PClo => "PClo",
            Register::PChi => "PChi",
            Register::SPlo => "SPlo",
            Register::SPhi => "SPhi",
            Register::ALUin => "ALUin",
        }
    }

    /// Whether reset clears this register to zero instead of 0xFF.
    pub const fn resets_to_zero(self) -> bool {
        matches!(
            self,
            Register::PClo | Register::PChi | Register::MARlo | Register::MARhi
        )
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::ALL
            .iter()
            .copied()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown register '{}'", s))
    }
}

/// Contents of the register file after a reset, for every register
/// that does not reset to zero.
pub const RESET_FILL: u8 = 0xFF;

/// The Medusa register file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFile {
    values: [u8; Register::COUNT],
}

impl RegisterFile {
    /// Create a register file in its reset state.
    pub fn new() -> Self {
        let mut file = Self { values: [0; Register::COUNT] };
        file.reset();
        file
    }

    /// PC and MAR halves to zero, everything else to 0xFF.
    pub fn reset(&mut self) {
        for reg in Register::ALL {
            self.values[reg.index()] = if reg.resets_to_zero() { 0 } else { RESET_FILL };
        }
    }

    #[inline]
    pub fn get(&self, reg: Register) -> u8 {
        self.values[reg.index()]
    }

    #[inline]
    pub fn set(&mut self, reg: Register, value: u8) {
        self.values[reg.index()] = value;
    }

    /// Store a value wider than a byte, keeping only the low 8 bits.
    #[inline]
    pub fn set_masked(&mut self, reg: Register, value: u32) {
        self.values[reg.index()] = (value & 0xFF) as u8;
    }

    /// Increment a lo/hi pair as one 16-bit counter.
    ///
    /// Status flags are not involved: the hardware counters sit beside
    /// the ALU, not behind it.
    pub fn increment_pair(&mut self, lo: Register, hi: Register) {
        let low = self.get(lo);
        if low == 0xFF {
            self.set(lo, 0);
            self.set(hi, self.get(hi).wrapping_add(1));
        } else {
            self.set(lo, low + 1);
        }
    }

    /// Read a lo/hi pair as a 16-bit value.
    pub fn pair(&self, lo: Register, hi: Register) -> u16 {
        u16::from(self.get(hi)) << 8 | u16::from(self.get(lo))
    }

    /// Program counter as a 16-bit value.
    pub fn pc(&self) -> u16 {
        self.pair(Register::PClo, Register::PChi)
    }

    /// Memory address register as a 16-bit value.
    pub fn mar(&self) -> u16 {
        self.pair(Register::MARlo, Register::MARhi)
    }

    pub fn increment_pc(&mut self) {
        self.increment_pair(Register::PClo, Register::PChi);
    }

    pub fn increment_mar(&mut self) {
        self.increment_pair(Register::MARlo, Register::MARhi);
    }

    /// Iterate over (register, value) in file order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, u8)> + '_ {
        Register::ALL.iter().map(move |&r| (r, self.get(r)))
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (reg, value) in self.iter() {
            map.entry(&reg.name(), &format_args!("{:02X}", value));
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_values() {
        let regs = RegisterFile::new();
        for (reg, value) in regs.iter() {
            if reg.resets_to_zero() {
                assert_eq!(value, 0, "{} should reset to 0", reg);
            } else {
                assert_eq!(value, 0xFF, "{} should reset to FF", reg);
            }
        }
    }

    #[test]
    fn test_set_masked() {
        let mut regs = RegisterFile::new();
        regs.set_masked(Register::AClo, 0x1A5);
        assert_eq!(regs.get(Register::AClo), 0xA5);
    }

    #[test]
    fn test_increment_pair_no_carry() {
        let mut regs = RegisterFile::new();
        regs.set(Register::PClo, 0x41);
        regs.set(Register::PChi, 0x07);
        regs.increment_pc();
        assert_eq!(regs.get(Register::PClo), 0x42);
        assert_eq!(regs.get(Register::PChi), 0x07);
    }

    #[test]
    fn test_increment_pair_carry() {
        let mut regs = RegisterFile::new();
        regs.set(Register::MARlo, 0xFF);
        regs.set(Register::MARhi, 0x22);
        regs.increment_mar();
        assert_eq!(regs.mar(), 0x2300);
    }

    #[test]
    fn test_increment_pair_wraps() {
        let mut regs = RegisterFile::new();
        regs.set(Register::PClo, 0xFF);
        regs.set(Register::PChi, 0xFF);
        regs.increment_pc();
        assert_eq!(regs.pc(), 0x0000);
    }

    #[test]
    fn test_register_names_roundtrip() {
        for reg in Register::ALL {
            assert_eq!(reg.name().parse::<Register>().unwrap(), reg);
        }
        assert!("ACmid".parse::<Register>().is_err());
    }
}
