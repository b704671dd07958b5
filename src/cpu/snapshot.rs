//! Point-in-time view of the emulator.

use crate::cpu::alu::StatusWord;
use crate::cpu::registers::Register;
use crate::cpu::sequencer::Pipeline;
use serde::{Serialize, Deserialize};
use std::fmt;

/// An owned copy of every register, the sequencer and the status word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Register contents in file order.
    pub registers: Vec<(Register, u8)>,
    pub pipeline: Pipeline,
    pub mux: u8,
    pub mrtn: u8,
    pub mpc: u8,
    pub status: StatusWord,
    pub cycles: u64,
}

impl Snapshot {
    pub fn get(&self, reg: Register) -> u8 {
        self.registers
            .iter()
            .find(|(r, _)| *r == reg)
            .map_or(0, |&(_, v)| v)
    }

    /// Register contents as two hex digits.
    pub fn hex(&self, reg: Register) -> String {
        format!("{:02X}", self.get(reg))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAR:  {} {}", self.hex(Register::MARhi), self.hex(Register::MARlo))?;

        let rest: Vec<String> = self
            .registers
            .iter()
            .filter(|(r, _)| !matches!(r, Register::MARlo | Register::MARhi))
            .map(|(r, v)| format!("{}:{:02X}", r, v))
            .collect();
        writeln!(f, "{}", rest.join("  "))?;

        writeln!(
            f,
            "PipelineWrite:{:02X}  PipelineRead:{:02X}  PipelineALU:{:02X}  PipelineJump:{:02X}  MUX:{:02X}  MRTN:{:02X}  MPC:{:02X}",
            self.pipeline.write,
            self.pipeline.read,
            self.pipeline.alu,
            self.pipeline.jump,
            self.mux,
            self.mrtn,
            self.mpc,
        )?;

        write!(f, " {}", self.status)
    }
}
