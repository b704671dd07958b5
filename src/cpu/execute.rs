//! Microinstruction execution for the Medusa.
//!
//! [`Medusa`] owns the register file, status word, microsequencer, decode
//! table and control store. One call to [`Medusa::step`] runs a whole
//! fetch/decode/execute/jump cycle. Everything a step needs is decided
//! before anything is written, so a failed step leaves no trace.

use crate::cpu::alu::{self, StatusWord};
use crate::cpu::decode::{ControlTable, DecodeError, Field, Slot, UnsupportedOperation};
use crate::cpu::microstore::{Microstore, MicrostoreError};
use crate::cpu::microword::MicroWord;
use crate::cpu::registers::{Register, RegisterFile};
use crate::cpu::sequencer::{Microsequencer, NextAddress};
use crate::cpu::snapshot::Snapshot;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// Outcome of one microinstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// New MPC.
    pub next_address: u8,
    pub status: StatusWord,
    /// Whether any register now holds a different value.
    pub mutated: bool,
    /// Register written through the ALU, if any.
    pub destination: Option<Register>,
}

/// Register action decided during decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    IncrementPcMar,
    IncrementPc,
    IncrementMar,
    /// No write: the word only sequences.
    Idle,
    Transfer { dest: Register, value: u8 },
}

/// The Medusa emulator context.
#[derive(Clone, Serialize, Deserialize)]
pub struct Medusa {
    /// Data-path registers.
    pub regs: RegisterFile,
    /// Status word from the last ALU operation.
    pub status: StatusWord,
    /// Microsequencer registers.
    pub seq: Microsequencer,
    /// Control store.
    pub microstore: Microstore,
    /// Executed microinstructions since reset.
    pub cycles: u64,
    table: ControlTable,
}

impl Medusa {
    /// Create an emulator in its reset state with the built-in table.
    pub fn new() -> Self {
        Self::with_table(ControlTable::default())
    }

    /// Create an emulator that decodes through `table`.
    pub fn with_table(table: ControlTable) -> Self {
        Self {
            regs: RegisterFile::new(),
            status: StatusWord::default(),
            seq: Microsequencer::new(),
            microstore: Microstore::new(),
            cycles: 0,
            table,
        }
    }

    /// System reset. The control store is EEPROM and survives.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.status = StatusWord::default();
        self.seq.reset();
        self.cycles = 0;
    }

    pub fn table(&self) -> &ControlTable {
        &self.table
    }

    pub fn set_table(&mut self, table: ControlTable) {
        self.table = table;
    }

    /// Drive the /CDAV status bit from outside the core.
    pub fn set_data_not_available(&mut self, unavailable: bool) {
        self.status.data_not_available = unavailable;
    }

    /// Load a microprogram into the control store.
    pub fn load_microcode(&mut self, program: &[MicroWord]) -> Result<(), MicrostoreError> {
        self.microstore.load_program(program)
    }

    /// Execute one microinstruction.
    pub fn step(&mut self, word: &MicroWord) -> Result<StepResult, CpuError> {
        let (action, status, next) = self.plan(word).map_err(|e| {
            log::debug!(target: "useq", "{:02X}: {} rejected: {}", self.seq.mpc, word, e);
            e
        })?;

        // An increment always changes the low half.
        let (destination, mutated) = match action {
            Action::IncrementPcMar => {
                self.regs.increment_mar();
                self.regs.increment_pc();
                (None, true)
            }
            Action::IncrementPc => {
                self.regs.increment_pc();
                (None, true)
            }
            Action::IncrementMar => {
                self.regs.increment_mar();
                (None, true)
            }
            Action::Idle => (None, false),
            Action::Transfer { dest, value } => {
                let changed = self.regs.get(dest) != value;
                self.regs.set(dest, value);
                (Some(dest), changed)
            }
        };

        log::trace!(
            target: "useq",
            "{:02X}: {} {:?} -> {:02X} {}",
            self.seq.mpc, word, action, next.mpc, status
        );

        self.status = status;
        self.seq.commit(word, next);
        self.cycles += 1;

        Ok(StepResult {
            next_address: next.mpc,
            status,
            mutated,
            destination,
        })
    }

    /// Fetch the word at MPC from the control store and execute it.
    pub fn cycle(&mut self) -> Result<StepResult, CpuError> {
        let mpc = self.seq.mpc;
        let word = self
            .microstore
            .read(mpc)
            .cloned()
            .ok_or(CpuError::EmptyMicroAddress(mpc))?;
        self.step(&word)
    }

    /// Run at most `max_cycles` words from the control store.
    ///
    /// Returns the number executed.
    pub fn run_limited(&mut self, max_cycles: u64) -> Result<u64, CpuError> {
        let start = self.cycles;
        while self.cycles - start < max_cycles {
            self.cycle()?;
        }
        Ok(self.cycles - start)
    }

    /// A consistent copy of the visible state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            registers: self.regs.iter().collect(),
            pipeline: self.seq.pipeline,
            mux: self.seq.mux,
            mrtn: self.seq.mrtn,
            mpc: self.seq.mpc,
            status: self.status,
            cycles: self.cycles,
        }
    }

    /// Decode a word and compute its effects without committing them.
    fn plan(&self, word: &MicroWord) -> Result<(Action, StatusWord, NextAddress), CpuError> {
        let write = self.table.decode_write(word.write())?;
        let read = self.table.decode_read(word.read())?;
        let condition = self.table.decode_jump(word.jump())?;

        // Increments bypass the ALU and keep the status word.
        let (action, status) = if write == Slot::IncPcMar || read == Slot::IncPcMar {
            (Action::IncrementPcMar, self.status)
        } else if read == Slot::IncPc {
            (Action::IncrementPc, self.status)
        } else if read == Slot::IncMar {
            (Action::IncrementMar, self.status)
        } else if write == Slot::Nop {
            (Action::Idle, self.status)
        } else {
            let dest = register_for(Field::Write, word.write(), write)?;
            let function = self.table.decode_alu(word.alu())?;

            let b = match read {
                Slot::Reg(r) => self.regs.get(r),
                _ if !function.needs_b() => 0,
                Slot::Nop => {
                    return Err(DecodeError::MissingOperand { function, code: word.read() }.into())
                }
                other => register_for(Field::Read, word.read(), other).map(|r| self.regs.get(r))?,
            };

            let a = self.regs.get(Register::ALUin);
            let (value, status) = alu::evaluate(function, a, b, self.status);
            (Action::Transfer { dest, value }, status)
        };

        let next = self.seq.resolve(condition, word.jump_address(), &status);
        Ok((action, status, next))
    }
}

/// The storage register behind a write or read slot.
fn register_for(field: Field, code: u8, slot: Slot) -> Result<Register, DecodeError> {
    match slot {
        Slot::Reg(r) => Ok(r),
        Slot::Unused => Err(DecodeError::UnusedCode { field, code }),
        other => Err(DecodeError::NotARegister { field, code, slot: other }),
    }
}

impl Default for Medusa {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Medusa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Medusa")
            .field("cycles", &self.cycles)
            .field("mpc", &self.seq.mpc)
            .field("status", &self.status)
            .field("regs", &self.regs)
            .finish()
    }
}

/// Errors that can occur while stepping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("{0}")]
    Unsupported(#[from] UnsupportedOperation),

    #[error("no microinstruction at micro-address {0:#04x}")]
    EmptyMicroAddress(u8),
}
