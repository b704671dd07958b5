//! Control-code decode table for the Medusa.
//!
//! Every microinstruction carries four 4-bit select codes. The control
//! logic turns them into a write destination, a read source, an ALU
//! function and a micro-jump condition using four 16-row lookup tables
//! (Holzberlein, Table 13.1b "Control Logic Select Codes And Micro-Jump
//! Address Information"):
//!
//! ```text
//! code  write      read       ALU        jump
//!  0    no write   no read    B          no jump
//!  1    Mem        Mem        A          always
//!  2    AClo       AClo       not A      call
//!  3    AChi       AChi       A and B    return
//!  4    BRlo       BRlo       A or B     if negative
//!  5    BRhi       BRhi       A xor B    if zero
//!  6    PClo       PClo       not used   if positive
//!  7    PChi       PChi       A + 1      if carry
//!  8    SPlo       SPlo       A + B      if /CDAV
//!  9    SPhi       SPhi       A + B + 1  not used
//!  A    MARlo      inc PC     A - 1      not used
//!  B    MARhi      inc MAR    A - B      not used
//!  C    not used   not used   A - B - 1  not used
//!  D    ALUin      ALUin      1          not used
//!  E    inc MAR&PC inc MAR&PC 0          not used
//!  F    UART       UART       -1         opcode in
//! ```
//!
//! The built-in table is [`HOLZBERLEIN`]. A replacement can be loaded from
//! a JSON file with one `{write, read, alu, jump}` object per code.

use crate::cpu::registers::Register;
use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of rows in each decode table (one per 4-bit code).
pub const TABLE_ROWS: usize = 16;

/// Which field of a microinstruction a code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Write,
    Read,
    Alu,
    Jump,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Write => "write",
            Field::Read => "read",
            Field::Alu => "alu",
            Field::Jump => "jump",
        })
    }
}

/// What a write or read code selects: a storage register or one of the
/// pseudo codes the control logic handles itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Reg(Register),
    /// "No write" / "no read".
    Nop,
    /// Row marked "not used" in the hardware table.
    Unused,
    /// Memory at the address in MAR.
    Mem,
    IncPc,
    IncMar,
    IncPcMar,
}

impl Slot {
    /// The storage register this slot names, if any.
    pub fn register(self) -> Option<Register> {
        match self {
            Slot::Reg(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_increment(self) -> bool {
        matches!(self, Slot::IncPc | Slot::IncMar | Slot::IncPcMar)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Reg(r) => f.write_str(r.name()),
            Slot::Nop => f.write_str("nop"),
            Slot::Unused => f.write_str("unused"),
            Slot::Mem => f.write_str("MEM"),
            Slot::IncPc => f.write_str("incPC"),
            Slot::IncMar => f.write_str("incMAR"),
            Slot::IncPcMar => f.write_str("incPC_MAR"),
        }
    }
}

impl FromStr for Slot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pseudo = [
            Slot::Nop,
            Slot::Unused,
            Slot::Mem,
            Slot::IncPc,
            Slot::IncMar,
            Slot::IncPcMar,
        ];
        if let Some(slot) = pseudo.iter().find(|p| p.to_string().eq_ignore_ascii_case(s)) {
            return Ok(*slot);
        }
        s.parse::<Register>().map(Slot::Reg)
    }
}

/// Functions the ALU can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AluFunction {
    PassB,
    PassA,
    NotA,
    AAndB,
    AOrB,
    AXorB,
    APlus1,
    APlusB,
    APlusBPlus1,
    AMinus1,
    AMinusB,
    AMinusBMinus1,
    One,
    Zero,
    MinusOne,
}

impl AluFunction {
    pub const ALL: [AluFunction; 15] = [
        AluFunction::PassB,
        AluFunction::PassA,
        AluFunction::NotA,
        AluFunction::AAndB,
        AluFunction::AOrB,
        AluFunction::AXorB,
        AluFunction::APlus1,
        AluFunction::APlusB,
        AluFunction::APlusBPlus1,
        AluFunction::AMinus1,
        AluFunction::AMinusB,
        AluFunction::AMinusBMinus1,
        AluFunction::One,
        AluFunction::Zero,
        AluFunction::MinusOne,
    ];

    /// Whether the function reads the B operand (the read bus).
    pub fn needs_b(self) -> bool {
        matches!(
            self,
            AluFunction::PassB
                | AluFunction::AAndB
                | AluFunction::AOrB
                | AluFunction::AXorB
                | AluFunction::APlusB
                | AluFunction::APlusBPlus1
                | AluFunction::AMinusB
                | AluFunction::AMinusBMinus1
        )
    }

    /// Table notation, e.g. `A+B+1`.
    pub const fn symbol(self) -> &'static str {
        match self {
            AluFunction::PassB => "B",
            AluFunction::PassA => "A",
            AluFunction::NotA => "not A",
            AluFunction::AAndB => "A and B",
            AluFunction::AOrB => "A or B",
            AluFunction::AXorB => "A xor B",
            AluFunction::APlus1 => "A+1",
            AluFunction::APlusB => "A+B",
            AluFunction::APlusBPlus1 => "A+B+1",
            AluFunction::AMinus1 => "A-1",
            AluFunction::AMinusB => "A-B",
            AluFunction::AMinusBMinus1 => "A-B-1",
            AluFunction::One => "1",
            AluFunction::Zero => "0",
            AluFunction::MinusOne => "-1",
        }
    }
}

impl fmt::Display for AluFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for AluFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let squeezed: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        AluFunction::ALL
            .iter()
            .copied()
            .find(|func| {
                let symbol: String = func.symbol().chars().filter(|c| !c.is_whitespace()).collect();
                symbol.eq_ignore_ascii_case(&squeezed)
            })
            .ok_or_else(|| format!("unknown ALU function '{}'", s))
    }
}

/// Micro-jump conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JumpCondition {
    /// Fall through to MPC + 1.
    None,
    Always,
    Call,
    Return,
    IfNegative,
    IfZero,
    IfPositive,
    IfCarry,
    /// Jump while the UART has no character available (/CDAV).
    IfDataUnavailable,
    /// Dispatch on the opcode latched from memory.
    OpcodeIn,
}

impl JumpCondition {
    pub const ALL: [JumpCondition; 10] = [
        JumpCondition::None,
        JumpCondition::Always,
        JumpCondition::Call,
        JumpCondition::Return,
        JumpCondition::IfNegative,
        JumpCondition::IfZero,
        JumpCondition::IfPositive,
        JumpCondition::IfCarry,
        JumpCondition::IfDataUnavailable,
        JumpCondition::OpcodeIn,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            JumpCondition::None => "none",
            JumpCondition::Always => "always",
            JumpCondition::Call => "call",
            JumpCondition::Return => "return",
            JumpCondition::IfNegative => "neg",
            JumpCondition::IfZero => "zero",
            JumpCondition::IfPositive => "pos",
            JumpCondition::IfCarry => "carry",
            JumpCondition::IfDataUnavailable => "notCDAV",
            JumpCondition::OpcodeIn => "opcodeIn",
        }
    }

    /// Whether the jump address field is used.
    pub fn uses_address(self) -> bool {
        !matches!(self, JumpCondition::None | JumpCondition::Return)
    }
}

impl fmt::Display for JumpCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for JumpCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JumpCondition::ALL
            .iter()
            .copied()
            .find(|j| j.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown jump condition '{}'", s))
    }
}

/// The four decode tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlTable {
    write: [Slot; TABLE_ROWS],
    read: [Slot; TABLE_ROWS],
    alu: [Option<AluFunction>; TABLE_ROWS],
    jump: [JumpCondition; TABLE_ROWS],
}

use AluFunction as F;
use JumpCondition as J;
use Register as R;

/// Holzberlein Table 13.1b.
pub const HOLZBERLEIN: ControlTable = ControlTable {
    write: [
        Slot::Nop,
        Slot::Mem,
        Slot::Reg(R::AClo),
        Slot::Reg(R::AChi),
        Slot::Reg(R::BRlo),
        Slot::Reg(R::BRhi),
        Slot::Reg(R::PClo),
        Slot::Reg(R::PChi),
        Slot::Reg(R::SPlo),
        Slot::Reg(R::SPhi),
        Slot::Reg(R::MARlo),
        Slot::Reg(R::MARhi),
        Slot::Unused,
        Slot::Reg(R::ALUin),
        Slot::IncPcMar,
        Slot::Reg(R::UART),
    ],
    read: [
        Slot::Nop,
        Slot::Mem,
        Slot::Reg(R::AClo),
        Slot::Reg(R::AChi),
        Slot::Reg(R::BRlo),
        Slot::Reg(R::BRhi),
        Slot::Reg(R::PClo),
        Slot::Reg(R::PChi),
        Slot::Reg(R::SPlo),
        Slot::Reg(R::SPhi),
        Slot::IncPc,
        Slot::IncMar,
        Slot::Unused,
        Slot::Reg(R::ALUin),
        Slot::IncPcMar,
        Slot::Reg(R::UART),
    ],
    alu: [
        Some(F::PassB),
        Some(F::PassA),
        Some(F::NotA),
        Some(F::AAndB),
        Some(F::AOrB),
        Some(F::AXorB),
        None,
        Some(F::APlus1),
        Some(F::APlusB),
        Some(F::APlusBPlus1),
        Some(F::AMinus1),
        Some(F::AMinusB),
        Some(F::AMinusBMinus1),
        Some(F::One),
        Some(F::Zero),
        Some(F::MinusOne),
    ],
    jump: [
        J::None,
        J::Always,
        J::Call,
        J::Return,
        J::IfNegative,
        J::IfZero,
        J::IfPositive,
        J::IfCarry,
        J::IfDataUnavailable,
        J::None,
        J::None,
        J::None,
        J::None,
        J::None,
        J::None,
        J::OpcodeIn,
    ],
};

impl ControlTable {
    pub fn decode_write(&self, code: u8) -> Result<Slot, DecodeError> {
        let row = Self::row(Field::Write, code)?;
        Ok(self.write[row])
    }

    pub fn decode_read(&self, code: u8) -> Result<Slot, DecodeError> {
        let row = Self::row(Field::Read, code)?;
        Ok(self.read[row])
    }

    pub fn decode_alu(&self, code: u8) -> Result<AluFunction, UnsupportedOperation> {
        self.alu
            .get(code as usize)
            .copied()
            .flatten()
            .ok_or(UnsupportedOperation(code))
    }

    pub fn decode_jump(&self, code: u8) -> Result<JumpCondition, DecodeError> {
        let row = Self::row(Field::Jump, code)?;
        Ok(self.jump[row])
    }

    fn row(field: Field, code: u8) -> Result<usize, DecodeError> {
        if (code as usize) < TABLE_ROWS {
            Ok(code as usize)
        } else {
            Err(DecodeError::CodeOutOfRange { field, code })
        }
    }

    /// Parse a table file: a JSON array of 16 rows in code order.
    pub fn from_json(text: &str) -> Result<Self, TableError> {
        let rows: Vec<TableRow> = serde_json::from_str(text)
            .map_err(|e| TableError::Json(e.to_string()))?;
        Self::from_rows(&rows)
    }

    /// Load a table file from disk.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self, TableError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| TableError::IoError(e.to_string()))?;
        Self::from_json(&text)
    }

    /// Build a table from rows, rejecting unknown identifiers.
    pub fn from_rows(rows: &[TableRow]) -> Result<Self, TableError> {
        if rows.len() != TABLE_ROWS {
            return Err(TableError::RowCount(rows.len()));
        }

        let mut table = HOLZBERLEIN;
        for (i, row) in rows.iter().enumerate() {
            let unknown = |column: Field, name: &str| TableError::UnknownIdentifier {
                row: i,
                column,
                name: name.to_string(),
            };

            table.write[i] = row.write.parse().map_err(|_| unknown(Field::Write, &row.write))?;
            table.read[i] = row.read.parse().map_err(|_| unknown(Field::Read, &row.read))?;
            table.alu[i] = if row.alu.eq_ignore_ascii_case("unused") {
                None
            } else {
                Some(row.alu.parse().map_err(|_| unknown(Field::Alu, &row.alu))?)
            };
            table.jump[i] = row.jump.parse().map_err(|_| unknown(Field::Jump, &row.jump))?;
        }

        Ok(table)
    }

    /// The table as file rows, in code order.
    pub fn to_rows(&self) -> Vec<TableRow> {
        (0..TABLE_ROWS)
            .map(|i| TableRow {
                write: self.write[i].to_string(),
                read: self.read[i].to_string(),
                alu: self.alu[i].map_or_else(|| "unused".to_string(), |f| f.to_string()),
                jump: self.jump[i].to_string(),
            })
            .collect()
    }

    pub fn to_json(&self) -> String {
        // Serializing a Vec of string structs cannot fail.
        serde_json::to_string_pretty(&self.to_rows()).unwrap_or_default()
    }
}

impl Default for ControlTable {
    fn default() -> Self {
        HOLZBERLEIN
    }
}

/// One row of a table file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub write: String,
    pub read: String,
    pub alu: String,
    pub jump: String,
}

/// A microinstruction field that does not resolve to something the
/// sequencer can execute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("{field} code {code:#x} is outside the 4-bit range")]
    CodeOutOfRange { field: Field, code: u8 },

    #[error("{field} code {code:#x} is not used")]
    UnusedCode { field: Field, code: u8 },

    #[error("{field} code {code:#x} selects {slot}, which is not a register")]
    NotARegister { field: Field, code: u8, slot: Slot },

    #[error("ALU function {function} needs a B operand but read code {code:#x} selects none")]
    MissingOperand { function: AluFunction, code: u8 },
}

/// ALU code with no function behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unsupported ALU function code {0:#x}")]
pub struct UnsupportedOperation(pub u8);

/// Errors loading a control table file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("malformed table file: {0}")]
    Json(String),

    #[error("expected {} rows, found {0}", TABLE_ROWS)]
    RowCount(usize),

    #[error("row {row:#x}, {column} column: unknown identifier '{name}'")]
    UnknownIdentifier { row: usize, column: Field, name: String },
}
