//! The Medusa microsequencer.
//!
//! Holds the micro-program counter (MPC), the pipeline latches that hold
//! the select codes of the word being executed, the MUX register that
//! feeds the next fetch, and the single-entry micro-return register
//! (MRTN) used by micro-calls.

use crate::cpu::alu::StatusWord;
use crate::cpu::decode::JumpCondition;
use crate::cpu::microword::MicroWord;
use serde::{Serialize, Deserialize};

/// Pipeline latches: select codes of the last executed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Pipeline {
    pub write: u8,
    pub read: u8,
    pub alu: u8,
    pub jump: u8,
}

/// Microsequencer registers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Microsequencer {
    pub pipeline: Pipeline,
    /// Next-fetch register.
    pub mux: u8,
    /// Micro-return address.
    pub mrtn: u8,
    /// Micro-program counter.
    pub mpc: u8,
}

/// Where the sequencer goes next, computed before anything is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextAddress {
    pub mpc: u8,
    pub mrtn: u8,
}

impl Microsequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Resolve the next micro-address for `condition`.
    ///
    /// `OpcodeIn` needs the opcode latched from main memory, which this
    /// core does not model; it falls through.
    pub fn resolve(&self, condition: JumpCondition, target: u8, status: &StatusWord) -> NextAddress {
        let fall_through = self.mpc.wrapping_add(1);
        let branch = |taken: bool| if taken { target } else { fall_through };

        let (mpc, mrtn) = match condition {
            JumpCondition::None | JumpCondition::OpcodeIn => (fall_through, self.mrtn),
            JumpCondition::Always => (target, self.mrtn),
            JumpCondition::Call => (target, fall_through),
            JumpCondition::Return => (self.mrtn, self.mrtn),
            JumpCondition::IfNegative => (branch(status.negative), self.mrtn),
            JumpCondition::IfZero => (branch(status.zero), self.mrtn),
            JumpCondition::IfPositive => (branch(status.positive), self.mrtn),
            JumpCondition::IfCarry => (branch(status.carry), self.mrtn),
            JumpCondition::IfDataUnavailable => (branch(status.data_not_available), self.mrtn),
        };

        NextAddress { mpc, mrtn }
    }

    /// Latch a word's codes and move to the resolved address.
    pub fn commit(&mut self, word: &MicroWord, next: NextAddress) {
        self.pipeline = Pipeline {
            write: word.write(),
            read: word.read(),
            alu: word.alu(),
            jump: word.jump(),
        };
        self.mpc = next.mpc;
        self.mux = next.mpc;
        self.mrtn = next.mrtn;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_at(mpc: u8) -> Microsequencer {
        Microsequencer { mpc, ..Default::default() }
    }

    #[test]
    fn test_fall_through_wraps() {
        let seq = seq_at(0xFF);
        let next = seq.resolve(JumpCondition::None, 0x40, &StatusWord::default());
        assert_eq!(next.mpc, 0x00);
    }

    #[test]
    fn test_always() {
        let next = seq_at(3).resolve(JumpCondition::Always, 0x40, &StatusWord::default());
        assert_eq!(next.mpc, 0x40);
    }

    #[test]
    fn test_call_then_return() {
        let mut seq = seq_at(0x10);
        let word = MicroWord::new(0, 0, 0, 2, 0x80).unwrap();
        let next = seq.resolve(JumpCondition::Call, 0x80, &StatusWord::default());
        seq.commit(&word, next);
        assert_eq!(seq.mpc, 0x80);
        assert_eq!(seq.mrtn, 0x11);

        let ret = MicroWord::new(0, 0, 0, 3, 0).unwrap();
        let next = seq.resolve(JumpCondition::Return, 0, &StatusWord::default());
        seq.commit(&ret, next);
        assert_eq!(seq.mpc, 0x11);
        assert_eq!(seq.mux, 0x11);
        assert_eq!(seq.pipeline.jump, 3);
    }

    #[test]
    fn test_conditional_jumps() {
        let seq = seq_at(5);
        let cases = [
            (JumpCondition::IfNegative, StatusWord { negative: true, ..Default::default() }),
            (JumpCondition::IfZero, StatusWord { zero: true, ..Default::default() }),
            (JumpCondition::IfPositive, StatusWord { positive: true, ..Default::default() }),
            (JumpCondition::IfCarry, StatusWord { carry: true, ..Default::default() }),
            (JumpCondition::IfDataUnavailable, StatusWord { data_not_available: true, ..Default::default() }),
        ];

        for (condition, status) in cases {
            assert_eq!(seq.resolve(condition, 0x20, &status).mpc, 0x20, "{} taken", condition);
            assert_eq!(seq.resolve(condition, 0x20, &StatusWord::default()).mpc, 6, "{} not taken", condition);
        }
    }

    #[test]
    fn test_opcode_in_falls_through() {
        let next = seq_at(9).resolve(JumpCondition::OpcodeIn, 0x33, &StatusWord::default());
        assert_eq!(next.mpc, 10);
    }
}
