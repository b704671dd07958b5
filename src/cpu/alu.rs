//! The Medusa ALU.
//!
//! The A operand always comes from the ALUin latch and the B operand from
//! the read bus. The ALU only computes: it returns the result byte and the
//! new status word, and the caller decides where the result goes.

use crate::cpu::decode::AluFunction;
use serde::{Serialize, Deserialize};
use std::fmt;

/// The five-bit status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusWord {
    pub positive: bool,
    pub zero: bool,
    pub negative: bool,
    pub carry: bool,
    /// /CDAV: the UART has no character available. Driven by I/O, never
    /// by the ALU.
    pub data_not_available: bool,
}

impl StatusWord {
    /// Classify a raw arithmetic result.
    ///
    /// A value above 0xFF is reported as positive with carry, whatever the
    /// truncated byte looks like. A value below zero sets carry (borrow)
    /// and takes its sign from the truncated byte.
    fn classify(raw: i32, data_not_available: bool) -> (u8, Self) {
        let result = (raw & 0xFF) as u8;
        let mut status = StatusWord { data_not_available, ..Default::default() };

        if raw > 0xFF {
            status.positive = true;
            status.carry = true;
        } else {
            let signed = result as i8;
            status.zero = signed == 0;
            status.positive = signed > 0;
            status.negative = signed < 0;
            status.carry = raw < 0;
        }

        (result, status)
    }

    /// Flags as the `NOTCd,Co,PZN` bit string of the hardware status LEDs.
    pub fn bits(&self) -> String {
        [
            self.data_not_available,
            self.carry,
            self.positive,
            self.zero,
            self.negative,
        ]
        .iter()
        .map(|&b| if b { '1' } else { '0' })
        .collect()
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(NOTCd,Co,PZN): {}", self.bits())
    }
}

/// Evaluate an ALU function.
///
/// `status` is the current status word; only its /CDAV bit survives.
pub fn evaluate(function: AluFunction, a: u8, b: u8, status: StatusWord) -> (u8, StatusWord) {
    let a = i32::from(a);
    let b = i32::from(b);

    let raw = match function {
        AluFunction::PassB => b,
        AluFunction::PassA => a,
        AluFunction::NotA => !a & 0xFF,
        AluFunction::AAndB => a & b,
        AluFunction::AOrB => a | b,
        AluFunction::AXorB => a ^ b,
        AluFunction::APlus1 => a + 1,
        AluFunction::APlusB => a + b,
        AluFunction::APlusBPlus1 => a + b + 1,
        AluFunction::AMinus1 => a - 1,
        AluFunction::AMinusB => a - b,
        AluFunction::AMinusBMinus1 => a - b - 1,
        AluFunction::One => 1,
        AluFunction::Zero => 0,
        AluFunction::MinusOne => 0xFF,
    };

    let (result, next) = StatusWord::classify(raw, status.data_not_available);
    log::trace!(target: "alu", "{} A={:02X} B={:02X} -> {:02X} {}", function, a, b, result, next);
    (result, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(function: AluFunction, a: u8, b: u8) -> (u8, StatusWord) {
        evaluate(function, a, b, StatusWord::default())
    }

    #[test]
    fn test_add_zero() {
        let (r, s) = eval(AluFunction::APlusB, 0, 0);
        assert_eq!(r, 0);
        assert!(s.zero);
        assert!(!s.positive && !s.negative && !s.carry);
    }

    #[test]
    fn test_add_positive() {
        let (r, s) = eval(AluFunction::APlusB, 0x01, 0x00);
        assert_eq!(r, 0x01);
        assert!(s.positive);
        assert!(!s.carry);
    }

    #[test]
    fn test_add_negative_no_carry() {
        let (r, s) = eval(AluFunction::APlusB, 0x50, 0x50);
        assert_eq!(r, 0xA0);
        assert!(s.negative);
        assert!(!s.carry && !s.positive && !s.zero);
    }

    #[test]
    fn test_add_carry() {
        let (r, s) = eval(AluFunction::APlusB, 0xFF, 0x02);
        assert_eq!(r, 0x01);
        assert!(s.positive && s.carry);
        assert!(!s.negative && !s.zero);
    }

    #[test]
    fn test_add_carry_to_zero_byte() {
        let (r, s) = eval(AluFunction::APlusB, 0x80, 0x80);
        assert_eq!(r, 0x00);
        assert!(s.positive && s.carry);
        assert!(!s.zero);
    }

    #[test]
    fn test_add_plus_one() {
        let (r, s) = eval(AluFunction::APlusBPlus1, 0xFF, 0x00);
        assert_eq!(r, 0x00);
        assert!(s.carry);
        assert_eq!(eval(AluFunction::APlus1, 0x7F, 0).0, 0x80);
    }

    #[test]
    fn test_subtract_borrow() {
        let (r, s) = eval(AluFunction::AMinusB, 0x01, 0x02);
        assert_eq!(r, 0xFF);
        assert!(s.negative && s.carry);

        let (r, s) = eval(AluFunction::AMinusB, 0x05, 0x05);
        assert_eq!(r, 0x00);
        assert!(s.zero && !s.carry);

        let (r, s) = eval(AluFunction::AMinusBMinus1, 0x00, 0xFF);
        assert_eq!(r, 0x00);
        assert!(s.zero && s.carry);

        let (r, s) = eval(AluFunction::AMinus1, 0x00, 0);
        assert_eq!(r, 0xFF);
        assert!(s.negative && s.carry);
    }

    #[test]
    fn test_logic_functions() {
        assert_eq!(eval(AluFunction::NotA, 0x0F, 0).0, 0xF0);
        assert_eq!(eval(AluFunction::AAndB, 0xF0, 0x3C).0, 0x30);
        assert_eq!(eval(AluFunction::AOrB, 0xF0, 0x0C).0, 0xFC);
        assert_eq!(eval(AluFunction::AXorB, 0xFF, 0x0F).0, 0xF0);

        let (_, s) = eval(AluFunction::AXorB, 0x55, 0x55);
        assert!(s.zero && !s.carry);
    }

    #[test]
    fn test_pass_and_constants() {
        let (r, s) = eval(AluFunction::PassB, 0x00, 0x90);
        assert_eq!(r, 0x90);
        assert!(s.negative);

        assert_eq!(eval(AluFunction::PassA, 0x12, 0x90).0, 0x12);
        assert_eq!(eval(AluFunction::One, 0x12, 0x90), (1, StatusWord { positive: true, ..Default::default() }));
        assert_eq!(eval(AluFunction::Zero, 0x12, 0x90), (0, StatusWord { zero: true, ..Default::default() }));

        let (r, s) = eval(AluFunction::MinusOne, 0x12, 0x90);
        assert_eq!(r, 0xFF);
        assert!(s.negative && !s.carry);
    }

    #[test]
    fn test_data_not_available_preserved() {
        let status = StatusWord { data_not_available: true, carry: true, ..Default::default() };
        let (_, s) = evaluate(AluFunction::Zero, 0, 0, status);
        assert!(s.data_not_available);
        assert!(!s.carry);
    }

    #[test]
    fn test_status_bits() {
        let s = StatusWord { carry: true, negative: true, ..Default::default() };
        assert_eq!(s.bits(), "01001");
        assert_eq!(s.to_string(), "(NOTCd,Co,PZN): 01001");
    }
}
