//! Disassembler for Medusa microcode.
//!
//! Renders microinstructions as register transfers, e.g.
//! `SPlo := ALUin + BRhi ; CALL 40`.

use crate::cpu::decode::{AluFunction, ControlTable, JumpCondition, Slot};
use crate::cpu::microword::MicroWord;

/// Disassemble a single word to register-transfer text.
pub fn disassemble_word(word: &MicroWord, table: &ControlTable) -> String {
    let transfer = match format_transfer(word, table) {
        Some(text) => text,
        None => return format!("??? ; {}", word),
    };

    match table.decode_jump(word.jump()) {
        Ok(JumpCondition::None) => transfer,
        Ok(condition) => format!("{} ; {}", transfer, format_jump(condition, word.jump_address())),
        Err(_) => format!("{} ; ???", transfer),
    }
}

/// Disassemble a microprogram back to listing source.
///
/// The output assembles to the same words.
pub fn disassemble(words: &[MicroWord], table: &ControlTable) -> String {
    let mut output = String::new();
    output.push_str("; Medusa microcode listing\n");
    output.push_str("; ------------------------\n\n");

    let mut next: Option<u8> = Some(0);
    for (i, word) in words.iter().enumerate() {
        let addr = word.address.unwrap_or(i as u8);
        if next != Some(addr) {
            output.push_str(&format!("        ORG {:02X}\n", addr));
        }
        next = addr.checked_add(1);

        let label = word
            .label
            .as_ref()
            .map_or_else(String::new, |l| format!("{}:", l));
        output.push_str(&format!(
            "{:<8} {}    ; {:02X}  {}\n",
            label,
            word,
            addr,
            disassemble_word(word, table)
        ));
    }

    output
}

/// The data-path half of a word, or None if it does not decode.
fn format_transfer(word: &MicroWord, table: &ControlTable) -> Option<String> {
    let write = table.decode_write(word.write()).ok()?;
    let read = table.decode_read(word.read()).ok()?;

    if write == Slot::IncPcMar || read == Slot::IncPcMar {
        return Some("MAR++, PC++".to_string());
    }
    match read {
        Slot::IncPc => return Some("PC++".to_string()),
        Slot::IncMar => return Some("MAR++".to_string()),
        _ => {}
    }
    if write == Slot::Nop {
        return Some("--".to_string());
    }

    let dest = slot_name(write);
    let src = slot_name(read);
    let function = table.decode_alu(word.alu()).ok()?;

    let expr = match function {
        AluFunction::PassB => src,
        AluFunction::PassA => "ALUin".to_string(),
        AluFunction::NotA => "not ALUin".to_string(),
        AluFunction::AAndB => format!("ALUin and {}", src),
        AluFunction::AOrB => format!("ALUin or {}", src),
        AluFunction::AXorB => format!("ALUin xor {}", src),
        AluFunction::APlus1 => "ALUin + 1".to_string(),
        AluFunction::APlusB => format!("ALUin + {}", src),
        AluFunction::APlusBPlus1 => format!("ALUin + {} + 1", src),
        AluFunction::AMinus1 => "ALUin - 1".to_string(),
        AluFunction::AMinusB => format!("ALUin - {}", src),
        AluFunction::AMinusBMinus1 => format!("ALUin - {} - 1", src),
        AluFunction::One => "1".to_string(),
        AluFunction::Zero => "0".to_string(),
        AluFunction::MinusOne => "-1".to_string(),
    };

    Some(format!("{} := {}", dest, expr))
}

fn slot_name(slot: Slot) -> String {
    match slot {
        Slot::Mem => "M(MAR)".to_string(),
        other => other.to_string(),
    }
}

fn format_jump(condition: JumpCondition, addr: u8) -> String {
    match condition {
        JumpCondition::None => String::new(),
        JumpCondition::Always => format!("JUMP {:02X}", addr),
        JumpCondition::Call => format!("CALL {:02X}", addr),
        JumpCondition::Return => "RTN".to_string(),
        JumpCondition::OpcodeIn => "OPCODE-IN".to_string(),
        conditional => format!("JUMP {} {:02X}", conditional, addr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assembler::assemble;
    use crate::cpu::decode::HOLZBERLEIN;

    fn word(write: u8, read: u8, alu: u8, jump: u8, addr: u8) -> MicroWord {
        MicroWord::new(write, read, alu, jump, addr).unwrap()
    }

    #[test]
    fn test_disassemble_transfer() {
        let text = disassemble_word(&word(8, 5, 8, 0, 0), &HOLZBERLEIN);
        assert_eq!(text, "SPlo := ALUin + BRhi");
    }

    #[test]
    fn test_disassemble_increment_and_call() {
        assert_eq!(disassemble_word(&word(14, 0, 0, 0, 0), &HOLZBERLEIN), "MAR++, PC++");
        assert_eq!(disassemble_word(&word(0, 0, 0, 2, 0x40), &HOLZBERLEIN), "-- ; CALL 40");
        assert_eq!(disassemble_word(&word(4, 2, 0, 5, 0x12), &HOLZBERLEIN), "BRlo := AClo ; JUMP zero 12");
    }

    #[test]
    fn test_disassemble_memory_read() {
        assert_eq!(disassemble_word(&word(13, 1, 0, 0, 0), &HOLZBERLEIN), "ALUin := M(MAR)");
    }

    #[test]
    fn test_disassemble_unsupported() {
        let text = disassemble_word(&word(2, 3, 6, 0, 0), &HOLZBERLEIN);
        assert!(text.starts_with("???"));
    }

    #[test]
    fn test_listing_reassembles() {
        let source = "TOP: D9 00 xx\nE0 00 00\nORG 40\nSUB: 00 03 xx\n";
        let words = assemble(source).unwrap();
        let listing = disassemble(&words, &HOLZBERLEIN);
        assert!(listing.contains("ORG 40"));
        assert_eq!(assemble(&listing).unwrap(), words);
    }

    #[test]
    fn test_long_label_keeps_its_column() {
        let words = assemble("OP-FETCH: 52 00 00\n00 01 OP-FETCH\n").unwrap();
        let listing = disassemble(&words, &HOLZBERLEIN);
        assert!(listing.contains("OP-FETCH: 52 00 00"));
        assert_eq!(assemble(&listing).unwrap(), words);
    }
}
