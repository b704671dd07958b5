//! Microcode listing assembler.
//!
//! A listing holds one microinstruction per line, written the way the
//! textbook tables print them: the hi, mid and low EEPROM bytes in hex.
//!
//! ```text
//! ; Comment
//! OP-IN:  01 0F xx        ; MUX := M(MAR)
//!         E0 00 00        ; MAR++, PC++
//!         00 01 OP-IN     ; jump to a label
//!
//!         ORG 40          ; next word goes to micro-address 0x40
//! SUB:    D9 03 xx        ; ALUin := SPhi, return
//! ```
//!
//! The address column takes two hex digits, `xx` (don't care, assembled
//! as 00) or a label. A one- or two-character token made only of hex
//! digits is read as a number, so labels like `AB` cannot be referenced.

use crate::cpu::microword::MicroWord;
use std::collections::HashMap;
use thiserror::Error;

/// Assemble listing source to microinstruction words.
///
/// Every word carries its micro-address and its label, if it had one.
pub fn assemble(source: &str) -> Result<Vec<MicroWord>, AssemblerError> {
    let mut asm = Assembler::new();
    asm.assemble(source)
}

/// The assembler state.
struct Assembler {
    /// Micro-address of the next word.
    current_addr: usize,
    /// Label -> micro-address.
    symbols: HashMap<String, u8>,
    /// Words waiting for a label: (output index, label, source line).
    pending: Vec<(usize, String, usize)>,
    /// Labels waiting for the next word: (label, source line).
    labels: Vec<(String, usize)>,
    output: Vec<MicroWord>,
}

impl Assembler {
    fn new() -> Self {
        Self {
            current_addr: 0,
            symbols: HashMap::new(),
            pending: Vec::new(),
            labels: Vec::new(),
            output: Vec::new(),
        }
    }

    fn assemble(&mut self, source: &str) -> Result<Vec<MicroWord>, AssemblerError> {
        for (line_num, line) in source.lines().enumerate() {
            self.process_line(line, line_num + 1)?;
        }

        // Labels after the last word name the address past it.
        if let Some(&(_, line_num)) = self.labels.last() {
            let addr = self.address(line_num)?;
            self.bind_labels(addr);
        }

        self.resolve_references()?;
        log::debug!(target: "asm", "assembled {} words, {} labels", self.output.len(), self.symbols.len());

        Ok(std::mem::take(&mut self.output))
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let line = match line.find(';') {
            Some(idx) => line[..idx].trim(),
            None => line.trim(),
        };
        if line.is_empty() {
            return Ok(());
        }

        let mut tokens: Vec<&str> = line.split_whitespace().collect();

        if let Some(label) = tokens[0].strip_suffix(':') {
            self.define_label(label, line_num)?;
            tokens.remove(0);
        }

        match tokens.as_slice() {
            [] => Ok(()),
            [directive, operand] if directive.eq_ignore_ascii_case("ORG") => {
                let addr = u8::from_str_radix(operand, 16).map_err(|_| AssemblerError::SyntaxError {
                    line: line_num,
                    message: format!("ORG needs a hex micro-address, found '{}'", operand),
                })?;
                self.current_addr = addr as usize;
                Ok(())
            }
            [hi, mid, low] => self.process_word(hi, mid, low, line_num),
            _ => Err(AssemblerError::SyntaxError {
                line: line_num,
                message: format!("expected '<hi> <mid> <addr>', found '{}'", tokens.join(" ")),
            }),
        }
    }

    fn define_label(&mut self, label: &str, line_num: usize) -> Result<(), AssemblerError> {
        let label = label.trim().to_uppercase();
        if label.is_empty() {
            return Err(AssemblerError::SyntaxError { line: line_num, message: "empty label".into() });
        }
        if self.symbols.contains_key(&label) || self.labels.iter().any(|(l, _)| *l == label) {
            return Err(AssemblerError::DuplicateLabel { line: line_num, label });
        }
        // Bound when the next word is placed, so an ORG in between moves it.
        self.labels.push((label, line_num));
        Ok(())
    }

    /// Point every waiting label at `addr`; returns the last one.
    fn bind_labels(&mut self, addr: u8) -> Option<String> {
        let mut last = None;
        for (label, _) in self.labels.drain(..) {
            self.symbols.insert(label.clone(), addr);
            last = Some(label);
        }
        last
    }

    fn process_word(&mut self, hi: &str, mid: &str, low: &str, line_num: usize) -> Result<(), AssemblerError> {
        let hi = parse_byte(hi, "hi", line_num)?;
        let mid = parse_byte(mid, "mid", line_num)?;

        let jump_address = if low.eq_ignore_ascii_case("xx") {
            0
        } else if low.len() <= 2 && low.chars().all(|c| c.is_ascii_hexdigit()) {
            parse_byte(low, "address", line_num)?
        } else {
            self.pending.push((self.output.len(), low.to_uppercase(), line_num));
            0
        };

        let addr = self.address(line_num)?;
        let mut word = MicroWord::new(hi >> 4, hi & 0xF, mid >> 4, mid & 0xF, jump_address)
            .map_err(|e| AssemblerError::SyntaxError { line: line_num, message: e.to_string() })?
            .at(addr);
        word.label = self.bind_labels(addr);

        self.output.push(word);
        self.current_addr += 1;
        Ok(())
    }

    /// Micro-address of the next word.
    fn address(&self, line_num: usize) -> Result<u8, AssemblerError> {
        u8::try_from(self.current_addr).map_err(|_| AssemblerError::AddressOverflow { line: line_num })
    }

    fn resolve_references(&mut self) -> Result<(), AssemblerError> {
        for (out_idx, label, line_num) in &self.pending {
            let addr = self.symbols.get(label).ok_or_else(|| AssemblerError::UndefinedLabel {
                line: *line_num,
                label: label.clone(),
            })?;
            self.output[*out_idx].retarget(*addr);
        }
        Ok(())
    }
}

fn parse_byte(token: &str, column: &str, line_num: usize) -> Result<u8, AssemblerError> {
    u8::from_str_radix(token, 16).map_err(|_| AssemblerError::SyntaxError {
        line: line_num,
        message: format!("{} column: '{}' is not a hex byte", column, token),
    })
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("syntax error on line {line}: {message}")]
    SyntaxError { line: usize, message: String },

    #[error("undefined label on line {line}: {label}")]
    UndefinedLabel { line: usize, label: String },

    #[error("duplicate label on line {line}: {label}")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line} runs past micro-address 0xFF")]
    AddressOverflow { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_simple() {
        let source = r#"
            ; Form demo
            D9 00 00    ; ALUin := SPhi
            52 00 00    ; BRhi := AClo
            E0 00 00    ; MAR++, PC++
        "#;

        let words = assemble(source).unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].write(), 0xD);
        assert_eq!(words[0].read(), 0x9);
        assert_eq!(words[2].address, Some(2));
    }

    #[test]
    fn test_assemble_with_labels() {
        let source = r#"
        START:  00 02 SUB   ; call SUB
                00 01 START
        SUB:    00 03 xx
        "#;

        let words = assemble(source).unwrap();
        assert_eq!(words[0].jump_address(), 2);
        assert_eq!(words[0].label.as_deref(), Some("START"));
        assert_eq!(words[1].jump_address(), 0);
        assert_eq!(words[2].label.as_deref(), Some("SUB"));
    }

    #[test]
    fn test_label_on_its_own_line() {
        let source = "OP-IN:\n  01 0F xx\n";
        let words = assemble(source).unwrap();
        assert_eq!(words[0].label.as_deref(), Some("OP-IN"));
        assert_eq!(words[0].jump(), 0xF);
    }

    #[test]
    fn test_org() {
        let source = "00 00 00\nORG 40\nLOOP: 00 01 LOOP\n";
        let words = assemble(source).unwrap();
        assert_eq!(words[1].address, Some(0x40));
        assert_eq!(words[1].jump_address(), 0x40);
    }

    #[test]
    fn test_label_before_org_follows_the_word() {
        let source = "00 02 SUB\nSUB:\nORG 40\n00 03 xx\n";
        let words = assemble(source).unwrap();
        assert_eq!(words[1].address, Some(0x40));
        assert_eq!(words[1].label.as_deref(), Some("SUB"));
        assert_eq!(words[0].jump_address(), 0x40);
    }

    #[test]
    fn test_trailing_label() {
        let words = assemble("00 01 END\nEND:\n").unwrap();
        assert_eq!(words[0].jump_address(), 1);
    }

    #[test]
    fn test_undefined_label() {
        let err = assemble("00 01 NOWHERE").unwrap_err();
        assert_eq!(err, AssemblerError::UndefinedLabel { line: 1, label: "NOWHERE".into() });
    }

    #[test]
    fn test_duplicate_label() {
        let err = assemble("A1: 00 00 00\nA1: 00 00 00").unwrap_err();
        assert_eq!(err, AssemblerError::DuplicateLabel { line: 2, label: "A1".into() });
    }

    #[test]
    fn test_bad_hex() {
        let err = assemble("0G 00 00").unwrap_err();
        assert!(matches!(err, AssemblerError::SyntaxError { line: 1, .. }));
    }

    #[test]
    fn test_address_overflow() {
        let err = assemble("ORG FF\n00 00 00\n00 00 00").unwrap_err();
        assert_eq!(err, AssemblerError::AddressOverflow { line: 3 });
    }
}
