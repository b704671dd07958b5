//! End-to-end runs of the emulator through its public API.

use medusa::{
    assemble, ControlTable, CpuError, DecodeError, Medusa, MicroWord, Register, HOLZBERLEIN,
};
use std::sync::{Arc, Mutex};
use std::thread;

fn word(bits: u32) -> MicroWord {
    MicroWord::from_bits(bits).unwrap()
}

/// The classroom example: MAR 2211, AClo 50, AChi 42, SPhi 50.
fn classroom() -> Medusa {
    let mut cpu = Medusa::new();
    cpu.regs.set(Register::MARlo, 0x11);
    cpu.regs.set(Register::MARhi, 0x22);
    cpu.regs.set(Register::AClo, 0x50);
    cpu.regs.set(Register::AChi, 0x42);
    cpu.regs.set(Register::SPhi, 0x50);
    cpu
}

#[test]
fn test_classroom_sequence() {
    let mut cpu = classroom();

    cpu.step(&word(0xD9_00_00)).unwrap();
    assert_eq!(cpu.regs.get(Register::ALUin), 0x50);

    cpu.step(&word(0x52_00_00)).unwrap();
    assert_eq!(cpu.regs.get(Register::BRhi), 0x50);

    let before = cpu.status;
    cpu.step(&word(0xE0_00_00)).unwrap();
    assert_eq!(cpu.regs.mar(), 0x2212);
    assert_eq!(cpu.regs.pc(), 0x0001);
    assert_eq!(cpu.status, before);

    let result = cpu.step(&word(0x85_80_00)).unwrap();
    assert_eq!(cpu.regs.get(Register::SPlo), 0xA0);
    assert_eq!(result.destination, Some(Register::SPlo));
    assert!(cpu.status.negative);
    assert!(!cpu.status.zero);
    assert!(!cpu.status.positive);
    assert!(!cpu.status.carry);

    let snap = cpu.snapshot();
    assert_eq!(snap.get(Register::ALUin), 0x50);
    assert_eq!(snap.get(Register::BRhi), 0x50);
    assert_eq!(snap.get(Register::AChi), 0x42);
    assert_eq!(snap.cycles, 4);
    assert_eq!(snap.status.bits(), "00001");
}

#[test]
fn test_snapshot_is_idempotent() {
    let mut cpu = classroom();
    cpu.step(&word(0xD9_00_00)).unwrap();

    let first = cpu.snapshot();
    let second = cpu.snapshot();
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_decode_error_leaves_state_unchanged() {
    let mut cpu = classroom();
    cpu.step(&word(0xD9_00_00)).unwrap();
    let before = cpu.snapshot();

    // Write code C is unused.
    let err = cpu.step(&word(0xC2_00_00)).unwrap_err();
    assert!(matches!(err, CpuError::Decode(DecodeError::UnusedCode { code: 0xC, .. })));
    assert_eq!(cpu.snapshot(), before);

    // ALU code 6 has no function.
    let err = cpu.step(&word(0x52_61_40)).unwrap_err();
    assert!(matches!(err, CpuError::Unsupported(_)));
    assert_eq!(cpu.snapshot(), before);
}

#[test]
fn test_reset_values() {
    let mut cpu = classroom();
    cpu.step(&word(0x85_81_40)).unwrap();
    cpu.reset();

    let snap = cpu.snapshot();
    for reg in Register::ALL {
        let expected = if reg.resets_to_zero() { 0x00 } else { 0xFF };
        assert_eq!(snap.get(reg), expected, "{}", reg);
    }
    assert_eq!(snap.mpc, 0);
    assert_eq!(snap.mrtn, 0);
    assert_eq!(snap.mux, 0);
    assert_eq!(snap.cycles, 0);
    assert_eq!(snap.status.bits(), "00000");
}

#[test]
fn test_shared_context_gives_whole_steps() {
    let cpu = Arc::new(Mutex::new(classroom()));
    let add = word(0x85_80_00);

    let writer = {
        let cpu = Arc::clone(&cpu);
        thread::spawn(move || {
            for _ in 0..100 {
                cpu.lock().unwrap().step(&add).unwrap();
            }
        })
    };

    for _ in 0..100 {
        let snap = cpu.lock().unwrap().snapshot();
        // SPlo only ever holds ALUin + BRhi, or its reset value before the first step.
        let splo = snap.get(Register::SPlo);
        assert!(splo == 0xFF || splo == 0xFE, "torn read: {:02X}", splo);
    }

    writer.join().unwrap();
    assert_eq!(cpu.lock().unwrap().cycles, 100);
}

#[test]
fn test_call_and_return_through_microstore() {
    let source = "\
        00 02 SUB      ; call\n\
        52 00 xx       ; BRhi := AClo\n\
        ORG 10\n\
        SUB: 2D 00 xx  ; AClo := ALUin\n\
        00 03 xx       ; return\n";

    let mut cpu = Medusa::new();
    cpu.load_microcode(&assemble(source).unwrap()).unwrap();
    cpu.regs.set(Register::ALUin, 0x33);

    cpu.cycle().unwrap();
    assert_eq!(cpu.seq.mpc, 0x10);
    assert_eq!(cpu.seq.mrtn, 0x01);

    cpu.cycle().unwrap();
    assert_eq!(cpu.regs.get(Register::AClo), 0x33);

    let ret = cpu.cycle().unwrap();
    assert_eq!(ret.next_address, 0x01);

    cpu.cycle().unwrap();
    assert_eq!(cpu.regs.get(Register::BRhi), 0x33);

    assert_eq!(cpu.cycle().unwrap_err(), CpuError::EmptyMicroAddress(0x02));
    assert_eq!(cpu.cycles, 4);
}

#[test]
fn test_loop_until_zero() {
    // Count AClo down from 3, then fall out of the loop.
    let source = "\
        D2 00 xx        ; ALUin := AClo\n\
        LOOP: 2D A0 xx  ; AClo := ALUin - 1\n\
        D2 05 DONE      ; ALUin := AClo, exit on zero\n\
        00 01 LOOP\n\
        DONE: 00 01 DONE\n";

    let mut cpu = Medusa::new();
    cpu.load_microcode(&assemble(source).unwrap()).unwrap();
    cpu.regs.set(Register::AClo, 3);

    cpu.run_limited(20).unwrap();
    assert_eq!(cpu.regs.get(Register::AClo), 0);
    assert_eq!(cpu.seq.mpc, 0x04);
}

#[test]
fn test_table_file_drives_decode() {
    let mut rows = HOLZBERLEIN.to_rows();
    // Rewire write code C to SPlo.
    rows[0xC].write = "SPlo".into();
    let json = serde_json::to_string(&rows).unwrap();
    let table = ControlTable::from_json(&json).unwrap();

    let mut cpu = Medusa::with_table(table);
    cpu.regs.set(Register::AClo, 0x12);
    cpu.step(&word(0xC2_00_00)).unwrap();
    assert_eq!(cpu.regs.get(Register::SPlo), 0x12);
}
