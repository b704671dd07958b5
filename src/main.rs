//! Medusa Simulator - CLI Entry Point
//!
//! Commands:
//! - `medusa-sim run <listing>` - Run a microcode listing
//! - `medusa-sim debug <listing>` - Interactive debugger
//! - `medusa-sim asm <source>` - Check and normalize a listing
//! - `medusa-sim disasm <listing>` - Register-transfer view of a listing
//! - `medusa-sim table` - Print the decode table
//! - `medusa-sim demo` - Step the classroom example

use clap::{Parser, Subcommand};
use medusa::logging::{setup_logging, LogSettings};
use medusa::{ControlTable, CpuError, Medusa, MicroWord};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "medusa-sim")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A microcode-level emulator of the Medusa microprocessor")]
struct Cli {
    /// Also write log output to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a microprogram from micro-address 0
    Run {
        /// Path to the listing file
        program: String,
        /// Maximum number of microinstructions to run
        #[arg(short, long, default_value = "1000")]
        max_cycles: u64,
        /// Log every microinstruction and ALU operation
        #[arg(short, long)]
        trace: bool,
        /// Decode table file (JSON) to use instead of Holzberlein's
        #[arg(long)]
        table: Option<String>,
        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive debugger
    Debug {
        /// Path to the listing file
        program: String,
        /// Decode table file (JSON)
        #[arg(long)]
        table: Option<String>,
    },
    /// Assemble a listing and write it back normalized
    Asm {
        /// Path to the source file
        source: String,
        /// Output listing file
        #[arg(short, long)]
        output: Option<String>,
        /// Show assembler diagnostics
        #[arg(short, long)]
        verbose: bool,
    },
    /// Disassemble a listing to register transfers
    Disasm {
        /// Path to the listing file
        listing: String,
        /// Decode table file (JSON)
        #[arg(long)]
        table: Option<String>,
    },
    /// Print the decode table
    Table {
        /// Print as a loadable JSON table file
        #[arg(long)]
        json: bool,
    },
    /// Step the classroom example and show the state after each word
    Demo {
        /// Log every microinstruction and ALU operation
        #[arg(short, long)]
        trace: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let log_file = cli.log_file;

    match cli.command {
        Some(Commands::Run { program, max_cycles, trace, table, json }) => {
            init_logging(trace, false, log_file);
            run_program(&program, max_cycles, table.as_deref(), json);
        }
        Some(Commands::Debug { program, table }) => {
            debug_program(&program, table.as_deref());
        }
        Some(Commands::Asm { source, output, verbose }) => {
            init_logging(false, verbose, log_file);
            assemble_file(&source, output);
        }
        Some(Commands::Disasm { listing, table }) => {
            disassemble_file(&listing, table.as_deref());
        }
        Some(Commands::Table { json }) => {
            print_table(json);
        }
        Some(Commands::Demo { trace }) => {
            init_logging(trace, false, log_file);
            run_demo();
        }
        None => {
            println!("Medusa Simulator v0.1.0");
            println!("A microcode-level Medusa emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn init_logging(trace: bool, asm: bool, file: Option<PathBuf>) {
    let settings = LogSettings {
        sequencer: trace,
        alu: trace,
        asm,
        file,
    };
    if let Err(e) = setup_logging(settings) {
        eprintln!("❌ Failed to set up logging: {}", e);
        std::process::exit(1);
    }
}

fn load_table(path: Option<&str>) -> ControlTable {
    match path {
        Some(path) => match ControlTable::load(path) {
            Ok(table) => {
                println!("📂 Loaded decode table from {}", path);
                table
            }
            Err(e) => {
                eprintln!("❌ Failed to load decode table: {}", e);
                std::process::exit(1);
            }
        },
        None => ControlTable::default(),
    }
}

fn load_program(path: &str) -> Vec<MicroWord> {
    let words = match medusa::load_listing(path) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ Failed to load listing: {}", e);
            std::process::exit(1);
        }
    };

    if words.is_empty() {
        eprintln!("❌ No microinstructions in {}", path);
        std::process::exit(1);
    }

    println!("📂 Loaded {} microinstructions", words.len());
    words
}

fn prepare(path: &str, table: Option<&str>) -> Medusa {
    let words = load_program(path);
    let mut cpu = Medusa::with_table(load_table(table));
    if let Err(e) = cpu.load_microcode(&words) {
        eprintln!("❌ Failed to load microcode: {}", e);
        std::process::exit(1);
    }
    cpu
}

fn run_program(path: &str, max_cycles: u64, table: Option<&str>, json: bool) {
    println!("🔧 Running: {}", path);
    let mut cpu = prepare(path, table);

    let outcome = cpu.run_limited(max_cycles);

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cpu.cycles);

    match outcome {
        Ok(_) => {
            println!("⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.", max_cycles);
        }
        Err(CpuError::EmptyMicroAddress(addr)) => {
            println!("Stopped: nothing programmed at micro-address {:02X}", addr);
        }
        Err(e) => {
            eprintln!("❌ CPU error at MPC={:02X}: {}", cpu.seq.mpc, e);
            print_snapshot(&cpu, json);
            std::process::exit(1);
        }
    }

    print_snapshot(&cpu, json);
}

fn print_snapshot(cpu: &Medusa, json: bool) {
    let snapshot = cpu.snapshot();
    if json {
        match snapshot.to_json() {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to serialize snapshot: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        println!("{}", snapshot);
    }
}

#[cfg(feature = "tui")]
fn debug_program(path: &str, table: Option<&str>) {
    println!("🔍 Loading: {}", path);
    let cpu = prepare(path, table);

    println!("🚀 Launching debugger...");
    println!();

    if let Err(e) = medusa::run_debugger(cpu) {
        eprintln!("❌ Debugger error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_program(_path: &str, _table: Option<&str>) {
    eprintln!("❌ The debugger needs the `tui` feature");
    std::process::exit(1);
}

fn assemble_file(source_path: &str, output: Option<String>) {
    let out_path = output
        .unwrap_or_else(|| format!("{}.out.mcl", source_path.trim_end_matches(".mcl")));

    println!("📝 Assembling: {} → {}", source_path, out_path);

    let words = load_program(source_path);

    if let Err(e) = medusa::save_listing(&out_path, &words, &ControlTable::default()) {
        eprintln!("❌ Failed to save listing: {}", e);
        std::process::exit(1);
    }

    println!("✓ Saved to {}", out_path);
}

fn disassemble_file(path: &str, table: Option<&str>) {
    println!("📖 Disassembling: {}", path);
    println!();

    let table = load_table(table);
    let words = load_program(path);
    println!("{}", medusa::disassemble(&words, &table));
}

fn print_table(json: bool) {
    let table = ControlTable::default();
    if json {
        println!("{}", table.to_json());
        return;
    }

    println!("{:<6} {:<10} {:<10} {:<10} {:<10}", "Code", "Write", "Read", "ALU", "Jump");
    for (code, row) in table.to_rows().iter().enumerate() {
        println!(
            "{:<6} {:<10} {:<10} {:<10} {:<10}",
            format!("{:X}", code),
            row.write,
            row.read,
            row.alu,
            row.jump
        );
    }
}

/// The worked example: ALUin := SPhi, BRhi := AClo, MAR++/PC++,
/// then SPlo := ALUin + BRhi.
fn run_demo() {
    use medusa::Register;

    println!("━━━ Medusa Demo ━━━");
    println!();

    let mut cpu = Medusa::new();
    cpu.regs.set(Register::MARlo, 0x11);
    cpu.regs.set(Register::MARhi, 0x22);
    cpu.regs.set(Register::AClo, 0x50);
    cpu.regs.set(Register::AChi, 0x42);
    cpu.regs.set(Register::SPhi, 0x50);

    println!("Initial state:");
    println!("{}", cpu.snapshot());

    let program: [u32; 4] = [0xD9_00_00, 0x52_00_00, 0xE0_00_00, 0x85_80_00];
    for bits in program {
        let word = match MicroWord::from_bits(bits) {
            Ok(word) => word,
            Err(e) => {
                eprintln!("❌ Bad microword {:06X}: {}", bits, e);
                std::process::exit(1);
            }
        };

        println!();
        println!("━━━ {}  {} ━━━", word, medusa::asm::disassemble_word(&word, cpu.table()));

        if let Err(e) = cpu.step(&word) {
            eprintln!("❌ CPU error: {}", e);
            std::process::exit(1);
        }
        println!("{}", cpu.snapshot());
    }

    println!();
    println!("✓ SPlo = {:02X}", cpu.regs.get(Register::SPlo));
}
