//! Log output for the front ends.
//!
//! The core logs through the `log` facade under three targets:
//! `useq` (one line per microinstruction), `alu` (operands and flags) and
//! `asm` (assembler summaries).

use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    /// Trace every microinstruction.
    pub sequencer: bool,
    /// Trace ALU operands and results.
    pub alu: bool,
    /// Assembler diagnostics.
    pub asm: bool,
    /// Also write to this file.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    fn any(&self) -> bool {
        self.sequencer || self.alu || self.asm
    }
}

/// Install the global logger. Does nothing when every target is off.
pub fn setup_logging(settings: LogSettings) -> Result<(), fern::InitError> {
    if !settings.any() {
        return Ok(());
    }

    let file = settings.file.clone();
    let mut dispatch = fern::Dispatch::new()
        .filter(move |metadata| match metadata.target() {
            "useq" => settings.sequencer,
            "alu" => settings.alu,
            "asm" => settings.asm,
            _ => true,
        })
        .format(|out, message, record| {
            out.finish(format_args!("[{}]: {}", record.target(), message))
        })
        .level(log::LevelFilter::Trace)
        .chain(std::io::stderr());

    if let Some(path) = file {
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}
