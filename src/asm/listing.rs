//! Microcode listing files (`.mcl`).
//!
//! Listings are plain text in the assembler syntax, so a saved file can
//! be edited by hand and loaded again.

use crate::asm::assembler::{assemble, AssemblerError};
use crate::asm::disasm::disassemble;
use crate::cpu::decode::ControlTable;
use crate::cpu::microword::MicroWord;
use std::path::Path;
use thiserror::Error;

/// Load and assemble a listing file.
pub fn load_listing<P: AsRef<Path>>(path: P) -> Result<Vec<MicroWord>, ListingError> {
    let source = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ListingError::IoError(e.to_string()))?;
    Ok(assemble(&source)?)
}

/// Write words as a listing file, annotated through `table`.
pub fn save_listing<P: AsRef<Path>>(
    path: P,
    words: &[MicroWord],
    table: &ControlTable,
) -> Result<(), ListingError> {
    std::fs::write(path.as_ref(), disassemble(words, table))
        .map_err(|e| ListingError::IoError(e.to_string()))
}

/// Errors that can occur reading or writing listings.
#[derive(Debug, Clone, Error)]
pub enum ListingError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error(transparent)]
    Assembly(#[from] AssemblerError),
}
