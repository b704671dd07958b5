//! TUI debugger for the Medusa emulator.
//!
//! Provides an interactive terminal-based debugger with:
//! - Control store listing around the MPC
//! - Register view with change highlighting
//! - Microsequencer and status word view
//! - Step/run/breakpoint controls

mod app;
mod ui;

pub use app::{DebuggerApp, run_debugger};
