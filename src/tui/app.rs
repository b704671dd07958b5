//! Debugger application state and logic.

use crate::asm::disasm::disassemble_word;
use crate::cpu::microstore::MICROSTORE_SIZE;
use crate::{Medusa, MicroWord};
use std::collections::HashSet;

/// Debugger application state.
pub struct DebuggerApp {
    /// The emulator being debugged.
    pub cpu: Medusa,
    /// Register contents before the last step, for change highlighting.
    pub previous: Option<crate::Snapshot>,
    /// Breakpoints (by micro-address).
    pub breakpoints: HashSet<u8>,
    /// Is the debugger running continuously?
    pub running: bool,
    /// Next tick leaves the current address even if it has a breakpoint.
    resume: bool,
    /// Should we quit?
    pub should_quit: bool,
    /// Status message to display.
    pub status: String,
}

impl DebuggerApp {
    /// Create a new debugger around an emulator with its microcode loaded.
    pub fn new(cpu: Medusa) -> Self {
        Self {
            cpu,
            previous: None,
            breakpoints: HashSet::new(),
            running: false,
            resume: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
        }
    }

    /// Step one microinstruction.
    pub fn step(&mut self) {
        let mpc = self.cpu.seq.mpc;
        let before = self.cpu.snapshot();

        match self.cpu.cycle() {
            Ok(result) => {
                self.previous = Some(before);
                let text = self
                    .cpu
                    .microstore
                    .read(mpc)
                    .map(|w| disassemble_word(w, self.cpu.table()))
                    .unwrap_or_default();
                self.status = format!("{:02X}: {}  -> {:02X}", mpc, text, result.next_address);
            }
            Err(e) => {
                self.status = format!("Error at {:02X}: {}", mpc, e);
                self.running = false;
            }
        }
    }

    /// Run until breakpoint or error.
    pub fn run(&mut self) {
        self.running = true;
        self.resume = true;
        self.status = "Running...".into();
    }

    /// Run one iteration of continuous execution.
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }

        let mpc = self.cpu.seq.mpc;
        if self.breakpoints.contains(&mpc) && !std::mem::take(&mut self.resume) {
            self.running = false;
            self.status = format!("Breakpoint at {:02X}", mpc);
            return;
        }

        self.step();
    }

    /// Toggle breakpoint at the current MPC.
    pub fn toggle_breakpoint(&mut self) {
        let mpc = self.cpu.seq.mpc;
        if self.breakpoints.remove(&mpc) {
            self.status = format!("Removed breakpoint at {:02X}", mpc);
        } else {
            self.breakpoints.insert(mpc);
            self.status = format!("Set breakpoint at {:02X}", mpc);
        }
    }

    /// Flip the /CDAV input.
    pub fn toggle_data_available(&mut self) {
        let unavailable = !self.cpu.status.data_not_available;
        self.cpu.set_data_not_available(unavailable);
        self.status = format!("/CDAV = {}", u8::from(unavailable));
    }

    /// System reset. The control store is kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.previous = None;
        self.running = false;
        self.status = "Reset. Ready.".into();
    }

    /// Listing lines around the MPC: (address, text, is_current).
    pub fn get_listing(&self, lines: usize) -> Vec<(u8, String, bool)> {
        let mpc = self.cpu.seq.mpc as usize;
        let start = mpc.saturating_sub(lines / 2);

        (start..(start + lines).min(MICROSTORE_SIZE))
            .map(|addr| {
                let addr = addr as u8;
                let text = match self.cpu.microstore.read(addr) {
                    Some(word) => format_line(word, self),
                    None => "--".to_string(),
                };
                (addr, text, addr as usize == mpc)
            })
            .collect()
    }
}

fn format_line(word: &MicroWord, app: &DebuggerApp) -> String {
    let label = word.label.as_deref().unwrap_or("");
    format!("{:<8} {}  {}", label, word, disassemble_word(word, app.cpu.table()))
}

/// Run the debugger on an emulator.
pub fn run_debugger(cpu: Medusa) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = DebuggerApp::new(cpu);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('d') => app.toggle_data_available(),
                        KeyCode::Char('x') => app.reset(),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}
